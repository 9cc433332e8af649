use anyhow::{Context, Result};
use regex::Regex;
use tracing::debug;

use crate::model::{AnswerKey, QuestionRecord, SkipReason, SkippedBlock};

mod blocks;
mod clean;
mod options;
mod table;
#[cfg(test)]
mod tests;

use blocks::*;
use clean::*;
use options::*;
use table::*;

pub const QUESTION_START_PATTERN: &str = r"^[ \t]*(?P<number>\d{1,3})\.\s+";

pub const CIRCLED_MARKERS: [char; 5] = ['①', '②', '③', '④', '⑤'];

pub fn marker_ordinal(marker: char) -> Option<u8> {
    CIRCLED_MARKERS
        .iter()
        .position(|candidate| *candidate == marker)
        .map(|index| (index + 1) as u8)
}

#[cfg(test)]
pub fn ordinal_marker(ordinal: u8) -> Option<char> {
    CIRCLED_MARKERS
        .get(usize::from(ordinal).checked_sub(1)?)
        .copied()
}

#[derive(Debug, Default)]
pub struct SegmentOutcome {
    pub blocks_scanned: usize,
    pub records: Vec<QuestionRecord>,
    pub skipped: Vec<SkippedBlock>,
}

#[derive(Debug)]
pub struct Segmenter {
    question_start: Regex,
    cell_split: Regex,
    markdown_table_delimiter: Regex,
    noise: NoisePatterns,
}

impl Segmenter {
    pub fn new() -> Result<Self> {
        Ok(Self {
            question_start: Regex::new(QUESTION_START_PATTERN)
                .context("failed to compile question start regex")?,
            cell_split: Regex::new(r"\t+|\s{2,}").context("failed to compile cell split regex")?,
            markdown_table_delimiter: Regex::new(r"\|\s*:?-{3,}")
                .context("failed to compile markdown table delimiter regex")?,
            noise: NoisePatterns::new()?,
        })
    }

    pub fn segment(&self, text: &str) -> SegmentOutcome {
        let blocks = scan_question_blocks(text, &self.question_start);
        let mut outcome = SegmentOutcome {
            blocks_scanned: blocks.len(),
            ..SegmentOutcome::default()
        };

        for block in blocks {
            let scanned = scan_option_segments(block.text);
            let options = build_options(&scanned.option_segments, &self.noise);

            if options.len() < 2 {
                debug!(
                    number = block.number,
                    distinct_options = options.len(),
                    "skipping block without enough options"
                );
                outcome.skipped.push(SkippedBlock {
                    number: block.number,
                    reason: SkipReason::TooFewOptions {
                        found: options.len(),
                    },
                    source_offsets: block.offsets,
                });
                continue;
            }

            let (body, grid_emitted) = self.build_body(scanned.body);
            let has_table = grid_emitted || self.markdown_table_delimiter.is_match(scanned.body);

            outcome.records.push(QuestionRecord {
                number: block.number,
                body,
                options,
                passage_id: None,
                has_table,
                source_offsets: block.offsets,
            });
        }

        outcome
    }

    fn build_body(&self, raw_body: &str) -> (String, bool) {
        let lines = raw_body
            .lines()
            .filter(|line| !self.noise.line_is_noise(line))
            .collect::<Vec<&str>>();

        let (body_lines, grid_emitted) = if is_table_like(raw_body) {
            reconstruct_table_lines(&lines, &self.cell_split, &self.noise)
        } else {
            (
                lines
                    .iter()
                    .map(|line| classify_prose_line(line, &self.noise))
                    .collect(),
                false,
            )
        };

        (render_body_lines(&body_lines), grid_emitted)
    }
}

/// Marks the keyed option correct on each record; returns question numbers
/// whose keyed ordinal has no matching option.
pub fn apply_answer_key(records: &mut [QuestionRecord], answer_key: &AnswerKey) -> Vec<u32> {
    let mut unmatched = Vec::new();

    for record in records.iter_mut() {
        let Some(&ordinal) = answer_key.get(&record.number) else {
            continue;
        };

        let mut matched = false;
        for option in &mut record.options {
            option.is_correct = option.ordinal == ordinal;
            matched |= option.is_correct;
        }

        if !matched {
            unmatched.push(record.number);
        }
    }

    unmatched
}
