use std::collections::HashSet;

use anyhow::{Context, Result};
use regex::Regex;
use tracing::debug;

use crate::model::{Passage, PassageSource, SourceOffsets};
use crate::segment::QUESTION_START_PATTERN;

mod associate;
mod cue;
mod sentinel;
#[cfg(test)]
mod tests;

pub use associate::{DEFAULT_SHORT_QUESTION_CHARS, PassageAssociator};

use cue::*;
use sentinel::*;

/// Phrases that introduce a shared reading passage ("read the following").
pub const READ_CUES: [&str; 5] = [
    "다음 글을 읽고",
    "다음을 읽고",
    "다음 글을 보고",
    "다음 자료를 보고",
    "다음 지문을 읽고",
];

#[derive(Debug, Clone)]
struct PassageDraft {
    content: String,
    range: SourceOffsets,
    source: PassageSource,
}

#[derive(Debug)]
pub struct PassageDetector {
    sentinel_token: Regex,
    read_cue: Regex,
    question_start: Regex,
    image_markdown: Regex,
    table_delimiter: Regex,
}

impl PassageDetector {
    pub fn new() -> Result<Self> {
        let read_cue_pattern = READ_CUES
            .iter()
            .map(|cue| regex::escape(cue))
            .collect::<Vec<String>>()
            .join("|");

        Ok(Self {
            sentinel_token: Regex::new(r"<!--\s*(?P<close>/)?passage:(?P<id>\d+)\s*-->")
                .context("failed to compile passage sentinel regex")?,
            read_cue: Regex::new(&read_cue_pattern).context("failed to compile read cue regex")?,
            question_start: Regex::new(QUESTION_START_PATTERN)
                .context("failed to compile question start regex")?,
            image_markdown: Regex::new(r"!\[[^\]]*\]\([^)]*\)")
                .context("failed to compile image markdown regex")?,
            table_delimiter: Regex::new(r"\|\s*:?-{3,}")
                .context("failed to compile table delimiter regex")?,
        })
    }

    /// Runs both extraction passes, drops exact-duplicate contents, and
    /// numbers the survivors from 1 in combined order.
    pub fn detect(&self, text: &str) -> Vec<Passage> {
        let sentinel_drafts = extract_sentinel_passages(text, &self.sentinel_token);
        let cue_drafts = extract_cue_passages(text, &self.read_cue, &self.question_start);
        debug!(
            sentinel = sentinel_drafts.len(),
            cue = cue_drafts.len(),
            "passage extraction passes finished"
        );

        let mut seen = HashSet::<String>::new();
        let mut passages = Vec::<Passage>::new();

        for draft in sentinel_drafts.into_iter().chain(cue_drafts) {
            if !seen.insert(draft.content.clone()) {
                debug!(
                    source = draft.source.as_str(),
                    start = draft.range.start,
                    "dropping duplicate passage"
                );
                continue;
            }

            passages.push(Passage {
                id: (passages.len() + 1) as u32,
                has_image: self.image_markdown.is_match(&draft.content),
                has_table: self.table_delimiter.is_match(&draft.content),
                content: draft.content,
                range: draft.range,
                source: draft.source,
            });
        }

        passages
    }
}
