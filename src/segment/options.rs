use crate::model::AnswerOption;

use super::clean::{NoisePatterns, collapse_whitespace};
use super::marker_ordinal;

#[derive(Debug)]
pub(super) struct ScannedBlock<'a> {
    pub(super) body: &'a str,
    pub(super) option_segments: Vec<(char, &'a str)>,
}

#[derive(Debug, Clone, Copy)]
enum MarkerScanState {
    Body,
    InOption { marker: char, text_start: usize },
}

/// Splits a question block into its leading body and the `(marker, text)`
/// segments that follow each circled-digit marker, in source order.
pub(super) fn scan_option_segments(block: &str) -> ScannedBlock<'_> {
    let mut body = block;
    let mut option_segments = Vec::<(char, &str)>::new();
    let mut state = MarkerScanState::Body;

    for (index, character) in block.char_indices() {
        if marker_ordinal(character).is_none() {
            continue;
        }

        match state {
            MarkerScanState::Body => body = &block[..index],
            MarkerScanState::InOption { marker, text_start } => {
                option_segments.push((marker, &block[text_start..index]));
            }
        }

        state = MarkerScanState::InOption {
            marker: character,
            text_start: index + character.len_utf8(),
        };
    }

    if let MarkerScanState::InOption { marker, text_start } = state {
        option_segments.push((marker, &block[text_start..]));
    }

    ScannedBlock {
        body,
        option_segments,
    }
}

/// Builds one option per distinct marker. A repeated marker overwrites the
/// earlier text; the result is ordered by ordinal.
pub(super) fn build_options(segments: &[(char, &str)], noise: &NoisePatterns) -> Vec<AnswerOption> {
    let mut options = Vec::<AnswerOption>::new();

    for (marker, raw_text) in segments {
        let Some(ordinal) = marker_ordinal(*marker) else {
            continue;
        };
        let text = clean_option_text(raw_text, noise);

        if let Some(existing) = options.iter_mut().find(|option| option.marker == *marker) {
            existing.text = text;
            continue;
        }

        options.push(AnswerOption {
            ordinal,
            marker: *marker,
            text,
            is_correct: false,
        });
    }

    options.sort_by_key(|option| option.ordinal);
    options
}

/// Option text ends at the first blank line after content or at a passage
/// sentinel; anything below belongs to the surrounding layout.
fn clean_option_text(raw_text: &str, noise: &NoisePatterns) -> String {
    let mut kept = Vec::<&str>::new();

    for line in raw_text.lines() {
        if noise.is_passage_sentinel(line) {
            break;
        }
        if line.trim().is_empty() {
            if kept.is_empty() {
                continue;
            }
            break;
        }
        if noise.line_is_noise(line) {
            continue;
        }
        kept.push(line);
    }

    collapse_whitespace(&kept.join(" "))
}
