use regex::Regex;

use crate::model::{PassageSource, SourceOffsets};
use crate::segment::marker_ordinal;

use super::PassageDraft;

#[derive(Debug, Clone, Copy)]
enum CueScanState {
    LeadingBlank,
    Capturing { start: usize },
}

/// For each read cue, skips the rest of the cue line and any blank lines,
/// then captures until a blank line, a question-number line, or a
/// circled-digit marker.
pub(super) fn extract_cue_passages(
    text: &str,
    read_cue: &Regex,
    question_start: &Regex,
) -> Vec<PassageDraft> {
    let mut drafts = Vec::<PassageDraft>::new();

    for cue in read_cue.find_iter(text) {
        let Some(newline) = text[cue.end()..].find('\n') else {
            continue;
        };
        let after_cue_line = cue.end() + newline + 1;

        let Some(range) = scan_cue_passage(text, after_cue_line, question_start) else {
            continue;
        };
        let content = text[range.start..range.end].trim().to_string();
        if content.is_empty() {
            continue;
        }

        drafts.push(PassageDraft {
            content,
            range,
            source: PassageSource::Cue,
        });
    }

    drafts
}

fn scan_cue_passage(text: &str, from: usize, question_start: &Regex) -> Option<SourceOffsets> {
    let mut state = CueScanState::LeadingBlank;
    let mut line_start = from;

    for line in text[from..].split_inclusive('\n') {
        let current_start = line_start;
        line_start += line.len();

        let is_blank = line.trim().is_empty();
        let opens_question = question_start.is_match(line);

        match state {
            CueScanState::LeadingBlank => {
                if is_blank {
                    continue;
                }
                if opens_question {
                    return None;
                }
                if let Some(marker_at) = first_marker_index(line) {
                    return finish(current_start, current_start + marker_at);
                }
                state = CueScanState::Capturing {
                    start: current_start,
                };
            }
            CueScanState::Capturing { start } => {
                if is_blank || opens_question {
                    return finish(start, current_start);
                }
                if let Some(marker_at) = first_marker_index(line) {
                    return finish(start, current_start + marker_at);
                }
            }
        }
    }

    match state {
        CueScanState::LeadingBlank => None,
        CueScanState::Capturing { start } => finish(start, text.len()),
    }
}

fn finish(start: usize, end: usize) -> Option<SourceOffsets> {
    (end > start).then_some(SourceOffsets { start, end })
}

fn first_marker_index(line: &str) -> Option<usize> {
    line.char_indices()
        .find(|(_, character)| marker_ordinal(*character).is_some())
        .map(|(index, _)| index)
}
