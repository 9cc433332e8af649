use regex::Regex;

use crate::model::SourceOffsets;

#[derive(Debug, Clone)]
pub(super) struct QuestionBlock<'a> {
    pub(super) number: u32,
    /// Block text following the `N.` prefix.
    pub(super) text: &'a str,
    pub(super) offsets: SourceOffsets,
}

#[derive(Debug, Clone, Copy)]
enum BlockScanState {
    Preamble,
    InQuestion {
        number: u32,
        start: usize,
        body_start: usize,
    },
}

/// Splits `text` into question blocks at lines that open with a question
/// number. Text before the first question number is preamble and dropped.
pub(super) fn scan_question_blocks<'a>(
    text: &'a str,
    question_start: &Regex,
) -> Vec<QuestionBlock<'a>> {
    let mut blocks = Vec::<QuestionBlock<'a>>::new();
    let mut state = BlockScanState::Preamble;
    let mut line_start = 0usize;

    for line in text.split_inclusive('\n') {
        let current_start = line_start;
        line_start += line.len();

        let Some(captures) = question_start.captures(line) else {
            continue;
        };
        let Some(number) = captures
            .name("number")
            .and_then(|value| value.as_str().parse::<u32>().ok())
        else {
            continue;
        };
        let prefix_len = captures.get(0).map(|value| value.end()).unwrap_or(0);

        if let BlockScanState::InQuestion {
            number: open_number,
            start,
            body_start,
        } = state
        {
            blocks.push(QuestionBlock {
                number: open_number,
                text: &text[body_start..current_start],
                offsets: SourceOffsets {
                    start,
                    end: current_start,
                },
            });
        }

        state = BlockScanState::InQuestion {
            number,
            start: current_start,
            body_start: current_start + prefix_len,
        };
    }

    if let BlockScanState::InQuestion {
        number,
        start,
        body_start,
    } = state
    {
        blocks.push(QuestionBlock {
            number,
            text: &text[body_start..],
            offsets: SourceOffsets {
                start,
                end: text.len(),
            },
        });
    }

    blocks
}
