use tracing::debug;

use crate::model::{Passage, QuestionRecord};

use super::READ_CUES;

/// Back-references to a passage printed above the question.
const BACK_REFERENCE_CUES: [&str; 4] = ["윗글", "위 글", "위의 글", "다음 글"];

pub const DEFAULT_SHORT_QUESTION_CHARS: usize = 100;

#[derive(Debug, Clone, Copy)]
pub struct PassageAssociator {
    short_question_chars: usize,
}

impl Default for PassageAssociator {
    fn default() -> Self {
        Self::new(DEFAULT_SHORT_QUESTION_CHARS)
    }
}

impl PassageAssociator {
    pub fn new(short_question_chars: usize) -> Self {
        Self {
            short_question_chars,
        }
    }

    pub fn has_cue(body: &str) -> bool {
        READ_CUES
            .iter()
            .chain(BACK_REFERENCE_CUES.iter())
            .any(|cue| body.contains(cue))
    }

    /// Single pass over questions in document order. A cue picks up the
    /// latest passage that starts before the question block ends; a short
    /// question without a cue continues the active passage; a long one
    /// without a cue clears it. Returns how many questions got a passage.
    pub fn associate(&self, questions: &mut [QuestionRecord], passages: &[Passage]) -> usize {
        let mut active: Option<u32> = None;
        let mut attached = 0usize;

        for question in questions.iter_mut() {
            if Self::has_cue(&question.body) {
                active = latest_passage_before(passages, question.source_offsets.end);
                debug!(
                    number = question.number,
                    passage_id = ?active,
                    "passage cue found"
                );
            } else if question.body.chars().count() >= self.short_question_chars {
                if active.is_some() {
                    debug!(number = question.number, "long question clears active passage");
                }
                active = None;
            }

            question.passage_id = active;
            if active.is_some() {
                attached += 1;
            }
        }

        attached
    }
}

fn latest_passage_before(passages: &[Passage], before: usize) -> Option<u32> {
    passages
        .iter()
        .filter(|passage| passage.range.start < before)
        .max_by_key(|passage| passage.range.start)
        .map(|passage| passage.id)
}
