use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::randomize::{Seed, Strategy};

/// Byte range of a span inside the scanned document text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceOffsets {
    pub start: usize,
    pub end: usize,
}

/// Stable identity of an option, independent of where a shuffle puts it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct OptionKey {
    pub ordinal: u8,
    pub marker: char,
}

impl fmt::Display for OptionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.marker, self.ordinal)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerOption {
    pub ordinal: u8,
    pub marker: char,
    pub text: String,
    #[serde(default)]
    pub is_correct: bool,
}

impl AnswerOption {
    pub fn key(&self) -> OptionKey {
        OptionKey {
            ordinal: self.ordinal,
            marker: self.marker,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionRecord {
    pub number: u32,
    pub body: String,
    pub options: Vec<AnswerOption>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub passage_id: Option<u32>,
    #[serde(default)]
    pub has_table: bool,
    pub source_offsets: SourceOffsets,
}

impl QuestionRecord {
    pub fn correct_index(&self) -> Option<usize> {
        self.options.iter().position(|option| option.is_correct)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PassageSource {
    Sentinel,
    Cue,
}

impl PassageSource {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Sentinel => "sentinel",
            Self::Cue => "cue",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Passage {
    pub id: u32,
    pub content: String,
    pub range: SourceOffsets,
    pub has_image: bool,
    pub has_table: bool,
    pub source: PassageSource,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SkipReason {
    TooFewOptions { found: usize },
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TooFewOptions { found } => {
                write!(f, "block has {} distinct option(s), need at least 2", found)
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedBlock {
    pub number: u32,
    pub reason: SkipReason,
    pub source_offsets: SourceOffsets,
}

/// Original position → randomized position.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OptionMap(Vec<usize>);

impl OptionMap {
    pub fn new(entries: Vec<usize>) -> Self {
        Self(entries)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, original_index: usize) -> Option<usize> {
        self.0.get(original_index).copied()
    }

    /// `(original_index, new_index)` pairs in original order.
    pub fn pairs(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.0.iter().copied().enumerate()
    }

    pub fn is_bijection(&self) -> bool {
        let mut seen = vec![false; self.0.len()];
        for &new_index in &self.0 {
            match seen.get_mut(new_index) {
                Some(slot) if !*slot => *slot = true,
                _ => return false,
            }
        }
        true
    }

    /// Randomized position → original position.
    pub fn original_index_of(&self, new_index: usize) -> Option<usize> {
        self.0.iter().position(|&value| value == new_index)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RandomizationResult {
    pub question_number: u32,
    pub strategy: Strategy,
    pub seed: Seed,
    pub randomized_options: Vec<AnswerOption>,
    pub option_map: OptionMap,
    pub original_correct_index: usize,
    pub new_correct_index: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RandomizationSession {
    pub manifest_version: u32,
    pub session_id: String,
    pub created_at: String,
    pub exam_sha256: String,
    pub seed: Seed,
    pub strategy: Strategy,
    pub results: Vec<RandomizationResult>,
}

/// Question number → correct ordinal.
pub type AnswerKey = BTreeMap<u32, u8>;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceInfo {
    pub path: String,
    pub sha256: String,
    pub char_count: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RejectedRecord {
    pub number: u32,
    pub errors: Vec<String>,
    pub source_offsets: SourceOffsets,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordWarnings {
    pub number: u32,
    pub warnings: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExamCounts {
    pub blocks_scanned: usize,
    pub questions_accepted: usize,
    pub blocks_skipped: usize,
    pub records_rejected: usize,
    pub records_with_warnings: usize,
    pub passages_detected: usize,
    pub questions_with_passage: usize,
    pub questions_with_table: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExamManifest {
    pub manifest_version: u32,
    pub generated_at: String,
    pub source: SourceInfo,
    pub counts: ExamCounts,
    pub questions: Vec<QuestionRecord>,
    pub passages: Vec<Passage>,
    pub skipped: Vec<SkippedBlock>,
    pub rejected: Vec<RejectedRecord>,
    pub warnings: Vec<RecordWarnings>,
}

/// Presented 1-based position chosen per question number.
pub type Responses = BTreeMap<u32, usize>;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoredResponse {
    pub question_number: u32,
    pub presented_position: usize,
    pub original_index: Option<usize>,
    pub canonical_ordinal: Option<u8>,
    pub correct: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoreReport {
    pub session_id: String,
    pub generated_at: String,
    pub answered: usize,
    pub correct: usize,
    pub unanswered: Vec<u32>,
    pub responses: Vec<ScoredResponse>,
}
