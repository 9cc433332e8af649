use std::collections::BTreeSet;

use anyhow::{Context, Result};
use regex::Regex;
use serde::Serialize;

use crate::model::QuestionRecord;


pub const MIN_BODY_CHARS: usize = 5;
pub const MIN_OPTIONS: usize = 2;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
#[serde(tag = "code", rename_all = "snake_case")]
pub enum ValidationError {
    #[error("question body is missing")]
    MissingBody,
    #[error("question has no options")]
    MissingOptions,
    #[error("question body has {chars} characters, need at least {min}", min = MIN_BODY_CHARS)]
    BodyTooShort { chars: usize },
    #[error("question has {count} option(s), need at least {min}", min = MIN_OPTIONS)]
    TooFewOptions { count: usize },
    #[error("option {ordinal} has empty text")]
    EmptyOptionText { ordinal: u8 },
    #[error("option ordinal {ordinal} appears more than once")]
    DuplicateOrdinal { ordinal: u8 },
    #[error("option ordinals {found:?} are not contiguous from 1")]
    NonContiguousOrdinals { found: Vec<u8> },
    #[error("answer key ordinal {ordinal} matches no option")]
    AnswerNotAmongOptions { ordinal: u8 },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
#[serde(tag = "code", rename_all = "snake_case")]
pub enum ValidationWarning {
    #[error("body does not read like a question (no '?' and no answer-selection phrase)")]
    NotPhrasedAsQuestion,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationReport {
    pub valid: bool,
    pub errors: Vec<ValidationError>,
    pub warnings: Vec<ValidationWarning>,
}

#[derive(Debug)]
pub struct QuestionRecordValidator {
    selection_phrase: Regex,
}

impl QuestionRecordValidator {
    pub fn new() -> Result<Self> {
        Ok(Self {
            selection_phrase: Regex::new(
                r"(?:옳은|옳지\s*않은|알맞은|알맞지\s*않은|적절한|적절하지\s*않은|바른|틀린|맞는|해당하는|않은|가장\s*\S+)\s*것(?:은|을|만을)",
            )
            .context("failed to compile answer-selection phrase regex")?,
        })
    }

    /// Batch gate: body and options are both present.
    pub fn quick_validate(record: &QuestionRecord) -> bool {
        !record.body.trim().is_empty() && !record.options.is_empty()
    }

    pub fn validate(&self, record: &QuestionRecord, keyed_ordinal: Option<u8>) -> ValidationReport {
        let mut errors = Vec::<ValidationError>::new();
        let mut warnings = Vec::<ValidationWarning>::new();

        let body = record.body.trim();
        let body_chars = body.chars().count();
        if body.is_empty() {
            errors.push(ValidationError::MissingBody);
        } else if body_chars < MIN_BODY_CHARS {
            errors.push(ValidationError::BodyTooShort { chars: body_chars });
        }

        if record.options.is_empty() {
            errors.push(ValidationError::MissingOptions);
        } else if record.options.len() < MIN_OPTIONS {
            errors.push(ValidationError::TooFewOptions {
                count: record.options.len(),
            });
        }

        for option in &record.options {
            if option.text.trim().is_empty() {
                errors.push(ValidationError::EmptyOptionText {
                    ordinal: option.ordinal,
                });
            }
        }

        errors.extend(check_ordinals(record));

        if let Some(ordinal) = keyed_ordinal
            && !record.options.iter().any(|option| option.ordinal == ordinal)
        {
            errors.push(ValidationError::AnswerNotAmongOptions { ordinal });
        }

        if !body.is_empty() && !body.contains('?') && !self.selection_phrase.is_match(body) {
            warnings.push(ValidationWarning::NotPhrasedAsQuestion);
        }

        ValidationReport {
            valid: errors.is_empty(),
            errors,
            warnings,
        }
    }
}

fn check_ordinals(record: &QuestionRecord) -> Vec<ValidationError> {
    let mut errors = Vec::<ValidationError>::new();
    let mut seen = BTreeSet::<u8>::new();

    for option in &record.options {
        if !seen.insert(option.ordinal) {
            errors.push(ValidationError::DuplicateOrdinal {
                ordinal: option.ordinal,
            });
        }
    }

    let contiguous = seen
        .iter()
        .enumerate()
        .all(|(index, ordinal)| usize::from(*ordinal) == index + 1);
    if !seen.is_empty() && !contiguous {
        errors.push(ValidationError::NonContiguousOrdinals {
            found: seen.into_iter().collect(),
        });
    }

    errors
}
