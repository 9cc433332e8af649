use anyhow::Result;
use tracing::{debug, warn};

use crate::model::{
    AnswerKey, ExamCounts, Passage, QuestionRecord, RecordWarnings, RejectedRecord, SkippedBlock,
};
use crate::passage::{DEFAULT_SHORT_QUESTION_CHARS, PassageAssociator, PassageDetector};
use crate::segment::{Segmenter, apply_answer_key};
use crate::validate::QuestionRecordValidator;


#[derive(Debug, Clone, Copy)]
pub struct PipelineOptions {
    pub short_question_chars: usize,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            short_question_chars: DEFAULT_SHORT_QUESTION_CHARS,
        }
    }
}

#[derive(Debug, Default)]
pub struct DocumentOutcome {
    pub counts: ExamCounts,
    pub questions: Vec<QuestionRecord>,
    pub passages: Vec<Passage>,
    pub skipped: Vec<SkippedBlock>,
    pub rejected: Vec<RejectedRecord>,
    pub warnings: Vec<RecordWarnings>,
}

/// Segment, key, attach passages, validate. Holds no I/O.
#[derive(Debug)]
pub struct DocumentPipeline {
    segmenter: Segmenter,
    detector: PassageDetector,
    associator: PassageAssociator,
    validator: QuestionRecordValidator,
}

impl DocumentPipeline {
    pub fn new(options: &PipelineOptions) -> Result<Self> {
        Ok(Self {
            segmenter: Segmenter::new()?,
            detector: PassageDetector::new()?,
            associator: PassageAssociator::new(options.short_question_chars),
            validator: QuestionRecordValidator::new()?,
        })
    }

    pub fn process(&self, text: &str, answer_key: Option<&AnswerKey>) -> DocumentOutcome {
        let segmented = self.segmenter.segment(text);
        let mut records = segmented.records;

        if let Some(answer_key) = answer_key {
            let unmatched = apply_answer_key(&mut records, answer_key);
            if !unmatched.is_empty() {
                debug!(questions = ?unmatched, "answer key ordinals without a matching option");
            }
        }

        let passages = self.detector.detect(text);
        let attached = self.associator.associate(&mut records, &passages);
        debug!(passages = passages.len(), attached, "passages associated");

        let mut outcome = DocumentOutcome {
            passages,
            skipped: segmented.skipped,
            ..DocumentOutcome::default()
        };

        for record in records {
            let keyed_ordinal = answer_key.and_then(|key| key.get(&record.number).copied());
            let report = self.validator.validate(&record, keyed_ordinal);

            if !report.valid {
                let errors = report
                    .errors
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<String>>();
                warn!(number = record.number, errors = ?errors, "rejecting question record");
                outcome.rejected.push(RejectedRecord {
                    number: record.number,
                    errors,
                    source_offsets: record.source_offsets,
                });
                continue;
            }

            if !report.warnings.is_empty() {
                outcome.warnings.push(RecordWarnings {
                    number: record.number,
                    warnings: report.warnings.iter().map(ToString::to_string).collect(),
                });
            }
            outcome.questions.push(record);
        }

        outcome.counts = ExamCounts {
            blocks_scanned: segmented.blocks_scanned,
            questions_accepted: outcome.questions.len(),
            blocks_skipped: outcome.skipped.len(),
            records_rejected: outcome.rejected.len(),
            records_with_warnings: outcome.warnings.len(),
            passages_detected: outcome.passages.len(),
            questions_with_passage: outcome
                .questions
                .iter()
                .filter(|question| question.passage_id.is_some())
                .count(),
            questions_with_table: outcome
                .questions
                .iter()
                .filter(|question| question.has_table)
                .count(),
        };

        outcome
    }
}
