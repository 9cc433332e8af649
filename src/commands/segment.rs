use anyhow::Result;
use tracing::{debug, info};

use crate::cli::SegmentArgs;
use crate::commands::MANIFEST_VERSION;
use crate::model::{AnswerKey, ExamManifest, SourceInfo};
use crate::pipeline::{DocumentPipeline, PipelineOptions};
use crate::util::{now_utc_string, read_json, read_text, sha256_bytes, write_json_pretty};

pub fn run(args: SegmentArgs) -> Result<()> {
    let text = read_text(&args.input)?;
    let answer_key = args
        .answer_key
        .as_deref()
        .map(read_json::<AnswerKey>)
        .transpose()?;

    info!(
        input = %args.input.display(),
        chars = text.chars().count(),
        keyed_questions = answer_key.as_ref().map_or(0, |key| key.len()),
        "segmentation started"
    );

    let options = PipelineOptions {
        short_question_chars: args.short_question_chars,
    };
    let pipeline = DocumentPipeline::new(&options)?;
    let outcome = pipeline.process(&text, answer_key.as_ref());

    let manifest = ExamManifest {
        manifest_version: MANIFEST_VERSION,
        generated_at: now_utc_string(),
        source: SourceInfo {
            path: args.input.display().to_string(),
            sha256: sha256_bytes(text.as_bytes()),
            char_count: text.chars().count(),
        },
        counts: outcome.counts,
        questions: outcome.questions,
        passages: outcome.passages,
        skipped: outcome.skipped,
        rejected: outcome.rejected,
        warnings: outcome.warnings,
    };

    info!(
        blocks = manifest.counts.blocks_scanned,
        questions = manifest.counts.questions_accepted,
        skipped = manifest.counts.blocks_skipped,
        rejected = manifest.counts.records_rejected,
        warnings = manifest.counts.records_with_warnings,
        passages = manifest.counts.passages_detected,
        with_passage = manifest.counts.questions_with_passage,
        with_table = manifest.counts.questions_with_table,
        "segmentation completed"
    );

    for skipped in &manifest.skipped {
        debug!(
            number = skipped.number,
            start = skipped.source_offsets.start,
            reason = %skipped.reason,
            "block skipped"
        );
    }

    let unkeyed = manifest
        .questions
        .iter()
        .filter(|question| question.correct_index().is_none())
        .count();
    if answer_key.is_some() && unkeyed > 0 {
        info!(questions = unkeyed, "accepted questions without a keyed answer");
    }

    if args.dry_run {
        info!("dry run requested; exam manifest not written");
        return Ok(());
    }

    write_json_pretty(&args.output, &manifest)?;
    info!(path = %args.output.display(), "exam manifest written");

    Ok(())
}
