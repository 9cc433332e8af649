use std::collections::HashMap;

use anyhow::{Context, Result, bail};
use tracing::{info, warn};

use crate::cli::ScoreArgs;
use crate::model::{
    ExamManifest, QuestionRecord, RandomizationSession, Responses, ScoreReport, ScoredResponse,
};
use crate::randomize::restore_original_order;
use crate::util::{now_utc_string, read_json, write_json_pretty};

pub fn run(args: ScoreArgs) -> Result<()> {
    let session: RandomizationSession = read_json(&args.session)?;
    let manifest: ExamManifest = read_json(&args.exam)?;
    let responses: Responses = read_json(&args.responses)?;

    if manifest.source.sha256 != session.exam_sha256 {
        bail!(
            "session {} does not belong to exam {}",
            session.session_id,
            args.exam.display()
        );
    }

    let report = score_session(&session, &manifest.questions, &responses)?;
    info!(
        session_id = %report.session_id,
        answered = report.answered,
        correct = report.correct,
        unanswered = report.unanswered.len(),
        "scoring completed"
    );

    match &args.output {
        Some(path) => {
            write_json_pretty(path, &report)?;
            info!(path = %path.display(), "score report written");
        }
        None => {
            let rendered =
                serde_json::to_string_pretty(&report).context("failed to render score report")?;
            println!("{rendered}");
        }
    }

    Ok(())
}

/// Maps each presented 1-based position back through the session's option
/// map to the canonical option of the exam question.
pub fn score_session(
    session: &RandomizationSession,
    questions: &[QuestionRecord],
    responses: &Responses,
) -> Result<ScoreReport> {
    let by_number = questions
        .iter()
        .map(|question| (question.number, question))
        .collect::<HashMap<u32, &QuestionRecord>>();

    let mut scored = Vec::<ScoredResponse>::new();
    let mut unanswered = Vec::<u32>::new();

    for result in &session.results {
        let number = result.question_number;
        let Some(&presented_position) = responses.get(&number) else {
            unanswered.push(number);
            continue;
        };
        let Some(question) = by_number.get(&number) else {
            bail!("question {number} of session {} is not in the exam", session.session_id);
        };

        let restored = restore_original_order(&result.randomized_options, &result.option_map)
            .with_context(|| format!("option map for question {number} is unusable"))?;
        let restored_keys = restored.iter().map(|option| option.key());
        if !restored_keys.eq(question.options.iter().map(|option| option.key())) {
            bail!("session options for question {number} do not match the exam");
        }

        let original_index = presented_position
            .checked_sub(1)
            .and_then(|new_index| result.option_map.original_index_of(new_index));
        let canonical = original_index.and_then(|index| question.options.get(index));
        if canonical.is_none() {
            warn!(
                question = number,
                position = presented_position,
                options = restored.len(),
                "response position is outside the presented options"
            );
        }

        scored.push(ScoredResponse {
            question_number: number,
            presented_position,
            original_index,
            canonical_ordinal: canonical.map(|option| option.ordinal),
            correct: canonical.is_some_and(|option| option.is_correct),
        });
    }

    for number in responses.keys() {
        if !session.results.iter().any(|result| result.question_number == *number) {
            warn!(question = number, "response for a question outside the session ignored");
        }
    }

    Ok(ScoreReport {
        session_id: session.session_id.clone(),
        generated_at: now_utc_string(),
        answered: scored.len(),
        correct: scored.iter().filter(|response| response.correct).count(),
        unanswered,
        responses: scored,
    })
}
