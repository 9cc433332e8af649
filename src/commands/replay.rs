use anyhow::{Context, Result, bail};
use tracing::{info, warn};

use crate::cli::ReplayArgs;
use crate::commands::store::{load_session, open_store};
use crate::model::{ExamManifest, RandomizationSession};
use crate::randomize::AnswerRandomizer;
use crate::util::read_json;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplayReport {
    pub compared: usize,
    pub diverged: Vec<u32>,
}

pub fn run(args: ReplayArgs) -> Result<()> {
    let manifest: ExamManifest = read_json(&args.exam)?;

    let session: RandomizationSession = match (&args.session, &args.db_path, &args.session_id) {
        (Some(path), _, _) => read_json(path)?,
        (None, Some(db_path), Some(session_id)) => {
            if !db_path.exists() {
                bail!("audit store not found: {}", db_path.display());
            }
            load_session(&open_store(db_path)?, session_id)?
        }
        _ => bail!("replay needs --session, or --db-path together with --session-id"),
    };

    let report = verify_replay(&manifest, &session)?;
    if !report.diverged.is_empty() {
        for number in &report.diverged {
            warn!(question = number, "regenerated result differs from stored result");
        }
        bail!(
            "replay of session {} diverged on {} of {} question(s)",
            session.session_id,
            report.diverged.len(),
            report.compared
        );
    }

    info!(
        session_id = %session.session_id,
        seed = %session.seed,
        strategy = %session.strategy,
        questions = report.compared,
        "replay reproduced the stored session"
    );
    Ok(())
}

/// Rebuilds the generator from the session's seed and strategy, reruns the
/// exam, and compares every result through its JSON form.
pub fn verify_replay(
    manifest: &ExamManifest,
    session: &RandomizationSession,
) -> Result<ReplayReport> {
    if manifest.source.sha256 != session.exam_sha256 {
        bail!(
            "session {} was produced from exam {}, not {}",
            session.session_id,
            session.exam_sha256,
            manifest.source.sha256
        );
    }

    let regenerated = AnswerRandomizer::reconstruct(session.seed, session.strategy.clone())
        .randomize_exam(&manifest.questions)
        .context("failed to regenerate session results")?;

    if regenerated.len() != session.results.len() {
        bail!(
            "session has {} result(s) but the exam yields {}",
            session.results.len(),
            regenerated.len()
        );
    }

    let mut diverged = Vec::<u32>::new();
    for (stored, fresh) in session.results.iter().zip(&regenerated) {
        let stored_json =
            serde_json::to_string(stored).context("failed to serialize stored result")?;
        let fresh_json =
            serde_json::to_string(fresh).context("failed to serialize regenerated result")?;
        if stored_json != fresh_json {
            diverged.push(stored.question_number);
        }
    }

    Ok(ReplayReport {
        compared: regenerated.len(),
        diverged,
    })
}
