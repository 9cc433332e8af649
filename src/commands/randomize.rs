use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::Utc;
use tracing::{info, warn};

use crate::cli::RandomizeArgs;
use crate::commands::MANIFEST_VERSION;
use crate::commands::store::{open_store, record_session};
use crate::model::{ExamManifest, RandomizationSession};
use crate::randomize::{AnswerRandomizer, Seed, Strategy};
use crate::util::{now_utc_string, read_json, utc_compact_string, write_json_pretty};
use crate::validate::QuestionRecordValidator;

pub fn run(args: RandomizeArgs) -> Result<()> {
    let manifest: ExamManifest = read_json(&args.exam)?;
    let strategy = Strategy::from_name(&args.strategy);
    let seed = args
        .seed
        .as_deref()
        .map(str::parse::<Seed>)
        .transpose()
        .context("invalid --seed value")?;

    if let Strategy::Unrecognized(name) = &strategy {
        info!(strategy = %name, "unrecognized strategy; options keep their original order");
    }

    let incomplete = manifest
        .questions
        .iter()
        .filter(|question| !QuestionRecordValidator::quick_validate(question))
        .map(|question| question.number)
        .collect::<Vec<u32>>();
    if !incomplete.is_empty() {
        warn!(questions = ?incomplete, "exam holds questions without body or options");
    }

    let session = build_session(&manifest, strategy, seed)?;
    info!(
        session_id = %session.session_id,
        seed = %session.seed,
        strategy = %session.strategy,
        questions = session.results.len(),
        "randomization completed"
    );

    let output = args
        .output
        .clone()
        .unwrap_or_else(|| PathBuf::from(format!("{}.json", session.session_id)));
    write_json_pretty(&output, &session)?;
    info!(path = %output.display(), "session written");

    if let Some(db_path) = &args.db_path {
        let mut connection = open_store(db_path)?;
        record_session(&mut connection, &session)?;
        info!(path = %db_path.display(), session_id = %session.session_id, "session stored for audit");
    }

    Ok(())
}

/// Randomizes every accepted question of the manifest with one generator.
pub fn build_session(
    manifest: &ExamManifest,
    strategy: Strategy,
    seed: Option<Seed>,
) -> Result<RandomizationSession> {
    let mut randomizer = AnswerRandomizer::new(strategy, seed);
    let results = randomizer
        .randomize_exam(&manifest.questions)
        .context("failed to randomize exam questions")?;

    let seed = randomizer.seed();
    let seed_hex = seed.to_string();
    let session_id = format!(
        "session-{}-{}",
        utc_compact_string(Utc::now()),
        &seed_hex[..8]
    );

    Ok(RandomizationSession {
        manifest_version: MANIFEST_VERSION,
        session_id,
        created_at: now_utc_string(),
        exam_sha256: manifest.source.sha256.clone(),
        seed,
        strategy: randomizer.strategy().clone(),
        results,
    })
}
