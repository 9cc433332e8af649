use anyhow::{Result, bail};
use tracing::{info, warn};

use crate::cli::AuditArgs;
use crate::commands::store::{list_sessions, load_session, open_store};

pub fn run(args: AuditArgs) -> Result<()> {
    if !args.db_path.exists() {
        bail!("audit store not found: {}", args.db_path.display());
    }
    let connection = open_store(&args.db_path)?;

    let Some(session_id) = &args.session_id else {
        let sessions = list_sessions(&connection)?;
        if sessions.is_empty() {
            warn!(path = %args.db_path.display(), "audit store holds no sessions");
        }
        for session in &sessions {
            info!(
                session_id = %session.session_id,
                created_at = %session.created_at,
                exam_sha256 = %session.exam_sha256,
                seed = %session.seed,
                strategy = %session.strategy,
                questions = session.question_count,
                "stored session"
            );
        }
        info!(sessions = sessions.len(), "audit listing completed");
        return Ok(());
    };

    let session = load_session(&connection, session_id)?;
    info!(
        session_id = %session.session_id,
        created_at = %session.created_at,
        exam_sha256 = %session.exam_sha256,
        seed = %session.seed,
        strategy = %session.strategy,
        questions = session.results.len(),
        "loaded session"
    );
    for result in &session.results {
        info!(
            question = result.question_number,
            option_map = ?result.option_map,
            original_correct_index = result.original_correct_index,
            new_correct_index = result.new_correct_index,
            "stored result"
        );
    }

    Ok(())
}
