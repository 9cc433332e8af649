use std::path::Path;

use anyhow::{Context, Result, bail};
use rusqlite::{Connection, OptionalExtension, params};
use tracing::debug;

use crate::model::{RandomizationResult, RandomizationSession};
use crate::randomize::{Seed, Strategy};
use crate::util::{ensure_directory, now_utc_string};

const DB_SCHEMA_VERSION: &str = "0.1.0";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSummary {
    pub session_id: String,
    pub created_at: String,
    pub exam_sha256: String,
    pub seed: String,
    pub strategy: String,
    pub question_count: usize,
}

pub fn open_store(db_path: &Path) -> Result<Connection> {
    if let Some(parent) = db_path.parent()
        && !parent.as_os_str().is_empty()
    {
        ensure_directory(parent)?;
    }

    let connection = Connection::open(db_path)
        .with_context(|| format!("failed to open {}", db_path.display()))?;
    configure_connection(&connection)?;
    ensure_schema(&connection)?;
    Ok(connection)
}

fn configure_connection(connection: &Connection) -> Result<()> {
    connection
        .pragma_update(None, "journal_mode", "WAL")
        .context("failed to set journal_mode=WAL")?;
    connection
        .pragma_update(None, "synchronous", "NORMAL")
        .context("failed to set synchronous=NORMAL")?;
    Ok(())
}

fn ensure_schema(connection: &Connection) -> Result<()> {
    connection
        .execute_batch(
            "
            CREATE TABLE IF NOT EXISTS metadata (
              key TEXT PRIMARY KEY,
              value TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS sessions (
              session_id TEXT PRIMARY KEY,
              manifest_version INTEGER NOT NULL,
              created_at TEXT NOT NULL,
              exam_sha256 TEXT NOT NULL,
              seed TEXT NOT NULL,
              strategy TEXT NOT NULL,
              question_count INTEGER NOT NULL
            );

            CREATE TABLE IF NOT EXISTS session_results (
              session_id TEXT NOT NULL,
              order_index INTEGER NOT NULL,
              question_number INTEGER NOT NULL,
              randomized_options_json TEXT NOT NULL,
              option_map_json TEXT NOT NULL,
              original_correct_index INTEGER NOT NULL,
              new_correct_index INTEGER NOT NULL,
              PRIMARY KEY(session_id, order_index),
              FOREIGN KEY(session_id) REFERENCES sessions(session_id)
            );

            CREATE INDEX IF NOT EXISTS idx_session_results_question
              ON session_results(session_id, question_number);
            ",
        )
        .context("failed to initialize audit store schema")?;

    let now = now_utc_string();
    connection.execute(
        "INSERT INTO metadata(key, value) VALUES('db_schema_version', ?1)
         ON CONFLICT(key) DO UPDATE SET value=excluded.value",
        [DB_SCHEMA_VERSION],
    )?;
    connection.execute(
        "INSERT INTO metadata(key, value) VALUES('db_updated_at', ?1)
         ON CONFLICT(key) DO UPDATE SET value=excluded.value",
        [now],
    )?;

    Ok(())
}

/// Inserts the session and its per-question results in one transaction.
/// Session ids are write-once.
pub fn record_session(connection: &mut Connection, session: &RandomizationSession) -> Result<()> {
    let tx = connection.transaction()?;

    let inserted = tx
        .execute(
            "
            INSERT INTO sessions(
              session_id, manifest_version, created_at, exam_sha256, seed, strategy, question_count
            )
            VALUES(?1, ?2, ?3, ?4, ?5, ?6, ?7)
            ON CONFLICT(session_id) DO NOTHING
            ",
            params![
                &session.session_id,
                session.manifest_version,
                &session.created_at,
                &session.exam_sha256,
                session.seed.to_string(),
                session.strategy.as_str(),
                sql_integer(session.results.len())?,
            ],
        )
        .with_context(|| format!("failed to insert session {}", session.session_id))?;
    if inserted == 0 {
        bail!("session {} is already recorded", session.session_id);
    }

    {
        let mut statement = tx.prepare(
            "
            INSERT INTO session_results(
              session_id, order_index, question_number,
              randomized_options_json, option_map_json,
              original_correct_index, new_correct_index
            )
            VALUES(?1, ?2, ?3, ?4, ?5, ?6, ?7)
            ",
        )?;

        for (order_index, result) in session.results.iter().enumerate() {
            let randomized_options_json = serde_json::to_string(&result.randomized_options)
                .context("failed to serialize randomized options")?;
            let option_map_json = serde_json::to_string(&result.option_map)
                .context("failed to serialize option map")?;

            statement.execute(params![
                &session.session_id,
                sql_integer(order_index)?,
                result.question_number,
                randomized_options_json,
                option_map_json,
                sql_integer(result.original_correct_index)?,
                sql_integer(result.new_correct_index)?,
            ])?;
        }
    }

    tx.commit()?;
    debug!(
        session_id = %session.session_id,
        results = session.results.len(),
        "session recorded"
    );
    Ok(())
}

pub fn load_session(connection: &Connection, session_id: &str) -> Result<RandomizationSession> {
    let header = connection
        .query_row(
            "
            SELECT manifest_version, created_at, exam_sha256, seed, strategy
            FROM sessions
            WHERE session_id = ?1
            ",
            [session_id],
            |row| {
                Ok((
                    row.get::<_, u32>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, String>(3)?,
                    row.get::<_, String>(4)?,
                ))
            },
        )
        .optional()
        .with_context(|| format!("failed to query session {session_id}"))?;

    let Some((manifest_version, created_at, exam_sha256, seed, strategy)) = header else {
        bail!("session {session_id} not found in audit store");
    };

    let seed = seed
        .parse::<Seed>()
        .with_context(|| format!("stored seed for session {session_id} is malformed"))?;
    let strategy = Strategy::from_name(&strategy);

    let mut statement = connection.prepare(
        "
        SELECT question_number, randomized_options_json, option_map_json,
               original_correct_index, new_correct_index
        FROM session_results
        WHERE session_id = ?1
        ORDER BY order_index
        ",
    )?;
    let mut rows = statement.query([session_id])?;

    let mut results = Vec::<RandomizationResult>::new();
    while let Some(row) = rows.next()? {
        let question_number: u32 = row.get(0)?;
        let randomized_options_json: String = row.get(1)?;
        let option_map_json: String = row.get(2)?;

        results.push(RandomizationResult {
            question_number,
            strategy: strategy.clone(),
            seed,
            randomized_options: serde_json::from_str(&randomized_options_json).with_context(
                || format!("malformed randomized options for question {question_number}"),
            )?,
            option_map: serde_json::from_str(&option_map_json)
                .with_context(|| format!("malformed option map for question {question_number}"))?,
            original_correct_index: sql_index(row.get(3)?)?,
            new_correct_index: sql_index(row.get(4)?)?,
        });
    }

    Ok(RandomizationSession {
        manifest_version,
        session_id: session_id.to_string(),
        created_at,
        exam_sha256,
        seed,
        strategy,
        results,
    })
}

pub fn list_sessions(connection: &Connection) -> Result<Vec<SessionSummary>> {
    let mut statement = connection.prepare(
        "
        SELECT session_id, created_at, exam_sha256, seed, strategy, question_count
        FROM sessions
        ORDER BY created_at, session_id
        ",
    )?;
    let mut rows = statement.query([])?;

    let mut sessions = Vec::<SessionSummary>::new();
    while let Some(row) = rows.next()? {
        sessions.push(SessionSummary {
            session_id: row.get(0)?,
            created_at: row.get(1)?,
            exam_sha256: row.get(2)?,
            seed: row.get(3)?,
            strategy: row.get(4)?,
            question_count: sql_index(row.get(5)?)?,
        });
    }

    Ok(sessions)
}

fn sql_integer(value: usize) -> Result<i64> {
    i64::try_from(value).with_context(|| format!("{value} does not fit an SQLite integer"))
}

fn sql_index(value: i64) -> Result<usize> {
    usize::try_from(value).with_context(|| format!("stored index {value} is negative"))
}

#[cfg(test)]
pub(crate) fn open_in_memory_store() -> Result<Connection> {
    let connection = Connection::open_in_memory().context("failed to open in-memory store")?;
    ensure_schema(&connection)?;
    Ok(connection)
}
