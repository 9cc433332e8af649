use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "exam-ingest",
    version,
    about = "Exam text segmentation and seeded answer-option randomization"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    Segment(SegmentArgs),
    Randomize(RandomizeArgs),
    Replay(ReplayArgs),
    Score(ScoreArgs),
    Audit(AuditArgs),
}

#[derive(Args, Debug, Clone)]
pub struct SegmentArgs {
    #[arg(long)]
    pub input: PathBuf,

    #[arg(long)]
    pub answer_key: Option<PathBuf>,

    #[arg(long, default_value = "exam_manifest.json")]
    pub output: PathBuf,

    #[arg(long, default_value_t = 100)]
    pub short_question_chars: usize,

    #[arg(long, default_value_t = false)]
    pub dry_run: bool,
}

#[derive(Args, Debug, Clone)]
pub struct RandomizeArgs {
    #[arg(long)]
    pub exam: PathBuf,

    /// full-random, constrained-random or block-random; unknown names keep
    /// the original order.
    #[arg(long, default_value = "full-random")]
    pub strategy: String,

    /// 32 hex characters; generated when omitted.
    #[arg(long)]
    pub seed: Option<String>,

    #[arg(long)]
    pub output: Option<PathBuf>,

    #[arg(long)]
    pub db_path: Option<PathBuf>,
}

#[derive(Args, Debug, Clone)]
pub struct ReplayArgs {
    #[arg(long)]
    pub exam: PathBuf,

    #[arg(long, conflicts_with = "session_id")]
    pub session: Option<PathBuf>,

    #[arg(long, requires = "session_id")]
    pub db_path: Option<PathBuf>,

    #[arg(long, requires = "db_path")]
    pub session_id: Option<String>,
}

#[derive(Args, Debug, Clone)]
pub struct ScoreArgs {
    #[arg(long)]
    pub session: PathBuf,

    #[arg(long)]
    pub exam: PathBuf,

    #[arg(long)]
    pub responses: PathBuf,

    #[arg(long)]
    pub output: Option<PathBuf>,
}

#[derive(Args, Debug, Clone)]
pub struct AuditArgs {
    #[arg(long)]
    pub db_path: PathBuf,

    #[arg(long)]
    pub session_id: Option<String>,
}
