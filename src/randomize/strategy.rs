use std::fmt;

use serde::{Deserialize, Serialize};

/// Randomization policy. Names outside the three known ones are kept
/// verbatim and shuffle nothing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Strategy {
    #[default]
    FullRandom,
    ConstrainedRandom,
    BlockRandom,
    Unrecognized(String),
}

impl Strategy {
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "full-random" | "full" => Self::FullRandom,
            "constrained-random" | "constrained" => Self::ConstrainedRandom,
            "block-random" | "block" => Self::BlockRandom,
            _ => Self::Unrecognized(name.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::FullRandom => "full-random",
            Self::ConstrainedRandom => "constrained-random",
            Self::BlockRandom => "block-random",
            Self::Unrecognized(name) => name,
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<String> for Strategy {
    fn from(name: String) -> Self {
        Self::from_name(&name)
    }
}

impl From<Strategy> for String {
    fn from(strategy: Strategy) -> Self {
        strategy.as_str().to_string()
    }
}
