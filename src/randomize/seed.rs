use std::fmt;
use std::str::FromStr;

use rand::Rng;
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};

pub const SEED_HEX_LEN: usize = 32;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SeedError {
    #[error("seed must be exactly {len} hex characters, got {0}", len = SEED_HEX_LEN)]
    InvalidLength(usize),
    #[error("seed contains a non-hex character: {0:?}")]
    InvalidHex(char),
}

/// 128-bit reproducibility token, rendered as 32 lowercase hex characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Seed(u128);

impl Seed {
    pub fn from_u128(value: u128) -> Self {
        Self(value)
    }

    /// Draws a fresh seed from the thread-local CSPRNG.
    pub fn generate() -> Self {
        Self(rand::rng().random::<u128>())
    }

    /// Deterministic generator for this seed: the big-endian bytes of the
    /// integer fill the first half of the 32-byte key, the rest stays zero.
    pub fn rng(self) -> StdRng {
        let mut key = [0_u8; 32];
        key[..16].copy_from_slice(&self.0.to_be_bytes());
        StdRng::from_seed(key)
    }
}

impl fmt::Display for Seed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:032x}", self.0)
    }
}

impl FromStr for Seed {
    type Err = SeedError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let trimmed = input.trim();
        let char_count = trimmed.chars().count();
        if char_count != SEED_HEX_LEN {
            return Err(SeedError::InvalidLength(char_count));
        }
        if let Some(bad) = trimmed.chars().find(|character| !character.is_ascii_hexdigit()) {
            return Err(SeedError::InvalidHex(bad));
        }

        u128::from_str_radix(trimmed, 16)
            .map(Self)
            .map_err(|_| SeedError::InvalidLength(char_count))
    }
}

impl TryFrom<String> for Seed {
    type Error = SeedError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Seed> for String {
    fn from(seed: Seed) -> Self {
        seed.to_string()
    }
}
