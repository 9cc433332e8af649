use std::ops::RangeInclusive;

use rand::rngs::StdRng;
use tracing::{debug, error};

use crate::model::{AnswerOption, OptionKey, OptionMap, QuestionRecord, RandomizationResult};

mod seed;
mod shuffle;
mod strategy;

pub use seed::Seed;
pub use shuffle::{DrawSource, fisher_yates};
pub use strategy::Strategy;

const CONSTRAINED_MAX_ATTEMPTS: usize = 10;
const CONSTRAINED_POSITIONS: RangeInclusive<usize> = 1..=3;

#[derive(Debug, thiserror::Error)]
pub enum RandomizeError {
    #[error("option map invariant violated: {key} resolved to {matches} randomized positions")]
    InvariantViolation { key: OptionKey, matches: usize },
    #[error("option map does not fit {options} randomized options: {reason}")]
    MapMismatch { options: usize, reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShuffleOutcome {
    pub randomized_options: Vec<AnswerOption>,
    pub option_map: OptionMap,
    pub original_correct_index: usize,
    pub new_correct_index: usize,
}

/// Seeded option shuffler. One instance owns one generator; every call
/// advances it, so a batch must go through the same instance in order.
#[derive(Debug)]
pub struct AnswerRandomizer<R = StdRng> {
    strategy: Strategy,
    seed: Seed,
    source: R,
}

impl AnswerRandomizer<StdRng> {
    /// Uses `seed` when given, otherwise draws a fresh one.
    pub fn new(strategy: Strategy, seed: Option<Seed>) -> Self {
        let seed = seed.unwrap_or_else(Seed::generate);
        Self {
            strategy,
            seed,
            source: seed.rng(),
        }
    }

    pub fn from_seed(seed: Seed, strategy: Strategy) -> Self {
        Self::new(strategy, Some(seed))
    }

    /// Fresh generator in the same state as the original session's start.
    pub fn reconstruct(seed: Seed, strategy: Strategy) -> Self {
        Self::from_seed(seed, strategy)
    }
}

impl<R: DrawSource> AnswerRandomizer<R> {
    #[cfg(test)]
    pub fn with_source(strategy: Strategy, seed: Seed, source: R) -> Self {
        Self {
            strategy,
            seed,
            source,
        }
    }

    pub fn strategy(&self) -> &Strategy {
        &self.strategy
    }

    pub fn seed(&self) -> Seed {
        self.seed
    }

    pub fn randomize(&mut self, options: &[AnswerOption]) -> Result<ShuffleOutcome, RandomizeError> {
        if options.is_empty() {
            return Ok(ShuffleOutcome {
                randomized_options: Vec::new(),
                option_map: OptionMap::default(),
                original_correct_index: 0,
                new_correct_index: 0,
            });
        }

        let randomized_options = self.permute(options);
        let option_map = build_option_map(options, &randomized_options)?;
        let original_correct_index = options
            .iter()
            .position(|option| option.is_correct)
            .unwrap_or(0);
        let new_correct_index = option_map.get(original_correct_index).unwrap_or(0);

        Ok(ShuffleOutcome {
            randomized_options,
            option_map,
            original_correct_index,
            new_correct_index,
        })
    }

    pub fn randomize_question(
        &mut self,
        question: &QuestionRecord,
    ) -> Result<RandomizationResult, RandomizeError> {
        let outcome = self.randomize(&question.options).inspect_err(|err| {
            error!(number = question.number, error = %err, "randomization failed");
        })?;

        Ok(RandomizationResult {
            question_number: question.number,
            strategy: self.strategy.clone(),
            seed: self.seed,
            randomized_options: outcome.randomized_options,
            option_map: outcome.option_map,
            original_correct_index: outcome.original_correct_index,
            new_correct_index: outcome.new_correct_index,
        })
    }

    /// Randomizes every question with the one generator, in list order.
    pub fn randomize_exam(
        &mut self,
        questions: &[QuestionRecord],
    ) -> Result<Vec<RandomizationResult>, RandomizeError> {
        questions
            .iter()
            .map(|question| self.randomize_question(question))
            .collect()
    }

    fn permute(&mut self, options: &[AnswerOption]) -> Vec<AnswerOption> {
        match self.strategy.clone() {
            Strategy::FullRandom => self.full_shuffle(options),
            Strategy::ConstrainedRandom => self.constrained_shuffle(options),
            Strategy::BlockRandom => self.block_shuffle(options),
            Strategy::Unrecognized(name) => {
                debug!(strategy = %name, "unknown strategy keeps original order");
                options.to_vec()
            }
        }
    }

    fn full_shuffle(&mut self, options: &[AnswerOption]) -> Vec<AnswerOption> {
        let mut shuffled = options.to_vec();
        fisher_yates(&mut shuffled, &mut self.source);
        shuffled
    }

    /// Retries for the correct option to land in positions 1..=3; after the
    /// last failed attempt one more shuffle is taken as is.
    fn constrained_shuffle(&mut self, options: &[AnswerOption]) -> Vec<AnswerOption> {
        let Some(correct_key) = options
            .iter()
            .find(|option| option.is_correct)
            .map(AnswerOption::key)
        else {
            return self.full_shuffle(options);
        };

        for _ in 0..CONSTRAINED_MAX_ATTEMPTS {
            let shuffled = self.full_shuffle(options);
            if let Some(position) = shuffled.iter().position(|option| option.key() == correct_key)
                && CONSTRAINED_POSITIONS.contains(&position)
            {
                return shuffled;
            }
        }

        debug!(
            attempts = CONSTRAINED_MAX_ATTEMPTS,
            "position constraint unmet, accepting final shuffle"
        );
        self.full_shuffle(options)
    }

    /// Five options split 3+2, four split 2+2; each block is shuffled and a
    /// coin decides which block leads. Other counts get a full shuffle.
    fn block_shuffle(&mut self, options: &[AnswerOption]) -> Vec<AnswerOption> {
        let split = match options.len() {
            5 => 3,
            4 => 2,
            _ => return self.full_shuffle(options),
        };

        let mut first = options[..split].to_vec();
        let mut second = options[split..].to_vec();
        fisher_yates(&mut first, &mut self.source);
        fisher_yates(&mut second, &mut self.source);

        if self.source.coin_flip() {
            first.extend(second);
            first
        } else {
            second.extend(first);
            second
        }
    }
}

fn build_option_map(
    original: &[AnswerOption],
    randomized: &[AnswerOption],
) -> Result<OptionMap, RandomizeError> {
    let mut entries = Vec::<usize>::with_capacity(original.len());

    for option in original {
        let key = option.key();
        let positions = randomized
            .iter()
            .enumerate()
            .filter(|(_, candidate)| candidate.key() == key)
            .map(|(index, _)| index)
            .collect::<Vec<usize>>();

        let [new_index] = positions.as_slice() else {
            error!(
                key = %key,
                matches = positions.len(),
                "option identity did not resolve to exactly one position"
            );
            return Err(RandomizeError::InvariantViolation {
                key,
                matches: positions.len(),
            });
        };
        entries.push(*new_index);
    }

    Ok(OptionMap::new(entries))
}

/// Puts randomized options back in original order using the map.
pub fn restore_original_order(
    randomized_options: &[AnswerOption],
    option_map: &OptionMap,
) -> Result<Vec<AnswerOption>, RandomizeError> {
    let options = randomized_options.len();
    if option_map.len() != options {
        return Err(RandomizeError::MapMismatch {
            options,
            reason: format!("map has {} entries", option_map.len()),
        });
    }
    if !option_map.is_bijection() {
        return Err(RandomizeError::MapMismatch {
            options,
            reason: "map is not a permutation".to_string(),
        });
    }

    let mut restored = vec![None; options];
    for (original_index, new_index) in option_map.pairs() {
        restored[original_index] = randomized_options.get(new_index).cloned();
    }

    restored
        .into_iter()
        .collect::<Option<Vec<AnswerOption>>>()
        .ok_or_else(|| RandomizeError::MapMismatch {
            options,
            reason: "map left a position unfilled".to_string(),
        })
}
