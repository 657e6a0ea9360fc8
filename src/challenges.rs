//! Challenge descriptors and the registry that maps indices and names to generator
//! constructions.

use std::collections::HashMap;
use std::ops::RangeInclusive;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::generator;
use crate::machine::Machine;
use crate::types::{PuzzleError, Rule, State, Symbol, Tape, MAX_CHALLENGE_INDEX};

/// Challenge names by index. A name identifies a challenge across reloads, so it must never
/// depend on the randomized content of an instance.
pub const CHALLENGE_NAMES: [&str; MAX_CHALLENGE_INDEX + 1] = [
    "Getting Started",
    "Go Right",
    "Deletion",
    "All On",
    "Alternator",
    "Sequencer",
    "Bit flipper",
    "There and back",
    "Carry the one",
    "Binary Add 1",
    "Compression",
    "Duplicator",
    "Sort",
    "Modulo 3",
    "Binary Counter",
    "Inverse Counter",
    "Bit shifter",
    "Copier",
    "Palindrome",
    "XOR",
    "Mode",
    "Addition",
    "Greater than or equal",
    "Bisect",
    "Trisect",
];

lazy_static::lazy_static! {
    static ref NAME_INDEX: HashMap<&'static str, usize> = CHALLENGE_NAMES
        .iter()
        .enumerate()
        .map(|(index, name)| (*name, index))
        .collect();
}

/// One concrete instance of a puzzle family.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Challenge {
    pub name: String,
    pub start_tape: Tape,
    pub goal_tape: Tape,
    pub start_index: usize,
    pub start_state: State,
    /// The highest state a rule may originate from.
    pub max_state: State,
    /// The alphabet offered to the rule author. Always contains the blank symbol.
    pub allowed_characters: Vec<Symbol>,
    pub hints: Vec<String>,
    /// Whether the machine must finish in `max_state + 1`.
    pub requires_end_state: bool,
    /// Display glyphs for states, indexed by state.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_states: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tutorial_tip: Option<String>,
}

impl Challenge {
    /// Returns the state the machine must end in, if this challenge requires one.
    pub fn final_state(&self) -> Option<State> {
        self.requires_end_state.then_some(self.max_state + 1)
    }

    /// Returns the states a rule may originate from.
    pub fn origin_states(&self) -> RangeInclusive<State> {
        0..=self.max_state
    }

    /// Returns the states a rule may transition to, including the final state when required.
    pub fn target_states(&self) -> RangeInclusive<State> {
        0..=self.final_state().unwrap_or(self.max_state)
    }

    /// Returns the display label of `state`: a custom glyph when the challenge defines one,
    /// otherwise `q<n>`.
    pub fn state_label(&self, state: State) -> String {
        self.custom_states
            .as_ref()
            .and_then(|labels| labels.get(state as usize))
            .cloned()
            .unwrap_or_else(|| format!("q{state}"))
    }

    /// Builds a fresh machine positioned at this instance's start configuration.
    pub fn machine<'r>(&self, rules: &'r [Rule]) -> Machine<'r> {
        Machine::new(rules, &self.start_tape, self.start_index, self.start_state)
    }

    /// Checks whether `rules` solve this particular instance.
    pub fn is_solved_by(&self, rules: &[Rule]) -> bool {
        self.machine(rules)
            .solve(&self.goal_tape, self.final_state())
    }
}

/// Generates a fresh instance of the challenge at `index` using the thread-local generator.
///
/// # Returns
///
/// * `Ok(Challenge)` for indices in `0..=MAX_CHALLENGE_INDEX`.
/// * `Err(PuzzleError::ChallengeNotFound)` otherwise.
pub fn generate_challenge(index: usize) -> Result<Challenge, PuzzleError> {
    generate_challenge_with(index, &mut rand::thread_rng())
}

/// Generates a fresh instance of the challenge at `index`, drawing from `rng`.
pub fn generate_challenge_with<R: Rng + ?Sized>(
    index: usize,
    rng: &mut R,
) -> Result<Challenge, PuzzleError> {
    generator::build(index, rng).ok_or(PuzzleError::ChallengeNotFound(index))
}

/// Resolves a challenge name to its index.
pub fn challenge_name_to_index(name: &str) -> Result<usize, PuzzleError> {
    NAME_INDEX
        .get(name)
        .copied()
        .ok_or_else(|| PuzzleError::UnknownChallenge(name.to_string()))
}

/// Returns the number of available challenges.
pub fn challenge_count() -> usize {
    CHALLENGE_NAMES.len()
}

/// Resolves a user-supplied reference, either an index or a challenge name.
pub fn resolve_challenge(reference: &str) -> Result<usize, PuzzleError> {
    let reference = reference.trim();
    match reference.parse::<usize>() {
        Ok(index) if index <= MAX_CHALLENGE_INDEX => Ok(index),
        Ok(index) => Err(PuzzleError::ChallengeNotFound(index)),
        Err(_) => challenge_name_to_index(reference),
    }
}
