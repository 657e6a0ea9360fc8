//! This module defines the core data structures and types shared by the challenge generator,
//! the machine interpreter and the accuracy validator: symbols, states, rules, run outcomes
//! and error types.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::parser::Rule as GrammarRule;

/// The symbol representing an empty tape cell.
pub const BLANK: &str = "_";
/// The maximum number of transitions a single run may execute before it is abandoned.
pub const MAX_STEPS: usize = 1000;
/// The number of fresh instances a rule set must solve to count as accurate.
pub const ACCURACY_TRIALS: usize = 100;
/// The highest valid challenge index (inclusive).
pub const MAX_CHALLENGE_INDEX: usize = 24;

/// A single tape symbol. Grapheme clusters such as emoji are atomic symbols.
pub type Symbol = String;
/// An ordered, finite sequence of symbols.
pub type Tape = Vec<Symbol>;
/// A control state. `0` is the conventional start state.
pub type State = u32;

/// Represents the possible directions the head can move after a transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Move the head one cell to the left.
    Left,
    /// Move the head one cell to the right.
    Right,
}

impl Direction {
    /// Returns the signed head offset for this direction.
    pub fn offset(self) -> isize {
        match self {
            Direction::Left => -1,
            Direction::Right => 1,
        }
    }
}

/// A single transition `(state, read) -> (new_state, write, direction)`.
///
/// Serializes to the shape stored by the persistence layer:
/// `{"state":0,"read":"_","newState":0,"write":"1","direction":"right"}`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Rule {
    /// The state in which this rule may fire.
    pub state: State,
    /// The symbol that must be under the head.
    pub read: Symbol,
    /// The state the machine moves to.
    pub new_state: State,
    /// The symbol written under the head before moving.
    pub write: Symbol,
    /// The direction the head moves after writing.
    pub direction: Direction,
}

impl Rule {
    pub fn new(
        state: State,
        read: impl Into<Symbol>,
        new_state: State,
        write: impl Into<Symbol>,
        direction: Direction,
    ) -> Self {
        Self {
            state,
            read: read.into(),
            new_state,
            write: write.into(),
            direction,
        }
    }

    /// Returns the `(state, read)` pair identifying this rule within a rule set.
    pub fn key(&self) -> (State, &str) {
        (self.state, &self.read)
    }

    /// Checks whether this rule applies in `state` with `symbol` under the head.
    pub fn matches(&self, state: State, symbol: &str) -> bool {
        self.state == state && self.read == symbol
    }
}

/// How the machine treats the tape edges.
#[derive(Debug, Default, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum TapeMode {
    /// Moving past an edge leaves the head out of bounds, which ends any run.
    #[default]
    Bounded,
    /// Moving past an edge grows the tape with a blank cell. No challenge uses this mode.
    Unbounded,
}

/// The terminal outcome of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    /// The tape matched the goal (and the final state, when one is required).
    Accepted,
    /// No rule matched the current state and symbol.
    NoRule,
    /// The head left the tape.
    OutOfBounds,
    /// The run used up its transition budget.
    BudgetExceeded,
}

impl Outcome {
    pub fn is_accepted(self) -> bool {
        self == Outcome::Accepted
    }
}

impl std::fmt::Display for Outcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let text = match self {
            Outcome::Accepted => "goal reached",
            Outcome::NoRule => "no rule for this state and symbol",
            Outcome::OutOfBounds => "head moved off the tape",
            Outcome::BudgetExceeded => "too many steps",
        };
        f.write_str(text)
    }
}

/// Represents the errors that can be raised by the puzzle engine.
///
/// Gameplay failures (no matching rule, falling off the tape, running out of steps) are
/// ordinary [`Outcome`]s and never surface here.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PuzzleError {
    /// No challenge exists at the given index.
    #[error("Challenge {0} not found")]
    ChallengeNotFound(usize),
    /// No challenge carries the given name.
    #[error("Challenge {0} not found")]
    UnknownChallenge(String),
    /// A rule file could not be parsed.
    #[error("Rule parsing error: {0}")]
    ParseError(#[from] Box<pest::error::Error<GrammarRule>>),
    /// A rule set violates the constraints of a challenge.
    #[error("Rule validation error: {0}")]
    ValidationError(String),
    /// A share code could not be decoded.
    #[error("Decode error: {0}")]
    DecodeError(String),
    /// A file could not be read.
    #[error("File error: {0}")]
    FileError(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_direction_serialization() {
        let left_json = serde_json::to_string(&Direction::Left).unwrap();
        let right_json = serde_json::to_string(&Direction::Right).unwrap();

        assert_eq!(left_json, "\"left\"");
        assert_eq!(right_json, "\"right\"");

        let left: Direction = serde_json::from_str(&left_json).unwrap();
        assert_eq!(left, Direction::Left);
    }

    #[test]
    fn test_rule_serialization_matches_stored_shape() {
        let rule = Rule::new(0, BLANK, 1, "1", Direction::Right);
        let json = serde_json::to_string(&rule).unwrap();

        assert_eq!(
            json,
            r#"{"state":0,"read":"_","newState":1,"write":"1","direction":"right"}"#
        );

        let parsed: Rule = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, rule);
    }

    #[test]
    fn test_rule_matching() {
        let rule = Rule::new(2, "🥝", 2, "🥥", Direction::Left);

        assert!(rule.matches(2, "🥝"));
        assert!(!rule.matches(1, "🥝"));
        assert!(!rule.matches(2, "🥥"));
        assert_eq!(rule.key(), (2, "🥝"));
    }

    #[test]
    fn test_error_display() {
        let error = PuzzleError::ChallengeNotFound(99);
        assert_eq!(error.to_string(), "Challenge 99 not found");

        let error = PuzzleError::UnknownChallenge("Nope".to_string());
        assert!(error.to_string().contains("Nope"));
    }

    #[test]
    fn test_outcome_display() {
        assert!(Outcome::Accepted.is_accepted());
        assert!(!Outcome::OutOfBounds.is_accepted());
        assert_eq!(Outcome::NoRule.to_string(), "no rule for this state and symbol");
    }
}
