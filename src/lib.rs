//! This crate provides the core logic for a Turing machine puzzle game.
//! It includes the challenge catalogue and its randomized instance generators, a bounded
//! single-tape interpreter, the accuracy validator that decides whether a rule set solves a
//! challenge, and supporting tooling for parsing, checking, sharing and loading rule sets.

pub mod accuracy;
pub mod analyzer;
pub mod challenges;
pub mod encoder;
mod generator;
pub mod loader;
pub mod machine;
pub mod parser;
pub mod rules;
pub mod tape;
pub mod types;

/// Re-exports the accuracy validator entry points.
pub use accuracy::{
    calculate_accuracy, calculate_accuracy_for_challenge, calculate_accuracy_with, check_family,
    find_counterexample, Counterexample,
};
/// Re-exports the `analyze` function and `AnalysisError` enum from the analyzer module.
pub use analyzer::{analyze, AnalysisError};
/// Re-exports the challenge registry.
pub use challenges::{
    challenge_count, challenge_name_to_index, generate_challenge, generate_challenge_with,
    resolve_challenge, Challenge, CHALLENGE_NAMES,
};
/// Re-exports the share-code functions from the encoder module.
pub use encoder::{decode, encode};
/// Re-exports the `RuleLoader` struct from the loader module.
pub use loader::RuleLoader;
/// Re-exports the interpreter.
pub use machine::{Coverage, Machine, Run};
/// Re-exports the `parse` function and `Solution` struct from the parser module.
pub use parser::{parse, Solution};
pub use rules::RuleSet;
/// Re-exports the core data types and constants.
pub use types::{
    Direction, Outcome, PuzzleError, Rule, State, Symbol, Tape, TapeMode, ACCURACY_TRIALS,
    BLANK, MAX_CHALLENGE_INDEX, MAX_STEPS,
};
