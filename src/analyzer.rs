//! This module checks an authored rule set against the constraints a challenge places on it
//! before the rules are run: unique `(state, read)` keys, states within the challenge's state
//! budget, and symbols drawn from the challenge's alphabet.
//!
//! The interpreter never consults the analyzer. A rule set that fails these checks still runs;
//! the checks exist so editors and the command line can point out mistakes early.

use std::collections::HashSet;

use crate::challenges::Challenge;
use crate::types::{PuzzleError, Rule, State, Symbol};

/// Represents the problems the analyzer can find in a rule set.
#[derive(Debug, PartialEq, Eq, Clone)]
pub enum AnalysisError {
    /// Two or more rules share a `(state, read)` key. Only the first one would ever fire.
    DuplicateKeys(Vec<(State, Symbol)>),
    /// Rules originate from states beyond the challenge's `max_state`.
    InvalidOriginStates(Vec<State>),
    /// Rules transition to states the challenge does not offer.
    InvalidTargetStates(Vec<State>),
    /// Rules read or write symbols outside the challenge's alphabet.
    UnknownSymbols(Vec<Symbol>),
}

impl From<AnalysisError> for PuzzleError {
    /// Converts an `AnalysisError` into a `PuzzleError::ValidationError`.
    fn from(error: AnalysisError) -> Self {
        match error {
            AnalysisError::DuplicateKeys(keys) => PuzzleError::ValidationError(format!(
                "Multiple rules for the same state and symbol: {:?}",
                keys
            )),
            AnalysisError::InvalidOriginStates(states) => PuzzleError::ValidationError(format!(
                "Rules start from states the challenge does not offer: {:?}",
                states
            )),
            AnalysisError::InvalidTargetStates(states) => PuzzleError::ValidationError(format!(
                "Rules move to states the challenge does not offer: {:?}",
                states
            )),
            AnalysisError::UnknownSymbols(symbols) => PuzzleError::ValidationError(format!(
                "Rules use symbols outside the challenge alphabet: {:?}",
                symbols
            )),
        }
    }
}

/// Analyzes `rules` against the constraints of `challenge`.
///
/// # Returns
///
/// * `Ok(())` if no problems are found.
/// * `Err(PuzzleError::ValidationError)` describing the first problem found.
pub fn analyze(rules: &[Rule], challenge: &Challenge) -> Result<(), PuzzleError> {
    let checks: [fn(&[Rule], &Challenge) -> Result<(), AnalysisError>; 4] = [
        check_duplicate_keys,
        check_origin_states,
        check_target_states,
        check_symbols,
    ];

    match checks
        .iter()
        .find_map(|check| check(rules, challenge).err())
    {
        Some(error) => Err(error.into()),
        None => Ok(()),
    }
}

/// Checks that no two rules share a `(state, read)` key.
fn check_duplicate_keys(rules: &[Rule], _: &Challenge) -> Result<(), AnalysisError> {
    let mut seen = HashSet::new();
    let mut duplicates = Vec::new();

    for rule in rules {
        let (state, read) = rule.key();
        let key = (state, read.to_string());
        if !seen.insert(key.clone()) && !duplicates.contains(&key) {
            duplicates.push(key);
        }
    }

    if duplicates.is_empty() {
        Ok(())
    } else {
        Err(AnalysisError::DuplicateKeys(duplicates))
    }
}

/// Checks that every rule originates from a state in `0..=max_state`.
fn check_origin_states(rules: &[Rule], challenge: &Challenge) -> Result<(), AnalysisError> {
    let allowed = challenge.origin_states();
    let invalid = collect_unique(rules.iter().map(|rule| rule.state), |state| {
        !allowed.contains(state)
    });

    if invalid.is_empty() {
        Ok(())
    } else {
        Err(AnalysisError::InvalidOriginStates(invalid))
    }
}

/// Checks that every rule targets an offered state, the final state included when required.
fn check_target_states(rules: &[Rule], challenge: &Challenge) -> Result<(), AnalysisError> {
    let allowed = challenge.target_states();
    let invalid = collect_unique(rules.iter().map(|rule| rule.new_state), |state| {
        !allowed.contains(state)
    });

    if invalid.is_empty() {
        Ok(())
    } else {
        Err(AnalysisError::InvalidTargetStates(invalid))
    }
}

/// Checks that every symbol read or written belongs to the challenge alphabet.
fn check_symbols(rules: &[Rule], challenge: &Challenge) -> Result<(), AnalysisError> {
    let alphabet: HashSet<&str> = challenge
        .allowed_characters
        .iter()
        .map(String::as_str)
        .collect();

    let symbols = rules
        .iter()
        .flat_map(|rule| [rule.read.clone(), rule.write.clone()]);
    let unknown = collect_unique(symbols, |symbol| !alphabet.contains(symbol.as_str()));

    if unknown.is_empty() {
        Ok(())
    } else {
        Err(AnalysisError::UnknownSymbols(unknown))
    }
}

/// Collects the items matching `predicate`, first occurrence order, without repeats.
fn collect_unique<T, I, P>(items: I, predicate: P) -> Vec<T>
where
    T: PartialEq,
    I: IntoIterator<Item = T>,
    P: Fn(&T) -> bool,
{
    let mut found = Vec::new();
    for item in items {
        if predicate(&item) && !found.contains(&item) {
            found.push(item);
        }
    }
    found
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::challenges::generate_challenge;
    use crate::types::{Direction, BLANK};

    fn carry_the_one() -> Challenge {
        generate_challenge(8).unwrap()
    }

    fn rule(state: State, read: &str, new_state: State, write: &str) -> Rule {
        Rule::new(state, read, new_state, write, Direction::Right)
    }

    #[test]
    fn test_valid_rules() {
        let rules = vec![
            rule(0, "1", 1, BLANK),
            rule(1, "0", 1, BLANK),
            rule(1, "1", 0, "1"),
            rule(0, BLANK, 2, "1"),
        ];

        assert!(analyze(&rules, &carry_the_one()).is_ok());
        assert!(analyze(&[], &carry_the_one()).is_ok());
    }

    #[test]
    fn test_duplicate_keys() {
        let rules = vec![rule(0, "1", 1, BLANK), rule(0, "1", 0, "0")];

        assert_eq!(
            check_duplicate_keys(&rules, &carry_the_one()),
            Err(AnalysisError::DuplicateKeys(vec![(0, "1".to_string())]))
        );
    }

    #[test]
    fn test_origin_state_beyond_max() {
        // State 2 is the final state: rules may target it but not start from it.
        let rules = vec![rule(2, "1", 0, "1"), rule(5, "1", 0, "1")];

        assert_eq!(
            check_origin_states(&rules, &carry_the_one()),
            Err(AnalysisError::InvalidOriginStates(vec![2, 5]))
        );
    }

    #[test]
    fn test_target_states() {
        let challenge = carry_the_one();
        assert!(check_target_states(&[rule(0, "1", 2, "1")], &challenge).is_ok());
        assert_eq!(
            check_target_states(&[rule(0, "1", 3, "1")], &challenge),
            Err(AnalysisError::InvalidTargetStates(vec![3]))
        );

        // Without a final state, max_state is the ceiling.
        let flipper = generate_challenge(6).unwrap();
        assert_eq!(
            check_target_states(&[rule(0, "1", 1, "0")], &flipper),
            Err(AnalysisError::InvalidTargetStates(vec![1]))
        );
    }

    #[test]
    fn test_unknown_symbols() {
        let rules = vec![rule(0, "x", 0, "1"), rule(1, "1", 1, "x"), rule(1, "0", 1, "y")];

        assert_eq!(
            check_symbols(&rules, &carry_the_one()),
            Err(AnalysisError::UnknownSymbols(vec![
                "x".to_string(),
                "y".to_string()
            ]))
        );
    }

    #[test]
    fn test_first_error_wins() {
        let rules = vec![rule(0, "x", 9, "1"), rule(0, "x", 9, "1")];
        let result = analyze(&rules, &carry_the_one());

        match result {
            Err(PuzzleError::ValidationError(message)) => {
                assert!(message.contains("same state and symbol"));
            }
            other => panic!("Expected a validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_analysis_error_conversion() {
        let error: PuzzleError = AnalysisError::UnknownSymbols(vec!["🥝".to_string()]).into();
        assert_eq!(
            error.to_string(),
            "Rule validation error: Rules use symbols outside the challenge alphabet: [\"🥝\"]"
        );
    }
}
