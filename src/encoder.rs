//! This module provides the share-code encoding for rule sets: a compact single-line string
//! that can be pasted into a chat message or a URL and decoded back into the same rules.

use crate::rules::RuleSet;
use crate::types::{Direction, PuzzleError, Rule, State, Symbol};

/// Encodes rules into a share code.
///
/// Format: pipe-separated transitions in format `state,read,write,direction,new_state`, where
/// direction is `L` or `R`. Characters that would clash with the separators are escaped as
/// `%2C` (`,`), `%7C` (`|`) and `%25` (`%`).
///
/// # Arguments
///
/// * `rules` - The rules to encode, in the order they should be restored.
///
/// # Returns
///
/// * `String` - The encoded rules.
pub fn encode(rules: &[Rule]) -> String {
    rules
        .iter()
        .map(|rule| {
            format!(
                "{},{},{},{},{}",
                rule.state,
                escape(&rule.read),
                escape(&rule.write),
                match rule.direction {
                    Direction::Left => "L",
                    Direction::Right => "R",
                },
                rule.new_state
            )
        })
        .collect::<Vec<_>>()
        .join("|")
}

/// Decodes a share code produced by [`encode`].
///
/// # Returns
///
/// * `Ok(RuleSet)` with the rules in encoded order. A later rule for the same `(state, read)`
///   key replaces an earlier one.
/// * `Err(PuzzleError::DecodeError)` if any transition is malformed.
pub fn decode(encoded: &str) -> Result<RuleSet, PuzzleError> {
    let encoded = encoded.trim();
    if encoded.is_empty() {
        return Ok(RuleSet::new());
    }

    encoded.split('|').map(decode_rule).collect()
}

/// Decodes a single `state,read,write,direction,new_state` transition.
fn decode_rule(encoded: &str) -> Result<Rule, PuzzleError> {
    let parts: Vec<&str> = encoded.split(',').collect();

    let [state, read, write, direction, new_state] = parts.as_slice() else {
        return Err(PuzzleError::DecodeError(format!(
            "Invalid transition format: {}",
            encoded
        )));
    };

    let direction = match *direction {
        "L" => Direction::Left,
        "R" => Direction::Right,
        other => {
            return Err(PuzzleError::DecodeError(format!(
                "Invalid direction: {}",
                other
            )))
        }
    };

    Ok(Rule {
        state: decode_state(state)?,
        read: unescape(read)?,
        new_state: decode_state(new_state)?,
        write: unescape(write)?,
        direction,
    })
}

fn decode_state(encoded: &str) -> Result<State, PuzzleError> {
    encoded
        .parse::<State>()
        .map_err(|_| PuzzleError::DecodeError(format!("Invalid state: {}", encoded)))
}

fn escape(symbol: &str) -> String {
    symbol
        .replace('%', "%25")
        .replace(',', "%2C")
        .replace('|', "%7C")
}

fn unescape(encoded: &str) -> Result<Symbol, PuzzleError> {
    let symbol = encoded
        .replace("%2C", ",")
        .replace("%7C", "|")
        .replace("%25", "%");

    if symbol.is_empty() {
        return Err(PuzzleError::DecodeError("Empty symbol".to_string()));
    }

    Ok(symbol)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::BLANK;

    fn create_test_rules() -> Vec<Rule> {
        vec![
            Rule::new(0, "0", 0, "0", Direction::Right),
            Rule::new(0, BLANK, 1, BLANK, Direction::Left),
            Rule::new(1, "1", 1, "0", Direction::Left),
            Rule::new(1, "0", 2, "1", Direction::Left),
        ]
    }

    #[test]
    fn test_encode_rules() {
        let encoded = encode(&create_test_rules());
        assert_eq!(encoded, "0,0,0,R,0|0,_,_,L,1|1,1,0,L,1|1,0,1,L,2");
    }

    #[test]
    fn test_round_trip_encoding() {
        let rules = create_test_rules();
        let decoded = decode(&encode(&rules)).unwrap();

        assert_eq!(decoded.as_slice(), rules.as_slice());
    }

    #[test]
    fn test_escaped_symbols() {
        let rules = vec![Rule::new(0, ",", 0, "|%", Direction::Right)];
        let encoded = encode(&rules);

        assert_eq!(encoded, "0,%2C,%7C%25,R,0");
        assert_eq!(decode(&encoded).unwrap().as_slice(), rules.as_slice());
    }

    #[test]
    fn test_decode_empty() {
        assert!(decode("").unwrap().is_empty());
        assert!(decode("  \n").unwrap().is_empty());
    }

    #[test]
    fn test_decode_invalid_format() {
        assert!(matches!(decode("0,_,1,R"), Err(PuzzleError::DecodeError(_))));
        assert!(matches!(decode("0,_,1,S,0"), Err(PuzzleError::DecodeError(_))));
        assert!(matches!(decode("x,_,1,R,0"), Err(PuzzleError::DecodeError(_))));
        assert!(matches!(decode("0,,1,R,0"), Err(PuzzleError::DecodeError(_))));
    }

    #[test]
    fn test_decode_keeps_last_duplicate() {
        let decoded = decode("0,_,1,R,0|0,_,0,L,1").unwrap();

        assert_eq!(decoded.len(), 1);
        assert_eq!(decoded.get(0, BLANK).unwrap().new_state, 1);
    }
}
