//! This module provides the parser for rule files, utilizing the `pest` crate.
//! It defines the grammar for `.rules` files and functions to parse the input into a `Solution`.
//!
//! A rule file is a list of transitions, one per line, optionally preceded by a header naming
//! the challenge it solves:
//!
//! ```text
//! # Binary Add 1
//! challenge: Binary Add 1
//! q0, 0 -> q0, 0, R
//! q0, _ -> q1, _, L
//! ```

use std::fmt;

use pest::{
    error::{Error, ErrorVariant},
    iterators::Pair,
    Parser as PestParser, Span,
};
use pest_derive::Parser as PestParser;

use crate::rules::RuleSet;
use crate::types::{Direction, PuzzleError, Rule as Transition, State, Symbol};

/// Derives a `PestParser` for the rule file grammar defined in `grammar.pest`.
#[derive(PestParser)]
#[grammar = "grammar.pest"]
pub struct RuleFileParser;

/// A parsed rule file: the rules plus the challenge they target, when the file names one.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Solution {
    pub challenge: Option<String>,
    pub rules: RuleSet,
}

/// Parses the given input string into a `Solution`.
///
/// # Arguments
///
/// * `input` - A string slice containing the rule file.
///
/// # Returns
///
/// * `Ok(Solution)` if the input is successfully parsed.
/// * `Err(PuzzleError::ParseError)` if there are syntax errors, a repeated `challenge:`
///   header, two rules for the same state and symbol, or a state number that does not fit.
pub fn parse(input: &str) -> Result<Solution, PuzzleError> {
    let mut pairs = RuleFileParser::parse(Rule::program, input)
        .map_err(|e| PuzzleError::ParseError(e.into()))?;

    match pairs.next() {
        Some(root) => parse_solution(root),
        None => Ok(Solution::default()),
    }
}

/// Walks the lines of a `Pair<Rule::program>`.
fn parse_solution(pair: Pair<Rule>) -> Result<Solution, PuzzleError> {
    let mut solution = Solution::default();

    for p in pair.into_inner() {
        let span = p.as_span();

        match p.as_rule() {
            Rule::challenge => {
                if solution.challenge.is_some() {
                    return Err(parse_error("Duplicate \"challenge:\" declaration", span));
                }
                solution.challenge = Some(parse_title(p));
            }
            Rule::transition => {
                let transition = parse_transition(p)?;

                // Prevent duplicated (state, read) keys
                if solution.rules.get(transition.state, &transition.read).is_some() {
                    return Err(parse_error(
                        &format!(
                            "Duplicate rule for state q{} reading '{}'",
                            transition.state, transition.read
                        ),
                        span,
                    ));
                }
                solution.rules.upsert(transition);
            }
            _ => {} // EOI
        }
    }

    Ok(solution)
}

/// Extracts the trimmed title from a `Pair<Rule::challenge>`.
fn parse_title(pair: Pair<Rule>) -> String {
    pair.into_inner()
        .next()
        .map(|title| title.as_str().trim().to_string())
        .unwrap_or_default()
}

/// Parses a single transition line.
///
/// Rule: transition > state, symbol, state, symbol, direction
fn parse_transition(pair: Pair<Rule>) -> Result<Transition, PuzzleError> {
    let span = pair.as_span();
    let parts: Vec<Pair<Rule>> = pair.into_inner().collect();

    let [state, read, new_state, write, direction] = parts.as_slice() else {
        return Err(parse_error("Malformed transition", span));
    };

    Ok(Transition {
        state: parse_state(state)?,
        read: parse_symbol(read),
        new_state: parse_state(new_state)?,
        write: parse_symbol(write),
        direction: parse_direction(direction)?,
    })
}

/// Parses a state number, with or without its `q` prefix.
fn parse_state(pair: &Pair<Rule>) -> Result<State, PuzzleError> {
    pair.as_str()
        .trim_start_matches('q')
        .parse::<State>()
        .map_err(|_| {
            parse_error(
                &format!("State number out of range: {}", pair.as_str()),
                pair.as_span(),
            )
        })
}

/// Parses a symbol, stripping the quotes from quoted symbols.
///
/// Inside quotes, `\'` stands for a quote and `\\` for a backslash. Any other backslash is kept
/// as written.
fn parse_symbol(pair: &Pair<Rule>) -> Symbol {
    let text = pair.as_str();
    let Some(inner) = text
        .strip_prefix('\'')
        .and_then(|inner| inner.strip_suffix('\''))
    else {
        return text.to_string();
    };

    let mut symbol = String::with_capacity(inner.len());
    let mut chars = inner.chars().peekable();
    while let Some(c) = chars.next() {
        match (c, chars.peek()) {
            ('\\', Some(&next @ ('\'' | '\\'))) => {
                symbol.push(next);
                chars.next();
            }
            _ => symbol.push(c),
        }
    }
    symbol
}

/// Parses a direction.
///
/// Supports '<', 'L' or "left" for Left, and '>', 'R' or "right" for Right.
fn parse_direction(pair: &Pair<Rule>) -> Result<Direction, PuzzleError> {
    match pair.as_str().to_ascii_lowercase().as_str() {
        "<" | "l" | "left" => Ok(Direction::Left),
        ">" | "r" | "right" => Ok(Direction::Right),
        other => Err(parse_error(
            &format!("Unsupported direction: {}", other),
            pair.as_span(),
        )),
    }
}

/// Creates a `PuzzleError::ParseError` from a message and a `Span`.
fn parse_error(msg: &str, span: Span) -> PuzzleError {
    PuzzleError::ParseError(Box::new(Error::new_from_span(
        ErrorVariant::CustomError {
            message: msg.to_string(),
        },
        span,
    )))
}

/// Quotes a symbol when it would not survive as a bare token.
fn format_symbol(symbol: &str) -> String {
    let bare = !symbol.is_empty()
        && !symbol.contains("->")
        && !symbol
            .chars()
            .any(|c| c.is_whitespace() || matches!(c, ',' | '\'' | '#'));

    if bare {
        symbol.to_string()
    } else {
        format!("'{}'", symbol.replace('\\', r"\\").replace('\'', r"\'"))
    }
}

impl fmt::Display for Solution {
    /// Writes the solution back out in rule file syntax.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if let Some(challenge) = &self.challenge {
            writeln!(f, "challenge: {challenge}")?;
        }

        for rule in &self.rules {
            writeln!(
                f,
                "q{}, {} -> q{}, {}, {}",
                rule.state,
                format_symbol(&rule.read),
                rule.new_state,
                format_symbol(&rule.write),
                match rule.direction {
                    Direction::Left => "L",
                    Direction::Right => "R",
                }
            )?;
        }

        Ok(())
    }
}
