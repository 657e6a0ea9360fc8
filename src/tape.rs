//! Helpers for building tapes: blank runs, concatenation, literal symbol lists and the
//! unsigned binary encoding used by the arithmetic challenges.

use crate::types::{Symbol, Tape, BLANK};

/// Builds a tape from a list of symbol literals.
pub fn tape(symbols: &[&str]) -> Tape {
    symbols.iter().map(|s| s.to_string()).collect()
}

/// Returns `count` blank cells.
pub fn blanks(count: usize) -> Tape {
    repeat(BLANK, count)
}

/// Returns `count` copies of `symbol`.
pub fn repeat(symbol: &str, count: usize) -> Tape {
    vec![symbol.to_string(); count]
}

/// Concatenates tape segments in order.
pub fn concat<I>(segments: I) -> Tape
where
    I: IntoIterator<Item = Tape>,
{
    segments.into_iter().flatten().collect()
}

/// Converts a non-negative integer to its binary digits, most significant first.
///
/// `0` encodes as `["0"]`; every other value has no leading zeros.
pub fn int_to_binary(mut n: u64) -> Tape {
    if n == 0 {
        return tape(&["0"]);
    }

    let mut digits = Vec::new();
    while n > 0 {
        digits.push(if n % 2 == 0 { "0" } else { "1" }.to_string());
        n /= 2;
    }
    digits.reverse();
    digits
}

/// Folds binary digits (most significant first) back into an integer.
///
/// Any symbol other than `"0"` counts as a one. Returns `None` if the value does not fit in a
/// `u64`; leading zeros never overflow.
pub fn binary_to_int(digits: &[Symbol]) -> Option<u64> {
    digits.iter().try_fold(0u64, |acc, digit| {
        acc.checked_mul(2)?.checked_add(u64::from(digit != "0"))
    })
}

/// Left-pads `digits` with `"0"` until it is at least `width` long.
pub fn pad_binary(digits: Tape, width: usize) -> Tape {
    if digits.len() >= width {
        return digits;
    }
    concat([repeat("0", width - digits.len()), digits])
}

/// Renders a tape as a single line, one symbol per cell.
pub fn render(tape: &[Symbol]) -> String {
    tape.concat()
}
