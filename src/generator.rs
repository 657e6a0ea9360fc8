//! The challenge constructions. Each index maps to one named puzzle family; randomized
//! families draw their lengths, digits and bit patterns from the caller's random source and
//! redraw until the instance is non-trivial.

use rand::Rng;
use tracing::trace;

use crate::challenges::{Challenge, CHALLENGE_NAMES};
use crate::tape::{blanks, concat, int_to_binary, pad_binary, repeat, tape};
use crate::types::{State, Symbol, Tape, BLANK};

/// Builds a fresh instance of the challenge at `index`, or `None` if no such challenge exists.
pub(crate) fn build<R: Rng + ?Sized>(index: usize, rng: &mut R) -> Option<Challenge> {
    let name = *CHALLENGE_NAMES.get(index)?;

    let challenge = match index {
        0 => getting_started(name),
        1 => go_right(name),
        2 => deletion(name),
        3 => all_on(name),
        4 => alternator(name),
        5 => sequencer(name),
        6 => bit_flipper(name, rng),
        7 => there_and_back(name),
        8 => carry_the_one(name),
        9 => binary_add_one(name, rng),
        10 => compression(name, rng),
        11 => duplicator(name, rng),
        12 => sort(name, rng),
        13 => modulo_three(name, rng),
        14 => binary_counter(name, rng),
        15 => inverse_counter(name, rng),
        16 => bit_shifter(name, rng),
        17 => copier(name, rng),
        18 => palindrome(name, rng),
        19 => xor(name, rng),
        20 => mode(name, rng),
        21 => addition(name, rng),
        22 => greater_or_equal(name, rng),
        23 => bisect(name, rng),
        24 => trisect(name, rng),
        _ => return None,
    };

    Some(challenge)
}

/// A challenge under construction. Defaults to a single state, a blank-only alphabet,
/// no hints and no final state.
struct Draft(Challenge);

impl Draft {
    fn new(name: &str, start_tape: Tape, goal_tape: Tape, start_index: usize) -> Self {
        Self(Challenge {
            name: name.to_string(),
            start_tape,
            goal_tape,
            start_index,
            start_state: 0,
            max_state: 0,
            allowed_characters: tape(&[BLANK]),
            hints: Vec::new(),
            requires_end_state: false,
            custom_states: None,
            tutorial_tip: None,
        })
    }

    fn max_state(mut self, max_state: State) -> Self {
        self.0.max_state = max_state;
        self
    }

    /// Sets the alphabet. The blank symbol is always offered, first.
    fn alphabet(mut self, symbols: &[&str]) -> Self {
        let mut allowed = tape(&[BLANK]);
        allowed.extend(
            symbols
                .iter()
                .filter(|symbol| **symbol != BLANK)
                .map(|symbol| symbol.to_string()),
        );
        self.0.allowed_characters = allowed;
        self
    }

    fn hints(mut self, hints: &[&str]) -> Self {
        self.0.hints = hints.iter().map(|hint| hint.to_string()).collect();
        self
    }

    fn end_state(mut self) -> Self {
        self.0.requires_end_state = true;
        self
    }

    fn custom_states(mut self, labels: &[&str]) -> Self {
        self.0.custom_states = Some(labels.iter().map(|label| label.to_string()).collect());
        self
    }

    fn tip(mut self, tip: impl Into<String>) -> Self {
        self.0.tutorial_tip = Some(tip.into());
        self
    }

    fn build(self) -> Challenge {
        self.0
    }
}

/// Draws `count` symbols uniformly from `alphabet`.
fn draw<R: Rng + ?Sized>(rng: &mut R, alphabet: &[&str], count: usize) -> Tape {
    (0..count)
        .map(|_| alphabet[rng.gen_range(0..alphabet.len())].to_string())
        .collect()
}

fn count(tape: &[Symbol], symbol: &str) -> usize {
    tape.iter().filter(|cell| *cell == symbol).count()
}

fn getting_started(name: &str) -> Challenge {
    Draft::new(name, blanks(1), tape(&["1"]), 0)
        .alphabet(&["1"])
        .hints(&["Rule you need: read \"_\"→ write \"1\""])
        .tip("Click \"Add Rule\" and create a rule that reads _ and writes 1")
        .build()
}

fn go_right(name: &str) -> Challenge {
    Draft::new(name, blanks(2), tape(&["1", "1"]), 0)
        .alphabet(&["1"])
        .hints(&["Rule: Read \"_\", write \"1\", move Right"])
        .tip("Add a rule that reads \"_\", writes \"1\", and moves right ➡︎")
        .build()
}

fn deletion(name: &str) -> Challenge {
    Draft::new(name, repeat("🥝", 4), repeat("🥥", 4), 3)
        .alphabet(&["🥝", "🥥"])
        .hints(&["Rule: Read \"🥝\", write \"🥥\", and move Left"])
        .tip("Characters can be anything, even emojis! Add a rule that reads \"🥝\", writes \"🥥\", and moves left ⬅︎")
        .build()
}

fn all_on(name: &str) -> Challenge {
    let start = tape(&["😴", "😎", "😴", "😴", "😎", "😴", "😎"]);
    Draft::new(name, start, repeat("😎", 7), 0)
        .alphabet(&["😴", "😎"])
        .hints(&["Two rules: 😴→😎 and 😎→😎"])
        .tip("Now you need two rules")
        .build()
}

fn alternator(name: &str) -> Challenge {
    let sequence = tape(&["0", "1", "0", "1", "0", "1", "0"]);
    let start_index = sequence.len() - 1;
    Draft::new(name, blanks(sequence.len()), sequence, start_index)
        .max_state(1)
        .alphabet(&["0", "1"])
        .hints(&["q0 means write \"0\", q1 means write \"1\""])
        .tip("Your machine now has two states: q0 and q1. When in q0, write 0 and switch to q1. When in q1, write 1 and switch to q0.")
        .build()
}

fn sequencer(name: &str) -> Challenge {
    let goal = tape(&["0", BLANK, "1", BLANK, "0", BLANK, "1", BLANK, "0"]);
    Draft::new(name, blanks(goal.len()), goal, 0)
        .max_state(3)
        .alphabet(&["0", "1"])
        .hints(&[
            "Try writing one rule at a time",
            "Play the machine to see what happens",
            "Loop through your four states",
        ])
        .build()
}

fn bit_flipper<R: Rng + ?Sized>(name: &str, rng: &mut R) -> Challenge {
    let len = rng.gen_range(5..=12);
    let bits = draw(rng, &["0", "1"], len);
    let flipped: Tape = bits
        .iter()
        .map(|bit| if bit == "0" { "1" } else { "0" }.to_string())
        .collect();

    Draft::new(name, bits, flipped, 0)
        .alphabet(&["0", "1"])
        .hints(&["Ones become zeros", "Zeros become ones"])
        .custom_states(&["🩴"])
        .tip("States can be any character, even emojis!")
        .build()
}

fn there_and_back(name: &str) -> Challenge {
    let start = concat([blanks(1), repeat("1", 5), blanks(1)]);
    let goal = concat([blanks(1), repeat("0", 5), blanks(1)]);
    Draft::new(name, start, goal, 3)
        .alphabet(&["0", "1"])
        .hints(&[
            "You only have one state",
            "Ones and zeros become zeros",
            "Blanks remain blank",
            "Experiment with directions",
        ])
        .tip("This is the first 'challenging' challenge. With only one state, write rules that zero out the whole tape.")
        .build()
}

fn carry_the_one(name: &str) -> Challenge {
    let start = tape(&["1", "0", "0", "0", "0", "0", "1"]);
    let goal = concat([blanks(5), tape(&["1", "1"])]);
    Draft::new(name, start, goal, 0)
        .max_state(1)
        .alphabet(&["0", "1"])
        .hints(&["Read 1 in state q0, write _ and set to state q1"])
        .end_state()
        .tip("Use your two states to move the 1 to the right. You should end in the terminal state q2.")
        .build()
}

fn binary_add_one<R: Rng + ?Sized>(name: &str, rng: &mut R) -> Challenge {
    // Odd numbers always carry at least once.
    let number = rng.gen_range(1..=60u64) * 2 - 1;
    let width = int_to_binary(number + 1).len();
    let number_bits = pad_binary(int_to_binary(number), width);
    let sum_bits = pad_binary(int_to_binary(number + 1), width);

    Draft::new(
        name,
        concat([number_bits, blanks(1)]),
        concat([sum_bits, blanks(1)]),
        0,
    )
    .max_state(1)
    .alphabet(&["0", "1"])
    .hints(&["Base two addition", "Got to the right of the digits", "0→1, 1→0"])
    .end_state()
    .tip(format!(
        "This is the first \"useful\" challenge. Increment the binary representation of {} by 1 to get the binary representation of {}.",
        number,
        number + 1
    ))
    .build()
}

fn compression<R: Rng + ?Sized>(name: &str, rng: &mut R) -> Challenge {
    let (input, ones) = loop {
        let len = rng.gen_range(4..=8);
        let input = draw(rng, &["1", "0"], len);
        let ones = count(&input, "1");
        if ones > 0 && ones < input.len() {
            break (input, ones);
        }
        trace!(challenge = name, "redrawing trivial instance");
    };
    let zeros = input.len() - ones;

    Draft::new(
        name,
        concat([blanks(1), input, blanks(1)]),
        concat([blanks(1 + zeros), repeat("1", ones), blanks(1)]),
        1,
    )
    .max_state(2)
    .alphabet(&["0", "1"])
    .hints(&["If a pair is out of order, perform swaps of adjacents"])
    .end_state()
    .tip("Compress the tape by removing 0s. Make sure to handle all cases (click Reload to generate more cases).")
    .build()
}

fn duplicator<R: Rng + ?Sized>(name: &str, rng: &mut R) -> Challenge {
    let ones = repeat("1", rng.gen_range(1..=10));

    Draft::new(
        name,
        concat([ones.clone(), blanks(1), blanks(ones.len())]),
        concat([ones.clone(), blanks(1), ones]),
        0,
    )
    .max_state(4)
    .alphabet(&["1"])
    .hints(&[
        "This example is on Wikipedia",
        "Move over one at a time",
        "Use blanks as placeholders",
    ])
    .end_state()
    .build()
}

fn sort<R: Rng + ?Sized>(name: &str, rng: &mut R) -> Challenge {
    let (digits, sorted) = loop {
        let len = rng.gen_range(5..=14);
        let digits = draw(rng, &["0", "1", "2"], len);
        let mut sorted = digits.clone();
        sorted.sort();
        if sorted != digits {
            break (digits, sorted);
        }
        trace!(challenge = name, "redrawing trivial instance");
    };

    Draft::new(
        name,
        concat([blanks(1), digits, blanks(1)]),
        concat([blanks(1), sorted, blanks(1)]),
        1,
    )
    .max_state(4)
    .alphabet(&["0", "1", "2"])
    .hints(&[
        "If a pair is out of order,",
        "Perform swaps of adjacents",
        "This is Insertion Sort",
    ])
    .end_state()
    .build()
}

fn modulo_three<R: Rng + ?Sized>(name: &str, rng: &mut R) -> Challenge {
    let ones = rng.gen_range(2..=19);
    let remainder = (ones % 3).to_string();

    Draft::new(
        name,
        concat([blanks(2), repeat("1", ones)]),
        concat([vec![remainder], blanks(1 + ones)]),
        ones + 1,
    )
    .max_state(4)
    .alphabet(&["0", "1", "2"])
    .hints(&[
        "Carry each one over",
        "Increase left digit by one mod 3",
        "0→1, 1→2, 2→0",
    ])
    .end_state()
    .build()
}

fn binary_counter<R: Rng + ?Sized>(name: &str, rng: &mut R) -> Challenge {
    let ones = rng.gen_range(2..=19usize);
    let count_bits = int_to_binary(ones as u64);
    let width = count_bits.len();

    Draft::new(
        name,
        concat([blanks(width + 1), repeat("1", ones)]),
        concat([count_bits, blanks(1), repeat("1", ones)]),
        ones + width,
    )
    .max_state(4)
    .alphabet(&["0", "1"])
    .hints(&[
        "Carry ones over like in Duplicator",
        "Use binary to add to total count",
        "It's like regular numbers but 1+1=10",
    ])
    .end_state()
    .build()
}

fn inverse_counter<R: Rng + ?Sized>(name: &str, rng: &mut R) -> Challenge {
    let ones = rng.gen_range(2..=19usize);
    let count_bits = int_to_binary(ones as u64);
    let width = count_bits.len();

    Draft::new(
        name,
        concat([blanks(1), count_bits, blanks(1 + ones)]),
        concat([blanks(width + 2), repeat("1", ones)]),
        width,
    )
    .max_state(4)
    .alphabet(&["0", "1"])
    .hints(&[
        "Subtract one using binary subtraction",
        "Transfer this one to the right",
    ])
    .end_state()
    .build()
}

fn bit_shifter<R: Rng + ?Sized>(name: &str, rng: &mut R) -> Challenge {
    let value = rng.gen_range(0..=u64::from(u8::MAX));
    let bits = pad_binary(int_to_binary(value), 8);
    let shift = rng.gen_range(1..=4u32);
    let shift_bits = int_to_binary(u64::from(shift));
    let shifted = pad_binary(int_to_binary(value >> shift), 8);
    let shift_width = shift_bits.len();

    Draft::new(
        name,
        concat([blanks(1), bits, tape(&[">", ">"]), shift_bits, blanks(1)]),
        concat([blanks(1), shifted, blanks(3 + shift_width)]),
        10 + shift_width,
    )
    .max_state(5)
    .alphabet(&["0", "1", ">"])
    .hints(&["Subtract one from the right side", "Shift digits to the right"])
    .end_state()
    .build()
}

fn copier<R: Rng + ?Sized>(name: &str, rng: &mut R) -> Challenge {
    let bits = draw(rng, &["0", "1"], 6);
    let original = concat([blanks(1), bits.clone(), blanks(1)]);

    Draft::new(
        name,
        concat([original.clone(), blanks(bits.len()), blanks(1)]),
        concat([original, bits, blanks(1)]),
        1,
    )
    .max_state(4)
    .alphabet(&["0", "1", "x", "a", "b"])
    .hints(&[
        "You have three spare characters",
        "Use x to separate original from copy",
        "Replace 0 with a, 1 with b",
    ])
    .end_state()
    .build()
}

fn palindrome<R: Rng + ?Sized>(name: &str, rng: &mut R) -> Challenge {
    let bits = loop {
        let bits = draw(rng, &["0", "1"], 5);
        if count(&bits, "0") > 0 && count(&bits, "1") > 0 {
            break bits;
        }
        trace!(challenge = name, "redrawing trivial instance");
    };
    let reversed: Tape = bits.iter().rev().cloned().collect();

    Draft::new(
        name,
        concat([bits.clone(), blanks(bits.len())]),
        concat([bits, reversed]),
        0,
    )
    .max_state(3)
    .alphabet(&["0", "1", "a"])
    .hints(&["Replace 0→a, 1→b", "Then move out from center"])
    .build()
}

fn xor<R: Rng + ?Sized>(name: &str, rng: &mut R) -> Challenge {
    let len = if rng.gen_bool(0.5) { 6 } else { 4 };
    let first = draw(rng, &["0", "1"], len);
    let second = draw(rng, &["0", "1"], len);
    let xored: Tape = first
        .iter()
        .zip(&second)
        .map(|(a, b)| if a == b { "0" } else { "1" }.to_string())
        .collect();

    Draft::new(
        name,
        concat([first, tape(&["^"]), second, tape(&["="]), blanks(len)]),
        concat([blanks(2 * len + 2), xored]),
        0,
    )
    .max_state(5)
    .alphabet(&["0", "1", "^", "="])
    .hints(&[
        "The title \"XOR\" means exclusive or",
        "XOR the first digits of each number",
        "Replace in left number with _",
        "Replace in right number with ^",
    ])
    .end_state()
    .build()
}

fn mode<R: Rng + ?Sized>(name: &str, rng: &mut R) -> Challenge {
    let len = 2 * rng.gen_range(2..=6) + 1;
    let (bits, ones) = loop {
        let bits = draw(rng, &["0", "1"], len);
        let ones = count(&bits, "1");
        if ones > 0 {
            break (bits, ones);
        }
        trace!(challenge = name, "redrawing trivial instance");
    };
    let mode = if ones * 2 > len { "1" } else { "0" };
    let half = len / 2;

    Draft::new(
        name,
        concat([blanks(1), bits, blanks(1)]),
        concat([blanks(1 + half), tape(&[mode]), blanks(half + 1)]),
        1,
    )
    .max_state(8)
    .alphabet(&["0", "1"])
    .hints(&[
        "The title \"Mode\" is a statistics term",
        "You have an odd set of 0's and 1's",
        "Therefore, Mode = Median",
        "First sort, then remove extremes",
    ])
    .end_state()
    .build()
}

fn addition<R: Rng + ?Sized>(name: &str, rng: &mut R) -> Challenge {
    let first = rng.gen_range(2..=41u64);
    let second = rng.gen_range(2..=41u64);
    let first_bits = int_to_binary(first);
    let second_bits = int_to_binary(second);
    let sum_bits = int_to_binary(first + second);
    let first_width = first_bits.len();
    let room = sum_bits.len() - second_bits.len();

    Draft::new(
        name,
        concat([
            blanks(1),
            first_bits,
            blanks(1 + room),
            second_bits,
            blanks(1),
        ]),
        concat([blanks(first_width + 2), sum_bits, blanks(1)]),
        first_width,
    )
    .max_state(6)
    .alphabet(&["0", "1"])
    .hints(&[
        "Subtract one from the left number",
        "Add that one to the right number",
        "There are two methods to subtract",
    ])
    .build()
}

fn greater_or_equal<R: Rng + ?Sized>(name: &str, rng: &mut R) -> Challenge {
    let first = rng.gen_range(2..=41u64);
    let second = rng.gen_range(2..=41u64);
    let first_bits = int_to_binary(first);
    let second_bits = int_to_binary(second);
    let answer = if first >= second { "1" } else { "0" };
    let (first_width, second_width) = (first_bits.len(), second_bits.len());

    Draft::new(
        name,
        concat([
            blanks(1),
            first_bits,
            tape(&["≥"]),
            second_bits,
            blanks(1),
        ]),
        concat([
            blanks(first_width + 1),
            tape(&[answer]),
            blanks(second_width + 1),
        ]),
        first_width + 1,
    )
    .max_state(6)
    .alphabet(&["0", "1", "≥"])
    .end_state()
    .build()
}

fn bisect<R: Rng + ?Sized>(name: &str, rng: &mut R) -> Challenge {
    let spacing = rng.gen_range(2..=9);

    Draft::new(
        name,
        concat([tape(&["1"]), blanks(2 * spacing + 1), tape(&["1"])]),
        concat([
            tape(&["1"]),
            blanks(spacing),
            tape(&["1"]),
            blanks(spacing),
            tape(&["1"]),
        ]),
        0,
    )
    .max_state(3)
    .alphabet(&["0", "1"])
    .hints(&[
        "Fill with zeroes, then remove edges",
        "If you run out of states, re-use",
        "Try working out rules on paper",
    ])
    .end_state()
    .build()
}

fn trisect<R: Rng + ?Sized>(name: &str, rng: &mut R) -> Challenge {
    let spacing = rng.gen_range(2..=8);

    Draft::new(
        name,
        concat([tape(&["1"]), blanks(3 * spacing + 2), tape(&["1"])]),
        concat([
            tape(&["1"]),
            blanks(spacing),
            tape(&["1"]),
            blanks(spacing),
            tape(&["1"]),
            blanks(spacing),
            tape(&["1"]),
        ]),
        0,
    )
    .max_state(8)
    .alphabet(&["0", "1"])
    .hints(&[
        "Find one third first:",
        "Remove twice as fast from one side",
        "Then bisect that third and the end",
    ])
    .end_state()
    .build()
}
