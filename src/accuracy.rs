//! Accuracy validation: a rule set solves a challenge only if it solves every one of a batch of
//! freshly generated instances.

use rand::Rng;
use tracing::debug;

use crate::challenges::{challenge_name_to_index, generate_challenge_with, Challenge};
use crate::machine::Run;
use crate::tape::render;
use crate::types::{PuzzleError, Rule, Tape, ACCURACY_TRIALS};

/// An instance the rule set failed on, with what the machine did instead.
#[derive(Debug, Clone)]
pub struct Counterexample {
    pub challenge: Challenge,
    pub run: Run,
    pub final_tape: Tape,
}

/// Checks `rules` against `ACCURACY_TRIALS` fresh instances of the challenge at `index`.
///
/// # Returns
///
/// * `Ok(true)` if every instance is solved.
/// * `Ok(false)` as soon as one instance is not.
/// * `Err(PuzzleError::ChallengeNotFound)` if `index` does not name a challenge.
pub fn calculate_accuracy(rules: &[Rule], index: usize) -> Result<bool, PuzzleError> {
    calculate_accuracy_with(rules, index, &mut rand::thread_rng())
}

/// Like [`calculate_accuracy`], drawing instances from `rng`.
pub fn calculate_accuracy_with<R: Rng + ?Sized>(
    rules: &[Rule],
    index: usize,
    rng: &mut R,
) -> Result<bool, PuzzleError> {
    check_family(rules, ACCURACY_TRIALS, || generate_challenge_with(index, rng))
}

/// Resolves `name` and checks `rules` against its challenge.
pub fn calculate_accuracy_for_challenge(rules: &[Rule], name: &str) -> Result<bool, PuzzleError> {
    let index = challenge_name_to_index(name)?;
    calculate_accuracy(rules, index)
}

/// Checks `rules` against `trials` instances produced by `source`.
pub fn check_family<F>(rules: &[Rule], trials: usize, source: F) -> Result<bool, PuzzleError>
where
    F: FnMut() -> Result<Challenge, PuzzleError>,
{
    Ok(find_counterexample(rules, trials, source)?.is_none())
}

/// Runs `rules` on up to `trials` instances from `source` and returns the first one they
/// fail on.
pub fn find_counterexample<F>(
    rules: &[Rule],
    trials: usize,
    mut source: F,
) -> Result<Option<Counterexample>, PuzzleError>
where
    F: FnMut() -> Result<Challenge, PuzzleError>,
{
    for trial in 0..trials {
        let challenge = source()?;
        let mut machine = challenge.machine(rules);
        let run = machine.run(&challenge.goal_tape, challenge.final_state());

        if !run.outcome.is_accepted() {
            debug!(
                challenge = %challenge.name,
                trial,
                outcome = %run.outcome,
                start = %render(&challenge.start_tape),
                goal = %render(&challenge.goal_tape),
                reached = %render(machine.tape()),
                "failed to solve"
            );
            let final_tape = machine.tape().to_vec();
            return Ok(Some(Counterexample {
                challenge,
                run,
                final_tape,
            }));
        }
    }

    Ok(None)
}
