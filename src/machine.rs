//! This module defines the `Machine` struct, which steps a single-tape Turing machine through
//! a player's rule set. It handles the working tape, head movement, rule lookup and the
//! acceptance loop used to decide whether a run reaches its goal.

use std::collections::BTreeSet;

use tracing::trace;

use crate::types::{Direction, Outcome, Rule, State, Symbol, Tape, TapeMode, BLANK, MAX_STEPS};

/// A single-tape Turing machine run.
///
/// The machine owns a working copy of its tape, so the tape it was built from is never
/// modified. Rules are borrowed and searched in order; the first matching rule wins.
#[derive(Debug, Clone)]
pub struct Machine<'r> {
    rules: &'r [Rule],
    tape: Tape,
    head: isize,
    state: State,
    mode: TapeMode,
    step_count: usize,
    initial_tape: Tape,
    initial_head: isize,
    initial_state: State,
}

/// The states, rules and symbols a run touched, used by editors to hint at unused rules.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Coverage {
    pub states: BTreeSet<State>,
    pub rules: Vec<Rule>,
    pub symbols: BTreeSet<Symbol>,
}

impl Coverage {
    fn visit(&mut self, state: State, symbol: &str) {
        self.states.insert(state);
        self.symbols.insert(symbol.to_string());
    }

    fn fire(&mut self, rule: &Rule) {
        self.states.insert(rule.new_state);
        self.symbols.insert(rule.write.clone());
        if !self.rules.contains(rule) {
            self.rules.push(rule.clone());
        }
    }
}

/// The result of driving a machine until it stops.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Run {
    pub outcome: Outcome,
    /// Transitions executed during this run.
    pub steps: usize,
    pub coverage: Coverage,
}

impl<'r> Machine<'r> {
    /// Creates a new machine over `rules`, starting on a copy of `tape` with the head at
    /// `index` in `state`.
    pub fn new(rules: &'r [Rule], tape: &[Symbol], index: usize, state: State) -> Self {
        let head = isize::try_from(index).unwrap_or(isize::MAX);
        Self {
            rules,
            tape: tape.to_vec(),
            head,
            state,
            mode: TapeMode::default(),
            step_count: 0,
            initial_tape: tape.to_vec(),
            initial_head: head,
            initial_state: state,
        }
    }

    /// Switches the tape edge policy.
    pub fn with_mode(mut self, mode: TapeMode) -> Self {
        self.mode = mode;
        self
    }

    /// Executes a single transition.
    ///
    /// # Returns
    ///
    /// * `Some(&Rule)` with the rule that fired.
    /// * `None` if the head is off the tape or no rule matches. The machine is left untouched.
    pub fn step(&mut self) -> Option<&'r Rule> {
        let position = self.position()?;
        let rule = self.lookup(&self.tape[position])?;

        self.state = rule.new_state;
        self.tape[position] = rule.write.clone();
        self.advance(rule.direction.offset());
        self.step_count += 1;

        trace!(
            step = self.step_count,
            state = rule.state,
            read = %rule.read,
            write = %rule.write,
            next = rule.new_state,
            head = self.head,
            "applied rule"
        );

        Some(rule)
    }

    /// Runs until the goal is reached or the machine stops, with the default step budget.
    ///
    /// `final_state` is the state the machine must be in when the goal tape appears, if any.
    pub fn run(&mut self, goal: &[Symbol], final_state: Option<State>) -> Run {
        self.run_with_budget(goal, final_state, MAX_STEPS)
    }

    /// Runs with an explicit transition budget.
    ///
    /// Each iteration checks the budget, then the goal, then the head position. A machine that
    /// starts at its goal accepts without firing a rule, and a transition that completes the
    /// goal while moving the head off the tape still accepts. A goal completed by the last
    /// budgeted transition is never seen: the run ends as `BudgetExceeded`.
    pub fn run_with_budget(
        &mut self,
        goal: &[Symbol],
        final_state: Option<State>,
        max_steps: usize,
    ) -> Run {
        let mut coverage = Coverage::default();
        let mut steps = 0;

        let outcome = loop {
            if steps >= max_steps {
                break Outcome::BudgetExceeded;
            }

            if self.is_at_goal(goal, final_state) {
                break Outcome::Accepted;
            }

            let Some(position) = self.position() else {
                break Outcome::OutOfBounds;
            };

            coverage.visit(self.state, &self.tape[position]);
            match self.step() {
                Some(rule) => coverage.fire(rule),
                None => break Outcome::NoRule,
            }
            steps += 1;
        };

        trace!(?outcome, steps, "run finished");

        Run {
            outcome,
            steps,
            coverage,
        }
    }

    /// Returns `true` if the machine reaches `goal` (in `final_state`, when given).
    pub fn solve(&mut self, goal: &[Symbol], final_state: Option<State>) -> bool {
        self.run(goal, final_state).outcome.is_accepted()
    }

    /// Checks whether the tape equals `goal` cell for cell and the state requirement holds.
    pub fn is_at_goal(&self, goal: &[Symbol], final_state: Option<State>) -> bool {
        self.tape == goal && final_state.map_or(true, |state| state == self.state)
    }

    /// Finds the first rule matching the current state and `symbol`.
    fn lookup(&self, symbol: &str) -> Option<&'r Rule> {
        let rules: &'r [Rule] = self.rules;
        rules.iter().find(|rule| rule.matches(self.state, symbol))
    }

    /// Returns the rule that would fire next, if the head is on the tape and a rule matches.
    pub fn transition(&self) -> Option<&'r Rule> {
        self.symbol().and_then(|symbol| self.lookup(symbol))
    }

    /// Suggests a rule for the current state and symbol when none exists yet.
    ///
    /// The placeholder keeps the state, rewrites the same symbol and moves right, ready to be
    /// edited by the player.
    pub fn missing_rule(&self) -> Option<Rule> {
        let symbol = self.symbol()?;
        if self.lookup(symbol).is_some() {
            return None;
        }

        Some(Rule::new(
            self.state,
            symbol,
            self.state,
            symbol,
            Direction::Right,
        ))
    }

    /// Moves the head, growing the tape first when running unbounded.
    fn advance(&mut self, offset: isize) {
        let target = self.head + offset;

        if self.mode == TapeMode::Unbounded {
            if target < 0 {
                self.tape.insert(0, BLANK.to_string());
                self.head = 0;
                return;
            }
            if target >= self.len() {
                self.tape.push(BLANK.to_string());
            }
        }

        self.head = target;
    }

    /// Returns the head index as a tape position when it is within bounds.
    fn position(&self) -> Option<usize> {
        usize::try_from(self.head)
            .ok()
            .filter(|&position| position < self.tape.len())
    }

    fn len(&self) -> isize {
        isize::try_from(self.tape.len()).unwrap_or(isize::MAX)
    }

    /// Returns the symbol under the head, or `None` when the head is off the tape.
    pub fn symbol(&self) -> Option<&str> {
        self.position().map(|position| self.tape[position].as_str())
    }

    /// Returns the current state.
    pub fn state(&self) -> State {
        self.state
    }

    /// Returns a view of the working tape.
    pub fn tape(&self) -> &[Symbol] {
        &self.tape
    }

    /// Returns the head index. Negative or past-the-end values mean the head fell off.
    pub fn head(&self) -> isize {
        self.head
    }

    /// Returns whether the head is still on the tape.
    pub fn in_bounds(&self) -> bool {
        self.position().is_some()
    }

    /// Returns the total number of transitions executed since creation or the last reset.
    pub fn step_count(&self) -> usize {
        self.step_count
    }

    /// Restores the tape, head, state and step count to their initial values.
    pub fn reset(&mut self) {
        self.tape = self.initial_tape.clone();
        self.head = self.initial_head;
        self.state = self.initial_state;
        self.step_count = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tape::tape;

    fn write_one() -> Vec<Rule> {
        vec![Rule::new(0, "_", 0, "1", Direction::Right)]
    }

    #[test]
    fn test_machine_creation() {
        let rules = write_one();
        let machine = Machine::new(&rules, &tape(&["_"]), 0, 0);

        assert_eq!(machine.state(), 0);
        assert_eq!(machine.tape(), tape(&["_"]).as_slice());
        assert_eq!(machine.head(), 0);
        assert_eq!(machine.step_count(), 0);
        assert_eq!(machine.symbol(), Some("_"));
    }

    #[test]
    fn test_step_writes_before_moving() {
        let rules = vec![Rule::new(0, "a", 3, "b", Direction::Left)];
        let mut machine = Machine::new(&rules, &tape(&["x", "a"]), 1, 0);

        let fired = machine.step();

        assert_eq!(fired, Some(&rules[0]));
        assert_eq!(machine.tape(), tape(&["x", "b"]).as_slice());
        assert_eq!(machine.head(), 0);
        assert_eq!(machine.state(), 3);
        assert_eq!(machine.step_count(), 1);
    }

    #[test]
    fn test_step_without_rule_leaves_machine_untouched() {
        let rules = vec![Rule::new(1, "_", 0, "1", Direction::Right)];
        let mut machine = Machine::new(&rules, &tape(&["_"]), 0, 0);

        assert_eq!(machine.step(), None);
        assert_eq!(machine.tape(), tape(&["_"]).as_slice());
        assert_eq!(machine.head(), 0);
        assert_eq!(machine.state(), 0);
        assert_eq!(machine.step_count(), 0);
    }

    #[test]
    fn test_step_out_of_bounds_returns_none() {
        let rules = write_one();
        let mut machine = Machine::new(&rules, &tape(&["_"]), 0, 0);

        assert!(machine.step().is_some());
        assert!(!machine.in_bounds());
        assert_eq!(machine.step(), None);
        assert_eq!(machine.head(), 1);
    }

    #[test]
    fn test_first_matching_rule_wins() {
        let rules = vec![
            Rule::new(0, "_", 0, "1", Direction::Right),
            Rule::new(0, "_", 0, "0", Direction::Right),
        ];

        for _ in 0..3 {
            let mut machine = Machine::new(&rules, &tape(&["_", "_"]), 0, 0);
            assert_eq!(machine.step(), Some(&rules[0]));
            assert_eq!(machine.tape()[0], "1");
        }
    }

    #[test]
    fn test_input_tape_is_not_aliased() {
        let rules = write_one();
        let start = tape(&["_"]);
        let mut machine = Machine::new(&rules, &start, 0, 0);

        machine.step();

        assert_eq!(start, tape(&["_"]));
        assert_eq!(machine.tape(), tape(&["1"]).as_slice());
    }

    #[test]
    fn test_accepts_before_stepping() {
        let rules: Vec<Rule> = Vec::new();
        let mut machine = Machine::new(&rules, &tape(&["1", "0"]), 0, 2);

        let run = machine.run(&tape(&["1", "0"]), Some(2));

        assert_eq!(run.outcome, Outcome::Accepted);
        assert_eq!(run.steps, 0);
    }

    #[test]
    fn test_missing_rule_fails() {
        let rules: Vec<Rule> = Vec::new();
        let mut machine = Machine::new(&rules, &tape(&["_"]), 0, 0);

        assert!(!machine.solve(&tape(&["1"]), None));
    }

    #[test]
    fn test_accepts_when_goal_written_while_leaving_tape() {
        let rules = write_one();
        let mut machine = Machine::new(&rules, &tape(&["_"]), 0, 0);

        let run = machine.run(&tape(&["1"]), None);

        assert_eq!(run.outcome, Outcome::Accepted);
        assert_eq!(run.steps, 1);
        assert!(!machine.in_bounds());
    }

    #[test]
    fn test_out_of_bounds_outcome() {
        let rules = vec![Rule::new(0, "_", 0, "_", Direction::Left)];
        let mut machine = Machine::new(&rules, &tape(&["_", "_"]), 1, 0);

        let run = machine.run(&tape(&["1", "1"]), None);

        assert_eq!(run.outcome, Outcome::OutOfBounds);
        assert_eq!(run.steps, 2);
        assert_eq!(machine.head(), -1);
    }

    #[test]
    fn test_final_state_is_required() {
        let rules = vec![Rule::new(0, "_", 1, "1", Direction::Right)];
        let mut machine = Machine::new(&rules, &tape(&["_"]), 0, 0);

        assert!(!machine.solve(&tape(&["1"]), Some(2)));

        machine.reset();
        assert!(machine.solve(&tape(&["1"]), Some(1)));
    }

    #[test]
    fn test_budget_exceeded() {
        let rules = vec![
            Rule::new(0, "_", 1, "_", Direction::Right),
            Rule::new(1, "_", 0, "_", Direction::Left),
        ];
        let mut machine = Machine::new(&rules, &tape(&["_", "_"]), 0, 0);

        let run = machine.run(&tape(&["1", "1"]), None);

        assert_eq!(run.outcome, Outcome::BudgetExceeded);
        assert_eq!(run.steps, MAX_STEPS);
        assert_eq!(machine.step_count(), MAX_STEPS);
    }

    #[test]
    fn test_goal_reached_on_last_budgeted_step() {
        let rules = vec![Rule::new(0, "_", 0, "1", Direction::Right)];
        let mut machine = Machine::new(&rules, &tape(&["_", "_", "_"]), 0, 0);

        let run = machine.run_with_budget(&tape(&["1", "1", "1"]), None, 3);
        assert_eq!(run.outcome, Outcome::BudgetExceeded);
        assert_eq!(run.steps, 3);
        assert_eq!(machine.tape(), tape(&["1", "1", "1"]).as_slice());

        machine.reset();
        let run = machine.run_with_budget(&tape(&["1", "1", "1"]), None, 4);
        assert_eq!(run.outcome, Outcome::Accepted);
        assert_eq!(run.steps, 3);
    }

    #[test]
    fn test_goal_on_thousandth_transition_is_too_late() {
        let rules = vec![Rule::new(0, "_", 0, "1", Direction::Right)];
        let start = vec![BLANK.to_string(); MAX_STEPS];
        let goal = vec!["1".to_string(); MAX_STEPS];
        let mut machine = Machine::new(&rules, &start, 0, 0);

        let run = machine.run(&goal, None);
        assert_eq!(run.outcome, Outcome::BudgetExceeded);
        assert_eq!(run.steps, MAX_STEPS);

        let shorter = vec![BLANK.to_string(); MAX_STEPS - 1];
        let mut machine = Machine::new(&rules, &shorter, 0, 0);
        assert!(machine.solve(&vec!["1".to_string(); MAX_STEPS - 1], None));
    }

    #[test]
    fn test_coverage() {
        let rules = vec![
            Rule::new(0, "0", 0, "1", Direction::Right),
            Rule::new(0, "1", 1, "0", Direction::Right),
            Rule::new(5, "x", 5, "x", Direction::Right),
        ];
        let mut machine = Machine::new(&rules, &tape(&["0", "1", "0"]), 0, 0);

        let run = machine.run(&tape(&["1", "0", "1"]), None);

        assert_eq!(run.outcome, Outcome::NoRule);
        assert_eq!(run.coverage.rules, vec![rules[0].clone(), rules[1].clone()]);
        assert_eq!(run.coverage.states, BTreeSet::from([0, 1]));
        assert!(run.coverage.symbols.contains("0"));
        assert!(run.coverage.symbols.contains("1"));
        assert!(!run.coverage.symbols.contains("x"));
    }

    #[test]
    fn test_missing_rule_suggestion() {
        let rules = vec![Rule::new(0, "1", 0, "1", Direction::Right)];
        let mut machine = Machine::new(&rules, &tape(&["1", "_"]), 0, 0);

        assert_eq!(machine.missing_rule(), None);
        assert_eq!(machine.transition(), Some(&rules[0]));

        machine.step();
        assert_eq!(machine.transition(), None);
        assert_eq!(
            machine.missing_rule(),
            Some(Rule::new(0, "_", 0, "_", Direction::Right))
        );
    }

    #[test]
    fn test_reset() {
        let rules = write_one();
        let mut machine = Machine::new(&rules, &tape(&["_"]), 0, 0);

        machine.step();
        machine.reset();

        assert_eq!(machine.tape(), tape(&["_"]).as_slice());
        assert_eq!(machine.head(), 0);
        assert_eq!(machine.state(), 0);
        assert_eq!(machine.step_count(), 0);
    }

    #[test]
    fn test_unbounded_mode_grows_tape() {
        let rules = vec![
            Rule::new(0, "_", 1, "1", Direction::Left),
            Rule::new(1, "_", 2, "1", Direction::Right),
            Rule::new(2, "1", 2, "1", Direction::Right),
        ];
        let mut machine =
            Machine::new(&rules, &tape(&["_"]), 0, 0).with_mode(TapeMode::Unbounded);

        machine.step();
        assert_eq!(machine.tape(), tape(&["_", "1"]).as_slice());
        assert_eq!(machine.head(), 0);

        machine.step();
        assert_eq!(machine.tape(), tape(&["1", "1"]).as_slice());
        assert_eq!(machine.head(), 1);

        machine.step();
        assert_eq!(machine.tape(), tape(&["1", "1", "_"]).as_slice());
        assert_eq!(machine.head(), 2);
        assert!(machine.in_bounds());
    }
}
