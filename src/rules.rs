//! An ordered collection of authored rules holding at most one rule per `(state, read)` key.

use serde::{Deserialize, Serialize};

use crate::types::{Rule, State};

/// A player's rule set.
///
/// Insertion order is preserved so that the rules display in the order they were authored.
/// Writes go through [`RuleSet::upsert`] or [`RuleSet::replace`], which keep keys unique.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<Rule>", into = "Vec<Rule>")]
pub struct RuleSet {
    rules: Vec<Rule>,
}

impl RuleSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts `rule`, replacing in place any rule with the same `(state, read)` key.
    ///
    /// Returns the displaced rule, if any.
    pub fn upsert(&mut self, rule: Rule) -> Option<Rule> {
        match self.position(rule.state, &rule.read) {
            Some(i) => Some(std::mem::replace(&mut self.rules[i], rule)),
            None => {
                self.rules.push(rule);
                None
            }
        }
    }

    /// Edits the rule stored under `old` so that it becomes `rule`.
    ///
    /// The edit vacates `old` and occupies `rule`'s key. A different rule already holding the
    /// new key is dropped. When `old` is absent this behaves like [`RuleSet::upsert`].
    pub fn replace(&mut self, old: (State, &str), rule: Rule) {
        let Some(i) = self.position(old.0, old.1) else {
            self.upsert(rule);
            return;
        };

        if let Some(j) = self.position(rule.state, &rule.read) {
            if j != i {
                self.rules.remove(j);
                let i = if j < i { i - 1 } else { i };
                self.rules[i] = rule;
                return;
            }
        }

        self.rules[i] = rule;
    }

    /// Removes and returns the rule stored under `(state, read)`.
    pub fn remove(&mut self, state: State, read: &str) -> Option<Rule> {
        self.position(state, read).map(|i| self.rules.remove(i))
    }

    /// Returns the rule stored under `(state, read)`.
    pub fn get(&self, state: State, read: &str) -> Option<&Rule> {
        self.position(state, read).map(|i| &self.rules[i])
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Rule> {
        self.rules.iter()
    }

    /// Returns the rules in authoring order, as consumed by the interpreter.
    pub fn as_slice(&self) -> &[Rule] {
        &self.rules
    }

    fn position(&self, state: State, read: &str) -> Option<usize> {
        self.rules.iter().position(|rule| rule.matches(state, read))
    }
}

impl std::ops::Deref for RuleSet {
    type Target = [Rule];

    fn deref(&self) -> &[Rule] {
        &self.rules
    }
}

impl FromIterator<Rule> for RuleSet {
    /// Collects rules with upsert semantics: a later rule replaces an earlier one with the
    /// same key.
    fn from_iter<I: IntoIterator<Item = Rule>>(iter: I) -> Self {
        let mut set = RuleSet::new();
        for rule in iter {
            set.upsert(rule);
        }
        set
    }
}

impl From<Vec<Rule>> for RuleSet {
    fn from(rules: Vec<Rule>) -> Self {
        rules.into_iter().collect()
    }
}

impl From<RuleSet> for Vec<Rule> {
    fn from(set: RuleSet) -> Self {
        set.rules
    }
}

impl IntoIterator for RuleSet {
    type Item = Rule;
    type IntoIter = std::vec::IntoIter<Rule>;

    fn into_iter(self) -> Self::IntoIter {
        self.rules.into_iter()
    }
}

impl<'a> IntoIterator for &'a RuleSet {
    type Item = &'a Rule;
    type IntoIter = std::slice::Iter<'a, Rule>;

    fn into_iter(self) -> Self::IntoIter {
        self.rules.iter()
    }
}
