use std::collections::BTreeMap;

use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;

use crate::bank::{AnswerValue, MatchItem};

/// Terms in bank order beside a column of shuffled definitions. The
/// definition at position `i` is the one paired with term `i`.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchingEditor {
    terms: Vec<String>,
    definitions: Vec<String>,
}

impl MatchingEditor {
    pub fn new(items: &[MatchItem], seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut definitions: Vec<String> = items.iter().map(|i| i.definition.clone()).collect();
        definitions.shuffle(&mut rng);
        MatchingEditor {
            terms: items.iter().map(|i| i.term.clone()).collect(),
            definitions,
        }
    }

    pub fn terms(&self) -> &[String] {
        &self.terms
    }

    pub fn definitions(&self) -> &[String] {
        &self.definitions
    }

    /// Drag-reorder of the definition column.
    pub fn move_definition(&mut self, from: usize, to: usize) -> bool {
        if from >= self.definitions.len() || to >= self.definitions.len() {
            return false;
        }
        let definition = self.definitions.remove(from);
        self.definitions.insert(to, definition);
        true
    }

    /// Puts the definition currently at `definition` into the slot of
    /// `term`, swapping with whatever sat there.
    pub fn assign(&mut self, term: usize, definition: usize) -> bool {
        if term >= self.terms.len() || definition >= self.definitions.len() {
            return false;
        }
        self.definitions.swap(term, definition);
        true
    }

    pub fn mapping(&self) -> BTreeMap<String, String> {
        self.terms.iter()
            .cloned()
            .zip(self.definitions.iter().cloned())
            .collect()
    }

    /// Moves saved definitions back into their terms' slots where possible.
    pub fn restore(&mut self, saved: &BTreeMap<String, String>) {
        for term in 0..self.terms.len() {
            let Some(wanted) = saved.get(&self.terms[term]) else { continue };
            if let Some(position) = self.definitions.iter().skip(term).position(|d| d == wanted) {
                self.definitions.swap(term, term + position);
            }
        }
    }

    pub fn answer(&self) -> AnswerValue {
        AnswerValue::Mapping(self.mapping())
    }
}
