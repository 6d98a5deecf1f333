use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;

use crate::bank::AnswerValue;

/// Reorderable token row used by unscramble and word-sequence questions.
#[derive(Debug, Clone, PartialEq)]
pub struct SequenceEditor {
    tokens: Vec<String>,
}

impl SequenceEditor {
    pub fn new(tokens: Vec<String>) -> Self {
        SequenceEditor { tokens }
    }

    /// Shuffles `tokens` with `seed`. A shuffle that lands on `solution` is
    /// rotated by one so the row never starts out solved.
    pub fn shuffled(mut tokens: Vec<String>, solution: &[String], seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        tokens.shuffle(&mut rng);
        let all_same = tokens.windows(2).all(|w| w[0] == w[1]);
        if !all_same && tokens.as_slice() == solution {
            tokens.rotate_left(1);
        }
        SequenceEditor { tokens }
    }

    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    pub fn move_token(&mut self, from: usize, to: usize) -> bool {
        if from >= self.tokens.len() || to >= self.tokens.len() {
            return false;
        }
        let token = self.tokens.remove(from);
        self.tokens.insert(to, token);
        true
    }

    pub fn replace_with(&mut self, tokens: Vec<String>) {
        self.tokens = tokens;
    }

    /// Adopts a saved order when it uses the same tokens.
    pub fn restore(&mut self, saved: &[String]) {
        let mut current = self.tokens.clone();
        let mut other = saved.to_vec();
        current.sort();
        other.sort();
        if current == other {
            self.tokens = saved.to_vec();
        }
    }

    pub fn answer(&self) -> AnswerValue {
        AnswerValue::Sequence(self.tokens.clone())
    }
}
