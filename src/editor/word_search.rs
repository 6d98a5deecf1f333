//! Hidden-word board: select a straight run of cells and test it against the
//! target words, forward or reversed.

use std::collections::HashMap;

use crate::bank::{AnswerValue, Cell, FoundWord};

/// Shortest run of cells that is checked against the word list.
pub const MIN_RUN: usize = 2;

#[derive(Debug, Clone, PartialEq)]
enum Selection {
    Idle,
    Selecting { anchor: Cell, path: Vec<Cell> },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectionOutcome {
    /// Pointer released without an active selection.
    Ignored,
    TooShort,
    NoMatch,
    AlreadyFound(String),
    Found { word: String, complete: bool },
}

#[derive(Debug, Clone)]
pub struct WordSearch {
    grid: Vec<Vec<char>>,
    words: Vec<String>,
    selection: Selection,
    found: Vec<FoundWord>,
    claimed: HashMap<Cell, usize>,
}

fn same_word(a: &str, b: &str) -> bool {
    a.trim().to_uppercase() == b.trim().to_uppercase()
}

impl WordSearch {
    pub fn new(grid: Vec<Vec<char>>, words: Vec<String>) -> Self {
        WordSearch {
            grid,
            words,
            selection: Selection::Idle,
            found: Vec::new(),
            claimed: HashMap::new(),
        }
    }

    pub fn grid(&self) -> &Vec<Vec<char>> {
        &self.grid
    }

    pub fn words(&self) -> &Vec<String> {
        &self.words
    }

    pub fn found(&self) -> &Vec<FoundWord> {
        &self.found
    }

    pub fn path(&self) -> &[Cell] {
        match &self.selection {
            Selection::Idle => &[],
            Selection::Selecting { path, .. } => path,
        }
    }

    pub fn letter(&self, cell: Cell) -> Option<char> {
        self.grid.get(cell.row).and_then(|row| row.get(cell.col)).copied()
    }

    pub fn is_claimed(&self, cell: Cell) -> bool {
        self.claimed.contains_key(&cell)
    }

    pub fn is_found(&self, word: &str) -> bool {
        self.found.iter().any(|f| same_word(&f.word, word))
    }

    pub fn is_complete(&self) -> bool {
        self.words.iter().all(|w| self.is_found(w))
    }

    pub fn answer(&self) -> AnswerValue {
        AnswerValue::FoundWords(self.found.clone())
    }

    /// Starts a selection. Returns false when the cell is off the board or
    /// already part of a found word.
    pub fn pointer_down(&mut self, cell: Cell) -> bool {
        if self.letter(cell).is_none() || self.is_claimed(cell) {
            return false;
        }
        self.selection = Selection::Selecting { anchor: cell, path: vec![cell] };
        true
    }

    /// Extends the selection from the anchor to `cell`. The path is left
    /// untouched if the new line is not straight, leaves the board or
    /// crosses a claimed cell.
    pub fn pointer_move(&mut self, cell: Cell) -> bool {
        let Selection::Selecting { anchor, .. } = self.selection else {
            return false;
        };
        match self.line(anchor, cell) {
            Some(line) => {
                self.selection = Selection::Selecting { anchor, path: line };
                true
            }
            None => false,
        }
    }

    pub fn pointer_up(&mut self) -> SelectionOutcome {
        let path = match std::mem::replace(&mut self.selection, Selection::Idle) {
            Selection::Idle => return SelectionOutcome::Ignored,
            Selection::Selecting { path, .. } => path,
        };
        if path.len() < MIN_RUN {
            return SelectionOutcome::TooShort;
        }

        let letters: String = path.iter()
            .filter_map(|c| self.letter(*c))
            .collect::<String>()
            .to_uppercase();
        let reversed: String = letters.chars().rev().collect();

        let target = self.words.iter()
            .filter(|w| !self.is_found(w))
            .find_map(|w| {
                if same_word(w, &letters) { Some((w.clone(), false)) }
                else if same_word(w, &reversed) { Some((w.clone(), true)) }
                else { None }
            });

        match target {
            Some((word, is_reversed)) => {
                let cells = if is_reversed { path.into_iter().rev().collect() } else { path };
                self.claim(FoundWord { word: word.clone(), cells });
                SelectionOutcome::Found { word, complete: self.is_complete() }
            }
            None => match self.found.iter().find(|f| same_word(&f.word, &letters) || same_word(&f.word, &reversed)) {
                Some(f) => SelectionOutcome::AlreadyFound(f.word.clone()),
                None => SelectionOutcome::NoMatch,
            },
        }
    }

    pub fn cancel(&mut self) {
        self.selection = Selection::Idle;
    }

    /// Rebuilds found words from a saved answer. Cells are claimed only if
    /// they still spell the word on this board, otherwise the word counts as
    /// found without highlighting.
    pub fn restore(&mut self, saved: &[FoundWord]) {
        for entry in saved {
            let Some(word) = self.words.iter().find(|w| same_word(w, &entry.word)).cloned() else {
                continue;
            };
            if self.is_found(&word) {
                continue;
            }
            let cells = if self.spells(&entry.cells, &word) { entry.cells.clone() } else { Vec::new() };
            self.claim(FoundWord { word, cells });
        }
    }

    fn spells(&self, cells: &[Cell], word: &str) -> bool {
        !cells.is_empty()
            && cells.iter().all(|c| !self.is_claimed(*c))
            && cells.iter()
                .map(|c| self.letter(*c))
                .collect::<Option<String>>()
                .is_some_and(|letters| same_word(&letters, word))
    }

    fn claim(&mut self, found: FoundWord) {
        let index = self.found.len();
        for cell in &found.cells {
            self.claimed.insert(*cell, index);
        }
        self.found.push(found);
    }

    fn line(&self, from: Cell, to: Cell) -> Option<Vec<Cell>> {
        self.letter(from)?;
        self.letter(to)?;
        let d_row = to.row as isize - from.row as isize;
        let d_col = to.col as isize - from.col as isize;
        if d_row != 0 && d_col != 0 && d_row.abs() != d_col.abs() {
            return None;
        }

        let steps = d_row.abs().max(d_col.abs());
        let (s_row, s_col) = (d_row.signum(), d_col.signum());
        let mut line = Vec::new();
        for i in 0..=steps {
            let cell = Cell::new(
                (from.row as isize + s_row * i) as usize,
                (from.col as isize + s_col * i) as usize,
            );
            if self.letter(cell).is_none() || self.is_claimed(cell) {
                return None;
            }
            line.push(cell);
        }
        Some(line)
    }
}
