use serde::{Serialize, Deserialize};
use std::collections::BTreeMap;

fn normalize(s: &str) -> String {
    s.trim().to_lowercase()
}

fn text_matches(given: &str, expected: &str) -> bool {
    normalize(given) == normalize(expected)
}

fn sequence_matches(given: &[String], expected: &[String]) -> bool {
    given.len() == expected.len()
        && given.iter().zip(expected).all(|(g, e)| text_matches(g, e))
}

fn stringify(tokens: &[String], separator: &str) -> String {
    tokens.join(separator)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchItem {
    pub term: String,
    pub definition: String,
}

/// A grid position on a hidden-word board.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Cell {
    pub row: usize,
    pub col: usize,
}

impl Cell {
    pub fn new(row: usize, col: usize) -> Self {
        Cell { row, col }
    }
}

/// A word claimed on a hidden-word board, cells in reading order.
/// `cells` may be empty for answers written without positions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FoundWord {
    pub word: String,
    #[serde(default)]
    pub cells: Vec<Cell>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Question {
    id: u32,
    text: String,
    #[serde(flatten)]
    kind: QuestionKind,
}

impl Question {
    pub fn new(id: u32, text: impl Into<String>, kind: QuestionKind) -> Self {
        Question { id, text: text.into(), kind }
    }

    pub fn id(&self) -> u32 {
        self.id
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn kind(&self) -> &QuestionKind {
        &self.kind
    }

    pub fn is_supported(&self) -> bool {
        !matches!(self.kind, QuestionKind::Unsupported)
    }

    /// Correctness of `answer` for this question.
    ///
    /// A missing or wrongly shaped answer is incorrect. Returns `None` only for
    /// unsupported questions, which have no defined scoring.
    pub fn is_correct(&self, answer: Option<&AnswerValue>) -> Option<bool> {
        if !self.is_supported() {
            return None;
        }
        let Some(answer) = answer else { return Some(false) };
        Some(match (&self.kind, answer) {
            (QuestionKind::MultipleChoice { answer: expected, .. }
                | QuestionKind::FillBlank { answer: expected, .. }
                | QuestionKind::TrueFalse { answer: expected }, AnswerValue::Text(given))
                => text_matches(given, expected),
            (QuestionKind::Unscramble { answer: expected, .. }
                | QuestionKind::WordSequence { answer: expected, .. }, AnswerValue::Sequence(given))
                => sequence_matches(given, expected),
            (QuestionKind::Matching { items }, AnswerValue::Mapping(given))
                => matching_is_correct(items, given),
            (QuestionKind::HiddenWord { words, .. }, AnswerValue::FoundWords(found))
                => words.iter().all(|w| found.iter().any(|f| text_matches(&f.word, w))),
            _ => false,
        })
    }

    /// Human readable canonical answer.
    pub fn expected_answer(&self) -> String {
        match &self.kind {
            QuestionKind::MultipleChoice { answer, .. }
                | QuestionKind::FillBlank { answer, .. }
                | QuestionKind::TrueFalse { answer } => answer.clone(),
            QuestionKind::Unscramble { answer, .. } => stringify(answer, ""),
            QuestionKind::WordSequence { answer, .. } => stringify(answer, " "),
            QuestionKind::Matching { items } => items.iter()
                .map(|i| format!("{} = {}", i.term, i.definition))
                .collect::<Vec<_>>()
                .join(", "),
            QuestionKind::HiddenWord { words, .. } => stringify(words, ", "),
            QuestionKind::Unsupported => "".to_string(),
        }
    }
}

fn matching_is_correct(items: &[MatchItem], given: &BTreeMap<String, String>) -> bool {
    let canonical = canonical_mapping(items);
    given.keys().all(|term| canonical.contains_key(term))
        && canonical.iter().all(|(term, definition)| {
            given.get(term).is_some_and(|d| text_matches(d, definition))
        })
}

/// The full term to definition mapping a matching question expects.
pub fn canonical_mapping(items: &[MatchItem]) -> BTreeMap<String, String> {
    items.iter()
        .map(|i| (i.term.clone(), i.definition.clone()))
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum QuestionKind {
    MultipleChoice {
        options: Vec<String>,
        answer: String,
    },
    FillBlank {
        #[serde(default)]
        options: Vec<String>,
        answer: String,
    },
    Matching {
        items: Vec<MatchItem>,
    },
    Unscramble {
        letters: Vec<String>,
        answer: Vec<String>,
    },
    HiddenWord {
        grid: Vec<Vec<char>>,
        words: Vec<String>,
    },
    TrueFalse {
        answer: String,
    },
    WordSequence {
        #[serde(rename = "wordSequence")]
        word_sequence: Vec<String>,
        answer: Vec<String>,
    },
    #[serde(other)]
    Unsupported,
}

impl QuestionKind {
    pub fn label(&self) -> &'static str {
        match self {
            QuestionKind::MultipleChoice { .. } => "multiple-choice",
            QuestionKind::FillBlank { .. } => "fill-blank",
            QuestionKind::Matching { .. } => "matching",
            QuestionKind::Unscramble { .. } => "unscramble",
            QuestionKind::HiddenWord { .. } => "hidden-word",
            QuestionKind::TrueFalse { .. } => "true-false",
            QuestionKind::WordSequence { .. } => "word-sequence",
            QuestionKind::Unsupported => "unsupported",
        }
    }
}

impl std::fmt::Display for QuestionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> Result<(), std::fmt::Error> {
        f.write_str(self.label())
    }
}

/// A learner's answer. The shape depends on the question kind.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum AnswerValue {
    Text(String),
    Sequence(Vec<String>),
    Mapping(BTreeMap<String, String>),
    FoundWords(Vec<FoundWord>),
}

impl AnswerValue {
    pub fn describe(&self) -> String {
        match self {
            AnswerValue::Text(text) => text.clone(),
            AnswerValue::Sequence(tokens) => stringify(tokens, " "),
            AnswerValue::Mapping(mapping) => mapping.iter()
                .map(|(t, d)| format!("{} = {}", t, d))
                .collect::<Vec<_>>()
                .join(", "),
            AnswerValue::FoundWords(found) => found.iter()
                .map(|f| f.word.clone())
                .collect::<Vec<_>>()
                .join(", "),
        }
    }
}
