mod matching;
mod sequence;
mod word_search;

pub use matching::MatchingEditor;
pub use sequence::SequenceEditor;
pub use word_search::{SelectionOutcome, WordSearch};

use serde::{Deserialize, Serialize};

use crate::bank::{AnswerValue, Cell, Question, QuestionKind};
use crate::error::{Error, QuizResult};

const TRUE_FALSE_OPTIONS: [&str; 2] = ["True", "False"];

/// One learner interaction with the active question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum EditAction {
    Choose(usize),
    Text(String),
    Move { from: usize, to: usize },
    Assign { term: usize, definition: usize },
    PointerDown(Cell),
    PointerMove(Cell),
    PointerUp,
    ClearSelection,
}

impl EditAction {
    fn name(&self) -> &'static str {
        match self {
            EditAction::Choose(_) => "choose",
            EditAction::Text(_) => "text",
            EditAction::Move { .. } => "move",
            EditAction::Assign { .. } => "assign",
            EditAction::PointerDown(_) | EditAction::PointerMove(_)
                | EditAction::PointerUp | EditAction::ClearSelection => "select",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum EditOutcome {
    /// The editor's answer changed and was written to the session.
    Answered,
    /// Out of range or otherwise a no-op.
    Ignored,
    /// Word-search selection path changed.
    Selecting,
    /// Word-search selection released.
    Selection(SelectionOutcome),
}

impl EditOutcome {
    pub fn changes_answer(&self) -> bool {
        matches!(self, EditOutcome::Answered
            | EditOutcome::Selection(SelectionOutcome::Found { .. }))
    }
}

/// Working state of the question on screen, rebuilt whenever the current
/// question changes.
#[derive(Debug, Clone)]
pub enum ActiveEditor {
    Choice { options: Vec<String>, selected: Option<String> },
    Text { value: Option<String> },
    Matching(MatchingEditor),
    Sequence { editor: SequenceEditor, letters: bool },
    WordSearch(WordSearch),
    Unsupported,
}

/// Per-question shuffle seed.
pub fn question_seed(session_seed: u64, question_id: u32) -> u64 {
    session_seed ^ (question_id as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15)
}

impl ActiveEditor {
    pub fn for_question(question: &Question, session_seed: u64, saved: Option<&AnswerValue>) -> Self {
        let seed = question_seed(session_seed, question.id());
        let mut editor = match question.kind() {
            QuestionKind::MultipleChoice { options, .. } => ActiveEditor::Choice {
                options: options.clone(),
                selected: None,
            },
            QuestionKind::TrueFalse { .. } => ActiveEditor::Choice {
                options: TRUE_FALSE_OPTIONS.iter().map(|o| o.to_string()).collect(),
                selected: None,
            },
            QuestionKind::FillBlank { options, .. } if !options.is_empty() => ActiveEditor::Choice {
                options: options.clone(),
                selected: None,
            },
            QuestionKind::FillBlank { .. } => ActiveEditor::Text { value: None },
            QuestionKind::Matching { items } => ActiveEditor::Matching(MatchingEditor::new(items, seed)),
            QuestionKind::Unscramble { letters, .. } => ActiveEditor::Sequence {
                editor: SequenceEditor::new(letters.clone()),
                letters: true,
            },
            QuestionKind::WordSequence { word_sequence, answer } => ActiveEditor::Sequence {
                editor: SequenceEditor::shuffled(word_sequence.clone(), answer, seed),
                letters: false,
            },
            QuestionKind::HiddenWord { grid, words } => {
                ActiveEditor::WordSearch(WordSearch::new(grid.clone(), words.clone()))
            }
            QuestionKind::Unsupported => ActiveEditor::Unsupported,
        };
        if let Some(saved) = saved {
            editor.restore(saved);
        }
        editor
    }

    fn restore(&mut self, saved: &AnswerValue) {
        match (self, saved) {
            (ActiveEditor::Choice { selected, .. }, AnswerValue::Text(text)) => *selected = Some(text.clone()),
            (ActiveEditor::Text { value }, AnswerValue::Text(text)) => *value = Some(text.clone()),
            (ActiveEditor::Matching(editor), AnswerValue::Mapping(mapping)) => editor.restore(mapping),
            (ActiveEditor::Sequence { editor, .. }, AnswerValue::Sequence(tokens)) => editor.restore(tokens),
            (ActiveEditor::WordSearch(board), AnswerValue::FoundWords(found)) => board.restore(found),
            _ => (),
        }
    }

    /// The answer the editor currently shows, if the learner gave one.
    pub fn answer(&self) -> Option<AnswerValue> {
        match self {
            ActiveEditor::Choice { selected, .. } => selected.clone().map(AnswerValue::Text),
            ActiveEditor::Text { value } => value.clone().map(AnswerValue::Text),
            ActiveEditor::Matching(editor) => Some(editor.answer()),
            ActiveEditor::Sequence { editor, .. } => Some(editor.answer()),
            ActiveEditor::WordSearch(board) => Some(board.answer()),
            ActiveEditor::Unsupported => None,
        }
    }

    pub fn apply(&mut self, action: EditAction) -> QuizResult<EditOutcome> {
        let answered = |changed: bool| if changed { EditOutcome::Answered } else { EditOutcome::Ignored };
        let outcome = match (&mut *self, &action) {
            (ActiveEditor::Choice { options, selected }, EditAction::Choose(i)) => {
                match options.get(*i) {
                    Some(option) => { *selected = Some(option.clone()); EditOutcome::Answered },
                    None => EditOutcome::Ignored,
                }
            },
            (ActiveEditor::Choice { selected, .. }, EditAction::Text(text))
                | (ActiveEditor::Text { value: selected }, EditAction::Text(text)) => {
                *selected = Some(text.clone());
                EditOutcome::Answered
            },
            (ActiveEditor::Matching(editor), EditAction::Move { from, to })
                => answered(editor.move_definition(*from, *to)),
            (ActiveEditor::Matching(editor), EditAction::Assign { term, definition })
                => answered(editor.assign(*term, *definition)),
            (ActiveEditor::Sequence { editor, .. }, EditAction::Move { from, to })
                => answered(editor.move_token(*from, *to)),
            (ActiveEditor::Sequence { editor, letters }, EditAction::Text(text)) => {
                editor.replace_with(tokenize(text, *letters));
                EditOutcome::Answered
            },
            (ActiveEditor::WordSearch(board), EditAction::PointerDown(cell)) => {
                if board.pointer_down(*cell) { EditOutcome::Selecting } else { EditOutcome::Ignored }
            },
            (ActiveEditor::WordSearch(board), EditAction::PointerMove(cell)) => {
                if board.pointer_move(*cell) { EditOutcome::Selecting } else { EditOutcome::Ignored }
            },
            (ActiveEditor::WordSearch(board), EditAction::PointerUp)
                => EditOutcome::Selection(board.pointer_up()),
            (ActiveEditor::WordSearch(board), EditAction::ClearSelection) => {
                board.cancel();
                EditOutcome::Selecting
            },
            (editor, action) => return Err(Error::InvalidEdit(
                format!("`{}` does not apply to a {} question", action.name(), editor.label())
            )),
        };
        Ok(outcome)
    }

    pub fn label(&self) -> &'static str {
        match self {
            ActiveEditor::Choice { .. } => "choice",
            ActiveEditor::Text { .. } => "fill-in",
            ActiveEditor::Matching(_) => "matching",
            ActiveEditor::Sequence { letters: true, .. } => "unscramble",
            ActiveEditor::Sequence { letters: false, .. } => "word-sequence",
            ActiveEditor::WordSearch(_) => "hidden-word",
            ActiveEditor::Unsupported => "unsupported",
        }
    }
}

/// Splits typed text into tokens: words, or single letters for unscramble
/// answers typed without spaces.
fn tokenize(text: &str, letters: bool) -> Vec<String> {
    let text = text.trim();
    if letters && !text.contains(char::is_whitespace) {
        text.chars().map(|c| c.to_string()).collect()
    } else {
        text.split_whitespace().map(String::from).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bank::{FoundWord, MatchItem};

    fn words(s: &str) -> Vec<String> {
        s.split_whitespace().map(String::from).collect()
    }

    #[test]
    fn test_choice_and_true_false() {
        let q = Question::new(1, "Pick", QuestionKind::MultipleChoice { options: words("red blue"), answer: "blue".into() });
        let mut editor = ActiveEditor::for_question(&q, 0, None);
        assert_eq!(editor.answer(), None);
        assert_eq!(editor.apply(EditAction::Choose(1)).unwrap(), EditOutcome::Answered);
        assert_eq!(editor.answer(), Some(AnswerValue::Text("blue".into())));
        assert_eq!(editor.apply(EditAction::Choose(7)).unwrap(), EditOutcome::Ignored);

        let q = Question::new(2, "Fish swim", QuestionKind::TrueFalse { answer: "True".into() });
        let mut editor = ActiveEditor::for_question(&q, 0, None);
        editor.apply(EditAction::Choose(0)).unwrap();
        assert_eq!(q.is_correct(editor.answer().as_ref()), Some(true));
    }

    #[test]
    fn test_wrong_action_for_kind_is_rejected() {
        let q = Question::new(1, "Type it", QuestionKind::FillBlank { options: vec![], answer: "dog".into() });
        let mut editor = ActiveEditor::for_question(&q, 0, None);
        assert!(matches!(editor.apply(EditAction::Move { from: 0, to: 1 }), Err(Error::InvalidEdit(_))));
        editor.apply(EditAction::Text("Dog".into())).unwrap();
        assert_eq!(q.is_correct(editor.answer().as_ref()), Some(true));
    }

    #[test]
    fn test_unscramble_text_splits_letters() {
        let q = Question::new(1, "Unscramble", QuestionKind::Unscramble { letters: words("T A C"), answer: words("C A T") });
        let mut editor = ActiveEditor::for_question(&q, 0, None);
        assert_eq!(editor.answer(), Some(AnswerValue::Sequence(words("T A C"))));
        editor.apply(EditAction::Text("cat".into())).unwrap();
        assert_eq!(q.is_correct(editor.answer().as_ref()), Some(true));
    }

    #[test]
    fn test_rebuild_is_deterministic_and_restores() {
        let items = vec![
            MatchItem { term: "hot".into(), definition: "warm".into() },
            MatchItem { term: "cold".into(), definition: "chilly".into() },
            MatchItem { term: "wet".into(), definition: "damp".into() },
        ];
        let q = Question::new(4, "Match", QuestionKind::Matching { items: items.clone() });
        let first = ActiveEditor::for_question(&q, 11, None);
        let again = ActiveEditor::for_question(&q, 11, None);
        assert_eq!(first.answer(), again.answer());

        let saved = AnswerValue::Mapping(crate::bank::canonical_mapping(&items));
        let resumed = ActiveEditor::for_question(&q, 11, Some(&saved));
        assert_eq!(resumed.answer(), Some(saved));
    }

    #[test]
    fn test_word_search_flow() {
        let q = Question::new(5, "Find", QuestionKind::HiddenWord {
            grid: vec!["CAT".chars().collect()],
            words: words("CAT"),
        });
        let mut editor = ActiveEditor::for_question(&q, 0, None);
        assert_eq!(editor.apply(EditAction::PointerDown(Cell::new(0, 0))).unwrap(), EditOutcome::Selecting);
        assert_eq!(editor.apply(EditAction::PointerMove(Cell::new(0, 2))).unwrap(), EditOutcome::Selecting);
        let outcome = editor.apply(EditAction::PointerUp).unwrap();
        assert!(outcome.changes_answer());
        assert_eq!(q.is_correct(editor.answer().as_ref()), Some(true));

        let saved = editor.answer().unwrap();
        let resumed = ActiveEditor::for_question(&q, 0, Some(&saved));
        match resumed {
            ActiveEditor::WordSearch(board) => {
                assert!(board.is_claimed(Cell::new(0, 1)));
                assert_eq!(board.found(), &vec![FoundWord {
                    word: "CAT".into(),
                    cells: vec![Cell::new(0, 0), Cell::new(0, 1), Cell::new(0, 2)],
                }]);
            }
            other => panic!("unexpected editor {:?}", other),
        }
    }
}
