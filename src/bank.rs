mod config;
mod question;

pub use config::{ChapterKey, Config, SessionSettings, get_config};
pub use question::{AnswerValue, Cell, FoundWord, MatchItem, Question, QuestionKind, canonical_mapping};
