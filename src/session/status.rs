use std::collections::{BTreeMap, BTreeSet};
use serde::{Deserialize, Serialize};

use crate::bank::{AnswerValue, Question};
use crate::editor::ActiveEditor;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SessionStatus {
    Question {
        index: usize,
        /// Correctness shown between scoring and the delayed advance.
        feedback: Option<bool>,
    },
    Terminal,
    Finished,
}

impl SessionStatus {
    pub fn question(&self) -> Option<usize> {
        if let SessionStatus::Question { index, .. } = self { Some(*index) } else { None }
    }

    pub fn is_showing_feedback(&self) -> bool {
        matches!(self, SessionStatus::Question { feedback: Some(_), .. })
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, SessionStatus::Terminal)
    }
}

/// One scored question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyticsRecord {
    pub question_id: u32,
    pub time_spent_seconds: u64,
    pub correct: bool,
    pub answer: Option<AnswerValue>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyticsSummary {
    pub score: usize,
    pub total: usize,
    pub average_time_seconds: f64,
    pub flagged_count: usize,
    pub skipped_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Event {
    QuestionShown {
        index: usize,
        total: usize,
        question_id: u32,
    },
    Feedback {
        question_id: u32,
        correct: bool,
        expected: String,
    },
    WordFound {
        question_id: u32,
        word: String,
        complete: bool,
    },
    Terminal {
        score: usize,
        total: usize,
    },
    Finished(AnalyticsSummary),
    Closed,
}

/// What the host needs to draw the current question.
#[derive(Debug, Clone)]
pub struct QuestionView {
    pub index: usize,
    pub total: usize,
    pub question: Question,
    pub editor: ActiveEditor,
    pub answer: Option<AnswerValue>,
    pub flagged: bool,
    pub skipped: bool,
    pub locked: bool,
    pub feedback: Option<bool>,
    pub elapsed_seconds: u64,
    pub score: usize,
}

/// Serializable session state for backup and resume.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub question_ids: Vec<u32>,
    /// `None` once every question was scored or skipped.
    pub current_index: Option<usize>,
    pub answers: BTreeMap<u32, AnswerValue>,
    pub flagged: BTreeSet<u32>,
    pub skipped: BTreeSet<u32>,
    pub analytics: Vec<AnalyticsRecord>,
    pub elapsed_seconds: u64,
}
