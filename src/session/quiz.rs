use std::collections::{BTreeMap, BTreeSet};
use std::sync::Mutex;

use crate::bank::{AnswerValue, Question};
use crate::error::{Error, QuizResult};

use super::{AnalyticsRecord, AnalyticsSummary, SessionSnapshot, SessionStatus};

pub type CompletionCallback = Box<dyn FnOnce(Vec<AnalyticsRecord>) + Send>;

/// One learner's attempt at a chapter's questions.
///
/// Scoring is split in two steps: `score` records the result and shows
/// feedback, `advance` moves on once the feedback delay is over.
pub struct QuizSession {
    questions: Vec<Question>,
    status: SessionStatus,
    answers: BTreeMap<u32, AnswerValue>,
    flagged: BTreeSet<u32>,
    skipped: BTreeSet<u32>,
    analytics: Vec<AnalyticsRecord>,
    elapsed_seconds: u64,
    on_complete: Mutex<Option<CompletionCallback>>,
}

impl std::fmt::Debug for QuizSession {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> Result<(), std::fmt::Error> {
        f.debug_struct("QuizSession")
            .field("questions", &self.questions.len())
            .field("status", &self.status)
            .field("answers", &self.answers)
            .field("flagged", &self.flagged)
            .field("skipped", &self.skipped)
            .field("analytics", &self.analytics)
            .field("elapsed_seconds", &self.elapsed_seconds)
            .finish()
    }
}

impl QuizSession {
    pub fn new(questions: Vec<Question>) -> Self {
        let status = if questions.is_empty() {
            SessionStatus::Terminal
        } else {
            SessionStatus::Question { index: 0, feedback: None }
        };
        QuizSession {
            questions,
            status,
            answers: BTreeMap::new(),
            flagged: BTreeSet::new(),
            skipped: BTreeSet::new(),
            analytics: Vec::new(),
            elapsed_seconds: 0,
            on_complete: Mutex::new(None),
        }
    }

    pub fn with_completion(mut self, on_complete: impl FnOnce(Vec<AnalyticsRecord>) + Send + 'static) -> Self {
        self.on_complete = Mutex::new(Some(Box::new(on_complete)));
        self
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn status(&self) -> &SessionStatus {
        &self.status
    }

    pub fn current_question(&self) -> Option<&Question> {
        self.status.question().and_then(|i| self.questions.get(i))
    }

    pub fn answer(&self, question_id: u32) -> Option<&AnswerValue> {
        self.answers.get(&question_id)
    }

    pub fn is_flagged(&self, question_id: u32) -> bool {
        self.flagged.contains(&question_id)
    }

    pub fn is_skipped(&self, question_id: u32) -> bool {
        self.skipped.contains(&question_id)
    }

    /// Scored questions are locked against further edits.
    pub fn is_locked(&self, question_id: u32) -> bool {
        self.analytics.iter().any(|a| a.question_id == question_id)
    }

    pub fn analytics(&self) -> &[AnalyticsRecord] {
        &self.analytics
    }

    pub fn score(&self) -> usize {
        self.analytics.iter().filter(|a| a.correct).count()
    }

    pub fn elapsed_seconds(&self) -> u64 {
        self.elapsed_seconds
    }

    fn contains(&self, question_id: u32) -> QuizResult<()> {
        if self.questions.iter().any(|q| q.id() == question_id) {
            Ok(())
        } else {
            Err(Error::UnknownQuestion(question_id))
        }
    }

    /// Index of the current question, provided it is `question_id` and is
    /// not showing feedback.
    fn current_index_for(&self, question_id: u32) -> QuizResult<usize> {
        match self.status {
            SessionStatus::Question { feedback: Some(_), .. } => Err(Error::FeedbackPending),
            SessionStatus::Question { index, feedback: None } => {
                if self.questions[index].id() == question_id {
                    Ok(index)
                } else {
                    self.contains(question_id)?;
                    Err(Error::NotCurrentQuestion(question_id))
                }
            }
            _ => Err(Error::NotInProgress),
        }
    }

    fn current_id(&self) -> QuizResult<u32> {
        self.current_question().map(Question::id).ok_or(Error::NotInProgress)
    }

    fn move_to(&mut self, index: usize) -> SessionStatus {
        self.status = if index < self.questions.len() {
            SessionStatus::Question { index, feedback: None }
        } else {
            SessionStatus::Terminal
        };
        self.elapsed_seconds = 0;
        self.status.clone()
    }

    pub fn set_answer(&mut self, question_id: u32, value: AnswerValue) -> QuizResult<()> {
        self.contains(question_id)?;
        if self.is_locked(question_id) {
            return Err(Error::QuestionLocked(question_id));
        }
        self.answers.insert(question_id, value);
        Ok(())
    }

    /// Returns whether the question is flagged afterwards.
    pub fn toggle_flag(&mut self, question_id: u32) -> QuizResult<bool> {
        self.contains(question_id)?;
        if self.flagged.remove(&question_id) {
            Ok(false)
        } else {
            self.flagged.insert(question_id);
            Ok(true)
        }
    }

    pub fn skip(&mut self, question_id: u32) -> QuizResult<SessionStatus> {
        let index = self.current_index_for(question_id)?;
        if self.is_locked(question_id) {
            return Err(Error::QuestionLocked(question_id));
        }
        self.skipped.insert(question_id);
        Ok(self.move_to(index + 1))
    }

    /// Scores the current question and shows feedback. The caller advances
    /// with `advance` once the feedback has been displayed.
    pub fn score_current(&mut self) -> QuizResult<AnalyticsRecord> {
        let question_id = self.current_id()?;
        let index = self.current_index_for(question_id)?;
        if self.is_locked(question_id) {
            return Err(Error::QuestionLocked(question_id));
        }
        let question = &self.questions[index];
        let answer = self.answers.get(&question_id).cloned();
        let correct = question.is_correct(answer.as_ref())
            .ok_or(Error::UnsupportedQuestion(question_id))?;

        let record = AnalyticsRecord {
            question_id,
            time_spent_seconds: self.elapsed_seconds,
            correct,
            answer,
        };
        self.analytics.push(record.clone());
        self.skipped.remove(&question_id);
        self.status = SessionStatus::Question { index, feedback: Some(correct) };
        Ok(record)
    }

    /// Leaves the feedback of a scored question for the next one, or for the
    /// terminal state after the last.
    pub fn advance(&mut self) -> QuizResult<SessionStatus> {
        match self.status {
            SessionStatus::Question { index, feedback: Some(_) } => Ok(self.move_to(index + 1)),
            SessionStatus::Question { .. } => Err(Error::NotAnswered(self.current_id()?)),
            _ => Err(Error::NotInProgress),
        }
    }

    /// `score_current` followed directly by `advance`.
    pub fn score_and_advance(&mut self) -> QuizResult<AnalyticsRecord> {
        let record = self.score_current()?;
        self.advance()?;
        Ok(record)
    }

    pub fn go_to_previous(&mut self) -> QuizResult<SessionStatus> {
        match self.status {
            SessionStatus::Question { feedback: Some(_), .. } => Err(Error::FeedbackPending),
            SessionStatus::Question { index: 0, .. } => Ok(self.status.clone()),
            SessionStatus::Question { index, .. } => Ok(self.move_to(index - 1)),
            _ => Err(Error::NotInProgress),
        }
    }

    /// Moves forward past a question that was already scored or skipped.
    pub fn go_to_next(&mut self) -> QuizResult<SessionStatus> {
        let question_id = self.current_id()?;
        let index = self.current_index_for(question_id)?;
        if !self.is_locked(question_id) && !self.is_skipped(question_id) {
            return Err(Error::NotAnswered(question_id));
        }
        Ok(self.move_to(index + 1))
    }

    /// One second of the per-question timer. Paused while feedback shows.
    pub fn tick(&mut self) {
        if let SessionStatus::Question { feedback: None, .. } = self.status {
            self.elapsed_seconds += 1;
        }
    }

    pub fn summary(&self) -> AnalyticsSummary {
        let average_time_seconds = if self.analytics.is_empty() {
            0.0
        } else {
            let total: u64 = self.analytics.iter().map(|a| a.time_spent_seconds).sum();
            total as f64 / self.analytics.len() as f64
        };
        AnalyticsSummary {
            score: self.score(),
            total: self.questions.len(),
            average_time_seconds,
            flagged_count: self.flagged.len(),
            skipped_count: self.skipped.len(),
        }
    }

    /// Ends a session in terminal state and hands the analytics log to the
    /// completion callback.
    pub fn finish(&mut self) -> QuizResult<AnalyticsSummary> {
        match self.status {
            SessionStatus::Terminal => (),
            SessionStatus::Finished => return Err(Error::AlreadyFinished),
            SessionStatus::Question { .. } => return Err(Error::NotTerminal),
        }
        self.status = SessionStatus::Finished;
        let on_complete = match self.on_complete.get_mut() {
            Ok(slot) => slot.take(),
            Err(poisoned) => poisoned.into_inner().take(),
        };
        if let Some(on_complete) = on_complete {
            on_complete(self.analytics.clone());
        }
        Ok(self.summary())
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            question_ids: self.questions.iter().map(Question::id).collect(),
            current_index: self.status.question(),
            answers: self.answers.clone(),
            flagged: self.flagged.clone(),
            skipped: self.skipped.clone(),
            analytics: self.analytics.clone(),
            elapsed_seconds: self.elapsed_seconds,
        }
    }

    pub fn restore(&mut self, snapshot: SessionSnapshot) -> QuizResult<()> {
        if self.status == SessionStatus::Finished {
            return Err(Error::AlreadyFinished);
        }
        let question_ids: Vec<u32> = self.questions.iter().map(Question::id).collect();
        if snapshot.question_ids != question_ids {
            return Err(Error::BackupMismatch(format!(
                "questions {:?} != {:?}", snapshot.question_ids, question_ids
            )));
        }
        if let Some(index) = snapshot.current_index.filter(|i| *i >= question_ids.len()) {
            return Err(Error::BackupMismatch(format!("question index {} out of range", index)));
        }
        if let Some(id) = snapshot.answers.keys()
            .chain(snapshot.flagged.iter())
            .chain(snapshot.skipped.iter())
            .chain(snapshot.analytics.iter().map(|a| &a.question_id))
            .find(|id| !question_ids.contains(id))
        {
            return Err(Error::UnknownQuestion(*id));
        }
        let mut scored = BTreeSet::new();
        for record in &snapshot.analytics {
            if !scored.insert(record.question_id) {
                return Err(Error::BackupMismatch(format!("question {} scored twice", record.question_id)));
            }
            if snapshot.skipped.contains(&record.question_id) {
                return Err(Error::BackupMismatch(format!("question {} both scored and skipped", record.question_id)));
            }
        }

        self.status = match snapshot.current_index {
            Some(index) => SessionStatus::Question { index, feedback: None },
            None => SessionStatus::Terminal,
        };
        self.answers = snapshot.answers;
        self.flagged = snapshot.flagged;
        self.skipped = snapshot.skipped;
        self.analytics = snapshot.analytics;
        self.elapsed_seconds = snapshot.elapsed_seconds;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};
    use crate::bank::QuestionKind;

    fn choice(id: u32, answer: &str) -> Question {
        Question::new(id, format!("Question {}", id), QuestionKind::MultipleChoice {
            options: vec!["red".into(), "green".into(), "blue".into()],
            answer: answer.into(),
        })
    }

    fn three_questions() -> QuizSession {
        QuizSession::new(vec![choice(1, "red"), choice(2, "green"), choice(3, "blue")])
    }

    fn text(s: &str) -> AnswerValue {
        AnswerValue::Text(s.into())
    }

    #[test]
    fn test_new_session_starts_at_first_question() {
        let session = three_questions();
        assert_eq!(session.status(), &SessionStatus::Question { index: 0, feedback: None });
        assert_eq!(session.score(), 0);
        assert!(session.analytics().is_empty());
    }

    #[test]
    fn test_empty_session_is_terminal() {
        let mut session = QuizSession::new(vec![]);
        assert!(session.status().is_terminal());
        let summary = session.finish().unwrap();
        assert_eq!(summary.total, 0);
        assert_eq!(summary.average_time_seconds, 0.0);
    }

    #[test]
    fn test_answer_skip_wrong_scenario() {
        let completed = Arc::new(Mutex::new(Vec::new()));
        let sink = completed.clone();
        let mut session = three_questions()
            .with_completion(move |analytics| sink.lock().unwrap().push(analytics));

        session.set_answer(1, text("Red")).unwrap();
        for _ in 0..4 { session.tick(); }
        let record = session.score_and_advance().unwrap();
        assert!(record.correct);
        assert_eq!(record.time_spent_seconds, 4);
        assert_eq!(session.elapsed_seconds(), 0);

        session.skip(2).unwrap();
        assert_eq!(session.analytics().len(), 1);

        session.set_answer(3, text("red")).unwrap();
        for _ in 0..2 { session.tick(); }
        session.score_and_advance().unwrap();
        assert!(session.status().is_terminal());

        let summary = session.finish().unwrap();
        assert_eq!(summary.score, 1);
        assert_eq!(summary.total, 3);
        assert_eq!(summary.flagged_count, 0);
        assert_eq!(summary.skipped_count, 1);
        assert_eq!(summary.average_time_seconds, 3.0);
        assert_eq!(summary.score, session.analytics().iter().filter(|a| a.correct).count());

        assert!(matches!(session.finish(), Err(Error::AlreadyFinished)));
        let completed = completed.lock().unwrap();
        assert_eq!(completed.len(), 1);
        assert_eq!(completed[0].len(), 2);
    }

    #[test]
    fn test_scoring_adds_exactly_one_record() {
        let mut session = three_questions();
        session.score_current().unwrap();
        assert_eq!(session.analytics().len(), 1);
        assert!(!session.analytics()[0].correct);
        assert_eq!(session.analytics()[0].answer, None);
        assert!(session.status().is_showing_feedback());
        assert!(matches!(session.score_current(), Err(Error::FeedbackPending)));
        assert!(matches!(session.skip(1), Err(Error::FeedbackPending)));
        assert!(matches!(session.go_to_previous(), Err(Error::FeedbackPending)));
        session.advance().unwrap();
        assert_eq!(session.status().question(), Some(1));
        assert_eq!(session.analytics().len(), 1);
    }

    #[test]
    fn test_flag_twice_has_no_effect() {
        let mut session = three_questions();
        assert!(session.toggle_flag(1).unwrap());
        assert!(!session.toggle_flag(1).unwrap());
        assert!(!session.is_flagged(1));
        assert_eq!(session.score(), 0);
        assert!(session.analytics().is_empty());
        assert!(matches!(session.toggle_flag(42), Err(Error::UnknownQuestion(42))));
    }

    #[test]
    fn test_previous_keeps_answers() {
        let mut session = three_questions();
        session.set_answer(1, text("red")).unwrap();
        session.score_and_advance().unwrap();
        session.set_answer(2, text("green")).unwrap();
        session.score_and_advance().unwrap();
        assert_eq!(session.status().question(), Some(2));

        session.go_to_previous().unwrap();
        assert_eq!(session.status().question(), Some(1));
        assert_eq!(session.answer(2), Some(&text("green")));
        assert!(matches!(session.set_answer(2, text("blue")), Err(Error::QuestionLocked(2))));
        assert!(matches!(session.score_current(), Err(Error::QuestionLocked(2))));

        session.go_to_next().unwrap();
        assert_eq!(session.status().question(), Some(2));
        assert!(matches!(session.go_to_next(), Err(Error::NotAnswered(3))));
    }

    #[test]
    fn test_previous_at_first_question_stays() {
        let mut session = three_questions();
        assert_eq!(session.go_to_previous().unwrap(), SessionStatus::Question { index: 0, feedback: None });
    }

    #[test]
    fn test_skipped_question_can_be_answered_later() {
        let mut session = three_questions();
        session.skip(1).unwrap();
        session.go_to_previous().unwrap();
        session.set_answer(1, text("red")).unwrap();
        session.score_and_advance().unwrap();
        assert!(!session.is_skipped(1));
        assert_eq!(session.summary().skipped_count, 0);
        assert_eq!(session.score(), 1);
    }

    #[test]
    fn test_skip_other_question_is_rejected() {
        let mut session = three_questions();
        assert!(matches!(session.skip(2), Err(Error::NotCurrentQuestion(2))));
        assert!(matches!(session.skip(9), Err(Error::UnknownQuestion(9))));
    }

    #[test]
    fn test_finish_before_terminal_is_rejected() {
        let mut session = three_questions();
        assert!(matches!(session.finish(), Err(Error::NotTerminal)));
    }

    #[test]
    fn test_unsupported_question_must_be_skipped() {
        let unsupported: Question = serde_json::from_str(r#"{"id": 7, "type": "puzzle", "text": "?"}"#).unwrap();
        let mut session = QuizSession::new(vec![unsupported]);
        assert!(matches!(session.score_current(), Err(Error::UnsupportedQuestion(7))));
        assert!(session.analytics().is_empty());
        session.skip(7).unwrap();
        assert_eq!(session.finish().unwrap().total, 1);
    }

    #[test]
    fn test_timer_pauses_during_feedback() {
        let mut session = three_questions();
        session.tick();
        session.score_current().unwrap();
        session.tick();
        assert_eq!(session.elapsed_seconds(), 1);
    }

    #[test]
    fn test_snapshot_restore() {
        let mut session = three_questions();
        session.set_answer(1, text("red")).unwrap();
        session.score_and_advance().unwrap();
        session.toggle_flag(2).unwrap();
        session.tick();
        let snapshot = session.snapshot();

        let mut resumed = three_questions();
        resumed.restore(snapshot.clone()).unwrap();
        assert_eq!(resumed.snapshot(), snapshot);
        assert_eq!(resumed.status().question(), Some(1));
        assert_eq!(resumed.score(), 1);

        let mut other = QuizSession::new(vec![choice(1, "red")]);
        assert!(matches!(other.restore(snapshot), Err(Error::BackupMismatch(_))));
    }

    #[test]
    fn test_restore_rejects_repeated_or_skipped_scores() {
        let mut session = three_questions();
        session.set_answer(1, text("red")).unwrap();
        session.score_and_advance().unwrap();

        let mut repeated = session.snapshot();
        let record = repeated.analytics[0].clone();
        repeated.analytics.push(record.clone());
        repeated.analytics.push(record);
        let mut resumed = three_questions();
        assert!(matches!(resumed.restore(repeated), Err(Error::BackupMismatch(_))));
        assert_eq!(resumed.score(), 0);

        let mut both = session.snapshot();
        both.skipped.insert(1);
        assert!(matches!(resumed.restore(both), Err(Error::BackupMismatch(_))));
    }

    #[test]
    fn test_finished_session_cannot_be_restored() {
        let finished = Arc::new(Mutex::new(0));
        let counter = finished.clone();
        let mut session = QuizSession::new(vec![choice(1, "red")])
            .with_completion(move |_| *counter.lock().unwrap() += 1);
        let snapshot = session.snapshot();
        session.skip(1).unwrap();
        session.finish().unwrap();

        assert!(matches!(session.restore(snapshot), Err(Error::AlreadyFinished)));
        assert!(matches!(session.finish(), Err(Error::AlreadyFinished)));
        assert_eq!(*finished.lock().unwrap(), 1);
    }

    #[test]
    fn test_session_can_move_between_threads() {
        fn shareable<T: Send + Sync>() {}
        shareable::<QuizSession>();
    }
}
