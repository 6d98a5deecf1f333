use std::path::PathBuf;
use std::time::Duration;

use log::{debug, info, warn};
use tokio::sync::mpsc::{Receiver, Sender};
use tokio::sync::oneshot::Sender as Return;
use tokio::time::{self, Instant, MissedTickBehavior};

use crate::bank::{AnswerValue, Question};
use crate::editor::{ActiveEditor, EditAction, EditOutcome, SelectionOutcome};
use crate::error::{Error, QuizResult};

use super::{
    service::QuizSessionJob, AnalyticsRecord, Event, QuestionView, QuizSession,
    SessionSnapshot, SessionStatus,
};

const TICK: Duration = Duration::from_secs(1);

pub(super) fn create_quiz_session(
    session: QuizSession,
    seed: u64,
    feedback_delay: Duration,
    job_receiver: Receiver<QuizSessionJob>,
    events: Sender<Event>,
) {
    tokio::task::spawn(async move {
        let editor = editor_for(&session, seed);
        let owner = QuizSessionOwner { session, seed, feedback_delay, editor, events };
        owner.handle_jobs(job_receiver).await
    });
}

fn editor_for(session: &QuizSession, seed: u64) -> ActiveEditor {
    match session.current_question() {
        Some(q) => ActiveEditor::for_question(q, seed, session.answer(q.id())),
        None => ActiveEditor::Unsupported,
    }
}

fn reply<T>(sender: Return<T>, value: T) {
    if sender.send(value).is_err() {
        debug!("Requester went away before the reply");
    }
}

/// What the job loop has to do with its timers after a job.
enum Flow {
    Continue,
    Navigated,
    FeedbackShown,
    Close,
}

struct QuizSessionOwner {
    session: QuizSession,
    seed: u64,
    feedback_delay: Duration,
    editor: ActiveEditor,
    events: Sender<Event>,
}

impl QuizSessionOwner {
    async fn handle_jobs(mut self, mut job_receiver: Receiver<QuizSessionJob>) {
        let mut ticker = time::interval_at(Instant::now() + TICK, TICK);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let advance = time::sleep(Duration::ZERO);
        tokio::pin!(advance);
        let mut advance_pending = false;

        info!("Quiz session started with {} questions", self.session.questions().len());
        self.announce().await;

        loop {
            tokio::select! {
                job = job_receiver.recv() => {
                    let Some(job) = job else { break };
                    match self.handle_job(job).await {
                        Flow::Continue => (),
                        Flow::Navigated => {
                            advance_pending = false;
                            ticker.reset();
                        },
                        Flow::FeedbackShown => {
                            advance.as_mut().reset(Instant::now() + self.feedback_delay);
                            advance_pending = true;
                        },
                        Flow::Close => break,
                    }
                },
                _ = ticker.tick() => self.session.tick(),
                () = &mut advance, if advance_pending => {
                    advance_pending = false;
                    match self.session.advance() {
                        Ok(_) => {
                            ticker.reset();
                            self.navigated().await;
                        },
                        Err(e) => warn!("Could not advance after feedback: {}", e),
                    }
                },
            }
        }

        info!("Quiz session closed");
        self.send(Event::Closed).await;
    }

    async fn handle_job(&mut self, job: QuizSessionJob) -> Flow {
        debug!("Session job: {}", job.name());
        match job {
            QuizSessionJob::Status(sender)                     => reply(sender, self.session.status().clone()),
            QuizSessionJob::View(sender)                       => reply(sender, self.view()),
            QuizSessionJob::SetAnswer(id, answer, sender)      => reply(sender, self.set_answer(id, answer)),
            QuizSessionJob::ToggleFlag(id, sender)             => reply(sender, self.session.toggle_flag(id)),
            QuizSessionJob::Edit(action, sender) => {
                let result = self.edit(action);
                if let Ok(EditOutcome::Selection(SelectionOutcome::Found { word, complete })) = &result {
                    if let Some(question_id) = self.session.current_question().map(Question::id) {
                        self.send(Event::WordFound { question_id, word: word.clone(), complete: *complete }).await;
                    }
                }
                reply(sender, result);
            },
            QuizSessionJob::ScoreAndAdvance(sender) => {
                let result = self.score();
                let scored = result.is_ok();
                if let Ok(record) = &result {
                    let expected = self.session.questions().iter()
                        .find(|q| q.id() == record.question_id)
                        .map(Question::expected_answer)
                        .unwrap_or_default();
                    self.send(Event::Feedback { question_id: record.question_id, correct: record.correct, expected }).await;
                }
                reply(sender, result);
                if scored {
                    return Flow::FeedbackShown;
                }
            },
            QuizSessionJob::Skip(id, sender) => {
                let result = self.session.skip(id);
                return self.navigation(result, sender).await;
            },
            QuizSessionJob::Previous(sender) => {
                let result = self.session.go_to_previous();
                return self.navigation(result, sender).await;
            },
            QuizSessionJob::Next(sender) => {
                let result = self.session.go_to_next();
                return self.navigation(result, sender).await;
            },
            QuizSessionJob::Finish(sender) => {
                let result = self.session.finish();
                if let Ok(summary) = &result {
                    info!("Quiz finished: {}/{} correct", summary.score, summary.total);
                    self.send(Event::Finished(summary.clone())).await;
                }
                reply(sender, result);
            },
            QuizSessionJob::Backup(path, sender)               => reply(sender, self.backup(&path)),
            QuizSessionJob::ImportBackup(path, sender) => {
                let result = self.import_backup(&path);
                return self.navigation(result, sender).await;
            },
            QuizSessionJob::Close                              => return Flow::Close,
        }
        Flow::Continue
    }

    async fn send(&self, event: Event) {
        if self.events.send(event).await.is_err() {
            debug!("No host is listening for session events");
        }
    }

    async fn announce(&self) {
        match self.session.status() {
            SessionStatus::Question { index, .. } => {
                let question_id = self.session.questions()[*index].id();
                let total = self.session.questions().len();
                self.send(Event::QuestionShown { index: *index, total, question_id }).await;
            },
            SessionStatus::Terminal => {
                let total = self.session.questions().len();
                self.send(Event::Terminal { score: self.session.score(), total }).await;
            },
            SessionStatus::Finished => (),
        }
    }

    /// Rebuilds the editor for the new current question and tells the host.
    async fn navigated(&mut self) {
        self.editor = editor_for(&self.session, self.seed);
        self.announce().await;
    }

    async fn navigation(&mut self, result: QuizResult<SessionStatus>, sender: Return<QuizResult<SessionStatus>>) -> Flow {
        let moved = result.is_ok();
        if let Err(e) = &result {
            warn!("Navigation rejected: {}", e);
        }
        reply(sender, result);
        if moved {
            self.navigated().await;
            Flow::Navigated
        } else {
            Flow::Continue
        }
    }

    fn current_unlocked(&self) -> QuizResult<u32> {
        let question = self.session.current_question().ok_or(Error::NotInProgress)?;
        if self.session.status().is_showing_feedback() {
            return Err(Error::FeedbackPending);
        }
        if self.session.is_locked(question.id()) {
            return Err(Error::QuestionLocked(question.id()));
        }
        Ok(question.id())
    }

    fn set_answer(&mut self, question_id: u32, answer: AnswerValue) -> QuizResult<()> {
        self.session.set_answer(question_id, answer)?;
        if self.session.current_question().is_some_and(|q| q.id() == question_id) {
            self.editor = editor_for(&self.session, self.seed);
        }
        Ok(())
    }

    fn edit(&mut self, action: EditAction) -> QuizResult<EditOutcome> {
        let question_id = self.current_unlocked()?;
        let outcome = self.editor.apply(action)?;
        if outcome.changes_answer() {
            if let Some(answer) = self.editor.answer() {
                self.session.set_answer(question_id, answer)?;
            }
        }
        debug!("Edit on question {}: {:?}", question_id, outcome);
        Ok(outcome)
    }

    fn score(&mut self) -> QuizResult<AnalyticsRecord> {
        let result = self.session.score_current();
        match &result {
            Ok(record) => info!(
                "Question {} scored: correct={} after {}s",
                record.question_id, record.correct, record.time_spent_seconds
            ),
            Err(e) => warn!("Scoring rejected: {}", e),
        }
        result
    }

    fn view(&self) -> Option<QuestionView> {
        let (index, feedback) = match self.session.status() {
            SessionStatus::Question { index, feedback } => (*index, *feedback),
            _ => return None,
        };
        let question = self.session.questions()[index].clone();
        let id = question.id();
        Some(QuestionView {
            index,
            total: self.session.questions().len(),
            answer: self.session.answer(id).cloned(),
            flagged: self.session.is_flagged(id),
            skipped: self.session.is_skipped(id),
            locked: self.session.is_locked(id),
            feedback,
            elapsed_seconds: self.session.elapsed_seconds(),
            score: self.session.score(),
            editor: self.editor.clone(),
            question,
        })
    }

    fn backup(&self, path: &PathBuf) -> QuizResult<()> {
        let snapshot = serde_json::to_string_pretty(&self.session.snapshot())?;
        std::fs::write(path, snapshot)?;
        info!("Session backed up to {:?}", path);
        Ok(())
    }

    fn import_backup(&mut self, path: &PathBuf) -> QuizResult<SessionStatus> {
        let data = std::fs::read_to_string(path)?;
        let snapshot: SessionSnapshot = serde_json::from_str(&data)?;
        self.session.restore(snapshot)?;
        info!("Session restored from {:?}", path);
        Ok(self.session.status().clone())
    }
}
