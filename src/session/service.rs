use std::path::PathBuf;
use tokio::sync::mpsc::Sender;
use tokio::sync::oneshot::{self, Sender as Return};

use crate::bank::AnswerValue;
use crate::editor::{EditAction, EditOutcome};
use crate::error::{Error, QuizResult};

use super::{AnalyticsRecord, AnalyticsSummary, QuestionView, SessionStatus};

pub enum QuizSessionJob {
    Status(Return<SessionStatus>),
    View(Return<Option<QuestionView>>),
    SetAnswer(u32, AnswerValue, Return<QuizResult<()>>),
    Edit(EditAction, Return<QuizResult<EditOutcome>>),
    ToggleFlag(u32, Return<QuizResult<bool>>),
    Skip(u32, Return<QuizResult<SessionStatus>>),
    ScoreAndAdvance(Return<QuizResult<AnalyticsRecord>>),
    Previous(Return<QuizResult<SessionStatus>>),
    Next(Return<QuizResult<SessionStatus>>),
    Finish(Return<QuizResult<AnalyticsSummary>>),
    Backup(PathBuf, Return<QuizResult<()>>),
    ImportBackup(PathBuf, Return<QuizResult<SessionStatus>>),
    Close,
}

impl QuizSessionJob {
    pub fn name(&self) -> &'static str {
        match self {
            QuizSessionJob::Status(_) => "status",
            QuizSessionJob::View(_) => "view",
            QuizSessionJob::SetAnswer(..) => "set_answer",
            QuizSessionJob::Edit(..) => "edit",
            QuizSessionJob::ToggleFlag(..) => "toggle_flag",
            QuizSessionJob::Skip(..) => "skip",
            QuizSessionJob::ScoreAndAdvance(_) => "score_and_advance",
            QuizSessionJob::Previous(_) => "previous",
            QuizSessionJob::Next(_) => "next",
            QuizSessionJob::Finish(_) => "finish",
            QuizSessionJob::Backup(..) => "backup",
            QuizSessionJob::ImportBackup(..) => "import_backup",
            QuizSessionJob::Close => "close",
        }
    }
}

/// Cloneable handle to the task that owns a quiz session.
#[derive(Debug, Clone)]
pub struct QuizSessionService {
    job_channel: Sender<QuizSessionJob>,
}

impl QuizSessionService {
    pub(super) fn new(job_channel: Sender<QuizSessionJob>) -> Self {
        QuizSessionService { job_channel }
    }

    async fn request<T>(&self, job: impl FnOnce(Return<T>) -> QuizSessionJob) -> QuizResult<T> {
        let (send, recv) = oneshot::channel();
        self.job_channel.send(job(send)).await.map_err(|_| Error::SessionClosed)?;
        recv.await.map_err(|_| Error::SessionClosed)
    }

    pub async fn status(&self) -> QuizResult<SessionStatus> {
        self.request(QuizSessionJob::Status).await
    }

    pub async fn view(&self) -> QuizResult<Option<QuestionView>> {
        self.request(QuizSessionJob::View).await
    }

    pub async fn set_answer(&self, question_id: u32, answer: AnswerValue) -> QuizResult<()> {
        self.request(|send| QuizSessionJob::SetAnswer(question_id, answer, send)).await?
    }

    pub async fn edit(&self, action: EditAction) -> QuizResult<EditOutcome> {
        self.request(|send| QuizSessionJob::Edit(action, send)).await?
    }

    pub async fn toggle_flag(&self, question_id: u32) -> QuizResult<bool> {
        self.request(|send| QuizSessionJob::ToggleFlag(question_id, send)).await?
    }

    pub async fn skip(&self, question_id: u32) -> QuizResult<SessionStatus> {
        self.request(|send| QuizSessionJob::Skip(question_id, send)).await?
    }

    /// Scores the current question. The session moves on by itself once the
    /// feedback delay has passed.
    pub async fn score_and_advance(&self) -> QuizResult<AnalyticsRecord> {
        self.request(QuizSessionJob::ScoreAndAdvance).await?
    }

    pub async fn go_to_previous(&self) -> QuizResult<SessionStatus> {
        self.request(QuizSessionJob::Previous).await?
    }

    pub async fn go_to_next(&self) -> QuizResult<SessionStatus> {
        self.request(QuizSessionJob::Next).await?
    }

    pub async fn finish(&self) -> QuizResult<AnalyticsSummary> {
        self.request(QuizSessionJob::Finish).await?
    }

    pub async fn backup(&self, path: &PathBuf) -> QuizResult<()> {
        self.request(|send| QuizSessionJob::Backup(path.clone(), send)).await?
    }

    pub async fn import_backup(&self, path: &PathBuf) -> QuizResult<SessionStatus> {
        self.request(|send| QuizSessionJob::ImportBackup(path.clone(), send)).await?
    }

    /// Abandons the session. Unsaved answers are dropped and the completion
    /// callback is never called.
    pub async fn close(&self) {
        let _ = self.job_channel.send(QuizSessionJob::Close).await;
    }
}
