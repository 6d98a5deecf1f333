use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Invalid chapter key: {0:?} (expected \"<story>-<chapter>\")")]
    InvalidChapterKey(String),
    #[error("Duplicate question id {id} in chapter {chapter}")]
    DuplicateQuestionId { chapter: String, id: u32 },
    #[error("Question {0} is not part of this quiz")]
    UnknownQuestion(u32),
    #[error("Question {0} is not the current question")]
    NotCurrentQuestion(u32),
    #[error("Question {0} still needs an answer or a skip")]
    NotAnswered(u32),
    #[error("Question {0} was already scored")]
    QuestionLocked(u32),
    #[error("Question {0} has an unsupported type and can only be skipped")]
    UnsupportedQuestion(u32),
    #[error("Wait for the feedback to finish")]
    FeedbackPending,
    #[error("The quiz is not in progress")]
    NotInProgress,
    #[error("The quiz is not over yet")]
    NotTerminal,
    #[error("The quiz was already finished")]
    AlreadyFinished,
    #[error("Invalid edit: {0}")]
    InvalidEdit(String),
    #[error("Backup does not match this quiz: {0}")]
    BackupMismatch(String),
    #[error("The quiz session was closed")]
    SessionClosed,
}

pub type QuizResult<T> = Result<T, Error>;
