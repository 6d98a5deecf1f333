mod owner;
mod quiz;
mod service;
mod status;

pub use quiz::QuizSession;
pub use service::QuizSessionService;
pub use status::{AnalyticsRecord, AnalyticsSummary, Event, QuestionView, SessionSnapshot, SessionStatus};

use std::time::Duration;
use tokio::sync::mpsc::{channel, Receiver};

use crate::bank::{Question, SessionSettings};

/// Starts a session over `questions` on the current tokio runtime.
/// `on_complete` runs once, when the finished session hands over its log.
pub fn create_quiz_session(
    questions: Vec<Question>,
    settings: &SessionSettings,
    on_complete: impl FnOnce(Vec<AnalyticsRecord>) + Send + 'static,
) -> (QuizSessionService, Receiver<Event>) {
    let (job_sender, job_receiver) = channel(1000);
    let (event_sender, event_receiver) = channel(1000);
    let seed = settings.shuffle_seed.unwrap_or_else(rand::random);

    let session = QuizSession::new(questions).with_completion(on_complete);
    owner::create_quiz_session(
        session,
        seed,
        Duration::from_millis(settings.feedback_delay_ms),
        job_receiver,
        event_sender,
    );

    (QuizSessionService::new(job_sender), event_receiver)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};
    use tokio::time::sleep;

    use crate::bank::{AnswerValue, Cell, QuestionKind};
    use crate::editor::{EditAction, EditOutcome, SelectionOutcome};
    use crate::error::Error;

    fn settings() -> SessionSettings {
        SessionSettings { feedback_delay_ms: 1500, shuffle_seed: Some(5) }
    }

    fn questions() -> Vec<Question> {
        vec![
            Question::new(1, "Fish live in water.", QuestionKind::TrueFalse { answer: "True".into() }),
            Question::new(2, "Find the pet", QuestionKind::HiddenWord {
                grid: vec!["CAT".chars().collect(), "XXX".chars().collect()],
                words: vec!["CAT".into()],
            }),
        ]
    }

    async fn drain(events: &mut Receiver<Event>) -> Vec<Event> {
        let mut seen = Vec::new();
        while let Ok(event) = events.try_recv() {
            seen.push(event);
        }
        seen
    }

    #[tokio::test(start_paused = true)]
    async fn test_advance_waits_for_feedback_delay() {
        let (service, _events) = create_quiz_session(questions(), &settings(), |_| ());
        service.edit(EditAction::Choose(0)).await.unwrap();
        let record = service.score_and_advance().await.unwrap();
        assert!(record.correct);

        sleep(Duration::from_millis(1400)).await;
        assert_eq!(service.status().await.unwrap(), SessionStatus::Question { index: 0, feedback: Some(true) });
        assert!(matches!(service.go_to_previous().await, Err(Error::FeedbackPending)));

        sleep(Duration::from_millis(200)).await;
        assert_eq!(service.status().await.unwrap(), SessionStatus::Question { index: 1, feedback: None });
    }

    #[tokio::test(start_paused = true)]
    async fn test_timer_counts_and_resets_on_navigation() {
        let (service, _events) = create_quiz_session(questions(), &settings(), |_| ());
        sleep(Duration::from_millis(3500)).await;
        assert_eq!(service.view().await.unwrap().unwrap().elapsed_seconds, 3);

        service.skip(1).await.unwrap();
        assert_eq!(service.view().await.unwrap().unwrap().elapsed_seconds, 0);
        sleep(Duration::from_millis(1500)).await;
        assert_eq!(service.view().await.unwrap().unwrap().elapsed_seconds, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_word_search_through_service() {
        let (service, mut events) = create_quiz_session(questions(), &settings(), |_| ());
        service.skip(1).await.unwrap();

        assert_eq!(service.edit(EditAction::PointerDown(Cell::new(0, 0))).await.unwrap(), EditOutcome::Selecting);
        service.edit(EditAction::PointerMove(Cell::new(0, 2))).await.unwrap();
        let outcome = service.edit(EditAction::PointerUp).await.unwrap();
        assert_eq!(outcome, EditOutcome::Selection(SelectionOutcome::Found { word: "CAT".into(), complete: true }));

        let view = service.view().await.unwrap().unwrap();
        assert!(matches!(view.answer, Some(AnswerValue::FoundWords(ref found)) if found.len() == 1));

        // claimed cells cannot start a new selection
        assert_eq!(service.edit(EditAction::PointerDown(Cell::new(0, 1))).await.unwrap(), EditOutcome::Ignored);
        assert!(matches!(service.edit(EditAction::Choose(0)).await, Err(Error::InvalidEdit(_))));

        let seen = drain(&mut events).await;
        assert!(seen.contains(&Event::WordFound { question_id: 2, word: "CAT".into(), complete: true }));
    }

    #[tokio::test(start_paused = true)]
    async fn test_finish_calls_back_once() {
        let completed = Arc::new(Mutex::new(Vec::new()));
        let sink = completed.clone();
        let (service, mut events) = create_quiz_session(questions(), &settings(), move |analytics| {
            sink.lock().unwrap().push(analytics)
        });

        assert!(matches!(service.finish().await, Err(Error::NotTerminal)));
        service.edit(EditAction::Choose(1)).await.unwrap();
        service.score_and_advance().await.unwrap();
        sleep(Duration::from_secs(2)).await;
        service.skip(2).await.unwrap();
        assert_eq!(service.status().await.unwrap(), SessionStatus::Terminal);
        assert!(service.view().await.unwrap().is_none());

        let summary = service.finish().await.unwrap();
        assert_eq!((summary.score, summary.total, summary.skipped_count), (0, 2, 1));
        assert!(matches!(service.finish().await, Err(Error::AlreadyFinished)));

        let completed = completed.lock().unwrap();
        assert_eq!(completed.len(), 1);
        assert_eq!(completed[0].len(), 1);
        assert!(!completed[0][0].correct);

        let seen = drain(&mut events).await;
        assert!(seen.contains(&Event::Terminal { score: 0, total: 2 }));
        assert!(seen.contains(&Event::Finished(summary)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_close_discards_session() {
        let called = Arc::new(Mutex::new(false));
        let flag = called.clone();
        let (service, mut events) = create_quiz_session(questions(), &settings(), move |_| {
            *flag.lock().unwrap() = true
        });
        service.close().await;
        assert!(matches!(service.status().await, Err(Error::SessionClosed)));
        assert!(!*called.lock().unwrap());

        let mut last = None;
        while let Some(event) = events.recv().await {
            last = Some(event);
        }
        assert_eq!(last, Some(Event::Closed));
    }

    #[tokio::test(start_paused = true)]
    async fn test_empty_chapter_is_terminal_from_the_start() {
        let (service, mut events) = create_quiz_session(vec![], &settings(), |_| ());
        assert_eq!(service.status().await.unwrap(), SessionStatus::Terminal);
        assert_eq!(events.recv().await, Some(Event::Terminal { score: 0, total: 0 }));
        assert_eq!(service.finish().await.unwrap().total, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_backup_and_resume() {
        let path = std::env::temp_dir().join(format!("learniverse-backup-{}.json", std::process::id()));
        let (service, _events) = create_quiz_session(questions(), &settings(), |_| ());
        service.skip(1).await.unwrap();
        service.edit(EditAction::PointerDown(Cell::new(0, 2))).await.unwrap();
        service.edit(EditAction::PointerMove(Cell::new(0, 0))).await.unwrap();
        service.edit(EditAction::PointerUp).await.unwrap();
        service.toggle_flag(2).await.unwrap();
        service.backup(&path).await.unwrap();
        service.close().await;

        let (resumed, _events) = create_quiz_session(questions(), &settings(), |_| ());
        let status = resumed.import_backup(&path).await.unwrap();
        assert_eq!(status, SessionStatus::Question { index: 1, feedback: None });
        let view = resumed.view().await.unwrap().unwrap();
        assert!(view.flagged);
        match view.editor {
            crate::editor::ActiveEditor::WordSearch(board) => {
                assert!(board.is_complete());
                assert!(board.is_claimed(Cell::new(0, 0)));
            }
            other => panic!("unexpected editor {:?}", other),
        }
        let _ = std::fs::remove_file(&path);
    }
}
