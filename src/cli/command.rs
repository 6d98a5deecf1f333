use std::path::PathBuf;

use crate::bank::Cell;
use crate::editor::{EditAction, EditOutcome, SelectionOutcome};
use crate::error::QuizResult;
use crate::session::{Event, QuizSessionService, SessionStatus};

use super::view;

/// Learners count from 1.
fn index(n: usize) -> usize {
    n.saturating_sub(1)
}

fn report<T>(result: QuizResult<T>) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(e) => {
            println!("{}", e);
            None
        }
    }
}

async fn current_id(state: &QuizSessionService) -> Option<u32> {
    match report(state.view().await)? {
        Some(view) => Some(view.question.id()),
        None => {
            println!("There is no question open.");
            None
        }
    }
}

pub async fn on_event(state: QuizSessionService, event: Event) {
    match event {
        Event::QuestionShown { .. } => {
            println!();
            show(state).await;
            quiz_command_prefix!();
        },
        Event::Feedback { correct: true, .. } => quiz_print!("Correct!"),
        Event::Feedback { correct: false, expected, .. } => quiz_print!("Not quite. The answer was: {}", expected),
        Event::WordFound { word, complete, .. } => {
            if complete {
                quiz_print!("You found {}! That was the last word, `submit` to continue.", word)
            } else {
                quiz_print!("You found {}!", word)
            }
        },
        Event::Terminal { score, total } => quiz_print!("All done: {}/{} correct. Use `finish` to see your results.", score, total),
        Event::Finished(summary) => {
            println!();
            view::print_summary(&summary);
            quiz_command_prefix!();
        },
        Event::Closed => (),
    }
}

pub async fn show(state: QuizSessionService) {
    match report(state.view().await) {
        Some(Some(question)) => view::print_question(&question),
        Some(None) => status(state).await,
        None => (),
    }
}

pub async fn status(state: QuizSessionService) {
    print!("status: ");
    match report(state.status().await) {
        Some(SessionStatus::Question { index, feedback }) => {
            println!("Question {} in progress", index + 1);
            match feedback {
                Some(true) => println!("Answered correctly"),
                Some(false) => println!("Answered incorrectly"),
                None => (),
            }
        },
        Some(SessionStatus::Terminal) => println!("Every question was answered or skipped"),
        Some(SessionStatus::Finished) => println!("Finished quiz"),
        None => (),
    }
}

async fn edit(state: &QuizSessionService, action: EditAction) -> Option<EditOutcome> {
    let outcome = report(state.edit(action).await)?;
    if outcome == EditOutcome::Ignored {
        println!("Nothing changed, check the numbers.");
    }
    Some(outcome)
}

pub async fn choose(state: QuizSessionService, n: usize) {
    edit(&state, EditAction::Choose(index(n))).await;
}

pub async fn answer(state: QuizSessionService, text: String) {
    edit(&state, EditAction::Text(text)).await;
}

pub async fn move_item(state: QuizSessionService, from: usize, to: usize) {
    if edit(&state, EditAction::Move { from: index(from), to: index(to) }).await == Some(EditOutcome::Answered) {
        show(state).await;
    }
}

pub async fn assign(state: QuizSessionService, term: usize, definition: usize) {
    let action = EditAction::Assign { term: index(term), definition: index(definition) };
    if edit(&state, action).await == Some(EditOutcome::Answered) {
        show(state).await;
    }
}

pub async fn select(state: QuizSessionService, from: (usize, usize), to: (usize, usize)) {
    let from = Cell::new(index(from.0), index(from.1));
    let to = Cell::new(index(to.0), index(to.1));
    if edit(&state, EditAction::PointerDown(from)).await != Some(EditOutcome::Selecting) {
        return;
    }
    if edit(&state, EditAction::PointerMove(to)).await != Some(EditOutcome::Selecting) {
        println!("Words run in a straight line and cannot cross found words.");
        edit(&state, EditAction::ClearSelection).await;
        return;
    }
    match edit(&state, EditAction::PointerUp).await {
        Some(EditOutcome::Selection(SelectionOutcome::TooShort)) => println!("Select at least two letters."),
        Some(EditOutcome::Selection(SelectionOutcome::NoMatch)) => println!("That is not one of the words."),
        Some(EditOutcome::Selection(SelectionOutcome::AlreadyFound(word))) => println!("You already found {}.", word),
        _ => (),
    }
}

pub async fn submit(state: QuizSessionService) {
    report(state.score_and_advance().await);
}

pub async fn skip(state: QuizSessionService) {
    if let Some(id) = current_id(&state).await {
        report(state.skip(id).await);
    }
}

pub async fn flag(state: QuizSessionService) {
    if let Some(id) = current_id(&state).await {
        match report(state.toggle_flag(id).await) {
            Some(true) => println!("Flagged for review."),
            Some(false) => println!("Flag removed."),
            None => (),
        }
    }
}

pub async fn previous(state: QuizSessionService) {
    if let Some(SessionStatus::Question { index: 0, .. }) = report(state.status().await) {
        println!("This is the first question.");
        return;
    }
    report(state.go_to_previous().await);
}

pub async fn next(state: QuizSessionService) {
    report(state.go_to_next().await);
}

pub async fn backup(state: QuizSessionService, file: String) {
    let path = PathBuf::from(file);
    match state.backup(&path).await {
        Ok(_) => println!("Backup created: {:?}", path),
        Err(e) => println!("An error occurred while trying to backup: {}", e),
    }
}

pub async fn import_backup(state: QuizSessionService, file: String) {
    let path = PathBuf::from(file);
    match state.import_backup(&path).await {
        Ok(_) => println!("Successfully imported: {:?}", path),
        Err(e) => println!("An error occurred while trying to import backup: {}", e),
    }
}

pub async fn finish(state: QuizSessionService) {
    report(state.finish().await);
}
