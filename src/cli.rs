#[macro_use]
mod print;
mod command;
mod view;

pub use view::print_analytics;

use clap::{Parser, Subcommand};
use tokio::io::{self, AsyncBufReadExt, BufReader};
use tokio::sync::mpsc::Receiver;

use crate::session::{Event, QuizSessionService};

#[derive(Parser, Debug)]
#[command(name = "Learniverse>", no_binary_name = true, disable_version_flag = true, infer_subcommands = true)]
struct CommandLine {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Closes the quiz. Unfinished answers are discarded.
    Exit,
    /// Shows the current question again.
    Show,
    /// Prints the current status of the quiz.
    Status,
    /// Picks option <N> of a choice question.
    Choose { n: usize },
    /// Types an answer (fill in the blank, or the whole word / sentence).
    Answer {
        #[arg(required = true, num_args = 1..)]
        text: Vec<String>,
    },
    /// Moves item <FROM> to position <TO> (word order, letters, definitions).
    Move { from: usize, to: usize },
    /// Puts definition <DEFINITION> next to term <TERM>.
    Assign { term: usize, definition: usize },
    /// Drags over the word grid from one cell to another (row column row column).
    Select { r1: usize, c1: usize, r2: usize, c2: usize },
    /// Checks the answer of the current question.
    Submit,
    /// Skips the current question.
    Skip,
    /// Flags or unflags the current question for review.
    Flag,
    /// Goes back to the previous question.
    Prev,
    /// Goes forward past a question that was already answered or skipped.
    Next,
    /// Backs up the current state of the quiz.
    Backup {
        /// File to write backup to.
        #[arg(default_value = ".backup_quiz")]
        file: String,
    },
    /// Imports a backup state of the quiz.
    Import { file: String },
    /// Shows the results once every question was answered or skipped.
    Finish,
}

/// Runs one command line. Returns false when the host should stop.
async fn execute(state: QuizSessionService, line: &str) -> bool {
    let parsed = match CommandLine::try_parse_from(line.split_whitespace()) {
        Ok(line) => line.command,
        Err(e) => {
            println!("{}", e);
            return true;
        }
    };
    match parsed {
        Command::Exit                           => return false,
        Command::Show                           => command::show(state).await,
        Command::Status                         => command::status(state).await,
        Command::Choose { n }                   => command::choose(state, n).await,
        Command::Answer { text }                => command::answer(state, text.join(" ")).await,
        Command::Move { from, to }              => command::move_item(state, from, to).await,
        Command::Assign { term, definition }    => command::assign(state, term, definition).await,
        Command::Select { r1, c1, r2, c2 }      => command::select(state, (r1, c1), (r2, c2)).await,
        Command::Submit                         => command::submit(state).await,
        Command::Skip                           => command::skip(state).await,
        Command::Flag                           => command::flag(state).await,
        Command::Prev                           => command::previous(state).await,
        Command::Next                           => command::next(state).await,
        Command::Backup { file }                => command::backup(state, file).await,
        Command::Import { file }                => command::import_backup(state, file).await,
        Command::Finish                         => command::finish(state).await,
    }
    true
}

pub async fn start(state: QuizSessionService, mut events: Receiver<Event>) {
    let mut lines = BufReader::new(io::stdin()).lines();
    loop {
        tokio::select! {
            event = events.recv() => match event {
                Some(Event::Closed) | None => break,
                Some(event) => command::on_event(state.clone(), event).await,
            },
            line = lines.next_line() => match line {
                Ok(Some(line)) => {
                    if line.trim().is_empty() {
                        quiz_command_prefix!();
                        continue;
                    }
                    if !execute(state.clone(), &line).await {
                        break;
                    }
                    quiz_command_prefix!();
                },
                Ok(None) => break,
                Err(e) => {
                    log::error!("Could not read command: {}", e);
                    break;
                },
            },
        }
    }
    state.close().await;
    println!("Closing quiz...");
}
