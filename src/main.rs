#[macro_use]
mod cli;
mod bank;
mod editor;
mod error;
mod session;

use std::path::PathBuf;
use clap::Parser;

use bank::{ChapterKey, Config};

/// Interactive chapter quizzes for Learniverse stories
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct AppArgs {
    /// The root of the quiz, a quiz.config (json) file should be located here.
    #[arg(name = "ROOT")]
    root: String,
    /// Id of the story.
    #[arg(long = "story")]
    story: u32,
    /// Chapter number within the story.
    #[arg(long = "chapter")]
    chapter: u32,
    /// Seed for shuffling answer options, overrides the config.
    #[arg(long = "seed")]
    seed: Option<u64>,
    /// Backup file to resume the quiz from.
    #[arg(long = "resume")]
    resume: Option<PathBuf>,
}

fn init() -> Result<(PathBuf, Config, AppArgs), String> {
    let args = AppArgs::parse();

    let (root, config) = bank::get_config(&args.root)?;
    Ok((root, config, args))
}

#[tokio::main]
async fn main() {
    pretty_env_logger::init();
    match init() {
        Ok((root, config, args)) => {
            let key = ChapterKey::new(args.story, args.chapter);
            println!("Starting quiz \"{}\" in: {:?}", config.title(), root);

            let questions = config.bank().load_questions(&key);
            if questions.is_empty() {
                println!("No quiz available for chapter {}.", key);
                println!("Chapters with a quiz: {}", config.bank().chapter_keys().join(", "));
                return;
            }
            log::info!("Loaded {} questions for chapter {}", questions.len(), key);

            let mut settings = config.settings().clone();
            if args.seed.is_some() {
                settings.shuffle_seed = args.seed;
            }
            let (state, events) = session::create_quiz_session(questions, &settings, |analytics| {
                cli::print_analytics(&analytics);
            });

            if let Some(path) = args.resume {
                match state.import_backup(&path).await {
                    Ok(_) => println!("Resumed from: {:?}", path),
                    Err(e) => println!("Could not resume from {:?}: {}", path, e),
                }
            }
            cli::start(state, events).await;
        },
        Err(e) => {
            println!("{}", e);
        }
    };
}
