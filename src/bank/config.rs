use std::collections::{HashMap, HashSet};
use std::path::PathBuf;
use std::str::FromStr;
use serde::{Deserialize, Serialize};

use crate::error::{Error, QuizResult};

use super::Question;

pub const CONFIG_FILE: &str = "quiz.config";

fn default_feedback_delay_ms() -> u64 {
    1500
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChapterKey {
    story_id: u32,
    chapter: u32,
}

impl ChapterKey {
    pub fn new(story_id: u32, chapter: u32) -> Self {
        ChapterKey { story_id, chapter }
    }
}

impl std::fmt::Display for ChapterKey {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> Result<(), std::fmt::Error> {
        write!(f, "{}-{}", self.story_id, self.chapter)
    }
}

impl FromStr for ChapterKey {
    type Err = Error;

    fn from_str(s: &str) -> QuizResult<Self> {
        let invalid = || Error::InvalidChapterKey(s.to_string());
        let (story, chapter) = s.rsplit_once('-').ok_or_else(invalid)?;
        Ok(ChapterKey {
            story_id: story.trim().parse().map_err(|_| invalid())?,
            chapter: chapter.trim().parse().map_err(|_| invalid())?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSettings {
    /// Time the correct/incorrect feedback stays up before auto-advance.
    #[serde(default = "default_feedback_delay_ms")]
    pub feedback_delay_ms: u64,
    /// Fixed seed for presentation shuffles, random when absent.
    #[serde(default)]
    pub shuffle_seed: Option<u64>,
}

impl Default for SessionSettings {
    fn default() -> Self {
        SessionSettings {
            feedback_delay_ms: default_feedback_delay_ms(),
            shuffle_seed: None,
        }
    }
}

/// Read-only question sets keyed by `"<storyId>-<chapter>"`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QuestionBank {
    chapters: HashMap<String, Vec<Question>>,
}

impl QuestionBank {
    pub fn get(&self, key: &ChapterKey) -> Option<&[Question]> {
        self.chapters.get(&key.to_string()).map(Vec::as_slice)
    }

    /// Questions of a chapter, empty when the chapter has no quiz.
    pub fn load_questions(&self, key: &ChapterKey) -> Vec<Question> {
        self.get(key).map(<[Question]>::to_vec).unwrap_or_default()
    }

    pub fn chapter_keys(&self) -> Vec<String> {
        let mut keys: Vec<_> = self.chapters.keys().cloned().collect();
        keys.sort();
        keys
    }

    fn validate(&self) -> QuizResult<()> {
        for (key, questions) in &self.chapters {
            key.parse::<ChapterKey>()?;
            let mut ids = HashSet::new();
            if let Some(q) = questions.iter().find(|q| !ids.insert(q.id())) {
                return Err(Error::DuplicateQuestionId { chapter: key.clone(), id: q.id() });
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    title: String,
    #[serde(default)]
    settings: SessionSettings,
    chapters: QuestionBank,
}

impl Config {
    pub fn from(root: &PathBuf) -> QuizResult<Self> {
        let path = root.join(CONFIG_FILE);
        let data = std::fs::read_to_string(path)?;
        Self::parse(&data)
    }

    pub fn parse(data: &str) -> QuizResult<Self> {
        let config: Config = serde_json::from_str(data)?;
        config.chapters.validate()?;
        Ok(config)
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn settings(&self) -> &SessionSettings {
        &self.settings
    }

    pub fn bank(&self) -> &QuestionBank {
        &self.chapters
    }
}

pub fn get_config(root: &str) -> Result<(PathBuf, Config), String> {
    let path = root.to_string();
    std::fs::canonicalize(&path)
        .map_err(|_| format!("Could not find quiz root: {}\n", path))
        .and_then(|root| {
            Config::from(&root)
                .map_err(|e| format!("Could not import {} file: {}\n", CONFIG_FILE, e))
                .map(|config| (root, config))
        })
}
