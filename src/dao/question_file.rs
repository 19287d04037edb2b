//! Parser for the plain-text question format.
//!
//! A file is a sequence of blocks, each terminated by an `ANSWER:` line:
//!
//! ```text
//! Which planet is known as the red planet?
//! A) Venus
//! B) Mars
//! C) Jupiter
//! ANSWER: B
//! ```
//!
//! The first line after `ANSWER:` holds the label of the correct choice. Stray
//! single-letter lines (typically the answer line of the previous block) are skipped.

use std::{fs, io, path::Path, sync::LazyLock};

use regex::Regex;
use thiserror::Error;
use tracing::warn;

use crate::dao::models::QuestionEntity;

static ANSWER_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\bANSWER:").expect("valid answer marker regex"));
static CHOICE_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-E]\)").expect("valid choice regex"));

/// Result alias for question file operations.
pub type QuestionFileResult<T> = Result<T, QuestionFileError>;

/// Error raised while loading a question file.
#[derive(Debug, Error)]
pub enum QuestionFileError {
    /// The file does not exist.
    #[error("question file `{path}` not found")]
    NotFound {
        /// Path that was looked up.
        path: String,
    },
    /// The file exists but could not be read.
    #[error("failed to read question file `{path}`")]
    Io {
        /// Path that was read.
        path: String,
        #[source]
        source: io::Error,
    },
}

/// Read and parse the question file at `path`.
pub fn load_questions(path: &Path) -> QuestionFileResult<Vec<QuestionEntity>> {
    let raw = fs::read_to_string(path).map_err(|source| {
        let path = path.display().to_string();
        if source.kind() == io::ErrorKind::NotFound {
            QuestionFileError::NotFound { path }
        } else {
            QuestionFileError::Io { path, source }
        }
    })?;
    Ok(parse_questions(&raw))
}

/// Parse every well-formed block of `raw`, skipping blocks without a prompt or choices.
pub fn parse_questions(raw: &str) -> Vec<QuestionEntity> {
    let blocks: Vec<&str> = ANSWER_MARKER.split(raw).collect();
    let mut questions = Vec::new();

    for pair in blocks.windows(2) {
        let (body, tail) = (pair[0], pair[1]);
        let answer = tail
            .trim()
            .lines()
            .next()
            .unwrap_or_default()
            .trim()
            .to_uppercase();

        match parse_block(body, answer) {
            Some(question) => questions.push(question),
            None => warn!(block = %body.trim(), "skipping malformed question block"),
        }
    }

    questions
}

fn parse_block(body: &str, answer: String) -> Option<QuestionEntity> {
    let mut prompt: Option<&str> = None;
    let mut choices = Vec::new();

    for line in body.lines().map(str::trim).filter(|line| !line.is_empty()) {
        if CHOICE_LINE.is_match(line) {
            choices.push(line.to_string());
            continue;
        }
        if is_stray_label(line) {
            continue;
        }
        if prompt.is_none() {
            prompt = Some(line);
        }
    }

    let prompt = prompt?;
    if choices.is_empty() || answer.is_empty() {
        return None;
    }

    Some(QuestionEntity {
        question: prompt.to_string(),
        choices,
        answer,
    })
}

fn is_stray_label(line: &str) -> bool {
    let mut chars = line.chars();
    matches!(
        (chars.next(), chars.next()),
        (Some(c), None) if "ABCDE".contains(c.to_ascii_uppercase())
    )
}
