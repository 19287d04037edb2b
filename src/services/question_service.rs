use std::path::Path;

use tracing::{info, warn};

use crate::{
    dao::question_file::{QuestionFileError, load_questions},
    state::question_bank::{QuestionBank, default_questions},
};

/// Load the question bank from `path`, falling back to the built-in set when the file is
/// missing, unreadable or yields no question.
pub fn load_question_bank(path: &Path) -> QuestionBank {
    match load_questions(path) {
        Ok(questions) if !questions.is_empty() => {
            info!(path = %path.display(), count = questions.len(), "loaded questions");
            QuestionBank::new(questions)
        }
        Ok(_) => {
            warn!(path = %path.display(), "question file holds no valid question; using built-in set");
            QuestionBank::new(default_questions())
        }
        Err(QuestionFileError::NotFound { .. }) => {
            info!(path = %path.display(), "question file not found; using built-in set");
            QuestionBank::new(default_questions())
        }
        Err(err) => {
            warn!(error = %err, "failed to load questions; using built-in set");
            QuestionBank::new(default_questions())
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn file_questions_replace_the_built_in_set() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "Capital of France?\nA) Paris\nB) Rome\nANSWER: A").unwrap();
        let bank = load_question_bank(file.path());
        assert_eq!(bank.len(), 1);
    }

    #[test]
    fn empty_file_falls_back() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let bank = load_question_bank(file.path());
        assert_eq!(bank.len(), default_questions().len());
    }

    #[test]
    fn missing_file_falls_back() {
        let dir = tempfile::tempdir().unwrap();
        let bank = load_question_bank(&dir.path().join("nope.txt"));
        assert_eq!(bank.len(), default_questions().len());
    }
}
