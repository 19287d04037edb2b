use std::sync::Arc;

use rand::Rng;

use crate::dao::models::QuestionEntity;

/// Index of a question inside its bank.
pub type QuestionId = u32;

/// Immutable trivia item handed out to sessions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Question {
    /// Position of the question in the bank.
    pub id: QuestionId,
    /// Prompt shown to the player.
    pub prompt: String,
    /// Choices in display order.
    pub choices: Vec<String>,
    /// Short label of the correct choice (e.g. `B`).
    pub answer: String,
}

impl Question {
    /// Compare a submitted choice label against this question's key.
    ///
    /// Labels are compared trimmed and case-insensitively.
    pub fn is_correct(&self, choice: &str) -> bool {
        normalize_label(choice) == normalize_label(&self.answer)
    }
}

/// Canonical form of a choice label.
pub fn normalize_label(label: &str) -> String {
    label.trim().to_uppercase()
}

/// Fixed pool of questions shared by every session.
#[derive(Debug, Clone, Default)]
pub struct QuestionBank {
    questions: Vec<Arc<Question>>,
}

impl QuestionBank {
    /// Build a bank from parsed records, numbering them in order.
    pub fn new(entities: Vec<QuestionEntity>) -> Self {
        let questions = entities
            .into_iter()
            .enumerate()
            .map(|(index, entity)| Arc::new(Question::from((index as QuestionId, entity))))
            .collect();
        Self { questions }
    }

    /// Number of questions in the bank.
    pub fn len(&self) -> usize {
        self.questions.len()
    }

    /// Whether the bank holds no question at all.
    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    /// Pick a random question, avoiding `previous` whenever another one exists.
    pub fn draw<R: Rng + ?Sized>(
        &self,
        previous: Option<QuestionId>,
        rng: &mut R,
    ) -> Option<Arc<Question>> {
        let len = self.questions.len();
        match (len, previous) {
            (0, _) => None,
            (1, _) | (_, None) => Some(self.questions[rng.random_range(0..len)].clone()),
            (_, Some(previous)) => {
                // Draw among the other `len - 1` entries by skipping over `previous`.
                let mut index = rng.random_range(0..len - 1);
                if let Some(position) = self.questions.iter().position(|q| q.id == previous) {
                    if index >= position {
                        index += 1;
                    }
                }
                Some(self.questions[index].clone())
            }
        }
    }
}

impl From<(QuestionId, QuestionEntity)> for Question {
    fn from((id, value): (QuestionId, QuestionEntity)) -> Self {
        Self {
            id,
            prompt: value.question,
            choices: value.choices,
            answer: normalize_label(&value.answer),
        }
    }
}

/// Built-in question set used when no question file is available.
pub fn default_questions() -> Vec<QuestionEntity> {
    let item = |question: &str, choices: &[&str], answer: &str| QuestionEntity {
        question: question.to_string(),
        choices: choices.iter().map(|c| c.to_string()).collect(),
        answer: answer.to_string(),
    };

    vec![
        item(
            "Which planet is known as the red planet?",
            &["A) Venus", "B) Mars", "C) Jupiter", "D) Mercury"],
            "B",
        ),
        item(
            "What is the chemical symbol for gold?",
            &["A) Ag", "B) Gd", "C) Au", "D) Go"],
            "C",
        ),
        item(
            "How many sides does a hexagon have?",
            &["A) Six", "B) Five", "C) Eight", "D) Seven"],
            "A",
        ),
        item(
            "Which ocean is the largest?",
            &["A) Atlantic", "B) Indian", "C) Arctic", "D) Pacific"],
            "D",
        ),
        item(
            "Who wrote \"Pride and Prejudice\"?",
            &["A) Charlotte Brontë", "B) Jane Austen", "C) Mary Shelley", "D) George Eliot"],
            "B",
        ),
        item(
            "What is the boiling point of water at sea level in Celsius?",
            &["A) 90", "B) 110", "C) 100", "D) 120"],
            "C",
        ),
        item(
            "Which gas do plants absorb from the atmosphere?",
            &["A) Carbon dioxide", "B) Oxygen", "C) Nitrogen", "D) Helium"],
            "A",
        ),
        item(
            "What is the smallest prime number?",
            &["A) 0", "B) 1", "C) 3", "D) 2"],
            "D",
        ),
    ]
}
