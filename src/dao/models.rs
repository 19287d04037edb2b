use serde::{Deserialize, Serialize};

/// Trivia item as read from the question source, before it is assigned an id.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct QuestionEntity {
    /// Prompt shown to the player.
    pub question: String,
    /// Choices in display order, each starting with its label (e.g. `A) Paris`).
    pub choices: Vec<String>,
    /// Label of the correct choice, upper-cased (e.g. `A`).
    pub answer: String,
}
