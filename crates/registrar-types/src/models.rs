use serde::{Deserialize, Serialize};

/// One graded subject on a student record. Scores are kept as the submitted
/// string; the edit form is the only writer and enforces the 6-row limit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubjectMark {
    pub code: String,
    pub score: String,
}

/// A single chat line as stored in a room log and relayed to members.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub sender: String,
    pub message: String,
}
