use serde_json::Value;
use sqlx::FromRow;

/// A question bank row. `options` is either a label→text object or an ordered array.
#[derive(Debug, Clone, FromRow)]
pub struct QuestionRow {
    pub id: String,
    pub question: String,
    pub options: Option<Value>,
    pub topic: Option<String>,
    pub correct_answer: Option<String>,
}
