//! Question records and the redacted paper handed to test takers.

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::Value;

use crate::models::question::QuestionRow;

/// Position labels for the fixed four-slot option list.
pub const OPTION_LABELS: [&str; 4] = ["A", "B", "C", "D"];

/// Answer options as stored in the bank.
#[derive(Debug, Clone, PartialEq)]
pub enum QuestionOptions {
    /// Label → text, e.g. `{"A": "12", "B": "14"}`.
    Labeled(BTreeMap<String, String>),
    /// Already ordered list; passed through untouched.
    Ordered(Vec<String>),
    /// Null or any other shape.
    Missing,
}

impl QuestionOptions {
    pub fn from_value(value: Option<Value>) -> Self {
        match value {
            Some(Value::Object(map)) => QuestionOptions::Labeled(
                map.into_iter()
                    .map(|(label, text)| (label, value_text(text)))
                    .collect(),
            ),
            Some(Value::Array(items)) => {
                QuestionOptions::Ordered(items.into_iter().map(value_text).collect())
            }
            _ => QuestionOptions::Missing,
        }
    }

    /// Normalizes to the list shown to test takers.
    ///
    /// Labeled options become exactly four slots in A, B, C, D order with missing
    /// labels as empty strings. Ordered lists are returned as-is.
    pub fn into_list(self) -> Vec<String> {
        match self {
            QuestionOptions::Labeled(mut map) => OPTION_LABELS
                .iter()
                .map(|label| map.remove(*label).unwrap_or_default())
                .collect(),
            QuestionOptions::Ordered(items) => items,
            QuestionOptions::Missing => Vec::new(),
        }
    }
}

fn value_text(value: Value) -> String {
    match value {
        Value::String(s) => s,
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// A question as held inside the sampler, answer included.
#[derive(Debug, Clone, PartialEq)]
pub struct QuestionRecord {
    pub id: String,
    pub prompt: String,
    pub options: QuestionOptions,
    pub topic: Option<String>,
    pub correct_answer: Option<String>,
}

impl From<QuestionRow> for QuestionRecord {
    fn from(row: QuestionRow) -> Self {
        Self {
            id: row.id,
            prompt: row.question,
            options: QuestionOptions::from_value(row.options),
            topic: row.topic,
            correct_answer: row.correct_answer,
        }
    }
}

impl QuestionRecord {
    /// Drops the correct answer and flattens the options.
    pub fn redact(self) -> PaperQuestion {
        PaperQuestion {
            id: self.id,
            question: self.prompt,
            options: self.options.into_list(),
            topic: self.topic,
        }
    }
}

/// A question safe to expose: there is no answer field to leak.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PaperQuestion {
    pub id: String,
    pub question: String,
    pub options: Vec<String>,
    pub topic: Option<String>,
}

/// A generated assessment.
#[derive(Debug, Clone, Serialize)]
pub struct AssessmentPaper {
    pub questions: Vec<PaperQuestion>,
    /// Topics dropped because their pool could not be fetched.
    pub skipped_topics: Vec<String>,
}
