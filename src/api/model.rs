use serde::{Deserialize, Serialize};
use std::fmt;

/// Server-assigned identifier. The API is free to hand out numbers or strings.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Deserialize)]
#[serde(untagged)]
pub enum EntryId {
    Number(i64),
    Text(String),
}

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntryId::Number(n) => write!(f, "{n}"),
            EntryId::Text(s) => write!(f, "{s}"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct FeedbackEntry {
    pub id: EntryId,
    pub name: String,
    pub comment: String,
    pub created_at: String,
}

/// Body of `POST /feedbacks`.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct NewFeedback {
    pub name: String,
    pub comment: String,
}
