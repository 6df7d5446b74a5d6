use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{account::Account, vote::VoteDirection};

#[derive(Debug, Serialize, Clone, PartialEq, Eq, Hash, Deserialize)]
pub struct AnswerId(pub String);

/// An answer lives in its question's sub-collection; deleting the question
/// removes its answers with it.
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Answer {
    pub id: AnswerId,
    pub author: Account,
    pub content: String,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub is_ai_suggestion: bool,
    #[serde(default)]
    pub votes: HashMap<String, VoteDirection>,
    #[serde(default)]
    pub score: i32,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct NewAnswer {
    pub content: String,
    #[serde(default)]
    pub is_ai_suggestion: bool,
}

impl NewAnswer {
    pub fn validate(&self) -> Result<(), handle_errors::Error> {
        if self.content.trim().chars().count() < 10 {
            return Err(handle_errors::Error::InvalidInput(
                "answer must be at least 10 characters long".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod answer_tests {
    use super::*;

    #[test]
    fn validation_requires_some_substance() {
        let short = NewAnswer {
            content: "thanks".to_string(),
            is_ai_suggestion: false,
        };
        assert!(short.validate().is_err());

        let fine = NewAnswer {
            content: "Use a transaction around the read-modify-write.".to_string(),
            is_ai_suggestion: false,
        };
        assert!(fine.validate().is_ok());
    }
}
