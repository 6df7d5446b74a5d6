use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{account::Account, answer::Answer, vote::VoteDirection};

#[derive(Debug, Serialize, Clone, PartialEq, Eq, Hash, Deserialize)]
pub struct QuestionId(pub String);

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    pub id: QuestionId,
    pub title: String,
    pub content: String,
    pub tags: Vec<String>,
    /// Author profile as it looked when the question was posted.
    pub author: Account,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub votes: HashMap<String, VoteDirection>,
    #[serde(default)]
    pub score: i32,
    #[serde(default)]
    pub views: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    /// Populated only by the detail subscription; the list view leaves it out.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub answers: Option<Vec<Answer>>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct NewQuestion {
    pub title: String,
    pub content: String,
    /// Comma-separated, as typed into the form.
    pub tags: String,
    #[serde(default)]
    pub image_url: Option<String>,
}

impl NewQuestion {
    pub fn validate(&self) -> Result<(), handle_errors::Error> {
        if self.title.trim().chars().count() < 10 {
            return Err(handle_errors::Error::InvalidInput(
                "title must be at least 10 characters long".to_string(),
            ));
        }
        if self.content.trim().chars().count() < 20 {
            return Err(handle_errors::Error::InvalidInput(
                "question must be at least 20 characters long".to_string(),
            ));
        }
        if parse_tags(&self.tags).is_empty() {
            return Err(handle_errors::Error::InvalidInput(
                "please add at least one tag".to_string(),
            ));
        }
        Ok(())
    }
}

/// Splits a comma-separated tag field, trimming whitespace and collapsing
/// duplicates while keeping first-occurrence order.
pub fn parse_tags(raw: &str) -> Vec<String> {
    let mut tags: Vec<String> = Vec::new();
    for tag in raw.split(',') {
        let tag = tag.trim();
        if tag.is_empty() || tags.iter().any(|seen| seen == tag) {
            continue;
        }
        tags.push(tag.to_string());
    }
    tags
}

#[cfg(test)]
mod question_tests {
    use super::*;

    #[test]
    fn tags_are_trimmed_and_deduplicated() {
        assert_eq!(
            parse_tags("firebase, react, react"),
            vec!["firebase".to_string(), "react".to_string()]
        );
    }

    #[test]
    fn tag_order_follows_first_occurrence() {
        assert_eq!(
            parse_tags("b, a, b, c, a"),
            vec!["b".to_string(), "a".to_string(), "c".to_string()]
        );
    }

    #[test]
    fn empty_segments_are_dropped() {
        assert_eq!(parse_tags(" , ,rust, "), vec!["rust".to_string()]);
        assert!(parse_tags("").is_empty());
    }

    fn valid_question() -> NewQuestion {
        NewQuestion {
            title: "How do I model votes?".to_string(),
            content: "I need a vote map that prevents double voting.".to_string(),
            tags: "votes, modeling".to_string(),
            image_url: None,
        }
    }

    #[test]
    fn validation_accepts_a_complete_question() {
        assert!(valid_question().validate().is_ok());
    }

    #[test]
    fn validation_rejects_short_fields_and_missing_tags() {
        let mut short_title = valid_question();
        short_title.title = "too short".to_string();
        assert!(short_title.validate().is_err());

        let mut short_content = valid_question();
        short_content.content = "brief".to_string();
        assert!(short_content.validate().is_err());

        let mut no_tags = valid_question();
        no_tags.tags = " , ".to_string();
        assert!(no_tags.validate().is_err());
    }
}
