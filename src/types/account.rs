use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Author id used for content posted without signing in. Votes never touch
/// the reputation of this identity.
pub const ANONYMOUS: &str = "anonymous";

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq, Hash)]
pub struct AccountId(pub String);

impl AccountId {
    pub fn is_anonymous(&self) -> bool {
        self.0 == ANONYMOUS
    }
}

/// A user profile. Questions and answers embed a snapshot of this at creation
/// time; the stored copy is not refreshed when the profile changes.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    pub uid: AccountId,
    pub display_name: Option<String>,
    pub photo_url: Option<String>,
    #[serde(default)]
    pub score: i32,
    #[serde(default)]
    pub is_mentor: bool,
}

impl Account {
    pub fn anonymous() -> Self {
        Account {
            uid: AccountId(ANONYMOUS.to_string()),
            display_name: Some("Guest".to_string()),
            photo_url: None,
            score: 0,
            is_mentor: false,
        }
    }
}

/// Identity assertion handed to `POST /session` after the upstream federated
/// sign-in has verified it.
#[derive(Debug, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct NewSession {
    pub uid: AccountId,
    pub display_name: Option<String>,
    pub photo_url: Option<String>,
}

/// Claims carried inside the paseto token.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Session {
    pub exp: DateTime<Utc>,
    pub nbf: DateTime<Utc>,
    pub account_id: AccountId,
}
