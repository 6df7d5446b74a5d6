//! Session issuance and token verification. Federated sign-in happens
//! upstream; this layer turns a verified identity assertion into a paseto
//! token and creates the profile on first sign-in.

use std::{env, future};

use chrono::Utc;
use serde_json::json;
use warp::{Filter, Rejection, Reply};

use crate::store::Store;
use crate::types::account::{AccountId, NewSession, Session};

pub async fn start_session(store: Store, new_session: NewSession) -> Result<impl Reply, Rejection> {
    if new_session.uid.is_anonymous() || new_session.uid.0.trim().is_empty() {
        return Err(warp::reject::custom(handle_errors::Error::InvalidInput(
            "a signed-in account id is required".to_string(),
        )));
    }

    match store.ensure_account(&new_session).await {
        Ok(()) => Ok(warp::reply::json(&json!({
            "token": issue_token(new_session.uid),
        }))),
        Err(e) => Err(warp::reject::custom(e)),
    }
}

fn issue_token(account_id: AccountId) -> String {
    let key = env::var("PASETO_KEY").expect("PASETO_KEY must be set");

    let current_date_time = Utc::now();
    let dt = current_date_time + chrono::Duration::days(1);

    paseto::tokens::PasetoBuilder::new()
        .set_encryption_key(&Vec::from(key.as_bytes()))
        .set_expiration(&dt)
        .set_not_before(&current_date_time)
        .set_claim("account_id", serde_json::json!(account_id))
        .build()
        .expect("Failed to construct paseto token w/ builder!")
}

pub fn verify_token(token: String) -> Result<Session, handle_errors::Error> {
    let key = env::var("PASETO_KEY").expect("PASETO_KEY must be set");

    let token = paseto::tokens::validate_local_token(
        &token,
        None,
        key.as_bytes(),
        &paseto::tokens::TimeBackend::Chrono,
    )
    .map_err(|_| handle_errors::Error::CannotDecryptToken)?;

    serde_json::from_value::<Session>(token).map_err(|_| handle_errors::Error::CannotDecryptToken)
}

fn anonymous_session() -> Session {
    let now = Utc::now();
    Session {
        exp: now + chrono::Duration::days(1),
        nbf: now,
        account_id: AccountId(crate::types::account::ANONYMOUS.to_string()),
    }
}

/// Requires a valid token.
pub fn auth() -> impl Filter<Extract = (Session,), Error = Rejection> + Clone {
    warp::header::<String>("Authorization").and_then(|token: String| {
        future::ready(verify_token(token).map_err(warp::reject::custom))
    })
}

/// Accepts a valid token or no token at all; missing callers act as the
/// anonymous identity.
pub fn auth_optional() -> impl Filter<Extract = (Session,), Error = Rejection> + Clone {
    warp::header::optional::<String>("Authorization").and_then(|token: Option<String>| {
        let session = match token {
            Some(token) => verify_token(token),
            None => Ok(anonymous_session()),
        };
        future::ready(session.map_err(warp::reject::custom))
    })
}

#[cfg(test)]
mod authentication_tests {
    use super::*;

    fn set_key() {
        unsafe { env::set_var("PASETO_KEY", "RANDOM WORDS WINTER MACINTOSH PC") };
    }

    #[test]
    fn issued_tokens_verify_back_to_the_account() {
        set_key();
        let token = issue_token(AccountId("user-42".to_string()));
        let session = verify_token(token).unwrap();
        assert_eq!(session.account_id, AccountId("user-42".to_string()));
    }

    #[test]
    fn garbage_tokens_are_rejected() {
        set_key();
        let result = verify_token("v2.local.not-a-real-token".to_string());
        assert!(matches!(
            result,
            Err(handle_errors::Error::CannotDecryptToken)
        ));
    }

    #[test]
    fn anonymous_sessions_carry_the_anonymous_id() {
        assert!(anonymous_session().account_id.is_anonymous());
    }
}
