use serde::Deserialize;
use serde_json::json;
use tracing::{Level, event};
use warp::{Rejection, Reply};

use crate::assistant::AssistantClient;
use crate::store::Store;

#[derive(Debug, Deserialize, Clone)]
pub struct AssistantQuestion {
    pub question: String,
}

/// Asks the hosted assistant for a suggested answer. Backend faults never
/// surface as errors here; the user gets a fallback message and can re-ask.
pub async fn suggest_answer(
    assistant: AssistantClient,
    input: AssistantQuestion,
) -> Result<impl Reply, Rejection> {
    let answer = match assistant.suggest_answer(&input.question).await {
        Ok(answer) => answer,
        Err(e) => {
            event!(Level::ERROR, "error getting AI suggestion: {}", e);
            "Sorry, I could not generate a suggestion at this time.".to_string()
        }
    };

    Ok(warp::reply::json(&json!({ "answer": answer })))
}

/// Answers a question about the current analytics snapshot. The snapshot is
/// computed server-side; only assistant faults fall back, database faults
/// reject as usual.
pub async fn analytics_answer(
    store: Store,
    assistant: AssistantClient,
    input: AssistantQuestion,
) -> Result<impl Reply, Rejection> {
    if input.question.trim().is_empty() {
        return Ok(warp::reply::json(&json!({
            "answer": "I need a question and data to work with.",
        })));
    }

    let data = match store.analytics().await {
        Ok(data) => data,
        Err(e) => return Err(warp::reject::custom(e)),
    };

    let answer = match assistant.analytics_answer(&input.question, &data).await {
        Ok(answer) => answer,
        Err(e) => {
            event!(Level::ERROR, "error getting AI analytics answer: {}", e);
            "Sorry, I could not generate an answer at this time.".to_string()
        }
    };

    Ok(warp::reply::json(&json!({ "answer": answer })))
}
