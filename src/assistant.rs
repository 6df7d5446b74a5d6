//! Client for the hosted prompt-execution service. Two named prompt flows,
//! each a stateless request/response call with a typed schema on both sides.
//! No retries: a failed call is terminal for that user action.

use serde::{Deserialize, Serialize};

use handle_errors::{ApiError, Error};

use crate::types::analytics::AnalyticsData;

const SUGGEST_ANSWER_FLOW: &str = "suggestAnswer";
const ANALYTICS_BOT_FLOW: &str = "analyticsBot";

#[derive(Debug, Clone)]
pub struct AssistantClient {
    client: reqwest::Client,
    api_url: String,
    api_key: String,
}

#[derive(Serialize)]
struct SuggestAnswerRequest<'a> {
    question: &'a str,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SuggestAnswerResponse {
    suggested_answer: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct AnalyticsBotRequest<'a> {
    question: &'a str,
    analytics_data: &'a AnalyticsData,
}

#[derive(Deserialize)]
struct AnalyticsBotResponse {
    answer: String,
}

impl AssistantClient {
    pub fn new(api_url: &str, api_key: &str) -> Self {
        AssistantClient {
            client: reqwest::Client::new(),
            api_url: api_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        }
    }

    /// Free-form answer suggestion; returns a markdown-formatted answer.
    pub async fn suggest_answer(&self, question: &str) -> Result<String, Error> {
        let res = self
            .client
            .post(format!("{}/flows/{}", self.api_url, SUGGEST_ANSWER_FLOW))
            .header("apikey", &self.api_key)
            .json(&SuggestAnswerRequest { question })
            .send()
            .await
            .map_err(Error::ReqwestAPIError)?;

        if !res.status().is_success() {
            if res.status().is_client_error() {
                return Err(Error::ClientError(transform_error(res).await));
            }
            return Err(Error::ServerError(transform_error(res).await));
        }

        let body = res
            .json::<SuggestAnswerResponse>()
            .await
            .map_err(Error::ReqwestAPIError)?;
        Ok(body.suggested_answer)
    }

    /// Answers a question about the supplied analytics snapshot. The hosted
    /// prompt is instructed to stick to the data for analytics questions and
    /// to decline when it cannot answer.
    pub async fn analytics_answer(
        &self,
        question: &str,
        analytics_data: &AnalyticsData,
    ) -> Result<String, Error> {
        let res = self
            .client
            .post(format!("{}/flows/{}", self.api_url, ANALYTICS_BOT_FLOW))
            .header("apikey", &self.api_key)
            .json(&AnalyticsBotRequest {
                question,
                analytics_data,
            })
            .send()
            .await
            .map_err(Error::ReqwestAPIError)?;

        if !res.status().is_success() {
            if res.status().is_client_error() {
                return Err(Error::ClientError(transform_error(res).await));
            }
            return Err(Error::ServerError(transform_error(res).await));
        }

        let body = res
            .json::<AnalyticsBotResponse>()
            .await
            .map_err(Error::ReqwestAPIError)?;
        Ok(body.answer)
    }
}

async fn transform_error(res: reqwest::Response) -> ApiError {
    ApiError {
        status: res.status().as_u16(),
        message: res
            .text()
            .await
            .unwrap_or_else(|_| "unreadable response body".to_string()),
    }
}

#[cfg(test)]
mod assistant_tests {
    use std::collections::HashMap;

    use mock_server::MockServer;

    use super::*;

    fn snapshot() -> AnalyticsData {
        AnalyticsData {
            total_questions: 4,
            total_answers: 3,
            total_users: 9,
            total_ai_answers: 2,
            tag_counts: HashMap::from([("firebase".to_string(), 2)]),
        }
    }

    #[tokio::test]
    async fn suggests_an_answer() {
        let mock = MockServer::oneshot().await;
        let client = AssistantClient::new(&format!("http://{}", mock.addr), "key");

        let answer = client.suggest_answer("How do I model votes?").await.unwrap();
        assert_eq!(answer, "Use subcollections to keep documents small.");

        let _ = mock.sender.send(1);
    }

    #[tokio::test]
    async fn answers_about_analytics() {
        let mock = MockServer::oneshot().await;
        let client = AssistantClient::new(&format!("http://{}", mock.addr), "key");

        let answer = client
            .analytics_answer("How many questions are there?", &snapshot())
            .await
            .unwrap();
        assert_eq!(answer, "There are 4 questions on the platform.");

        let _ = mock.sender.send(1);
    }

    #[tokio::test]
    async fn unknown_flow_maps_to_client_error() {
        let mock = MockServer::oneshot().await;
        let client = AssistantClient::new(&format!("http://{}/missing", mock.addr), "key");

        let result = client.suggest_answer("anyone there?").await;
        match result {
            Err(Error::ClientError(e)) => assert_eq!(e.status, 404),
            other => panic!("expected a client error, got {:?}", other.map(|_| ())),
        }

        let _ = mock.sender.send(1);
    }

    #[tokio::test]
    async fn backend_failure_maps_to_server_error() {
        let mock = MockServer::oneshot().await;
        // point the suggest flow name at the mock's broken route
        let client = AssistantClient::new(&format!("http://{}", mock.addr), "key");

        let res = client
            .client
            .post(format!("http://{}/flows/broken", mock.addr))
            .send()
            .await
            .unwrap();
        assert_eq!(res.status().as_u16(), 500);
        let err = transform_error(res).await;
        assert_eq!(err.status, 500);
        assert_eq!(err.message, "prompt backend exploded");

        let _ = mock.sender.send(1);
    }

    #[tokio::test]
    async fn unreachable_backend_is_a_request_error() {
        // nothing listens on this port
        let client = AssistantClient::new("http://127.0.0.1:9", "key");
        let result = client.suggest_answer("hello?").await;
        assert!(matches!(result, Err(Error::ReqwestAPIError(_))));
    }
}
