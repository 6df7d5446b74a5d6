//! In-process stand-in for the hosted assistant prompt service, used by tests.

use std::net::SocketAddr;

use serde_json::json;
use tokio::sync::oneshot::{self, Sender};
use warp::{Filter, Reply, http::StatusCode};

pub struct MockServer;

pub struct OneshotHandler {
    pub sender: Sender<i32>,
    pub addr: SocketAddr,
}

impl MockServer {
    fn build_routes() -> impl Filter<Extract = impl Reply, Error = warp::Rejection> + Clone {
        let suggest = warp::post()
            .and(warp::path("flows"))
            .and(warp::path("suggestAnswer"))
            .and(warp::path::end())
            .and(warp::header::<String>("apikey"))
            .and(warp::body::json())
            .map(|_key: String, _body: serde_json::Value| {
                warp::reply::json(&json!({
                    "suggestedAnswer": "Use subcollections to keep documents small."
                }))
            });

        let analytics = warp::post()
            .and(warp::path("flows"))
            .and(warp::path("analyticsBot"))
            .and(warp::path::end())
            .and(warp::header::<String>("apikey"))
            .and(warp::body::json())
            .map(|_key: String, _body: serde_json::Value| {
                warp::reply::json(&json!({
                    "answer": "There are 4 questions on the platform."
                }))
            });

        let broken = warp::post()
            .and(warp::path("flows"))
            .and(warp::path("broken"))
            .and(warp::path::end())
            .map(|| {
                warp::reply::with_status(
                    "prompt backend exploded".to_string(),
                    StatusCode::INTERNAL_SERVER_ERROR,
                )
            });

        suggest.or(analytics).or(broken)
    }

    /// Spawns the mock on an ephemeral local port. Send a value through the
    /// returned handler to shut it down.
    pub async fn oneshot() -> OneshotHandler {
        let (tx, rx) = oneshot::channel::<i32>();

        let (addr, server) = warp::serve(Self::build_routes()).bind_with_graceful_shutdown(
            ([127, 0, 0, 1], 0),
            async {
                rx.await.ok();
            },
        );

        tokio::task::spawn(server);

        OneshotHandler { sender: tx, addr }
    }
}
