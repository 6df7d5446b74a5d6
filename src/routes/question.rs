use std::collections::HashMap;

use chrono::Utc;
use futures_util::StreamExt;
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tracing::{Level, event, instrument};
use uuid::Uuid;
use warp::{Rejection, Reply};

use crate::store::Store;
use crate::subscription;
use crate::types::{
    account::{Account, Session},
    pagination::{Pagination, extract_pagination},
    question::{NewQuestion, Question, QuestionId, parse_tags},
};

#[instrument]
pub async fn get_questions(
    params: HashMap<String, String>,
    store: Store,
) -> Result<impl Reply, Rejection> {
    event!(target: "dev_commons", Level::INFO, "querying questions");
    let mut pagination = Pagination::default();

    if !params.is_empty() {
        event!(Level::INFO, pagination = true);
        pagination = match extract_pagination(params) {
            Ok(pagination) => pagination,
            Err(e) => return Err(warp::reject::custom(e)),
        };
    }

    match store.get_questions(pagination).await {
        Ok(questions) => Ok(warp::reply::json(&questions)),
        Err(e) => Err(warp::reject::custom(e)),
    }
}

pub async fn add_question(
    session: Session,
    store: Store,
    new_question: NewQuestion,
) -> Result<impl Reply, Rejection> {
    if let Err(e) = new_question.validate() {
        return Err(warp::reject::custom(e));
    }

    let author = if session.account_id.is_anonymous() {
        Account::anonymous()
    } else {
        match store.get_account(&session.account_id).await {
            Ok(Some(account)) => account,
            Ok(None) => return Err(warp::reject::custom(handle_errors::Error::Unauthorized)),
            Err(e) => return Err(warp::reject::custom(e)),
        }
    };

    let question = Question {
        id: QuestionId(Uuid::new_v4().to_string()),
        title: new_question.title,
        content: new_question.content,
        tags: parse_tags(&new_question.tags),
        author,
        created_at: Utc::now(),
        votes: HashMap::new(),
        score: 0,
        views: 0,
        image_url: new_question.image_url,
        answers: None,
    };

    match store.add_question(question).await {
        Ok(question) => Ok(warp::reply::json(&question)),
        Err(e) => Err(warp::reject::custom(e)),
    }
}

/// Live question list as Server-Sent Events. The subscription handle rides
/// inside the event stream, so closing the connection cancels the feed.
pub async fn stream_questions(store: Store) -> Result<impl Reply, Rejection> {
    let (tx, rx) = mpsc::channel(8);
    let subscription = subscription::questions(store, tx);

    let stream = ReceiverStream::new(rx).map(move |questions| {
        let _feed = &subscription;
        warp::sse::Event::default().event("questions").json_data(&questions)
    });

    Ok(warp::sse::reply(warp::sse::keep_alive().stream(stream)))
}

/// Live view of one question composed with its answers; a `null` payload is
/// the explicit "this question does not exist" signal.
pub async fn stream_question(id: String, store: Store) -> Result<impl Reply, Rejection> {
    let (tx, rx) = mpsc::channel(8);
    let subscription = subscription::question(store, QuestionId(id), tx);

    let stream = ReceiverStream::new(rx).map(move |snapshot| {
        let _feed = &subscription;
        warp::sse::Event::default().event("question").json_data(&snapshot)
    });

    Ok(warp::sse::reply(warp::sse::keep_alive().stream(stream)))
}

/// Questions that carry an image, for the gallery page. One-shot read.
pub async fn get_gallery(store: Store) -> Result<impl Reply, Rejection> {
    match store.questions_with_images().await {
        Ok(questions) => Ok(warp::reply::json(&questions)),
        Err(e) => Err(warp::reject::custom(e)),
    }
}
