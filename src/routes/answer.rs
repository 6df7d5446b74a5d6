use std::collections::HashMap;

use chrono::Utc;
use uuid::Uuid;
use warp::{Rejection, Reply};

use crate::store::Store;
use crate::types::{
    account::{Account, Session},
    answer::{Answer, AnswerId, NewAnswer},
    question::QuestionId,
};

pub async fn add_answer(
    question_id: String,
    session: Session,
    store: Store,
    new_answer: NewAnswer,
) -> Result<impl Reply, Rejection> {
    if let Err(e) = new_answer.validate() {
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

    let answer = Answer {
        id: AnswerId(Uuid::new_v4().to_string()),
        author,
        content: new_answer.content,
        created_at: Utc::now(),
        is_ai_suggestion: new_answer.is_ai_suggestion,
        votes: HashMap::new(),
        score: 0,
    };

    match store.add_answer(&QuestionId(question_id), answer).await {
        Ok(answer) => Ok(warp::reply::json(&answer)),
        Err(e) => Err(warp::reject::custom(e)),
    }
}
