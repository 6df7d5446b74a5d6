use warp::{Rejection, Reply, http::StatusCode};

use crate::store::Store;
use crate::types::{account::Session, vote::NewVote};

/// Votes are integrity-sensitive and therefore require a signed-in identity;
/// the store runs the actual mutation under a transaction.
pub async fn cast_vote(
    session: Session,
    store: Store,
    new_vote: NewVote,
) -> Result<impl Reply, Rejection> {
    if session.account_id.is_anonymous() {
        return Err(warp::reject::custom(handle_errors::Error::Unauthorized));
    }

    match store.cast_vote(&new_vote, &session.account_id).await {
        Ok(()) => Ok(warp::reply::with_status("Vote processed", StatusCode::OK)),
        Err(e) => Err(warp::reject::custom(e)),
    }
}
