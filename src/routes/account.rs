use warp::{Rejection, Reply};

use crate::store::Store;

/// All accounts, highest reputation first.
pub async fn get_leaderboard(store: Store) -> Result<impl Reply, Rejection> {
    match store.leaderboard().await {
        Ok(accounts) => Ok(warp::reply::json(&accounts)),
        Err(e) => Err(warp::reject::custom(e)),
    }
}

/// Mentor directory; a fresh database seeds itself on the first visit.
pub async fn get_mentors(store: Store) -> Result<impl Reply, Rejection> {
    match store.mentors().await {
        Ok(mentors) => Ok(warp::reply::json(&mentors)),
        Err(e) => Err(warp::reject::custom(e)),
    }
}

pub async fn get_analytics(store: Store) -> Result<impl Reply, Rejection> {
    match store.analytics().await {
        Ok(data) => Ok(warp::reply::json(&data)),
        Err(e) => Err(warp::reject::custom(e)),
    }
}
