#![warn(clippy::all)]
pub use handle_errors;
use std::env;
use tracing_subscriber::fmt::format::FmtSpan;
use warp::{Filter, Reply, http::Method};

mod assistant;
pub mod config;
mod normalize;
mod routes;
mod seed;
mod storage;
mod store;
mod subscription;
pub mod types;

use assistant::AssistantClient;
use storage::MediaStore;
use store::Store;

use crate::routes::authentication::{auth, auth_optional};

async fn build_routes(
    store: Store,
    assistant: AssistantClient,
    media: MediaStore,
) -> impl Filter<Extract = impl Reply, Error = warp::Rejection> + Clone {
    let store_filter = warp::any().map(move || store.clone());
    let assistant_filter = warp::any().map(move || assistant.clone());
    let media_filter = warp::any().map(move || media.clone());

    let cors = warp::cors()
        .allow_any_origin()
        .allow_headers(vec!["content-type", "authorization"])
        .allow_methods(&[Method::PUT, Method::DELETE, Method::GET, Method::POST]);

    let get_questions = warp::get()
        .and(warp::path("questions"))
        .and(warp::path::end())
        .and(warp::query())
        .and(store_filter.clone())
        .and_then(routes::question::get_questions)
        .with(warp::trace(|info| {
            tracing::info_span!(
                "get_questions_request",
                method = %info.method(),
                path = %info.path(),
                id = %uuid::Uuid::new_v4(),
            )
        }));

    let stream_questions = warp::get()
        .and(warp::path("questions"))
        .and(warp::path("stream"))
        .and(warp::path::end())
        .and(store_filter.clone())
        .and_then(routes::question::stream_questions);

    let stream_question = warp::get()
        .and(warp::path("questions"))
        .and(warp::path::param::<String>())
        .and(warp::path("stream"))
        .and(warp::path::end())
        .and(store_filter.clone())
        .and_then(routes::question::stream_question);

    let add_question = warp::post()
        .and(warp::path("questions"))
        .and(warp::path::end())
        .and(auth_optional())
        .and(store_filter.clone())
        .and(warp::body::json())
        .and_then(routes::question::add_question);

    let add_answer = warp::post()
        .and(warp::path("questions"))
        .and(warp::path::param::<String>())
        .and(warp::path("answers"))
        .and(warp::path::end())
        .and(auth_optional())
        .and(store_filter.clone())
        .and(warp::body::json())
        .and_then(routes::answer::add_answer);

    let cast_vote = warp::post()
        .and(warp::path("votes"))
        .and(warp::path::end())
        .and(auth())
        .and(store_filter.clone())
        .and(warp::body::json())
        .and_then(routes::vote::cast_vote);

    let start_session = warp::post()
        .and(warp::path("session"))
        .and(warp::path::end())
        .and(store_filter.clone())
        .and(warp::body::json())
        .and_then(routes::authentication::start_session);

    let get_leaderboard = warp::get()
        .and(warp::path("leaderboard"))
        .and(warp::path::end())
        .and(store_filter.clone())
        .and_then(routes::account::get_leaderboard);

    let get_mentors = warp::get()
        .and(warp::path("mentors"))
        .and(warp::path::end())
        .and(store_filter.clone())
        .and_then(routes::account::get_mentors);

    let get_analytics = warp::get()
        .and(warp::path("analytics"))
        .and(warp::path::end())
        .and(store_filter.clone())
        .and_then(routes::account::get_analytics);

    let get_gallery = warp::get()
        .and(warp::path("gallery"))
        .and(warp::path::end())
        .and(store_filter.clone())
        .and_then(routes::question::get_gallery);

    let suggest_answer = warp::post()
        .and(warp::path("assistant"))
        .and(warp::path("suggestion"))
        .and(warp::path::end())
        .and(assistant_filter.clone())
        .and(warp::body::json())
        .and_then(routes::assistant::suggest_answer);

    let analytics_answer = warp::post()
        .and(warp::path("assistant"))
        .and(warp::path("analytics"))
        .and(warp::path::end())
        .and(store_filter.clone())
        .and(assistant_filter.clone())
        .and(warp::body::json())
        .and_then(routes::assistant::analytics_answer);

    let upload_image = warp::post()
        .and(warp::path("images"))
        .and(warp::path::end())
        .and(media_filter.clone())
        .and(warp::multipart::form().max_length(5_000_000))
        .and_then(routes::image::upload_image);

    stream_questions
        .or(stream_question)
        .or(get_questions)
        .or(add_question)
        .or(add_answer)
        .or(cast_vote)
        .or(start_session)
        .or(get_leaderboard)
        .or(get_mentors)
        .or(get_analytics)
        .or(get_gallery)
        .or(suggest_answer)
        .or(analytics_answer)
        .or(upload_image)
        .with(cors)
        .with(warp::trace::request())
        .recover(handle_errors::return_error)
}

pub async fn setup_store(config: &config::Config) -> Result<store::Store, handle_errors::Error> {
    let store = Store::new(&format!(
        "postgres://{}:{}@{}:{}/{}",
        config.db_user, config.db_password, config.db_host, config.db_port, config.db_name
    ))
    .await
    .map_err(handle_errors::Error::DatabaseQueryError)?;

    sqlx::migrate!()
        .run(&store.connection)
        .await
        .map_err(handle_errors::Error::MigrationError)?;

    let log_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| {
        format!(
            "handle_errors={},dev_commons={},warp={}",
            config.log_level, config.log_level, config.log_level
        )
    });

    tracing_subscriber::fmt()
        .with_env_filter(log_filter)
        // span-close events double as per-request timings
        .with_span_events(FmtSpan::CLOSE)
        .init();

    Ok(store)
}

pub async fn run(config: config::Config, store: store::Store) {
    let assistant = AssistantClient::new(
        &config.assistant_api_url,
        &env::var("ASSISTANT_API_KEY").expect("ASSISTANT_API_KEY must be set"),
    );
    let media = MediaStore::new(&config.media_bucket_url);

    let routes = build_routes(store, assistant, media).await;
    warp::serve(routes).run(([0, 0, 0, 0], config.port)).await;
}
