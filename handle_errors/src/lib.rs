use tracing::{Level, event, instrument};
use warp::{
    Rejection, Reply,
    filters::{body::BodyDeserializeError, cors::CorsForbidden},
    http::StatusCode,
    reject::Reject,
};

#[derive(Debug)]
pub enum Error {
    ParseError(std::num::ParseIntError),
    MissingParameters,
    InvalidInput(String),
    RecordNotFound,
    Unauthorized,
    CannotDecryptToken,
    DatabaseQueryError(sqlx::Error),
    MigrationError(sqlx::migrate::MigrateError),
    SerializationError(serde_json::Error),
    ReqwestAPIError(reqwest::Error),
    ClientError(ApiError),
    ServerError(ApiError),
}

/// Status and body of a failed call to an external HTTP service.
#[derive(Debug, Clone)]
pub struct ApiError {
    pub status: u16,
    pub message: String,
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "status: {}, message: {}", self.status, self.message)
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::ParseError(err) => {
                write!(f, "cannot parse parameter: {}", err)
            }
            Error::MissingParameters => write!(f, "missing parameter"),
            Error::InvalidInput(reason) => write!(f, "invalid input: {}", reason),
            Error::RecordNotFound => write!(f, "record not found"),
            Error::Unauthorized => write!(f, "no permission to change the underlying resource"),
            Error::CannotDecryptToken => write!(f, "cannot decrypt token provided"),
            Error::DatabaseQueryError(_) => write!(f, "cannot update, invalid data"),
            Error::MigrationError(_) => write!(f, "cannot migrate data"),
            Error::SerializationError(_) => write!(f, "cannot serialize document"),
            Error::ReqwestAPIError(err) => write!(f, "external API error: {}", err),
            Error::ClientError(err) => write!(f, "external client error: {}", err),
            Error::ServerError(err) => write!(f, "external server error: {}", err),
        }
    }
}

impl Reject for Error {}
impl Reject for ApiError {}

#[instrument]
pub async fn return_error(r: Rejection) -> Result<impl Reply, Rejection> {
    if let Some(crate::Error::DatabaseQueryError(e)) = r.find() {
        event!(Level::ERROR, "database query error: {}", e);
        Ok(warp::reply::with_status(
            "Cannot update data".to_string(),
            StatusCode::UNPROCESSABLE_ENTITY,
        ))
    } else if let Some(crate::Error::RecordNotFound) = r.find() {
        event!(Level::WARN, "record not found");
        Ok(warp::reply::with_status(
            crate::Error::RecordNotFound.to_string(),
            StatusCode::NOT_FOUND,
        ))
    } else if let Some(crate::Error::InvalidInput(reason)) = r.find() {
        event!(Level::WARN, "rejecting invalid input: {}", reason);
        Ok(warp::reply::with_status(
            crate::Error::InvalidInput(reason.clone()).to_string(),
            StatusCode::UNPROCESSABLE_ENTITY,
        ))
    } else if let Some(crate::Error::Unauthorized) = r.find() {
        event!(Level::ERROR, "not matching account id");
        Ok(warp::reply::with_status(
            "No permission to change underlying resource".to_string(),
            StatusCode::UNAUTHORIZED,
        ))
    } else if let Some(crate::Error::CannotDecryptToken) = r.find() {
        event!(Level::ERROR, "cannot decrypt the provided token");
        Ok(warp::reply::with_status(
            "No permission to change underlying resource".to_string(),
            StatusCode::UNAUTHORIZED,
        ))
    } else if let Some(crate::Error::ReqwestAPIError(e)) = r.find() {
        event!(Level::ERROR, "{}", e);
        Ok(warp::reply::with_status(
            "Internal Server Error".to_string(),
            StatusCode::INTERNAL_SERVER_ERROR,
        ))
    } else if let Some(crate::Error::ClientError(e)) = r.find() {
        event!(Level::ERROR, "{}", e);
        Ok(warp::reply::with_status(
            "Internal Server Error".to_string(),
            StatusCode::INTERNAL_SERVER_ERROR,
        ))
    } else if let Some(crate::Error::ServerError(e)) = r.find() {
        event!(Level::ERROR, "{}", e);
        Ok(warp::reply::with_status(
            "Internal Server Error".to_string(),
            StatusCode::INTERNAL_SERVER_ERROR,
        ))
    } else if let Some(crate::Error::SerializationError(e)) = r.find() {
        event!(Level::ERROR, "document serialization error: {}", e);
        Ok(warp::reply::with_status(
            "Internal Server Error".to_string(),
            StatusCode::INTERNAL_SERVER_ERROR,
        ))
    } else if let Some(error) = r.find::<CorsForbidden>() {
        event!(Level::ERROR, "CORS forbidden error: {}", error);
        Ok(warp::reply::with_status(
            error.to_string(),
            StatusCode::FORBIDDEN,
        ))
    } else if let Some(error) = r.find::<BodyDeserializeError>() {
        event!(Level::ERROR, "cannot deserialize request body: {}", error);
        Ok(warp::reply::with_status(
            error.to_string(),
            StatusCode::UNPROCESSABLE_ENTITY,
        ))
    } else if let Some(error) = r.find::<crate::Error>() {
        event!(Level::ERROR, "{}", error);
        Ok(warp::reply::with_status(
            error.to_string(),
            StatusCode::RANGE_NOT_SATISFIABLE,
        ))
    } else {
        event!(Level::WARN, "requested route was not found");
        Ok(warp::reply::with_status(
            "Route not found".to_string(),
            StatusCode::NOT_FOUND,
        ))
    }
}
