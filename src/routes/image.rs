use bytes::BufMut;
use futures_util::TryStreamExt;
use serde_json::json;
use tracing::{Level, event};
use warp::{
    Rejection, Reply,
    filters::multipart::{FormData, Part},
};

use crate::storage::MediaStore;

/// Accepts a multipart form with a `file` part, pushes the bytes to the
/// media bucket and returns the download URL.
pub async fn upload_image(media: MediaStore, form: FormData) -> Result<impl Reply, Rejection> {
    let parts: Vec<Part> = form.try_collect().await.map_err(|e| {
        event!(Level::ERROR, "could not read multipart form: {}", e);
        warp::reject::custom(handle_errors::Error::InvalidInput(
            "could not read multipart form".to_string(),
        ))
    })?;

    for part in parts {
        if part.name() != "file" {
            continue;
        }

        let filename = part
            .filename()
            .unwrap_or("upload.bin")
            .to_string();

        let bytes = part
            .stream()
            .try_fold(Vec::new(), |mut acc, data| {
                acc.put(data);
                async move { Ok(acc) }
            })
            .await
            .map_err(|e| {
                event!(Level::ERROR, "could not buffer uploaded file: {}", e);
                warp::reject::custom(handle_errors::Error::InvalidInput(
                    "could not read uploaded file".to_string(),
                ))
            })?;

        return match media.upload(&filename, bytes).await {
            Ok(url) => Ok(warp::reply::json(&json!({ "imageUrl": url }))),
            Err(e) => Err(warp::reject::custom(e)),
        };
    }

    Err(warp::reject::custom(handle_errors::Error::InvalidInput(
        "missing file part".to_string(),
    )))
}
