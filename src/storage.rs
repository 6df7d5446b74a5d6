//! Uploads question images to the media bucket over plain HTTP PUT and hands
//! back the public download URL.

use chrono::Utc;
use handle_errors::{ApiError, Error};

#[derive(Debug, Clone)]
pub struct MediaStore {
    client: reqwest::Client,
    bucket_url: String,
}

/// Object keys are prefixed per collection and made unique by upload time.
pub fn object_key(filename: &str, epoch_millis: i64) -> String {
    let safe: String = filename
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '-'
            }
        })
        .collect();
    format!("question-images/{}-{}", epoch_millis, safe)
}

impl MediaStore {
    pub fn new(bucket_url: &str) -> Self {
        MediaStore {
            client: reqwest::Client::new(),
            bucket_url: bucket_url.trim_end_matches('/').to_string(),
        }
    }

    pub async fn upload(&self, filename: &str, bytes: Vec<u8>) -> Result<String, Error> {
        let key = object_key(filename, Utc::now().timestamp_millis());
        let url = format!("{}/{}", self.bucket_url, key);

        let res = self
            .client
            .put(&url)
            .body(bytes)
            .send()
            .await
            .map_err(Error::ReqwestAPIError)?;

        if !res.status().is_success() {
            let status = res.status().as_u16();
            let message = res
                .text()
                .await
                .unwrap_or_else(|_| "unreadable response body".to_string());
            return Err(Error::ServerError(ApiError { status, message }));
        }

        Ok(url)
    }
}

#[cfg(test)]
mod storage_tests {
    use super::*;

    #[test]
    fn keys_carry_prefix_timestamp_and_filename() {
        assert_eq!(
            object_key("diagram.png", 1754822400000),
            "question-images/1754822400000-diagram.png"
        );
    }

    #[test]
    fn awkward_filenames_are_sanitized() {
        assert_eq!(
            object_key("my sketch (v2).png", 1),
            "question-images/1-my-sketch--v2-.png"
        );
    }
}
