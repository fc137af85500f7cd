//! Google Cloud Storage object store using the JSON API.
//!
//! Uploads use the simple media upload; objects are served from the public
//! `storage.googleapis.com/<bucket>/<name>` URL.

use std::time::Duration;

use async_trait::async_trait;

use crate::config::{resolve_env_var, StorageConfig};
use crate::error::ServiceError;

use super::ObjectStore;

const SERVICE: &str = "gcs";
const API_BASE: &str = "https://storage.googleapis.com";

/// Object store backed by one GCS bucket.
pub struct GcsObjectStore {
    bucket: String,
    access_token: String,
    base_url: String,
    client: reqwest::Client,
}

impl GcsObjectStore {
    /// Build a store from config, resolving bucket and token from the environment.
    pub fn from_config(config: &StorageConfig) -> Result<Self, ServiceError> {
        let bucket = resolve_env_var(&config.bucket).ok_or_else(|| ServiceError::Request {
            service: SERVICE,
            message: "Storage bucket not set. Set GCS_IMAGE_BUCKET env var.".to_string(),
            status_code: None,
        })?;
        let access_token =
            resolve_env_var(&config.access_token).ok_or_else(|| ServiceError::Request {
                service: SERVICE,
                message: "Storage access token not set. Set GCS_ACCESS_TOKEN env var."
                    .to_string(),
                status_code: None,
            })?;

        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .map_err(|e| ServiceError::Request {
                service: SERVICE,
                message: format!("Failed to build HTTP client: {e}"),
                status_code: None,
            })?;

        Ok(Self {
            bucket,
            access_token,
            base_url: API_BASE.to_string(),
            client,
        })
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    /// Public URL for an object, as served to browsers.
    pub fn public_url(&self, object_name: &str) -> String {
        format!("{}/{}/{}", self.base_url, self.bucket, object_name)
    }

    async fn check(resp: reqwest::Response) -> Result<reqwest::Response, ServiceError> {
        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }
        let text = resp.text().await.unwrap_or_default();
        Err(ServiceError::Request {
            service: SERVICE,
            message: format!("HTTP {status}: {text}"),
            status_code: Some(status.as_u16()),
        })
    }

    fn send_error(e: reqwest::Error) -> ServiceError {
        if e.is_timeout() {
            return ServiceError::Request {
                service: SERVICE,
                message: format!("request timed out: {e}"),
                status_code: None,
            };
        }
        ServiceError::Request {
            service: SERVICE,
            message: e.to_string(),
            status_code: None,
        }
    }
}

#[async_trait]
impl ObjectStore for GcsObjectStore {
    fn name(&self) -> &str {
        "gcs"
    }

    async fn put(
        &self,
        object_name: &str,
        bytes: &[u8],
        content_type: &str,
    ) -> Result<String, ServiceError> {
        let url = format!("{}/upload/storage/v1/b/{}/o", self.base_url, self.bucket);
        let resp = self
            .client
            .post(url)
            .query(&[("uploadType", "media"), ("name", object_name)])
            .bearer_auth(&self.access_token)
            .header(reqwest::header::CONTENT_TYPE, content_type)
            .body(bytes.to_vec())
            .send()
            .await
            .map_err(Self::send_error)?;
        Self::check(resp).await?;

        tracing::debug!("Uploaded gs://{}/{object_name} ({} bytes)", self.bucket, bytes.len());
        Ok(self.public_url(object_name))
    }

    async fn delete(&self, object_name: &str) -> Result<(), ServiceError> {
        let url = format!(
            "{}/storage/v1/b/{}/o/{}",
            self.base_url, self.bucket, object_name
        );
        let resp = self
            .client
            .delete(url)
            .bearer_auth(&self.access_token)
            .send()
            .await
            .map_err(Self::send_error)?;

        if resp.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(());
        }
        Self::check(resp).await.map(|_| ())
    }

    fn object_name(&self, url: &str) -> Option<String> {
        let prefix = format!("{}/{}/", self.base_url, self.bucket);
        url.strip_prefix(&prefix)
            .filter(|name| !name.is_empty())
            .map(String::from)
    }
}
