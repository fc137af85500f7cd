//! Cloud Vision `images:annotate` client (LABEL_DETECTION).
//!
//! Remote URIs are passed by reference; `file://` URIs from the local object
//! store are read and sent inline as base64.

use async_trait::async_trait;
use base64::Engine;
use serde::{Deserialize, Serialize};

use crate::config::{resolve_env_var, VisionConfig};
use crate::error::ServiceError;
use crate::retry::{with_retry, RetryPolicy};

use super::LabelDetector;

const SERVICE: &str = "vision";

/// Label detector backed by the Cloud Vision REST API.
pub struct CloudVisionDetector {
    endpoint: String,
    /// Resolved lazily so read-only commands work without a key
    api_key: Option<String>,
    max_results: u32,
    policy: RetryPolicy,
    client: reqwest::Client,
}

impl CloudVisionDetector {
    /// Build a detector from config, resolving the API key from the environment.
    pub fn from_config(config: &VisionConfig) -> Self {
        Self::new(
            &config.endpoint,
            resolve_env_var(&config.api_key),
            config.max_results,
            config.into(),
        )
    }

    pub fn new(
        endpoint: &str,
        api_key: Option<String>,
        max_results: u32,
        policy: RetryPolicy,
    ) -> Self {
        Self {
            endpoint: endpoint.to_string(),
            api_key,
            max_results,
            policy,
            client: reqwest::Client::new(),
        }
    }

    fn api_key(&self) -> Result<&str, ServiceError> {
        self.api_key.as_deref().ok_or_else(|| ServiceError::Request {
            service: SERVICE,
            message: "Vision API key not set. Set GOOGLE_VISION_API_KEY env var.".to_string(),
            status_code: Some(401),
        })
    }

    async fn annotate(
        &self,
        api_key: &str,
        body: &AnnotateRequest,
    ) -> Result<Vec<String>, ServiceError> {
        let resp = self
            .client
            .post(&self.endpoint)
            .query(&[("key", api_key)])
            .json(body)
            .send()
            .await
            .map_err(|e| ServiceError::Request {
                service: SERVICE,
                message: e.to_string(),
                status_code: None,
            })?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            return Err(ServiceError::Request {
                service: SERVICE,
                message: format!("HTTP {status}: {text}"),
                status_code: Some(status.as_u16()),
            });
        }

        let parsed: AnnotateResponse =
            resp.json().await.map_err(|e| ServiceError::InvalidResponse {
                service: SERVICE,
                message: e.to_string(),
            })?;
        parsed.into_labels()
    }
}

#[async_trait]
impl LabelDetector for CloudVisionDetector {
    fn name(&self) -> &str {
        "cloud-vision"
    }

    async fn detect_labels(&self, image_uri: &str) -> Result<Vec<String>, ServiceError> {
        let api_key = self.api_key()?;
        let image = image_for_uri(image_uri).await?;
        let body = AnnotateRequest::labels(image, self.max_results);
        let labels = with_retry(SERVICE, self.policy, || self.annotate(api_key, &body)).await?;
        tracing::debug!("Detected {} labels for {image_uri}: {labels:?}", labels.len());
        Ok(labels)
    }
}

/// Reference remote images by URI; inline local files.
async fn image_for_uri(image_uri: &str) -> Result<Image, ServiceError> {
    let Some(path) = image_uri.strip_prefix("file://") else {
        return Ok(Image {
            source: Some(ImageSource {
                image_uri: image_uri.to_string(),
            }),
            content: None,
        });
    };

    let bytes = tokio::fs::read(path)
        .await
        .map_err(|e| ServiceError::Request {
            service: SERVICE,
            message: format!("Cannot read {path}: {e}"),
            status_code: None,
        })?;
    Ok(Image {
        source: None,
        content: Some(base64::engine::general_purpose::STANDARD.encode(bytes)),
    })
}

// --- Request types ---

#[derive(Debug, Serialize)]
struct AnnotateRequest {
    requests: Vec<AnnotateImageRequest>,
}

impl AnnotateRequest {
    fn labels(image: Image, max_results: u32) -> Self {
        Self {
            requests: vec![AnnotateImageRequest {
                image,
                features: vec![Feature {
                    feature_type: "LABEL_DETECTION",
                    max_results,
                }],
            }],
        }
    }
}

#[derive(Debug, Serialize)]
struct AnnotateImageRequest {
    image: Image,
    features: Vec<Feature>,
}

#[derive(Debug, Serialize)]
struct Image {
    #[serde(skip_serializing_if = "Option::is_none")]
    source: Option<ImageSource>,
    #[serde(skip_serializing_if = "Option::is_none")]
    content: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ImageSource {
    image_uri: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Feature {
    #[serde(rename = "type")]
    feature_type: &'static str,
    max_results: u32,
}

// --- Response types ---

#[derive(Debug, Deserialize)]
struct AnnotateResponse {
    #[serde(default)]
    responses: Vec<AnnotateImageResponse>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AnnotateImageResponse {
    #[serde(default)]
    label_annotations: Vec<EntityAnnotation>,
    error: Option<Status>,
}

#[derive(Debug, Deserialize)]
struct EntityAnnotation {
    description: String,
}

#[derive(Debug, Deserialize)]
struct Status {
    #[serde(default)]
    code: i32,
    #[serde(default)]
    message: String,
}

impl AnnotateResponse {
    /// Labels of the single image response, in service order.
    fn into_labels(self) -> Result<Vec<String>, ServiceError> {
        let response = self
            .responses
            .into_iter()
            .next()
            .ok_or_else(|| ServiceError::InvalidResponse {
                service: SERVICE,
                message: "empty responses array".to_string(),
            })?;

        if let Some(status) = response.error {
            return Err(ServiceError::Request {
                service: SERVICE,
                message: format!("annotation error {}: {}", status.code, status.message),
                status_code: None,
            });
        }

        Ok(response
            .label_annotations
            .into_iter()
            .map(|a| a.description)
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_remote_uri_sent_by_reference() {
        let image = image_for_uri("https://storage.googleapis.com/photos/dog.jpg")
            .await
            .unwrap();
        let json = serde_json::to_value(AnnotateRequest::labels(image, 5)).unwrap();

        let request = &json["requests"][0];
        assert_eq!(
            request["image"]["source"]["imageUri"],
            "https://storage.googleapis.com/photos/dog.jpg"
        );
        assert!(request["image"].get("content").is_none());
        assert_eq!(request["features"][0]["type"], "LABEL_DETECTION");
        assert_eq!(request["features"][0]["maxResults"], 5);
    }

    #[tokio::test]
    async fn test_local_file_sent_inline() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cat.png");
        std::fs::write(&path, [1u8, 2, 3]).unwrap();

        let image = image_for_uri(&format!("file://{}", path.display()))
            .await
            .unwrap();
        assert!(image.source.is_none());
        assert_eq!(image.content.as_deref(), Some("AQID"));
    }

    #[tokio::test]
    async fn test_missing_local_file_is_error() {
        let result = image_for_uri("file:///definitely/not/here.jpg").await;
        assert!(matches!(result, Err(ServiceError::Request { .. })));
    }

    #[test]
    fn test_parse_labels_in_order() {
        let json = r#"{"responses":[{"labelAnnotations":[
            {"mid":"/m/0bt9lr","description":"Dog","score":0.98,"topicality":0.98},
            {"mid":"/m/01z5f","description":"Golden retriever","score":0.91},
            {"mid":"/m/08t9c_","description":"Grass","score":0.80}
        ]}]}"#;
        let parsed: AnnotateResponse = serde_json::from_str(json).unwrap();
        assert_eq!(
            parsed.into_labels().unwrap(),
            vec!["Dog", "Golden retriever", "Grass"]
        );
    }

    #[test]
    fn test_parse_no_labels() {
        let parsed: AnnotateResponse = serde_json::from_str(r#"{"responses":[{}]}"#).unwrap();
        assert!(parsed.into_labels().unwrap().is_empty());
    }

    #[test]
    fn test_parse_per_image_error() {
        let json = r#"{"responses":[{"error":{"code":7,"message":"permission denied"}}]}"#;
        let parsed: AnnotateResponse = serde_json::from_str(json).unwrap();
        let err = parsed.into_labels().unwrap_err();
        assert!(err.to_string().contains("permission denied"));
    }

    #[test]
    fn test_parse_empty_responses() {
        let parsed: AnnotateResponse = serde_json::from_str(r#"{"responses":[]}"#).unwrap();
        assert!(matches!(
            parsed.into_labels(),
            Err(ServiceError::InvalidResponse { .. })
        ));
    }

    #[tokio::test]
    async fn test_missing_key_fails_without_retry() {
        let config = VisionConfig {
            api_key: "${DEFINITELY_NOT_SET_VISION_KEY_123}".to_string(),
            ..Default::default()
        };
        let detector = CloudVisionDetector::from_config(&config);
        let err = detector
            .detect_labels("https://example.com/dog.jpg")
            .await
            .unwrap_err();
        assert!(err.to_string().contains("GOOGLE_VISION_API_KEY"));
        assert!(!crate::retry::is_retryable(&err));
    }

    #[test]
    fn test_from_config_resolves_key() {
        let config = VisionConfig {
            api_key: "test-key".to_string(),
            ..Default::default()
        };
        let detector = CloudVisionDetector::from_config(&config);
        assert_eq!(detector.api_key().unwrap(), "test-key");
        assert_eq!(detector.name(), "cloud-vision");
    }
}
