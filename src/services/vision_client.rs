//! Image labeling interface and its Google Vision implementation

use async_trait::async_trait;
use base64::Engine;
use serde_json::{json, Value};

use crate::error::{Error, Result};
use crate::services::http::{check_status, send_with_backoff};

const VISION_URL: &str = "https://vision.googleapis.com/v1/images:annotate";

/// Labels image content for caption generation
#[async_trait]
pub trait ImageAnnotator: Send + Sync {
    /// Descriptive labels for the image, most confident first
    async fn labels(&self, image: &[u8]) -> Result<Vec<String>>;
}

/// Google Cloud Vision label detection client
pub struct VisionClient {
    http: reqwest::Client,
    api_key: String,
}

impl VisionClient {
    pub fn new(http: reqwest::Client, api_key: String) -> Self {
        Self { http, api_key }
    }
}

#[async_trait]
impl ImageAnnotator for VisionClient {
    async fn labels(&self, image: &[u8]) -> Result<Vec<String>> {
        let encoded = base64::engine::general_purpose::STANDARD.encode(image);
        let payload = json!({
            "requests": [{
                "image": { "content": encoded },
                "features": [{ "type": "LABEL_DETECTION" }],
            }]
        });

        let request = self
            .http
            .post(VISION_URL)
            .query(&[("key", self.api_key.as_str())])
            .json(&payload);

        let response = check_status(send_with_backoff(request).await?, "annotate image").await?;
        let body: Value = response
            .json()
            .await
            .map_err(|e| Error::Parse(e.to_string()))?;

        let labels: Vec<String> = body
            .pointer("/responses/0/labelAnnotations")
            .and_then(Value::as_array)
            .map(|annotations| {
                annotations
                    .iter()
                    .filter_map(|a| a.get("description").and_then(Value::as_str))
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();

        tracing::debug!(count = labels.len(), "Image labeled");
        Ok(labels)
    }
}
