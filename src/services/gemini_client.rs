//! Caption text generation interface and its Gemini implementation

use async_trait::async_trait;
use serde_json::{json, Value};

use crate::error::{Error, Result};
use crate::services::http::{check_status, send_with_backoff};

const GEMINI_URL: &str =
    "https://generativelanguage.googleapis.com/v1beta/models/gemini-2.0-flash:generateContent";

/// Generates caption strings from image labels and client prompt material
#[async_trait]
pub trait CaptionModel: Send + Sync {
    async fn generate(
        &self,
        labels: &[String],
        prompt: &str,
        hashtags: &[String],
        image_description: Option<&str>,
    ) -> Result<String>;
}

/// Gemini generateContent client
pub struct GeminiClient {
    http: reqwest::Client,
    api_key: String,
}

impl GeminiClient {
    pub fn new(http: reqwest::Client, api_key: String) -> Self {
        Self { http, api_key }
    }
}

/// Assemble the generation prompt. The image description, when present,
/// outranks the detected labels.
pub fn build_prompt(
    labels: &[String],
    prompt: &str,
    hashtags: &[String],
    image_description: Option<&str>,
) -> String {
    let description_part = match image_description {
        Some(desc) if !desc.trim().is_empty() => format!(
            " The image is described as: '{}'. Give this description high importance in the caption.",
            desc.trim()
        ),
        _ => String::new(),
    };

    format!(
        "Generate a social media caption based on the following prompt: '{}'.{} \
         The image has these labels: {}. Include these hashtags: {}. \
         Keep the caption under 50 words.",
        prompt.trim(),
        description_part,
        labels.join(", "),
        hashtags.join(", ")
    )
}

#[async_trait]
impl CaptionModel for GeminiClient {
    async fn generate(
        &self,
        labels: &[String],
        prompt: &str,
        hashtags: &[String],
        image_description: Option<&str>,
    ) -> Result<String> {
        let input_text = build_prompt(labels, prompt, hashtags, image_description);
        let payload = json!({
            "contents": [{ "parts": [{ "text": input_text }] }]
        });

        let request = self
            .http
            .post(GEMINI_URL)
            .query(&[("key", self.api_key.as_str())])
            .json(&payload);

        let response = check_status(send_with_backoff(request).await?, "generate caption").await?;
        let body: Value = response
            .json()
            .await
            .map_err(|e| Error::Parse(e.to_string()))?;

        body.pointer("/candidates/0/content/parts/0/text")
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| Error::Parse("caption response has no candidates".to_string()))
    }
}
