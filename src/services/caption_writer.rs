//! Caption generation and collection over content records
//!
//! `generate_for_suggested` walks every content record waiting in
//! "Suggest Captions" status, produces a caption from the image plus the
//! client's prompt material, appends it to the record and advances the
//! status. `collect_ready` gathers the finished records of a client's
//! current cycle into a short report.
//!
//! Per-record failures are logged and skipped; one broken record never
//! stops the batch.

use std::sync::Arc;

use serde::Serialize;
use serde_json::{json, Value};

use crate::error::{Error, Result};
use crate::models::Client;
use crate::services::drive_client::{self, FileStore};
use crate::services::gemini_client::CaptionModel;
use crate::services::notion_client::{self, DocumentService};
use crate::services::vision_client::ImageAnnotator;

/// Outcome of one caption generation run
#[derive(Debug, Default, Serialize)]
pub struct CaptionSummary {
    pub pages_processed: usize,
    pub pages_skipped: usize,
}

pub struct CaptionWriter {
    docs: Arc<dyn DocumentService>,
    store: Arc<dyn FileStore>,
    annotator: Arc<dyn ImageAnnotator>,
    model: Arc<dyn CaptionModel>,
    content_db_id: String,
}

impl CaptionWriter {
    pub fn new(
        docs: Arc<dyn DocumentService>,
        store: Arc<dyn FileStore>,
        annotator: Arc<dyn ImageAnnotator>,
        model: Arc<dyn CaptionModel>,
        content_db_id: String,
    ) -> Self {
        Self {
            docs,
            store,
            annotator,
            model,
            content_db_id,
        }
    }

    /// Generate captions for every record in "Suggest Captions" status.
    pub async fn generate_for_suggested(&self) -> Result<CaptionSummary> {
        let filter = json!({
            "property": "Status",
            "status": { "equals": "Suggest Captions" },
        });
        let pages = self.docs.query(&self.content_db_id, filter).await?;

        let mut summary = CaptionSummary::default();
        for page in &pages {
            let Some(page_id) = page.get("id").and_then(Value::as_str) else {
                summary.pages_skipped += 1;
                continue;
            };
            match self.caption_page(page_id, page).await {
                Ok(()) => summary.pages_processed += 1,
                Err(e) => {
                    tracing::warn!(page_id = %page_id, error = %e, "Skipping page");
                    summary.pages_skipped += 1;
                }
            }
        }

        tracing::info!(
            processed = summary.pages_processed,
            skipped = summary.pages_skipped,
            "Caption generation complete"
        );
        Ok(summary)
    }

    async fn caption_page(&self, page_id: &str, page: &Value) -> Result<()> {
        let props = page.get("properties").cloned().unwrap_or(json!({}));

        let image_description = props
            .get("Image Description")
            .map(notion_client::plain_text)
            .filter(|s| !s.is_empty());

        let file_url = props
            .pointer("/File Link/url")
            .and_then(Value::as_str)
            .ok_or_else(|| Error::ConfigMissing("record has no file link".to_string()))?;
        let file_id = drive_client::extract_file_id(file_url)
            .ok_or_else(|| Error::Parse(format!("cannot extract file id from {}", file_url)))?;

        let record_relation = props
            .pointer("/Cadence Record/relation/0/id")
            .and_then(Value::as_str)
            .ok_or_else(|| Error::ConfigMissing("record has no cadence relation".to_string()))?;
        let (prompt, hashtags) = self.fetch_prompt_material(record_relation).await?;

        let image = self.store.download(&file_id).await?;
        if image.is_empty() {
            return Err(Error::Transport(format!("file {} is empty", file_id)));
        }

        let labels = self.annotator.labels(&image).await?;
        let caption = self
            .model
            .generate(&labels, &prompt, &hashtags, image_description.as_deref())
            .await?;

        self.docs
            .append_blocks(
                page_id,
                vec![json!({
                    "object": "block",
                    "type": "paragraph",
                    "paragraph": {
                        "rich_text": [{ "type": "text", "text": { "content": caption } }]
                    },
                })],
            )
            .await?;
        self.docs
            .update_page(
                page_id,
                json!({ "Status": { "status": { "name": "Caption Generated" } } }),
            )
            .await?;

        tracing::info!(page_id = %page_id, "Caption appended and status advanced");
        Ok(())
    }

    /// Prompt text (paragraph blocks) and hashtags from the cadence record
    async fn fetch_prompt_material(&self, record_id: &str) -> Result<(String, Vec<String>)> {
        let props = self.docs.get_properties(record_id).await?;
        let hashtags: Vec<String> = props
            .get("Hashtags")
            .map(notion_client::plain_text)
            .unwrap_or_default()
            .split_whitespace()
            .map(str::to_string)
            .collect();

        let blocks = self.docs.list_blocks(record_id).await?;
        let mut prompt = String::new();
        for block in &blocks {
            if block.get("type").and_then(Value::as_str) == Some("paragraph") {
                if let Some(text) = block
                    .pointer("/paragraph/rich_text/0/text/content")
                    .and_then(Value::as_str)
                {
                    prompt.push_str(text);
                    prompt.push('\n');
                }
            }
        }

        Ok((prompt.trim().to_string(), hashtags))
    }

    /// Collect the finished ("Caption Generated") records of the client's
    /// current cycle as `- (N)` bullet lines, warning about gaps in the
    /// post numbering.
    pub async fn collect_ready(&self, client: &Client) -> Result<String> {
        let record_id = client.cadence_record_id.as_deref().ok_or_else(|| {
            Error::ConfigMissing(format!(
                "Client {} has no cadence record configured",
                client.label()
            ))
        })?;

        let props = self.docs.get_properties(record_id).await?;
        let cycle_id = props
            .get("Cycle ID")
            .and_then(notion_client::cycle_identifier)
            .ok_or_else(|| {
                Error::ConfigMissing(format!(
                    "No cycle identifier on cadence record for {}",
                    client.label()
                ))
            })?;
        let prefix = format!("{} ", cycle_id);

        let filter = json!({
            "and": [
                { "property": "Status", "status": { "equals": "Caption Generated" } },
                { "property": "Identifier", "title": { "starts_with": prefix } },
            ]
        });
        let pages = self.docs.query(&self.content_db_id, filter).await?;

        let mut numbers: Vec<u64> = Vec::new();
        for page in &pages {
            let identifier = page
                .pointer("/properties/Identifier")
                .map(notion_client::plain_text)
                .unwrap_or_default();
            let Some(rest) = identifier.strip_prefix(&prefix) else {
                continue;
            };
            // The base name starts with the post number ("3-..."), take
            // its leading digits
            let digits: String = rest
                .trim()
                .chars()
                .take_while(char::is_ascii_digit)
                .collect();
            match digits.parse::<u64>() {
                Ok(n) => numbers.push(n),
                Err(_) => {
                    tracing::warn!(identifier = %identifier, "Could not parse post number");
                }
            }
        }

        if numbers.is_empty() {
            return Ok(String::new());
        }
        numbers.sort_unstable();

        let mut lines = Vec::new();
        let (min, max) = (numbers[0], numbers[numbers.len() - 1]);
        for expected in min..=max {
            if numbers.binary_search(&expected).is_ok() {
                lines.push(format!("- ({})", expected));
            } else {
                tracing::warn!(
                    cycle = %cycle_id,
                    missing = expected,
                    "Missing post in cycle report"
                );
            }
        }

        Ok(lines.join("\n"))
    }
}
