//! Document service interface and its Notion implementation
//!
//! Pages carry a polymorphic property map; the helpers at the bottom decode
//! the handful of property shapes the engine reads (plain text, dates,
//! numbers, and the cycle identifier which may arrive as rich_text, title,
//! number or formula).

use async_trait::async_trait;
use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{json, Value};

use crate::error::{Error, Result};
use crate::services::http::{check_status, send_with_backoff};

const NOTION_BASE_URL: &str = "https://api.notion.com/v1";
const NOTION_VERSION: &str = "2022-06-28";

static PAGE_ID_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"([a-f0-9]{32})$").expect("valid pattern"));

/// Document database service
#[async_trait]
pub trait DocumentService: Send + Sync {
    /// Property map of a page
    async fn get_properties(&self, page_id: &str) -> Result<Value>;

    /// Child blocks of a page
    async fn list_blocks(&self, page_id: &str) -> Result<Vec<Value>>;

    /// Query a database with a filter payload
    async fn query(&self, database_id: &str, filter: Value) -> Result<Vec<Value>>;

    /// Create a page in a database; returns the new page id
    async fn create_page(&self, database_id: &str, properties: Value) -> Result<String>;

    /// Append child blocks to a page
    async fn append_blocks(&self, page_id: &str, children: Vec<Value>) -> Result<()>;

    /// Update properties of an existing page
    async fn update_page(&self, page_id: &str, properties: Value) -> Result<()>;
}

/// Extract a page id from a share URL: strip query parameters and dashes,
/// then take the 32-hex suffix.
pub fn extract_page_id(url: &str) -> Result<String> {
    let without_query = url.split('?').next().unwrap_or(url);
    let normalized = without_query.replace('-', "");
    PAGE_ID_RE
        .captures(&normalized)
        .map(|caps| caps[1].to_string())
        .ok_or_else(|| Error::InvalidInput(format!("Invalid document URL: {}", url)))
}

/// Notion REST client
pub struct NotionClient {
    http: reqwest::Client,
    token: String,
}

impl NotionClient {
    pub fn new(http: reqwest::Client, token: String) -> Self {
        Self { http, token }
    }

    fn authed(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        builder
            .bearer_auth(&self.token)
            .header("Notion-Version", NOTION_VERSION)
    }
}

#[async_trait]
impl DocumentService for NotionClient {
    async fn get_properties(&self, page_id: &str) -> Result<Value> {
        let request = self.authed(self.http.get(format!("{}/pages/{}", NOTION_BASE_URL, page_id)));
        let response = check_status(send_with_backoff(request).await?, "retrieve page").await?;
        let page: Value = response
            .json()
            .await
            .map_err(|e| Error::Parse(e.to_string()))?;
        Ok(page.get("properties").cloned().unwrap_or(json!({})))
    }

    async fn list_blocks(&self, page_id: &str) -> Result<Vec<Value>> {
        let request = self.authed(
            self.http
                .get(format!("{}/blocks/{}/children", NOTION_BASE_URL, page_id)),
        );
        let response = check_status(send_with_backoff(request).await?, "list blocks").await?;
        let body: Value = response
            .json()
            .await
            .map_err(|e| Error::Parse(e.to_string()))?;
        Ok(body
            .get("results")
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default())
    }

    async fn query(&self, database_id: &str, filter: Value) -> Result<Vec<Value>> {
        let request = self
            .authed(
                self.http
                    .post(format!("{}/databases/{}/query", NOTION_BASE_URL, database_id)),
            )
            .json(&json!({ "filter": filter, "page_size": 100 }));

        let response = check_status(send_with_backoff(request).await?, "query database").await?;
        let body: Value = response
            .json()
            .await
            .map_err(|e| Error::Parse(e.to_string()))?;
        Ok(body
            .get("results")
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default())
    }

    async fn create_page(&self, database_id: &str, properties: Value) -> Result<String> {
        let request = self
            .authed(self.http.post(format!("{}/pages", NOTION_BASE_URL)))
            .json(&json!({
                "parent": { "database_id": database_id },
                "properties": properties,
            }));

        let response = check_status(send_with_backoff(request).await?, "create page").await?;
        let page: Value = response
            .json()
            .await
            .map_err(|e| Error::Parse(e.to_string()))?;
        page.get("id")
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| Error::Parse("create page response has no id".to_string()))
    }

    async fn append_blocks(&self, page_id: &str, children: Vec<Value>) -> Result<()> {
        let request = self
            .authed(
                self.http
                    .patch(format!("{}/blocks/{}/children", NOTION_BASE_URL, page_id)),
            )
            .json(&json!({ "children": children }));

        check_status(send_with_backoff(request).await?, "append blocks").await?;
        Ok(())
    }

    async fn update_page(&self, page_id: &str, properties: Value) -> Result<()> {
        let request = self
            .authed(self.http.patch(format!("{}/pages/{}", NOTION_BASE_URL, page_id)))
            .json(&json!({ "properties": properties }));

        check_status(send_with_backoff(request).await?, "update page").await?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Property decoding helpers
// ---------------------------------------------------------------------------

/// Concatenated plain text of a `title` or `rich_text` property
pub fn plain_text(prop: &Value) -> String {
    let texts = prop
        .get("title")
        .or_else(|| prop.get("rich_text"))
        .and_then(Value::as_array);
    match texts {
        Some(parts) => parts
            .iter()
            .filter_map(|t| t.get("plain_text").and_then(Value::as_str))
            .collect(),
        None => String::new(),
    }
}

/// Start date of a `date` property
pub fn date_start(prop: &Value) -> Option<NaiveDate> {
    let start = prop.get("date")?.get("start")?.as_str()?;
    // Date properties may carry a time component
    let date_part = start.split('T').next()?;
    NaiveDate::parse_from_str(date_part, "%Y-%m-%d").ok()
}

/// Value of a `number` property
pub fn number(prop: &Value) -> Option<f64> {
    prop.get("number")?.as_f64()
}

/// The cycle identifier property appears in the wild as rich_text, title,
/// number or formula; decode whichever shape arrives.
pub fn cycle_identifier(prop: &Value) -> Option<String> {
    match prop.get("type").and_then(Value::as_str)? {
        "rich_text" | "title" => {
            let text = plain_text(prop);
            if text.is_empty() {
                None
            } else {
                Some(text)
            }
        }
        "number" => number(prop).map(|n| {
            if n.fract() == 0.0 {
                format!("{}", n as i64)
            } else {
                n.to_string()
            }
        }),
        "formula" => prop
            .get("formula")?
            .get("string")?
            .as_str()
            .map(str::to_string),
        other => {
            tracing::warn!(property_type = %other, "Unhandled cycle identifier property type");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_page_id_from_dashed_url() {
        let id = extract_page_id(
            "https://www.notion.so/acme/Record-1e8add08-0748-80fa-a661-d372bdb63bce?pvs=4",
        )
        .unwrap();
        assert_eq!(id, "1e8add08074880faa661d372bdb63bce");
    }

    #[test]
    fn rejects_urls_without_hex_suffix() {
        assert!(extract_page_id("https://www.notion.so/acme/Overview").is_err());
    }

    #[test]
    fn plain_text_concatenates_fragments() {
        let prop = json!({
            "rich_text": [
                { "plain_text": "Cycle " },
                { "plain_text": "12" }
            ]
        });
        assert_eq!(plain_text(&prop), "Cycle 12");
        assert_eq!(plain_text(&json!({})), "");
    }

    #[test]
    fn date_start_handles_datetime_values() {
        let prop = json!({ "date": { "start": "2024-01-01T00:00:00.000Z" } });
        assert_eq!(
            date_start(&prop),
            Some(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap())
        );
        assert_eq!(date_start(&json!({ "date": null })), None);
    }

    #[test]
    fn cycle_identifier_decodes_each_shape() {
        let rich = json!({ "type": "rich_text", "rich_text": [{ "plain_text": "C3" }] });
        assert_eq!(cycle_identifier(&rich).as_deref(), Some("C3"));

        let title = json!({ "type": "title", "title": [{ "plain_text": "C4" }] });
        assert_eq!(cycle_identifier(&title).as_deref(), Some("C4"));

        let num = json!({ "type": "number", "number": 7 });
        assert_eq!(cycle_identifier(&num).as_deref(), Some("7"));

        let formula = json!({ "type": "formula", "formula": { "string": "C5" } });
        assert_eq!(cycle_identifier(&formula).as_deref(), Some("C5"));

        let unknown = json!({ "type": "select", "select": { "name": "x" } });
        assert_eq!(cycle_identifier(&unknown), None);
    }
}
