//! Remote file store interface and its Google Drive implementation

use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::services::http::{check_status, send_with_backoff};

const DRIVE_BASE_URL: &str = "https://www.googleapis.com/drive/v3";
const FOLDER_MIME: &str = "application/vnd.google-apps.folder";

static FOLDER_URL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"/folders/([a-zA-Z0-9_-]+)").expect("valid pattern"));

/// File metadata as returned by the store. Immutable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawFile {
    pub id: String,
    pub name: String,
    #[serde(rename = "mimeType", default)]
    pub mime_type: String,
    #[serde(default)]
    pub parents: Vec<String>,
    #[serde(rename = "createdTime", default)]
    pub created_time: Option<String>,
}

impl RawFile {
    /// Name without its final extension
    pub fn base_name(&self) -> &str {
        match self.name.rfind('.') {
            Some(idx) => &self.name[..idx],
            None => &self.name,
        }
    }
}

/// Remote hierarchical file store
#[async_trait]
pub trait FileStore: Send + Sync {
    /// List non-trashed, non-folder files directly inside a folder
    async fn list_folder(&self, folder_id: &str) -> Result<Vec<RawFile>>;

    /// Move a file between folders (add one parent, remove the other)
    async fn move_file(&self, file_id: &str, from_folder: &str, to_folder: &str) -> Result<()>;

    /// Grant anyone-with-the-link read access
    async fn make_public(&self, file_id: &str) -> Result<()>;

    /// Copy a file into a destination folder under a new name; returns the
    /// new file id
    async fn copy_file(&self, file_id: &str, new_name: &str, dest_folder: &str)
        -> Result<String>;

    /// Download file content
    async fn download(&self, file_id: &str) -> Result<Vec<u8>>;
}

/// Extract the folder id from a Drive share URL
pub fn extract_folder_id(url: &str) -> Result<String> {
    FOLDER_URL_RE
        .captures(url)
        .map(|caps| caps[1].to_string())
        .ok_or_else(|| Error::InvalidInput(format!("Invalid Drive folder URL: {}", url)))
}

/// Public view URL for a stored file
pub fn file_view_url(file_id: &str) -> String {
    format!("https://drive.google.com/file/d/{}/view?usp=drive_web", file_id)
}

/// Embeddable preview URL for a stored file
pub fn file_preview_url(file_id: &str) -> String {
    format!("https://drive.google.com/file/d/{}/preview", file_id)
}

/// Extract the file id from a stored view URL
pub fn extract_file_id(url: &str) -> Option<String> {
    let rest = url.split("/d/").nth(1)?;
    let id = rest.split('/').next()?;
    if id.is_empty() {
        None
    } else {
        Some(id.to_string())
    }
}

#[derive(Debug, Deserialize)]
struct FileListResponse {
    #[serde(default)]
    files: Vec<RawFile>,
}

/// Google Drive REST v3 client
pub struct DriveClient {
    http: reqwest::Client,
    token: String,
}

impl DriveClient {
    pub fn new(http: reqwest::Client, token: String) -> Self {
        Self { http, token }
    }

    fn authed(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        builder.bearer_auth(&self.token)
    }
}

#[async_trait]
impl FileStore for DriveClient {
    async fn list_folder(&self, folder_id: &str) -> Result<Vec<RawFile>> {
        let query = format!(
            "'{}' in parents and trashed = false and mimeType != '{}'",
            folder_id, FOLDER_MIME
        );
        let request = self.authed(self.http.get(format!("{}/files", DRIVE_BASE_URL))).query(&[
            ("q", query.as_str()),
            ("fields", "files(id, name, mimeType, parents, createdTime)"),
        ]);

        let response = check_status(send_with_backoff(request).await?, "list folder").await?;
        let listing: FileListResponse = response
            .json()
            .await
            .map_err(|e| Error::Parse(e.to_string()))?;

        tracing::debug!(folder_id = %folder_id, files = listing.files.len(), "Listed folder");
        Ok(listing.files)
    }

    async fn move_file(&self, file_id: &str, from_folder: &str, to_folder: &str) -> Result<()> {
        let request = self
            .authed(self.http.patch(format!("{}/files/{}", DRIVE_BASE_URL, file_id)))
            .query(&[
                ("addParents", to_folder),
                ("removeParents", from_folder),
                ("fields", "id, parents"),
            ])
            .json(&serde_json::json!({}));

        check_status(send_with_backoff(request).await?, "move file").await?;
        tracing::info!(file_id = %file_id, from = %from_folder, to = %to_folder, "Moved file");
        Ok(())
    }

    async fn make_public(&self, file_id: &str) -> Result<()> {
        let request = self
            .authed(
                self.http
                    .post(format!("{}/files/{}/permissions", DRIVE_BASE_URL, file_id)),
            )
            .query(&[("fields", "id")])
            .json(&serde_json::json!({ "role": "reader", "type": "anyone" }));

        check_status(send_with_backoff(request).await?, "make file public").await?;
        tracing::info!(file_id = %file_id, "Made file public");
        Ok(())
    }

    async fn copy_file(
        &self,
        file_id: &str,
        new_name: &str,
        dest_folder: &str,
    ) -> Result<String> {
        let request = self
            .authed(self.http.post(format!("{}/files/{}/copy", DRIVE_BASE_URL, file_id)))
            .json(&serde_json::json!({
                "name": new_name,
                "parents": [dest_folder],
            }));

        let response = check_status(send_with_backoff(request).await?, "copy file").await?;
        let copied: RawFile = response
            .json()
            .await
            .map_err(|e| Error::Parse(e.to_string()))?;
        Ok(copied.id)
    }

    async fn download(&self, file_id: &str) -> Result<Vec<u8>> {
        let request = self
            .authed(self.http.get(format!("{}/files/{}", DRIVE_BASE_URL, file_id)))
            .query(&[("alt", "media")]);

        let response = check_status(send_with_backoff(request).await?, "download file").await?;
        let bytes = response
            .bytes()
            .await
            .map_err(|e| Error::Transport(e.to_string()))?;
        Ok(bytes.to_vec())
    }
}
