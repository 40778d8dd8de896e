//! Ready content counting
//!
//! Counts the prepared assets of one content type sitting in a client's
//! staging folder. A file only counts when BOTH filters pass: its MIME type
//! starts with an allowed prefix AND its extension (case-insensitive) is in
//! the allowed set. Counting never fails: an unconfigured folder or a
//! transport error yields 0 so one client's outage cannot abort an audit.

use std::sync::Arc;

use crate::models::{Client, ContentType};
use crate::services::drive_client::{FileStore, RawFile};

pub struct ReadyContentCounter {
    store: Arc<dyn FileStore>,
}

impl ReadyContentCounter {
    pub fn new(store: Arc<dyn FileStore>) -> Self {
        Self { store }
    }

    /// Count ready assets of `content_type` for `client`.
    pub async fn count_ready(&self, client: &Client, content_type: ContentType) -> u32 {
        let Some(folder_id) = client.drive_id(content_type.folder_key()) else {
            tracing::info!(
                client = %client.label(),
                content_type = content_type.label(),
                "Folder not configured, counting as 0"
            );
            return 0;
        };

        let files = match self.store.list_folder(folder_id).await {
            Ok(files) => files,
            Err(e) => {
                tracing::warn!(
                    client = %client.label(),
                    folder_id = %folder_id,
                    error = %e,
                    "Could not list staging folder, counting as 0"
                );
                return 0;
            }
        };

        files
            .iter()
            .filter(|f| matches_filters(f, content_type))
            .count() as u32
    }
}

fn matches_filters(file: &RawFile, content_type: ContentType) -> bool {
    let mime_ok = content_type
        .mime_prefixes()
        .iter()
        .any(|prefix| file.mime_type.starts_with(prefix));

    let name_lower = file.name.to_lowercase();
    let ext_ok = content_type
        .extensions()
        .iter()
        .any(|ext| name_lower.ends_with(ext));

    mime_ok && ext_ok
}
