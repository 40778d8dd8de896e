//! Publish orchestration
//!
//! Turns the current "next post" folder listing into Draft content records:
//! relocates correlated staging files, makes main assets public, and creates
//! one record per valid post group with embedded references for every asset.
//!
//! Per group the implicit lifecycle is
//! `Listed -> Parsed -> (Grouped | Rejected-missing-main) -> Published | Publish-failed`.
//! A failed group is logged and skipped; it never aborts the batch, and no
//! retry state is kept across runs.

use std::sync::Arc;

use serde::Serialize;
use serde_json::json;

use crate::error::{Error, Result};
use crate::models::Client;
use crate::services::drive_client::{self, FileStore, RawFile};
use crate::services::filename_parser;
use crate::services::notion_client::{self, DocumentService};
use crate::services::sequence_grouper::{self, PostGroup};

/// Outcome of one publish run
#[derive(Debug, Default, Serialize)]
pub struct PublishSummary {
    pub groups_published: usize,
    pub groups_failed: usize,
    pub files_moved: usize,
    pub warnings: Vec<String>,
}

pub struct PostPublisher {
    store: Arc<dyn FileStore>,
    docs: Arc<dyn DocumentService>,
    content_db_id: String,
}

impl PostPublisher {
    pub fn new(
        store: Arc<dyn FileStore>,
        docs: Arc<dyn DocumentService>,
        content_db_id: String,
    ) -> Self {
        Self {
            store,
            docs,
            content_db_id,
        }
    }

    /// Run a publish pass for one client.
    pub async fn publish(&self, client: &Client) -> Result<PublishSummary> {
        let next_post_id = client.drive_id("next_post").ok_or_else(|| {
            Error::ConfigMissing(format!(
                "Client {} has no next_post folder configured",
                client.label()
            ))
        })?;

        let files = self.store.list_folder(next_post_id).await?;
        if files.is_empty() {
            tracing::info!(client = %client.label(), "Next post folder is empty, nothing to do");
            return Ok(PublishSummary::default());
        }

        let mut summary = PublishSummary::default();

        summary.files_moved = self.relocate_matching(client, &files).await;

        let (groups, warnings) = sequence_grouper::build_groups(&files);
        summary.warnings = warnings.iter().map(|w| w.to_string()).collect();

        // Fetched once per run; prefixes every record identifier
        let cycle_id = self.fetch_cycle_identifier(client).await;

        for group in &groups {
            match self.publish_group(client, group, cycle_id.as_deref()).await {
                Ok(()) => summary.groups_published += 1,
                Err(e) => {
                    tracing::error!(
                        client = %client.label(),
                        group = group.number,
                        error = %e,
                        "Failed to publish group"
                    );
                    summary.groups_failed += 1;
                }
            }
        }

        tracing::info!(
            client = %client.label(),
            published = summary.groups_published,
            failed = summary.groups_failed,
            moved = summary.files_moved,
            warnings = summary.warnings.len(),
            "Publish run complete"
        );
        Ok(summary)
    }

    /// Move staging files whose base name equals a listed file's match key
    /// from the pending folder to the scheduling folder. A missing match or
    /// an unconfigured folder pair is logged, never fatal.
    async fn relocate_matching(&self, client: &Client, files: &[RawFile]) -> usize {
        let (Some(pending_id), Some(scheduling_id)) =
            (client.drive_id("pending"), client.drive_id("scheduling"))
        else {
            tracing::info!(
                client = %client.label(),
                "Pending/scheduling folders not configured, skipping relocation"
            );
            return 0;
        };

        let pending_files = match self.store.list_folder(pending_id).await {
            Ok(files) => files,
            Err(e) => {
                tracing::warn!(
                    client = %client.label(),
                    error = %e,
                    "Could not list pending folder, skipping relocation"
                );
                return 0;
            }
        };

        let mut moved = 0;
        for file in files {
            let Some(parsed) = filename_parser::parse(&file.name) else {
                continue;
            };
            if parsed.match_key.is_empty() {
                continue;
            }

            let matches: Vec<&RawFile> = pending_files
                .iter()
                .filter(|f| f.base_name() == parsed.match_key)
                .collect();
            if matches.is_empty() {
                tracing::info!(
                    match_key = %parsed.match_key,
                    "No pending file matches, nothing to relocate"
                );
                continue;
            }

            for candidate in matches {
                match self
                    .store
                    .move_file(&candidate.id, pending_id, scheduling_id)
                    .await
                {
                    Ok(()) => moved += 1,
                    Err(e) => {
                        tracing::warn!(
                            name = %candidate.name,
                            error = %e,
                            "Could not relocate pending file"
                        );
                    }
                }
            }
        }
        moved
    }

    /// Current cycle identifier from the client's cadence record, if any
    async fn fetch_cycle_identifier(&self, client: &Client) -> Option<String> {
        let record_id = client.cadence_record_id.as_deref()?;
        match self.docs.get_properties(record_id).await {
            Ok(props) => props.get("Cycle ID").and_then(notion_client::cycle_identifier),
            Err(e) => {
                tracing::warn!(
                    client = %client.label(),
                    error = %e,
                    "Could not fetch cycle identifier, using bare file names"
                );
                None
            }
        }
    }

    /// Publish one validated group: public main asset, Draft record,
    /// embedded references for every asset (main first).
    async fn publish_group(
        &self,
        client: &Client,
        group: &PostGroup,
        cycle_id: Option<&str>,
    ) -> Result<()> {
        self.store.make_public(&group.main.id).await?;

        let base_name = group.main.base_name();
        let identifier = match cycle_id {
            Some(cycle) => format!("{} {}", cycle, base_name),
            None => base_name.to_string(),
        };

        let mut properties = json!({
            "Identifier": { "title": [{ "text": { "content": identifier } }] },
            "File Link": { "url": drive_client::file_view_url(&group.main.id) },
            "Status": { "status": { "name": "Draft" } },
        });
        if let Some(client_page) = client.resource_id(crate::models::ServiceKind::Notion, "client_page")
        {
            properties["Client"] = json!({ "relation": [{ "id": client_page }] });
        }
        if let Some(record_id) = client.cadence_record_id.as_deref() {
            properties["Cadence Record"] = json!({ "relation": [{ "id": record_id }] });
        }

        let page_id = self.docs.create_page(&self.content_db_id, properties).await?;

        let children: Vec<_> = group
            .all_assets()
            .map(|asset| {
                json!({
                    "object": "block",
                    "type": "embed",
                    "embed": { "url": drive_client::file_preview_url(&asset.id) },
                })
            })
            .collect();
        self.docs.append_blocks(&page_id, children).await?;

        tracing::info!(
            client = %client.label(),
            group = group.number,
            identifier = %identifier,
            assets = group.secondaries.len() + 1,
            "Published post group"
        );
        Ok(())
    }
}
