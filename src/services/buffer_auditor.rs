//! Buffer audit orchestration
//!
//! For every client with a cadence configuration, decides per content type
//! whether enough ready content exists for the upcoming week and opens a
//! tracker task for each shortfall. The task identifier encodes
//! `(cycle, week, client, content type)`, and an existence check on that
//! identifier makes the audit idempotent: running it daily creates at most
//! one task per shortfall per week.

use std::sync::Arc;

use chrono::NaiveDate;
use serde::Serialize;

use crate::models::{CadenceConfig, Client, ClientRegistry, ContentType};
use crate::services::cycle_clock::{self, CyclePosition};
use crate::services::notion_client::{self, DocumentService};
use crate::services::ready_counter::ReadyContentCounter;
use crate::services::todoist_client::TaskTracker;

/// Outcome of one audit run
#[derive(Debug, Default, Serialize)]
pub struct AuditSummary {
    pub clients_audited: usize,
    pub clients_skipped: usize,
    pub tasks_created: usize,
    pub shortfalls_already_tracked: usize,
}

pub struct BufferAuditor {
    docs: Arc<dyn DocumentService>,
    tracker: Arc<dyn TaskTracker>,
    counter: ReadyContentCounter,
}

impl BufferAuditor {
    pub fn new(
        docs: Arc<dyn DocumentService>,
        tracker: Arc<dyn TaskTracker>,
        counter: ReadyContentCounter,
    ) -> Self {
        Self {
            docs,
            tracker,
            counter,
        }
    }

    /// Audit every registered client as of `today`.
    pub async fn run(&self, registry: &ClientRegistry, today: NaiveDate) -> AuditSummary {
        let mut summary = AuditSummary::default();

        for client in registry.iter() {
            match self.audit_client(client, today).await {
                Some((created, tracked)) => {
                    summary.clients_audited += 1;
                    summary.tasks_created += created;
                    summary.shortfalls_already_tracked += tracked;
                }
                None => summary.clients_skipped += 1,
            }
        }

        tracing::info!(
            audited = summary.clients_audited,
            skipped = summary.clients_skipped,
            tasks_created = summary.tasks_created,
            "Buffer audit complete"
        );
        summary
    }

    /// Audit one client. Returns `None` when the client has no usable
    /// cadence configuration (skipped, not an error).
    async fn audit_client(&self, client: &Client, today: NaiveDate) -> Option<(usize, usize)> {
        let Some(record_id) = client.cadence_record_id.as_deref() else {
            tracing::info!(client = %client.label(), "No cadence record configured, skipping");
            return None;
        };

        let config = match self.fetch_cadence_config(record_id).await {
            Some(config) => config,
            None => {
                tracing::warn!(
                    client = %client.label(),
                    record_id = %record_id,
                    "Cadence record has no cycle start date, skipping"
                );
                return None;
            }
        };

        let position = cycle_clock::compute_cycle(today, config.cycle_start);
        tracing::debug!(
            client = %client.label(),
            cycle = position.cycle_number,
            week = position.week_in_cycle,
            deadline = %position.buffer_deadline,
            "Computed cycle position"
        );

        let mut created = 0;
        let mut tracked = 0;
        for content_type in ContentType::ALL {
            let target = cycle_clock::week_target(
                config.target_for(content_type),
                position.week_in_cycle,
            );
            if target == 0 {
                continue;
            }

            let ready = self.counter.count_ready(client, content_type).await;
            if ready >= target {
                continue;
            }

            match self
                .open_shortfall_task(client, content_type, position, target, ready)
                .await
            {
                Ok(true) => created += 1,
                Ok(false) => tracked += 1,
                Err(e) => {
                    tracing::warn!(
                        client = %client.label(),
                        content_type = content_type.label(),
                        error = %e,
                        "Could not record shortfall task"
                    );
                }
            }
        }

        Some((created, tracked))
    }

    /// Read cycle start and per-type totals from the cadence record.
    /// Missing cycle start means "not configured".
    async fn fetch_cadence_config(&self, record_id: &str) -> Option<CadenceConfig> {
        let props = match self.docs.get_properties(record_id).await {
            Ok(props) => props,
            Err(e) => {
                tracing::warn!(record_id = %record_id, error = %e, "Could not fetch cadence record");
                return None;
            }
        };

        let cycle_start = notion_client::date_start(props.get("Cycle Start Date")?)?;

        let target = |content_type: ContentType| -> u32 {
            props
                .get(content_type.target_property())
                .and_then(notion_client::number)
                .map(|n| n.max(0.0) as u32)
                .unwrap_or(0)
        };

        Some(CadenceConfig {
            cycle_start,
            photo_posts: target(ContentType::Photo),
            short_videos: target(ContentType::ShortVideo),
            long_videos: target(ContentType::LongVideo),
        })
    }

    /// Create the shortfall task unless one with the same identifier is
    /// already open. Returns whether a new task was created.
    async fn open_shortfall_task(
        &self,
        client: &Client,
        content_type: ContentType,
        position: CyclePosition,
        target: u32,
        ready: u32,
    ) -> crate::error::Result<bool> {
        let identifier = shortfall_identifier(position, client, content_type);

        if self.tracker.task_exists(&identifier).await? {
            tracing::debug!(identifier = %identifier, "Shortfall already tracked");
            return Ok(false);
        }

        let content = format!(
            "{} Prepare {} for {}: need {}, have {} ready",
            identifier,
            content_type.label(),
            client.display_name,
            target,
            ready
        );
        self.tracker
            .create_task(&content, position.buffer_deadline)
            .await?;

        tracing::info!(
            client = %client.label(),
            content_type = content_type.label(),
            target,
            ready,
            due = %position.buffer_deadline,
            "Opened shortfall task"
        );
        Ok(true)
    }
}

/// Deterministic identifier for one `(cycle, week, client, type)` shortfall
pub fn shortfall_identifier(
    position: CyclePosition,
    client: &Client,
    content_type: ContentType,
) -> String {
    format!(
        "[C{}-W{}/{}/{}]",
        position.cycle_number,
        position.week_in_cycle,
        client.label(),
        content_type.folder_key()
    )
}
