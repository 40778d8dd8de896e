//! Client model: identity plus registered external resource ids
//!
//! A client owns a map of logical resource keys (e.g. "next_post",
//! "photos") to provider resource references. Absence of a key means
//! "not configured" and is never an error.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Which external provider a resource id belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ServiceKind {
    #[serde(rename = "google_drive")]
    Drive,
    #[serde(rename = "notion")]
    Notion,
}

impl ServiceKind {
    /// Parse the wire name used in registration payloads
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "google_drive" => Some(ServiceKind::Drive),
            "notion" => Some(ServiceKind::Notion),
            _ => None,
        }
    }
}

/// One registered resource reference
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceEntry {
    /// Provider-side id (folder id, page id)
    pub id: String,
    /// Operator-facing description
    #[serde(default)]
    pub description: String,
    /// Source URL the id was extracted from
    #[serde(default)]
    pub url: String,
}

/// A managed client and its resource registrations
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Client {
    #[serde(skip)]
    pub id: Uuid,
    #[serde(default)]
    pub tag: String,
    pub display_name: String,
    /// Page id of the client's cadence record in the document service
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cadence_record_id: Option<String>,
    /// service -> resource key -> reference
    #[serde(default)]
    pub resources: HashMap<ServiceKind, HashMap<String, ResourceEntry>>,
}

impl Client {
    pub fn new(id: Uuid, tag: String, display_name: String) -> Self {
        Self {
            id,
            tag,
            display_name,
            cadence_record_id: None,
            resources: HashMap::new(),
        }
    }

    /// Register a resource id under a logical key. Replaces any previous
    /// entry for the same key (resource keys are unique per client).
    pub fn add_resource(
        &mut self,
        service: ServiceKind,
        key: &str,
        id: String,
        description: String,
        url: String,
    ) {
        self.resources.entry(service).or_default().insert(
            key.to_string(),
            ResourceEntry {
                id,
                description,
                url,
            },
        );
    }

    /// Look up a resource id; `None` means the key is not configured.
    pub fn resource_id(&self, service: ServiceKind, key: &str) -> Option<&str> {
        self.resources
            .get(&service)
            .and_then(|m| m.get(key))
            .map(|e| e.id.as_str())
    }

    /// Drive folder id for a logical key
    pub fn drive_id(&self, key: &str) -> Option<&str> {
        self.resource_id(ServiceKind::Drive, key)
    }

    /// Human-readable label for logs and task bodies
    pub fn label(&self) -> &str {
        if self.tag.is_empty() {
            &self.display_name
        } else {
            &self.tag
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resource_keys_are_unique_per_client() {
        let mut client = Client::new(Uuid::new_v4(), "acme".into(), "Acme Co".into());
        client.add_resource(
            ServiceKind::Drive,
            "next_post",
            "folder-1".into(),
            "".into(),
            "".into(),
        );
        client.add_resource(
            ServiceKind::Drive,
            "next_post",
            "folder-2".into(),
            "".into(),
            "".into(),
        );

        assert_eq!(client.drive_id("next_post"), Some("folder-2"));
    }

    #[test]
    fn missing_key_is_none_not_error() {
        let client = Client::new(Uuid::new_v4(), "acme".into(), "Acme Co".into());
        assert_eq!(client.drive_id("photos"), None);
        assert_eq!(client.resource_id(ServiceKind::Notion, "anything"), None);
    }

    #[test]
    fn label_falls_back_to_display_name() {
        let client = Client::new(Uuid::new_v4(), "".into(), "Acme Co".into());
        assert_eq!(client.label(), "Acme Co");
    }
}
