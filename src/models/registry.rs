//! Client registry persisted as a single JSON snapshot file
//!
//! Contract: load once at startup, mutate in memory, flush after each
//! mutation. The flush rewrites the whole file; if another process writes
//! concurrently, last writer wins on the full snapshot.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use uuid::Uuid;

use crate::error::{Error, Result};
use crate::models::client::Client;

/// In-memory view of the registry file
#[derive(Debug)]
pub struct ClientRegistry {
    path: PathBuf,
    clients: HashMap<Uuid, Client>,
}

impl ClientRegistry {
    /// Load the registry from disk. A missing file yields an empty
    /// registry; a file that exists but fails to parse is an error
    /// (silently discarding registrations would lose data on next flush).
    pub fn load(path: &Path) -> Result<Self> {
        let clients = match std::fs::read_to_string(path) {
            Ok(raw) => {
                let by_id: HashMap<Uuid, Client> = serde_json::from_str(&raw)?;
                // Client ids live in the map keys, not the entries
                by_id
                    .into_iter()
                    .map(|(id, mut client)| {
                        client.id = id;
                        (id, client)
                    })
                    .collect()
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!(path = %path.display(), "Registry file not found, starting empty");
                HashMap::new()
            }
            Err(e) => return Err(Error::Io(e)),
        };

        tracing::info!(
            path = %path.display(),
            clients = clients.len(),
            "Client registry loaded"
        );

        Ok(Self {
            path: path.to_path_buf(),
            clients,
        })
    }

    /// Flush the full snapshot back to disk. Called after every mutation.
    pub fn save(&self) -> Result<()> {
        let raw = serde_json::to_string_pretty(&self.clients)?;
        std::fs::write(&self.path, raw)?;
        tracing::debug!(
            path = %self.path.display(),
            clients = self.clients.len(),
            "Client registry flushed"
        );
        Ok(())
    }

    pub fn get(&self, id: Uuid) -> Option<&Client> {
        self.clients.get(&id)
    }

    pub fn get_mut(&mut self, id: Uuid) -> Option<&mut Client> {
        self.clients.get_mut(&id)
    }

    pub fn insert(&mut self, client: Client) {
        self.clients.insert(client.id, client);
    }

    pub fn iter(&self) -> impl Iterator<Item = &Client> {
        self.clients.values()
    }

    pub fn len(&self) -> usize {
        self.clients.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clients.is_empty()
    }

    /// Snapshot for the registry dump endpoint
    pub fn to_map(&self) -> &HashMap<Uuid, Client> {
        &self.clients
    }
}
