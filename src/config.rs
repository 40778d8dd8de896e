//! Configuration resolution for cadencer
//!
//! All settings come from environment variables, resolved once at startup.
//! Missing tokens are an error at startup rather than at first use, so a
//! misconfigured deployment fails fast instead of degrading silently.

use std::path::PathBuf;

use crate::error::{Error, Result};

/// Runtime configuration, resolved from the environment
#[derive(Debug, Clone)]
pub struct Config {
    /// Path to the client registry snapshot file
    pub registry_path: PathBuf,
    /// Bearer token for the document service
    pub notion_token: String,
    /// Bearer token for the task tracker
    pub todoist_token: String,
    /// Bearer token for the remote file store
    pub drive_token: String,
    /// API key for the caption model
    pub gemini_api_key: Option<String>,
    /// API key for the image annotator
    pub vision_api_key: Option<String>,
    /// Database id of the content records database in the document service
    pub content_db_id: String,
    /// Task tracker project that receives buffer shortfall tasks
    pub task_project: String,
    /// Email of the collaborator assigned to shortfall tasks
    pub task_assignee: Option<String>,
    /// Address the HTTP server binds to
    pub bind_addr: String,
}

impl Config {
    /// Resolve configuration from environment variables.
    ///
    /// Required: `NOTION_TOKEN`, `TODOIST_TOKEN`, `DRIVE_TOKEN`,
    /// `CONTENT_DB_ID`. Everything else has a default or is optional
    /// (caption generation is disabled without its keys).
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            registry_path: PathBuf::from(env_or("CLIENT_REGISTRY_PATH", "client_registry.json")),
            notion_token: required("NOTION_TOKEN")?,
            todoist_token: required("TODOIST_TOKEN")?,
            drive_token: required("DRIVE_TOKEN")?,
            gemini_api_key: std::env::var("GEMINI_API_KEY").ok(),
            vision_api_key: std::env::var("VISION_API_KEY").ok(),
            content_db_id: required("CONTENT_DB_ID")?,
            task_project: env_or("TASK_PROJECT", "Content Production"),
            task_assignee: std::env::var("TASK_ASSIGNEE").ok(),
            bind_addr: env_or("BIND_ADDR", "127.0.0.1:8082"),
        })
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn required(key: &str) -> Result<String> {
    std::env::var(key)
        .map_err(|_| Error::ConfigMissing(format!("{} environment variable not set", key)))
}
