//! Task tracker interface and its Todoist implementation

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::json;
use tokio::sync::Mutex;

use crate::error::{Error, Result};
use crate::services::http::{check_status, send_with_backoff};

const TODOIST_BASE_URL: &str = "https://api.todoist.com/rest/v2";

/// An open task in the tracker
#[derive(Debug, Clone, Deserialize)]
pub struct Task {
    pub id: String,
    pub content: String,
    #[serde(default)]
    pub due: Option<TaskDue>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TaskDue {
    #[serde(default)]
    pub date: Option<String>,
}

/// Due-dated task tracking service
#[async_trait]
pub trait TaskTracker: Send + Sync {
    /// All open tasks visible to the integration
    async fn list_tasks(&self) -> Result<Vec<Task>>;

    /// Create a task due on the given date
    async fn create_task(&self, content: &str, due_date: NaiveDate) -> Result<()>;

    /// Existence check by substring match on task content. This is the
    /// sole de-duplication mechanism for repeated audit runs.
    async fn task_exists(&self, identifier: &str) -> Result<bool> {
        let tasks = self.list_tasks().await?;
        Ok(tasks.iter().any(|t| t.content.contains(identifier)))
    }
}

/// Resolved project/collaborator ids, cached per client instance.
/// Explicit and injectable rather than hidden process-wide state.
#[derive(Debug, Default)]
struct IdCache {
    project_ids: HashMap<String, String>,
    user_ids: HashMap<String, String>,
}

/// Todoist REST v2 client
pub struct TodoistClient {
    http: reqwest::Client,
    token: String,
    project_name: String,
    assignee_email: Option<String>,
    cache: Mutex<IdCache>,
}

impl TodoistClient {
    pub fn new(
        http: reqwest::Client,
        token: String,
        project_name: String,
        assignee_email: Option<String>,
    ) -> Self {
        Self {
            http,
            token,
            project_name,
            assignee_email,
            cache: Mutex::new(IdCache::default()),
        }
    }

    fn authed(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        builder.bearer_auth(&self.token)
    }

    async fn project_id(&self, project_name: &str) -> Result<String> {
        {
            let cache = self.cache.lock().await;
            if let Some(id) = cache.project_ids.get(project_name) {
                return Ok(id.clone());
            }
        }

        #[derive(Deserialize)]
        struct Project {
            id: String,
            name: String,
        }

        let request = self.authed(self.http.get(format!("{}/projects", TODOIST_BASE_URL)));
        let response = check_status(send_with_backoff(request).await?, "list projects").await?;
        let projects: Vec<Project> = response
            .json()
            .await
            .map_err(|e| Error::Parse(e.to_string()))?;

        let project = projects
            .into_iter()
            .find(|p| p.name == project_name)
            .ok_or_else(|| {
                Error::NotFound(format!("Project '{}' not found in tracker", project_name))
            })?;

        let mut cache = self.cache.lock().await;
        cache
            .project_ids
            .insert(project_name.to_string(), project.id.clone());
        Ok(project.id)
    }

    async fn user_id(&self, email: &str, project_id: &str) -> Result<String> {
        {
            let cache = self.cache.lock().await;
            if let Some(id) = cache.user_ids.get(email) {
                return Ok(id.clone());
            }
        }

        #[derive(Deserialize)]
        struct Collaborator {
            id: String,
            #[serde(default)]
            email: Option<String>,
        }

        let request = self.authed(self.http.get(format!(
            "{}/projects/{}/collaborators",
            TODOIST_BASE_URL, project_id
        )));
        let response =
            check_status(send_with_backoff(request).await?, "list collaborators").await?;
        let collaborators: Vec<Collaborator> = response
            .json()
            .await
            .map_err(|e| Error::Parse(e.to_string()))?;

        let user = collaborators
            .into_iter()
            .find(|c| c.email.as_deref() == Some(email))
            .ok_or_else(|| {
                Error::NotFound(format!(
                    "Collaborator '{}' not found in project collaborators",
                    email
                ))
            })?;

        let mut cache = self.cache.lock().await;
        cache.user_ids.insert(email.to_string(), user.id.clone());
        Ok(user.id)
    }
}

#[async_trait]
impl TaskTracker for TodoistClient {
    async fn list_tasks(&self) -> Result<Vec<Task>> {
        let request = self.authed(self.http.get(format!("{}/tasks", TODOIST_BASE_URL)));
        let response = check_status(send_with_backoff(request).await?, "list tasks").await?;
        response
            .json()
            .await
            .map_err(|e| Error::Parse(e.to_string()))
    }

    async fn create_task(&self, content: &str, due_date: NaiveDate) -> Result<()> {
        let project_id = self.project_id(&self.project_name).await?;

        let mut payload = json!({
            "content": content,
            "due_date": due_date.format("%Y-%m-%d").to_string(),
            "project_id": project_id,
        });
        if let Some(email) = &self.assignee_email {
            match self.user_id(email, &project_id).await {
                Ok(assignee_id) => {
                    payload["assignee_id"] = json!(assignee_id);
                }
                Err(e) => {
                    // An unassigned task is still a useful task
                    tracing::warn!(email = %email, error = %e, "Could not resolve assignee");
                }
            }
        }

        let request = self
            .authed(self.http.post(format!("{}/tasks", TODOIST_BASE_URL)))
            .json(&payload);

        check_status(send_with_backoff(request).await?, "create task").await?;
        tracing::info!(content = %content, due = %due_date, "Created tracker task");
        Ok(())
    }
}
