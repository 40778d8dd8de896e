//! In-memory fakes of the external collaborators, shared by the
//! integration suites.

// Not every suite uses every fake
#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::NaiveDate;
use serde_json::{json, Value};

use cadencer::services::drive_client::{FileStore, RawFile};
use cadencer::services::notion_client::DocumentService;
use cadencer::services::todoist_client::{Task, TaskTracker};
use cadencer::{Error, Result};

pub fn raw_file(id: &str, name: &str, mime: &str) -> RawFile {
    RawFile {
        id: id.to_string(),
        name: name.to_string(),
        mime_type: mime.to_string(),
        parents: vec![],
        created_time: None,
    }
}

// ---------------------------------------------------------------------------
// File store
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct FakeFileStore {
    pub folders: Mutex<HashMap<String, Vec<RawFile>>>,
    pub public_files: Mutex<Vec<String>>,
    pub moves: Mutex<Vec<(String, String, String)>>,
    pub downloads: Mutex<HashMap<String, Vec<u8>>>,
    /// Folder ids whose listing fails with a transport error
    pub failing_folders: Mutex<Vec<String>>,
}

impl FakeFileStore {
    pub fn with_folder(self, folder_id: &str, files: Vec<RawFile>) -> Self {
        self.folders
            .lock()
            .unwrap()
            .insert(folder_id.to_string(), files);
        self
    }
}

#[async_trait]
impl FileStore for FakeFileStore {
    async fn list_folder(&self, folder_id: &str) -> Result<Vec<RawFile>> {
        if self
            .failing_folders
            .lock()
            .unwrap()
            .iter()
            .any(|f| f == folder_id)
        {
            return Err(Error::Transport("listing unavailable".to_string()));
        }
        Ok(self
            .folders
            .lock()
            .unwrap()
            .get(folder_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn move_file(&self, file_id: &str, from_folder: &str, to_folder: &str) -> Result<()> {
        let mut folders = self.folders.lock().unwrap();
        let moved = folders
            .get_mut(from_folder)
            .and_then(|files| {
                files
                    .iter()
                    .position(|f| f.id == file_id)
                    .map(|idx| files.remove(idx))
            })
            .ok_or_else(|| Error::NotFound(format!("file {} not in {}", file_id, from_folder)))?;
        folders.entry(to_folder.to_string()).or_default().push(moved);

        self.moves.lock().unwrap().push((
            file_id.to_string(),
            from_folder.to_string(),
            to_folder.to_string(),
        ));
        Ok(())
    }

    async fn make_public(&self, file_id: &str) -> Result<()> {
        self.public_files.lock().unwrap().push(file_id.to_string());
        Ok(())
    }

    async fn copy_file(
        &self,
        file_id: &str,
        _new_name: &str,
        _dest_folder: &str,
    ) -> Result<String> {
        Ok(format!("copy-of-{}", file_id))
    }

    async fn download(&self, file_id: &str) -> Result<Vec<u8>> {
        self.downloads
            .lock()
            .unwrap()
            .get(file_id)
            .cloned()
            .ok_or_else(|| Error::NotFound(format!("file {} has no content", file_id)))
    }
}

// ---------------------------------------------------------------------------
// Document service
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct FakeDocumentService {
    /// page id -> properties
    pub pages: Mutex<HashMap<String, Value>>,
    /// page id -> child blocks
    pub blocks: Mutex<HashMap<String, Vec<Value>>>,
    /// canned query results per database id
    pub query_results: Mutex<HashMap<String, Vec<Value>>>,
    /// (database_id, properties) for every created page
    pub created: Mutex<Vec<(String, Value)>>,
    /// page id -> properties passed to update_page
    pub updates: Mutex<Vec<(String, Value)>>,
    /// create_page fails when the Identifier title contains this substring
    pub fail_create_containing: Mutex<Option<String>>,
}

impl FakeDocumentService {
    pub fn with_page(self, page_id: &str, properties: Value) -> Self {
        self.pages
            .lock()
            .unwrap()
            .insert(page_id.to_string(), properties);
        self
    }

    pub fn created_identifiers(&self) -> Vec<String> {
        self.created
            .lock()
            .unwrap()
            .iter()
            .filter_map(|(_, props)| {
                props
                    .pointer("/Identifier/title/0/text/content")
                    .and_then(Value::as_str)
                    .map(str::to_string)
            })
            .collect()
    }
}

#[async_trait]
impl DocumentService for FakeDocumentService {
    async fn get_properties(&self, page_id: &str) -> Result<Value> {
        self.pages
            .lock()
            .unwrap()
            .get(page_id)
            .cloned()
            .ok_or_else(|| Error::NotFound(format!("page {} not found", page_id)))
    }

    async fn list_blocks(&self, page_id: &str) -> Result<Vec<Value>> {
        Ok(self
            .blocks
            .lock()
            .unwrap()
            .get(page_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn query(&self, database_id: &str, _filter: Value) -> Result<Vec<Value>> {
        Ok(self
            .query_results
            .lock()
            .unwrap()
            .get(database_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn create_page(&self, database_id: &str, properties: Value) -> Result<String> {
        if let Some(needle) = self.fail_create_containing.lock().unwrap().as_deref() {
            let identifier = properties
                .pointer("/Identifier/title/0/text/content")
                .and_then(Value::as_str)
                .unwrap_or_default();
            if identifier.contains(needle) {
                return Err(Error::Transport("create rejected".to_string()));
            }
        }

        let mut created = self.created.lock().unwrap();
        created.push((database_id.to_string(), properties));
        Ok(format!("page-{}", created.len()))
    }

    async fn append_blocks(&self, page_id: &str, children: Vec<Value>) -> Result<()> {
        self.blocks
            .lock()
            .unwrap()
            .entry(page_id.to_string())
            .or_default()
            .extend(children);
        Ok(())
    }

    async fn update_page(&self, page_id: &str, properties: Value) -> Result<()> {
        self.updates
            .lock()
            .unwrap()
            .push((page_id.to_string(), properties));
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Task tracker
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct FakeTaskTracker {
    pub tasks: Mutex<Vec<Task>>,
    pub due_dates: Mutex<Vec<NaiveDate>>,
}

#[async_trait]
impl TaskTracker for FakeTaskTracker {
    async fn list_tasks(&self) -> Result<Vec<Task>> {
        Ok(self.tasks.lock().unwrap().clone())
    }

    async fn create_task(&self, content: &str, due_date: NaiveDate) -> Result<()> {
        let mut tasks = self.tasks.lock().unwrap();
        let task: Task = serde_json::from_value(json!({
            "id": format!("{}", tasks.len() + 1),
            "content": content,
            "due": { "date": due_date.format("%Y-%m-%d").to_string() },
        }))
        .expect("valid task payload");
        tasks.push(task);
        self.due_dates.lock().unwrap().push(due_date);
        Ok(())
    }
}
