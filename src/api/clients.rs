//! Client registration endpoints
//!
//! POST /clients            - create a client from a cadence-record URL
//! POST /clients/:id/resources - register one resource id for a client
//! GET  /clients            - dump the registry snapshot

use std::collections::HashMap;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::post,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{ApiError, ApiResult};
use crate::models::{Client, ServiceKind};
use crate::services::{drive_client, notion_client};
use crate::AppState;

/// One resource registration within a create/add payload
#[derive(Debug, Deserialize)]
pub struct ResourceRegistration {
    pub key: String,
    pub url: String,
    #[serde(default)]
    pub description: String,
}

/// POST /clients request
#[derive(Debug, Deserialize)]
pub struct CreateClientRequest {
    /// URL of the client's cadence record in the document service
    pub cadence_record_url: String,
    #[serde(default)]
    pub google_drive: Vec<ResourceRegistration>,
    #[serde(default)]
    pub notion: Vec<ResourceRegistration>,
}

#[derive(Debug, Serialize)]
pub struct CreateClientResponse {
    pub id: Uuid,
    pub message: String,
    pub client: Client,
}

/// POST /clients
///
/// Bootstraps a client from its cadence record: the display name
/// ("Project name") and tag ("Tags") come from the record's properties.
pub async fn create_client(
    State(state): State<AppState>,
    Json(request): Json<CreateClientRequest>,
) -> ApiResult<(StatusCode, Json<CreateClientResponse>)> {
    let record_id = notion_client::extract_page_id(&request.cadence_record_url)
        .map_err(|e| ApiError::BadRequest(e.to_string()))?;

    let props = state.docs.get_properties(&record_id).await?;
    let display_name = props
        .get("Project name")
        .map(notion_client::plain_text)
        .unwrap_or_default();
    let tag = props
        .get("Tags")
        .map(notion_client::plain_text)
        .unwrap_or_default();

    let mut client = Client::new(Uuid::new_v4(), tag, display_name);
    client.cadence_record_id = Some(record_id);

    for resource in &request.google_drive {
        let folder_id = drive_client::extract_folder_id(&resource.url)
            .map_err(|e| ApiError::BadRequest(e.to_string()))?;
        client.add_resource(
            ServiceKind::Drive,
            &resource.key,
            folder_id,
            resource.description.clone(),
            resource.url.clone(),
        );
    }
    for resource in &request.notion {
        let page_id = notion_client::extract_page_id(&resource.url)
            .map_err(|e| ApiError::BadRequest(e.to_string()))?;
        client.add_resource(
            ServiceKind::Notion,
            &resource.key,
            page_id,
            resource.description.clone(),
            resource.url.clone(),
        );
    }

    let id = client.id;
    let snapshot = client.clone();
    {
        let mut registry = state.registry.write().await;
        registry.insert(client);
        registry.save()?;
    }

    tracing::info!(client_id = %id, name = %snapshot.display_name, "Client created");

    Ok((
        StatusCode::CREATED,
        Json(CreateClientResponse {
            id,
            message: "Client created".to_string(),
            client: snapshot,
        }),
    ))
}

/// POST /clients/:id/resources request
#[derive(Debug, Deserialize)]
pub struct AddResourceRequest {
    pub service: String,
    pub key: String,
    pub url: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Serialize)]
pub struct AddResourceResponse {
    pub message: String,
}

/// POST /clients/:id/resources
pub async fn add_resource(
    State(state): State<AppState>,
    Path(client_id): Path<Uuid>,
    Json(request): Json<AddResourceRequest>,
) -> ApiResult<Json<AddResourceResponse>> {
    let service = ServiceKind::from_str(&request.service).ok_or_else(|| {
        ApiError::BadRequest("Service must be 'google_drive' or 'notion'".to_string())
    })?;
    if request.key.is_empty() {
        return Err(ApiError::BadRequest("Missing resource key".to_string()));
    }

    let id_value = match service {
        ServiceKind::Drive => drive_client::extract_folder_id(&request.url),
        ServiceKind::Notion => notion_client::extract_page_id(&request.url),
    }
    .map_err(|e| ApiError::BadRequest(e.to_string()))?;

    let mut registry = state.registry.write().await;
    let client = registry
        .get_mut(client_id)
        .ok_or_else(|| ApiError::NotFound(format!("Client {} not found", client_id)))?;

    client.add_resource(
        service,
        &request.key,
        id_value,
        request.description,
        request.url,
    );
    registry.save()?;

    Ok(Json(AddResourceResponse {
        message: "Resource registered".to_string(),
    }))
}

/// GET /clients
pub async fn list_clients(State(state): State<AppState>) -> Json<HashMap<Uuid, Client>> {
    let registry = state.registry.read().await;
    Json(registry.to_map().clone())
}

/// Build client registration routes
pub fn client_routes() -> Router<AppState> {
    Router::new()
        .route("/clients", post(create_client).get(list_clients))
        .route("/clients/:id/resources", post(add_resource))
}
