//! API endpoints for referral templates

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

use crate::api::handlers::{api_error, bad_request, ApiResult, AppState, SuccessResponse};
use crate::error::ReferralError;
use crate::templates::{NewTemplate, Placeholder, PlaceholderSet, Template};

/// GET /templates - List all templates, oldest first
pub async fn list_templates(State(state): State<Arc<AppState>>) -> ApiResult<Json<Vec<Template>>> {
    let templates = state
        .store
        .list()
        .await
        .map_err(|e| api_error(e, "Failed to fetch templates"))?;

    Ok(Json(templates))
}

/// GET /templates/:id - Get a specific template
pub async fn get_template(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<Json<Template>> {
    let template = fetch_template(&state, &id).await?;

    Ok(Json(template))
}

/// POST /templates - Create a new template
pub async fn create_template(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<NewTemplate>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Template>)> {
    let Json(payload) = payload.map_err(|e| bad_request(&e.body_text()))?;

    let template = state
        .store
        .create(payload)
        .await
        .map_err(|e| api_error(e, "Failed to create template"))?;

    info!(template_id = %template.id, name = %template.name, "Template created");

    Ok((StatusCode::CREATED, Json(template)))
}

/// PUT /templates/:id - Replace every field of a template
pub async fn replace_template(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    payload: Result<Json<NewTemplate>, JsonRejection>,
) -> ApiResult<Json<Template>> {
    let Json(payload) = payload.map_err(|e| bad_request(&e.body_text()))?;

    let template = state
        .store
        .replace(&id, payload)
        .await
        .map_err(|e| api_error(e, "Failed to update template"))?;

    info!(template_id = %template.id, "Template replaced");

    Ok(Json(template))
}

/// DELETE /templates/:id - Delete a template
pub async fn delete_template(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<Json<SuccessResponse>> {
    state
        .store
        .delete(&id)
        .await
        .map_err(|e| api_error(e, "Failed to delete template"))?;

    info!(template_id = %id, "Template deleted");

    Ok(Json(SuccessResponse::ok()))
}

async fn fetch_template(state: &AppState, id: &str) -> ApiResult<Template> {
    state
        .store
        .get(id)
        .await
        .and_then(|template| {
            template.ok_or_else(|| ReferralError::NotFound(format!("Template not found: {}", id)))
        })
        .map_err(|e| api_error(e, "Failed to fetch template"))
}

#[derive(Debug, Default, Deserialize)]
pub struct PreviewRequest {
    #[serde(default)]
    pub placeholders: Vec<Placeholder>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PreviewResponse {
    pub subject: String,
    pub body: String,
    /// Keys still unfilled in the body
    pub missing: Vec<String>,
}

/// POST /templates/:id/preview - Render a template with placeholder values
pub async fn preview_template(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    payload: Result<Json<PreviewRequest>, JsonRejection>,
) -> ApiResult<Json<PreviewResponse>> {
    let Json(payload) = payload.map_err(|e| bad_request(&e.body_text()))?;

    let placeholders = PlaceholderSet::from_entries(payload.placeholders)
        .map_err(|e| api_error(ReferralError::from(e), "Failed to render template"))?;

    let template = fetch_template(&state, &id).await?;

    Ok(Json(PreviewResponse {
        subject: placeholders.fill(&template.subject),
        body: placeholders.fill(&template.body),
        missing: placeholders.missing_in(&template.body),
    }))
}
