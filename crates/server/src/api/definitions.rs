//! Broadcast definition API handlers.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use restream_core::{
    BroadcastDefinition, CreateDefinitionRequest, DefinitionFilter, StoreError,
    UpdateDefinitionRequest,
};

use super::ErrorResponse;
use crate::state::AppState;

/// Maximum allowed limit for definition queries
const MAX_LIMIT: i64 = 1000;

/// Query parameters for listing definitions
#[derive(Debug, Deserialize)]
pub struct ListDefinitionsParams {
    pub nomination: Option<String>,
    pub day: Option<i64>,
    pub platform: Option<String>,
    pub active: Option<bool>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// Response for listing definitions
#[derive(Debug, Serialize)]
pub struct ListDefinitionsResponse {
    pub definitions: Vec<BroadcastDefinition>,
    pub total: i64,
    pub limit: i64,
    pub offset: i64,
}

fn store_error(e: StoreError) -> (StatusCode, Json<ErrorResponse>) {
    let status = match e {
        StoreError::NotFound(_) => StatusCode::NOT_FOUND,
        StoreError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    ErrorResponse::with_status(status, e.to_string())
}

pub async fn create_definition(
    State(state): State<Arc<AppState>>,
    Json(request): Json<CreateDefinitionRequest>,
) -> Result<(StatusCode, Json<BroadcastDefinition>), (StatusCode, Json<ErrorResponse>)> {
    if request.nomination.trim().is_empty()
        || request.platform.trim().is_empty()
        || request.platform_url.trim().is_empty()
        || request.source_url.trim().is_empty()
    {
        return Err(ErrorResponse::with_status(
            StatusCode::BAD_REQUEST,
            "nomination, platform, platform_url and source_url must be non-empty",
        ));
    }

    let definition = state.store().create(request).map_err(store_error)?;
    Ok((StatusCode::CREATED, Json(definition)))
}

pub async fn get_definition(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<BroadcastDefinition>, (StatusCode, Json<ErrorResponse>)> {
    match state.store().get(&id).map_err(store_error)? {
        Some(definition) => Ok(Json(definition)),
        None => Err(ErrorResponse::with_status(
            StatusCode::NOT_FOUND,
            format!("Broadcast definition not found: {}", id),
        )),
    }
}

pub async fn list_definitions(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ListDefinitionsParams>,
) -> Result<Json<ListDefinitionsResponse>, (StatusCode, Json<ErrorResponse>)> {
    let mut filter = DefinitionFilter::new();
    if let Some(nomination) = params.nomination {
        filter = filter.with_nomination(nomination);
    }
    if let Some(day) = params.day {
        filter = filter.with_day(day);
    }
    if let Some(platform) = params.platform {
        filter = filter.with_platform(platform);
    }
    if let Some(active) = params.active {
        filter = filter.with_active(active);
    }
    if let Some(limit) = params.limit {
        filter = filter.with_limit(limit.clamp(1, MAX_LIMIT));
    }
    if let Some(offset) = params.offset {
        filter = filter.with_offset(offset.max(0));
    }

    let definitions = state.store().list(&filter).map_err(store_error)?;
    let total = state.store().count(&filter).map_err(store_error)?;

    Ok(Json(ListDefinitionsResponse {
        definitions,
        total,
        limit: filter.limit,
        offset: filter.offset,
    }))
}

pub async fn update_definition(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(request): Json<UpdateDefinitionRequest>,
) -> Result<Json<BroadcastDefinition>, (StatusCode, Json<ErrorResponse>)> {
    let definition = state.store().update(&id, request).map_err(store_error)?;
    Ok(Json(definition))
}

pub async fn delete_definition(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<BroadcastDefinition>, (StatusCode, Json<ErrorResponse>)> {
    let definition = state.store().delete(&id).map_err(store_error)?;
    Ok(Json(definition))
}
