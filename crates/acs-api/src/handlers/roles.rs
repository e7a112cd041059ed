// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2026 ACS contributors

use acs_core::types::{Entity, EntityId, EntityKind};
use axum::extract::{Path, Query, State};
use axum::http::HeaderMap;
use axum::Json;

use super::entities;
use crate::dto::{CreateEntityRequest, DeleteQuery, Envelope, UpdateEntityRequest};
use crate::error::ApiError;
use crate::state::AppState;

pub async fn create(State(state): State<AppState>, headers: HeaderMap, Json(req): Json<CreateEntityRequest>) -> Result<Json<Envelope<Entity>>, ApiError> {
    entities::create(&state, &headers, EntityKind::Role, req).await
}

pub async fn get(State(state): State<AppState>, Path(id): Path<EntityId>) -> Result<Json<Envelope<Entity>>, ApiError> {
    entities::get(&state, id).await
}

pub async fn list(State(state): State<AppState>) -> Json<Envelope<Vec<Entity>>> {
    entities::list(&state, EntityKind::Role).await
}

pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<EntityId>,
    headers: HeaderMap,
    Json(req): Json<UpdateEntityRequest>,
) -> Result<Json<Envelope<Entity>>, ApiError> {
    entities::update(&state, &headers, id, req).await
}

pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<EntityId>,
    Query(query): Query<DeleteQuery>,
    headers: HeaderMap,
) -> Result<Json<Envelope<()>>, ApiError> {
    entities::delete(&state, &headers, id, query, None).await
}
