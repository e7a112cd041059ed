// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2026 ACS contributors

//! Kind-parameterized core of the Users/Groups/Roles endpoints. `users.rs`,
//! `groups.rs`, and `roles.rs` are thin wrappers over these functions —
//! Users, Groups, and Roles share the same entity graph operations (I1),
//! so only the `EntityKind` passed in differs.

use acs_core::types::{Entity, EntityId, EntityKind};
use axum::http::HeaderMap;
use axum::Json;

use crate::dto::{CreateEntityRequest, DeleteQuery, Envelope, UpdateEntityRequest};
use crate::error::ApiError;
use crate::handlers::performed_by;
use crate::state::AppState;

pub async fn create(state: &AppState, headers: &HeaderMap, kind: EntityKind, req: CreateEntityRequest) -> Result<Json<Envelope<Entity>>, ApiError> {
    let by = performed_by(headers, req.performed_by);
    let entity = state.engine.create_entity(kind, req.name, by).await?;
    Ok(Json(Envelope::ok(entity)))
}

pub async fn get(state: &AppState, id: EntityId) -> Result<Json<Envelope<Entity>>, ApiError> {
    let entity = state.engine.get_entity(id).await?;
    Ok(Json(Envelope::ok(entity)))
}

pub async fn list(state: &AppState, kind: EntityKind) -> Json<Envelope<Vec<Entity>>> {
    let entities = state.engine.list_entities(Some(kind)).await;
    Json(Envelope::ok(entities))
}

pub async fn update(state: &AppState, headers: &HeaderMap, id: EntityId, req: UpdateEntityRequest) -> Result<Json<Envelope<Entity>>, ApiError> {
    let by = performed_by(headers, req.performed_by);
    let entity = state.engine.rename_entity(id, req.name, by).await?;
    Ok(Json(Envelope::ok(entity)))
}

pub async fn delete(
    state: &AppState,
    headers: &HeaderMap,
    id: EntityId,
    query: DeleteQuery,
    performed_by_body: Option<String>,
) -> Result<Json<Envelope<()>>, ApiError> {
    let by = performed_by(headers, performed_by_body);
    state.engine.delete_entity(id, query.force, by).await?;
    Ok(Json(Envelope::ok(())))
}
