// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2026 ACS contributors

use acs_core::types::{EntityId, Permission, ResourceId};
use axum::extract::{Query, State};
use axum::http::HeaderMap;
use axum::Json;

use crate::dto::{Envelope, PermissionEffect, RevokePermissionRequest, SetPermissionRequest};
use crate::error::ApiError;
use crate::handlers::performed_by;
use crate::state::AppState;

pub async fn set(State(state): State<AppState>, headers: HeaderMap, Json(req): Json<SetPermissionRequest>) -> Result<Json<Envelope<()>>, ApiError> {
    let by = performed_by(&headers, req.performed_by.clone());
    let permission = match req.effect {
        PermissionEffect::Grant => Permission::grant(req.entity_id, req.resource_id, req.verb, req.scheme.clone()),
        PermissionEffect::Deny => Permission::deny(req.entity_id, req.resource_id, req.verb, req.scheme.clone()),
    };
    state.engine.set_permission(permission, by).await?;
    Ok(Json(Envelope::ok(())))
}

pub async fn revoke(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<RevokePermissionRequest>,
) -> Result<Json<Envelope<()>>, ApiError> {
    let by = performed_by(&headers, req.performed_by.clone());
    state.engine.revoke_permission(req.entity_id, req.resource_id, req.verb, req.scheme, by).await?;
    Ok(Json(Envelope::ok(())))
}

#[derive(serde::Deserialize)]
pub struct EntityPermissionsQuery {
    resource_id: Option<ResourceId>,
}

pub async fn for_entity(
    State(state): State<AppState>,
    axum::extract::Path(entity_id): axum::extract::Path<EntityId>,
    Query(query): Query<EntityPermissionsQuery>,
) -> Result<Json<Envelope<Vec<Permission>>>, ApiError> {
    // Ensures the entity exists before returning an (empty, if unset)
    // permission list rather than silently returning nothing for a typo'd
    // id.
    state.engine.get_entity(entity_id).await?;
    let permissions = match query.resource_id {
        Some(resource_id) => state.engine.direct_permissions(entity_id, resource_id).await,
        None => {
            let mut all = Vec::new();
            for resource in state.engine.list_resources().await {
                all.extend(state.engine.direct_permissions(entity_id, resource.id).await);
            }
            all
        }
    };
    Ok(Json(Envelope::ok(permissions)))
}
