// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2026 ACS contributors

//! Add/remove a member under a Group or Role. The entity graph doesn't
//! distinguish "user in group" from "role on group" from "group in group" —
//! any of those is just a membership edge (`AddMembership`/`RemoveMembership`
//! in `acs-engine`) — so one pair of handlers serves both the
//! `/api/groups/:id/members` and `/api/roles/:id/members` routes.

use acs_core::types::EntityId;
use axum::extract::{Path, State};
use axum::http::HeaderMap;
use axum::Json;

use crate::dto::{Envelope, MembershipRequest};
use crate::error::ApiError;
use crate::handlers::performed_by;
use crate::state::AppState;

pub async fn add(
    State(state): State<AppState>,
    Path(parent_id): Path<EntityId>,
    headers: HeaderMap,
    Json(req): Json<MembershipRequest>,
) -> Result<Json<Envelope<()>>, ApiError> {
    let by = performed_by(&headers, req.performed_by);
    state.engine.add_membership(req.member_id, parent_id, by).await?;
    Ok(Json(Envelope::ok(())))
}

pub async fn remove(
    State(state): State<AppState>,
    Path((parent_id, member_id)): Path<(EntityId, EntityId)>,
    headers: HeaderMap,
) -> Result<Json<Envelope<()>>, ApiError> {
    let by = performed_by(&headers, None);
    state.engine.remove_membership(member_id, parent_id, by).await?;
    Ok(Json(Envelope::ok(())))
}
