// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2026 ACS contributors

use acs_core::types::EvaluationOutcome;
use axum::extract::{Query, State};
use axum::Json;

use crate::dto::{CheckQuery, EvaluateRequest, Envelope};
use crate::error::ApiError;
use crate::state::AppState;

pub async fn evaluate(State(state): State<AppState>, Json(req): Json<EvaluateRequest>) -> Result<Json<Envelope<EvaluationOutcome>>, ApiError> {
    let outcome = state.engine.evaluate(req.entity_id, &req.uri, req.verb, &req.scheme).await?;
    Ok(Json(Envelope::ok(outcome)))
}

/// `GET /api/check` — the same evaluation, exposed as a cacheable query for
/// callers that prefer a single round-trip idempotent read.
pub async fn check(State(state): State<AppState>, Query(query): Query<CheckQuery>) -> Result<Json<Envelope<EvaluationOutcome>>, ApiError> {
    let outcome = state.engine.evaluate(query.entity_id, &query.uri, query.verb, &query.scheme).await?;
    Ok(Json(Envelope::ok(outcome)))
}
