// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2026 ACS contributors

use acs_engine::HealthReport;
use axum::extract::State;
use axum::Json;

use crate::state::AppState;

pub async fn health(State(state): State<AppState>) -> Json<HealthReport> {
    Json(state.engine.health())
}
