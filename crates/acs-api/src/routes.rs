// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2026 ACS contributors

//! Assembles every `/api/*` route into one [`axum::Router`], nested by
//! target the way the ontology-manager backend nests its feature routers.

use axum::routing::{delete, get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::handlers::{audit, evaluate, groups, health, memberships, permissions, resources, roles, users};
use crate::state::AppState;

pub fn router(state: AppState) -> Router {
    let users = Router::new()
        .route("/", post(users::create).get(users::list))
        .route("/:id", get(users::get).put(users::update).delete(users::delete));

    let groups = Router::new()
        .route("/", post(groups::create).get(groups::list))
        .route("/:id", get(groups::get).put(groups::update).delete(groups::delete))
        .route("/:id/members", post(memberships::add))
        .route("/:id/members/:member_id", delete(memberships::remove));

    let roles = Router::new()
        .route("/", post(roles::create).get(roles::list))
        .route("/:id", get(roles::get).put(roles::update).delete(roles::delete))
        .route("/:id/members", post(memberships::add))
        .route("/:id/members/:member_id", delete(memberships::remove));

    let resources = Router::new()
        .route("/", post(resources::create).get(resources::list))
        .route("/:id", get(resources::get).delete(resources::delete));

    let api = Router::new()
        .nest("/users", users)
        .nest("/groups", groups)
        .nest("/roles", roles)
        .nest("/resources", resources)
        .route("/permissions", post(permissions::set).delete(permissions::revoke))
        .route("/entities/:id/permissions", get(permissions::for_entity))
        .route("/evaluate", post(evaluate::evaluate))
        .route("/check", get(evaluate::check))
        .route("/audit", get(audit::query))
        .route("/audit/export", get(audit::export))
        .route("/audit/purge", post(audit::purge))
        .route("/health", get(health::health));

    Router::new()
        .nest("/api", api)
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}
