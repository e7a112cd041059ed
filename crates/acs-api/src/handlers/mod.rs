// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2026 ACS contributors

pub mod audit;
pub mod entities;
pub mod evaluate;
pub mod groups;
pub mod health;
pub mod memberships;
pub mod permissions;
pub mod resources;
pub mod roles;
pub mod users;

use axum::http::HeaderMap;

use crate::dto::{ANONYMOUS, PERFORMED_BY_HEADER};

/// Resolve the acting principal: the request body's `performed_by` field
/// takes precedence over the `X-Performed-By` header, which in turn falls
/// back to an anonymous placeholder. `acs-api` never authenticates this
/// value — it trusts whatever sits in front of it.
pub(crate) fn performed_by(headers: &HeaderMap, body_value: Option<String>) -> String {
    body_value
        .or_else(|| headers.get(PERFORMED_BY_HEADER).and_then(|v| v.to_str().ok()).map(str::to_string))
        .unwrap_or_else(|| ANONYMOUS.to_string())
}
