// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2026 ACS contributors

//! Request/response bodies for the REST surface. None of these carry
//! business logic — they exist purely to shape JSON at the boundary.

use acs_core::types::{EntityId, ResourceId, Verb};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize)]
pub struct Envelope<T: Serialize> {
    pub success: bool,
    pub value: T,
}

impl<T: Serialize> Envelope<T> {
    pub fn ok(value: T) -> Self {
        Self { success: true, value }
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateEntityRequest {
    pub name: String,
    pub performed_by: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateEntityRequest {
    pub name: String,
    pub performed_by: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CreateResourceRequest {
    pub uri_pattern: String,
    pub resource_type: String,
    pub parent_resource_id: Option<ResourceId>,
    pub performed_by: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct MembershipRequest {
    pub member_id: EntityId,
    pub performed_by: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SetPermissionRequest {
    pub entity_id: EntityId,
    pub resource_id: ResourceId,
    pub verb: Verb,
    pub scheme: String,
    pub effect: PermissionEffect,
    pub performed_by: Option<String>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PermissionEffect {
    Grant,
    Deny,
}

#[derive(Debug, Deserialize)]
pub struct RevokePermissionRequest {
    pub entity_id: EntityId,
    pub resource_id: ResourceId,
    pub verb: Verb,
    pub scheme: String,
    pub performed_by: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct EvaluateRequest {
    pub entity_id: EntityId,
    pub uri: String,
    pub verb: Verb,
    pub scheme: String,
}

#[derive(Debug, Deserialize)]
pub struct CheckQuery {
    pub entity_id: EntityId,
    pub uri: String,
    pub verb: Verb,
    pub scheme: String,
}

#[derive(Debug, Deserialize)]
pub struct AuditQuery {
    pub entity_id: Option<EntityId>,
    pub changed_by: Option<String>,
    pub change_type_prefix: Option<String>,
    pub since: Option<chrono::DateTime<chrono::Utc>>,
    pub until: Option<chrono::DateTime<chrono::Utc>>,
    pub limit: Option<usize>,
    pub offset: Option<usize>,
}

#[derive(Debug, Deserialize)]
pub struct AuditExportQuery {
    #[serde(default)]
    pub format: ExportFormatQuery,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormatQuery {
    #[default]
    Json,
    Csv,
}

#[derive(Debug, Deserialize)]
pub struct PurgeRequest {
    pub performed_by: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct DeleteQuery {
    #[serde(default)]
    pub force: bool,
}

/// Header carrying the acting principal when a request body omits
/// `performed_by`. See [`crate::handlers::performed_by`] for precedence.
pub const PERFORMED_BY_HEADER: &str = "x-performed-by";
pub const ANONYMOUS: &str = "anonymous";
