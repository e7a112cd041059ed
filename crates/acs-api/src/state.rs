// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2026 ACS contributors

//! Shared application state passed to every handler.

use std::sync::Arc;

use acs_engine::AcsEngine;

/// Cheap to clone: every handler gets its own `Arc` to the same engine.
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<AcsEngine>,
}

impl AppState {
    pub fn new(engine: Arc<AcsEngine>) -> Self {
        Self { engine }
    }
}
