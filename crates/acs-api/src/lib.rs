// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2026 ACS contributors

//! # acs-api
//!
//! The HTTP surface for the Access Control Service. Every handler
//! deserialises a request, builds the matching [`acs_engine::Command`] or
//! read call, awaits [`acs_engine::AcsEngine`]'s response, and serialises it
//! back — no authorization or graph logic lives in this crate.

pub mod dto;
pub mod error;
pub mod handlers;
pub mod routes;
pub mod state;

pub use routes::router;
pub use state::AppState;
