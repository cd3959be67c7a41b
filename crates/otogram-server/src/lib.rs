// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! otogram HTTP server.
//!
//! Routes are grouped by authentication requirement (see
//! [`typed_router`]). Handlers talk to the database through the `*Store`
//! traits held in [`api::AppState`], so tests can swap in their own
//! identity providers and cross-post publisher.

pub mod api;
pub mod api_docs;
pub mod auth_middleware;
pub mod error;
pub mod extract;
pub mod oauth_provider;
pub mod oauth_state;
pub mod routes;
pub mod typed_router;
pub mod version;

pub use otogram_server_config::ServerConfig;
pub use otogram_server_db as db;
