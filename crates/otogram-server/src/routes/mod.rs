// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! HTTP route handlers.

pub mod auth;
pub mod health;
pub mod likes;
pub mod posts;
pub mod replies;
pub mod search;
pub mod twitter;
pub mod upload;
