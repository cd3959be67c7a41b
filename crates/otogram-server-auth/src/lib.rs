// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Identity types shared by the otogram server crates.
//!
//! - [`types`]: integer id newtypes and the [`Provider`] enum
//! - [`user`]: the [`User`] record and its public [`UserProfile`] projection
//! - [`middleware`]: the per-request [`Viewer`] and helpers for reading the
//!   session cookie

pub mod middleware;
pub mod types;
pub mod user;

pub use middleware::{
	extract_session_cookie_with_name, AuthContext, AuthRequired, CurrentUser, Viewer,
	SESSION_COOKIE_NAME,
};
pub use types::{ParseProviderError, PostId, Provider, ReplyId, UserId};
pub use user::{validate_display_name, DisplayNameError, User, UserProfile};
