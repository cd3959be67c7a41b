// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Request identity.
//!
//! ```text
//! Request → Cookie header → signed session → AuthContext { viewer }
//!                                  │
//!                                  ├── valid    → Viewer::User(CurrentUser)
//!                                  └── missing / tampered / expired → Viewer::Anonymous
//! ```
//!
//! Reads never fail for lack of a session; they receive an anonymous
//! [`Viewer`]. Writes call [`AuthContext::require_user`].

use crate::UserId;
use http::header::COOKIE;
use http::HeaderMap;
use serde::{Deserialize, Serialize};

/// Default name for the session cookie.
pub const SESSION_COOKIE_NAME: &str = "otogram_session";

/// The signed-in user as recorded in their session.
///
/// `display_name` is the value at login time; handlers that need the
/// current name read the user row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentUser {
	pub user_id: UserId,
	pub display_name: String,
}

impl CurrentUser {
	pub fn new(user_id: UserId, display_name: impl Into<String>) -> Self {
		Self {
			user_id,
			display_name: display_name.into(),
		}
	}
}

/// Who is asking. Threaded through every read that annotates results per
/// requester (the `liked_by_current_user` flag).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Viewer {
	#[default]
	Anonymous,
	User(CurrentUser),
}

impl Viewer {
	pub fn user_id(&self) -> Option<UserId> {
		match self {
			Viewer::Anonymous => None,
			Viewer::User(user) => Some(user.user_id),
		}
	}

	pub fn is_anonymous(&self) -> bool {
		matches!(self, Viewer::Anonymous)
	}
}

impl From<Option<CurrentUser>> for Viewer {
	fn from(user: Option<CurrentUser>) -> Self {
		user.map_or(Viewer::Anonymous, Viewer::User)
	}
}

/// Authentication state attached to each request by the server's auth layer.
#[derive(Debug, Clone, Default)]
pub struct AuthContext {
	pub viewer: Viewer,
}

impl AuthContext {
	pub fn anonymous() -> Self {
		Self {
			viewer: Viewer::Anonymous,
		}
	}

	pub fn authenticated(user: CurrentUser) -> Self {
		Self {
			viewer: Viewer::User(user),
		}
	}

	pub fn user(&self) -> Option<&CurrentUser> {
		match &self.viewer {
			Viewer::User(user) => Some(user),
			Viewer::Anonymous => None,
		}
	}

	pub fn require_user(&self) -> Result<&CurrentUser, AuthRequired> {
		self.user().ok_or(AuthRequired)
	}
}

/// Error returned when authentication is required but not present.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("authentication required")]
pub struct AuthRequired;

/// Find `cookie_name` in the Cookie header.
pub fn extract_session_cookie_with_name(headers: &HeaderMap, cookie_name: &str) -> Option<String> {
	headers
		.get_all(COOKIE)
		.iter()
		.filter_map(|value| value.to_str().ok())
		.flat_map(|value| value.split(';'))
		.find_map(|cookie| {
			let (name, value) = cookie.trim().split_once('=')?;
			(name == cookie_name && !value.is_empty()).then(|| value.to_string())
		})
}

#[cfg(test)]
mod tests {
	use super::*;
	use http::header::HeaderValue;

	fn headers_with_cookie(cookie: &str) -> HeaderMap {
		let mut headers = HeaderMap::new();
		headers.insert(COOKIE, HeaderValue::from_str(cookie).unwrap());
		headers
	}

	#[test]
	fn anonymous_viewer_has_no_user_id() {
		let viewer = Viewer::default();
		assert!(viewer.is_anonymous());
		assert_eq!(viewer.user_id(), None);
	}

	#[test]
	fn signed_in_viewer_exposes_user_id() {
		let viewer = Viewer::from(Some(CurrentUser::new(UserId::new(9), "mika")));
		assert_eq!(viewer.user_id(), Some(UserId::new(9)));
	}

	#[test]
	fn require_user_on_anonymous_context_fails() {
		assert_eq!(AuthContext::anonymous().require_user(), Err(AuthRequired));
		let ctx = AuthContext::authenticated(CurrentUser::new(UserId::new(1), ""));
		assert_eq!(ctx.require_user().unwrap().user_id, UserId::new(1));
	}

	#[test]
	fn extracts_named_cookie_among_others() {
		let headers = headers_with_cookie("theme=dark; otogram_session=abc.def; lang=ja");
		assert_eq!(
			extract_session_cookie_with_name(&headers, SESSION_COOKIE_NAME),
			Some("abc.def".to_string())
		);
	}

	#[test]
	fn custom_cookie_name() {
		let headers = headers_with_cookie("sid=xyz");
		assert_eq!(
			extract_session_cookie_with_name(&headers, "sid"),
			Some("xyz".to_string())
		);
		assert_eq!(extract_session_cookie_with_name(&headers, SESSION_COOKIE_NAME), None);
	}

	#[test]
	fn empty_cookie_value_counts_as_absent() {
		let headers = headers_with_cookie("otogram_session=");
		assert_eq!(extract_session_cookie_with_name(&headers, SESSION_COOKIE_NAME), None);
	}

	#[test]
	fn prefix_of_name_does_not_match() {
		let headers = headers_with_cookie("otogram_session_old=stale");
		assert_eq!(extract_session_cookie_with_name(&headers, SESSION_COOKIE_NAME), None);
	}
}
