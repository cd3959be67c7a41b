// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use otogram_server_auth::UserId;
use otogram_server_auth_twitter::OAuthError;
use otogram_server_db::DbError;

#[derive(Debug, thiserror::Error)]
pub enum CrossPostError {
	/// The user has no stored token for the target platform.
	#[error("user {0} has not connected Twitter")]
	NotConnected(UserId),

	#[error("failed to load token: {0}")]
	Token(#[from] DbError),

	#[error("request failed: {0}")]
	Http(String),

	/// The platform answered, but did not create the post.
	#[error("rejected: {0}")]
	Rejected(String),
}

impl From<OAuthError> for CrossPostError {
	fn from(err: OAuthError) -> Self {
		match err {
			OAuthError::HttpRequest(e) => CrossPostError::Http(e.to_string()),
			OAuthError::ProviderError(msg) | OAuthError::ParseError(msg) => {
				CrossPostError::Rejected(msg)
			}
		}
	}
}
