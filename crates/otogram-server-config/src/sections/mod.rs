// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

mod crosspost;
mod database;
mod http;
mod logging;
mod oauth;
mod session;
mod uploads;

pub use crosspost::{CrossPostConfig, CrossPostConfigLayer};
pub use database::{DatabaseConfig, DatabaseConfigLayer};
pub use http::{HttpConfig, HttpConfigLayer};
pub use logging::{LogFormat, LoggingConfig, LoggingConfigLayer};
pub use oauth::{
	OAuthConfig, OAuthConfigLayer, ProviderOAuthConfig, ProviderOAuthConfigLayer,
	SPOTIFY_DEFAULT_SCOPES, TWITTER_DEFAULT_SCOPES,
};
pub use session::{SessionConfig, SessionConfigLayer};
pub use uploads::{UploadsConfig, UploadsConfigLayer};
