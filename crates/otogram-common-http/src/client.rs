// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

use otogram_common_version::BuildInfo;
use reqwest::{Client, ClientBuilder};
use std::time::Duration;

/// Upper bound for any single call to an identity provider or the tweet API.
/// There is no caller-driven cancellation, so this is the only thing that
/// ends a hung upstream request.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);

/// Client builder carrying the otogram User-Agent.
pub fn builder() -> ClientBuilder {
	Client::builder().user_agent(user_agent())
}

/// Client with the User-Agent and [`DEFAULT_TIMEOUT`].
pub fn new_client() -> reqwest::Result<Client> {
	new_client_with_timeout(DEFAULT_TIMEOUT)
}

pub fn new_client_with_timeout(timeout: Duration) -> reqwest::Result<Client> {
	builder().timeout(timeout).build()
}

/// `otogram/{platform}/{git_sha}`
pub fn user_agent() -> String {
	let info = BuildInfo::current();
	format!("otogram/{}/{}", info.platform, info.git_sha)
}
