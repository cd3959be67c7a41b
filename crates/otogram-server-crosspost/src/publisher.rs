// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use async_trait::async_trait;

use crate::error::CrossPostError;
use crate::job::CrossPostJob;

/// Destination for cross-posts. The queue worker calls `publish` once per
/// job and only logs the outcome.
#[async_trait]
pub trait CrossPostPublisher: Send + Sync {
	fn name(&self) -> &str;

	async fn publish(&self, job: &CrossPostJob) -> Result<(), CrossPostError>;
}
