// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use std::sync::Arc;

use async_trait::async_trait;
use otogram_server_auth::Provider;
use otogram_server_auth_twitter::TwitterOAuthClient;
use otogram_server_db::OAuthTokenStore;

use crate::error::CrossPostError;
use crate::job::CrossPostJob;
use crate::publisher::CrossPostPublisher;

/// Publishes jobs as tweets using the user's stored Twitter token.
pub struct TwitterPublisher {
	tokens: Arc<dyn OAuthTokenStore>,
	client: TwitterOAuthClient,
}

impl TwitterPublisher {
	pub fn new(tokens: Arc<dyn OAuthTokenStore>, client: TwitterOAuthClient) -> Self {
		Self { tokens, client }
	}
}

#[async_trait]
impl CrossPostPublisher for TwitterPublisher {
	fn name(&self) -> &str {
		"twitter"
	}

	#[tracing::instrument(skip(self, job), fields(user_id = %job.user_id, post_id = %job.post_id))]
	async fn publish(&self, job: &CrossPostJob) -> Result<(), CrossPostError> {
		let token = self
			.tokens
			.get_token(job.user_id, Provider::Twitter)
			.await?
			.ok_or(CrossPostError::NotConnected(job.user_id))?;

		let tweet = self
			.client
			.create_tweet(token.access_token.expose(), &job.text())
			.await?;

		tracing::debug!(tweet_id = %tweet.id, "tweet published");
		Ok(())
	}
}
