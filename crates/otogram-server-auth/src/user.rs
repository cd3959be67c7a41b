// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! User records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::types::{Provider, UserId};

/// A local account, anchored to exactly one `(oauth_provider, oauth_id)`.
///
/// `display_name` is empty right after the first login until the user
/// completes their profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct User {
	pub id: UserId,
	pub oauth_id: String,
	pub oauth_provider: Provider,
	pub display_name: String,
	pub profile_image: String,
	pub bio: String,
	pub created_at: DateTime<Utc>,
}

impl User {
	pub fn needs_profile_setup(&self) -> bool {
		self.display_name.trim().is_empty()
	}

	pub fn profile(&self) -> UserProfile {
		UserProfile {
			id: self.id,
			display_name: self.display_name.clone(),
			profile_image: self.profile_image.clone(),
			bio: self.bio.clone(),
		}
	}
}

/// Public author fields attached to posts and replies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct UserProfile {
	pub id: UserId,
	pub display_name: String,
	pub profile_image: String,
	pub bio: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("Display name is required")]
pub struct DisplayNameError;

/// A display name must contain something other than whitespace.
pub fn validate_display_name(name: &str) -> Result<(), DisplayNameError> {
	if name.trim().is_empty() {
		return Err(DisplayNameError);
	}
	Ok(())
}
