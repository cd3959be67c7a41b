// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Id newtypes and the OAuth provider enum.
//!
//! Ids are database-assigned integers starting at 1. There is no sentinel
//! value: "no user" is always expressed with `Option` or [`crate::Viewer`].

use serde::{Deserialize, Serialize};
use std::fmt;
use utoipa::ToSchema;

// =============================================================================
// ID Newtypes
// =============================================================================

macro_rules! define_id_type {
	($name:ident, $doc:expr) => {
		#[doc = $doc]
		#[derive(
			Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ToSchema,
		)]
		#[serde(transparent)]
		pub struct $name(i64);

		impl $name {
			pub const fn new(id: i64) -> Self {
				Self(id)
			}

			pub const fn into_inner(self) -> i64 {
				self.0
			}

			/// Parse a path or query segment. Only positive integers are ids.
			pub fn parse(s: &str) -> Option<Self> {
				s.trim().parse::<i64>().ok().filter(|id| *id > 0).map(Self)
			}
		}

		impl fmt::Display for $name {
			fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
				write!(f, "{}", self.0)
			}
		}

		impl From<i64> for $name {
			fn from(id: i64) -> Self {
				Self(id)
			}
		}

		impl From<$name> for i64 {
			fn from(id: $name) -> Self {
				id.0
			}
		}
	};
}

define_id_type!(UserId, "Identifier of a local user account.");
define_id_type!(PostId, "Identifier of a post.");
define_id_type!(ReplyId, "Identifier of a reply to a post.");

// =============================================================================
// Providers
// =============================================================================

/// External identity provider a user signed in with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
	Spotify,
	Twitter,
}

impl Provider {
	pub fn as_str(&self) -> &'static str {
		match self {
			Provider::Spotify => "spotify",
			Provider::Twitter => "twitter",
		}
	}

	pub fn all() -> &'static [Provider] {
		&[Provider::Spotify, Provider::Twitter]
	}
}

impl fmt::Display for Provider {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown provider: {0}")]
pub struct ParseProviderError(pub String);

impl std::str::FromStr for Provider {
	type Err = ParseProviderError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s {
			"spotify" => Ok(Provider::Spotify),
			"twitter" => Ok(Provider::Twitter),
			other => Err(ParseProviderError(other.to_string())),
		}
	}
}


#[cfg(test)]
mod proptests {
	use super::*;
	use proptest::prelude::*;

	proptest! {
		#[test]
		fn positive_ids_parse_back(id in 1i64..i64::MAX) {
			prop_assert_eq!(UserId::parse(&id.to_string()), Some(UserId::new(id)));
		}

		#[test]
		fn non_positive_ids_never_parse(id in i64::MIN..=0i64) {
			prop_assert_eq!(ReplyId::parse(&id.to_string()), None);
		}
	}
}
