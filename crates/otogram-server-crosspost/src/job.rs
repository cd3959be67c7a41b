// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use otogram_server_auth::{PostId, UserId};

/// Characters of the user's comment kept before the link is appended.
pub const MAX_COMMENT_CHARS: usize = 250;

/// One post to publish on the user's behalf.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrossPostJob {
	pub user_id: UserId,
	pub post_id: PostId,
	pub comment: String,
	pub permalink: String,
}

impl CrossPostJob {
	pub fn new(user_id: UserId, post_id: PostId, comment: impl Into<String>, frontend_url: &str) -> Self {
		Self {
			user_id,
			post_id,
			comment: comment.into(),
			permalink: permalink(frontend_url, post_id),
		}
	}

	pub fn text(&self) -> String {
		compose_tweet_text(&self.comment, &self.permalink)
	}
}

/// Link back to a post in the web client.
pub fn permalink(frontend_url: &str, post_id: PostId) -> String {
	format!("{}/?post_id={post_id}", frontend_url.trim_end_matches('/'))
}

/// The comment, cut to [`MAX_COMMENT_CHARS`] characters with `...` when it
/// was longer, then a newline and the permalink.
pub fn compose_tweet_text(comment: &str, permalink: &str) -> String {
	let mut text: String = comment.chars().take(MAX_COMMENT_CHARS).collect();
	if comment.chars().nth(MAX_COMMENT_CHARS).is_some() {
		text.push_str("...");
	}
	text.push('\n');
	text.push_str(permalink);
	text
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn short_comment_is_kept_whole() {
		assert_eq!(
			compose_tweet_text("listening to this on repeat", "http://app/?post_id=3"),
			"listening to this on repeat\nhttp://app/?post_id=3"
		);
	}

	#[test]
	fn exactly_limit_is_not_truncated() {
		let comment = "a".repeat(MAX_COMMENT_CHARS);
		let text = compose_tweet_text(&comment, "L");
		assert_eq!(text, format!("{comment}\nL"));
	}

	#[test]
	fn long_comment_is_cut_with_ellipsis() {
		let comment = "b".repeat(MAX_COMMENT_CHARS + 40);
		let text = compose_tweet_text(&comment, "L");
		assert_eq!(text, format!("{}...\nL", "b".repeat(MAX_COMMENT_CHARS)));
	}

	#[test]
	fn truncation_counts_characters_not_bytes() {
		let comment = "音".repeat(MAX_COMMENT_CHARS + 1);
		let text = compose_tweet_text(&comment, "L");
		assert!(text.starts_with(&"音".repeat(MAX_COMMENT_CHARS)));
		assert!(text.ends_with("...\nL"));
	}

	#[test]
	fn empty_comment_is_just_the_link() {
		assert_eq!(compose_tweet_text("", "L"), "\nL");
	}

	#[test]
	fn permalink_joins_frontend_and_post() {
		assert_eq!(
			permalink("http://127.0.0.1:3000/", PostId::new(12)),
			"http://127.0.0.1:3000/?post_id=12"
		);
		let job = CrossPostJob::new(UserId::new(1), PostId::new(5), "hi", "https://otogram.app");
		assert_eq!(job.text(), "hi\nhttps://otogram.app/?post_id=5");
	}
}
