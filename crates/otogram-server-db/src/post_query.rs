// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! SQL construction for post reads.
//!
//! Every post read (feed, profile, single post, search) shares one select
//! list and ordering; only the `WHERE` clause and its arguments differ.
//! Parameters are numbered so the viewer id can be referenced twice:
//!
//! ```text
//! ?1  viewer user id, NULL when anonymous
//! ?2  first filter argument (author id, post id, search pattern or tag)
//! ?3  second filter argument (tag, for the "all" search scope)
//! ```

use otogram_server_auth::{PostId, UserId, Viewer};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Which post fields a search looks at.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum SearchScope {
	Title,
	Comment,
	Tag,
	#[default]
	All,
}

impl SearchScope {
	/// Read the `type` query parameter. Missing or unrecognized values search
	/// everything.
	pub fn from_param(param: Option<&str>) -> Self {
		match param {
			Some("title") => SearchScope::Title,
			Some("comment") => SearchScope::Comment,
			Some("tag") => SearchScope::Tag,
			_ => SearchScope::All,
		}
	}
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PostFilter<'a> {
	Feed,
	ByUser(UserId),
	ById(PostId),
	Search { scope: SearchScope, term: &'a str },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum QueryArg {
	Int(Option<i64>),
	Text(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct PostQuery {
	pub sql: String,
	pub args: Vec<QueryArg>,
}

const POST_SELECT: &str = r#"
	SELECT p.id AS id, p.user_id AS user_id, p.title AS title, p.song_id AS song_id,
		p.song_type AS song_type, p.comment AS comment, p.tags AS tags,
		p.created_at AS created_at,
		u.id AS author_id, u.display_name AS author_display_name,
		u.profile_image AS author_profile_image, u.bio AS author_bio,
		(SELECT COUNT(*) FROM likes l WHERE l.post_id = p.id) AS like_count,
		(SELECT COUNT(*) FROM replies r WHERE r.post_id = p.id) AS reply_count,
		CASE WHEN ?1 IS NULL THEN 0
			ELSE EXISTS (SELECT 1 FROM likes vl WHERE vl.post_id = p.id AND vl.user_id = ?1)
		END AS liked_by_current_user
	FROM posts p
	LEFT JOIN users u ON u.id = p.user_id"#;

const POST_ORDER: &str = "ORDER BY p.created_at DESC, p.id DESC";

const TITLE_MATCH: &str = "p.title REGEXP ?2";
const COMMENT_MATCH: &str = "p.comment REGEXP ?2";

fn tag_match(param: u8) -> String {
	format!("EXISTS (SELECT 1 FROM json_each(p.tags) t WHERE t.value = ?{param})")
}

pub(crate) fn build_post_query(filter: &PostFilter<'_>, viewer: &Viewer) -> PostQuery {
	let mut args = vec![QueryArg::Int(viewer.user_id().map(UserId::into_inner))];

	let where_clause = match filter {
		PostFilter::Feed => None,
		PostFilter::ByUser(user_id) => {
			args.push(QueryArg::Int(Some(user_id.into_inner())));
			Some("p.user_id = ?2".to_string())
		}
		PostFilter::ById(post_id) => {
			args.push(QueryArg::Int(Some(post_id.into_inner())));
			Some("p.id = ?2".to_string())
		}
		PostFilter::Search { scope, term } => match scope {
			SearchScope::Title => {
				args.push(QueryArg::Text(search_pattern(term)));
				Some(TITLE_MATCH.to_string())
			}
			SearchScope::Comment => {
				args.push(QueryArg::Text(search_pattern(term)));
				Some(COMMENT_MATCH.to_string())
			}
			SearchScope::Tag => {
				args.push(QueryArg::Text((*term).to_string()));
				Some(tag_match(2))
			}
			SearchScope::All => {
				args.push(QueryArg::Text(search_pattern(term)));
				args.push(QueryArg::Text((*term).to_string()));
				Some(format!("{TITLE_MATCH} OR {COMMENT_MATCH} OR {}", tag_match(3)))
			}
		},
	};

	let sql = match where_clause {
		Some(clause) => format!("{POST_SELECT}\n\tWHERE {clause}\n\t{POST_ORDER}"),
		None => format!("{POST_SELECT}\n\t{POST_ORDER}"),
	};

	PostQuery { sql, args }
}

/// Case-insensitive literal substring pattern for SQLite `REGEXP`.
///
/// The regex engine folds case over all of Unicode, unlike `LIKE`, which
/// only folds ASCII letters.
pub(crate) fn search_pattern(term: &str) -> String {
	format!("(?i){}", regex::escape(term))
}


#[cfg(test)]
mod proptests {
	use super::*;
	use proptest::prelude::*;

	proptest! {
		#[test]
		fn search_pattern_matches_term_literally(
			prefix in "[a-z ]{0,8}",
			term in "\\PC{1,16}",
			suffix in "[a-z ]{0,8}",
		) {
			let re = regex::Regex::new(&search_pattern(&term)).unwrap();
			let haystack = format!("{}{}{}", prefix, term, suffix);
			prop_assert!(re.is_match(&haystack));
		}

		#[test]
		fn arg_count_matches_highest_param(term in "[a-z]{1,8}", scope_idx in 0usize..4) {
			let scope = [SearchScope::Title, SearchScope::Comment, SearchScope::Tag, SearchScope::All][scope_idx];
			let q = build_post_query(&PostFilter::Search { scope, term: &term }, &Viewer::Anonymous);
			let highest = (1..=3u8).rev().find(|n| q.sql.contains(&format!("?{n}"))).unwrap();
			prop_assert_eq!(q.args.len(), highest as usize);
		}
	}
}
