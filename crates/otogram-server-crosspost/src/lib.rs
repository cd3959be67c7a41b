// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Cross-posting of newly created posts to Twitter.
//!
//! Post creation hands a [`CrossPostJob`] to [`CrossPostService::submit`] and
//! returns immediately. A single background worker publishes jobs through a
//! [`CrossPostPublisher`] and logs each outcome; nothing is reported back to
//! the HTTP caller.

mod error;
pub mod job;
pub mod publisher;
pub mod service;
pub mod twitter;

pub use error::CrossPostError;
pub use job::{compose_tweet_text, permalink, CrossPostJob, MAX_COMMENT_CHARS};
pub use publisher::CrossPostPublisher;
pub use service::CrossPostService;
pub use twitter::TwitterPublisher;
