// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Server error types and HTTP response conversions.

use axum::{
	http::StatusCode,
	response::{IntoResponse, Response},
	Json,
};
use otogram_server_auth::DisplayNameError;
use otogram_server_db::{DbError, PostValidationError};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, thiserror::Error)]
pub enum ServerError {
	/// Persistence failed. The message is passed through to the client.
	#[error("Database error: {0}")]
	Db(#[from] DbError),

	#[error("Not found: {0}")]
	NotFound(String),

	#[error("Invalid request: {0}")]
	BadRequest(String),

	#[error("Unauthorized: {0}")]
	Unauthorized(String),

	#[error("Payload too large: {0}")]
	PayloadTooLarge(String),

	/// An identity provider failed during a step that blocks login.
	#[error("Upstream error: {0}")]
	Upstream(String),

	/// A provider route was hit but the provider has no credentials.
	#[error("Not implemented: {0}")]
	NotImplemented(String),

	#[error("Internal error: {0}")]
	Internal(String),
}

impl From<PostValidationError> for ServerError {
	fn from(e: PostValidationError) -> Self {
		ServerError::BadRequest(e.to_string())
	}
}

impl From<DisplayNameError> for ServerError {
	fn from(e: DisplayNameError) -> Self {
		ServerError::BadRequest(e.to_string())
	}
}

/// Error response body.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
	pub error: String,
	pub message: String,
}

impl ErrorResponse {
	pub fn new(error: impl Into<String>, message: impl Into<String>) -> Self {
		Self {
			error: error.into(),
			message: message.into(),
		}
	}
}

impl IntoResponse for ServerError {
	fn into_response(self) -> Response {
		let (status, error_response) = match &self {
			ServerError::Db(e) => {
				tracing::error!(error = %e, "database error");
				(
					StatusCode::INTERNAL_SERVER_ERROR,
					ErrorResponse::new("database_error", e.to_string()),
				)
			}
			ServerError::NotFound(msg) => (
				StatusCode::NOT_FOUND,
				ErrorResponse::new("not_found", msg.clone()),
			),
			ServerError::BadRequest(msg) => (
				StatusCode::BAD_REQUEST,
				ErrorResponse::new("bad_request", msg.clone()),
			),
			ServerError::Unauthorized(msg) => {
				tracing::debug!(error = %msg, "unauthorized");
				(
					StatusCode::UNAUTHORIZED,
					ErrorResponse::new("unauthorized", msg.clone()),
				)
			}
			ServerError::PayloadTooLarge(msg) => (
				StatusCode::PAYLOAD_TOO_LARGE,
				ErrorResponse::new("payload_too_large", msg.clone()),
			),
			ServerError::Upstream(msg) => {
				tracing::warn!(error = %msg, "upstream error");
				(
					StatusCode::INTERNAL_SERVER_ERROR,
					ErrorResponse::new("upstream_error", msg.clone()),
				)
			}
			ServerError::NotImplemented(msg) => (
				StatusCode::NOT_IMPLEMENTED,
				ErrorResponse::new("not_implemented", msg.clone()),
			),
			ServerError::Internal(msg) => {
				tracing::error!(error = %msg, "internal error");
				(
					StatusCode::INTERNAL_SERVER_ERROR,
					ErrorResponse::new("internal_error", msg.clone()),
				)
			}
		};

		(status, Json(error_response)).into_response()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	async fn body_json(response: Response) -> serde_json::Value {
		let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
			.await
			.unwrap();
		serde_json::from_slice(&bytes).unwrap()
	}

	#[tokio::test]
	async fn bad_request_keeps_message() {
		let response = ServerError::BadRequest("Invalid post ID".to_string()).into_response();
		assert_eq!(response.status(), StatusCode::BAD_REQUEST);
		let body = body_json(response).await;
		assert_eq!(body["error"], "bad_request");
		assert_eq!(body["message"], "Invalid post ID");
	}

	#[tokio::test]
	async fn database_errors_pass_message_through() {
		let response =
			ServerError::Db(DbError::Internal("disk I/O error".to_string())).into_response();
		assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
		let body = body_json(response).await;
		assert_eq!(body["error"], "database_error");
		assert_eq!(body["message"], "Internal: disk I/O error");
	}

	#[tokio::test]
	async fn validation_errors_become_bad_requests() {
		let response = ServerError::from(PostValidationError::TooManyTags).into_response();
		assert_eq!(response.status(), StatusCode::BAD_REQUEST);
		assert_eq!(body_json(response).await["message"], "Too many tags (max 10)");

		let response = ServerError::from(DisplayNameError).into_response();
		assert_eq!(body_json(response).await["message"], "Display name is required");
	}

	#[test]
	fn status_codes() {
		let cases = [
			(ServerError::NotFound("x".into()), StatusCode::NOT_FOUND),
			(ServerError::Unauthorized("x".into()), StatusCode::UNAUTHORIZED),
			(ServerError::PayloadTooLarge("x".into()), StatusCode::PAYLOAD_TOO_LARGE),
			(ServerError::Upstream("x".into()), StatusCode::INTERNAL_SERVER_ERROR),
			(ServerError::NotImplemented("x".into()), StatusCode::NOT_IMPLEMENTED),
			(ServerError::Internal("x".into()), StatusCode::INTERNAL_SERVER_ERROR),
		];
		for (error, status) in cases {
			assert_eq!(error.into_response().status(), status);
		}
	}
}
