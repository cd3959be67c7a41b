// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Request extractors that reject with [`ServerError`].

use axum::{
	extract::{FromRequest, Request},
	Json,
};
use serde::de::DeserializeOwned;

use crate::error::ServerError;

/// `Json<T>` whose rejection is a 400 `Invalid request body` instead of
/// axum's 415/422 plain-text responses.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonBody<T>(pub T);

impl<S, T> FromRequest<S> for JsonBody<T>
where
	T: DeserializeOwned,
	S: Send + Sync,
{
	type Rejection = ServerError;

	async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
		match Json::<T>::from_request(req, state).await {
			Ok(Json(value)) => Ok(JsonBody(value)),
			Err(rejection) => {
				tracing::debug!(error = %rejection.body_text(), "rejected request body");
				Err(ServerError::BadRequest("Invalid request body".to_string()))
			}
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use axum::{body::Body, http::header::CONTENT_TYPE};
	use serde::Deserialize;

	#[derive(Debug, Deserialize)]
	struct Payload {
		content: String,
	}

	fn json_request(body: &'static str) -> Request {
		Request::builder()
			.method("POST")
			.header(CONTENT_TYPE, "application/json")
			.body(Body::from(body))
			.unwrap()
	}

	#[tokio::test]
	async fn accepts_valid_json() {
		let JsonBody(payload) = JsonBody::<Payload>::from_request(json_request(r#"{"content":"hi"}"#), &())
			.await
			.unwrap();
		assert_eq!(payload.content, "hi");
	}

	#[tokio::test]
	async fn malformed_json_is_bad_request() {
		let err = JsonBody::<Payload>::from_request(json_request("{not json"), &())
			.await
			.unwrap_err();
		assert!(matches!(err, ServerError::BadRequest(ref msg) if msg == "Invalid request body"));
	}

	#[tokio::test]
	async fn missing_content_type_is_bad_request() {
		let request = Request::builder()
			.method("POST")
			.body(Body::from(r#"{"content":"hi"}"#))
			.unwrap();
		let err = JsonBody::<Payload>::from_request(request, &()).await.unwrap_err();
		assert!(matches!(err, ServerError::BadRequest(_)));
	}
}
