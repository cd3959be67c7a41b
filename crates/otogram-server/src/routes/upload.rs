// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Image upload. Files land in the uploads directory and are served back
//! under `/uploads/`.

use axum::{
	extract::{multipart::MultipartError, Multipart, State},
	http::StatusCode,
	Json,
};
use otogram_server_auth::UserId;
use rand::RngCore;
use serde::{Deserialize, Serialize};
use std::path::Path;
use utoipa::ToSchema;

use crate::{
	api::AppState,
	auth_middleware::RequireAuth,
	error::{ErrorResponse, ServerError},
};

/// Multipart field carrying the image.
pub const IMAGE_FIELD: &str = "image";

/// Room for multipart boundaries and part headers on top of the file limit.
pub const MULTIPART_OVERHEAD: usize = 16 * 1024;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UploadResponse {
	pub url: String,
}

fn multipart_error(e: MultipartError) -> ServerError {
	if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
		ServerError::PayloadTooLarge("File too large".to_string())
	} else {
		ServerError::BadRequest("File too large or invalid".to_string())
	}
}

/// `{user_id}_{32 hex chars}{.ext}`. The extension is kept only when it is
/// plain alphanumeric.
pub fn upload_file_name(user_id: UserId, original: Option<&str>) -> String {
	let mut random = [0u8; 16];
	rand::thread_rng().fill_bytes(&mut random);

	let ext = original
		.and_then(|name| Path::new(name).extension())
		.and_then(|ext| ext.to_str())
		.filter(|ext| !ext.is_empty() && ext.chars().all(|c| c.is_ascii_alphanumeric()))
		.map(|ext| format!(".{}", ext.to_ascii_lowercase()))
		.unwrap_or_default();

	format!("{user_id}_{}{ext}", hex::encode(random))
}

#[utoipa::path(
    post,
    path = "/api/upload/image",
    request_body(content_type = "multipart/form-data", description = "Form with an `image` file part"),
    responses(
        (status = 200, description = "Public URL of the stored image", body = UploadResponse),
        (status = 400, description = "Missing or non-image file", body = ErrorResponse),
        (status = 401, description = "Not authenticated", body = ErrorResponse),
        (status = 413, description = "File too large", body = ErrorResponse)
    ),
    tag = "uploads"
)]
#[tracing::instrument(skip_all, fields(user_id = %user.user_id))]
pub async fn upload_image(
	State(state): State<AppState>,
	RequireAuth(user): RequireAuth,
	mut multipart: Multipart,
) -> Result<Json<UploadResponse>, ServerError> {
	while let Some(mut field) = multipart.next_field().await.map_err(multipart_error)? {
		if field.name() != Some(IMAGE_FIELD) {
			continue;
		}

		let is_image = field
			.content_type()
			.is_some_and(|ct| ct.starts_with("image/"));
		if !is_image {
			return Err(ServerError::BadRequest(
				"Only image files are allowed".to_string(),
			));
		}

		let file_name = upload_file_name(user.user_id, field.file_name());

		let mut data = Vec::new();
		while let Some(chunk) = field.chunk().await.map_err(multipart_error)? {
			if data.len() + chunk.len() > state.max_upload_bytes {
				return Err(ServerError::PayloadTooLarge("File too large".to_string()));
			}
			data.extend_from_slice(&chunk);
		}

		let path = state.uploads_dir.join(&file_name);
		tokio::fs::write(&path, &data).await.map_err(|e| {
			tracing::error!(error = %e, path = %path.display(), "failed to write upload");
			ServerError::Internal("Failed to save file".to_string())
		})?;

		tracing::info!(file = %file_name, bytes = data.len(), "image uploaded");
		return Ok(Json(UploadResponse {
			url: format!("{}/uploads/{file_name}", state.base_url),
		}));
	}

	Err(ServerError::BadRequest("Failed to get file".to_string()))
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn file_name_keeps_user_and_extension() {
		let name = upload_file_name(UserId::new(7), Some("cover.PNG"));
		assert!(name.starts_with("7_"));
		assert!(name.ends_with(".png"));
		assert_eq!(name.len(), "7_".len() + 32 + ".png".len());
	}

	#[test]
	fn suspicious_extensions_are_dropped() {
		let name = upload_file_name(UserId::new(1), Some("x.p/ng"));
		assert!(!name.contains('/'));
		let name = upload_file_name(UserId::new(1), Some("noext"));
		assert_eq!(name.len(), "1_".len() + 32);
		let name = upload_file_name(UserId::new(1), None);
		assert_eq!(name.len(), "1_".len() + 32);
	}

	#[test]
	fn names_are_unique() {
		assert_ne!(
			upload_file_name(UserId::new(1), Some("a.jpg")),
			upload_file_name(UserId::new(1), Some("a.jpg"))
		);
	}
}
