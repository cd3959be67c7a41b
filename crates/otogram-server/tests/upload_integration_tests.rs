// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Integration tests for image upload and the static file route.

mod common;

use axum::{
	body::Body,
	http::{header::CONTENT_TYPE, header::COOKIE, Request, StatusCode},
};
use common::*;

const BOUNDARY: &str = "otogram-test-boundary";

fn multipart_request(
	cookie: Option<&str>,
	field: &str,
	file_name: &str,
	content_type: &str,
	data: &[u8],
) -> Request<Body> {
	let mut body = Vec::new();
	body.extend_from_slice(
		format!(
			"--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{field}\"; filename=\"{file_name}\"\r\nContent-Type: {content_type}\r\n\r\n"
		)
		.as_bytes(),
	);
	body.extend_from_slice(data);
	body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());

	let mut builder = Request::builder()
		.method("POST")
		.uri("/api/upload/image")
		.header(CONTENT_TYPE, format!("multipart/form-data; boundary={BOUNDARY}"));
	if let Some(cookie) = cookie {
		builder = builder.header(COOKIE, cookie);
	}
	builder.body(Body::from(body)).unwrap()
}

#[tokio::test]
async fn image_upload_is_stored_and_served() {
	let app = setup_test_app().await;
	let (cookie, user_id) = signed_in_user(&app, "mika", "Mika").await;
	let png = b"\x89PNG\r\n\x1a\nfake-image-bytes";

	let response = send(
		&app,
		multipart_request(Some(&cookie), "image", "Cover.PNG", "image/png", png),
	)
	.await;

	assert_eq!(response.status(), StatusCode::OK);
	let url = json_body(response).await["url"].as_str().unwrap().to_string();
	let prefix = format!("{BASE_URL}/uploads/{user_id}_");
	assert!(url.starts_with(&prefix), "{url}");
	assert!(url.ends_with(".png"));

	let file_name = url.rsplit('/').next().unwrap();
	let stored = std::fs::read(app.state.uploads_dir.join(file_name)).unwrap();
	assert_eq!(stored, png);

	let served = send(&app, get(&format!("/uploads/{file_name}"), None)).await;
	assert_eq!(served.status(), StatusCode::OK);
	assert_eq!(body_bytes(served).await, png);
}

#[tokio::test]
async fn two_uploads_get_distinct_names() {
	let app = setup_test_app().await;
	let (cookie, _) = signed_in_user(&app, "mika", "Mika").await;

	let mut urls = Vec::new();
	for _ in 0..2 {
		let response = send(
			&app,
			multipart_request(Some(&cookie), "image", "a.jpg", "image/jpeg", b"jpeg"),
		)
		.await;
		urls.push(json_body(response).await["url"].as_str().unwrap().to_string());
	}

	assert_ne!(urls[0], urls[1]);
}

#[tokio::test]
async fn non_image_is_rejected() {
	let app = setup_test_app().await;
	let (cookie, _) = signed_in_user(&app, "mika", "Mika").await;

	let response = send(
		&app,
		multipart_request(Some(&cookie), "image", "notes.txt", "text/plain", b"hello"),
	)
	.await;

	assert_eq!(response.status(), StatusCode::BAD_REQUEST);
	assert_eq!(
		json_body(response).await["message"],
		"Only image files are allowed"
	);
	assert_eq!(std::fs::read_dir(&app.state.uploads_dir).unwrap().count(), 0);
}

#[tokio::test]
async fn oversized_image_is_413() {
	let app = setup_test_app().await;
	let (cookie, _) = signed_in_user(&app, "mika", "Mika").await;
	let big = vec![0u8; 2048];

	let response = send(
		&app,
		multipart_request(Some(&cookie), "image", "big.png", "image/png", &big),
	)
	.await;

	assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
	assert_eq!(std::fs::read_dir(&app.state.uploads_dir).unwrap().count(), 0);
}

#[tokio::test]
async fn missing_image_field_is_rejected() {
	let app = setup_test_app().await;
	let (cookie, _) = signed_in_user(&app, "mika", "Mika").await;

	let response = send(
		&app,
		multipart_request(Some(&cookie), "avatar", "a.png", "image/png", b"png"),
	)
	.await;

	assert_eq!(response.status(), StatusCode::BAD_REQUEST);
	assert_eq!(json_body(response).await["message"], "Failed to get file");
}

#[tokio::test]
async fn upload_requires_session() {
	let app = setup_test_app().await;

	let response = send(
		&app,
		multipart_request(None, "image", "a.png", "image/png", b"png"),
	)
	.await;

	assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn unknown_upload_is_404() {
	let app = setup_test_app().await;
	let response = send(&app, get("/uploads/nope.png", None)).await;
	assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
