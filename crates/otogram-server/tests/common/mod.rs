// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Shared setup for the server integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use axum::{
	body::Body,
	http::{
		header::{CONTENT_TYPE, COOKIE, SET_COOKIE},
		Request, StatusCode,
	},
	response::Response,
	Router,
};
use otogram_common_secret::SecretString;
use otogram_server::api::{create_app_state, create_router, AppState};
use otogram_server::oauth_provider::{
	IdentityError, IdentityProvider, ProviderIdentity, ProviderTokens,
};
use otogram_server::ServerConfig;
use otogram_server_auth::{Provider, UserId};
use otogram_server_crosspost::{CrossPostError, CrossPostJob, CrossPostPublisher, CrossPostService};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tempfile::TempDir;
use tower::ServiceExt;

pub const FRONTEND_URL: &str = "http://127.0.0.1:3000";
pub const BASE_URL: &str = "http://127.0.0.1:8080";

/// Code that makes the fake provider fail the token exchange.
pub const FAILING_CODE: &str = "fail-exchange";
/// Code whose access token makes the profile fetch fail.
pub const FAILING_PROFILE_CODE: &str = "fail-profile";

/// Identity provider that treats the authorization code as the external
/// user id.
pub struct FakeProvider {
	provider: Provider,
}

impl FakeProvider {
	pub fn new(provider: Provider) -> Self {
		Self { provider }
	}
}

#[async_trait]
impl IdentityProvider for FakeProvider {
	fn provider(&self) -> Provider {
		self.provider
	}

	fn persists_token(&self) -> bool {
		self.provider == Provider::Twitter
	}

	fn authorization_url(&self, state: &str) -> Result<String, IdentityError> {
		Ok(format!("https://{}.test/authorize?state={state}", self.provider))
	}

	async fn exchange_code(&self, code: &str) -> Result<ProviderTokens, IdentityError> {
		if code == FAILING_CODE {
			return Err(IdentityError::Provider("invalid_grant".to_string()));
		}
		Ok(ProviderTokens {
			access_token: SecretString::new(code.to_string()),
			refresh_token: Some(SecretString::new(format!("refresh-{code}"))),
			lifetime: Some(Duration::from_secs(3600)),
		})
	}

	async fn fetch_identity(&self, access_token: &str) -> Result<ProviderIdentity, IdentityError> {
		if access_token == FAILING_PROFILE_CODE {
			return Err(IdentityError::Http("connection reset".to_string()));
		}
		Ok(ProviderIdentity {
			external_id: access_token.to_string(),
			display_name: format!("{access_token} on {}", self.provider),
			profile_image: format!("https://img.test/{access_token}.png"),
		})
	}
}

/// Publisher that remembers every job it was handed.
#[derive(Default)]
pub struct RecordingPublisher {
	jobs: Mutex<Vec<CrossPostJob>>,
}

impl RecordingPublisher {
	pub fn jobs(&self) -> Vec<CrossPostJob> {
		self.jobs.lock().unwrap().clone()
	}
}

#[async_trait]
impl CrossPostPublisher for RecordingPublisher {
	fn name(&self) -> &str {
		"recording"
	}

	async fn publish(&self, job: &CrossPostJob) -> Result<(), CrossPostError> {
		self.jobs.lock().unwrap().push(job.clone());
		Ok(())
	}
}

/// Publisher that always fails, to show failures never reach the caller.
pub struct FailingPublisher;

#[async_trait]
impl CrossPostPublisher for FailingPublisher {
	fn name(&self) -> &str {
		"failing"
	}

	async fn publish(&self, job: &CrossPostJob) -> Result<(), CrossPostError> {
		Err(CrossPostError::NotConnected(job.user_id))
	}
}

pub struct TestApp {
	pub router: Router,
	pub state: AppState,
	pub publisher: Arc<RecordingPublisher>,
	pub dir: TempDir,
}

/// App with an isolated database, both fake providers and a recording
/// cross-post publisher.
pub async fn setup_test_app() -> TestApp {
	let publisher = Arc::new(RecordingPublisher::default());
	let (state, dir) = setup_state().await;
	let mut state = state;
	state.crosspost = Some(Arc::new(CrossPostService::new(publisher.clone(), 16)));
	TestApp {
		router: create_router(state.clone()),
		state,
		publisher,
		dir,
	}
}

/// Same as [`setup_test_app`] with a caller-built state tweak.
pub async fn setup_test_app_with(configure: impl FnOnce(&mut AppState)) -> TestApp {
	let mut app = setup_test_app().await;
	configure(&mut app.state);
	app.router = create_router(app.state.clone());
	app
}

async fn setup_state() -> (AppState, TempDir) {
	let dir = tempfile::tempdir().unwrap();
	let db_path = dir.path().join("otogram_test.db");
	let db_url = format!("sqlite:{}?mode=rwc", db_path.display());
	let pool = otogram_server::db::create_pool(&db_url).await.unwrap();
	otogram_server::db::run_migrations(&pool).await.unwrap();

	let uploads_dir = dir.path().join("uploads");
	std::fs::create_dir_all(&uploads_dir).unwrap();

	let mut config = ServerConfig::default();
	config.http.base_url = BASE_URL.to_string();
	config.http.frontend_url = FRONTEND_URL.to_string();
	config.uploads.dir = uploads_dir;
	config.uploads.max_bytes = 1024;

	let mut state = create_app_state(pool, &config).await;
	state.spotify = Some(Arc::new(FakeProvider::new(Provider::Spotify)));
	state.twitter = Some(Arc::new(FakeProvider::new(Provider::Twitter)));
	(state, dir)
}

// =============================================================================
// Requests
// =============================================================================

pub async fn send(app: &TestApp, request: Request<Body>) -> Response {
	app.router.clone().oneshot(request).await.unwrap()
}

pub fn get(uri: &str, cookie: Option<&str>) -> Request<Body> {
	let mut builder = Request::builder().method("GET").uri(uri);
	if let Some(cookie) = cookie {
		builder = builder.header(COOKIE, cookie);
	}
	builder.body(Body::empty()).unwrap()
}

pub fn post_json(uri: &str, cookie: Option<&str>, body: serde_json::Value) -> Request<Body> {
	let mut builder = Request::builder()
		.method("POST")
		.uri(uri)
		.header(CONTENT_TYPE, "application/json");
	if let Some(cookie) = cookie {
		builder = builder.header(COOKIE, cookie);
	}
	builder.body(Body::from(body.to_string())).unwrap()
}

pub fn post_empty(uri: &str, cookie: Option<&str>) -> Request<Body> {
	let mut builder = Request::builder().method("POST").uri(uri);
	if let Some(cookie) = cookie {
		builder = builder.header(COOKIE, cookie);
	}
	builder.body(Body::empty()).unwrap()
}

pub async fn body_bytes(response: Response) -> Vec<u8> {
	axum::body::to_bytes(response.into_body(), usize::MAX)
		.await
		.unwrap()
		.to_vec()
}

pub async fn json_body(response: Response) -> serde_json::Value {
	serde_json::from_slice(&body_bytes(response).await).unwrap()
}

/// `name=value` part of the response's `Set-Cookie` header.
pub fn session_cookie(response: &Response) -> String {
	let header = response
		.headers()
		.get(SET_COOKIE)
		.expect("Set-Cookie header")
		.to_str()
		.unwrap();
	header.split(';').next().unwrap().to_string()
}

// =============================================================================
// Flows
// =============================================================================

pub async fn oauth_callback(app: &TestApp, provider: &str, code: &str) -> Response {
	let uri = format!(
		"/auth/{provider}/callback?code={code}&state={}",
		app.state.oauth_state.value()
	);
	send(app, get(&uri, None)).await
}

/// Log in through the provider callback and complete the profile.
pub async fn signed_in_user(app: &TestApp, code: &str, display_name: &str) -> (String, UserId) {
	let response = oauth_callback(app, "spotify", code).await;
	assert_eq!(response.status(), StatusCode::SEE_OTHER);
	let cookie = session_cookie(&response);

	let response = send(
		app,
		post_json(
			"/auth/profile",
			Some(&cookie),
			serde_json::json!({ "display_name": display_name, "profile_image": "", "bio": "" }),
		),
	)
	.await;
	assert_eq!(response.status(), StatusCode::OK);
	let user = json_body(response).await;
	let id = user["id"].as_i64().unwrap();
	(cookie, UserId::new(id))
}

pub async fn create_post(app: &TestApp, cookie: &str, body: serde_json::Value) -> serde_json::Value {
	let response = send(app, post_json("/api/posts", Some(cookie), body)).await;
	assert_eq!(response.status(), StatusCode::OK);
	json_body(response).await
}

pub fn post_body(title: &str, tags: &[&str]) -> serde_json::Value {
	serde_json::json!({
		"title": title,
		"song_id": "4uLU6hMCjMI75M1A2tKUQC",
		"song_type": "spotify",
		"comment": format!("{title} comment"),
		"tags": tags,
	})
}
