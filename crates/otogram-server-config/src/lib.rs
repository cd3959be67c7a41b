// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Configuration for the otogram server.
//!
//! Values are layered from built-in defaults, an optional TOML file
//! (`/etc/otogram/server.toml` unless overridden) and the environment, with
//! later sources winning field by field.
//!
//! ```ignore
//! let config = otogram_server_config::load_config()?;
//! println!("listening on {}", config.socket_addr());
//! ```

pub mod error;
pub mod layer;
pub mod sections;
pub mod sources;

pub use error::ConfigError;
pub use layer::ServerConfigLayer;
pub use sections::*;
pub use sources::{ConfigSource, DefaultsSource, EnvSource, Precedence, TomlSource};

use std::path::PathBuf;
use tracing::{debug, info};

/// Fully resolved server configuration.
#[derive(Debug, Clone, Default)]
pub struct ServerConfig {
	pub http: HttpConfig,
	pub database: DatabaseConfig,
	pub session: SessionConfig,
	pub oauth: OAuthConfig,
	pub uploads: UploadsConfig,
	pub crosspost: CrossPostConfig,
	pub logging: LoggingConfig,
}

impl ServerConfig {
	pub fn socket_addr(&self) -> String {
		format!("{}:{}", self.http.host, self.http.port)
	}
}

/// Load configuration from defaults, the system config file and the
/// environment.
pub fn load_config() -> Result<ServerConfig, ConfigError> {
	load_from_sources(vec![
		Box::new(DefaultsSource),
		Box::new(TomlSource::system()),
		Box::new(EnvSource),
	])
}

/// Same as [`load_config`] with an explicit config file path.
pub fn load_config_with_file(config_path: impl Into<PathBuf>) -> Result<ServerConfig, ConfigError> {
	load_from_sources(vec![
		Box::new(DefaultsSource),
		Box::new(TomlSource::new(config_path)),
		Box::new(EnvSource),
	])
}

fn load_from_sources(mut sources: Vec<Box<dyn ConfigSource>>) -> Result<ServerConfig, ConfigError> {
	sources.sort_by_key(|s| s.precedence());

	let mut merged = ServerConfigLayer::default();
	for source in sources {
		debug!(source = source.name(), "loading configuration source");
		merged.merge(source.load()?);
	}

	finalize(merged)
}

/// Resolve a merged layer into a validated configuration.
pub fn finalize(layer: ServerConfigLayer) -> Result<ServerConfig, ConfigError> {
	let config = ServerConfig {
		http: layer.http.unwrap_or_default().finalize(),
		database: layer.database.unwrap_or_default().finalize(),
		session: layer.session.unwrap_or_default().finalize(),
		oauth: layer.oauth.unwrap_or_default().build()?,
		uploads: layer.uploads.unwrap_or_default().finalize(),
		crosspost: layer.crosspost.unwrap_or_default().finalize(),
		logging: layer.logging.unwrap_or_default().finalize(),
	};

	validate_config(&config)?;

	info!(
		host = %config.http.host,
		port = config.http.port,
		database = %config.database.url,
		frontend_url = %config.http.frontend_url,
		spotify_configured = config.oauth.spotify.is_some(),
		twitter_configured = config.oauth.twitter.is_some(),
		session_secret_configured = config.session.secret.is_some(),
		"Server configuration loaded"
	);

	Ok(config)
}

fn validate_config(config: &ServerConfig) -> Result<(), ConfigError> {
	if config.database.connect_attempts == 0 {
		return Err(ConfigError::Validation(
			"database.connect_attempts must be at least 1".to_string(),
		));
	}
	if config.crosspost.queue_capacity == 0 {
		return Err(ConfigError::Validation(
			"crosspost.queue_capacity must be at least 1".to_string(),
		));
	}
	if config.uploads.max_bytes == 0 {
		return Err(ConfigError::Validation(
			"uploads.max_bytes must be greater than zero".to_string(),
		));
	}
	if config.session.max_age_secs == 0 {
		return Err(ConfigError::Validation(
			"session.max_age_secs must be greater than zero".to_string(),
		));
	}
	Ok(())
}
