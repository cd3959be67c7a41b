// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Configuration sources: built-in defaults, a TOML file, the environment.

use std::path::PathBuf;

use otogram_common_secret::SecretString;
use tracing::{debug, trace};

use crate::error::ConfigError;
use crate::layer::ServerConfigLayer;
use crate::sections::{
	CrossPostConfigLayer, DatabaseConfigLayer, HttpConfigLayer, LogFormat, LoggingConfigLayer,
	OAuthConfigLayer, ProviderOAuthConfigLayer, SessionConfigLayer, UploadsConfigLayer,
};

/// Source precedence levels (higher = overrides lower).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Precedence {
	Defaults = 10,
	ConfigFile = 20,
	Environment = 50,
}

pub trait ConfigSource: Send + Sync {
	fn name(&self) -> &'static str;
	fn precedence(&self) -> Precedence;
	fn load(&self) -> Result<ServerConfigLayer, ConfigError>;
}

/// Built-in defaults live in each section's `finalize`, so this layer is empty.
pub struct DefaultsSource;

impl ConfigSource for DefaultsSource {
	fn name(&self) -> &'static str {
		"defaults"
	}

	fn precedence(&self) -> Precedence {
		Precedence::Defaults
	}

	fn load(&self) -> Result<ServerConfigLayer, ConfigError> {
		Ok(ServerConfigLayer::default())
	}
}

pub struct TomlSource {
	path: PathBuf,
}

impl TomlSource {
	pub fn new(path: impl Into<PathBuf>) -> Self {
		Self { path: path.into() }
	}

	pub fn system() -> Self {
		Self::new("/etc/otogram/server.toml")
	}
}

impl ConfigSource for TomlSource {
	fn name(&self) -> &'static str {
		"toml-config"
	}

	fn precedence(&self) -> Precedence {
		Precedence::ConfigFile
	}

	fn load(&self) -> Result<ServerConfigLayer, ConfigError> {
		if !self.path.exists() {
			debug!(path = %self.path.display(), "config file not found, skipping");
			return Ok(ServerConfigLayer::default());
		}

		debug!(path = %self.path.display(), "loading config file");
		let content = std::fs::read_to_string(&self.path).map_err(|e| ConfigError::FileRead {
			path: self.path.clone(),
			source: e,
		})?;

		let layer: ServerConfigLayer =
			toml::from_str(&content).map_err(|e| ConfigError::TomlParse {
				path: self.path.clone(),
				source: e,
			})?;

		trace!("parsed config layer from TOML");
		Ok(layer)
	}
}

/// Environment variable source.
///
/// Convention: `OTOGRAM_SERVER_<SECTION>_<FIELD>`. The bare names used by
/// earlier deployments (`FRONTEND_URL`, `SESSION_SECRET`,
/// `SPOTIFY_CLIENT_ID`, ...) are read as fallbacks.
pub struct EnvSource;

impl ConfigSource for EnvSource {
	fn name(&self) -> &'static str {
		"environment"
	}

	fn precedence(&self) -> Precedence {
		Precedence::Environment
	}

	fn load(&self) -> Result<ServerConfigLayer, ConfigError> {
		debug!("loading environment variables");
		load_layer(&Env::process())
	}
}

/// Variable lookup, swappable so tests need not touch the process
/// environment.
pub(crate) struct Env<'a> {
	lookup: Box<dyn Fn(&str) -> Option<String> + 'a>,
}

impl<'a> Env<'a> {
	fn process() -> Self {
		Self {
			lookup: Box::new(|name: &str| std::env::var(name).ok()),
		}
	}

	#[cfg(test)]
	pub(crate) fn from_fn(lookup: impl Fn(&str) -> Option<String> + 'a) -> Self {
		Self {
			lookup: Box::new(lookup),
		}
	}

	fn var(&self, name: &str) -> Option<String> {
		(self.lookup)(name).filter(|s| !s.is_empty())
	}

	/// First non-empty value among `names`.
	fn first<S: AsRef<str>>(&self, names: &[S]) -> Option<String> {
		names.iter().find_map(|name| self.var(name.as_ref()))
	}

	fn bool(&self, name: &str) -> Option<bool> {
		self
			.var(name)
			.map(|v| v.eq_ignore_ascii_case("true") || v == "1")
	}

	fn parse<T: std::str::FromStr>(&self, name: &str, kind: &str) -> Result<Option<T>, ConfigError> {
		match self.var(name) {
			Some(v) => v.parse().map(Some).map_err(|_| ConfigError::InvalidValue {
				key: name.to_string(),
				message: format!("invalid {kind} value '{v}'"),
			}),
			None => Ok(None),
		}
	}

	/// Reads `NAME_FILE` (a path whose contents are the secret) before `NAME`.
	fn secret<S: AsRef<str>>(&self, names: &[S]) -> Result<Option<SecretString>, ConfigError> {
		for name in names.iter().map(|n| n.as_ref()) {
			let file_var = format!("{name}_FILE");
			if let Some(path) = self.var(&file_var) {
				let content = std::fs::read_to_string(&path)
					.map_err(|e| ConfigError::Secret(format!("{file_var}={path}: {e}")))?;
				let value = content.strip_suffix('\n').unwrap_or(&content).to_string();
				return Ok(Some(SecretString::new(value)));
			}
			if let Some(value) = self.var(name) {
				return Ok(Some(SecretString::new(value)));
			}
		}
		Ok(None)
	}
}

pub(crate) fn load_layer(env: &Env<'_>) -> Result<ServerConfigLayer, ConfigError> {
	Ok(ServerConfigLayer {
		http: Some(load_http(env)?),
		database: Some(load_database(env)?),
		session: Some(load_session(env)?),
		oauth: Some(load_oauth(env)?),
		uploads: Some(load_uploads(env)?),
		crosspost: Some(load_crosspost(env)?),
		logging: Some(load_logging(env)?),
	})
}

fn load_http(env: &Env<'_>) -> Result<HttpConfigLayer, ConfigError> {
	Ok(HttpConfigLayer {
		host: env.var("OTOGRAM_SERVER_HOST"),
		port: env.parse("OTOGRAM_SERVER_PORT", "u16")?,
		base_url: env.first(&["OTOGRAM_SERVER_BASE_URL", "BACKEND_URL"]),
		frontend_url: env.first(&["OTOGRAM_SERVER_FRONTEND_URL", "FRONTEND_URL"]),
	})
}

fn load_database(env: &Env<'_>) -> Result<DatabaseConfigLayer, ConfigError> {
	Ok(DatabaseConfigLayer {
		url: env.first(&["OTOGRAM_SERVER_DATABASE_URL", "DATABASE_URL"]),
		connect_attempts: env.parse("OTOGRAM_SERVER_DATABASE_CONNECT_ATTEMPTS", "u32")?,
		connect_retry_delay_secs: env.parse("OTOGRAM_SERVER_DATABASE_CONNECT_RETRY_DELAY_SECS", "u64")?,
	})
}

fn load_session(env: &Env<'_>) -> Result<SessionConfigLayer, ConfigError> {
	Ok(SessionConfigLayer {
		cookie_name: env.first(&["OTOGRAM_SERVER_SESSION_COOKIE_NAME", "SESSION_COOKIE_NAME"]),
		secret: env.secret(&["OTOGRAM_SERVER_SESSION_SECRET", "SESSION_SECRET"])?,
		max_age_secs: env.parse("OTOGRAM_SERVER_SESSION_MAX_AGE_SECS", "u64")?,
		secure: env.bool("OTOGRAM_SERVER_SESSION_SECURE"),
	})
}

fn load_provider(env: &Env<'_>, provider: &str) -> Result<ProviderOAuthConfigLayer, ConfigError> {
	let prefixed = |field: &str| format!("OTOGRAM_SERVER_{provider}_{field}");
	let bare = |field: &str| format!("{provider}_{field}");

	let scopes = env.var(&prefixed("SCOPES")).map(|s| {
		s.split([',', ' '])
			.map(|s| s.trim().to_string())
			.filter(|s| !s.is_empty())
			.collect()
	});

	Ok(ProviderOAuthConfigLayer {
		client_id: env.first(&[prefixed("CLIENT_ID"), bare("CLIENT_ID")]),
		client_secret: env.secret(&[prefixed("CLIENT_SECRET"), bare("CLIENT_SECRET")])?,
		redirect_uri: env.first(&[prefixed("REDIRECT_URI"), bare("REDIRECT_URI")]),
		scopes,
	})
}

fn load_oauth(env: &Env<'_>) -> Result<OAuthConfigLayer, ConfigError> {
	Ok(OAuthConfigLayer {
		spotify: load_provider(env, "SPOTIFY")?,
		twitter: load_provider(env, "TWITTER")?,
	})
}

fn load_uploads(env: &Env<'_>) -> Result<UploadsConfigLayer, ConfigError> {
	Ok(UploadsConfigLayer {
		dir: env.var("OTOGRAM_SERVER_UPLOADS_DIR"),
		max_bytes: env.parse("OTOGRAM_SERVER_UPLOADS_MAX_BYTES", "usize")?,
	})
}

fn load_crosspost(env: &Env<'_>) -> Result<CrossPostConfigLayer, ConfigError> {
	Ok(CrossPostConfigLayer {
		queue_capacity: env.parse("OTOGRAM_SERVER_CROSSPOST_QUEUE_CAPACITY", "usize")?,
		shutdown_timeout_secs: env.parse("OTOGRAM_SERVER_CROSSPOST_SHUTDOWN_TIMEOUT_SECS", "u64")?,
	})
}

fn load_logging(env: &Env<'_>) -> Result<LoggingConfigLayer, ConfigError> {
	let format = match env.var("OTOGRAM_SERVER_LOG_FORMAT") {
		Some(v) => Some(v.parse::<LogFormat>().map_err(|message| ConfigError::InvalidValue {
			key: "OTOGRAM_SERVER_LOG_FORMAT".to_string(),
			message,
		})?),
		None => None,
	};

	Ok(LoggingConfigLayer {
		level: env.var("OTOGRAM_SERVER_LOG_LEVEL"),
		format,
	})
}
