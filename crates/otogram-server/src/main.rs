// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! otogram server binary.

use clap::{Parser, Subcommand};
use otogram_server::api::{cors_layer, create_app_state, create_router};
use otogram_server::version::format_version_info;
use otogram_server_config::LogFormat;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// otogram server - song posts, likes, replies and OAuth login.
#[derive(Parser, Debug)]
#[command(name = "otogram-server", about = "otogram HTTP server", version)]
struct Args {
	/// Configuration file (defaults to /etc/otogram/server.toml)
	#[arg(long, env = "OTOGRAM_SERVER_CONFIG")]
	config: Option<PathBuf>,

	#[command(subcommand)]
	command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
	/// Show version and build information
	Version,
}

/// Load the `.env` file, then parse arguments, so `env = ..` fallbacks see
/// variables defined there. With no `env_file` the usual lookup from the
/// working directory is used.
fn parse_args<I, T>(env_file: Option<&Path>, argv: I) -> Args
where
	I: IntoIterator<Item = T>,
	T: Into<OsString> + Clone,
{
	match env_file {
		Some(path) => dotenvy::from_path(path).ok(),
		None => dotenvy::dotenv().ok().map(|_| ()),
	};
	Args::parse_from(argv)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
	let args = parse_args(None, std::env::args_os());

	if let Some(Command::Version) = args.command {
		println!("{}", format_version_info());
		return Ok(());
	}

	let config = match &args.config {
		Some(path) => otogram_server_config::load_config_with_file(path)?,
		None => otogram_server_config::load_config()?,
	};

	let registry = tracing_subscriber::registry().with(
		tracing_subscriber::EnvFilter::try_from_default_env()
			.unwrap_or_else(|_| config.logging.level.clone().into()),
	);
	match config.logging.format {
		LogFormat::Json => registry.with(tracing_subscriber::fmt::layer().json()).init(),
		LogFormat::Text => registry.with(tracing_subscriber::fmt::layer()).init(),
	}

	tracing::info!(
		host = %config.http.host,
		port = config.http.port,
		database = %config.database.url,
		"starting otogram-server"
	);

	let pool = otogram_server::db::connect_with_retry(
		&config.database.url,
		config.database.connect_attempts,
		config.database.connect_retry_delay,
	)
	.await?;
	otogram_server::db::run_migrations(&pool).await?;

	tokio::fs::create_dir_all(&config.uploads.dir).await?;

	let state = create_app_state(pool, &config).await;
	let crosspost = state.crosspost.clone();

	let app = create_router(state)
		.layer(TraceLayer::new_for_http())
		.layer(cors_layer(&config.http.frontend_url));

	let addr = config.socket_addr();
	tracing::info!("listening on {}", addr);

	let listener = tokio::net::TcpListener::bind(&addr).await?;

	tokio::select! {
		result = axum::serve(listener, app) => {
			if let Err(e) = result {
				tracing::error!(error = %e, "Server error");
			}
		}
		_ = tokio::signal::ctrl_c() => {
			tracing::info!("Received shutdown signal");
		}
	}

	if let Some(crosspost) = crosspost {
		tracing::info!("Draining cross-post queue...");
		if !crosspost.shutdown(config.crosspost.shutdown_timeout).await {
			tracing::warn!("cross-post queue did not drain before the timeout");
		}
	}

	tracing::info!("Server shutdown complete");
	Ok(())
}
