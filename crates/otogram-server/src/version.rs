// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Build information for `otogram-server version`.

pub use otogram_common_version::BuildInfo;

/// Format version info for display.
pub fn format_version_info() -> String {
	use chrono::{DateTime, Utc};

	let info = BuildInfo::current();

	let mut output = format!(
		"otogram-server version: {}\n\
         Git SHA:                {}\n\
         Built at:               {}\n\
         Platform:               {}",
		info.version, info.git_sha, info.build_timestamp, info.platform,
	);

	if let Ok(built_at) = DateTime::parse_from_rfc3339(info.build_timestamp)
		.or_else(|_| DateTime::parse_from_str(info.build_timestamp, "%Y-%m-%d %H:%M:%S %:z"))
	{
		let built_at_utc: DateTime<Utc> = built_at.into();
		let age = Utc::now().signed_duration_since(built_at_utc);

		if let Ok(std_duration) = age.to_std() {
			output.push_str(&format!(
				"\nBuild age:              {}",
				humantime::format_duration(std::time::Duration::from_secs(std_duration.as_secs()))
			));
		}
	}

	output
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn version_info_names_the_binary() {
		let output = format_version_info();
		assert!(output.starts_with("otogram-server version: "));
		assert!(output.contains(BuildInfo::current().git_sha));
		assert!(output.contains("Platform:"));
	}
}
