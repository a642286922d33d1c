//! ---
//! thalos_section: "14-versioning"
//! thalos_subsection: "module"
//! thalos_type: "source"
//! thalos_scope: "code"
//! thalos_description: "Version metadata helpers."
//! thalos_version: "v1.0.0"
//! thalos_owner: "core"
//! ---
use serde::Serialize;

const UNKNOWN: &str = "UNKNOWN";

/// Build metadata for `--version` output, emitted by `vergen` in `build.rs`.
///
/// `THALOS_GIT_SHA` set at compile time takes precedence over the detected
/// git revision, for release pipelines that build outside a checkout.
#[derive(Debug, Clone, Serialize)]
pub struct VersionInfo {
    /// Workspace semantic version.
    pub semver: String,
    /// Git commit hash captured at build time.
    pub git_sha: String,
    /// RFC 3339 build timestamp.
    pub build_timestamp: String,
    /// Target triple the binary was compiled for.
    pub target: String,
}

impl VersionInfo {
    #[must_use]
    pub fn current() -> Self {
        let git_sha = match option_env!("THALOS_GIT_SHA") {
            Some(sha) if !sha.trim().is_empty() => sha,
            _ => option_env!("VERGEN_GIT_SHA").unwrap_or(UNKNOWN),
        };
        Self {
            semver: env!("CARGO_PKG_VERSION").to_owned(),
            git_sha: git_sha.to_owned(),
            build_timestamp: option_env!("VERGEN_BUILD_TIMESTAMP")
                .unwrap_or(UNKNOWN)
                .to_owned(),
            target: option_env!("VERGEN_CARGO_TARGET_TRIPLE")
                .unwrap_or(UNKNOWN)
                .to_owned(),
        }
    }

    /// Returns a concise CLI string combining semantic version and git hash.
    #[must_use]
    pub fn cli_string(&self) -> String {
        format!("{} ({})", self.semver, self.git_sha)
    }

    /// Multi-line output for `-V`.
    #[must_use]
    pub fn extended(&self) -> String {
        format!(
            "{}\nbuilt: {}\ntarget: {}",
            self.cli_string(),
            self.build_timestamp,
            self.target
        )
    }

    /// Human readable banner used in logging surfaces.
    #[must_use]
    pub fn banner(&self) -> String {
        format!("Thalos v{} (git {})", self.semver, self.git_sha)
    }
}
