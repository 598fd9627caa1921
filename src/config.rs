#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

use std::{
    path::{Path, PathBuf},
    time::Duration,
};

use bon::Builder;

use crate::constants::{DEFAULT_FIXTURE_ROOT, DEFAULT_SIMULATOR_TIMEOUT_SECS, DEFAULT_TEMP_ROOT};

/// Settings shared by every stage of a grading request.
///
/// The grader never reaches for a process-wide value: each stage receives the
/// configuration it needs explicitly, so several graders (or tests) in one
/// process can point at different sandboxes.
#[derive(Debug, Clone, Builder)]
pub struct GraderConfig {
    /// Directory under which per-request workspaces are created.
    #[builder(into, default = PathBuf::from(DEFAULT_TEMP_ROOT))]
    temp_root:         PathBuf,
    /// Directory holding one `p<N>` fixture subtree per project.
    #[builder(into, default = PathBuf::from(DEFAULT_FIXTURE_ROOT))]
    fixture_root:      PathBuf,
    /// Directory containing the simulator scripts; `PATH` is searched when
    /// unset.
    #[builder(into)]
    tools_dir:         Option<PathBuf>,
    /// Leave workspaces behind after grading, for debugging.
    #[builder(default)]
    keep_workspace:    bool,
    /// Wall-clock limit for one simulator invocation.
    #[builder(default = Duration::from_secs(DEFAULT_SIMULATOR_TIMEOUT_SECS))]
    simulator_timeout: Duration,
}

impl Default for GraderConfig {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl GraderConfig {
    /// Builds a configuration from `HDLGRADE_*` environment variables, using
    /// defaults for anything unset.
    pub fn from_env() -> Self {
        let temp_root = env_path("HDLGRADE_TEMP_DIR").unwrap_or_else(|| DEFAULT_TEMP_ROOT.into());
        let fixture_root =
            env_path("HDLGRADE_FIXTURES_DIR").unwrap_or_else(|| DEFAULT_FIXTURE_ROOT.into());
        let keep_workspace = std::env::var("HDLGRADE_KEEP_WORKSPACE")
            .map(|value| matches!(value.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
            .unwrap_or(false);

        Self::builder()
            .temp_root(temp_root)
            .fixture_root(fixture_root)
            .maybe_tools_dir(env_path("HDLGRADE_TOOLS_DIR"))
            .keep_workspace(keep_workspace)
            .simulator_timeout(read_timeout_secs(
                "HDLGRADE_SIMULATOR_TIMEOUT_SECS",
                DEFAULT_SIMULATOR_TIMEOUT_SECS,
            ))
            .build()
    }

    /// Directory under which per-request workspaces are created.
    pub fn temp_root(&self) -> &Path {
        self.temp_root.as_path()
    }

    /// Directory holding the per-project fixture sets.
    pub fn fixture_root(&self) -> &Path {
        self.fixture_root.as_path()
    }

    /// Directory containing the simulator scripts, if configured.
    pub fn tools_dir(&self) -> Option<&Path> {
        self.tools_dir.as_deref()
    }

    /// Whether workspaces survive the end of a request.
    pub fn keep_workspace(&self) -> bool {
        self.keep_workspace
    }

    /// Wall-clock limit for one simulator invocation.
    pub fn simulator_timeout(&self) -> Duration {
        self.simulator_timeout
    }

    /// Returns a copy with a different temp root.
    pub fn with_temp_root(mut self, temp_root: impl Into<PathBuf>) -> Self {
        self.temp_root = temp_root.into();
        self
    }

    /// Returns a copy with a different fixture root.
    pub fn with_fixture_root(mut self, fixture_root: impl Into<PathBuf>) -> Self {
        self.fixture_root = fixture_root.into();
        self
    }

    /// Returns a copy with a different tools directory.
    pub fn with_tools_dir(mut self, tools_dir: impl Into<PathBuf>) -> Self {
        self.tools_dir = Some(tools_dir.into());
        self
    }

    /// Returns a copy that keeps (or removes) workspaces after grading.
    pub fn with_keep_workspace(mut self, keep: bool) -> Self {
        self.keep_workspace = keep;
        self
    }
}

/// Reads a non-empty path from the environment.
fn env_path(env: &str) -> Option<PathBuf> {
    std::env::var(env)
        .ok()
        .map(|value| value.trim().to_owned())
        .filter(|value| !value.is_empty())
        .map(PathBuf::from)
}

/// Parses an environment variable into a `Duration`, falling back to
/// `default_secs` when parsing fails or the variable is missing.
fn read_timeout_secs(env: &str, default_secs: u64) -> Duration {
    std::env::var(env)
        .ok()
        .and_then(|value| value.trim().parse::<u64>().ok())
        .map(Duration::from_secs)
        .unwrap_or_else(|| Duration::from_secs(default_secs))
}
