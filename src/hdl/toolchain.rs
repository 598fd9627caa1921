use std::{
    ffi::OsString,
    future::Future,
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::{Context, Result, bail};
use similar::TextDiff;
use which::which;

use crate::{
    constants::{COMPARE_EXTENSION, OUTPUT_EXTENSION, TEST_SCRIPT_EXTENSION},
    parsers::{SimulatorVerdict, simulator_verdict},
    process::run_tool,
    util::eq_ignoring_whitespace,
};

/// The external suite that executes chips against their test scripts.
pub trait Toolchain {
    /// Runs `<chip>.tst` from `workspace` in the hardware simulator.
    ///
    /// Resolves to the empty string when every comparison matched, and to a
    /// human-readable description of the mismatch otherwise. An `Err` means
    /// the simulator could not be run at all.
    fn simulate(&self, workspace: &Path, chip: &str) -> impl Future<Output = Result<String>> + Send;
}

/// Programs shipped with the nand2tetris software suite.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tool {
    /// Runs `.hdl` chips against `.tst` scripts.
    HardwareSimulator,
    /// Runs Hack machine code against `.tst` scripts.
    CpuEmulator,
    /// Runs VM code against `.tst` scripts.
    VmEmulator,
}

impl Tool {
    /// Base name of the launcher script.
    fn base_name(self) -> &'static str {
        match self {
            Tool::HardwareSimulator => "HardwareSimulator",
            Tool::CpuEmulator => "CPUEmulator",
            Tool::VmEmulator => "VMEmulator",
        }
    }

    /// File name of the launcher script on this platform.
    pub fn script_name(self) -> String {
        let suffix = if cfg!(windows) { "bat" } else { "sh" };
        format!("{}.{suffix}", self.base_name())
    }
}

/// Runs the nand2tetris launcher scripts as child processes.
#[derive(Debug, Clone)]
pub struct NandToolchain {
    /// Directory holding the launcher scripts; `PATH` is searched when unset.
    tools_dir: Option<PathBuf>,
    /// Wall-clock limit for one run.
    timeout:   Duration,
}

impl NandToolchain {
    /// Creates a toolchain that looks for its scripts in `tools_dir`, or on
    /// `PATH` when `None`.
    pub fn new(tools_dir: Option<PathBuf>, timeout: Duration) -> Self {
        Self { tools_dir, timeout }
    }

    /// Finds the launcher script for `tool`.
    pub fn locate(&self, tool: Tool) -> Result<PathBuf> {
        let script = tool.script_name();
        match &self.tools_dir {
            Some(dir) => {
                let path = dir.join(&script);
                if !path.is_file() {
                    bail!("Cannot find {} in {}", script, dir.display());
                }
                Ok(path)
            }
            None => which(&script).with_context(|| format!("Cannot find {script} on path")),
        }
    }

    /// Runs `<test>.tst` in `workspace` with `tool` and describes any
    /// mismatch; empty when the run passed.
    pub async fn run_script(&self, tool: Tool, workspace: &Path, test: &str) -> Result<String> {
        let script = workspace.join(format!("{test}.{TEST_SCRIPT_EXTENSION}"));
        if !script.is_file() {
            bail!("No test script {} in the workspace", script.display());
        }

        let program = self.locate(tool)?;
        tracing::info!("Running {} on {}", tool.base_name(), script.display());
        let output = run_tool(
            &program,
            &[OsString::from(script.as_os_str())],
            workspace,
            Some(self.timeout),
        )
        .await?;
        let console = output.combined();

        match simulator_verdict(&console) {
            SimulatorVerdict::Passed => Ok(String::new()),
            SimulatorVerdict::ComparisonFailure { line } => {
                comparison_diff(workspace, test, Some(line))
            }
            SimulatorVerdict::HdlError(diag) => Ok(diag.to_string()),
            SimulatorVerdict::Unrecognized => {
                if output.status.success() && outputs_match(workspace, test) {
                    Ok(String::new())
                } else if !console.trim().is_empty() {
                    Ok(console.trim().to_string())
                } else {
                    Ok(format!(
                        "{} exited with {} and printed nothing",
                        tool.base_name(),
                        output.status
                    ))
                }
            }
        }
    }
}

impl Toolchain for NandToolchain {
    async fn simulate(&self, workspace: &Path, chip: &str) -> Result<String> {
        self.run_script(Tool::HardwareSimulator, workspace, chip).await
    }
}

/// Returns true if `<test>.out` and `<test>.cmp` both exist and agree,
/// ignoring whitespace.
fn outputs_match(workspace: &Path, test: &str) -> bool {
    let expected = std::fs::read_to_string(workspace.join(format!("{test}.{COMPARE_EXTENSION}")));
    let actual = std::fs::read_to_string(workspace.join(format!("{test}.{OUTPUT_EXTENSION}")));
    match (expected, actual) {
        (Ok(expected), Ok(actual)) => eq_ignoring_whitespace(&expected, &actual),
        _ => false,
    }
}

/// Describes how `<test>.out` differs from `<test>.cmp` as a unified diff.
pub fn comparison_diff(workspace: &Path, test: &str, line: Option<u32>) -> Result<String> {
    let cmp_name = format!("{test}.{COMPARE_EXTENSION}");
    let out_name = format!("{test}.{OUTPUT_EXTENSION}");
    let expected = std::fs::read_to_string(workspace.join(&cmp_name))
        .with_context(|| format!("Could not read {cmp_name}"))?;
    let actual = std::fs::read_to_string(workspace.join(&out_name)).unwrap_or_default();

    let mut text = match line {
        Some(line) => format!("Comparison failure at line {line}\n"),
        None => String::from("Comparison failure\n"),
    };
    text.push_str(
        &TextDiff::from_lines(&expected, &actual)
            .unified_diff()
            .context_radius(2)
            .header(&cmp_name, &out_name)
            .to_string(),
    );
    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sandbox(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("hdlgrade-{name}-{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&dir).expect("create sandbox");
        dir
    }

    #[test]
    fn diff_shows_expected_and_actual_rows() {
        let dir = sandbox("diff");
        std::fs::write(dir.join("Bit.cmp"), "|time|in|load|out|\n|0+|0|0|0|\n|1|0|0|0|\n")
            .expect("write cmp");
        std::fs::write(dir.join("Bit.out"), "|time|in|load|out|\n|0+|0|0|0|\n|1|0|0|1|\n")
            .expect("write out");

        let diff = comparison_diff(&dir, "Bit", Some(3)).expect("diff");
        assert!(diff.starts_with("Comparison failure at line 3\n"));
        assert!(diff.contains("-|1|0|0|0|"));
        assert!(diff.contains("+|1|0|0|1|"));

        let _ = std::fs::remove_dir_all(dir);
    }

    #[test]
    fn missing_tools_dir_script_is_an_error() {
        let dir = sandbox("tools");
        let toolchain = NandToolchain::new(Some(dir.clone()), Duration::from_secs(1));
        assert!(toolchain.locate(Tool::HardwareSimulator).is_err());
        let _ = std::fs::remove_dir_all(dir);
    }

    #[test]
    fn script_names_follow_the_platform() {
        let name = Tool::CpuEmulator.script_name();
        assert!(name.starts_with("CPUEmulator."));
    }
}
