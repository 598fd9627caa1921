#![allow(dead_code)]

use std::{
    collections::HashMap,
    fs,
    path::{Path, PathBuf},
    sync::Mutex,
};

use anyhow::anyhow;
use hdlgrade::{config::GraderConfig, hdl::Toolchain};

/// Creates an empty, uniquely named directory under the system temp dir.
pub fn sandbox(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("hdlgrade-{name}-{}", uuid::Uuid::new_v4()));
    fs::create_dir_all(&dir).expect("create sandbox");
    dir
}

/// Writes `contents` to `root/relative`, creating parent directories.
pub fn write(root: &Path, relative: &str, contents: impl AsRef<[u8]>) -> PathBuf {
    let path = root.join(relative);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("create parent");
    }
    fs::write(&path, contents).expect("write file");
    path
}

/// A minimal chip definition that does not use the built-in implementation.
pub fn chip_source(chip: &str) -> String {
    format!("CHIP {chip} {{\n    IN in;\n    OUT out;\n    PARTS:\n    Not(in=in, out=out);\n}}\n")
}

/// Writes `<chip>.tst` and `<chip>.cmp` for every chip into the `p<N>`
/// fixture directory under `fixture_root`.
pub fn fixtures(fixture_root: &Path, project: u8, chips: &[&str]) {
    for chip in chips {
        write(
            fixture_root,
            &format!("p{project}/{chip}.tst"),
            format!("load {chip}.hdl,\noutput-file {chip}.out,\ncompare-to {chip}.cmp;\n"),
        );
        write(fixture_root, &format!("p{project}/{chip}.cmp"), "|time|in|out|\n|0|0|1|\n");
    }
}

/// Configuration rooted inside `sandbox`.
pub fn config(sandbox: &Path) -> GraderConfig {
    GraderConfig::builder()
        .temp_root(sandbox.join("temp"))
        .fixture_root(sandbox.join("fixtures"))
        .build()
}

/// Workspaces left under the sandbox's temp root.
pub fn workspaces(sandbox: &Path) -> Vec<PathBuf> {
    match fs::read_dir(sandbox.join("temp")) {
        Ok(entries) => entries
            .filter_map(Result::ok)
            .map(|entry| entry.path())
            .collect(),
        Err(_) => Vec::new(),
    }
}

/// What the scripted simulator saw on one call.
#[derive(Debug, Clone)]
pub struct Call {
    /// Chip it was asked to run.
    pub chip:    String,
    /// `.hdl` files present in the workspace root at the time.
    pub visible: Vec<String>,
    /// Contents of `<chip>.tst`, if present.
    pub script:  Option<String>,
}

/// How the scripted simulator answers for a chip.
#[derive(Debug, Clone)]
pub enum Response {
    /// Report this mismatch text.
    Diff(String),
    /// Fail to run.
    Fail(String),
}

/// In-process stand-in for the hardware simulator.
#[derive(Debug, Default)]
pub struct ScriptedToolchain {
    /// Answers per chip; chips without one pass.
    responses: HashMap<String, Response>,
    /// Every call, in order.
    calls:     Mutex<Vec<Call>>,
}

impl ScriptedToolchain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(mut self, chip: &str, response: Response) -> Self {
        self.responses.insert(chip.to_string(), response);
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().expect("lock calls").clone()
    }
}

impl Toolchain for ScriptedToolchain {
    async fn simulate(&self, workspace: &Path, chip: &str) -> anyhow::Result<String> {
        let mut visible: Vec<String> = fs::read_dir(workspace)?
            .filter_map(Result::ok)
            .map(|entry| entry.file_name().to_string_lossy().into_owned())
            .filter(|name| name.to_ascii_lowercase().ends_with(".hdl"))
            .collect();
        visible.sort();
        let script = fs::read_to_string(workspace.join(format!("{chip}.tst"))).ok();

        self.calls.lock().expect("lock calls").push(Call {
            chip: chip.to_string(),
            visible,
            script,
        });

        match self.responses.get(chip) {
            Some(Response::Diff(diff)) => Ok(diff.clone()),
            Some(Response::Fail(message)) => Err(anyhow!(message.clone())),
            None => Ok(String::new()),
        }
    }
}
