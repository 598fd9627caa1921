#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

use std::path::{Path, PathBuf};

use bon::Builder;

use super::{
    GradingError,
    feedback::{FeedbackEntry, OutcomeKind},
};
use crate::{
    constants::{
        BUILTIN_MARKER, COMPARE_EXTENSION, HDL_EXTENSION, OUTPUT_EXTENSION, TEST_SCRIPT_EXTENSION,
    },
    decode::{Decoded, read_source},
    hdl::{HdlProject, Toolchain, VisibilityError, VisibilityGate, flatten},
    util::{copy_tree, remove_files_with_extensions},
};

/// Builds a `GradingError` entry for `test`.
fn error_entry(test: &str, detail: impl Into<String>) -> FeedbackEntry {
    FeedbackEntry::new(test, OutcomeKind::GradingError).with_detail(detail)
}

/// Renders an error with its whole source chain on one line.
fn describe(e: impl std::error::Error + Send + Sync + 'static) -> String {
    format!("{:#}", anyhow::Error::from(e))
}

/// Grades chips of one project inside an already staged workspace.
///
/// ```no_run
/// # async fn demo(toolchain: hdlgrade::hdl::NandToolchain) -> anyhow::Result<()> {
/// use hdlgrade::{grade::ProjectGrader, hdl::HdlProject};
///
/// let project = HdlProject::by_number(3).unwrap();
/// let _entries = ProjectGrader::builder()
///     .workspace(std::path::Path::new("grader/temp/temp-1234"))
///     .project(&project)
///     .fixtures("grader/tests/p3")
///     .tests(vec!["RAM8".to_string()])
///     .toolchain(&toolchain)
///     .build()
///     .run()
///     .await?;
/// # Ok(())
/// # }
/// ```
#[derive(Builder)]
pub struct ProjectGrader<'a, T> {
    /// Workspace root the simulator runs in.
    workspace: &'a Path,
    /// Project whose roster is hidden while grading.
    project:   &'a HdlProject,
    /// Fixture set copied into the workspace root.
    #[builder(into)]
    fixtures:  PathBuf,
    /// Chips to grade, in canonical spelling.
    tests:     Vec<String>,
    /// Simulator used to run each chip.
    toolchain: &'a T,
}

impl<T: Toolchain> ProjectGrader<'_, T> {
    /// Prepares the workspace and grades every requested chip.
    ///
    /// Returns one entry per finding; an empty list means every chip passed.
    /// Problems with a single chip become entries, while problems with the
    /// workspace itself abort with an error.
    pub async fn run(&self) -> Result<Vec<FeedbackEntry>, GradingError> {
        let root = self.workspace;

        let report = flatten(root, HDL_EXTENSION, self.project.chips());
        tracing::info!(
            "Placed {} chip source(s), skipped {} problem(s)",
            report.placed().len(),
            report.issues().len()
        );

        let removed = remove_files_with_extensions(root, &[
            TEST_SCRIPT_EXTENSION,
            COMPARE_EXTENSION,
            OUTPUT_EXTENSION,
        ])
        .map_err(|source| GradingError::Scrub {
            path: root.to_path_buf(),
            source,
        })?;
        for path in &removed {
            tracing::warn!("Removed submitted test file {}", path.display());
        }

        if !self.fixtures.is_dir() {
            return Err(GradingError::MissingFixtures(self.fixtures.clone()));
        }
        copy_tree(&self.fixtures, root).map_err(|source| GradingError::Fixtures {
            path: self.fixtures.clone(),
            source,
        })?;

        let gate = VisibilityGate::new(root, HDL_EXTENSION, self.project.chips().iter().cloned());
        gate.hide_all()?;

        let mut entries = Vec::new();
        for test in &self.tests {
            let found = self.grade_chip(&gate, test).await;
            if found.is_empty() {
                tracing::info!("{test} passed");
            }
            entries.extend(found);
        }

        Ok(entries)
    }

    /// Reveals, inspects, and simulates one chip.
    async fn grade_chip(&self, gate: &VisibilityGate, test: &str) -> Vec<FeedbackEntry> {
        let mut entries = Vec::new();

        let revealed = match gate.reveal(test) {
            Ok(revealed) => revealed,
            Err(VisibilityError::FileMissing(_)) => {
                entries.push(FeedbackEntry::new(test, OutcomeKind::FileMissing));
                return entries;
            }
            Err(e) => {
                entries.push(error_entry(test, describe(e)));
                return entries;
            }
        };

        match read_source(&revealed.path()) {
            Ok(Decoded::Text(code)) => {
                if code.to_lowercase().contains(BUILTIN_MARKER) {
                    entries.push(FeedbackEntry::new(test, OutcomeKind::DisallowedBuiltin));
                }
            }
            Ok(Decoded::Failure { encoding }) => {
                entries.push(error_entry(
                    test,
                    format!("{test}.hdl could not be read as text (closest guess: {encoding})"),
                ));
                return entries;
            }
            Err(e) => {
                entries.push(error_entry(test, format!("{e:#}")));
                return entries;
            }
        }

        let outcome = self.toolchain.simulate(self.workspace, test).await;

        if let Err(e) = revealed.conceal() {
            tracing::error!("{test} could not be hidden again: {e}");
            entries.push(error_entry(test, describe(e)));
        }

        match outcome {
            Ok(diff) if diff.is_empty() => {}
            Ok(diff) => {
                entries.push(FeedbackEntry::new(test, OutcomeKind::SimulationDiff).with_detail(diff))
            }
            Err(e) => {
                tracing::warn!("Simulating {test} failed: {e:#}");
                entries.push(error_entry(test, format!("{e:#}")));
            }
        }

        entries
    }
}
