#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

use std::{io, path::PathBuf};

use bon::Builder;
use thiserror::Error;

/// Stage-by-stage grading of one staged workspace.
pub mod engine;
/// Feedback entries, the message catalog, and scoring.
pub mod feedback;
/// Grades and the report returned to callers.
pub mod results;

pub use engine::ProjectGrader;
pub use feedback::{FULL_MARKS, FeedbackEntry, FormattedFeedback, OutcomeKind};
pub use results::{Grade, GradeReport};

use crate::{
    config::GraderConfig,
    constants::PASS_MESSAGE,
    hdl::{HdlProject, Toolchain, VisibilityError},
    workspace::{StagingError, Workspace},
};

/// Failures that stop a whole request rather than a single test.
#[derive(Error, Debug)]
pub enum GradingError {
    /// The requested chip is not part of any known project.
    #[error("`{0}` is not a chip of any known project")]
    UnknownChip(String),
    /// The requested project number is not in the catalog.
    #[error("Project {0} is not in the catalog")]
    UnknownProject(u8),
    /// The requested chip belongs to a different project.
    #[error("`{chip}` is not part of project {project}")]
    NotInProject {
        /// Chip as requested.
        chip:    String,
        /// Project the request named.
        project: u8,
    },
    /// The request named no chips.
    #[error("No chips were requested")]
    NoTests,
    /// The submission could not be staged.
    #[error(transparent)]
    Staging(#[from] StagingError),
    /// Submitted test files could not be removed.
    #[error("Could not remove submitted test files under `{path}`")]
    Scrub {
        /// Workspace being scrubbed.
        path:   PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },
    /// The fixture set for the project does not exist.
    #[error("Fixture directory `{0}` does not exist")]
    MissingFixtures(PathBuf),
    /// The fixture set could not be copied into the workspace.
    #[error("Could not copy fixtures from `{path}`")]
    Fixtures {
        /// Fixture directory being copied.
        path:   PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },
    /// Chips could not be hidden before grading.
    #[error(transparent)]
    Visibility(#[from] VisibilityError),
}

/// One request to grade chips of a submission.
///
/// ```no_run
/// # async fn demo() -> anyhow::Result<()> {
/// use hdlgrade::{config::GraderConfig, grade::GradeRequest, hdl::NandToolchain};
///
/// let config = GraderConfig::from_env();
/// let toolchain = NandToolchain::new(None, config.simulator_timeout());
/// let report = GradeRequest::builder()
///     .submission("submissions/alice")
///     .tests(vec!["RAM8".to_string()])
///     .build()
///     .run(&config, &toolchain)
///     .await?;
/// println!("{}", report.feedback);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Builder)]
pub struct GradeRequest {
    /// Student directory to grade; it is copied, never modified.
    #[builder(into)]
    submission: PathBuf,
    /// Chips to grade, in any letter case.
    tests:      Vec<String>,
    /// Project the chips belong to; inferred from the first chip when unset.
    project:    Option<u8>,
}

impl GradeRequest {
    /// Works out which project the request is for.
    fn resolve_project(&self) -> Result<HdlProject, GradingError> {
        let first = self.tests.first().ok_or(GradingError::NoTests)?;
        match self.project {
            Some(number) => {
                HdlProject::by_number(number).ok_or(GradingError::UnknownProject(number))
            }
            None => {
                HdlProject::for_chip(first).ok_or_else(|| GradingError::UnknownChip(first.clone()))
            }
        }
    }

    /// Maps every requested chip to its canonical spelling in `project`.
    fn canonical_tests(&self, project: &HdlProject) -> Result<Vec<String>, GradingError> {
        let mut tests: Vec<String> = Vec::with_capacity(self.tests.len());
        for test in &self.tests {
            let canonical = project.canonical(test).ok_or_else(|| GradingError::NotInProject {
                chip:    test.clone(),
                project: project.number(),
            })?;
            if !tests.iter().any(|t| t == canonical) {
                tests.push(canonical.to_string());
            }
        }
        Ok(tests)
    }

    /// Stages the submission, grades every requested chip, and scores the
    /// result.
    pub async fn run<T: Toolchain>(
        &self,
        config: &GraderConfig,
        toolchain: &T,
    ) -> Result<GradeReport, GradingError> {
        let project = self.resolve_project()?;
        let tests = self.canonical_tests(&project)?;
        tracing::info!("Grading {} for project {}", tests.join(", "), project.number());

        let mut workspace = Workspace::stage(&self.submission, config.temp_root())?;
        if config.keep_workspace() {
            workspace.keep();
        }

        let entries = ProjectGrader::builder()
            .workspace(workspace.root())
            .project(&project)
            .fixtures(config.fixture_root().join(project.fixture_dir_name()))
            .tests(tests.clone())
            .toolchain(toolchain)
            .build()
            .run()
            .await?;

        let mut feedback = FormattedFeedback::new(project.number());
        for entry in entries {
            feedback.push(entry);
        }
        let (grade, text) = feedback.get();
        let text = if text.is_empty() {
            PASS_MESSAGE.to_string()
        } else {
            text
        };
        tracing::info!("Finished grading: {grade}");

        Ok(GradeReport {
            project: project.number(),
            tests,
            grade,
            feedback: text,
            entries: feedback.entries().to_vec(),
        })
    }
}
