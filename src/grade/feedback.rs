#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

use std::fmt::Display;

use serde::{Deserialize, Serialize};

use super::results::Grade;

/// Points a request can earn.
pub const FULL_MARKS: f64 = 100.0;

/// Why a test produced feedback. A test with no entries passed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeKind {
    /// No source was submitted for the chip.
    FileMissing,
    /// The chip delegates to the simulator's built-in implementation.
    DisallowedBuiltin,
    /// The simulator reported a mismatch against the expected output.
    SimulationDiff,
    /// The chip could not be graded (unreadable source, simulator failure).
    GradingError,
}

impl OutcomeKind {
    /// Points deducted for one entry of this kind.
    pub fn penalty(self) -> f64 {
        match self {
            OutcomeKind::FileMissing
            | OutcomeKind::DisallowedBuiltin
            | OutcomeKind::SimulationDiff
            | OutcomeKind::GradingError => FULL_MARKS,
        }
    }

    /// Message shown to the student for `test`.
    fn message(self, test: &str) -> String {
        match self {
            OutcomeKind::FileMissing => {
                format!("{test}: {test}.hdl was not found in your submission.")
            }
            OutcomeKind::DisallowedBuiltin => format!(
                "{test}: {test}.hdl uses the simulator's built-in chip instead of your own \
                 implementation."
            ),
            OutcomeKind::SimulationDiff => {
                format!("{test}: the simulator's output does not match the expected output.")
            }
            OutcomeKind::GradingError => format!("{test}: your chip could not be graded."),
        }
    }
}

impl Display for OutcomeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let key = match self {
            OutcomeKind::FileMissing => "file_missing",
            OutcomeKind::DisallowedBuiltin => "built_in_chip",
            OutcomeKind::SimulationDiff => "diff_with_chip",
            OutcomeKind::GradingError => "grading_error",
        };
        f.write_str(key)
    }
}

/// One finding about one test.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedbackEntry {
    /// Chip the finding is about.
    pub test:   String,
    /// What was found.
    pub kind:   OutcomeKind,
    /// Extra text for the student, such as the simulator's diff.
    pub detail: Option<String>,
}

impl FeedbackEntry {
    /// Creates an entry without detail.
    pub fn new(test: impl Into<String>, kind: OutcomeKind) -> Self {
        Self {
            test: test.into(),
            kind,
            detail: None,
        }
    }

    /// Attaches detail text to the entry.
    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }
}

/// Accumulates entries for one project and turns them into a grade and
/// feedback text.
#[derive(Debug, Clone)]
pub struct FormattedFeedback {
    /// Project the feedback is for.
    project: u8,
    /// Entries in the order they were appended.
    entries: Vec<FeedbackEntry>,
}

impl FormattedFeedback {
    /// Starts empty feedback for `project`.
    pub fn new(project: u8) -> Self {
        Self {
            project,
            entries: Vec::new(),
        }
    }

    /// Project the feedback is for.
    pub fn project(&self) -> u8 {
        self.project
    }

    /// Records one finding.
    pub fn append(&mut self, test: impl Into<String>, kind: OutcomeKind, detail: Option<String>) {
        self.entries.push(FeedbackEntry {
            test: test.into(),
            kind,
            detail,
        });
    }

    /// Records an entry produced elsewhere.
    pub fn push(&mut self, entry: FeedbackEntry) {
        self.entries.push(entry);
    }

    /// Entries recorded so far.
    pub fn entries(&self) -> &[FeedbackEntry] {
        &self.entries
    }

    /// Returns the grade and the feedback text; the text is empty when
    /// nothing was recorded.
    pub fn get(&self) -> (Grade, String) {
        let penalty: f64 = self.entries.iter().map(|entry| entry.kind.penalty()).sum();
        let grade = Grade::new((FULL_MARKS - penalty).max(0.0), FULL_MARKS);

        let text = self
            .entries
            .iter()
            .map(|entry| match entry.detail.as_deref() {
                Some(detail) if !detail.trim().is_empty() => {
                    format!("{}\n{}", entry.kind.message(&entry.test), detail.trim_end())
                }
                _ => entry.kind.message(&entry.test),
            })
            .collect::<Vec<_>>()
            .join("\n\n");

        (grade, text)
    }
}
