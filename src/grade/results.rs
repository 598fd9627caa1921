#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

use std::fmt::Display;

use serde::{Deserialize, Serialize};
use tabled::{
    Table, Tabled,
    settings::{Alignment, Modify, Panel, Style, Width, object::Rows},
};

use super::feedback::FeedbackEntry;

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
/// A struct representing a grade
pub struct Grade {
    /// The actual grade received
    pub grade:  f64,
    /// The maximum grade possible
    pub out_of: f64,
}

impl Grade {
    /// Creates a new grade -
    /// * `grade` - The actual grade received
    /// * `out_of` - The maximum grade possible
    pub fn new(grade: f64, out_of: f64) -> Self {
        Self { grade, out_of }
    }

    /// Returns true if the full grade was received.
    pub fn is_full(&self) -> bool {
        self.grade >= self.out_of
    }
}

impl Display for Grade {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.2}/{:.2}", self.grade, self.out_of)
    }
}

/// Everything one grading request produced.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GradeReport {
    /// Project the graded chips belong to.
    pub project:  u8,
    /// Chips that were graded, in canonical spelling.
    pub tests:    Vec<String>,
    /// Score after penalties.
    pub grade:    Grade,
    /// Feedback shown to the student.
    pub feedback: String,
    /// Raw entries the feedback was built from.
    pub entries:  Vec<FeedbackEntry>,
}

impl GradeReport {
    /// Returns true if no test produced an entry.
    pub fn passed(&self) -> bool {
        self.entries.is_empty()
    }

    /// Renders the entries as a table, or `None` when there are none.
    pub fn entry_table(&self) -> Option<String> {
        if self.entries.is_empty() {
            return None;
        }

        let rows = self.entries.iter().map(|entry| EntryRow {
            test:    entry.test.clone(),
            outcome: entry.kind.to_string(),
            detail:  entry
                .detail
                .as_deref()
                .and_then(|detail| detail.lines().next())
                .unwrap_or("")
                .to_string(),
        });

        Some(
            Table::new(rows)
                .with(Panel::header(format!("Project {} Overview", self.project)))
                .with(Panel::footer(format!("Total: {}", self.grade)))
                .with(Modify::new(Rows::new(1..)).with(Width::wrap(40).keep_words(true)))
                .with(
                    Modify::new(Rows::first())
                        .with(Alignment::center())
                        .with(Alignment::center_vertical()),
                )
                .with(
                    Modify::new(Rows::last())
                        .with(Alignment::center())
                        .with(Alignment::center_vertical()),
                )
                .with(Style::modern())
                .to_string(),
        )
    }
}

/// One row of [`GradeReport::entry_table`].
#[derive(Tabled)]
struct EntryRow {
    #[tabled(rename = "Test")]
    /// Chip the entry is about.
    test:    String,
    #[tabled(rename = "Outcome")]
    /// Outcome kind.
    outcome: String,
    #[tabled(rename = "Detail")]
    /// First line of the detail, if any.
    detail:  String,
}
