//! Controls which chip sources the simulator can see.
//!
//! The simulator resolves every part a chip uses by looking for
//! `<Part>.hdl` next to it, so a student's `RAM64.hdl` could quietly lean on
//! whatever else they submitted. While one chip is graded, every other chip
//! of the project is renamed to `<Name>.hidden`, which the simulator ignores
//! and falls back to its built-in implementation for.

use std::{
    fs, io,
    path::{Path, PathBuf},
};

use thiserror::Error;

use crate::constants::HIDDEN_EXTENSION;

/// Where a chip's source currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChipState {
    /// `<Name>.<ext>` exists and the simulator can load it.
    Visible,
    /// `<Name>.hidden` exists.
    Hidden,
    /// The chip was not submitted.
    Absent,
}

/// Errors raised by the visibility gate.
#[derive(Error, Debug)]
pub enum VisibilityError {
    /// There is no hidden source to reveal.
    #[error("No source was submitted for `{0}`")]
    FileMissing(String),
    /// Revealing would make two chips visible at once.
    #[error("Cannot reveal `{chip}` while `{visible}` is visible")]
    AlreadyVisible {
        /// Chip that was asked for.
        chip:    String,
        /// Chip that is already visible.
        visible: String,
    },
    /// A rename failed.
    #[error("Could not rename `{from}` to `{to}`")]
    Rename {
        /// Source of the rename.
        from:   PathBuf,
        /// Destination of the rename.
        to:     PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },
}

/// Moves the chips of one project between [`ChipState::Visible`] and
/// [`ChipState::Hidden`] inside a directory.
#[derive(Debug, Clone)]
pub struct VisibilityGate {
    /// Directory the simulator is run in.
    root:      PathBuf,
    /// Extension of visible sources, without the dot.
    extension: String,
    /// Chips managed by this gate.
    roster:    Vec<String>,
}

impl VisibilityGate {
    /// Creates a gate over `roster` for sources with `extension` in `root`.
    pub fn new<I, S>(root: impl Into<PathBuf>, extension: impl Into<String>, roster: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            root:      root.into(),
            extension: extension.into(),
            roster:    roster.into_iter().map(Into::into).collect(),
        }
    }

    /// Chips managed by this gate.
    pub fn roster(&self) -> &[String] {
        &self.roster
    }

    /// Returns true if `chip` is managed by this gate.
    fn in_roster(&self, chip: &str) -> bool {
        self.roster.iter().any(|name| name == chip)
    }

    /// Path of the visible form of `chip`.
    pub fn visible_path(&self, chip: &str) -> PathBuf {
        self.root.join(format!("{chip}.{}", self.extension))
    }

    /// Path of the hidden form of `chip`.
    pub fn hidden_path(&self, chip: &str) -> PathBuf {
        self.root.join(format!("{chip}.{HIDDEN_EXTENSION}"))
    }

    /// Current state of `chip`. A stale hidden copy next to a visible one
    /// counts as visible.
    pub fn state(&self, chip: &str) -> ChipState {
        if self.visible_path(chip).is_file() {
            ChipState::Visible
        } else if self.hidden_path(chip).is_file() {
            ChipState::Hidden
        } else {
            ChipState::Absent
        }
    }

    /// Chips of the roster that are currently visible.
    pub fn visible_chips(&self) -> Vec<&str> {
        self.roster
            .iter()
            .filter(|chip| self.state(chip) == ChipState::Visible)
            .map(String::as_str)
            .collect()
    }

    /// Hides every visible chip of the roster. Chips that are already hidden
    /// or were never submitted are left alone.
    pub fn hide_all(&self) -> Result<(), VisibilityError> {
        for chip in &self.roster {
            self.conceal(chip)?;
        }
        Ok(())
    }

    /// Makes `chip` visible. Chips outside the roster are never hidden by
    /// the gate, so they only count as submitted when found in hidden form.
    ///
    /// The returned guard hides it again when dropped, so the chip cannot stay
    /// visible past the scope that revealed it.
    pub fn reveal(&self, chip: &str) -> Result<Revealed<'_>, VisibilityError> {
        if let Some(visible) = self
            .visible_chips()
            .into_iter()
            .find(|visible| *visible != chip)
        {
            return Err(VisibilityError::AlreadyVisible {
                chip:    chip.to_string(),
                visible: visible.to_string(),
            });
        }

        match self.state(chip) {
            ChipState::Absent => return Err(VisibilityError::FileMissing(chip.to_string())),
            ChipState::Visible if !self.in_roster(chip) => {
                return Err(VisibilityError::FileMissing(chip.to_string()));
            }
            ChipState::Hidden => {
                rename(&self.hidden_path(chip), &self.visible_path(chip))?;
                tracing::debug!("Revealed {chip}");
            }
            ChipState::Visible => {}
        }

        Ok(Revealed {
            gate:      self,
            chip:      chip.to_string(),
            concealed: false,
        })
    }

    /// Hides `chip` if it is visible; a no-op otherwise.
    pub fn conceal(&self, chip: &str) -> Result<(), VisibilityError> {
        if self.state(chip) == ChipState::Visible {
            rename(&self.visible_path(chip), &self.hidden_path(chip))?;
            tracing::debug!("Concealed {chip}");
        }
        Ok(())
    }
}

/// Renames `from` to `to`, replacing `to`.
fn rename(from: &Path, to: &Path) -> Result<(), VisibilityError> {
    fs::rename(from, to).map_err(|source| VisibilityError::Rename {
        from: from.to_path_buf(),
        to: to.to_path_buf(),
        source,
    })
}

/// A chip made visible by [`VisibilityGate::reveal`]; hidden again on drop.
#[derive(Debug)]
pub struct Revealed<'a> {
    /// Gate that revealed the chip.
    gate:      &'a VisibilityGate,
    /// Chip that is visible.
    chip:      String,
    /// Set once the chip was hidden explicitly.
    concealed: bool,
}

impl Revealed<'_> {
    /// Name of the revealed chip.
    pub fn chip(&self) -> &str {
        &self.chip
    }

    /// Path of the visible source.
    pub fn path(&self) -> PathBuf {
        self.gate.visible_path(&self.chip)
    }

    /// Hides the chip again, reporting any failure to do so.
    pub fn conceal(mut self) -> Result<(), VisibilityError> {
        self.concealed = true;
        self.gate.conceal(&self.chip)
    }
}

impl Drop for Revealed<'_> {
    fn drop(&mut self) {
        if self.concealed {
            return;
        }
        if let Err(e) = self.gate.conceal(&self.chip) {
            tracing::error!("{} stayed visible: {}", self.chip, e);
        }
    }
}
