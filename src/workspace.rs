#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

use std::{
    fs, io,
    path::{Path, PathBuf},
};

use thiserror::Error;
use uuid::Uuid;

use crate::{
    constants::{SUBMISSION_DIR, WORKSPACE_PREFIX},
    util::copy_tree,
};

/// Failures that make a grading request impossible to start.
#[derive(Error, Debug)]
pub enum StagingError {
    /// The submission to grade does not exist or is not a directory.
    #[error("Submission directory `{0}` does not exist")]
    MissingSubmission(PathBuf),
    /// Another request created the workspace directory first.
    #[error("Workspace `{0}` was created by someone else while staging")]
    Collision(PathBuf),
    /// A directory could not be created or cleared.
    #[error("Could not prepare directory `{path}`")]
    Directory {
        /// The directory being prepared.
        path:   PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },
    /// The submission could not be copied into the workspace.
    #[error("Could not copy `{from}` into `{to}`")]
    Copy {
        /// Submission being copied.
        from:   PathBuf,
        /// Destination inside the workspace.
        to:     PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },
}

/// A uniquely named directory owning one staged submission.
///
/// Dropping the workspace deletes it from disk unless [`Workspace::keep`] was
/// called, so every exit path of a request cleans up after itself.
#[derive(Debug)]
pub struct Workspace {
    /// Root directory of the workspace.
    root: PathBuf,
    /// Whether the directory is left behind on drop.
    keep: bool,
}

impl Workspace {
    /// Creates a fresh workspace under `temp_root` and copies `submission`
    /// into its `src/` directory.
    pub fn stage(submission: &Path, temp_root: &Path) -> Result<Self, StagingError> {
        if !submission.is_dir() {
            return Err(StagingError::MissingSubmission(submission.to_path_buf()));
        }

        fs::create_dir_all(temp_root).map_err(|source| StagingError::Directory {
            path: temp_root.to_path_buf(),
            source,
        })?;

        let root = temp_root.join(format!("{WORKSPACE_PREFIX}{}", Uuid::new_v4().simple()));
        if root.exists() {
            tracing::warn!("Workspace {} already exists, removing it", root.display());
            fs::remove_dir_all(&root).map_err(|source| StagingError::Directory {
                path: root.clone(),
                source,
            })?;
        }

        fs::create_dir(&root).map_err(|source| match source.kind() {
            io::ErrorKind::AlreadyExists => StagingError::Collision(root.clone()),
            _ => StagingError::Directory {
                path: root.clone(),
                source,
            },
        })?;
        // From here on a failure must not leave a half-built workspace behind.
        let workspace = Self { root, keep: false };

        let src = workspace.source_dir();
        fs::create_dir(&src).map_err(|source| StagingError::Directory {
            path: src.clone(),
            source,
        })?;
        copy_tree(submission, &src).map_err(|source| StagingError::Copy {
            from: submission.to_path_buf(),
            to: src.clone(),
            source,
        })?;

        tracing::info!("Staged {} into {}", submission.display(), workspace.root.display());
        Ok(workspace)
    }

    /// Root directory of the workspace.
    pub fn root(&self) -> &Path {
        self.root.as_path()
    }

    /// Directory holding the staged copy of the submission.
    pub fn source_dir(&self) -> PathBuf {
        self.root.join(SUBMISSION_DIR)
    }

    /// Leaves the workspace on disk when it is dropped.
    pub fn keep(&mut self) {
        self.keep = true;
    }

    /// Whether the workspace will be left on disk.
    pub fn is_kept(&self) -> bool {
        self.keep
    }
}

impl Drop for Workspace {
    fn drop(&mut self) {
        if self.keep {
            tracing::info!("Keeping workspace {}", self.root.display());
            return;
        }
        if let Err(e) = fs::remove_dir_all(&self.root) {
            tracing::warn!("Could not remove workspace {}: {}", self.root.display(), e);
        }
    }
}
