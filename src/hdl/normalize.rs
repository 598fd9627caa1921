//! Flattening of nested, inconsistently cased submissions.
//!
//! Students zip up IDE project folders, nest their chips a few directories
//! deep, and type `ram8.HDL` where the simulator wants `RAM8.hdl`. The
//! simulator only looks at exact-case files in the directory it is pointed
//! at, so every chip source is pulled up into the workspace root and renamed
//! to its roster spelling.

use std::{
    fs, io,
    path::{Path, PathBuf},
};

use thiserror::Error;

use crate::util::{ScannedFile, scan_files};

/// A problem hit while flattening one file. None of these stop the rest of
/// the submission from being processed.
#[derive(Error, Debug)]
pub enum NormalizeIssue {
    /// Part of the tree could not be read.
    #[error("Could not scan the submission")]
    Scan(#[from] walkdir::Error),
    /// A file could not be moved into the root.
    #[error("Could not move `{from}` to `{to}`")]
    Move {
        /// File being moved.
        from:   PathBuf,
        /// Where it was headed.
        to:     PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },
}

/// What [`flatten`] did.
#[derive(Debug, Default)]
pub struct NormalizeReport {
    /// Final location of every file that was pulled into the root.
    placed: Vec<PathBuf>,
    /// Problems that were logged and skipped over.
    issues: Vec<NormalizeIssue>,
}

impl NormalizeReport {
    /// Final location of every matching file.
    pub fn placed(&self) -> &[PathBuf] {
        &self.placed
    }

    /// Problems that were logged and skipped over.
    pub fn issues(&self) -> &[NormalizeIssue] {
        &self.issues
    }

    /// Records and logs a skipped problem.
    fn skip(&mut self, issue: NormalizeIssue) {
        match std::error::Error::source(&issue) {
            Some(source) => tracing::warn!("{issue}: {source}"),
            None => tracing::warn!("{issue}"),
        }
        self.issues.push(issue);
    }
}

/// Moves every file below `root` whose extension matches `extension`
/// (ignoring case) directly into `root`, then renames it to its canonical
/// spelling when its stem matches one of `canonical_names` ignoring case.
///
/// Moved files get the extension in lower case; a file already in `root`
/// with the same name is overwritten. Failures are collected in the returned
/// report and never abort the batch. A missing `root` yields a report with a
/// single scan issue and nothing placed.
pub fn flatten<S>(root: &Path, extension: &str, canonical_names: &[S]) -> NormalizeReport
where
    S: AsRef<str>,
{
    let mut report = NormalizeReport::default();
    let extension = extension.to_ascii_lowercase();

    // Collect first: files moved into `root` must not be picked up again.
    let mut matches: Vec<ScannedFile> = Vec::new();
    for item in scan_files(root) {
        match item {
            Ok(file) if file.has_extension(&extension) => matches.push(file),
            Ok(_) => {}
            Err(e) => report.skip(NormalizeIssue::Scan(e)),
        }
    }

    for file in matches {
        let stem = file.stem().into_owned();
        let name = match canonical_names
            .iter()
            .map(AsRef::as_ref)
            .find(|canonical| canonical.eq_ignore_ascii_case(&stem))
        {
            Some(canonical) => format!("{canonical}.{extension}"),
            None => format!("{stem}.{extension}"),
        };
        let target = root.join(&name);

        if file.path() == target {
            report.placed.push(target);
            continue;
        }

        match fs::rename(file.path(), &target) {
            Ok(()) => {
                tracing::debug!("Moved {} to {}", file.path().display(), target.display());
                report.placed.push(target);
            }
            Err(source) => report.skip(NormalizeIssue::Move {
                from: file.path().to_path_buf(),
                to: target,
                source,
            }),
        }
    }

    report.placed.sort();
    report.placed.dedup();
    report
}

/// Returns the first directory below `root` (in scan order) that contains a
/// file named `file_name`, ignoring case, or `root` itself when none does.
pub fn find_containing_folder(root: &Path, file_name: &str) -> PathBuf {
    scan_files(root)
        .filter_map(Result::ok)
        .find(|file| file.name().eq_ignore_ascii_case(file_name))
        .map(|file| file.dir().to_path_buf())
        .unwrap_or_else(|| root.to_path_buf())
}
