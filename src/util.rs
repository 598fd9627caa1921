#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

use std::{
    borrow::Cow,
    fs::{self, FileTimes},
    io,
    path::{Path, PathBuf},
};

use walkdir::WalkDir;

/// A regular file found by [`scan_files`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScannedFile {
    /// Full path to the file.
    path: PathBuf,
}

impl ScannedFile {
    /// Full path to the file.
    pub fn path(&self) -> &Path {
        self.path.as_path()
    }

    /// Directory containing the file.
    pub fn dir(&self) -> &Path {
        self.path.parent().unwrap_or_else(|| Path::new(""))
    }

    /// File name, lossily converted to UTF-8.
    pub fn name(&self) -> Cow<'_, str> {
        self.path
            .file_name()
            .map(|name| name.to_string_lossy())
            .unwrap_or_default()
    }

    /// File name without its final extension.
    pub fn stem(&self) -> Cow<'_, str> {
        self.path
            .file_stem()
            .map(|stem| stem.to_string_lossy())
            .unwrap_or_default()
    }

    /// Returns true if the file's extension equals `extension`, ignoring case.
    pub fn has_extension(&self, extension: &str) -> bool {
        has_extension(&self.path, extension)
    }
}

/// Recursively walks `root`, yielding every regular file below it.
///
/// Files come out sorted by name within each directory, so the order is
/// stable for a given tree. Symbolic links are neither reported nor descended
/// into. A missing or unreadable `root` shows up as the first (and only) error
/// item.
pub fn scan_files(root: &Path) -> impl Iterator<Item = Result<ScannedFile, walkdir::Error>> {
    WalkDir::new(root)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(entry) if entry.file_type().is_file() => Some(Ok(ScannedFile {
                path: entry.into_path(),
            })),
            Ok(_) => None,
            Err(e) => Some(Err(e)),
        })
}

/// Returns true if `path` has an extension equal to `extension`, ignoring
/// case.
pub fn has_extension(path: &Path, extension: &str) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case(extension))
}

/// Copies the contents of `source` into `destination` recursively.
///
/// Existing files at the destination are overwritten and existing
/// directories are merged into. Copied files keep their access and
/// modification times. Symlinked directories are skipped, symlinked files are
/// copied by content, and dangling links are skipped with a warning.
pub fn copy_tree(source: &Path, destination: &Path) -> io::Result<()> {
    fs::create_dir_all(destination)?;

    for entry in WalkDir::new(source).follow_links(false).min_depth(1) {
        let entry = entry.map_err(io::Error::other)?;
        let relative = entry
            .path()
            .strip_prefix(source)
            .map_err(io::Error::other)?;
        let target = destination.join(relative);
        let file_type = entry.file_type();

        if file_type.is_dir() {
            fs::create_dir_all(&target)?;
        } else if file_type.is_file() {
            copy_file(entry.path(), &target)?;
        } else if file_type.is_symlink() {
            match fs::metadata(entry.path()) {
                Ok(meta) if meta.is_file() => copy_file(entry.path(), &target)?,
                Ok(_) => {
                    tracing::debug!("Skipping symlinked directory {}", entry.path().display())
                }
                Err(e) => {
                    tracing::warn!("Skipping dangling symlink {}: {}", entry.path().display(), e)
                }
            }
        }
    }

    Ok(())
}

/// Copies one file and carries its timestamps over.
fn copy_file(from: &Path, to: &Path) -> io::Result<()> {
    if let Some(parent) = to.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::copy(from, to)?;

    let meta = fs::metadata(from)?;
    let mut times = FileTimes::new();
    if let Ok(modified) = meta.modified() {
        times = times.set_modified(modified);
    }
    if let Ok(accessed) = meta.accessed() {
        times = times.set_accessed(accessed);
    }
    // Read-only sources produce read-only copies; their timestamps stay as copied.
    match fs::File::options().write(true).open(to) {
        Ok(file) => {
            if let Err(e) = file.set_times(times) {
                tracing::debug!("Could not carry timestamps over to {}: {}", to.display(), e);
            }
        }
        Err(e) => tracing::debug!("Could not reopen {} to set timestamps: {}", to.display(), e),
    }

    Ok(())
}

/// Removes every file below `root` whose extension is one of `extensions`,
/// returning the removed paths.
pub fn remove_files_with_extensions(root: &Path, extensions: &[&str]) -> io::Result<Vec<PathBuf>> {
    let doomed: Vec<PathBuf> = scan_files(root)
        .filter_map(Result::ok)
        .filter(|file| extensions.iter().any(|ext| file.has_extension(ext)))
        .map(|file| file.path().to_path_buf())
        .collect();

    for path in &doomed {
        fs::remove_file(path)?;
    }

    Ok(doomed)
}

/// Compares two texts while ignoring all whitespace.
pub fn eq_ignoring_whitespace(left: &str, right: &str) -> bool {
    left.chars()
        .filter(|c| !c.is_whitespace())
        .eq(right.chars().filter(|c| !c.is_whitespace()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extension_match_ignores_case() {
        assert!(has_extension(Path::new("a/b/RAM8.HDL"), "hdl"));
        assert!(has_extension(Path::new("Bit.hdl"), "HDL"));
        assert!(!has_extension(Path::new("Bit.hidden"), "hdl"));
        assert!(!has_extension(Path::new("hdl"), "hdl"));
    }

    #[test]
    fn whitespace_is_ignored_when_comparing() {
        assert!(eq_ignoring_whitespace("|a|b|\n|0|1|\n", "| a | b |\r\n| 0 | 1 |"));
        assert!(!eq_ignoring_whitespace("|0|1|", "|1|0|"));
    }
}
