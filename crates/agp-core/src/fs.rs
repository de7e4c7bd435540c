//! Filesystem helpers

use camino::{Utf8Path, Utf8PathBuf};
use walkdir::WalkDir;

use crate::error::{Error, Result};

/// Resolve the user's home directory
///
/// Prefers the `HOME` environment variable over the platform lookup so
/// shell and container overrides are respected.
pub fn home_dir() -> Result<Utf8PathBuf> {
    if let Ok(home) = std::env::var("HOME") {
        if !home.is_empty() {
            return Ok(Utf8PathBuf::from(home));
        }
    }

    let home = dirs::home_dir().ok_or(Error::HomeDirNotFound)?;
    Utf8PathBuf::from_path_buf(home).map_err(|path| Error::non_utf8_path(path.display().to_string()))
}

/// Recursively delete a directory without following symbolic links
///
/// Symlinks below `root` are removed as entries, their targets stay
/// untouched. A missing `root` is not an error.
pub fn remove_tree(root: &Utf8Path) -> Result<()> {
    if !root.is_dir() {
        return Ok(());
    }

    for entry in WalkDir::new(root).follow_links(false).contents_first(true) {
        let entry = entry?;
        if entry.file_type().is_dir() {
            std::fs::remove_dir(entry.path())?;
        } else {
            // Covers plain files and symlinks, including links to directories
            std::fs::remove_file(entry.path())?;
        }
    }
    Ok(())
}
