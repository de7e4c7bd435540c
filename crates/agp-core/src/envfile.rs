//! Environment file templating
//!
//! Rewrites `KEY=value` lines in a dotenv-style file. For every
//! assignment, all lines beginning with `KEY=` are replaced by the new
//! assignment as a whole line. Everything else passes through untouched,
//! so applying the same assignments twice is a no-op.

use camino::Utf8Path;
use regex::{NoExpand, Regex};

use crate::error::{Error, Result};

/// A single key/value replacement for an environment file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvAssignment {
    pub key: String,
    pub value: String,
}

impl EnvAssignment {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }

    /// The rendered `KEY=value` line
    fn line(&self) -> String {
        format!("{}={}", self.key, self.value)
    }
}

/// Apply assignments to the file at `path`, rewriting matching lines in place
///
/// Keys without a matching line are skipped; line order and unrelated
/// content are preserved byte for byte.
pub fn apply(path: &Utf8Path, assignments: &[EnvAssignment]) -> Result<()> {
    if !path.is_file() {
        return Err(Error::env_file_not_found(path.as_str()));
    }

    let mut content = std::fs::read_to_string(path)?;
    for assignment in assignments {
        content = replace_line(&content, assignment);
    }
    std::fs::write(path, content)?;
    Ok(())
}

fn replace_line(content: &str, assignment: &EnvAssignment) -> String {
    let pattern = format!("(?m)^{}=.*$", regex::escape(&assignment.key));
    // The escaped key always forms a valid pattern
    let matcher = Regex::new(&pattern).expect("line pattern");
    matcher
        .replace_all(content, NoExpand(&assignment.line()))
        .into_owned()
}
