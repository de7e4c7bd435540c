//! Git clone operations

use camino::Utf8Path;

use agp_core::process::{self, ProcessResult};

use crate::error::Result;
use crate::LONG_TIMEOUT;

/// Options for one clone invocation
#[derive(Debug, Clone, Default)]
pub struct CloneOptions {
    /// Branch to check out instead of the default
    pub branch: Option<String>,
    /// Clone submodules recursively
    pub recurse_submodules: bool,
}

/// Clone `url` into `dest`, relative to `cwd` when one is given
///
/// A failed clone is reported through the result, not as an error.
pub async fn clone_repository(
    url: &str,
    dest: &str,
    cwd: Option<&Utf8Path>,
    options: &CloneOptions,
) -> Result<ProcessResult> {
    let mut argv = vec!["git", "clone"];
    if let Some(branch) = options.branch.as_deref() {
        argv.push("-b");
        argv.push(branch);
    }
    if options.recurse_submodules {
        argv.push("--recurse-submodules");
    }
    argv.push(url);
    argv.push(dest);

    Ok(process::run(&argv, cwd, Some(LONG_TIMEOUT)).await?)
}
