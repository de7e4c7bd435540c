//! Front-end asset tooling
//!
//! pnpm is optional: an absent or broken installation turns the whole
//! front-end stage into a no-op.

use camino::Utf8Path;

use agp_core::process::{self, ProcessResult};

use crate::error::Result;
use crate::{LONG_TIMEOUT, PROBE_TIMEOUT};

/// Directory below `core` holding the front-end build files
const BUILD_FILES_DIR: &str = "_buildfiles";

/// Whether a usable pnpm installation exists
pub async fn detect() -> Result<bool> {
    if which::which("pnpm").is_err() {
        return Ok(false);
    }
    let result = process::run(&["pnpm", "--version"], None, Some(PROBE_TIMEOUT)).await?;
    Ok(result.success())
}

/// Install front-end dependencies in the build-files directory
pub async fn install(core_dir: &Utf8Path) -> Result<ProcessResult> {
    let dir = core_dir.join(BUILD_FILES_DIR);
    Ok(process::run(&["pnpm", "install"], Some(&dir), Some(LONG_TIMEOUT)).await?)
}

/// Run the front-end build in the build-files directory
pub async fn build(core_dir: &Utf8Path) -> Result<ProcessResult> {
    let dir = core_dir.join(BUILD_FILES_DIR);
    Ok(process::run(&["pnpm", "dev"], Some(&dir), Some(LONG_TIMEOUT)).await?)
}
