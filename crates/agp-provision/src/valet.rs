//! Laravel Valet integration
//!
//! Thin wrappers around the `valet` CLI plus the driver and manifest
//! lookups around it. The pipeline decides which of these to run and
//! how failures are reported; nothing in here aborts a run.

use std::sync::LazyLock;

use camino::{Utf8Path, Utf8PathBuf};
use regex::Regex;
use semver::Version;
use serde::Deserialize;

use agp_core::process::{self, ProcessResult};

use crate::error::Result;
use crate::git::{clone_repository, CloneOptions};
use crate::{COMMAND_TIMEOUT, PROBE_TIMEOUT};

/// Directory name git derives for the driver repository clone
const DRIVER_CLONE_DIR: &str = "agp-valet-driver";

/// Driver file looked for under every installed driver package
const DRIVER_GLOB: &str = "*/src/AgpValetDriver.php";

static VERSION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"v?(\d+\.\d+(?:\.\d+)?)").expect("valid version regex"));

/// Detected Valet installation
#[derive(Debug, Clone)]
pub struct ValetInfo {
    /// Raw banner from `valet -V`, e.g. "Laravel Valet 4.7.1"
    pub banner: String,
    /// Parsed version; `None` when the banner has no recognizable one
    pub version: Option<Version>,
}

/// Probe for a usable Valet installation
///
/// Absent binary and failing invocation read as "no Valet". A banner
/// without a recognizable version still counts as installed; only the
/// driver-branch choice needs the version and it has a fallback.
pub async fn probe() -> Result<Option<ValetInfo>> {
    if which::which("valet").is_err() {
        return Ok(None);
    }

    let result = process::run(&["valet", "-V"], None, Some(PROBE_TIMEOUT)).await?;
    if !result.success() {
        return Ok(None);
    }

    let banner = result.stdout_trimmed().to_string();
    let version = parse_version(&banner);
    Ok(Some(ValetInfo { banner, version }))
}

fn parse_version(banner: &str) -> Option<Version> {
    let captures = VERSION_RE.captures(banner)?;
    let raw = captures.get(1)?.as_str();
    // Tolerate two-segment versions such as "4.7"
    let padded = if raw.matches('.').count() == 1 {
        format!("{raw}.0")
    } else {
        raw.to_string()
    };
    Version::parse(&padded).ok()
}

/// Directory Valet scans for site drivers
pub fn drivers_dir(home_dir: &Utf8Path) -> Utf8PathBuf {
    home_dir.join(".config/valet/Drivers")
}

/// Whether an AGP driver is installed under any driver package
pub fn driver_present(home_dir: &Utf8Path) -> bool {
    let pattern = drivers_dir(home_dir).join(DRIVER_GLOB);
    glob::glob(pattern.as_str())
        .map(|entries| entries.filter_map(std::result::Result::ok).next().is_some())
        .unwrap_or(false)
}

/// Driver repository branch matching the Valet major version
///
/// An unknown version falls back to `main`.
pub fn driver_branch(version: Option<&Version>) -> &'static str {
    match version {
        Some(version) if version.major >= 4 => "v4",
        _ => "main",
    }
}

/// Clone the AGP driver into the drivers directory
pub async fn clone_driver(
    repo_url: &str,
    home_dir: &Utf8Path,
    branch: &str,
) -> Result<ProcessResult> {
    let dir = drivers_dir(home_dir);
    std::fs::create_dir_all(&dir)?;
    let options = CloneOptions {
        branch: Some(branch.to_string()),
        recurse_submodules: false,
    };
    clone_repository(repo_url, DRIVER_CLONE_DIR, Some(&dir), &options).await
}

/// Directories Valet is parked on, from `valet paths`
pub async fn parked_paths() -> Result<Vec<String>> {
    let result = process::run(&["valet", "paths"], None, Some(COMMAND_TIMEOUT)).await?;
    if !result.success() {
        return Ok(Vec::new());
    }
    Ok(serde_json::from_str(result.stdout_trimmed())?)
}

/// Re-secure a site that lives under a parked path
pub async fn secure(site_dir: &Utf8Path) -> Result<ProcessResult> {
    Ok(process::run(&["valet", "secure"], Some(site_dir), Some(COMMAND_TIMEOUT)).await?)
}

/// Link the site directory and secure it in one step
pub async fn link_secure(site_dir: &Utf8Path) -> Result<ProcessResult> {
    Ok(process::run(&["valet", "link", "--secure"], Some(site_dir), Some(COMMAND_TIMEOUT)).await?)
}

/// Isolate the site to a specific PHP version, e.g. `php@8.2`
pub async fn isolate(site_dir: &Utf8Path, php_version: &str) -> Result<ProcessResult> {
    Ok(process::run(
        &["valet", "isolate", php_version],
        Some(site_dir),
        Some(COMMAND_TIMEOUT),
    )
    .await?)
}

/// Top level domain Valet serves sites under
pub async fn tld() -> Result<String> {
    let result = process::run(&["valet", "tld"], None, Some(COMMAND_TIMEOUT)).await?;
    Ok(result.stdout_trimmed().to_string())
}

/// Remove isolation, certificate, and link for a site, best-effort
pub async fn unregister(site_dir: &Utf8Path) {
    for argv in [
        ["valet", "unisolate"],
        ["valet", "unsecure"],
        ["valet", "unlink"],
    ] {
        match process::run(&argv, Some(site_dir), Some(COMMAND_TIMEOUT)).await {
            Ok(result) if !result.success() => {
                tracing::debug!("{} exited with {}", argv.join(" "), result.exit_code);
            }
            Ok(_) => {}
            Err(err) => tracing::debug!("{} failed: {err}", argv.join(" ")),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ComposerManifest {
    config: Option<ComposerConfig>,
}

#[derive(Debug, Deserialize)]
struct ComposerConfig {
    platform: Option<ComposerPlatform>,
}

#[derive(Debug, Deserialize)]
struct ComposerPlatform {
    php: Option<String>,
}

/// PHP platform version declared in the core composer manifest, as `php@X.Y`
///
/// Returns `None` when the manifest or the declaration is missing.
pub fn platform_php(core_dir: &Utf8Path) -> Result<Option<String>> {
    let path = core_dir.join("composer.json");
    if !path.is_file() {
        return Ok(None);
    }

    let content = std::fs::read_to_string(&path)?;
    let manifest: ComposerManifest = serde_json::from_str(&content)?;
    let Some(php) = manifest
        .config
        .and_then(|config| config.platform)
        .and_then(|platform| platform.php)
    else {
        return Ok(None);
    };

    let short: Vec<&str> = php.split('.').take(2).collect();
    Ok(Some(format!("php@{}", short.join("."))))
}
