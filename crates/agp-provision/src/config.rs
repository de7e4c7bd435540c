//! Run configuration for the provisioning pipeline
//!
//! Everything the pipeline would otherwise read from process-global
//! state is captured here once at startup, so stage logic stays
//! deterministic and testable.

use camino::Utf8PathBuf;

/// Default repository cloned into the `core` subdirectory
pub const BASE_REPO_URL: &str = "https://github.com/artemeon/core-ng.git";

/// Default prefix for named project repositories (`<prefix>/<name>.git`)
pub const PROJECT_REPO_BASE_URL: &str = "https://github.com/artemeon";

/// Default repository holding the AGP Valet driver
pub const DRIVER_REPO_URL: &str = "https://github.com/artemeon/agp-valet-driver.git";

/// Default GitHub API base URL
pub const API_BASE_URL: &str = "https://api.github.com";

/// Ambient configuration for one provisioning run
#[derive(Debug, Clone)]
pub struct ProvisionConfig {
    /// Directory the command was launched from
    pub current_dir: Utf8PathBuf,
    /// The user's home directory
    pub home_dir: Utf8PathBuf,
    /// User to launch the browser as, usually `SUDO_USER` or `USER`
    pub invoking_user: Option<String>,
    /// Whether interactive prompts may be shown
    pub interactive: bool,
    /// Whether local alias registration may run at all
    pub alias_setup_enabled: bool,
    /// Whether to open the site in a browser after a successful run
    pub open_browser: bool,
    /// Repository cloned into the `core` subdirectory
    pub base_repo_url: String,
    /// Prefix for named project repositories
    pub project_repo_base_url: String,
    /// Repository holding the AGP Valet driver
    pub driver_repo_url: String,
    /// GitHub API base URL
    pub api_base_url: String,
}

impl ProvisionConfig {
    /// Configuration with default endpoints and all features enabled
    pub fn new(current_dir: Utf8PathBuf, home_dir: Utf8PathBuf) -> Self {
        Self {
            current_dir,
            home_dir,
            invoking_user: None,
            interactive: true,
            alias_setup_enabled: true,
            open_browser: true,
            base_repo_url: BASE_REPO_URL.to_string(),
            project_repo_base_url: PROJECT_REPO_BASE_URL.to_string(),
            driver_repo_url: DRIVER_REPO_URL.to_string(),
            api_base_url: API_BASE_URL.to_string(),
        }
    }
}
