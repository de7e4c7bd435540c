//! Mutable state carried through one provisioning run

use std::time::Instant;

use camino::Utf8PathBuf;

use crate::config::ProvisionConfig;

/// State owned by the pipeline for the lifetime of one invocation
///
/// Paths are derived once from the target name and stay fixed; the
/// flags record which stages have taken effect so later stages and the
/// interrupt rollback can react.
#[derive(Debug)]
pub struct ProvisioningContext {
    /// Directory name requested on the command line
    pub target_name: String,
    /// Branch to check out instead of the default, if any
    pub branch: Option<String>,
    /// Resolved project repository name, if one was selected
    pub project_name: Option<String>,
    /// Absolute path of the workspace directory
    pub working_directory: Utf8PathBuf,
    /// Absolute path of the `core` subdirectory
    pub core_directory: Utf8PathBuf,
    /// Whether the workspace came from a named project clone
    pub is_named_project_clone: bool,
    /// Whether a local web alias was registered
    pub local_alias_available: bool,
    /// Whether the interrupt rollback may delete the workspace
    pub cleanup_armed: bool,
    /// Host name the workspace is reachable under, once known
    pub web_root: Option<String>,
    /// Whether the `.env` file received interactive values
    pub env_updated: bool,
    /// Database name collected during environment setup
    pub database_name: Option<String>,
    /// Start of the run, for the closing summary
    pub started: Instant,
}

impl ProvisioningContext {
    pub fn new(config: &ProvisionConfig, target_name: &str, branch: Option<String>) -> Self {
        let working_directory = config.current_dir.join(target_name);
        let core_directory = working_directory.join("core");
        Self {
            target_name: target_name.to_string(),
            branch,
            project_name: None,
            working_directory,
            core_directory,
            is_named_project_clone: false,
            local_alias_available: false,
            cleanup_armed: false,
            web_root: None,
            env_updated: false,
            database_name: None,
            started: Instant::now(),
        }
    }
}
