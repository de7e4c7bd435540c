//! The `new` command
//!
//! Snapshots the ambient environment into a run configuration and hands
//! off to the provisioning pipeline.

use anyhow::Result;
use camino::Utf8PathBuf;
use tracing::debug;

use agp_provision::prompt::ConsolePrompter;
use agp_provision::{Pipeline, ProvisionConfig, RunOutcome};

use crate::cli::NewArgs;

pub async fn run(args: NewArgs, no_interaction: bool) -> Result<RunOutcome> {
    let config = build_config(no_interaction)?;
    let pipeline = Pipeline::new(config, ConsolePrompter);
    Ok(pipeline.run(&args.name, args.branch, args.project).await?)
}

/// Capture working directory, user, and endpoint overrides once
fn build_config(no_interaction: bool) -> Result<ProvisionConfig> {
    let current_dir = Utf8PathBuf::from_path_buf(std::env::current_dir()?)
        .map_err(|path| anyhow::anyhow!("Current directory is not valid UTF-8: {}", path.display()))?;
    let home_dir = agp_core::fs::home_dir()?;

    let mut config = ProvisionConfig::new(current_dir, home_dir);
    config.interactive = !no_interaction && console::user_attended();
    // The TESTING variable keeps CI runs away from the host's Valet setup
    config.alias_setup_enabled = std::env::var_os("TESTING").is_none();
    config.open_browser = config.alias_setup_enabled;
    config.invoking_user = std::env::var("SUDO_USER")
        .or_else(|_| std::env::var("USER"))
        .ok();

    if let Ok(url) = std::env::var("AGP_BASE_REPO") {
        config.base_repo_url = url;
    }
    if let Ok(url) = std::env::var("AGP_PROJECT_REPO_BASE") {
        config.project_repo_base_url = url;
    }
    if let Ok(url) = std::env::var("AGP_DRIVER_REPO") {
        config.driver_repo_url = url;
    }
    if let Ok(url) = std::env::var("AGP_API_BASE") {
        config.api_base_url = url;
    }

    debug!("Working directory: {}", config.current_dir);
    Ok(config)
}
