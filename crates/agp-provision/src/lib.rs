//! # agp-provision
//!
//! Provisioning pipeline for AGP project workspaces providing:
//! - Project catalog lookup against the GitHub GraphQL API
//! - Fuzzy matching of directory names to project repositories
//! - Repository cloning, setup script and dependency installation
//! - Laravel Valet alias registration and environment file setup
//!
//! The pipeline itself lives in [`pipeline::Pipeline`]; everything else
//! is a supporting service it sequences.

use std::time::Duration;

pub mod catalog;
pub mod config;
pub mod context;
pub mod error;
pub mod frontend;
pub mod git;
pub mod matcher;
pub mod pipeline;
pub mod prompt;
pub mod token;
pub mod valet;

pub use config::ProvisionConfig;
pub use context::ProvisioningContext;
pub use error::{Error, Result};
pub use pipeline::{Pipeline, RunOutcome};

/// Ceiling for tool probes (`valet -V`, `pnpm --version`)
pub(crate) const PROBE_TIMEOUT: Duration = Duration::from_secs(5);

/// Ceiling for short housekeeping commands (valet site management, browser launch)
pub(crate) const COMMAND_TIMEOUT: Duration = Duration::from_secs(60);

/// Ceiling for long-running work (clones, setup scripts, installers)
pub(crate) const LONG_TIMEOUT: Duration = Duration::from_secs(3600);
