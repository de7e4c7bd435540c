//! # agp-core
//!
//! Foundation library for the AGP installer providing:
//! - External process execution with timeout and capture semantics
//! - Environment file (`.env`) templating
//! - Filesystem helpers (home directory lookup, symlink-safe removal)
//! - Styled terminal output

pub mod envfile;
pub mod error;
pub mod fs;
pub mod output;
pub mod process;

pub use envfile::EnvAssignment;
pub use error::{Error, Result};
pub use process::ProcessResult;
