//! Error types for agp-provision

use thiserror::Error;

/// Result type alias using agp-provision's Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised by the provisioning pipeline
#[derive(Error, Debug)]
pub enum Error {
    /// The requested project name contains a path separator
    #[error("Directory may not contain slashes.")]
    InvalidProjectName,

    /// The target directory already exists
    #[error("Directory \"{name}\" already exists.")]
    DirectoryExists { name: String },

    /// The target directory could not be created
    #[error("Directory \"{name}\" was not created: {source}")]
    DirectoryNotCreated {
        name: String,
        source: std::io::Error,
    },

    /// Cloning a named project repository failed
    #[error("An error occurred while cloning \"{project}\".\n{stderr}")]
    ProjectCloneFailed { project: String, stderr: String },

    /// Cloning the base repository failed
    #[error("An error occurred while cloning the repository.\n{stderr}")]
    BaseCloneFailed { stderr: String },

    /// The setup script exited with a failure
    #[error("An error occurred while setting up the project.\n{stderr}")]
    SetupFailed { stderr: String },

    /// Installing Composer dependencies failed
    #[error("An error occurred while installing the Composer dependencies.\n{stderr}")]
    ComposerInstallFailed { stderr: String },

    /// The database installer exited with a failure
    #[error("An error occurred while installing the AGP.\n{stderr}")]
    DatabaseInstallFailed { stderr: String },

    /// A scripted prompter ran out of answers
    #[error("No answer available for prompt: {question}")]
    PromptUnavailable { question: String },

    /// A terminal prompt failed
    #[error("Prompt failed: {0}")]
    Prompt(#[from] dialoguer::Error),

    /// JSON parsing error
    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    /// Core error
    #[error(transparent)]
    Core(#[from] agp_core::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    pub fn directory_exists(name: impl Into<String>) -> Self {
        Self::DirectoryExists { name: name.into() }
    }

    pub fn directory_not_created(name: impl Into<String>, source: std::io::Error) -> Self {
        Self::DirectoryNotCreated {
            name: name.into(),
            source,
        }
    }

    pub fn project_clone_failed(project: impl Into<String>, stderr: impl Into<String>) -> Self {
        Self::ProjectCloneFailed {
            project: project.into(),
            stderr: stderr.into(),
        }
    }

    pub fn base_clone_failed(stderr: impl Into<String>) -> Self {
        Self::BaseCloneFailed {
            stderr: stderr.into(),
        }
    }

    pub fn setup_failed(stderr: impl Into<String>) -> Self {
        Self::SetupFailed {
            stderr: stderr.into(),
        }
    }

    pub fn composer_install_failed(stderr: impl Into<String>) -> Self {
        Self::ComposerInstallFailed {
            stderr: stderr.into(),
        }
    }

    pub fn database_install_failed(stderr: impl Into<String>) -> Self {
        Self::DatabaseInstallFailed {
            stderr: stderr.into(),
        }
    }

    pub fn prompt_unavailable(question: impl Into<String>) -> Self {
        Self::PromptUnavailable {
            question: question.into(),
        }
    }

    /// Whether this error reflects rejected input rather than a failed stage
    pub fn is_invalid_input(&self) -> bool {
        matches!(self, Self::InvalidProjectName)
    }

    /// Whether this error is a Ctrl-C surfacing through a raw-mode prompt
    ///
    /// dialoguer owns the terminal while a question is on screen, so the
    /// interrupt arrives as an `Interrupted` I/O error instead of a
    /// signal. Callers treat it exactly like a signal-delivered Ctrl-C.
    pub fn is_interrupt(&self) -> bool {
        matches!(
            self,
            Self::Prompt(dialoguer::Error::IO(err))
                if err.kind() == std::io::ErrorKind::Interrupted
        )
    }
}
