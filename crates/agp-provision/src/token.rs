//! GitHub token storage
//!
//! The token lives in a plain file under the user's configuration
//! directory and is asked for once. Only classic personal access
//! tokens are accepted, fine-grained tokens cannot read the
//! organization catalog.

use camino::{Utf8Path, Utf8PathBuf};
use tracing::debug;

use agp_core::output;

use crate::error::Result;
use crate::prompt::Prompter;

const CONFIG_DIR: &str = ".agp";
const TOKEN_FILE: &str = "github_token.txt";
const TOKEN_PREFIX: &str = "ghp_";

/// Persisted GitHub personal access token
pub struct TokenStore {
    path: Utf8PathBuf,
}

impl TokenStore {
    /// Store rooted at `<home>/.agp`
    pub fn new(home_dir: &Utf8Path) -> Self {
        Self {
            path: home_dir.join(CONFIG_DIR).join(TOKEN_FILE),
        }
    }

    /// Location of the token file
    pub fn path(&self) -> &Utf8Path {
        &self.path
    }

    /// Return the persisted token, if one is stored
    pub fn get(&self) -> Result<Option<String>> {
        if !self.path.is_file() {
            return Ok(None);
        }
        let token = std::fs::read_to_string(&self.path)?;
        Ok(Some(token.trim().to_string()))
    }

    /// Return the persisted token, or ask for one and persist it
    ///
    /// Input without the classic token prefix is rejected and asked
    /// again.
    pub fn get_or_ask(&self, prompter: &dyn Prompter) -> Result<String> {
        if let Some(token) = self.get()? {
            return Ok(token);
        }

        let token = loop {
            let answer = prompter.ask_secret("GitHub PAT (classic) with `repo` scope")?;
            if answer.starts_with(TOKEN_PREFIX) {
                break answer;
            }
            output::warning("Invalid GitHub PAT");
        };

        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.path, &token)?;
        debug!("Stored GitHub token at {}", self.path);

        Ok(token)
    }
}
