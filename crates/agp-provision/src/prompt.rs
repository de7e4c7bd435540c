//! User interaction for the provisioning pipeline
//!
//! Prompting is injected through the [`Prompter`] trait so stage logic
//! can be driven by a scripted implementation in tests. The pipeline
//! only asks questions when the run configuration allows interaction.

use std::collections::VecDeque;
use std::sync::Mutex;

use dialoguer::{Confirm, Input, Password, Select};

use crate::error::{Error, Result};

/// Interactive questions the pipeline can ask
pub trait Prompter {
    /// Free-form question, optionally with a default answer
    fn ask(&self, question: &str, default: Option<&str>) -> Result<String>;

    /// Hidden input for passwords and tokens
    fn ask_secret(&self, question: &str) -> Result<String>;

    /// Yes/no question
    fn confirm(&self, question: &str, default: bool) -> Result<bool>;

    /// Pick one of the given options
    fn choose(&self, question: &str, options: &[String]) -> Result<String>;
}

/// Terminal prompter backed by dialoguer
#[derive(Debug, Default)]
pub struct ConsolePrompter;

impl Prompter for ConsolePrompter {
    fn ask(&self, question: &str, default: Option<&str>) -> Result<String> {
        let mut input = Input::<String>::new().with_prompt(question);
        input = match default {
            Some(default) => input.default(default.to_string()),
            None => input.allow_empty(true),
        };
        Ok(input.interact_text()?)
    }

    fn ask_secret(&self, question: &str) -> Result<String> {
        Ok(Password::new()
            .with_prompt(question)
            .allow_empty_password(true)
            .interact()?)
    }

    fn confirm(&self, question: &str, default: bool) -> Result<bool> {
        Ok(Confirm::new()
            .with_prompt(question)
            .default(default)
            .interact()?)
    }

    fn choose(&self, question: &str, options: &[String]) -> Result<String> {
        let selection = Select::new()
            .with_prompt(question)
            .items(options)
            .default(0)
            .interact()?;
        Ok(options[selection].clone())
    }
}

/// Prompter that replays a fixed list of answers
///
/// Intended for tests and other non-terminal callers. An empty answer
/// falls back to the question's default; running out of answers is an
/// error, which makes unexpected prompts visible.
#[derive(Debug, Default)]
pub struct ScriptedPrompter {
    answers: Mutex<VecDeque<String>>,
}

impl ScriptedPrompter {
    pub fn new<I, S>(answers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            answers: Mutex::new(answers.into_iter().map(Into::into).collect()),
        }
    }

    fn next_answer(&self, question: &str) -> Result<String> {
        let mut queue = self
            .answers
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        queue
            .pop_front()
            .ok_or_else(|| Error::prompt_unavailable(question))
    }
}

impl Prompter for ScriptedPrompter {
    fn ask(&self, question: &str, default: Option<&str>) -> Result<String> {
        let answer = self.next_answer(question)?;
        if answer.is_empty() {
            if let Some(default) = default {
                return Ok(default.to_string());
            }
        }
        Ok(answer)
    }

    fn ask_secret(&self, question: &str) -> Result<String> {
        self.next_answer(question)
    }

    fn confirm(&self, question: &str, default: bool) -> Result<bool> {
        let answer = self.next_answer(question)?;
        if answer.is_empty() {
            return Ok(default);
        }
        Ok(matches!(answer.to_lowercase().as_str(), "y" | "yes" | "true"))
    }

    fn choose(&self, question: &str, _options: &[String]) -> Result<String> {
        self.next_answer(question)
    }
}
