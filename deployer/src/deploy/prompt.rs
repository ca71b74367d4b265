//! Operator input

use std::collections::VecDeque;
use std::io::{BufRead, Write};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::errors::DeployError;

/// Source of operator answers during a pipeline run
#[async_trait]
pub trait Prompter: Send + Sync {
    /// Yes/no question
    async fn confirm(&self, question: &str) -> Result<bool, DeployError>;

    /// Free-form answer; an empty string means "no value"
    async fn ask(&self, question: &str) -> Result<String, DeployError>;
}

/// Reads answers from the terminal
#[derive(Debug, Default)]
pub struct StdinPrompter;

impl StdinPrompter {
    async fn read_line(prompt: String) -> Result<String, DeployError> {
        tokio::task::spawn_blocking(move || -> Result<String, DeployError> {
            let mut stdout = std::io::stdout();
            write!(stdout, "{}", prompt)?;
            stdout.flush()?;

            let mut line = String::new();
            let read = std::io::stdin().lock().read_line(&mut line)?;
            if read == 0 {
                return Err(DeployError::PromptError("stdin closed".to_string()));
            }
            Ok(line.trim().to_string())
        })
        .await
        .map_err(|e| DeployError::PromptError(e.to_string()))?
    }
}

#[async_trait]
impl Prompter for StdinPrompter {
    async fn confirm(&self, question: &str) -> Result<bool, DeployError> {
        loop {
            let answer = Self::read_line(format!("{} [Y/n] ", question)).await?;
            match answer.to_lowercase().as_str() {
                "" | "y" | "yes" => return Ok(true),
                "n" | "no" => return Ok(false),
                _ => println!("I didn't understand you. Please specify '(y)es' or '(n)o'."),
            }
        }
    }

    async fn ask(&self, question: &str) -> Result<String, DeployError> {
        Self::read_line(format!("{} ", question)).await
    }
}

/// Fixed answers for non-interactive runs
#[derive(Debug, Default)]
pub struct ScriptedPrompter {
    confirmations: Mutex<VecDeque<bool>>,
    answers: Mutex<VecDeque<String>>,
    default_confirm: bool,
}

impl ScriptedPrompter {
    /// Every confirmation gets `confirm`, every question an empty answer
    pub fn new(default_confirm: bool) -> Self {
        Self {
            default_confirm,
            ..Default::default()
        }
    }

    pub fn with_confirmation(self, answer: bool) -> Self {
        lock(&self.confirmations).push_back(answer);
        self
    }

    pub fn with_answer(self, answer: impl Into<String>) -> Self {
        lock(&self.answers).push_back(answer.into());
        self
    }
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[async_trait]
impl Prompter for ScriptedPrompter {
    async fn confirm(&self, _question: &str) -> Result<bool, DeployError> {
        Ok(lock(&self.confirmations)
            .pop_front()
            .unwrap_or(self.default_confirm))
    }

    async fn ask(&self, _question: &str) -> Result<String, DeployError> {
        Ok(lock(&self.answers).pop_front().unwrap_or_default())
    }
}

/// Answers fixed on the command line, everything else delegated
pub struct PresetPrompter {
    confirm: Option<bool>,
    answer: Option<String>,
    fallback: Arc<dyn Prompter>,
}

impl PresetPrompter {
    pub fn new(fallback: Arc<dyn Prompter>) -> Self {
        Self {
            confirm: None,
            answer: None,
            fallback,
        }
    }

    pub fn confirm_with(mut self, answer: Option<bool>) -> Self {
        self.confirm = answer;
        self
    }

    pub fn answer_with(mut self, answer: Option<String>) -> Self {
        self.answer = answer;
        self
    }
}

#[async_trait]
impl Prompter for PresetPrompter {
    async fn confirm(&self, question: &str) -> Result<bool, DeployError> {
        match self.confirm {
            Some(answer) => Ok(answer),
            None => self.fallback.confirm(question).await,
        }
    }

    async fn ask(&self, question: &str) -> Result<String, DeployError> {
        match &self.answer {
            Some(answer) => Ok(answer.clone()),
            None => self.fallback.ask(question).await,
        }
    }
}
