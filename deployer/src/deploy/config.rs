//! Generated configuration for the deployed applications
//!
//! The settings modules of both applications are plain Python files. They are
//! modelled as an ordered list of lines in which top-level `KEY = value`
//! assignments are addressable by key; every other line is kept verbatim.

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::errors::DeployError;
use crate::filesys::file::File;
use crate::utils::{generate_uuid, random_alphanumeric};

pub const CLIENT_ID_KEY: &str = "CLIENT_ID";
pub const CLIENT_SECRET_KEY: &str = "CLIENT_SECRET";
pub const FILE_SERVER_BASE_URL_KEY: &str = "FILE_SERVER_BASE_URL";
pub const FILES_DIRECTORY_KEY: &str = "FILES_DIRECTORY";

/// Length of the generated client secret
pub const CLIENT_SECRET_LEN: usize = 16;

/// How generated keys are written
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfigPolicy {
    /// Replace an existing assignment in place, drop later duplicates
    #[default]
    Upsert,

    /// Always add a new line at the end
    Append,
}

/// Client credentials shared by the web app and the file server
#[derive(Debug)]
pub struct CredentialPair {
    pub client_id: String,
    pub client_secret: SecretString,
}

impl CredentialPair {
    /// Generate a fresh pair: a UUID v4 id and a 16 character alphanumeric secret
    pub fn generate() -> Self {
        Self {
            client_id: generate_uuid(),
            client_secret: SecretString::from(random_alphanumeric(CLIENT_SECRET_LEN)),
        }
    }

    /// Write both keys into `config`
    pub fn write_into(&self, config: &mut ConfigFile, policy: ConfigPolicy) {
        config.apply(policy, CLIENT_ID_KEY, &self.client_id);
        config.apply(policy, CLIENT_SECRET_KEY, self.client_secret.expose_secret());
    }
}

/// An ordered settings module
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigFile {
    lines: Vec<String>,
}

impl ConfigFile {
    pub fn parse(contents: &str) -> Self {
        Self {
            lines: contents.lines().map(str::to_string).collect(),
        }
    }

    /// Load from disk; a missing file is an empty config
    pub async fn load(file: &File) -> Result<Self, DeployError> {
        let contents = file.read_optional_string().await?.unwrap_or_default();
        Ok(Self::parse(&contents))
    }

    /// Write the whole file back
    pub async fn save(&self, file: &File) -> Result<(), DeployError> {
        debug!("Writing {} lines to {:?}", self.lines.len(), file.path());
        file.write_atomic(self.render().as_bytes()).await
    }

    pub fn render(&self) -> String {
        let mut out = self.lines.join("\n");
        if !out.is_empty() {
            out.push('\n');
        }
        out
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn apply(&mut self, policy: ConfigPolicy, key: &str, value: &str) {
        match policy {
            ConfigPolicy::Upsert => self.set(key, value),
            ConfigPolicy::Append => self.append(key, value),
        }
    }

    /// Insert or replace `key`. The first existing assignment is rewritten in
    /// place and any later assignment of the same key is removed.
    pub fn set(&mut self, key: &str, value: &str) {
        let line = render_assignment(key, value);
        let mut replaced = false;
        self.lines.retain_mut(|existing| {
            if assignment_key(existing) != Some(key) {
                return true;
            }
            if replaced {
                return false;
            }
            *existing = line.clone();
            replaced = true;
            true
        });
        if !replaced {
            self.lines.push(line);
        }
    }

    /// Add an assignment at the end regardless of existing ones
    pub fn append(&mut self, key: &str, value: &str) {
        self.lines.push(render_assignment(key, value));
    }

    /// Effective value of `key`: the last assignment, unquoted
    pub fn get(&self, key: &str) -> Option<String> {
        self.lines
            .iter()
            .rev()
            .find(|line| assignment_key(line) == Some(key))
            .and_then(|line| line.split_once('='))
            .map(|(_, value)| unquote(value.trim()))
    }

    /// Number of assignments of `key`
    pub fn count(&self, key: &str) -> usize {
        self.lines
            .iter()
            .filter(|line| assignment_key(line) == Some(key))
            .count()
    }
}

/// Key of a top-level `KEY = value` line. Keys are upper-case identifiers;
/// indented lines belong to a block and are never matched.
fn assignment_key(line: &str) -> Option<&str> {
    let (lhs, _) = line.split_once('=')?;
    if lhs.starts_with(char::is_whitespace) {
        return None;
    }
    let key = lhs.trim_end();
    let mut chars = key.chars();
    let first = chars.next()?;
    let valid = (first.is_ascii_uppercase() || first == '_')
        && chars.all(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || c == '_');
    valid.then_some(key)
}

fn render_assignment(key: &str, value: &str) -> String {
    let escaped = value
        .replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('\n', "\\n");
    format!("{}=\"{}\"", key, escaped)
}

fn unquote(raw: &str) -> String {
    let quoted = raw.len() >= 2
        && ((raw.starts_with('"') && raw.ends_with('"'))
            || (raw.starts_with('\'') && raw.ends_with('\'')));
    if !quoted {
        return raw.to_string();
    }

    let inner = &raw[1..raw.len() - 1];
    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }
    out
}
