//! Destination contact handle for the goal screen
//!
//! The handle is optional configuration resolved through an ordered list of
//! sources. A missing or malformed handle only hides the contact action.

use serde::Deserialize;
use thiserror::Error;

/// Environment variable holding the handle
pub const CONTACT_ENV_VAR: &str = "PHONE_NUMBER";
/// Endpoint the web shell fetches the remote config from
pub const REMOTE_CONFIG_PATH: &str = "/api/config";
/// Message prefilled in the chat link
pub const DEFAULT_CONTACT_MESSAGE: &str = "Hi, I reached the end of the game. Thanks for everything.";

/// Template values shipped in example config files
const PLACEHOLDERS: &[&str] = &["TU_NUMERO_AQUI", "YOUR_NUMBER_HERE"];

#[derive(Debug, Error)]
pub enum ContactError {
    #[error("contact handle {0:?} is not a phone number")]
    Malformed(String),
    #[error("contact handle is an unfilled template value")]
    Placeholder,
    #[error("invalid contact config: {0}")]
    Json(#[from] serde_json::Error),
    #[error("failed to read contact config: {0}")]
    Io(#[from] std::io::Error),
    #[error("contact source unavailable: {0}")]
    Unavailable(String),
}

/// A validated phone handle, digits only
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactHandle(String);

impl ContactHandle {
    /// Normalize and validate a raw handle
    ///
    /// `+`, spaces, dashes and parentheses are stripped; what remains must be
    /// a non-empty run of ASCII digits.
    pub fn parse(raw: &str) -> Result<Self, ContactError> {
        let trimmed = raw.trim();
        if PLACEHOLDERS.iter().any(|p| p.eq_ignore_ascii_case(trimmed)) {
            return Err(ContactError::Placeholder);
        }
        let digits: String = trimmed
            .chars()
            .filter(|c| !matches!(c, '+' | ' ' | '-' | '(' | ')'))
            .collect();
        if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
            return Err(ContactError::Malformed(raw.to_string()));
        }
        Ok(Self(digits))
    }

    pub fn digits(&self) -> &str {
        &self.0
    }

    /// Chat deep link with a prefilled message
    pub fn chat_link(&self, message: &str) -> String {
        format!("https://wa.me/{}?text={}", self.0, percent_encode(message))
    }
}

fn percent_encode(text: &str) -> String {
    let mut out = String::with_capacity(text.len() * 3);
    for byte in text.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                out.push(byte as char)
            }
            _ => out.push_str(&format!("%{:02X}", byte)),
        }
    }
    out
}

/// Somewhere a contact handle might be configured
pub trait ContactSource {
    fn name(&self) -> &str;

    /// `Ok(None)` when this source simply has no value
    fn lookup(&self) -> Result<Option<String>, ContactError>;
}

/// Reads the handle from the process environment
#[derive(Debug, Clone)]
pub struct EnvSource {
    var: String,
}

impl EnvSource {
    pub fn new(var: impl Into<String>) -> Self {
        Self { var: var.into() }
    }
}

impl Default for EnvSource {
    fn default() -> Self {
        Self::new(CONTACT_ENV_VAR)
    }
}

impl ContactSource for EnvSource {
    fn name(&self) -> &str {
        "environment"
    }

    fn lookup(&self) -> Result<Option<String>, ContactError> {
        Ok(std::env::var(&self.var).ok().filter(|v| !v.trim().is_empty()))
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RemoteConfig {
    phone_number: Option<String>,
    #[serde(default)]
    success: bool,
}

/// Body of the remote config endpoint, already fetched by the host
#[derive(Debug, Clone)]
pub struct RemoteConfigSource {
    body: Result<String, String>,
}

impl RemoteConfigSource {
    pub fn from_body(body: impl Into<String>) -> Self {
        Self {
            body: Ok(body.into()),
        }
    }

    /// The fetch itself failed (network error, non-2xx status)
    pub fn failed(reason: impl Into<String>) -> Self {
        Self {
            body: Err(reason.into()),
        }
    }
}

impl ContactSource for RemoteConfigSource {
    fn name(&self) -> &str {
        "remote config"
    }

    fn lookup(&self) -> Result<Option<String>, ContactError> {
        let body = self
            .body
            .as_ref()
            .map_err(|reason| ContactError::Unavailable(reason.clone()))?;
        let config: RemoteConfig = serde_json::from_str(body)?;
        if !config.success {
            return Ok(None);
        }
        Ok(config.phone_number)
    }
}

#[cfg(not(target_arch = "wasm32"))]
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct OverrideFile {
    phone_number: Option<String>,
}

/// Local JSON override file (`{"phoneNumber": "..."}`)
#[cfg(not(target_arch = "wasm32"))]
#[derive(Debug, Clone)]
pub struct OverrideFileSource {
    path: std::path::PathBuf,
}

#[cfg(not(target_arch = "wasm32"))]
impl OverrideFileSource {
    pub fn new(path: impl Into<std::path::PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[cfg(not(target_arch = "wasm32"))]
impl ContactSource for OverrideFileSource {
    fn name(&self) -> &str {
        "override file"
    }

    fn lookup(&self) -> Result<Option<String>, ContactError> {
        if !self.path.exists() {
            return Ok(None);
        }
        let json = std::fs::read_to_string(&self.path)?;
        let file: OverrideFile = serde_json::from_str(&json)?;
        Ok(file.phone_number)
    }
}

/// First valid handle across `sources`, in order
///
/// Source failures and invalid values are logged and skipped.
pub fn resolve_contact(sources: &[&dyn ContactSource]) -> Option<ContactHandle> {
    for source in sources {
        let raw = match source.lookup() {
            Ok(Some(raw)) => raw,
            Ok(None) => continue,
            Err(e) => {
                log::warn!("Contact source '{}' failed: {}", source.name(), e);
                continue;
            }
        };
        match ContactHandle::parse(&raw) {
            Ok(handle) => {
                log::info!("Contact handle configured via {}", source.name());
                return Some(handle);
            }
            Err(e) => log::warn!("Ignoring contact from '{}': {}", source.name(), e),
        }
    }
    log::info!("No contact handle configured; goal screen will omit the contact action");
    None
}

/// Actions offered on the goal screen
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GoalAction {
    Contact { url: String },
    PlayAgain,
}

/// Goal screen actions, in display order
pub fn goal_actions(contact: Option<&ContactHandle>) -> Vec<GoalAction> {
    let mut actions = Vec::with_capacity(2);
    if let Some(handle) = contact {
        actions.push(GoalAction::Contact {
            url: handle.chat_link(DEFAULT_CONTACT_MESSAGE),
        });
    }
    actions.push(GoalAction::PlayAgain);
    actions
}
