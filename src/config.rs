//! Runtime configuration for the messaging core.
//!
//! Configuration is read from a TOML document and may be overridden by
//! `AGORA_*` environment variables. Every field has a default so an empty
//! document is a valid configuration.

use serde::Deserialize;
use std::path::Path;
use thiserror::Error;

use crate::messaging::domain::PageLimits;

/// Default number of messages returned per message page.
pub const DEFAULT_MESSAGE_PAGE_SIZE: u64 = 10;

/// Default number of conversations returned per conversation page.
pub const DEFAULT_CONVERSATION_PAGE_SIZE: u64 = 20;

/// Default maximum number of pooled database connections.
pub const DEFAULT_POOL_MAX_SIZE: u32 = 10;

const ENV_DATABASE_URL: &str = "AGORA_DATABASE_URL";
const ENV_MESSAGE_PAGE_SIZE: &str = "AGORA_MESSAGE_PAGE_SIZE";
const ENV_CONVERSATION_PAGE_SIZE: &str = "AGORA_CONVERSATION_PAGE_SIZE";

/// Errors raised while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("failed to read config file {path}: {source}")]
    Read {
        /// Path that was being read.
        path: String,
        /// Underlying I/O failure.
        #[source]
        source: std::io::Error,
    },

    /// The configuration document is not valid TOML for this schema.
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    /// An environment override could not be parsed.
    #[error("invalid value '{value}' for {variable}")]
    InvalidOverride {
        /// Name of the offending environment variable.
        variable: &'static str,
        /// Raw value that failed to parse.
        value: String,
    },

    /// A page size of zero was configured.
    #[error("{0} must be greater than zero")]
    InvalidPageSize(&'static str),
}

/// Messaging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MessagingConfig {
    /// `PostgreSQL` connection URL; `None` when only in-memory adapters are used.
    pub database_url: Option<String>,
    /// Maximum number of pooled connections.
    pub pool_max_size: u32,
    /// Messages per page for conversation history reads.
    pub message_page_size: u64,
    /// Conversations per page for conversation listings.
    pub conversation_page_size: u64,
}

impl Default for MessagingConfig {
    fn default() -> Self {
        Self {
            database_url: None,
            pool_max_size: DEFAULT_POOL_MAX_SIZE,
            message_page_size: DEFAULT_MESSAGE_PAGE_SIZE,
            conversation_page_size: DEFAULT_CONVERSATION_PAGE_SIZE,
        }
    }
}

impl MessagingConfig {
    /// Parses configuration from a TOML document.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] for malformed documents and
    /// [`ConfigError::InvalidPageSize`] when a page size is zero.
    pub fn from_toml_str(document: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(document)?;
        config.validated()
    }

    /// Reads and parses a TOML configuration file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Read`] when the file cannot be read, otherwise
    /// the same errors as [`Self::from_toml_str`].
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let file = path.as_ref();
        let document = std::fs::read_to_string(file).map_err(|source| ConfigError::Read {
            path: file.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&document)
    }

    /// Applies `AGORA_*` overrides from the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidOverride`] when a numeric override does
    /// not parse.
    pub fn with_env_overrides(self) -> Result<Self, ConfigError> {
        self.with_overrides(|name| std::env::var(name).ok())
    }

    /// Applies overrides from an arbitrary lookup, keyed by variable name.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidOverride`] when a numeric override does
    /// not parse, or [`ConfigError::InvalidPageSize`] when it is zero.
    pub fn with_overrides(
        mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        if let Some(url) = lookup(ENV_DATABASE_URL) {
            self.database_url = Some(url);
        }
        if let Some(raw) = lookup(ENV_MESSAGE_PAGE_SIZE) {
            self.message_page_size = parse_override(ENV_MESSAGE_PAGE_SIZE, raw)?;
        }
        if let Some(raw) = lookup(ENV_CONVERSATION_PAGE_SIZE) {
            self.conversation_page_size = parse_override(ENV_CONVERSATION_PAGE_SIZE, raw)?;
        }
        self.validated()
    }

    /// Returns the pagination limits described by this configuration.
    #[must_use]
    pub const fn page_limits(&self) -> PageLimits {
        PageLimits::new(self.message_page_size, self.conversation_page_size)
    }

    fn validated(self) -> Result<Self, ConfigError> {
        if self.message_page_size == 0 {
            return Err(ConfigError::InvalidPageSize("message_page_size"));
        }
        if self.conversation_page_size == 0 {
            return Err(ConfigError::InvalidPageSize("conversation_page_size"));
        }
        Ok(self)
    }
}

fn parse_override(variable: &'static str, value: String) -> Result<u64, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::InvalidOverride { variable, value })
}
