//! Error types for dnsrec
//!
//! This module defines all error types used throughout the crate.
//!
//! The variants fall into two families:
//! - **validation**: bad or missing input, detected before any provider call
//! - **transport**: the provider could not be reached, refused the session,
//!   or answered with something we could not interpret
//!
//! A write that the provider acknowledged but that did not take effect is a
//! third case, [`Error::Verification`].

use thiserror::Error;

/// Result type alias for dnsrec operations
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for dnsrec
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Invalid or missing user input
    #[error("Invalid input: {0}")]
    Validation(String),

    /// Configuration errors (credentials, startup settings)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Authentication errors
    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// HTTP client errors (from provider endpoints)
    #[error("HTTP error: {0}")]
    Http(String),

    /// Provider response could not be interpreted
    #[error("Parse error: {0}")]
    Parse(String),

    /// Provider-specific error
    #[error("Provider error ({provider}): {message}")]
    Provider {
        /// Provider name
        provider: String,
        /// Error message
        message: String,
    },

    /// The provider accepted a write but the re-fetched state disagrees
    #[error("Verification failed: {0}")]
    Verification(String),
}

impl Error {
    /// Create a validation error
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create an authentication error
    pub fn auth(msg: impl Into<String>) -> Self {
        Self::Authentication(msg.into())
    }

    /// Create an HTTP error
    pub fn http(msg: impl Into<String>) -> Self {
        Self::Http(msg.into())
    }

    /// Create a parse error
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse(msg.into())
    }

    /// Create a provider-specific error
    pub fn provider(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Provider {
            provider: provider.into(),
            message: message.into(),
        }
    }

    /// Create a verification error
    pub fn verification(msg: impl Into<String>) -> Self {
        Self::Verification(msg.into())
    }

    /// True for errors raised before any provider interaction
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_) | Self::Config(_))
    }

    /// True for errors raised while talking to the provider
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            Self::Authentication(_) | Self::Http(_) | Self::Parse(_) | Self::Provider { .. }
        )
    }
}
