//! Configuration types for dnsrec
//!
//! The only configuration is the set of credentials a provider client is
//! constructed with. Nothing is read from files or the environment here;
//! callers build [`Credentials`] explicitly.

use serde::Deserialize;
use std::fmt;

/// Account credentials and target domain for one invocation
#[derive(Clone, PartialEq, Eq, Deserialize)]
pub struct Credentials {
    /// Customer account identifier
    pub identifier: String,

    /// Account password
    /// ⚠️ NEVER log this value
    pub password: String,

    /// Order/package number the domain belongs to
    pub order: String,

    /// Domain (or subdomain) whose records are managed
    pub domain: String,
}

impl Credentials {
    pub fn new(
        identifier: impl Into<String>,
        password: impl Into<String>,
        order: impl Into<String>,
        domain: impl Into<String>,
    ) -> Self {
        Self {
            identifier: identifier.into(),
            password: password.into(),
            order: order.into(),
            domain: domain.into(),
        }
    }

    /// Validate that every field is set
    ///
    /// All empty fields are reported together.
    pub fn validate(&self) -> Result<(), crate::Error> {
        let missing: Vec<&str> = [
            ("identifier", &self.identifier),
            ("password", &self.password),
            ("order", &self.order),
            ("domain", &self.domain),
        ]
        .into_iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(name, _)| name)
        .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(crate::Error::config(format!(
                "missing required credential(s): {}",
                missing.join(", ")
            )))
        }
    }
}

// Custom Debug implementation that hides the password
impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("identifier", &self.identifier)
            .field("password", &"<REDACTED>")
            .field("order", &self.order)
            .field("domain", &self.domain)
            .finish()
    }
}
