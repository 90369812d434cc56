//! Reconciliation engine
//!
//! The [`Reconciler`] turns one requested change into a verified change at
//! the provider:
//!
//! ```text
//!        ┌──────────────┐  fetch   ┌────────────────┐
//!        │  Reconciler  │─────────▶│ ProviderClient │
//!        └──────────────┘          └────────────────┘
//!               │  C0                      ▲
//!               ▼                          │
//!   membership check ── present/absent ──▶ no-op outcome (no write)
//!               │
//!               ▼  C1 = C0 ± target        │
//!            replace ──────────────────────┤
//!               │                          │
//!               ▼  re-fetch C2             │
//!            verify ───────────────────────┘
//! ```
//!
//! ## Verification
//!
//! The provider's write acknowledgement is never taken as proof of effect.
//! Success is only reported after a re-fetch shows the target present
//! (add) or absent (remove).
//!
//! ## Concurrency
//!
//! Each call performs at most: one fetch, one replace, one verification
//! fetch, strictly in sequence. There is no retry and no locking. A replace
//! writes the whole envelope computed from the first fetch, so a change
//! made by someone else between that fetch and the replace is overwritten.

use std::fmt;

use crate::error::Error;
use crate::record::{Configuration, Record};
use crate::request::Request;
use crate::traits::ProviderClient;
use tracing::{debug, info, warn};

/// Step of the reconciliation cycle at which a failure happened
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Initial fetch of the current configuration
    Fetch,
    /// Replace call
    Write,
    /// Re-fetch after a successful replace
    VerifyFetch,
    /// Comparison of the re-fetched configuration against the intent
    Verify,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Stage::Fetch => "fetch",
            Stage::Write => "write",
            Stage::VerifyFetch => "verify-fetch",
            Stage::Verify => "verify",
        })
    }
}

/// Whether a failure came from the provider or from the post-write check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// Fetch or replace returned an error
    Transport,
    /// Replace succeeded but the re-fetched state disagrees
    Verification,
}

/// Details of a failed operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Failure {
    pub stage: Stage,
    /// Record the operation was about, `None` for list
    pub target: Option<Record>,
    pub error: Error,
    /// Configuration fetched before the failure, if any
    pub before: Option<Configuration>,
    /// Configuration re-fetched after the write, if any
    pub after: Option<Configuration>,
}

impl Failure {
    fn new(stage: Stage, target: Option<&Record>, error: Error) -> Self {
        Self {
            stage,
            target: target.cloned(),
            error,
            before: None,
            after: None,
        }
    }

    fn with_before(mut self, before: &Configuration) -> Self {
        self.before = Some(before.clone());
        self
    }

    fn with_after(mut self, after: Configuration) -> Self {
        self.after = Some(after);
        self
    }

    pub fn kind(&self) -> FailureKind {
        match self.error {
            Error::Verification(_) => FailureKind::Verification,
            _ => FailureKind::Transport,
        }
    }
}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.target {
            Some(target) => write!(f, "{} error for {}: {}", self.stage, target, self.error),
            None => write!(f, "{} error: {}", self.stage, self.error),
        }
    }
}

/// Result of executing a [`Request`]
///
/// Mutation outcomes carry the snapshots they were decided on so callers can
/// report before/after state without talking to the provider again.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Current configuration
    Listed(Configuration),

    /// Record written and observed after the write
    Added {
        target: Record,
        before: Configuration,
        after: Configuration,
    },

    /// Record was already present; nothing written
    AlreadyExists {
        target: Record,
        current: Configuration,
    },

    /// Record written away and absent after the write
    Removed {
        target: Record,
        before: Configuration,
        after: Configuration,
    },

    /// Record was not present; nothing written
    NotFound {
        target: Record,
        current: Configuration,
    },

    /// The operation did not take effect
    Failed(Failure),
}

impl Outcome {
    /// False only for [`Outcome::Failed`]
    pub fn is_success(&self) -> bool {
        !matches!(self, Outcome::Failed(_))
    }

    /// Configuration as it was before any write
    pub fn before(&self) -> Option<&Configuration> {
        match self {
            Outcome::Listed(config) => Some(config),
            Outcome::Added { before, .. } | Outcome::Removed { before, .. } => Some(before),
            Outcome::AlreadyExists { current, .. } | Outcome::NotFound { current, .. } => {
                Some(current)
            }
            Outcome::Failed(failure) => failure.before.as_ref(),
        }
    }

    /// Configuration re-fetched after a write, if a write happened
    pub fn after(&self) -> Option<&Configuration> {
        match self {
            Outcome::Added { after, .. } | Outcome::Removed { after, .. } => Some(after),
            Outcome::Failed(failure) => failure.after.as_ref(),
            _ => None,
        }
    }

    /// Short machine-friendly name of the outcome
    pub fn name(&self) -> &'static str {
        match self {
            Outcome::Listed(_) => "listed",
            Outcome::Added { .. } => "added",
            Outcome::AlreadyExists { .. } => "already_exists",
            Outcome::Removed { .. } => "removed",
            Outcome::NotFound { .. } => "not_found",
            Outcome::Failed(_) => "failed",
        }
    }

    /// One-line message for the user, `None` for a plain listing
    pub fn summary(&self) -> Option<String> {
        match self {
            Outcome::Listed(_) => None,
            Outcome::Added { .. } => Some("New record added successfully".to_string()),
            Outcome::AlreadyExists { target, .. } => {
                Some(format!("Record already exists: {}", target))
            }
            Outcome::Removed { .. } => Some("Record successfully removed".to_string()),
            Outcome::NotFound { target, .. } => Some(format!("Record not found: {}", target)),
            Outcome::Failed(failure) => Some(failure.to_string()),
        }
    }
}

/// Reconciliation engine
///
/// Owns the provider client for the lifetime of one invocation. The client
/// is passed in rather than looked up, so tests can substitute a double.
pub struct Reconciler {
    provider: Box<dyn ProviderClient>,
}

impl Reconciler {
    pub fn new(provider: Box<dyn ProviderClient>) -> Self {
        Self { provider }
    }

    /// Execute a validated request
    pub async fn execute(&self, request: &Request) -> Outcome {
        match request {
            Request::List => self.list().await,
            Request::Add(target) => self.add_record(target).await,
            Request::Remove(target) => self.remove_record(target).await,
        }
    }

    /// Fetch the current configuration
    pub async fn list(&self) -> Outcome {
        match self.fetch(Stage::Fetch, None).await {
            Ok(config) => {
                info!("Fetched {} DNS record(s)", config.records.len());
                Outcome::Listed(config)
            }
            Err(failure) => Outcome::Failed(failure),
        }
    }

    /// Ensure `target` is present at the provider
    pub async fn add_record(&self, target: &Record) -> Outcome {
        self.try_add(target)
            .await
            .unwrap_or_else(Outcome::Failed)
    }

    /// Ensure no record equal to `target` is present at the provider
    pub async fn remove_record(&self, target: &Record) -> Outcome {
        self.try_remove(target)
            .await
            .unwrap_or_else(Outcome::Failed)
    }

    async fn try_add(&self, target: &Record) -> Result<Outcome, Failure> {
        let before = self.fetch(Stage::Fetch, Some(target)).await?;

        if before.contains(target) {
            info!("Record already exists, nothing to write: {}", target);
            return Ok(Outcome::AlreadyExists {
                target: target.clone(),
                current: before,
            });
        }

        let desired = before.with_record_appended(target);
        self.replace(&desired, target, &before).await?;

        let after = self
            .fetch(Stage::VerifyFetch, Some(target))
            .await
            .map_err(|failure| failure.with_before(&before))?;
        self.check_policies(&before, &after);

        if !after.contains(target) {
            warn!(
                "Provider accepted write but record is missing afterwards: {}",
                target
            );
            return Err(Failure::new(
                Stage::Verify,
                Some(target),
                Error::verification("record not present after write"),
            )
            .with_before(&before)
            .with_after(after));
        }

        info!("Added record: {}", target);
        Ok(Outcome::Added {
            target: target.clone(),
            before,
            after,
        })
    }

    async fn try_remove(&self, target: &Record) -> Result<Outcome, Failure> {
        let before = self.fetch(Stage::Fetch, Some(target)).await?;

        let (desired, removed) = before.without_record(target);
        if removed == 0 {
            info!("Record not found, nothing to write: {}", target);
            return Ok(Outcome::NotFound {
                target: target.clone(),
                current: before,
            });
        }
        if removed > 1 {
            warn!(
                "Found {} copies of record, removing all: {}",
                removed, target
            );
        }

        self.replace(&desired, target, &before).await?;

        let after = self
            .fetch(Stage::VerifyFetch, Some(target))
            .await
            .map_err(|failure| failure.with_before(&before))?;
        self.check_policies(&before, &after);

        if after.contains(target) {
            warn!(
                "Provider accepted write but record is still present afterwards: {}",
                target
            );
            return Err(Failure::new(
                Stage::Verify,
                Some(target),
                Error::verification("record still present after removal"),
            )
            .with_before(&before)
            .with_after(after));
        }

        info!("Removed record: {}", target);
        Ok(Outcome::Removed {
            target: target.clone(),
            before,
            after,
        })
    }

    async fn fetch(
        &self,
        stage: Stage,
        target: Option<&Record>,
    ) -> Result<Configuration, Failure> {
        debug!(
            "Fetching DNS configuration from {} ({})",
            self.provider.provider_name(),
            stage
        );

        self.provider
            .fetch_configuration()
            .await
            .map_err(|e| Failure::new(stage, target, e))
    }

    async fn replace(
        &self,
        desired: &Configuration,
        target: &Record,
        before: &Configuration,
    ) -> Result<(), Failure> {
        debug!(
            "Replacing DNS configuration at {}: {} -> {} record(s)",
            self.provider.provider_name(),
            before.records.len(),
            desired.records.len()
        );

        self.provider
            .replace_configuration(desired)
            .await
            .map_err(|e| Failure::new(Stage::Write, Some(target), e).with_before(before))
    }

    /// Warn when the provider changed a policy we wrote back unchanged
    fn check_policies(&self, before: &Configuration, after: &Configuration) {
        if before.dmarc_policy != after.dmarc_policy {
            warn!(
                "DMARC policy changed across write: '{}' -> '{}'",
                before.dmarc_policy, after.dmarc_policy
            );
        }
        if before.spf_policy != after.spf_policy {
            warn!(
                "SPF policy changed across write: '{}' -> '{}'",
                before.spf_policy, after.spf_policy
            );
        }
    }
}
