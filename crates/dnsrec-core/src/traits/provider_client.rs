// # Provider Client Trait
//
// Defines the interface to the remote DNS hosting provider.
//
// ## Implementations
//
// - STRATO: `dnsrec-provider-strato` crate
//
// ## Usage
//
// ```rust,ignore
// use dnsrec_core::ProviderClient;
//
// #[tokio::main]
// async fn main() -> anyhow::Result<()> {
//     let client = /* ProviderClient implementation */;
//
//     let mut config = client.fetch_configuration().await?;
//     config.records.retain(|r| r.prefix != "old");
//     client.replace_configuration(&config).await?;
//
//     Ok(())
// }
// ```

use async_trait::async_trait;

use crate::record::Configuration;

/// Trait for provider client implementations
///
/// The provider holds the only durable copy of a domain's DNS configuration.
/// It offers whole-envelope reads and whole-envelope writes, nothing finer
/// grained and no conditional update.
///
/// An implementation is constructed once per invocation with its
/// credentials and handed to the [`Reconciler`](crate::Reconciler).
///
/// # Trust Level: Untrusted
///
/// Providers are **untrusted** components:
///
/// ## Allowed Capabilities
/// - ✅ Authenticate and talk to their own endpoints
/// - ✅ Encode/decode the provider-specific wire format
/// - ✅ Return success or failure
///
/// ## Forbidden Capabilities
/// - ❌ Retry or back off (a failure is terminal for the invocation)
/// - ❌ Cache a configuration between calls
/// - ❌ Decide whether a write is needed (owned by `Reconciler`)
/// - ❌ Merge a written configuration with remote state
///
/// A successful `replace_configuration` is **not** proof the write took
/// effect. The engine always re-fetches and checks.
#[async_trait]
pub trait ProviderClient: Send + Sync {
    /// Fetch the current configuration envelope for the domain
    ///
    /// Every call must hit the provider; the result is a fresh snapshot.
    async fn fetch_configuration(&self) -> Result<Configuration, crate::Error>;

    /// Replace the whole configuration envelope for the domain
    ///
    /// Records missing from `config` are deleted at the provider, and both
    /// policy fields are overwritten with the values in `config`.
    async fn replace_configuration(&self, config: &Configuration) -> Result<(), crate::Error>;

    /// Get the provider name (for logging/debugging)
    fn provider_name(&self) -> &'static str;
}
