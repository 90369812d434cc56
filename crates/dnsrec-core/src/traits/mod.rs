//! Core traits for dnsrec
//!
//! - [`ProviderClient`]: Fetch and replace a domain's DNS configuration

pub mod provider_client;

pub use provider_client::ProviderClient;
