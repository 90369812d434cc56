// # dnsrec-core
//
// Core library for verified DNS record management at a hosting provider.
//
// ## Architecture Overview
//
// - **Record / Configuration**: value types for one DNS record and the full
//   envelope a provider stores for a domain
// - **Request**: a validated list/add/remove command
// - **ProviderClient**: trait for fetching and replacing the envelope
// - **Reconciler**: fetch → mutate → replace → re-fetch → verify
// - **Outcome**: tagged result of one request
//
// ## Design Principles
//
// 1. **Provider is the source of truth**: nothing is cached across calls
// 2. **Verify, don't trust**: success is only reported after a re-fetch
//    confirms the change
// 3. **Idempotent commands**: adding a present record or removing an
//    absent one writes nothing
// 4. **Library-First**: the CLI is a thin layer over this crate

pub mod config;
pub mod engine;
pub mod error;
pub mod record;
pub mod request;
pub mod traits;

// Re-export core types for convenience
pub use config::Credentials;
pub use engine::{Failure, FailureKind, Outcome, Reconciler, Stage};
pub use error::{Error, Result};
pub use record::{Configuration, Record, contains};
pub use request::{Operation, Request};
pub use traits::ProviderClient;
