//! Test doubles and common utilities for reconciliation contract tests
//!
//! The mock provider keeps one "remote" configuration in memory and can be
//! told to misbehave in the ways a real provider does: fail a fetch, reject
//! a write, or acknowledge a write and store something else.

#![allow(dead_code)]

use dnsrec_core::error::Result;
use dnsrec_core::{Configuration, Error, ProviderClient, Record};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// What the mock does with a configuration passed to `replace_configuration`
#[derive(Clone, Copy)]
pub enum WriteMode {
    /// Store exactly what was written
    Store,
    /// Acknowledge the write but keep the old configuration
    Ignore,
    /// Store the result of the function instead of what was written
    Transform(fn(&Configuration) -> Configuration),
}

/// A mock ProviderClient backed by an in-memory configuration
///
/// Clones share the stored configuration and all counters, so a test can
/// box one clone into the engine and inspect another.
#[derive(Clone)]
pub struct MockProviderClient {
    /// The provider-side configuration
    stored: Arc<Mutex<Configuration>>,
    /// Every configuration passed to replace_configuration(), in order
    written: Arc<Mutex<Vec<Configuration>>>,
    /// Call counter for fetch_configuration()
    fetch_call_count: Arc<AtomicUsize>,
    /// Call counter for replace_configuration()
    replace_call_count: Arc<AtomicUsize>,
    /// 1-based fetch call that fails
    fail_fetch_on_call: Option<usize>,
    /// Error returned by every replace call
    replace_error: Option<Error>,
    /// Change applied to the stored configuration just before a write lands
    concurrent_change: Option<fn(&mut Configuration)>,
    write_mode: WriteMode,
}

impl MockProviderClient {
    pub fn new(initial: Configuration) -> Self {
        Self {
            stored: Arc::new(Mutex::new(initial)),
            written: Arc::new(Mutex::new(Vec::new())),
            fetch_call_count: Arc::new(AtomicUsize::new(0)),
            replace_call_count: Arc::new(AtomicUsize::new(0)),
            fail_fetch_on_call: None,
            replace_error: None,
            concurrent_change: None,
            write_mode: WriteMode::Store,
        }
    }

    /// Make the n-th (1-based) fetch return a transport error
    pub fn failing_fetch_on_call(mut self, call: usize) -> Self {
        self.fail_fetch_on_call = Some(call);
        self
    }

    /// Make every replace return `error`
    pub fn failing_replace(mut self, error: Error) -> Self {
        self.replace_error = Some(error);
        self
    }

    pub fn with_write_mode(mut self, mode: WriteMode) -> Self {
        self.write_mode = mode;
        self
    }

    /// Simulate another client changing the remote state between our
    /// fetch and our write
    pub fn with_concurrent_change(mut self, change: fn(&mut Configuration)) -> Self {
        self.concurrent_change = Some(change);
        self
    }

    /// Get the number of times fetch_configuration() was called
    pub fn fetch_call_count(&self) -> usize {
        self.fetch_call_count.load(Ordering::SeqCst)
    }

    /// Get the number of times replace_configuration() was called
    pub fn replace_call_count(&self) -> usize {
        self.replace_call_count.load(Ordering::SeqCst)
    }

    /// Get every configuration that was passed to replace_configuration()
    pub fn written(&self) -> Vec<Configuration> {
        self.written.lock().unwrap().clone()
    }

    /// Get the provider-side configuration
    pub fn stored(&self) -> Configuration {
        self.stored.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl ProviderClient for MockProviderClient {
    async fn fetch_configuration(&self) -> Result<Configuration> {
        let call = self.fetch_call_count.fetch_add(1, Ordering::SeqCst) + 1;
        if self.fail_fetch_on_call == Some(call) {
            return Err(Error::http("connection reset by peer"));
        }
        Ok(self.stored())
    }

    async fn replace_configuration(&self, config: &Configuration) -> Result<()> {
        self.replace_call_count.fetch_add(1, Ordering::SeqCst);
        self.written.lock().unwrap().push(config.clone());

        if let Some(ref error) = self.replace_error {
            return Err(error.clone());
        }

        let mut stored = self.stored.lock().unwrap();
        if let Some(change) = self.concurrent_change {
            change(&mut stored);
        }
        match self.write_mode {
            WriteMode::Store => *stored = config.clone(),
            WriteMode::Ignore => {}
            WriteMode::Transform(transform) => *stored = transform(config),
        }
        Ok(())
    }

    fn provider_name(&self) -> &'static str {
        "mock"
    }
}

/// The SPF record used across the contract tests
pub fn spf_record() -> Record {
    Record::new("TXT", "@", "v=spf1 include:_spf.example.com ~all")
}

/// The DMARC record used across the contract tests
pub fn dmarc_record() -> Record {
    Record::new("TXT", "_dmarc", "v=DMARC1; p=none")
}

/// Initial configuration: one DMARC record, both policies set
pub fn initial_config() -> Configuration {
    Configuration::new("v=DMARC1", "v=spf1", vec![dmarc_record()])
}
