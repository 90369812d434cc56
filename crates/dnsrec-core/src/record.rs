//! DNS record model
//!
//! A [`Record`] has no identity beyond its three fields: two records are the
//! same record iff kind, prefix and value are byte-identical. A
//! [`Configuration`] is the full envelope the provider hands out and takes
//! back: both policy settings plus the ordered record list.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A single DNS record
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Record {
    /// Record type (e.g. "TXT", "CNAME")
    pub kind: String,
    /// Label relative to the domain (e.g. "@", "_dmarc")
    pub prefix: String,
    /// Record content
    pub value: String,
}

impl Record {
    /// Create a new record
    pub fn new(
        kind: impl Into<String>,
        prefix: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        Self {
            kind: kind.into(),
            prefix: prefix.into(),
            value: value.into(),
        }
    }

    /// True if all three fields are non-empty
    pub fn is_complete(&self) -> bool {
        !self.kind.is_empty() && !self.prefix.is_empty() && !self.value.is_empty()
    }
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Type: '{}', Prefix: '{}', Value: '{}'",
            self.kind, self.prefix, self.value
        )
    }
}

/// True if some element of `records` is structurally equal to `record`
pub fn contains(records: &[Record], record: &Record) -> bool {
    records.iter().any(|entry| entry == record)
}

/// DNS configuration envelope for one domain
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Configuration {
    /// DMARC policy type as reported by the provider
    pub dmarc_policy: String,
    /// SPF policy type as reported by the provider
    pub spf_policy: String,
    /// Records in provider order
    pub records: Vec<Record>,
}

impl Configuration {
    pub fn new(
        dmarc_policy: impl Into<String>,
        spf_policy: impl Into<String>,
        records: Vec<Record>,
    ) -> Self {
        Self {
            dmarc_policy: dmarc_policy.into(),
            spf_policy: spf_policy.into(),
            records,
        }
    }

    pub fn contains(&self, record: &Record) -> bool {
        contains(&self.records, record)
    }

    /// Number of records structurally equal to `record`
    pub fn count_of(&self, record: &Record) -> usize {
        self.records.iter().filter(|entry| *entry == record).count()
    }

    /// Copy of this envelope with `record` appended after the existing records
    ///
    /// Both policies are carried over unchanged.
    pub fn with_record_appended(&self, record: &Record) -> Self {
        let mut records = self.records.clone();
        records.push(record.clone());

        Self {
            dmarc_policy: self.dmarc_policy.clone(),
            spf_policy: self.spf_policy.clone(),
            records,
        }
    }

    /// Copy of this envelope without any record equal to `record`
    ///
    /// Returns the new envelope and how many entries were dropped. Every
    /// match is dropped, not only the first. Order of the remaining records
    /// and both policies are preserved.
    pub fn without_record(&self, record: &Record) -> (Self, usize) {
        let records: Vec<Record> = self
            .records
            .iter()
            .filter(|entry| *entry != record)
            .cloned()
            .collect();
        let removed = self.records.len() - records.len();

        (
            Self {
                dmarc_policy: self.dmarc_policy.clone(),
                spf_policy: self.spf_policy.clone(),
                records,
            },
            removed,
        )
    }
}
