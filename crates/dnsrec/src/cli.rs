//! Command-line arguments and their validation
//!
//! Every required value is checked here, before any network interaction.

use anyhow::Result;
use clap::{Parser, ValueEnum};
use dnsrec_core::{Credentials, Operation, Record, Request};
use tracing::Level;

/// Report format on standard output
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Parser, Debug)]
#[command(
    name = "dnsrec",
    version,
    about = "List, add and remove DNS records of a STRATO hosted domain"
)]
pub struct Args {
    /// STRATO customer identifier
    #[arg(long)]
    pub identifier: Option<String>,

    /// STRATO password
    #[arg(long)]
    pub password: Option<String>,

    /// Package order number the domain belongs to
    #[arg(long)]
    pub order: Option<String>,

    /// (Sub-)domain to manage
    #[arg(long)]
    pub domain: Option<String>,

    /// Command to execute: add, remove, or list
    #[arg(long)]
    pub command: Option<String>,

    /// Type of DNS record
    #[arg(long = "type", default_value = "TXT")]
    pub record_type: String,

    /// Prefix for the DNS record
    #[arg(long, default_value = "")]
    pub prefix: String,

    /// Value for the DNS record
    #[arg(long, default_value = "")]
    pub value: String,

    /// Report format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// Log level for messages on standard error
    #[arg(long, default_value = "warn")]
    pub log_level: String,
}

/// Everything needed to run one command
#[derive(Debug)]
pub struct Invocation {
    pub credentials: Credentials,
    pub request: Request,
    pub format: OutputFormat,
    pub log_level: Level,
}

impl Args {
    /// Validate the arguments and build the invocation
    pub fn into_invocation(self) -> Result<Invocation> {
        let required = [
            ("--identifier", &self.identifier),
            ("--password", &self.password),
            ("--order", &self.order),
            ("--domain", &self.domain),
            ("--command", &self.command),
        ];
        let missing: Vec<&str> = required
            .iter()
            .filter(|(_, value)| value.as_deref().is_none_or(|v| v.trim().is_empty()))
            .map(|(flag, _)| *flag)
            .collect();

        if !missing.is_empty() {
            anyhow::bail!(
                "All flags --identifier, --password, --order, --domain, and --command are required. \
                Missing: {}",
                missing.join(", ")
            );
        }

        let log_level = parse_log_level(&self.log_level)?;
        let operation: Operation = self.command.unwrap_or_default().parse()?;

        let credentials = Credentials::new(
            self.identifier.unwrap_or_default(),
            self.password.unwrap_or_default(),
            self.order.unwrap_or_default(),
            self.domain.unwrap_or_default(),
        );
        credentials.validate()?;

        let target = Record::new(self.record_type, self.prefix, self.value);
        let request = Request::new(operation, target)?;

        Ok(Invocation {
            credentials,
            request,
            format: self.format,
            log_level,
        })
    }
}

fn parse_log_level(level: &str) -> Result<Level> {
    match level.to_lowercase().as_str() {
        "trace" => Ok(Level::TRACE),
        "debug" => Ok(Level::DEBUG),
        "info" => Ok(Level::INFO),
        "warn" => Ok(Level::WARN),
        "error" => Ok(Level::ERROR),
        _ => anyhow::bail!(
            "--log-level '{}' is not valid. \
            Valid levels: trace, debug, info, warn, error",
            level
        ),
    }
}
