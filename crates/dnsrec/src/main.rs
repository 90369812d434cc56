// # dnsrec - DNS record command-line tool
//
// The dnsrec binary is a THIN integration layer. It is responsible for:
// 1. Parsing and validating command-line flags
// 2. Initializing logging and the runtime
// 3. Constructing the STRATO provider client
// 4. Handing the request to the reconciliation engine
// 5. Rendering the outcome and choosing the exit code
//
// All record logic lives in dnsrec-core.
//
// ## Example
//
// ```bash
// dnsrec --identifier 12345678 --password '...' --order 87654321 \
//        --domain example.com --command add \
//        --type TXT --prefix @ --value 'v=spf1 include:_spf.example.com ~all'
// ```

mod cli;
mod render;

use anyhow::{Context, Result};
use clap::Parser;
use dnsrec_core::{Outcome, Reconciler};
use dnsrec_provider_strato::StratoClient;
use std::io::Write;
use std::process::ExitCode;
use tracing::{error, info};
use tracing_subscriber::FmtSubscriber;

use cli::{Args, Invocation, OutputFormat};

/// Exit codes for different termination scenarios
///
/// - 0: Command completed (including "already exists" and "not found")
/// - 1: Invalid flags or startup error
/// - 2: Command failed (provider error or unverified write)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DnsrecExitCode {
    Success = 0,
    ConfigError = 1,
    RuntimeError = 2,
}

impl From<DnsrecExitCode> for ExitCode {
    fn from(code: DnsrecExitCode) -> Self {
        ExitCode::from(code as u8)
    }
}

fn main() -> ExitCode {
    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(e) => {
            // --help and --version end up here too
            let _ = e.print();
            return if e.use_stderr() {
                DnsrecExitCode::ConfigError.into()
            } else {
                DnsrecExitCode::Success.into()
            };
        }
    };

    let invocation = match args.into_invocation() {
        Ok(invocation) => invocation,
        Err(e) => {
            eprintln!("Configuration error: {:#}", e);
            return DnsrecExitCode::ConfigError.into();
        }
    };

    // Logs go to stderr so the report on stdout stays clean
    let subscriber = FmtSubscriber::builder()
        .with_max_level(invocation.log_level)
        .with_writer(std::io::stderr)
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
        return DnsrecExitCode::ConfigError.into();
    }

    // One request at a time; no need for worker threads
    let rt = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("Failed to create tokio runtime: {}", e);
            return DnsrecExitCode::RuntimeError.into();
        }
    };

    let format = invocation.format;
    let operation = invocation.request.operation();

    let outcome = match rt.block_on(run(invocation)) {
        Ok(outcome) => outcome,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            return DnsrecExitCode::ConfigError.into();
        }
    };

    let mut stdout = std::io::stdout().lock();
    let written = match format {
        OutputFormat::Text => render::write_text(&mut stdout, operation, &outcome),
        OutputFormat::Json => render::write_json(&mut stdout, operation, &outcome),
    }
    .and_then(|()| stdout.flush());
    if let Err(e) = written {
        eprintln!("Failed to write report: {}", e);
        return DnsrecExitCode::RuntimeError.into();
    }

    if let Outcome::Failed(failure) = &outcome {
        eprintln!("Error: {}", failure);
    }
    exit_code(&outcome).into()
}

/// Exit code for a finished command
///
/// "Already exists" and "not found" are successful no-ops.
fn exit_code(outcome: &Outcome) -> DnsrecExitCode {
    match outcome {
        Outcome::Failed(_) => DnsrecExitCode::RuntimeError,
        Outcome::Listed(_)
        | Outcome::Added { .. }
        | Outcome::AlreadyExists { .. }
        | Outcome::Removed { .. }
        | Outcome::NotFound { .. } => DnsrecExitCode::Success,
    }
}

/// Build the provider and engine, then execute the request
async fn run(invocation: Invocation) -> Result<Outcome> {
    info!(
        "Running {} for {}",
        invocation.request.operation(),
        invocation.credentials.domain
    );

    let client =
        StratoClient::new(invocation.credentials).context("Failed to create STRATO client")?;
    let engine = Reconciler::new(Box::new(client));

    Ok(engine.execute(&invocation.request).await)
}
