//! Human and machine readable reports of an [`Outcome`]

use dnsrec_core::{Configuration, Operation, Outcome};
use serde::Serialize;
use std::io::{self, Write};

/// Write the text report for `outcome`
///
/// Failures are reported on standard error by the caller; here they only
/// contribute the configurations that were fetched before things went wrong.
pub fn write_text(out: &mut impl Write, operation: Operation, outcome: &Outcome) -> io::Result<()> {
    if operation == Operation::List {
        if let Some(config) = outcome.before() {
            write_configuration(out, config)?;
        }
        return Ok(());
    }

    if let Some(before) = outcome.before() {
        writeln!(out, "DNS configuration before update:")?;
        write_configuration(out, before)?;
    }
    if let Some(after) = outcome.after() {
        writeln!(out, "DNS configuration after update:")?;
        write_configuration(out, after)?;
    }
    if outcome.is_success()
        && let Some(summary) = outcome.summary()
    {
        writeln!(out, "{}", summary)?;
    }

    Ok(())
}

fn write_configuration(out: &mut impl Write, config: &Configuration) -> io::Result<()> {
    writeln!(out, "DMARC Type: {}", config.dmarc_policy)?;
    writeln!(out, "SPF Type: {}", config.spf_policy)?;
    writeln!(out, "DNS records:")?;
    for record in &config.records {
        writeln!(out, "{}", record)?;
    }
    Ok(())
}

#[derive(Serialize)]
struct JsonReport<'a> {
    command: &'static str,
    outcome: &'static str,
    success: bool,
    before: Option<&'a Configuration>,
    after: Option<&'a Configuration>,
    message: Option<String>,
}

/// Write the JSON report for `outcome` as a single object
pub fn write_json(out: &mut impl Write, operation: Operation, outcome: &Outcome) -> io::Result<()> {
    let report = JsonReport {
        command: operation.as_str(),
        outcome: outcome.name(),
        success: outcome.is_success(),
        before: outcome.before(),
        after: outcome.after(),
        message: outcome.summary(),
    };

    serde_json::to_writer_pretty(&mut *out, &report)?;
    writeln!(out)
}
