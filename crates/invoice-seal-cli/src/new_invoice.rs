//! The `new-invoice` and `parse` subcommands.

use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;
use invoice_seal::core::canonical_invoice_bytes;
use invoice_seal::{
    CsvPolicy, InvoiceInput, InvoicePeriod, SubmissionError, Submitter, SubmitterConfig, Transport,
};

use crate::authority::connect;
use crate::identity::resolve_identity;
use crate::{expand_home, period, GlobalOpts};

/// Exit code when the authority's receipt does not verify.
pub const EXIT_UNVERIFIED: u8 = 2;

/// Arguments for `new-invoice`.
#[derive(Args, Debug)]
pub struct NewInvoiceArgs {
    /// Billing month (1-12).
    pub month: u16,

    /// Billing year.
    pub year: u16,

    /// Invoice table (CSV).
    pub csv: PathBuf,

    /// Files attached after the invoice record, in order.
    pub attachments: Vec<PathBuf>,

    /// Write the verified submission record to this file.
    #[arg(long)]
    pub save: Option<PathBuf>,

    /// Skip the local bundle policy check and let the authority decide.
    #[arg(long)]
    pub no_policy: bool,
}

/// Arguments for `parse`.
#[derive(Args, Debug)]
pub struct ParseArgs {
    /// Billing month (1-12).
    pub month: u16,

    /// Billing year.
    pub year: u16,

    /// Invoice table (CSV).
    pub csv: PathBuf,
}

fn read_csv(path: &Path) -> Result<Vec<u8>> {
    let path = expand_home(path);
    std::fs::read(&path).with_context(|| format!("reading invoice table {}", path.display()))
}

/// Execute the `new-invoice` subcommand.
pub async fn run_new_invoice(args: &NewInvoiceArgs, opts: &GlobalOpts) -> Result<u8> {
    let period = period(args.month, args.year)?;
    let csv = read_csv(&args.csv)?;
    let attachments: Vec<PathBuf> = args.attachments.iter().map(|p| expand_home(p)).collect();

    let config = SubmitterConfig {
        enforce_policy: !args.no_policy,
        ..SubmitterConfig::default()
    };
    let identity = resolve_identity(opts.identity.as_deref())?;
    let submitter = Submitter::new(connect(opts)?, identity, config);

    submit(
        &submitter,
        period,
        &csv,
        &attachments,
        args.save.as_deref(),
        &mut std::io::stdout(),
    )
    .await
}

/// Submit and verify, printing the request and then the verified record.
///
/// The authority's reply is only written to `out` once it has verified.
async fn submit<T: Transport>(
    submitter: &Submitter<T>,
    period: InvoicePeriod,
    csv: &[u8],
    attachments: &[PathBuf],
    save: Option<&Path>,
    out: &mut impl Write,
) -> Result<u8> {
    let invoice = submitter.parse(period, csv)?;
    let prepared = submitter.prepare(&invoice, attachments)?;
    writeln!(out, "{}", serde_json::to_string_pretty(&prepared.request())?)?;

    let authority_key = submitter.authority_key().await?;
    let sent = submitter.send(prepared).await?;

    match sent.verify(&authority_key) {
        Ok(record) => {
            writeln!(
                out,
                "{}",
                serde_json::to_string_pretty(&record.censorship_record)?
            )?;
            if let Some(path) = save {
                let path = expand_home(path);
                std::fs::write(&path, serde_json::to_vec_pretty(&record)?)
                    .with_context(|| format!("saving record to {}", path.display()))?;
                tracing::info!(path = %path.display(), "submission record saved");
            }
            Ok(0)
        }
        Err(e @ SubmissionError::Verification { .. }) => {
            tracing::error!("{e}");
            tracing::warn!("the authority may hold this submission but its receipt is untrusted");
            Ok(EXIT_UNVERIFIED)
        }
        Err(e) => Err(e.into()),
    }
}

/// Execute the `parse` subcommand. Nothing is signed or sent.
pub fn run_parse(args: &ParseArgs) -> Result<u8> {
    let period = period(args.month, args.year)?;
    let invoice = InvoiceInput::from_csv(period, &read_csv(&args.csv)?, &CsvPolicy::default())?;
    let bytes = canonical_invoice_bytes(&invoice)?;
    println!("{}", String::from_utf8_lossy(&bytes));
    tracing::info!(
        line_items = invoice.line_items.len(),
        total_hours = invoice.total_hours(),
        total_cost = invoice.total_cost(),
        "invoice parsed"
    );
    Ok(0)
}
