//! The `verify` subcommand: re-check a saved submission record.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;
use invoice_seal::client::Transport;
use invoice_seal::{verify_submission_record, SubmissionRecord};

use crate::authority::connect;
use crate::new_invoice::EXIT_UNVERIFIED;
use crate::{expand_home, GlobalOpts};

/// Arguments for `verify`.
#[derive(Args, Debug)]
pub struct VerifyArgs {
    /// Saved submission record (JSON).
    pub record: PathBuf,

    /// Authority public key (hex). Fetched from the authority when absent.
    #[arg(long)]
    pub authority_key: Option<String>,
}

/// Load a saved submission record.
pub fn load_record(path: &Path) -> Result<SubmissionRecord> {
    let path = expand_home(path);
    let raw = std::fs::read(&path).with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_slice(&raw).with_context(|| format!("parsing {}", path.display()))
}

/// Verify a record against a known authority key.
pub fn check_record(record: &SubmissionRecord, authority_key: &str) -> u8 {
    match verify_submission_record(record, authority_key) {
        Ok(()) => {
            println!("record verified, token {}", record.token());
            0
        }
        Err(e) => {
            tracing::error!(token = %record.token(), "record failed verification: {e}");
            EXIT_UNVERIFIED
        }
    }
}

/// Execute the `verify` subcommand.
pub async fn run_verify(args: &VerifyArgs, opts: &GlobalOpts) -> Result<u8> {
    let record = load_record(&args.record)?;
    let authority_key = match &args.authority_key {
        Some(key) => key.clone(),
        None => connect(opts)?.version().await?.pubkey,
    };
    Ok(check_record(&record, &authority_key))
}
