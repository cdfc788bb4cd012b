//! # invoice-seal CLI entry point
//!
//! Parses command-line arguments and dispatches to subcommand handlers.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use invoice_seal_cli::authority::run_version;
use invoice_seal_cli::new_invoice::{run_new_invoice, run_parse, NewInvoiceArgs, ParseArgs};
use invoice_seal_cli::verify::{run_verify, VerifyArgs};
use invoice_seal_cli::GlobalOpts;

/// Submit sealed invoices and verify the authority's censorship records.
#[derive(Parser, Debug)]
#[command(name = "invoice-seal", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Authority URL (default: $INVOICE_SEAL_HOST or https://127.0.0.1:4443).
    #[arg(long, global = true)]
    host: Option<String>,

    /// Identity file holding the hex secret key (default: $INVOICE_SEAL_IDENTITY).
    #[arg(long, global = true)]
    identity: Option<PathBuf>,

    /// Accept a self-signed authority certificate.
    #[arg(long, global = true)]
    skip_verify: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Parse, sign, submit, and verify an invoice.
    NewInvoice(NewInvoiceArgs),

    /// Print the invoice record a table produces, without submitting.
    Parse(ParseArgs),

    /// Re-verify a saved submission record.
    Verify(VerifyArgs),

    /// Show the authority's API version and public key.
    Version,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let opts = GlobalOpts {
        host: cli.host,
        identity: cli.identity,
        skip_verify: cli.skip_verify,
    };

    let result = match &cli.command {
        Commands::NewInvoice(args) => run_new_invoice(args, &opts).await,
        Commands::Parse(args) => run_parse(args),
        Commands::Verify(args) => run_verify(args, &opts).await,
        Commands::Version => run_version(&opts).await,
    };

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::from(1)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_parse_new_invoice() {
        let cli = Cli::try_parse_from([
            "invoice-seal",
            "--identity",
            "~/.invoice-seal/identity",
            "new-invoice",
            "1",
            "2019",
            "invoice.csv",
            "a.png",
            "b.txt",
            "--save",
            "record.json",
        ])
        .unwrap();

        assert_eq!(cli.identity, Some(PathBuf::from("~/.invoice-seal/identity")));
        match cli.command {
            Commands::NewInvoice(args) => {
                assert_eq!((args.month, args.year), (1, 2019));
                assert_eq!(args.csv, PathBuf::from("invoice.csv"));
                assert_eq!(
                    args.attachments,
                    vec![PathBuf::from("a.png"), PathBuf::from("b.txt")]
                );
                assert_eq!(args.save, Some(PathBuf::from("record.json")));
                assert!(!args.no_policy);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn cli_parse_verify_with_key() {
        let cli = Cli::try_parse_from([
            "invoice-seal",
            "-vv",
            "verify",
            "record.json",
            "--authority-key",
            "abcd",
        ])
        .unwrap();
        assert_eq!(cli.verbose, 2);
        if let Commands::Verify(args) = cli.command {
            assert_eq!(args.authority_key.as_deref(), Some("abcd"));
        } else {
            panic!("expected verify");
        }
    }

    #[test]
    fn cli_parse_version_with_host() {
        let cli =
            Cli::try_parse_from(["invoice-seal", "version", "--host", "https://a.test"]).unwrap();
        assert!(matches!(cli.command, Commands::Version));
        assert_eq!(cli.host.as_deref(), Some("https://a.test"));
    }

    #[test]
    fn cli_rejects_missing_year() {
        assert!(Cli::try_parse_from(["invoice-seal", "new-invoice", "1"]).is_err());
    }
}
