//! # invoice-seal-cli
//!
//! Provides the `invoice-seal` command-line interface.
//!
//! ## Subcommands
//!
//! - `invoice-seal new-invoice` - Parse, sign, submit, and verify an invoice.
//! - `invoice-seal parse` - Dry run: print the `invoice.json` a table yields.
//! - `invoice-seal verify` - Re-verify a saved submission record.
//! - `invoice-seal version` - Show the authority's version and key.
//!
//! ```bash
//! invoice-seal --identity ~/.invoice-seal/identity new-invoice 1 2019 invoice.csv receipt.png
//! invoice-seal verify record.json
//! ```

pub mod authority;
pub mod identity;
pub mod new_invoice;
pub mod verify;

use std::path::{Path, PathBuf};

use invoice_seal::InvoicePeriod;

/// Options shared by every subcommand.
#[derive(Debug, Clone, Default)]
pub struct GlobalOpts {
    /// Authority URL; overrides `INVOICE_SEAL_HOST`.
    pub host: Option<String>,
    /// Identity file; overrides `INVOICE_SEAL_IDENTITY`.
    pub identity: Option<PathBuf>,
    /// Accept self-signed authority certificates.
    pub skip_verify: bool,
}

/// Expand a leading `~` to the home directory.
pub fn expand_home(path: &Path) -> PathBuf {
    let Ok(rest) = path.strip_prefix("~") else {
        return path.to_path_buf();
    };
    match std::env::var_os("HOME") {
        Some(home) => PathBuf::from(home).join(rest),
        None => path.to_path_buf(),
    }
}

/// Validate a month and year given on the command line.
pub fn period(month: u16, year: u16) -> anyhow::Result<InvoicePeriod> {
    Ok(InvoicePeriod::new(month, year)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expand_home_leaves_plain_paths() {
        assert_eq!(
            expand_home(Path::new("/etc/identity")),
            PathBuf::from("/etc/identity")
        );
        assert_eq!(expand_home(Path::new("rel/id")), PathBuf::from("rel/id"));
    }

    #[test]
    fn expand_home_replaces_tilde() {
        if let Some(home) = std::env::var_os("HOME") {
            assert_eq!(
                expand_home(Path::new("~/.invoice-seal/identity")),
                PathBuf::from(home).join(".invoice-seal/identity")
            );
        }
    }

    #[test]
    fn period_rejects_month_13() {
        assert!(period(13, 2019).is_err());
        assert!(period(12, 2019).is_ok());
    }
}
