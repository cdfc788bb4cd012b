//! # invoice-seal
//!
//! Tamper-evident invoice submission.
//!
//! ## Overview
//!
//! An invoice table is parsed into a structured record, wrapped as
//! `invoice.json`, and bundled with its attachments. The submitter signs the
//! Merkle root of the file digests and sends the bundle to an authority,
//! which answers with a censorship record: a token and its own signature
//! over the root. The record is only trusted after it has been checked
//! against the files that were actually sent.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use invoice_seal::{ClientConfig, HttpTransport, Identity, InvoicePeriod, Submitter, SubmitterConfig};
//!
//! async fn example() -> invoice_seal::Result<()> {
//!     let transport = HttpTransport::new(ClientConfig::from_env().unwrap()).unwrap();
//!     let identity = Identity::from_secret_hex("...").ok();
//!     let submitter = Submitter::new(transport, identity, SubmitterConfig::default());
//!
//!     let csv = std::fs::read("invoice.csv").unwrap();
//!     let period = InvoicePeriod::new(1, 2019)?;
//!     let record = submitter
//!         .submit_invoice(period, &csv, &["receipt.png"])
//!         .await?;
//!     println!("accepted as {}", record.token());
//!     Ok(())
//! }
//! ```
//!
//! ## Re-exports
//!
//! - `invoice_seal::core` - Pure primitives (records, bundles, Merkle, verify)
//! - `invoice_seal::client` - Wire messages and transports

pub mod bundle;
pub mod error;
pub mod submitter;

// Re-export component crates
pub use invoice_seal_client as client;
pub use invoice_seal_core as core;

pub use bundle::build_bundle;
pub use error::{Result, Stage, SubmissionError};
pub use submitter::{PreparedSubmission, SentSubmission, Submitter, SubmitterConfig};

// Re-export commonly used types
pub use invoice_seal_client::{ClientConfig, ClientError, HttpTransport, Transport};
pub use invoice_seal_core::{
    verify_submission_record, BundlePolicy, CensorshipRecord, CsvPolicy, FileDescriptor,
    Identity, InvoiceInput, InvoicePeriod, LineItem, LineItemType, SubmissionRecord,
};
