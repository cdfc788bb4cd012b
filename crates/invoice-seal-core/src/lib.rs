//! # invoice-seal core
//!
//! Pure primitives for sealed invoice submission: digests, structured
//! invoice records, file bundles, Merkle commitments, and censorship record
//! verification.
//!
//! This crate contains no I/O, no networking, and no logging. It is pure
//! computation over byte payloads and keys.
//!
//! ## Key Types
//!
//! - [`InvoiceInput`] - Structured invoice record parsed from a CSV table
//! - [`FileDescriptor`] - One file of a bundle: name, media type, digest, payload
//! - [`SubmissionBundle`] - Ordered files plus the submitter's signature
//! - [`CensorshipRecord`] - The authority's signed receipt
//!
//! ## Commitment
//!
//! The submitter signs the hex Merkle root of the file digests (see
//! [`merkle`]); the authority signs that root followed by its token. The
//! verifier in [`verify`] recomputes both from the files alone.

pub mod bundle;
pub mod canonical;
pub mod crypto;
pub mod error;
pub mod merkle;
pub mod mime;
pub mod receipt;
pub mod record;
pub mod signing;
pub mod types;
pub mod verify;

pub use bundle::{leading_invoice, BundleBuilder, BundlePolicy, FileDescriptor, SubmissionBundle};
pub use canonical::{canonical_invoice_bytes, INVOICE_FILE_NAME};
pub use crypto::{Ed25519PublicKey, Ed25519Signature, Identity, Sha256Digest};
pub use error::{CoreError, PolicyError, RecordError, SigningError, VerificationError};
pub use merkle::{files_merkle_root, merkle_root};
pub use mime::detect_media_type;
pub use receipt::{CensorshipRecord, SubmissionRecord};
pub use record::{parse_invoice_csv, write_invoice_csv, CsvPolicy, InvoiceInput, LineItem};
pub use signing::sign_merkle_root;
pub use types::{InvoicePeriod, LineItemType};
pub use verify::{
    verify_censorship_record, verify_file_digests, verify_submission_record,
    verify_submitter_signature,
};
