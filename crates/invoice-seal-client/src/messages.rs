//! Wire messages exchanged with the authority.
//!
//! All messages are JSON. Field names follow the authority's API exactly,
//! so the structs here are the single place where wire naming lives.

use serde::{Deserialize, Serialize};

use invoice_seal_core::{CensorshipRecord, FileDescriptor, InvoicePeriod, SubmissionBundle};

/// API version this client speaks.
pub const API_VERSION: u32 = 1;

/// Route prefix for all API calls.
pub const API_ROUTE: &str = "/api/v1";

/// Endpoint paths relative to [`API_ROUTE`].
pub mod routes {
    /// Version and authority key handshake.
    pub const VERSION: &str = "/version";
    /// Invoice submission.
    pub const NEW_INVOICE: &str = "/invoices/new";
}

/// Error codes carried in [`ErrorReply::error_code`].
///
/// Only the codes this client reacts to are named; any other value is
/// passed through unchanged.
pub mod error_codes {
    pub const MISSING_FILES: i64 = 5;
    pub const DUPLICATE_FILENAMES: i64 = 7;
    pub const INVALID_FILE_DIGEST: i64 = 16;
    pub const INVALID_BASE64: i64 = 17;
    pub const INVALID_PUBLIC_KEY: i64 = 21;
    pub const INVALID_SIGNATURE: i64 = 23;
    pub const INVALID_INPUT: i64 = 24;
}

/// Reply to the version handshake.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionReply {
    pub version: u32,
    pub route: String,
    /// Authority's Ed25519 public key, hex encoded.
    pub pubkey: String,
    #[serde(default)]
    pub testnet: bool,
}

/// Submission request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewInvoice {
    pub month: u16,
    pub year: u16,
    pub files: Vec<FileDescriptor>,
    #[serde(rename = "publickey")]
    pub public_key: String,
    pub signature: String,
}

impl NewInvoice {
    /// Build the request for a signed bundle.
    pub fn new(period: InvoicePeriod, bundle: &SubmissionBundle) -> Self {
        Self {
            month: period.month,
            year: period.year,
            files: bundle.files().to_vec(),
            public_key: bundle.public_key().to_string(),
            signature: bundle.signature().to_string(),
        }
    }
}

/// Successful reply to a submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewInvoiceReply {
    #[serde(rename = "censorshiprecord")]
    pub censorship_record: CensorshipRecord,
}

/// Body of a rejected request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorReply {
    #[serde(rename = "errorcode")]
    pub error_code: i64,
    #[serde(rename = "errorcontext", default)]
    pub error_context: Vec<String>,
}
