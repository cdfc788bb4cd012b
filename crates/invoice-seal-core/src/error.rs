//! Error types for the invoice-seal core.

use thiserror::Error;

use crate::types::InvoicePeriod;

/// Core errors from key, digest, and encoding operations.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("invalid signature")]
    InvalidSignature,

    #[error("invalid public key")]
    InvalidPublicKey,

    #[error("invalid hex for {field}: {reason}")]
    InvalidHex { field: &'static str, reason: String },

    #[error("invalid base64 payload in file {name}: {reason}")]
    InvalidPayload { name: String, reason: String },

    #[error("invalid identity: {0}")]
    InvalidIdentity(String),

    #[error("bundle contains no files")]
    EmptyBundle,

    #[error("bundle must start with invoice.json, found {0:?}")]
    MissingInvoiceRecord(String),

    #[error("encoding error: {0}")]
    EncodingError(String),
}

/// A structured invoice record that failed the strict schema.
///
/// Every variant belongs to the malformed-record class: the input table must
/// be fixed by the user before it can be submitted.
#[derive(Debug, Error)]
pub enum RecordError {
    #[error("line {line}: expected {expected} fields, got {got}")]
    FieldCount {
        line: usize,
        expected: usize,
        got: usize,
    },

    #[error("line {line}: unknown line item type {value:?}")]
    UnknownLineItemType { line: usize, value: String },

    #[error("line {line}: {field} is not a finite number: {value:?}")]
    InvalidNumber {
        line: usize,
        field: &'static str,
        value: String,
    },

    #[error("too many line items: {0}")]
    TooManyLineItems(usize),

    #[error("invalid invoice period: month {month}, year {year}")]
    InvalidPeriod { month: u16, year: u16 },

    #[error("request is for {request} but the invoice record is for {record}")]
    PeriodMismatch {
        request: InvoicePeriod,
        record: InvoicePeriod,
    },

    #[error("csv: {0}")]
    Csv(String),
}

impl From<csv::Error> for RecordError {
    fn from(e: csv::Error) -> Self {
        RecordError::Csv(e.to_string())
    }
}

/// Errors while committing to a bundle with the submitter's identity.
#[derive(Debug, Error)]
pub enum SigningError {
    #[error("user identity not found")]
    MissingIdentity,

    #[error("cannot commit to bundle: {0}")]
    Commitment(#[from] CoreError),
}

/// A bundle violated the authority's submission policy.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PolicyError {
    #[error("too many attachments: {got} (max {max})")]
    TooManyAttachments { got: usize, max: usize },

    #[error("file {name} is {size} bytes (max {max})")]
    FileTooLarge { name: String, size: usize, max: usize },

    #[error("file {name} has unsupported media type {mime}")]
    UnsupportedMediaType { name: String, mime: String },

    #[error("duplicate file name {0}")]
    DuplicateName(String),
}

/// Integrity failures found while checking a censorship record.
///
/// Any of these means the submission cannot be trusted, even when the
/// authority returned a receipt.
#[derive(Debug, Error)]
pub enum VerificationError {
    #[error("file {index} ({name}): digest {claimed} does not match payload digest {actual}")]
    DigestMismatch {
        index: usize,
        name: String,
        claimed: String,
        actual: String,
    },

    #[error("merkle root mismatch: record claims {claimed}, files give {computed}")]
    MerkleMismatch { claimed: String, computed: String },

    #[error("submitter signature does not cover the merkle root")]
    InvalidSubmitterSignature,

    #[error("censorship record signature is not valid for the authority key")]
    InvalidAuthoritySignature,

    #[error("bundle contains no files")]
    EmptyBundle,

    #[error("malformed input: {0}")]
    Malformed(String),
}

impl From<CoreError> for VerificationError {
    fn from(e: CoreError) -> Self {
        match e {
            CoreError::EmptyBundle => VerificationError::EmptyBundle,
            other => VerificationError::Malformed(other.to_string()),
        }
    }
}
