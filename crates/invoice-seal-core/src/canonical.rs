//! Canonical byte encodings.
//!
//! Everything that is digested or signed is produced here, so signer and
//! verifier can never disagree about the bytes:
//!
//! - The invoice record is compact JSON with a fixed field order
//!   (`month`, `year`, `lineitems`; items as `linenumber`, `type`, `subtype`,
//!   `description`, `proposaltoken`, `hours`, `totalcost`).
//! - The submitter signs the lowercase hex text of the Merkle root.
//! - The authority signs the hex root text followed by the token text.

use crate::crypto::Sha256Digest;
use crate::error::CoreError;
use crate::record::InvoiceInput;

/// Reserved file name of the structured record inside a bundle.
pub const INVOICE_FILE_NAME: &str = "invoice.json";

/// Encode an invoice record to its canonical bytes.
pub fn canonical_invoice_bytes(invoice: &InvoiceInput) -> Result<Vec<u8>, CoreError> {
    serde_json::to_vec(invoice).map_err(|e| CoreError::EncodingError(e.to_string()))
}

/// Decode an invoice record from the bytes of an `invoice.json` file.
pub fn decode_invoice(bytes: &[u8]) -> Result<InvoiceInput, CoreError> {
    serde_json::from_slice(bytes).map_err(|e| CoreError::EncodingError(e.to_string()))
}

/// The message a submitter signs: hex(root).
pub fn merkle_signing_message(root: &Sha256Digest) -> Vec<u8> {
    root.to_hex().into_bytes()
}

/// The message the authority signs: hex(root) || token.
pub fn censorship_message(merkle_hex: &str, token: &str) -> Vec<u8> {
    let mut buf = Vec::with_capacity(merkle_hex.len() + token.len());
    buf.extend_from_slice(merkle_hex.as_bytes());
    buf.extend_from_slice(token.as_bytes());
    buf
}
