//! File descriptors and submission bundles.
//!
//! A bundle is an ordered list of files: the structured invoice record first
//! (as [`INVOICE_FILE_NAME`]), attachments after it in the order given. The
//! submitter's signature commits to that order.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::canonical::{canonical_invoice_bytes, decode_invoice, INVOICE_FILE_NAME};
use crate::crypto::{Identity, Sha256Digest};
use crate::error::{CoreError, PolicyError, SigningError};
use crate::mime::{detect_media_type, IMAGE_PNG, TEXT_PLAIN_UTF8};
use crate::record::InvoiceInput;
use crate::signing::sign_merkle_root;

/// One file of a bundle, in its wire form.
///
/// `digest` is the hex SHA-256 of the raw bytes and `payload` their base64
/// encoding. Descriptors built with [`FileDescriptor::new`] satisfy this by
/// construction; descriptors received from elsewhere are checked by the
/// verifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileDescriptor {
    name: String,
    mime: String,
    digest: String,
    payload: String,
}

impl FileDescriptor {
    /// Wrap raw bytes: detect the media type, digest, and encode them.
    pub fn new(name: impl Into<String>, data: &[u8]) -> Self {
        Self {
            name: name.into(),
            mime: detect_media_type(data).to_string(),
            digest: Sha256Digest::hash(data).to_hex(),
            payload: BASE64.encode(data),
        }
    }

    /// Wrap the canonical encoding of an invoice record.
    pub fn invoice(invoice: &InvoiceInput) -> Result<Self, CoreError> {
        let bytes = canonical_invoice_bytes(invoice)?;
        Ok(Self::new(INVOICE_FILE_NAME, &bytes))
    }

    /// Assemble a descriptor from wire fields without checking them.
    pub fn from_parts(
        name: impl Into<String>,
        mime: impl Into<String>,
        digest: impl Into<String>,
        payload: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            mime: mime.into(),
            digest: digest.into(),
            payload: payload.into(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn mime(&self) -> &str {
        &self.mime
    }

    /// Claimed digest, hex encoded.
    pub fn digest(&self) -> &str {
        &self.digest
    }

    /// Base64 payload.
    pub fn payload(&self) -> &str {
        &self.payload
    }

    /// Decode the claimed digest.
    pub fn parsed_digest(&self) -> Result<Sha256Digest, CoreError> {
        Sha256Digest::from_hex(&self.digest)
    }

    /// Decode the payload back to raw bytes.
    pub fn decode_payload(&self) -> Result<Vec<u8>, CoreError> {
        BASE64
            .decode(&self.payload)
            .map_err(|e| CoreError::InvalidPayload {
                name: self.name.clone(),
                reason: e.to_string(),
            })
    }
}

/// Builds the ordered file list for one invoice.
#[derive(Debug, Clone)]
pub struct BundleBuilder {
    files: Vec<FileDescriptor>,
}

impl BundleBuilder {
    /// Start a bundle with the invoice record as its first file.
    pub fn new(invoice: &InvoiceInput) -> Result<Self, CoreError> {
        Ok(Self {
            files: vec![FileDescriptor::invoice(invoice)?],
        })
    }

    /// Append an attachment.
    pub fn attachment(mut self, name: impl Into<String>, data: &[u8]) -> Self {
        self.push_attachment(name, data);
        self
    }

    /// Append an attachment in place.
    pub fn push_attachment(&mut self, name: impl Into<String>, data: &[u8]) {
        self.files.push(FileDescriptor::new(name, data));
    }

    /// Number of files so far, including the invoice record.
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Always false: the invoice record is present from construction.
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Finish without signing.
    pub fn build(self) -> Vec<FileDescriptor> {
        self.files
    }

    /// Finish and sign the Merkle root of the files.
    pub fn sign(self, identity: Option<&Identity>) -> Result<SubmissionBundle, SigningError> {
        SubmissionBundle::sign(self.files, identity)
    }
}

/// Decode the invoice record that leads `files`.
pub fn leading_invoice(files: &[FileDescriptor]) -> Result<InvoiceInput, CoreError> {
    let first = files.first().ok_or(CoreError::EmptyBundle)?;
    if first.name() != INVOICE_FILE_NAME {
        return Err(CoreError::MissingInvoiceRecord(first.name().to_string()));
    }
    decode_invoice(&first.decode_payload()?)
}

/// A signed, ordered file list ready to be submitted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmissionBundle {
    files: Vec<FileDescriptor>,
    #[serde(rename = "publickey")]
    public_key: String,
    signature: String,
}

impl SubmissionBundle {
    /// Sign `files` with `identity`.
    ///
    /// Fails with [`SigningError::MissingIdentity`] when no identity is
    /// configured, before anything else is attempted.
    pub fn sign(
        files: Vec<FileDescriptor>,
        identity: Option<&Identity>,
    ) -> Result<Self, SigningError> {
        let identity = identity.ok_or(SigningError::MissingIdentity)?;
        let signature = sign_merkle_root(&files, Some(identity))?;
        Ok(Self {
            files,
            public_key: identity.public_key().to_hex(),
            signature: signature.to_hex(),
        })
    }

    pub fn files(&self) -> &[FileDescriptor] {
        &self.files
    }

    /// Submitter public key, hex encoded.
    pub fn public_key(&self) -> &str {
        &self.public_key
    }

    /// Signature over the Merkle root, hex encoded.
    pub fn signature(&self) -> &str {
        &self.signature
    }

    /// Split into `(files, public_key, signature)`.
    pub fn into_parts(self) -> (Vec<FileDescriptor>, String, String) {
        (self.files, self.public_key, self.signature)
    }
}

/// Limits the authority places on a bundle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BundlePolicy {
    /// Maximum number of files after the invoice record.
    pub max_attachments: usize,
    /// Maximum decoded size of any single file.
    pub max_file_size: usize,
    /// Media types accepted for attachments.
    pub allowed_mime_types: Vec<String>,
}

impl Default for BundlePolicy {
    fn default() -> Self {
        Self {
            max_attachments: 5,
            max_file_size: 512 * 1024,
            allowed_mime_types: vec![IMAGE_PNG.to_string(), TEXT_PLAIN_UTF8.to_string()],
        }
    }
}

impl BundlePolicy {
    /// Check a file list (invoice record first) against the policy.
    pub fn check(&self, files: &[FileDescriptor]) -> Result<(), PolicyError> {
        let attachments = files.len().saturating_sub(1);
        if attachments > self.max_attachments {
            return Err(PolicyError::TooManyAttachments {
                got: attachments,
                max: self.max_attachments,
            });
        }

        let mut seen = HashSet::new();
        for file in files {
            if !seen.insert(file.name()) {
                return Err(PolicyError::DuplicateName(file.name().to_string()));
            }

            // Base64 expands by 4/3; this is the decoded size without decoding.
            let size = decoded_len(file.payload());
            if size > self.max_file_size {
                return Err(PolicyError::FileTooLarge {
                    name: file.name().to_string(),
                    size,
                    max: self.max_file_size,
                });
            }

            if !self.allowed_mime_types.iter().any(|m| m == file.mime()) {
                return Err(PolicyError::UnsupportedMediaType {
                    name: file.name().to_string(),
                    mime: file.mime().to_string(),
                });
            }
        }

        Ok(())
    }
}

fn decoded_len(payload: &str) -> usize {
    let padding = payload.bytes().rev().take_while(|b| *b == b'=').count();
    (payload.len() / 4 * 3).saturating_sub(padding)
}
