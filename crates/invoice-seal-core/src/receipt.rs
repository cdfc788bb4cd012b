//! Censorship records: the authority's receipt for a submission.
//!
//! A censorship record is immutable once received. It asserts that the
//! authority received exactly the content whose Merkle root is `merkle`, and
//! binds that claim to `token` with the authority's signature.

use serde::{Deserialize, Serialize};

use crate::bundle::{FileDescriptor, SubmissionBundle};

/// Receipt issued by the authority for one submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CensorshipRecord {
    /// Authority-assigned identifier of the submission.
    pub token: String,
    /// Hex Merkle root the authority computed over the received files.
    pub merkle: String,
    /// Authority signature over `merkle || token`, hex encoded.
    pub signature: String,
}

/// Everything needed to re-verify a submission later: the files exactly as
/// sent, the submitter's claim, and the authority's receipt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmissionRecord {
    pub files: Vec<FileDescriptor>,
    #[serde(rename = "publickey")]
    pub public_key: String,
    pub signature: String,
    #[serde(rename = "censorshiprecord")]
    pub censorship_record: CensorshipRecord,
}

impl SubmissionRecord {
    /// Pair a sent bundle with the receipt returned for it.
    pub fn new(bundle: SubmissionBundle, censorship_record: CensorshipRecord) -> Self {
        let (files, public_key, signature) = bundle.into_parts();
        Self {
            files,
            public_key,
            signature,
            censorship_record,
        }
    }

    /// The authority token.
    pub fn token(&self) -> &str {
        &self.censorship_record.token
    }
}
