//! Error types for the submission pipeline.

use std::fmt;
use std::path::PathBuf;

use invoice_seal_client::ClientError;
use invoice_seal_core::{CoreError, PolicyError, RecordError, SigningError, VerificationError};
use thiserror::Error;

/// Pipeline stage an error was raised in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    /// Fetching the authority's key.
    Handshake,
    /// Parsing the invoice table.
    Parse,
    /// Reading attachments and building the file list.
    Bundle,
    /// Signing the Merkle root.
    Sign,
    /// Sending the bundle to the authority.
    Submit,
    /// Checking the censorship record.
    Verify,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Handshake => "handshake",
            Stage::Parse => "parse",
            Stage::Bundle => "bundle",
            Stage::Sign => "sign",
            Stage::Submit => "submit",
            Stage::Verify => "verify",
        };
        f.write_str(name)
    }
}

/// Errors that can occur while submitting an invoice.
#[derive(Debug, Error)]
pub enum SubmissionError {
    /// The invoice table does not match the record schema.
    #[error("malformed invoice record: {0}")]
    MalformedRecord(#[from] RecordError),

    /// An attachment could not be read.
    #[error("cannot read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A file could not be encoded into the bundle.
    #[error("bundle encoding failed: {0}")]
    Encoding(#[from] CoreError),

    /// The bundle breaks the authority's published limits.
    #[error("bundle violates authority policy: {0}")]
    Policy(#[from] PolicyError),

    /// No usable identity, or the commitment could not be computed.
    #[error("signing failed: {0}")]
    Signing(#[from] SigningError),

    /// No decision came back: the authority was unreachable, timed out, or
    /// failed upstream.
    #[error("{stage}: no answer from authority: {source}")]
    Transport {
        stage: Stage,
        #[source]
        source: ClientError,
    },

    /// The authority refused the request or answered unreadably.
    #[error("{stage}: {source}")]
    Server {
        stage: Stage,
        #[source]
        source: ClientError,
    },

    /// The censorship record does not commit to what was sent.
    #[error("censorship record {token} is untrusted: {source}")]
    Verification {
        token: String,
        #[source]
        source: VerificationError,
    },
}

impl SubmissionError {
    /// Classify a client error raised during `stage`.
    pub fn from_client(stage: Stage, source: ClientError) -> Self {
        if source.is_retryable() {
            Self::Transport { stage, source }
        } else {
            Self::Server { stage, source }
        }
    }

    /// The stage the error was raised in.
    pub fn stage(&self) -> Stage {
        match self {
            Self::MalformedRecord(_) => Stage::Parse,
            Self::Io { .. } | Self::Encoding(_) | Self::Policy(_) => Stage::Bundle,
            Self::Signing(_) => Stage::Sign,
            Self::Transport { stage, .. } | Self::Server { stage, .. } => *stage,
            Self::Verification { .. } => Stage::Verify,
        }
    }

    /// Whether repeating the same call unchanged could succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Transport { .. })
    }

    /// Whether the authority may hold the submission despite the error.
    ///
    /// `false` means nothing left the process, or the authority explicitly
    /// refused it. `true` means the submission must be re-verified rather
    /// than assumed lost.
    pub fn submission_may_exist(&self) -> bool {
        match self {
            Self::Transport { stage, .. } => *stage == Stage::Submit,
            Self::Server { stage, source } => {
                *stage == Stage::Submit && !matches!(source, ClientError::Server { .. })
            }
            Self::Verification { .. } => true,
            _ => false,
        }
    }
}

/// Result type for pipeline operations.
pub type Result<T> = std::result::Result<T, SubmissionError>;

#[cfg(test)]
mod tests {
    use super::*;

    fn transport() -> ClientError {
        ClientError::Transport {
            endpoint: "/invoices/new".into(),
            message: "timed out".into(),
        }
    }

    fn rejected() -> ClientError {
        ClientError::Server {
            endpoint: "/invoices/new".into(),
            status: 400,
            code: 23,
            context: Vec::new(),
        }
    }

    #[test]
    fn test_nothing_happened_before_submit() {
        let err = SubmissionError::from(RecordError::TooManyLineItems(70_000));
        assert_eq!(err.stage(), Stage::Parse);
        assert!(!err.submission_may_exist());
        assert!(!err.is_retryable());

        let err = SubmissionError::from(SigningError::MissingIdentity);
        assert_eq!(err.stage(), Stage::Sign);
        assert!(!err.submission_may_exist());

        let err = SubmissionError::from_client(Stage::Handshake, transport());
        assert!(err.is_retryable());
        assert!(!err.submission_may_exist());
    }

    #[test]
    fn test_lost_reply_may_exist() {
        let err = SubmissionError::from_client(Stage::Submit, transport());
        assert!(matches!(err, SubmissionError::Transport { .. }));
        assert!(err.is_retryable());
        assert!(err.submission_may_exist());

        let garbled = ClientError::InvalidResponse {
            endpoint: "/invoices/new".into(),
            message: "eof".into(),
        };
        assert!(SubmissionError::from_client(Stage::Submit, garbled).submission_may_exist());
    }

    #[test]
    fn test_gateway_failure_after_send_may_exist() {
        let gateway = ClientError::Upstream {
            endpoint: "/invoices/new".into(),
            status: 504,
            message: "<html>504 Gateway Time-out</html>".into(),
        };
        let err = SubmissionError::from_client(Stage::Submit, gateway);
        assert!(matches!(err, SubmissionError::Transport { .. }));
        assert!(err.is_retryable());
        assert!(err.submission_may_exist());
    }

    #[test]
    fn test_explicit_rejection() {
        let err = SubmissionError::from_client(Stage::Submit, rejected());
        assert!(matches!(err, SubmissionError::Server { .. }));
        assert!(!err.is_retryable());
        assert!(!err.submission_may_exist());
    }

    #[test]
    fn test_verification_failure_is_loud() {
        let err = SubmissionError::Verification {
            token: "abc".into(),
            source: VerificationError::InvalidAuthoritySignature,
        };
        assert_eq!(err.stage(), Stage::Verify);
        assert!(err.submission_may_exist());
        assert!(err.to_string().contains("abc"));
        assert!(err.to_string().contains("untrusted"));
    }

    #[test]
    fn test_io_error_names_path() {
        let err = SubmissionError::Io {
            path: PathBuf::from("/tmp/missing.png"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "no such file"),
        };
        assert_eq!(err.stage(), Stage::Bundle);
        assert!(err.to_string().contains("/tmp/missing.png"));
    }
}
