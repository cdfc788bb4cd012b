//! Transport abstraction for talking to the authority.
//!
//! A transport performs exactly one request per call and reports the
//! outcome. Retry policy belongs to the implementation: idempotent calls may
//! be retried, submission never is.

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::Result;
use crate::messages::{NewInvoice, NewInvoiceReply, VersionReply};

/// Transport trait for authority requests.
///
/// Implementations must be thread-safe (Send + Sync).
#[async_trait]
pub trait Transport: Send + Sync {
    /// Fetch the API version and the authority's public key.
    async fn version(&self) -> Result<VersionReply>;

    /// Submit a signed invoice bundle.
    ///
    /// An error after the request was sent does not prove the authority
    /// discarded it.
    async fn new_invoice(&self, request: &NewInvoice) -> Result<NewInvoiceReply>;
}

#[async_trait]
impl<T: Transport + ?Sized> Transport for Arc<T> {
    async fn version(&self) -> Result<VersionReply> {
        (**self).version().await
    }

    async fn new_invoice(&self, request: &NewInvoice) -> Result<NewInvoiceReply> {
        (**self).new_invoice(request).await
    }
}

/// An in-memory authority for testing.
///
/// Validates submissions the way a real authority does and issues signed
/// censorship records. Its behavior can be switched to misbehave so that
/// clients can be tested against a dishonest or failing authority.
pub mod memory {
    use super::*;
    use std::collections::HashMap;

    use invoice_seal_core::canonical::{censorship_message, decode_invoice};
    use invoice_seal_core::{
        verify_submitter_signature, BundlePolicy, CensorshipRecord, Ed25519PublicKey, Identity,
        PolicyError, Sha256Digest, VerificationError, INVOICE_FILE_NAME,
    };
    use tokio::sync::RwLock;

    use crate::error::ClientError;
    use crate::messages::{error_codes, routes, API_ROUTE, API_VERSION};

    /// How the authority answers submissions.
    #[derive(Debug, Clone, PartialEq, Eq, Default)]
    pub enum AuthorityBehavior {
        /// Validate and sign correctly.
        #[default]
        Honest,
        /// Sign the record with a key other than the advertised one.
        ForgeSignature,
        /// Report a Merkle root for different content, correctly signed.
        SubstituteMerkle,
        /// Reject every submission with the given error.
        Reject { code: i64, context: Vec<String> },
        /// Fail every call as if the authority could not be reached.
        Unreachable,
    }

    /// In-memory authority implementing [`Transport`].
    pub struct MemoryAuthority {
        identity: Identity,
        policy: Option<BundlePolicy>,
        behavior: RwLock<AuthorityBehavior>,
        received: RwLock<Vec<NewInvoice>>,
        accepted: RwLock<HashMap<String, NewInvoice>>,
    }

    impl MemoryAuthority {
        /// Create an honest authority signing with `identity`.
        pub fn new(identity: Identity) -> Self {
            Self {
                identity,
                policy: Some(BundlePolicy::default()),
                behavior: RwLock::new(AuthorityBehavior::Honest),
                received: RwLock::new(Vec::new()),
                accepted: RwLock::new(HashMap::new()),
            }
        }

        /// Create an honest authority with a fresh random key.
        pub fn generate() -> Self {
            Self::new(Identity::generate())
        }

        /// Replace the bundle policy; `None` accepts any bundle shape.
        pub fn with_policy(mut self, policy: Option<BundlePolicy>) -> Self {
            self.policy = policy;
            self
        }

        /// The key censorship records are signed with, hex encoded.
        pub fn public_key_hex(&self) -> String {
            self.identity.public_key().to_hex()
        }

        /// Switch how subsequent calls are answered.
        pub async fn set_behavior(&self, behavior: AuthorityBehavior) {
            *self.behavior.write().await = behavior;
        }

        /// Every submission request seen, accepted or not.
        pub async fn received(&self) -> Vec<NewInvoice> {
            self.received.read().await.clone()
        }

        /// The accepted request stored under `token`.
        pub async fn accepted(&self, token: &str) -> Option<NewInvoice> {
            self.accepted.read().await.get(token).cloned()
        }

        /// Number of accepted submissions.
        pub async fn accepted_count(&self) -> usize {
            self.accepted.read().await.len()
        }

        fn reject(&self, code: i64, context: impl Into<String>) -> ClientError {
            ClientError::Server {
                endpoint: format!("{API_ROUTE}{}", routes::NEW_INVOICE),
                status: 400,
                code,
                context: vec![context.into()],
            }
        }

        fn validate(&self, request: &NewInvoice) -> Result<Sha256Digest> {
            if let Some(policy) = &self.policy {
                policy.check(&request.files).map_err(|e| {
                    let code = match e {
                        PolicyError::DuplicateName(_) => error_codes::DUPLICATE_FILENAMES,
                        _ => error_codes::INVALID_INPUT,
                    };
                    self.reject(code, e.to_string())
                })?;
            }

            Ed25519PublicKey::from_hex(&request.public_key)
                .map_err(|e| self.reject(error_codes::INVALID_PUBLIC_KEY, e.to_string()))?;

            let root =
                verify_submitter_signature(&request.files, &request.public_key, &request.signature)
                    .map_err(|e| {
                        let code = match e {
                            VerificationError::EmptyBundle => error_codes::MISSING_FILES,
                            VerificationError::DigestMismatch { .. } => {
                                error_codes::INVALID_FILE_DIGEST
                            }
                            VerificationError::InvalidSubmitterSignature => {
                                error_codes::INVALID_SIGNATURE
                            }
                            _ => error_codes::INVALID_INPUT,
                        };
                        self.reject(code, e.to_string())
                    })?;

            // The invoice record must lead the bundle and match the period.
            let invoice = request
                .files
                .first()
                .filter(|f| f.name() == INVOICE_FILE_NAME)
                .ok_or_else(|| self.reject(error_codes::MISSING_FILES, "missing invoice record"))?;
            let data = invoice
                .decode_payload()
                .map_err(|e| self.reject(error_codes::INVALID_BASE64, e.to_string()))?;
            let decoded = decode_invoice(&data)
                .map_err(|e| self.reject(error_codes::INVALID_INPUT, e.to_string()))?;
            if decoded.month != request.month || decoded.year != request.year {
                return Err(self.reject(
                    error_codes::INVALID_INPUT,
                    "invoice record period does not match request",
                ));
            }

            Ok(root)
        }

        fn issue(&self, signer: &Identity, merkle: String) -> CensorshipRecord {
            let token = hex::encode(rand::random::<[u8; 32]>());
            let signature = signer.sign(&censorship_message(&merkle, &token)).to_hex();
            CensorshipRecord {
                token,
                merkle,
                signature,
            }
        }
    }

    #[async_trait]
    impl Transport for MemoryAuthority {
        async fn version(&self) -> Result<VersionReply> {
            if *self.behavior.read().await == AuthorityBehavior::Unreachable {
                return Err(ClientError::transport(routes::VERSION, "authority unreachable"));
            }
            Ok(VersionReply {
                version: API_VERSION,
                route: API_ROUTE.to_string(),
                pubkey: self.public_key_hex(),
                testnet: true,
            })
        }

        async fn new_invoice(&self, request: &NewInvoice) -> Result<NewInvoiceReply> {
            let behavior = self.behavior.read().await.clone();
            if behavior == AuthorityBehavior::Unreachable {
                return Err(ClientError::transport(
                    routes::NEW_INVOICE,
                    "authority unreachable",
                ));
            }

            self.received.write().await.push(request.clone());

            if let AuthorityBehavior::Reject { code, context } = behavior {
                return Err(ClientError::Server {
                    endpoint: format!("{API_ROUTE}{}", routes::NEW_INVOICE),
                    status: 400,
                    code,
                    context,
                });
            }

            let root = self.validate(request)?;
            let record = match behavior {
                AuthorityBehavior::ForgeSignature => {
                    self.issue(&Identity::generate(), root.to_hex())
                }
                AuthorityBehavior::SubstituteMerkle => {
                    let other = Sha256Digest::hash_pair(&root, &root);
                    self.issue(&self.identity, other.to_hex())
                }
                _ => self.issue(&self.identity, root.to_hex()),
            };

            self.accepted
                .write()
                .await
                .insert(record.token.clone(), request.clone());

            Ok(NewInvoiceReply {
                censorship_record: record,
            })
        }
    }

}
