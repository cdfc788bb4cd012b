//! The submission pipeline.
//!
//! ```text
//! parse -> prepare (bundle, policy, sign) -> send -> verify
//! ```
//!
//! Each stage returns a value the next stage consumes. A caller may stop
//! between stages; nothing leaves the process before [`Submitter::send`].
//! After `send` the authority may hold the submission, and the only way to
//! trust it is [`SentSubmission::verify`].

use std::path::Path;

use invoice_seal_client::{ClientError, NewInvoice, Transport};
use invoice_seal_core::{
    leading_invoice, verify_censorship_record, BundlePolicy, CensorshipRecord, CsvPolicy,
    Ed25519PublicKey, FileDescriptor, Identity, InvoiceInput, InvoicePeriod, RecordError,
    SubmissionBundle, SubmissionRecord,
};
use tracing::{debug, info, warn};

use crate::bundle::build_bundle;
use crate::error::{Result, Stage, SubmissionError};

/// Configuration for the pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitterConfig {
    /// Invoice table format.
    pub csv: CsvPolicy,
    /// Limits checked before sending.
    pub bundle: BundlePolicy,
    /// Check `bundle` locally before signing.
    pub enforce_policy: bool,
}

impl Default for SubmitterConfig {
    fn default() -> Self {
        Self {
            csv: CsvPolicy::default(),
            bundle: BundlePolicy::default(),
            enforce_policy: true,
        }
    }
}

/// A signed bundle that has not been sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreparedSubmission {
    period: InvoicePeriod,
    bundle: SubmissionBundle,
}

impl PreparedSubmission {
    pub fn period(&self) -> InvoicePeriod {
        self.period
    }

    pub fn bundle(&self) -> &SubmissionBundle {
        &self.bundle
    }

    /// The wire request this submission sends.
    pub fn request(&self) -> NewInvoice {
        NewInvoice::new(self.period, &self.bundle)
    }
}

/// A bundle the authority acknowledged, not yet verified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentSubmission {
    bundle: SubmissionBundle,
    record: CensorshipRecord,
}

impl SentSubmission {
    /// The authority token.
    pub fn token(&self) -> &str {
        &self.record.token
    }

    /// The censorship record as returned, untrusted until verified.
    pub fn censorship_record(&self) -> &CensorshipRecord {
        &self.record
    }

    /// Check the censorship record against the files that were sent.
    ///
    /// On success the returned record can be stored and re-verified later.
    pub fn verify(self, authority_key_hex: &str) -> Result<SubmissionRecord> {
        let result = verify_censorship_record(
            self.bundle.files(),
            self.bundle.public_key(),
            self.bundle.signature(),
            &self.record,
            authority_key_hex,
        );

        match result {
            Ok(()) => {
                info!(token = %self.record.token, "censorship record verified");
                Ok(SubmissionRecord::new(self.bundle, self.record))
            }
            Err(source) => {
                warn!(
                    token = %self.record.token,
                    error = %source,
                    "censorship record failed verification"
                );
                Err(SubmissionError::Verification {
                    token: self.record.token,
                    source,
                })
            }
        }
    }
}

/// Runs submissions against one authority.
pub struct Submitter<T: Transport> {
    transport: T,
    identity: Option<Identity>,
    config: SubmitterConfig,
}

impl<T: Transport> Submitter<T> {
    /// Create a submitter. A missing identity is reported at signing time.
    pub fn new(transport: T, identity: Option<Identity>, config: SubmitterConfig) -> Self {
        Self {
            transport,
            identity,
            config,
        }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn config(&self) -> &SubmitterConfig {
        &self.config
    }

    /// Fetch the authority's public key, hex encoded.
    pub async fn authority_key(&self) -> Result<String> {
        let reply = self
            .transport
            .version()
            .await
            .map_err(|e| SubmissionError::from_client(Stage::Handshake, e))?;

        if Ed25519PublicKey::from_hex(&reply.pubkey).is_err() {
            return Err(SubmissionError::Server {
                stage: Stage::Handshake,
                source: ClientError::InvalidResponse {
                    endpoint: invoice_seal_client::routes::VERSION.to_string(),
                    message: format!("invalid authority key {:?}", reply.pubkey),
                },
            });
        }

        debug!(version = reply.version, testnet = reply.testnet, "authority handshake");
        Ok(reply.pubkey)
    }

    /// Parse an invoice table for `period`.
    pub fn parse(&self, period: InvoicePeriod, raw: &[u8]) -> Result<InvoiceInput> {
        let invoice = InvoiceInput::from_csv(period, raw, &self.config.csv)?;
        debug!(%period, line_items = invoice.line_items.len(), "invoice parsed");
        Ok(invoice)
    }

    /// Read attachments from disk, then [`seal`](Self::seal) the bundle.
    pub fn prepare<P: AsRef<Path>>(
        &self,
        invoice: &InvoiceInput,
        attachments: &[P],
    ) -> Result<PreparedSubmission> {
        let files = build_bundle(invoice, attachments)?;
        self.seal(invoice.period(), files)
    }

    /// Check policy and sign an already built file list.
    ///
    /// The leading invoice record must be for `period`.
    pub fn seal(
        &self,
        period: InvoicePeriod,
        files: Vec<FileDescriptor>,
    ) -> Result<PreparedSubmission> {
        let record = leading_invoice(&files)?.period();
        if record != period {
            return Err(RecordError::PeriodMismatch {
                request: period,
                record,
            }
            .into());
        }
        if self.config.enforce_policy {
            self.config.bundle.check(&files)?;
        }
        let bundle = SubmissionBundle::sign(files, self.identity.as_ref())?;
        info!(%period, files = bundle.files().len(), "bundle signed");
        Ok(PreparedSubmission { period, bundle })
    }

    /// Send a prepared submission. Never retried.
    pub async fn send(&self, prepared: PreparedSubmission) -> Result<SentSubmission> {
        let request = prepared.request();
        let reply = self
            .transport
            .new_invoice(&request)
            .await
            .map_err(|e| SubmissionError::from_client(Stage::Submit, e))?;

        let record = reply.censorship_record;
        info!(token = %record.token, merkle = %record.merkle, "authority issued censorship record");
        Ok(SentSubmission {
            bundle: prepared.bundle,
            record,
        })
    }

    /// Run the whole pipeline for one invoice.
    pub async fn submit_invoice<P: AsRef<Path>>(
        &self,
        period: InvoicePeriod,
        csv: &[u8],
        attachments: &[P],
    ) -> Result<SubmissionRecord> {
        // Local stages first: a bad table or missing key must not cost a round trip.
        let invoice = self.parse(period, csv)?;
        let prepared = self.prepare(&invoice, attachments)?;
        let authority_key = self.authority_key().await?;
        let sent = self.send(prepared).await?;
        sent.verify(&authority_key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use invoice_seal_client::{AuthorityBehavior, MemoryAuthority};
    use invoice_seal_core::{PolicyError, SigningError, VerificationError};
    use std::sync::Arc;

    const CSV: &[u8] = b"# type,subtype,description,proposal,hours,cost\n\
labor,dev,wrote parser,,10,400\n\
expense,travel,train,,0,65.5\n";

    fn period() -> InvoicePeriod {
        InvoicePeriod::new(1, 2019).unwrap()
    }

    fn submitter(authority: &Arc<MemoryAuthority>) -> Submitter<Arc<MemoryAuthority>> {
        Submitter::new(
            Arc::clone(authority),
            Some(Identity::from_seed(&[0x31; 32])),
            SubmitterConfig::default(),
        )
    }

    #[tokio::test]
    async fn test_submit_invoice_end_to_end() {
        let authority = Arc::new(MemoryAuthority::generate());
        let record = submitter(&authority)
            .submit_invoice::<&Path>(period(), CSV, &[])
            .await
            .unwrap();

        assert_eq!(record.files.len(), 1);
        assert!(authority.accepted(record.token()).await.is_some());
    }

    #[tokio::test]
    async fn test_malformed_record_sends_nothing() {
        let authority = Arc::new(MemoryAuthority::generate());
        let err = submitter(&authority)
            .submit_invoice::<&Path>(period(), b"labor,dev,x,,abc,10\n", &[])
            .await
            .unwrap_err();

        assert!(matches!(err, SubmissionError::MalformedRecord(_)));
        assert!(!err.submission_may_exist());
        assert!(authority.received().await.is_empty());
    }

    #[tokio::test]
    async fn test_missing_identity_sends_nothing() {
        let authority = Arc::new(MemoryAuthority::generate());
        let submitter = Submitter::new(Arc::clone(&authority), None, SubmitterConfig::default());
        let err = submitter
            .submit_invoice::<&Path>(period(), CSV, &[])
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            SubmissionError::Signing(SigningError::MissingIdentity)
        ));
        assert!(authority.received().await.is_empty());
    }

    #[tokio::test]
    async fn test_dishonest_authority_is_untrusted() {
        let authority = Arc::new(MemoryAuthority::generate());
        let submitter = submitter(&authority);

        for behavior in [
            AuthorityBehavior::ForgeSignature,
            AuthorityBehavior::SubstituteMerkle,
        ] {
            authority.set_behavior(behavior).await;
            let err = submitter
                .submit_invoice::<&Path>(period(), CSV, &[])
                .await
                .unwrap_err();
            assert!(matches!(err, SubmissionError::Verification { .. }));
            assert!(err.submission_may_exist());
        }
    }

    #[tokio::test]
    async fn test_staged_pipeline_detects_tamper() {
        let authority = Arc::new(MemoryAuthority::generate());
        let submitter = submitter(&authority);
        let key = submitter.authority_key().await.unwrap();

        let invoice = submitter.parse(period(), CSV).unwrap();
        let files = vec![
            FileDescriptor::invoice(&invoice).unwrap(),
            FileDescriptor::new("note.txt", b"approved"),
        ];
        let prepared = submitter.seal(period(), files).unwrap();
        let mut sent = submitter.send(prepared).await.unwrap();

        // Flip one byte of the attachment payload after the receipt arrived.
        let (mut files, public_key, signature) = sent.bundle.clone().into_parts();
        let mut data = files[1].decode_payload().unwrap();
        data[0] ^= 0x20;
        let flipped = FileDescriptor::new("note.txt", &data);
        files[1] = FileDescriptor::from_parts(
            files[1].name(),
            files[1].mime(),
            files[1].digest(),
            flipped.payload(),
        );
        sent.bundle = serde_json::from_value(serde_json::json!({
            "files": files,
            "publickey": public_key,
            "signature": signature,
        }))
        .unwrap();

        let err = sent.verify(&key).unwrap_err();
        assert!(matches!(
            err,
            SubmissionError::Verification {
                source: VerificationError::DigestMismatch { index: 1, .. },
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_policy_checked_before_signing() {
        let authority = Arc::new(MemoryAuthority::generate());
        let submitter = submitter(&authority);
        let invoice = submitter.parse(period(), CSV).unwrap();
        let files = vec![
            FileDescriptor::invoice(&invoice).unwrap(),
            FileDescriptor::new("blob.bin", &[0u8, 1, 2, 3]),
        ];

        let err = submitter.seal(period(), files.clone()).unwrap_err();
        assert!(matches!(
            err,
            SubmissionError::Policy(PolicyError::UnsupportedMediaType { .. })
        ));

        let lenient = Submitter::new(
            Arc::clone(&authority),
            Some(Identity::generate()),
            SubmitterConfig {
                enforce_policy: false,
                ..SubmitterConfig::default()
            },
        );
        assert!(lenient.seal(period(), files).is_ok());
    }

    #[tokio::test]
    async fn test_period_must_match_invoice_record() {
        let authority = Arc::new(MemoryAuthority::generate());
        let submitter = submitter(&authority);
        let invoice = submitter.parse(period(), CSV).unwrap();
        let files = vec![FileDescriptor::invoice(&invoice).unwrap()];

        let february = InvoicePeriod::new(2, 2019).unwrap();
        let err = submitter.seal(february, files).unwrap_err();
        assert!(matches!(
            err,
            SubmissionError::MalformedRecord(RecordError::PeriodMismatch { request, record })
                if request == february && record == period()
        ));
        assert!(!err.submission_may_exist());

        let attachment_first = vec![FileDescriptor::new("note.txt", b"approved")];
        assert!(matches!(
            submitter.seal(period(), attachment_first),
            Err(SubmissionError::Encoding(_))
        ));
        assert!(authority.received().await.is_empty());
    }

    #[tokio::test]
    async fn test_rejection_is_not_retryable() {
        let authority = Arc::new(MemoryAuthority::generate());
        authority
            .set_behavior(AuthorityBehavior::Reject {
                code: 24,
                context: vec!["closed for the month".into()],
            })
            .await;

        let err = submitter(&authority)
            .submit_invoice::<&Path>(period(), CSV, &[])
            .await
            .unwrap_err();
        assert_eq!(err.stage(), Stage::Submit);
        assert!(!err.is_retryable());
        assert!(!err.submission_may_exist());
    }

    #[tokio::test]
    async fn test_unreachable_authority_fails_at_handshake() {
        let authority = Arc::new(MemoryAuthority::generate());
        authority.set_behavior(AuthorityBehavior::Unreachable).await;

        let err = submitter(&authority)
            .submit_invoice::<&Path>(period(), CSV, &[])
            .await
            .unwrap_err();
        assert_eq!(err.stage(), Stage::Handshake);
        assert!(err.is_retryable());
        assert!(!err.submission_may_exist());
    }
}
