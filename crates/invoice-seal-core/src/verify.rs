//! Censorship record verification.
//!
//! Verification recomputes everything from the files themselves:
//!
//! 1. Each file's payload must hash to its claimed digest.
//! 2. The Merkle root of the digests must equal the root in the record.
//! 3. The submitter's signature must cover that root.
//! 4. The authority's signature must cover `root || token`.
//!
//! Any failure means the submission is untrusted, whether or not the
//! authority returned a receipt.

use crate::bundle::FileDescriptor;
use crate::canonical::{censorship_message, merkle_signing_message};
use crate::crypto::{Ed25519PublicKey, Ed25519Signature, Sha256Digest};
use crate::error::VerificationError;
use crate::merkle::files_merkle_root;
use crate::receipt::{CensorshipRecord, SubmissionRecord};

/// Check that every payload hashes to its claimed digest.
pub fn verify_file_digests(files: &[FileDescriptor]) -> Result<(), VerificationError> {
    for (index, file) in files.iter().enumerate() {
        let data = file.decode_payload()?;
        let actual = Sha256Digest::hash(&data).to_hex();
        if actual != file.digest() {
            return Err(VerificationError::DigestMismatch {
                index,
                name: file.name().to_string(),
                claimed: file.digest().to_string(),
                actual,
            });
        }
    }
    Ok(())
}

/// Check the submitter's signature over the recomputed Merkle root.
///
/// Returns the root on success.
pub fn verify_submitter_signature(
    files: &[FileDescriptor],
    public_key_hex: &str,
    signature_hex: &str,
) -> Result<Sha256Digest, VerificationError> {
    verify_file_digests(files)?;
    let root = files_merkle_root(files)?;

    let public_key = Ed25519PublicKey::from_hex(public_key_hex)?;
    let signature = Ed25519Signature::from_hex(signature_hex)?;
    public_key
        .verify(&merkle_signing_message(&root), &signature)
        .map_err(|_| VerificationError::InvalidSubmitterSignature)?;

    Ok(root)
}

/// Verify a censorship record against the files that were submitted.
pub fn verify_censorship_record(
    files: &[FileDescriptor],
    public_key_hex: &str,
    signature_hex: &str,
    record: &CensorshipRecord,
    authority_key_hex: &str,
) -> Result<(), VerificationError> {
    let root = verify_submitter_signature(files, public_key_hex, signature_hex)?;
    let root_hex = root.to_hex();

    if record.merkle != root_hex {
        return Err(VerificationError::MerkleMismatch {
            claimed: record.merkle.clone(),
            computed: root_hex,
        });
    }

    let authority_key = Ed25519PublicKey::from_hex(authority_key_hex)?;
    let authority_signature = Ed25519Signature::from_hex(&record.signature)?;
    authority_key
        .verify(
            &censorship_message(&root_hex, &record.token),
            &authority_signature,
        )
        .map_err(|_| VerificationError::InvalidAuthoritySignature)
}

/// Verify a stored submission record.
pub fn verify_submission_record(
    record: &SubmissionRecord,
    authority_key_hex: &str,
) -> Result<(), VerificationError> {
    verify_censorship_record(
        &record.files,
        &record.public_key,
        &record.signature,
        &record.censorship_record,
        authority_key_hex,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bundle::SubmissionBundle;
    use crate::crypto::Identity;

    struct Setup {
        bundle: SubmissionBundle,
        record: CensorshipRecord,
        authority: Identity,
    }

    fn issue(authority: &Identity, merkle: &str, token: &str) -> CensorshipRecord {
        CensorshipRecord {
            token: token.to_string(),
            merkle: merkle.to_string(),
            signature: authority.sign(&censorship_message(merkle, token)).to_hex(),
        }
    }

    fn setup() -> Setup {
        let submitter = Identity::from_seed(&[0x01; 32]);
        let authority = Identity::from_seed(&[0x02; 32]);
        let files = vec![
            FileDescriptor::new("invoice.json", br#"{"month":1}"#),
            FileDescriptor::new("a.txt", b"alpha"),
            FileDescriptor::new("b.txt", b"beta"),
        ];
        let bundle = SubmissionBundle::sign(files, Some(&submitter)).unwrap();
        let root = files_merkle_root(bundle.files()).unwrap();
        let record = issue(&authority, &root.to_hex(), "f00d");
        Setup {
            bundle,
            record,
            authority,
        }
    }

    fn run(s: &Setup, files: &[FileDescriptor]) -> Result<(), VerificationError> {
        verify_censorship_record(
            files,
            s.bundle.public_key(),
            s.bundle.signature(),
            &s.record,
            &s.authority.public_key().to_hex(),
        )
    }

    #[test]
    fn test_valid_record_accepted() {
        let s = setup();
        run(&s, s.bundle.files()).unwrap();
    }

    #[test]
    fn test_flipped_payload_byte_rejected() {
        let s = setup();
        let mut files = s.bundle.files().to_vec();
        let original = &files[1];
        let mut data = original.decode_payload().unwrap();
        data[0] ^= 0x01;
        let tampered = FileDescriptor::new(original.name(), &data);
        files[1] = FileDescriptor::from_parts(
            original.name(),
            original.mime(),
            original.digest(),
            tampered.payload(),
        );

        assert!(matches!(
            run(&s, &files),
            Err(VerificationError::DigestMismatch { index: 1, .. })
        ));
    }

    #[test]
    fn test_replaced_file_rejected() {
        // Consistent digest and payload, but not what was signed.
        let s = setup();
        let mut files = s.bundle.files().to_vec();
        files[2] = FileDescriptor::new("b.txt", b"gamma");
        assert!(matches!(
            run(&s, &files),
            Err(VerificationError::InvalidSubmitterSignature)
        ));
    }

    #[test]
    fn test_reordered_files_rejected() {
        let s = setup();
        let mut files = s.bundle.files().to_vec();
        files.swap(1, 2);
        assert!(run(&s, &files).is_err());
    }

    #[test]
    fn test_substituted_merkle_rejected() {
        let mut s = setup();
        let other = Sha256Digest::hash(b"something else").to_hex();
        s.record = issue(&s.authority, &other, "f00d");
        assert!(matches!(
            run(&s, s.bundle.files()),
            Err(VerificationError::MerkleMismatch { .. })
        ));
    }

    #[test]
    fn test_forged_authority_signature_rejected() {
        let mut s = setup();
        let impostor = Identity::from_seed(&[0x66; 32]);
        s.record = issue(&impostor, &s.record.merkle, "f00d");
        assert!(matches!(
            run(&s, s.bundle.files()),
            Err(VerificationError::InvalidAuthoritySignature)
        ));
    }

    #[test]
    fn test_swapped_token_rejected() {
        let mut s = setup();
        s.record.token = "beef".into();
        assert!(matches!(
            run(&s, s.bundle.files()),
            Err(VerificationError::InvalidAuthoritySignature)
        ));
    }

    #[test]
    fn test_malformed_inputs() {
        let s = setup();
        let files = s.bundle.files();
        assert!(matches!(
            verify_censorship_record(files, "zz", s.bundle.signature(), &s.record, "00"),
            Err(VerificationError::Malformed(_))
        ));
        assert!(matches!(
            verify_censorship_record(&[], s.bundle.public_key(), s.bundle.signature(), &s.record, "00"),
            Err(VerificationError::EmptyBundle)
        ));

        let bad_payload = vec![FileDescriptor::from_parts("a", "text/plain", "00", "!!!")];
        assert!(matches!(
            verify_file_digests(&bad_payload),
            Err(VerificationError::Malformed(_))
        ));
    }

    #[test]
    fn test_submission_record_roundtrip() {
        let s = setup();
        let authority_key = s.authority.public_key().to_hex();
        let stored = SubmissionRecord::new(s.bundle, s.record);
        let json = serde_json::to_string(&stored).unwrap();
        let loaded: SubmissionRecord = serde_json::from_str(&json).unwrap();
        verify_submission_record(&loaded, &authority_key).unwrap();
    }
}
