//! Signing the Merkle commitment of a bundle.

use crate::bundle::FileDescriptor;
use crate::canonical::merkle_signing_message;
use crate::crypto::{Ed25519Signature, Identity};
use crate::error::SigningError;
use crate::merkle::files_merkle_root;

/// Sign the Merkle root of `files` with the submitter's identity.
///
/// The signature covers only the root (as hex text), never the raw files, so
/// verifying it costs the same for any bundle size. The identity is checked
/// first; nothing is hashed when it is absent.
pub fn sign_merkle_root(
    files: &[FileDescriptor],
    identity: Option<&Identity>,
) -> Result<Ed25519Signature, SigningError> {
    let identity = identity.ok_or(SigningError::MissingIdentity)?;
    let root = files_merkle_root(files)?;
    Ok(identity.sign(&merkle_signing_message(&root)))
}
