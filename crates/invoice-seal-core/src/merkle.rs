//! Ordered Merkle commitments over file digests.
//!
//! Leaves are the file digests in bundle order. Each level hashes adjacent
//! pairs as `SHA256(left || right)`. When a level has an odd number of nodes
//! the last node is paired with itself. A single leaf is its own root.
//!
//! Signer and verifier both call [`merkle_root`]; there is no second
//! implementation of the tree.

use crate::bundle::FileDescriptor;
use crate::crypto::Sha256Digest;
use crate::error::CoreError;

/// Compute the Merkle root of an ordered list of leaves.
pub fn merkle_root(leaves: &[Sha256Digest]) -> Result<Sha256Digest, CoreError> {
    if leaves.is_empty() {
        return Err(CoreError::EmptyBundle);
    }

    let mut level = leaves.to_vec();
    while level.len() > 1 {
        level = level
            .chunks(2)
            .map(|pair| {
                let left = &pair[0];
                let right = if pair.len() > 1 { &pair[1] } else { left };
                Sha256Digest::hash_pair(left, right)
            })
            .collect();
    }

    Ok(level[0])
}

/// Compute the Merkle root over the claimed digests of `files`.
///
/// Fails if any digest is not 32 bytes of hex. Payloads are not inspected.
pub fn files_merkle_root(files: &[FileDescriptor]) -> Result<Sha256Digest, CoreError> {
    let leaves = files
        .iter()
        .map(FileDescriptor::parsed_digest)
        .collect::<Result<Vec<_>, _>>()?;
    merkle_root(&leaves)
}
