//! Loading the submitter identity.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use invoice_seal::Identity;

use crate::expand_home;

/// Environment variable naming the identity file.
pub const IDENTITY_ENV: &str = "INVOICE_SEAL_IDENTITY";

/// Locate the identity file: the flag wins over the environment.
pub fn identity_path(flag: Option<&Path>) -> Option<PathBuf> {
    flag.map(Path::to_path_buf)
        .or_else(|| std::env::var_os(IDENTITY_ENV).map(PathBuf::from))
        .map(|p| expand_home(&p))
}

/// Read an identity from a hex file.
///
/// The file holds a 32-byte seed or a 64-byte `seed || public` key.
pub fn load_identity(path: &Path) -> Result<Identity> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("reading identity {}", path.display()))?;
    Identity::from_secret_hex(&raw).with_context(|| format!("parsing identity {}", path.display()))
}

/// Load the identity if one is configured.
///
/// An unconfigured identity is not an error here; signing reports it.
pub fn resolve_identity(flag: Option<&Path>) -> Result<Option<Identity>> {
    match identity_path(flag) {
        Some(path) => {
            let identity = load_identity(&path)?;
            tracing::debug!(
                path = %path.display(),
                public_key = %identity.public_key().to_hex(),
                "loaded identity"
            );
            Ok(Some(identity))
        }
        None => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_seed_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("identity");
        std::fs::write(&path, format!("{}\n", "01".repeat(32))).unwrap();

        let identity = load_identity(&path).unwrap();
        assert_eq!(
            identity.public_key(),
            Identity::from_seed(&[0x01; 32]).public_key()
        );
    }

    #[test]
    fn load_rejects_garbage() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("identity");
        std::fs::write(&path, "not hex").unwrap();
        assert!(load_identity(&path).is_err());
        assert!(load_identity(&dir.path().join("absent")).is_err());
    }

    #[test]
    fn flag_wins() {
        let path = identity_path(Some(Path::new("/tmp/flag-identity")));
        assert_eq!(path, Some(PathBuf::from("/tmp/flag-identity")));
    }
}
