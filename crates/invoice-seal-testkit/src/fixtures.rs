//! Test fixtures and helpers.
//!
//! Common setup code for integration tests: a submitter identity, an
//! in-memory authority, and a scratch directory for attachments.

use std::path::PathBuf;
use std::sync::Arc;

use invoice_seal::{Submitter, SubmitterConfig};
use invoice_seal_client::MemoryAuthority;
use invoice_seal_core::{Identity, InvoicePeriod};
use tempfile::TempDir;

use crate::vectors::INVOICE_CSV;

/// A submitter, an authority, and a scratch directory.
pub struct TestFixture {
    pub identity: Identity,
    pub authority: Arc<MemoryAuthority>,
    pub dir: TempDir,
}

impl TestFixture {
    /// Create a new test fixture with random keys.
    pub fn new() -> std::io::Result<Self> {
        Ok(Self {
            identity: Identity::generate(),
            authority: Arc::new(MemoryAuthority::generate()),
            dir: tempfile::tempdir()?,
        })
    }

    /// Create with deterministic submitter and authority keys.
    pub fn with_seeds(submitter: [u8; 32], authority: [u8; 32]) -> std::io::Result<Self> {
        Ok(Self {
            identity: Identity::from_seed(&submitter),
            authority: Arc::new(MemoryAuthority::new(Identity::from_seed(&authority))),
            dir: tempfile::tempdir()?,
        })
    }

    /// A submitter talking to this fixture's authority.
    pub fn submitter(&self) -> Submitter<Arc<MemoryAuthority>> {
        self.submitter_with(SubmitterConfig::default())
    }

    pub fn submitter_with(&self, config: SubmitterConfig) -> Submitter<Arc<MemoryAuthority>> {
        Submitter::new(
            Arc::clone(&self.authority),
            Some(self.identity.clone()),
            config,
        )
    }

    /// The authority key, hex encoded.
    pub fn authority_key(&self) -> String {
        self.authority.public_key_hex()
    }

    /// Write an attachment into the scratch directory.
    pub fn write_attachment(&self, name: &str, data: &[u8]) -> std::io::Result<PathBuf> {
        let path = self.dir.path().join(name);
        std::fs::write(&path, data)?;
        Ok(path)
    }

    /// The sample invoice table.
    pub fn sample_csv(&self) -> &'static [u8] {
        INVOICE_CSV.as_bytes()
    }
}

/// The period the sample invoice is billed for.
pub fn sample_period() -> InvoicePeriod {
    InvoicePeriod { month: 1, year: 2019 }
}

/// Create identities for several submitters sharing one authority.
pub fn multi_submitter_fixtures(count: usize) -> (Arc<MemoryAuthority>, Vec<Identity>) {
    let authority = Arc::new(MemoryAuthority::generate());
    let identities = (0..count)
        .map(|i| {
            let mut seed = [0u8; 32];
            seed[..8].copy_from_slice(&(i as u64).to_le_bytes());
            Identity::from_seed(&seed)
        })
        .collect();
    (authority, identities)
}
