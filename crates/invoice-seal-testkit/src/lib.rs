//! # invoice-seal testkit
//!
//! Testing utilities for invoice-seal.
//!
//! ## Overview
//!
//! This crate provides:
//!
//! - **Golden vectors**: Pinned digests, Merkle roots, and signatures
//! - **Generators**: Proptest strategies for invoices and bundles
//! - **Fixtures**: A submitter wired to an in-memory authority
//!
//! ## Golden Vectors
//!
//! ```rust
//! use invoice_seal_testkit::vectors::verify_all_vectors;
//!
//! for (name, matches, root) in verify_all_vectors() {
//!     assert!(matches, "{name}: {root}");
//! }
//! ```
//!
//! ## Property Testing
//!
//! ```rust,ignore
//! use proptest::prelude::*;
//! use invoice_seal_testkit::generators::InvoiceParams;
//!
//! proptest! {
//!     #[test]
//!     fn bundles_verify(params: InvoiceParams) {
//!         let files = params.files();
//!         prop_assert!(invoice_seal_core::verify_file_digests(&files).is_ok());
//!     }
//! }
//! ```
//!
//! ## Test Fixtures
//!
//! ```rust,no_run
//! use invoice_seal_testkit::fixtures::{sample_period, TestFixture};
//!
//! # async fn example() {
//! let fixture = TestFixture::new().unwrap();
//! let record = fixture
//!     .submitter()
//!     .submit_invoice::<&str>(sample_period(), fixture.sample_csv(), &[])
//!     .await
//!     .unwrap();
//! # }
//! ```

pub mod fixtures;
pub mod generators;
pub mod vectors;

pub use fixtures::{multi_submitter_fixtures, sample_period, TestFixture};
