//! # invoice-seal client
//!
//! Talks to the authority that receives sealed invoices.
//!
//! ## Overview
//!
//! The client exchanges two requests with the authority:
//!
//! ```text
//! Submitter                           Authority
//!   |-------- GET  /api/v1/version ---->|
//!   |<------- version, pubkey ----------|
//!   |-------- POST /api/v1/invoices/new>|
//!   |<------- censorship record --------|
//! ```
//!
//! [`Transport`] abstracts the exchange. [`HttpTransport`] speaks HTTPS to a
//! live authority; [`memory::MemoryAuthority`] answers in process and can be
//! told to misbehave.
//!
//! Only a 4xx reply is a refusal ([`ClientError::Server`]). A 5xx or a
//! gateway page is [`ClientError::Upstream`]: retryable, and after a
//! submission it does not prove the authority discarded the request.
//!
//! The version call backs off and retries on those failures. Submission is
//! never retried.

pub mod config;
pub mod error;
pub mod http;
pub mod messages;
mod retry;
pub mod transport;

pub use config::{ClientConfig, ConfigError};
pub use error::{ClientError, Result};
pub use http::HttpTransport;
pub use messages::{
    error_codes, routes, ErrorReply, NewInvoice, NewInvoiceReply, VersionReply, API_ROUTE,
    API_VERSION,
};
pub use transport::{memory, memory::AuthorityBehavior, memory::MemoryAuthority, Transport};
