//! Rust client for the Qonto third-party banking REST API (v2).
//! Requests go through one shared pipeline: URL resolution against the
//! versioned base, JSON encoding, a pluggable transport, status
//! classification and typed decoding with pagination metadata.
//!
//! ```no_run
//! use qontoapi::{AuthTransport, Client, ReqwestTransport, TransactionsOptions};
//!
//! # async fn run() -> Result<(), qontoapi::QontoError> {
//! let transport = AuthTransport::new(ReqwestTransport::new()?, "croissant-9134", "secret");
//! let client = Client::with_transport(transport)?;
//!
//! let (org, _) = client.organizations().get("croissant-9134").await?;
//! let options = TransactionsOptions::new(&org.slug, &org.bank_accounts[0].iban);
//! let (transactions, response) = client.transactions().list(&options).await?;
//! println!("{} transactions, meta {:?}", transactions.len(), response.meta);
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod decode;
pub mod error;
pub mod http;
pub mod models;
pub mod services;

pub use client::{Client, RequestCompletionCallback, Response, ResponseMeta};
pub use decode::{DecodeTarget, Json, Sink};
pub use error::{ApiError, ApiErrorKind, QontoError};
pub use http::{AuthTransport, HttpRequest, HttpResponse, ReqwestTransport, Transport};
pub use models::{
    Attachment, BankAccount, Label, Membership, OperationType, Organization, PageOptions,
    Transaction, TransactionSide, TransactionSortBy, TransactionStatus, TransactionsOptions,
};
