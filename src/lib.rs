//! # Postmark Client
//! Asynchronous wrapper around the Postmark transactional email HTTP API, providing methods to send single and batched emails from Rust using [`Client`] and [`ClientBuilder`].
//!
//! ## Audience and uses
//! For Rust applications that deliver transactional mail (sign-up confirmations, password resets, receipts) through Postmark: configure with [`ClientBuilder`], build an [`Email`], send it with [`EmailService::send`] or [`EmailService::send_batch`], and inspect the returned [`EmailResult`].
//!
//! ## Runtime requirements
//! Async-only; HTTP calls use `reqwest`, so run inside a Tokio (v1) runtime. Each call performs exactly one request; retries, rate limiting and timeouts beyond [`ClientBuilder::timeout`] are left to the caller or an injected `reqwest::Client`.
//!
//! ## Out of scope
//! Only the email endpoints are wrapped. There is no client-side validation of addresses or bodies; Postmark is the source of truth and reports problems as [`ErrorResponse`].
//!
//! ## Errors
//! Transport failures surface as [`Error::Request`], non-2xx statuses as [`Error::Api`] carrying Postmark's `ErrorCode` and `Message`, and unexpected success payloads as [`Error::Decode`]. [`Error::response`] gives access to the raw response whenever one was received. The crate-wide [`Result`] alias wraps these errors.
//!
//! ## Example
//! ```no_run
//! use postmark_client::{Client, Email};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), postmark_client::Error> {
//!     let client = Client::builder().server_token("server-token").build()?;
//!     let email = Email::new()
//!         .from("sender@example.com")
//!         .to("receiver@example.com")
//!         .subject("Subject")
//!         .text_body("Body");
//!
//!     let (result, response) = client.email().send(&email).await?;
//!     println!("Sent {} ({})", result.message_id, response.status);
//!     Ok(())
//! }
//! ```

mod client;
mod email;
mod error;
mod models;

pub use client::{Client, ClientBuilder, add_options, check_response};
pub use email::EmailService;
pub use error::{Error, ErrorResponse, RawResponse};
pub use models::{Attachment, Email, EmailResult, Header};

/// Result type alias for Postmark operations.
///
/// This is equivalent to `std::result::Result<T, Error>`.
pub type Result<T> = std::result::Result<T, Error>;
