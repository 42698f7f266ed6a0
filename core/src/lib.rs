//! REST client core for a BaasBox-style backend.
//!
//! # Overview
//! Calls the backend's JSON API over GET/POST/PUT and unwraps its standard
//! response envelope (`{"data": ...}`) into a typed value. Every request carries
//! the application code, plus the user's session token while one exists.
//!
//! # Design
//! - `RestClient` is stateless apart from its `ClientConfig`; session state is
//!   read through the `SessionSource` capability at request time.
//! - Each call is split into `build_request` and `parse_response`, so the I/O
//!   boundary is explicit and a host can execute `HttpRequest`s itself.
//! - The async operations go through the `Transport` trait. `ReqwestTransport`
//!   creates and releases one HTTP client per call.
//! - Cancellation is cooperative via `tokio_util::sync::CancellationToken`.
//! - Nothing is retried; every failure is an `ApiError` for the caller.

pub mod client;
pub mod config;
pub mod envelope;
pub mod error;
pub mod http;
pub mod session;
pub mod transport;

pub use client::{RestClient, NO_BODY};
pub use config::ClientConfig;
pub use envelope::Envelope;
pub use error::ApiError;
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use session::{NoSession, SessionSource, SharedSession};
pub use transport::{ReqwestTransport, Transport};
pub use tokio_util::sync::CancellationToken;
