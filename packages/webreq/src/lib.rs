//! # webreq
//!
//! A small builder-style HTTP request helper.
//!
//! A [`Request`] collects a method, URL, headers, body, timeout and response
//! size cap through chained setters, then executes once against a shared,
//! pooled `reqwest` client and hands back the raw response bytes. The status
//! code is recorded on the request.
//!
//! ## Async
//!
//! ```ignore
//! use webreq::{method, HeaderSet, Request};
//!
//! let mut request = Request::new(method::GET);
//! request
//!     .set_url("https://example.com")
//!     .set_headers(HeaderSet::new().with("X-Test", "1"))
//!     .set_timeout(2);
//!
//! let body = request.execute().await?;
//! assert_eq!(request.status_code(), 200);
//! ```
//!
//! ## Cancellation
//!
//! ```ignore
//! use webreq::{Request, Scope};
//!
//! let scope = Scope::background().with_cancel();
//! let mut request = Request::get();
//! request.set_url("https://example.com/slow");
//!
//! scope.cancel();
//! assert!(request.execute_with_scope(&scope).await.is_err());
//! ```
//!
//! ## Blocking
//!
//! With the default `blocking` feature:
//!
//! ```ignore
//! let mut request = webreq::Request::post();
//! request.set_url("https://example.com/users").set_data(r#"{"name":"tonny"}"#);
//! let body = request.execute_blocking()?;
//! ```
//!
//! ## Errors
//!
//! Setters never fail. A rejected value (empty URL, empty body, ...) keeps
//! the previous value and is reported by [`Request::error_message`].
//! Transport, cancellation and deadline failures are returned as [`Error`].

pub mod client;
pub mod error;
pub mod request;
pub mod scope;
pub mod types;

#[cfg(feature = "blocking")]
mod blocking;
mod executor;

pub use client::ClientConfig;
pub use error::{Error, ValidationError};
pub use request::{Request, DEFAULT_MAX_RESPONSE_SIZE, DEFAULT_TIMEOUT};
pub use scope::{Scope, ScopeEnd};
pub use types::{method, HeaderSet};
