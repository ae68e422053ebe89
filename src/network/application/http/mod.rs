//! HTTP/1.1 protocol implementation for embedded systems.
//!
//! This module provides a lightweight, poll-driven HTTP client designed
//! specifically for embedded systems and `no_std` environments. It focuses on
//! predictable memory usage and never blocking the caller.
//!
//! # Features
//!
//! - HTTP/1.1 requests terminated by `Connection: close`
//! - Cooperative `poll()` model with an overall deadline
//! - Fixed-size buffers for predictable memory usage
//! - Content-Length, until-close and chunked response bodies
//! - Header and body size caps to protect RAM
//! - GET and POST method support
//!
//! # Usage
//!
//! The main entry point is the [`Client`], which owns one [`Transport`], one
//! [`Clock`] and one [`BodySink`]. Start an exchange with
//! [`Client::begin_get`] or [`Client::begin_post`], then call
//! [`Client::poll`] until [`Client::is_done`] or [`Client::is_error`].
//!
//! Large responses should be streamed with a custom [`BodySink`] instead of
//! buffered:
//!
//! ```rust
//! use libhttps::network::application::http::{BodySink, FnSink, SinkError};
//!
//! let mut received = 0usize;
//! let mut sink = FnSink::new(|fragment: &[u8]| {
//!     received += fragment.len();
//!     if received > 64 * 1024 { Err(SinkError::Aborted) } else { Ok(()) }
//! });
//! assert!(sink.on_body(b"hello").is_ok());
//! ```
//!
//! [`Transport`]: crate::network::Transport
//! [`Clock`]: crate::network::Clock

mod body;
/// HTTP client state machine.
pub mod client;
mod error;
mod header;
mod options;
mod request;
mod sink;

pub use client::{Client, DEFAULT_BODY_CAPACITY, MAX_HOST_LEN, State};
pub use error::Error;
pub use header::{HeaderParser, MAX_LINE_LEN};
pub use options::{ConfigError, Options};
pub use request::{ExtraHeaders, MAX_REQUEST_LEN, Method, Request, USER_AGENT};
pub use sink::{BodySink, BufferedBody, Crc32Body, FnSink, SinkError};
