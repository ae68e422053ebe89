//! # libhttps - poll-driven HTTPS client for IoT devices
//!
//! A non-blocking HTTP/1.1 client that runs one request/response exchange at a
//! time over an already-secured byte stream. It is designed for
//! memory-constrained, single-threaded firmware where nothing may block: the
//! application calls [`Client::poll`](network::application::http::Client::poll)
//! from its main loop and the client advances as far as the currently
//! available bytes allow, then returns.
//!
//! ## Features
//!
//! - GET and POST with caller-supplied header lines
//! - Status line and header parsing with header and line size caps
//! - Content-Length, until-close and chunked transfer encoding bodies
//! - Pluggable body sinks: bounded buffering, streaming, CRC-32 checksums
//! - Overall deadline enforced on every poll
//! - Pluggable TLS trust policy: CA verification or insecure
//! - Fixed-capacity buffers only; no heap required
//!
//! ## Usage
//!
//! ```rust,no_run
//! use libhttps::network::application::http::{Client, Options};
//! use libhttps::network::{Clock, Read, Transport, Write};
//! use libhttps::network::tls::TlsConfig;
//! # struct Modem;
//! # impl Read for Modem {
//! #     type Error = ();
//! #     fn read(&mut self, _buf: &mut [u8]) -> Result<usize, Self::Error> { Ok(0) }
//! # }
//! # impl Write for Modem {
//! #     type Error = ();
//! #     fn write(&mut self, buf: &[u8]) -> Result<usize, Self::Error> { Ok(buf.len()) }
//! #     fn flush(&mut self) -> Result<(), Self::Error> { Ok(()) }
//! # }
//! # impl Transport for Modem {
//! #     type ConnectError = ();
//! #     fn connect(&mut self, _h: &str, _p: u16, _t: &TlsConfig) -> Result<(), ()> { Ok(()) }
//! #     fn is_connected(&self) -> bool { false }
//! #     fn available(&self) -> usize { 0 }
//! #     fn close(&mut self) {}
//! # }
//! # struct Ticks;
//! # impl Clock for Ticks { fn now_ms(&self) -> u64 { 0 } }
//!
//! static ROOT_CA: &str = "-----BEGIN CERTIFICATE-----\n...";
//!
//! let mut client = Client::new(Modem, Ticks);
//! client.set_ca_cert(ROOT_CA);
//! client.set_unix_time(1_700_000_000);
//! client.set_options(Options { timeout_ms: 10_000, ..Options::default() });
//!
//! client.begin_get("api.example.com", 443, "/v1/ping", "").unwrap();
//! while !client.is_done() && !client.is_error() {
//!     client.poll();
//!     // ... service other tasks ...
//! }
//! ```
//!
//! ## Optional Features
//!
//! - `std`: Enable standard library support and the `TcpTransport` host adapter
//! - `defmt`: Enable defmt logging support for embedded debugging

#![cfg_attr(not(any(test, feature = "std")), no_std)]
#![deny(missing_docs)]
#![warn(missing_debug_implementations)]

#[macro_use]
mod fmt;

/// Network abstraction layer: transport and clock contracts, TLS trust policy
/// and the HTTP protocol engine.
pub mod network;
