//! # Application Layer Network Protocols
//!
//! Application layer (OSI Layer 7) protocols built on the [`Transport`]
//! contract. Every implementation here follows the same rules:
//!
//! - **Connection Agnostic**: works with any type implementing [`Transport`]
//! - **No-std Compatible**: no heap allocation, fixed-size buffers only
//! - **Poll Driven**: never blocks; progress happens in short, bounded steps
//!
//! [`Transport`]: crate::network::Transport

/// HTTP/1.1 client implementation.
///
/// Provides a poll-driven HTTP/1.1 client suitable for embedded systems,
/// supporting GET and POST methods with custom headers.
pub mod http;
