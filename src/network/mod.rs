//! A network abstraction layer for embedded systems
//!
//! This module defines the byte-stream contract the HTTP engine consumes, the
//! monotonic clock it measures deadlines with, and the TLS trust policy handed
//! to the transport when a connection is opened. Transport establishment
//! itself (DNS, TCP, TLS handshake) lives behind [`Transport`] and is supplied
//! by the platform.

#![deny(unsafe_code)]

/// Common error types for network operations
pub mod error;

/// TLS trust policy and connection settings
pub mod tls;

/// Application layer protocol implementations
pub mod application;

/// Host adapters backed by `std::net`
#[cfg(feature = "std")]
pub mod std_net;

use tls::TlsConfig;

/// Re-exports of common traits
pub mod prelude {
    pub use super::{Clock, Read, Transport, Write};
}

/// Non-blocking read half of a byte stream.
pub trait Read {
    /// Associated error type
    type Error: core::fmt::Debug;
    /// Read already-received data into `buf`, returning the number of bytes
    /// copied. Returns `Ok(0)` when nothing is pending; never waits.
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error>;
}

/// Non-blocking write half of a byte stream.
pub trait Write {
    /// Associated error type
    type Error: core::fmt::Debug;
    /// Queue as much of `buf` as the stream accepts right now.
    fn write(&mut self, buf: &[u8]) -> Result<usize, Self::Error>;
    /// Flush the write buffer
    fn flush(&mut self) -> Result<(), Self::Error>;
}

/// A secured, connection-oriented byte stream.
///
/// Implementations wrap the platform's TLS socket. Every method must return
/// immediately; `connect` is the only call allowed to take as long as the
/// handshake needs, bounded by [`TlsConfig::handshake_timeout_ms`].
pub trait Transport: Read + Write {
    /// Error reported by a failed connection attempt
    type ConnectError: core::fmt::Debug;

    /// Open a connection to `host:port`, verifying the peer per `tls`.
    ///
    /// A transport may return `Ok` before the connection is usable; the engine
    /// waits for [`is_connected`](Transport::is_connected) before sending.
    fn connect(
        &mut self,
        host: &str,
        port: u16,
        tls: &TlsConfig,
    ) -> Result<(), Self::ConnectError>;

    /// Whether the connection is open.
    fn is_connected(&self) -> bool;

    /// Number of received bytes that can be read without waiting.
    fn available(&self) -> usize;

    /// Read a single byte if one is pending.
    fn read_byte(&mut self) -> Result<Option<u8>, <Self as Read>::Error> {
        let mut byte = [0u8; 1];
        match self.read(&mut byte)? {
            0 => Ok(None),
            _ => Ok(Some(byte[0])),
        }
    }

    /// Close the connection, dropping any unread data.
    fn close(&mut self);
}

/// A monotonic millisecond counter.
pub trait Clock {
    /// Milliseconds elapsed since an arbitrary, fixed origin.
    fn now_ms(&self) -> u64;
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now_ms(&self) -> u64 {
        (**self).now_ms()
    }
}
