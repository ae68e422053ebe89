//! Terminal failures of an HTTP exchange

use crate::network::tls::Prerequisite;

/// Why an exchange ended in [`State::Error`](super::State::Error).
///
/// Every variant is terminal: the transport is closed and nothing is retried.
/// Retrying is up to the application, by beginning a new request.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Error {
    /// TLS trust material or a valid clock was not set before the request.
    PrerequisiteMissing(Prerequisite),
    /// The serialized request or the host name does not fit its buffer.
    RequestTooLarge,
    /// The transport failed to connect or complete the TLS handshake.
    ConnectFailed,
    /// The request could not be written.
    SendFailed,
    /// The transport reported a read error.
    ReadFailed,
    /// The stream closed before the response was complete.
    ConnectionClosed,
    /// The response headers exceeded `Options::max_header_bytes`.
    HeadersTooLarge,
    /// A single header line exceeded the line buffer.
    LineTooLong,
    /// A chunk-size line exceeded its buffer.
    ChunkLineTooLong,
    /// A chunk-size line was not a hexadecimal number.
    MalformedChunk,
    /// The body sink overflowed its size cap; the body is truncated.
    BodyTooLarge,
    /// The body sink asked to stop.
    SinkAborted,
    /// The overall request deadline passed.
    Timeout,
}

impl Error {
    /// Human-readable description of the failure.
    pub fn description(&self) -> &'static str {
        match self {
            Error::PrerequisiteMissing(Prerequisite::TrustAnchor) => "TLS CA certificate not set",
            Error::PrerequisiteMissing(Prerequisite::Time) => "system time not set",
            Error::RequestTooLarge => "request exceeds buffer",
            Error::ConnectFailed => "connect/TLS failed",
            Error::SendFailed => "send failed",
            Error::ReadFailed => "read failed",
            Error::ConnectionClosed => "connection closed before response complete",
            Error::HeadersTooLarge => "headers too large",
            Error::LineTooLong => "header line too long",
            Error::ChunkLineTooLong => "chunk size line too long",
            Error::MalformedChunk => "malformed chunk size",
            Error::BodyTooLarge => "body exceeded max body bytes",
            Error::SinkAborted => "body handler aborted",
            Error::Timeout => "timeout",
        }
    }
}

impl core::fmt::Display for Error {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.description())
    }
}

#[cfg(feature = "std")]
impl std::error::Error for Error {}

#[cfg(feature = "defmt")]
impl defmt::Format for Error {
    fn format(&self, f: defmt::Formatter) {
        match self {
            Error::PrerequisiteMissing(p) => defmt::write!(f, "PrerequisiteMissing({})", p),
            Error::RequestTooLarge => defmt::write!(f, "RequestTooLarge"),
            Error::ConnectFailed => defmt::write!(f, "ConnectFailed"),
            Error::SendFailed => defmt::write!(f, "SendFailed"),
            Error::ReadFailed => defmt::write!(f, "ReadFailed"),
            Error::ConnectionClosed => defmt::write!(f, "ConnectionClosed"),
            Error::HeadersTooLarge => defmt::write!(f, "HeadersTooLarge"),
            Error::LineTooLong => defmt::write!(f, "LineTooLong"),
            Error::ChunkLineTooLong => defmt::write!(f, "ChunkLineTooLong"),
            Error::MalformedChunk => defmt::write!(f, "MalformedChunk"),
            Error::BodyTooLarge => defmt::write!(f, "BodyTooLarge"),
            Error::SinkAborted => defmt::write!(f, "SinkAborted"),
            Error::Timeout => defmt::write!(f, "Timeout"),
        }
    }
}
