//! Client configuration.

use serde::{Deserialize, Serialize};

/// Per-request limits and timeouts.
///
/// A copy is captured when a request begins and stays fixed until that
/// exchange ends, so changing options mid-flight only affects the next
/// request.
///
/// Options can be stored as JSON; fields missing from the document keep their
/// defaults:
///
/// ```rust
/// use libhttps::network::application::http::Options;
///
/// let options = Options::from_json(r#"{"timeout_ms":5000,"keep_body":false}"#).unwrap();
/// assert_eq!(options.timeout_ms, 5000);
/// assert!(!options.keep_body);
/// assert_eq!(options.max_header_bytes, 4096);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Options {
    /// Overall deadline, measured from the start of the request.
    pub timeout_ms: u32,
    /// Coarse bound on connect plus TLS handshake, passed to the transport.
    pub tls_handshake_timeout_ms: u32,
    /// Cap on the total size of the status line and headers.
    pub max_header_bytes: usize,
    /// Cap on the buffered body. Bodies larger than this are truncated and
    /// the exchange fails with `BodyTooLarge`.
    pub max_body_bytes: usize,
    /// Largest single read from the transport while reading the body.
    pub io_chunk_size: usize,
    /// Buffer the body (`true`) or discard it after it reaches the sink.
    pub keep_body: bool,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            timeout_ms: 15_000,
            tls_handshake_timeout_ms: 12_000,
            max_header_bytes: 4096,
            max_body_bytes: 16 * 1024,
            io_chunk_size: 512,
            keep_body: true,
        }
    }
}

/// Errors from loading or storing [`Options`] as JSON.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum ConfigError {
    /// The document is not valid JSON for `Options`.
    Malformed,
    /// The output buffer is too small for the serialized options.
    BufferTooSmall,
}

impl core::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            ConfigError::Malformed => f.write_str("malformed options document"),
            ConfigError::BufferTooSmall => f.write_str("options buffer too small"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for ConfigError {}

#[cfg(feature = "defmt")]
impl defmt::Format for ConfigError {
    fn format(&self, f: defmt::Formatter) {
        match self {
            ConfigError::Malformed => defmt::write!(f, "Malformed"),
            ConfigError::BufferTooSmall => defmt::write!(f, "BufferTooSmall"),
        }
    }
}

impl Options {
    /// Parses options from a JSON object.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        serde_json_core::from_str::<Options>(json)
            .map(|(options, _)| options)
            .map_err(|_| ConfigError::Malformed)
    }

    /// Serializes the options into `buf`, returning the JSON text.
    pub fn to_json<'b>(&self, buf: &'b mut [u8]) -> Result<&'b str, ConfigError> {
        let len = serde_json_core::to_slice(self, buf).map_err(|_| ConfigError::BufferTooSmall)?;
        core::str::from_utf8(&buf[..len]).map_err(|_| ConfigError::Malformed)
    }

    /// Read size actually used for a given scratch buffer length.
    pub(crate) fn read_chunk(&self, scratch_len: usize) -> usize {
        self.io_chunk_size.clamp(1, scratch_len)
    }
}
