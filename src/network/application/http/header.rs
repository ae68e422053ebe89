//! Incremental status line and header parser.

use super::error::Error;
use heapless::Vec;

/// Longest header line accepted, terminator included.
pub const MAX_LINE_LEN: usize = 512;

const CONTENT_LENGTH: &[u8] = b"content-length:";
const TRANSFER_ENCODING: &[u8] = b"transfer-encoding:";

/// Consumes response bytes one at a time until the blank line ending the
/// header block.
///
/// Only the status code, `Content-Length` and `Transfer-Encoding: chunked`
/// are retained; every other header is skipped.
///
/// ```rust
/// use libhttps::network::application::http::HeaderParser;
///
/// let mut parser = HeaderParser::new();
/// let mut complete = false;
/// for &byte in b"HTTP/1.1 200 OK\r\nContent-Length: 2\r\n\r\n" {
///     complete = parser.push(byte, 4096).unwrap();
/// }
/// assert!(complete);
/// assert_eq!(parser.status(), Some(200));
/// assert_eq!(parser.content_length(), Some(2));
/// ```
#[derive(Debug, Clone, Default)]
pub struct HeaderParser {
    line: Vec<u8, MAX_LINE_LEN>,
    header_bytes: usize,
    seen_status_line: bool,
    status: Option<u16>,
    content_length: Option<usize>,
    chunked: bool,
    complete: bool,
}

impl HeaderParser {
    /// A parser positioned at the start of a response.
    pub fn new() -> Self {
        Self::default()
    }

    /// Feeds one byte. Returns `Ok(true)` once the header block is complete.
    ///
    /// Bytes pushed after completion are ignored.
    pub fn push(&mut self, byte: u8, max_header_bytes: usize) -> Result<bool, Error> {
        if self.complete {
            return Ok(true);
        }

        self.header_bytes += 1;
        if self.header_bytes > max_header_bytes {
            return Err(Error::HeadersTooLarge);
        }

        self.line.push(byte).map_err(|_| Error::LineTooLong)?;

        if byte == b'\n' {
            let line = core::mem::take(&mut self.line);
            self.dispatch(line.trim_ascii());
        }
        Ok(self.complete)
    }

    fn dispatch(&mut self, line: &[u8]) {
        if line.is_empty() {
            self.complete = true;
            return;
        }

        if !self.seen_status_line {
            self.seen_status_line = true;
            if line.starts_with(b"HTTP/") {
                self.status = parse_status(line);
                return;
            }
        }

        if let Some(value) = strip_prefix_ignore_case(line, CONTENT_LENGTH) {
            self.content_length = core::str::from_utf8(value.trim_ascii())
                .ok()
                .and_then(|v| v.parse().ok());
        } else if let Some(value) = strip_prefix_ignore_case(line, TRANSFER_ENCODING) {
            if contains_ignore_case(value, b"chunked") {
                self.chunked = true;
            }
        }
    }

    /// Status code from the status line, if one has been parsed.
    pub fn status(&self) -> Option<u16> {
        self.status
    }

    /// Declared body length, or `None` when the body runs until close.
    pub fn content_length(&self) -> Option<usize> {
        self.content_length
    }

    /// Whether the body uses chunked transfer encoding.
    pub fn is_chunked(&self) -> bool {
        self.chunked
    }

    /// Whether the blank line ending the headers has been seen.
    pub fn is_complete(&self) -> bool {
        self.complete
    }

    /// Header bytes consumed so far, line terminators included.
    pub fn header_bytes(&self) -> usize {
        self.header_bytes
    }
}

/// Extracts the three-digit code after the first space of a status line.
///
/// Accepts both `HTTP/1.1 200 OK` and the `HTTP/2 200` form.
fn parse_status(line: &[u8]) -> Option<u16> {
    let space = line.iter().position(|&b| b == b' ')?;
    let code = line.get(space + 1..space + 4)?;
    if !code.iter().all(u8::is_ascii_digit) {
        return None;
    }
    Some(code.iter().fold(0u16, |acc, &d| acc * 10 + u16::from(d - b'0')))
}

fn strip_prefix_ignore_case<'l>(line: &'l [u8], prefix: &[u8]) -> Option<&'l [u8]> {
    if line.len() >= prefix.len() && line[..prefix.len()].eq_ignore_ascii_case(prefix) {
        Some(&line[prefix.len()..])
    } else {
        None
    }
}

fn contains_ignore_case(haystack: &[u8], needle: &[u8]) -> bool {
    haystack
        .windows(needle.len())
        .any(|window| window.eq_ignore_ascii_case(needle))
}
