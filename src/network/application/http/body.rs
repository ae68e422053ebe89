//! Response body decoding.
//!
//! Both strategies pull only the bytes the transport already holds, hand each
//! decoded fragment to the sink and report whether the body is finished.

use super::error::Error;
use super::header::HeaderParser;
use super::sink::{BodySink, SinkError};
use crate::network::Transport;
use heapless::Vec;

/// Longest chunk-size line accepted, extensions included.
const MAX_CHUNK_LINE: usize = 64;

/// Outcome of one decoding step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Progress {
    /// More bytes are needed.
    Pending,
    /// The whole body has been delivered.
    Complete,
}

/// The framing selected by the response headers.
#[derive(Debug)]
pub(crate) enum BodyDecoder {
    Bounded(BoundedBody),
    Chunked(ChunkedBody),
}

impl BodyDecoder {
    /// Picks the framing announced by `headers`; chunked wins over a length.
    pub(crate) fn for_headers(headers: &HeaderParser) -> Self {
        if headers.is_chunked() {
            BodyDecoder::Chunked(ChunkedBody::new())
        } else {
            BodyDecoder::Bounded(BoundedBody {
                remaining: headers.content_length(),
            })
        }
    }

    /// Decodes whatever the transport currently holds.
    ///
    /// `scratch` bounds the size of every bulk read.
    pub(crate) fn step<T, B>(
        &mut self,
        transport: &mut T,
        sink: &mut B,
        scratch: &mut [u8],
    ) -> Result<Progress, Error>
    where
        T: Transport,
        B: BodySink,
    {
        match self {
            BodyDecoder::Bounded(body) => body.step(transport, sink, scratch),
            BodyDecoder::Chunked(body) => body.step(transport, sink, scratch),
        }
    }
}

/// A body framed by `Content-Length`, or by the connection closing.
#[derive(Debug)]
pub(crate) struct BoundedBody {
    /// Bytes still expected; `None` reads until the stream closes.
    remaining: Option<usize>,
}

impl BoundedBody {
    fn step<T, B>(
        &mut self,
        transport: &mut T,
        sink: &mut B,
        scratch: &mut [u8],
    ) -> Result<Progress, Error>
    where
        T: Transport,
        B: BodySink,
    {
        while self.remaining != Some(0) && transport.available() > 0 {
            let want = match self.remaining {
                Some(remaining) => remaining.min(scratch.len()),
                None => scratch.len(),
            };
            let n = transport
                .read(&mut scratch[..want])
                .map_err(|_| Error::ReadFailed)?;
            if n == 0 {
                break;
            }
            trace!("body: {} bytes", n);
            deliver(sink, &scratch[..n])?;
            if let Some(remaining) = self.remaining.as_mut() {
                *remaining -= n;
            }
        }

        if self.remaining == Some(0) {
            return Ok(Progress::Complete);
        }
        if !transport.is_connected() && transport.available() == 0 {
            return match self.remaining {
                None => Ok(Progress::Complete),
                Some(_) => Err(Error::ConnectionClosed),
            };
        }
        Ok(Progress::Pending)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ChunkState {
    /// Reading the hexadecimal size line.
    Size,
    /// Forwarding chunk payload.
    Data,
    /// Skipping the CRLF after a chunk's payload.
    DataEnd,
    /// After the zero-size chunk: skipping trailer lines.
    Trailers,
    Done,
}

/// A `Transfer-Encoding: chunked` body.
#[derive(Debug)]
pub(crate) struct ChunkedBody {
    state: ChunkState,
    line: Vec<u8, MAX_CHUNK_LINE>,
    remaining: usize,
    trailer_line_empty: bool,
}

impl ChunkedBody {
    fn new() -> Self {
        Self {
            state: ChunkState::Size,
            line: Vec::new(),
            remaining: 0,
            trailer_line_empty: true,
        }
    }

    fn step<T, B>(
        &mut self,
        transport: &mut T,
        sink: &mut B,
        scratch: &mut [u8],
    ) -> Result<Progress, Error>
    where
        T: Transport,
        B: BodySink,
    {
        while self.state != ChunkState::Done && transport.available() > 0 {
            let Some(byte) = transport.read_byte().map_err(|_| Error::ReadFailed)? else {
                break;
            };

            match self.state {
                ChunkState::Size => {
                    if byte == b'\n' {
                        self.remaining = parse_chunk_size(&self.line)?;
                        self.line.clear();
                        trace!("chunk: {} bytes", self.remaining);
                        self.state = if self.remaining == 0 {
                            ChunkState::Trailers
                        } else {
                            ChunkState::Data
                        };
                    } else {
                        self.line.push(byte).map_err(|_| Error::ChunkLineTooLong)?;
                    }
                }
                ChunkState::Data => {
                    deliver(sink, &[byte])?;
                    self.remaining -= 1;

                    while self.remaining > 0 && transport.available() > 0 {
                        let want = self.remaining.min(scratch.len());
                        let n = transport
                            .read(&mut scratch[..want])
                            .map_err(|_| Error::ReadFailed)?;
                        if n == 0 {
                            break;
                        }
                        deliver(sink, &scratch[..n])?;
                        self.remaining -= n;
                    }

                    if self.remaining == 0 {
                        self.state = ChunkState::DataEnd;
                    }
                }
                ChunkState::DataEnd => {
                    if byte == b'\n' {
                        self.state = ChunkState::Size;
                    }
                }
                ChunkState::Trailers => {
                    if byte == b'\n' {
                        if self.trailer_line_empty {
                            self.state = ChunkState::Done;
                        }
                        self.trailer_line_empty = true;
                    } else if !byte.is_ascii_whitespace() {
                        self.trailer_line_empty = false;
                    }
                }
                ChunkState::Done => {}
            }
        }

        if self.state == ChunkState::Done {
            return Ok(Progress::Complete);
        }
        if !transport.is_connected() && transport.available() == 0 {
            // Closing after the last chunk is normal; anywhere earlier the body is cut short.
            return match self.state {
                ChunkState::Trailers => Ok(Progress::Complete),
                _ => Err(Error::ConnectionClosed),
            };
        }
        Ok(Progress::Pending)
    }
}

/// Parses `1a3f;name=value` style size lines.
fn parse_chunk_size(line: &[u8]) -> Result<usize, Error> {
    let line = line.trim_ascii();
    let size = match line.iter().position(|&b| b == b';') {
        Some(semi) => line[..semi].trim_ascii(),
        None => line,
    };
    let size = core::str::from_utf8(size).map_err(|_| Error::MalformedChunk)?;
    usize::from_str_radix(size, 16).map_err(|_| Error::MalformedChunk)
}

fn deliver<B: BodySink>(sink: &mut B, fragment: &[u8]) -> Result<(), Error> {
    sink.on_body(fragment).map_err(|e| match e {
        SinkError::Overflow => Error::BodyTooLarge,
        SinkError::Aborted => Error::SinkAborted,
    })
}
