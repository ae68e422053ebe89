#![allow(dead_code)]

use libhttps::network::error::Error;
use libhttps::network::tls::TlsConfig;
use libhttps::network::{Clock, Read, Transport, Write};
use std::cell::Cell;
use std::collections::VecDeque;

/// How a `MockTransport` answers `connect`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectOutcome {
    /// Connected as soon as `connect` returns.
    Succeed,
    /// `connect` reports an error.
    Fail,
    /// `connect` returns `Ok`, but the test flips `connected` later.
    Pending,
}

/// A scripted, in-memory transport.
///
/// Bytes queued with `feed` become readable immediately. When
/// `close_when_drained` is set, the peer hangs up as soon as every queued byte
/// has been read.
#[derive(Debug)]
pub struct MockTransport {
    pub inbound: VecDeque<u8>,
    pub written: Vec<u8>,
    pub connected: bool,
    pub peer_closed: bool,
    pub close_when_drained: bool,
    pub connect_outcome: ConnectOutcome,
    pub connect_calls: usize,
    pub last_tls: Option<TlsConfig>,
    pub last_remote: Option<(String, u16)>,
    pub write_limit: usize,
    pub close_calls: usize,
    pub reads: usize,
}

impl MockTransport {
    pub fn new() -> Self {
        Self {
            inbound: VecDeque::new(),
            written: Vec::new(),
            connected: false,
            peer_closed: false,
            close_when_drained: false,
            connect_outcome: ConnectOutcome::Succeed,
            connect_calls: 0,
            last_tls: None,
            last_remote: None,
            write_limit: usize::MAX,
            close_calls: 0,
            reads: 0,
        }
    }

    /// A server that sends `response` and then closes the connection.
    pub fn responding(response: &[u8]) -> Self {
        let mut transport = Self::new();
        transport.feed(response);
        transport.close_when_drained = true;
        transport
    }

    /// A server that sends `response` and keeps the connection open.
    pub fn responding_open(response: &[u8]) -> Self {
        let mut transport = Self::new();
        transport.feed(response);
        transport
    }

    pub fn feed(&mut self, bytes: &[u8]) {
        self.inbound.extend(bytes.iter().copied());
    }

    pub fn hang_up(&mut self) {
        self.peer_closed = true;
    }

    pub fn written_str(&self) -> &str {
        std::str::from_utf8(&self.written).unwrap()
    }
}

impl Read for MockTransport {
    type Error = Error;

    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
        if !self.connected && self.inbound.is_empty() {
            return Err(Error::NotOpen);
        }
        let len = buf.len().min(self.inbound.len());
        for (slot, byte) in buf.iter_mut().zip(self.inbound.drain(..len)) {
            *slot = byte;
        }
        self.reads += 1;
        Ok(len)
    }
}

impl Write for MockTransport {
    type Error = Error;

    fn write(&mut self, buf: &[u8]) -> Result<usize, Self::Error> {
        if !self.connected {
            return Err(Error::NotOpen);
        }
        let len = buf.len().min(self.write_limit);
        self.written.extend_from_slice(&buf[..len]);
        Ok(len)
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        if !self.connected {
            return Err(Error::NotOpen);
        }
        Ok(())
    }
}

impl Transport for MockTransport {
    type ConnectError = Error;

    fn connect(&mut self, host: &str, port: u16, tls: &TlsConfig) -> Result<(), Error> {
        self.connect_calls += 1;
        self.last_tls = Some(*tls);
        self.last_remote = Some((host.to_string(), port));
        match self.connect_outcome {
            ConnectOutcome::Succeed => {
                self.connected = true;
                Ok(())
            }
            ConnectOutcome::Fail => Err(Error::ConnectionRefused),
            ConnectOutcome::Pending => Ok(()),
        }
    }

    fn is_connected(&self) -> bool {
        self.connected
            && !self.peer_closed
            && !(self.close_when_drained && self.inbound.is_empty())
    }

    fn available(&self) -> usize {
        self.inbound.len()
    }

    fn close(&mut self) {
        self.close_calls += 1;
        self.connected = false;
    }
}

/// A clock the test moves by hand.
#[derive(Debug, Default)]
pub struct ManualClock {
    now: Cell<u64>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn advance(&self, ms: u64) {
        self.now.set(self.now.get() + ms);
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> u64 {
        self.now.get()
    }
}

/// Encodes `body` with chunk boundaries after each length in `splits`.
pub fn encode_chunked(body: &[u8], splits: &[usize]) -> Vec<u8> {
    let mut out = Vec::new();
    let mut rest = body;
    for &len in splits {
        if rest.is_empty() {
            break;
        }
        let len = len.clamp(1, rest.len());
        out.extend_from_slice(format!("{len:x}\r\n").as_bytes());
        out.extend_from_slice(&rest[..len]);
        out.extend_from_slice(b"\r\n");
        rest = &rest[len..];
    }
    if !rest.is_empty() {
        out.extend_from_slice(format!("{:X}\r\n", rest.len()).as_bytes());
        out.extend_from_slice(rest);
        out.extend_from_slice(b"\r\n");
    }
    out.extend_from_slice(b"0\r\n\r\n");
    out
}
