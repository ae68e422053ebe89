//! Host-side transport and clock over `std::net`.
//!
//! [`TcpTransport`] is a plain, non-blocking TCP stream with no TLS layer. It
//! exists for development on a workstation and for tests against local
//! servers; it only accepts [`Trust::Insecure`] so that a configuration asking
//! for certificate verification is never silently downgraded.

use super::error::Error;
use super::tls::{TlsConfig, Trust};
use super::{Clock, Read, Transport, Write};
use std::io::{self, ErrorKind, Read as _, Write as _};
use std::net::{Shutdown, TcpStream, ToSocketAddrs};
use std::time::{Duration, Instant};

const PEEK_LEN: usize = 1024;

/// A non-blocking TCP connection.
#[derive(Debug, Default)]
pub struct TcpTransport {
    stream: Option<TcpStream>,
}

impl TcpTransport {
    /// A transport with no connection.
    pub fn new() -> Self {
        Self::default()
    }

    fn peek(&self) -> io::Result<usize> {
        let mut buf = [0u8; PEEK_LEN];
        match &self.stream {
            Some(stream) => stream.peek(&mut buf),
            None => Ok(0),
        }
    }
}

impl Read for TcpTransport {
    type Error = Error;

    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
        let Some(stream) = self.stream.as_mut() else {
            return Err(Error::NotOpen);
        };
        match stream.read(buf) {
            Ok(n) => Ok(n),
            Err(e) if e.kind() == ErrorKind::WouldBlock => Ok(0),
            Err(_) => Err(Error::ReadError),
        }
    }
}

impl Write for TcpTransport {
    type Error = Error;

    fn write(&mut self, buf: &[u8]) -> Result<usize, Self::Error> {
        let Some(stream) = self.stream.as_mut() else {
            return Err(Error::NotOpen);
        };
        match stream.write(buf) {
            Ok(n) => Ok(n),
            Err(e) if e.kind() == ErrorKind::WouldBlock => Ok(0),
            Err(_) => Err(Error::WriteError),
        }
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        match self.stream.as_mut() {
            Some(stream) => stream.flush().map_err(|_| Error::WriteError),
            None => Err(Error::NotOpen),
        }
    }
}

impl Transport for TcpTransport {
    type ConnectError = Error;

    fn connect(&mut self, host: &str, port: u16, tls: &TlsConfig) -> Result<(), Error> {
        if tls.trust != Trust::Insecure {
            return Err(Error::UnsupportedTrust);
        }

        let addr = (host, port)
            .to_socket_addrs()
            .map_err(|_| Error::InvalidAddress)?
            .next()
            .ok_or(Error::InvalidAddress)?;
        let timeout = Duration::from_millis(u64::from(tls.handshake_timeout_ms.max(1)));
        let stream = TcpStream::connect_timeout(&addr, timeout).map_err(|e| match e.kind() {
            ErrorKind::TimedOut => Error::Timeout,
            _ => Error::ConnectionRefused,
        })?;
        stream
            .set_nonblocking(true)
            .map_err(|_| Error::ConnectionRefused)?;
        // Best effort: small request writes should not wait on Nagle.
        let _ = stream.set_nodelay(true);

        self.stream = Some(stream);
        Ok(())
    }

    fn is_connected(&self) -> bool {
        match self.peek() {
            Ok(0) => false,
            Ok(_) => true,
            Err(e) => self.stream.is_some() && e.kind() == ErrorKind::WouldBlock,
        }
    }

    fn available(&self) -> usize {
        self.peek().unwrap_or(0)
    }

    fn close(&mut self) {
        if let Some(stream) = self.stream.take() {
            let _ = stream.shutdown(Shutdown::Both);
        }
    }
}

/// Milliseconds since the clock was created.
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    /// A clock starting at zero now.
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now_ms(&self) -> u64 {
        u64::try_from(self.origin.elapsed().as_millis()).unwrap_or(u64::MAX)
    }
}
