//! Poll-driven HTTP/1.1 client.
//!
//! One [`Client`] runs one exchange at a time:
//!
//! ```text
//! Idle -> Connect -> Send -> ReadHeaders -> ReadBody -> Done
//!            \________\__________\_____________\______-> Error
//! ```
//!
//! Each call to [`Client::poll`] first checks the overall deadline, then does
//! the non-blocking work available in the current state and returns. Reading
//! loops only while the transport reports buffered bytes, so one poll never
//! waits on the network.

use super::body::{BodyDecoder, Progress};
use super::error::Error;
use super::header::HeaderParser;
use super::options::Options;
use super::request::{MAX_REQUEST_LEN, Request};
use super::sink::{BodySink, BufferedBody};
use crate::network::tls::{self, TlsConfig, Trust};
use crate::network::{Clock, Transport};
use heapless::{String, Vec};

/// Longest host name accepted (the DNS limit).
pub const MAX_HOST_LEN: usize = 253;

/// Capacity of the default [`BufferedBody`] sink.
pub const DEFAULT_BODY_CAPACITY: usize = 16 * 1024;

/// Stack buffer for bulk body reads; `Options::io_chunk_size` is clamped to it.
const SCRATCH_LEN: usize = 768;

/// Progress of the current exchange.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    /// No request in flight.
    Idle,
    /// Waiting for the transport to connect.
    Connect,
    /// Writing the request.
    Send,
    /// Reading the status line and headers.
    ReadHeaders,
    /// Reading the body.
    ReadBody,
    /// The response was received in full.
    Done,
    /// The exchange failed; see [`Client::error`].
    Error,
}

impl State {
    fn is_active(&self) -> bool {
        !matches!(self, State::Idle | State::Done | State::Error)
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for State {
    fn format(&self, f: defmt::Formatter) {
        match self {
            State::Idle => defmt::write!(f, "Idle"),
            State::Connect => defmt::write!(f, "Connect"),
            State::Send => defmt::write!(f, "Send"),
            State::ReadHeaders => defmt::write!(f, "ReadHeaders"),
            State::ReadBody => defmt::write!(f, "ReadBody"),
            State::Done => defmt::write!(f, "Done"),
            State::Error => defmt::write!(f, "Error"),
        }
    }
}

/// Everything that belongs to one request. Rebuilt from scratch for every
/// request so nothing leaks from one exchange into the next.
#[derive(Debug)]
struct Exchange {
    state: State,
    options: Options,
    started_at: u64,
    host: String<MAX_HOST_LEN>,
    port: u16,
    request: Vec<u8, MAX_REQUEST_LEN>,
    sent: usize,
    connecting: bool,
    headers: HeaderParser,
    body: Option<BodyDecoder>,
    error: Option<Error>,
    overflow: bool,
}

impl Exchange {
    fn new(options: Options) -> Self {
        Self {
            state: State::Idle,
            options,
            started_at: 0,
            host: String::new(),
            port: 0,
            request: Vec::new(),
            sent: 0,
            connecting: false,
            headers: HeaderParser::new(),
            body: None,
            error: None,
            overflow: false,
        }
    }
}

/// A non-blocking HTTP/1.1 client over a secured [`Transport`].
///
/// The client owns its transport, clock and body sink. Configuration
/// ([`Options`], trust policy, Unix time) persists across requests; everything
/// about an individual exchange is discarded when the next one begins.
pub struct Client<T, C, B = BufferedBody<DEFAULT_BODY_CAPACITY>>
where
    T: Transport,
    C: Clock,
    B: BodySink,
{
    transport: T,
    clock: C,
    sink: B,
    options: Options,
    trust: Option<Trust>,
    unix_time: Option<u64>,
    exchange: Exchange,
}

impl<T, C, B> core::fmt::Debug for Client<T, C, B>
where
    T: Transport,
    C: Clock,
    B: BodySink,
{
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Client")
            .field("state", &self.exchange.state)
            .field("status", &self.exchange.headers.status())
            .field("error", &self.exchange.error)
            .field("options", &self.options)
            .field("trust", &self.trust)
            .finish()
    }
}

impl<T, C> Client<T, C>
where
    T: Transport,
    C: Clock,
{
    /// Creates a client that buffers response bodies in memory.
    pub fn new(transport: T, clock: C) -> Self {
        Self::with_sink(transport, clock, BufferedBody::new())
    }
}

impl<T, C, const N: usize> Client<T, C, BufferedBody<N>>
where
    T: Transport,
    C: Clock,
{
    /// The buffered body; possibly partial after an error.
    pub fn body(&self) -> &[u8] {
        self.sink.as_bytes()
    }

    /// The buffered body as text, if it is valid UTF-8.
    pub fn body_str(&self) -> Option<&str> {
        self.sink.as_str()
    }
}

impl<T, C, B> Client<T, C, B>
where
    T: Transport,
    C: Clock,
    B: BodySink,
{
    /// Creates a client that hands response bodies to `sink`.
    pub fn with_sink(transport: T, clock: C, sink: B) -> Self {
        let options = Options::default();
        Self {
            transport,
            clock,
            sink,
            options,
            trust: None,
            unix_time: None,
            exchange: Exchange::new(options),
        }
    }

    // ---------- Configuration ----------

    /// Replaces the options used by subsequent requests.
    pub fn set_options(&mut self, options: Options) {
        self.options = options;
    }

    /// Options used by subsequent requests.
    pub fn options(&self) -> &Options {
        &self.options
    }

    /// Sets the peer authentication policy.
    pub fn set_trust(&mut self, trust: Trust) {
        self.trust = Some(trust);
    }

    /// Verifies servers against `ca_pem`. Also requires [`set_unix_time`].
    ///
    /// [`set_unix_time`]: Client::set_unix_time
    pub fn set_ca_cert(&mut self, ca_pem: &'static str) {
        self.set_trust(Trust::CaCertificate(ca_pem));
    }

    /// Disables server certificate verification.
    pub fn set_insecure(&mut self) {
        self.set_trust(Trust::Insecure);
    }

    /// Records the current Unix time for certificate validity checks.
    ///
    /// Times before 2020 are treated as an unsynchronised clock and clear the
    /// stored value.
    pub fn set_unix_time(&mut self, epoch_seconds: u64) {
        self.unix_time = tls::valid_unix_time(epoch_seconds);
    }

    // ---------- Requests ----------

    /// Begins a GET request. `path` includes any query string.
    pub fn begin_get(
        &mut self,
        host: &str,
        port: u16,
        path: &str,
        extra_headers: &str,
    ) -> Result<(), Error> {
        self.begin(&Request::get(host, port, path).with_headers(extra_headers))
    }

    /// Begins a POST request carrying `body` as `content_type`.
    pub fn begin_post(
        &mut self,
        host: &str,
        port: u16,
        path: &str,
        body: &[u8],
        content_type: &str,
        extra_headers: &str,
    ) -> Result<(), Error> {
        self.begin(
            &Request::post(host, port, path, body)
                .with_content_type(content_type)
                .with_headers(extra_headers),
        )
    }

    /// Begins `request`, abandoning any exchange in progress.
    ///
    /// On failure the client is left in [`State::Error`] with the same error.
    pub fn begin(&mut self, request: &Request) -> Result<(), Error> {
        self.reset();

        if let Err(e) = self.prepare(request) {
            self.fail(e);
            return Err(e);
        }

        self.sink.start(&self.exchange.options);
        self.exchange.started_at = self.clock.now_ms();
        self.exchange.state = State::Connect;
        debug!(
            "http: {} {}:{}{}",
            request.method.as_str(),
            request.host,
            request.port,
            request.path
        );
        Ok(())
    }

    fn prepare(&mut self, request: &Request) -> Result<(), Error> {
        self.trust
            .ok_or(tls::Prerequisite::TrustAnchor)
            .and_then(|trust| trust.check(self.unix_time))
            .map_err(Error::PrerequisiteMissing)?;

        let exchange = &mut self.exchange;
        exchange.host = String::try_from(request.host).map_err(|_| Error::RequestTooLarge)?;
        exchange.port = request.port;
        request.write_to(&mut exchange.request)
    }

    /// Advances the exchange as far as currently possible. Call often.
    ///
    /// Does nothing unless a request is in flight.
    pub fn poll(&mut self) {
        if !self.exchange.state.is_active() {
            return;
        }

        let elapsed = self.clock.now_ms().saturating_sub(self.exchange.started_at);
        if elapsed > u64::from(self.exchange.options.timeout_ms) {
            self.fail(Error::Timeout);
            return;
        }

        let result = match self.exchange.state {
            State::Connect => self.step_connect(),
            State::Send => self.step_send(),
            State::ReadHeaders => self.step_read_headers(),
            State::ReadBody => self.step_read_body(),
            State::Idle | State::Done | State::Error => Ok(()),
        };
        if let Err(e) = result {
            self.fail(e);
        }
    }

    fn step_connect(&mut self) -> Result<(), Error> {
        if !self.transport.is_connected() {
            if self.exchange.connecting {
                return Ok(());
            }
            let tls = TlsConfig {
                trust: self.trust.unwrap_or(Trust::Insecure),
                unix_time: self.unix_time,
                handshake_timeout_ms: self.exchange.options.tls_handshake_timeout_ms,
            };
            self.exchange.connecting = true;
            self.transport
                .connect(&self.exchange.host, self.exchange.port, &tls)
                .map_err(|_e| {
                    warn!("http: connect to {} failed", self.exchange.host.as_str());
                    Error::ConnectFailed
                })?;
            if !self.transport.is_connected() {
                return Ok(());
            }
        }

        self.transition(State::Send);
        Ok(())
    }

    fn step_send(&mut self) -> Result<(), Error> {
        if !self.transport.is_connected() {
            return Err(Error::ConnectionClosed);
        }

        let exchange = &mut self.exchange;
        let written = self
            .transport
            .write(&exchange.request[exchange.sent..])
            .map_err(|_| Error::SendFailed)?;
        if written == 0 {
            return Err(Error::SendFailed);
        }
        exchange.sent += written;
        trace!("http: sent {}/{}", exchange.sent, exchange.request.len());

        if exchange.sent == exchange.request.len() {
            self.transport.flush().map_err(|_| Error::SendFailed)?;
            self.transition(State::ReadHeaders);
        }
        Ok(())
    }

    fn step_read_headers(&mut self) -> Result<(), Error> {
        let max_header_bytes = self.exchange.options.max_header_bytes;

        while self.transport.available() > 0 {
            let Some(byte) = self.transport.read_byte().map_err(|_| Error::ReadFailed)? else {
                break;
            };
            if self.exchange.headers.push(byte, max_header_bytes)? {
                let headers = &self.exchange.headers;
                debug!(
                    "http: status {}, length {}, chunked {}",
                    headers.status(),
                    headers.content_length(),
                    headers.is_chunked()
                );
                self.exchange.body = Some(BodyDecoder::for_headers(headers));
                self.transition(State::ReadBody);
                return Ok(());
            }
        }

        if !self.transport.is_connected() && self.transport.available() == 0 {
            return Err(Error::ConnectionClosed);
        }
        Ok(())
    }

    fn step_read_body(&mut self) -> Result<(), Error> {
        let Some(decoder) = self.exchange.body.as_mut() else {
            return Ok(());
        };

        let mut scratch = [0u8; SCRATCH_LEN];
        let chunk = self.exchange.options.read_chunk(SCRATCH_LEN);
        let progress = decoder.step(&mut self.transport, &mut self.sink, &mut scratch[..chunk]);

        if progress? == Progress::Complete {
            self.transport.close();
            self.transition(State::Done);
        }
        Ok(())
    }

    fn transition(&mut self, next: State) {
        debug!("http: {} -> {}", self.exchange.state, next);
        self.exchange.state = next;
    }

    fn fail(&mut self, error: Error) {
        warn!("http: {} failed: {}", self.exchange.state, error);
        if error == Error::BodyTooLarge {
            self.exchange.overflow = true;
        }
        self.exchange.error = Some(error);
        self.exchange.state = State::Error;
        self.transport.close();
    }

    // ---------- Status / results ----------

    /// Current state.
    pub fn state(&self) -> State {
        self.exchange.state
    }

    /// Whether the response was received in full.
    pub fn is_done(&self) -> bool {
        self.exchange.state == State::Done
    }

    /// Whether the exchange failed.
    pub fn is_error(&self) -> bool {
        self.exchange.state == State::Error
    }

    /// Response status code, once the status line has been parsed.
    pub fn status(&self) -> Option<u16> {
        self.exchange.headers.status()
    }

    /// Declared `Content-Length`, once headers are parsed.
    pub fn content_length(&self) -> Option<usize> {
        self.exchange.headers.content_length()
    }

    /// Whether the response body is chunked.
    pub fn is_chunked(&self) -> bool {
        self.exchange.headers.is_chunked()
    }

    /// Why the exchange failed, if it did.
    pub fn error(&self) -> Option<Error> {
        self.exchange.error
    }

    /// Human-readable failure description; empty when there is none.
    pub fn error_message(&self) -> &'static str {
        self.exchange.error.map_or("", |e| e.description())
    }

    /// Whether the body was truncated because it exceeded its size cap.
    pub fn body_overflowed(&self) -> bool {
        self.exchange.overflow
    }

    /// The body sink.
    pub fn sink(&self) -> &B {
        &self.sink
    }

    /// The body sink, mutably.
    pub fn sink_mut(&mut self) -> &mut B {
        &mut self.sink
    }

    /// The transport.
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// The transport, mutably.
    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    // ---------- Stop / reset ----------

    /// Closes the transport and returns to [`State::Idle`].
    ///
    /// The status, error and partial body stay readable until the next
    /// request or [`reset`](Client::reset).
    pub fn stop(&mut self) {
        self.transport.close();
        self.exchange.state = State::Idle;
    }

    /// Stops and discards everything about the last exchange.
    pub fn reset(&mut self) {
        self.stop();
        self.exchange = Exchange::new(self.options);
        self.sink.reset();
    }

    /// Splits the client into its transport, clock and sink.
    pub fn into_parts(mut self) -> (T, C, B) {
        self.transport.close();
        (self.transport, self.clock, self.sink)
    }
}
