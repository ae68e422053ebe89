//! Body sinks: where decoded response body fragments go.

use super::options::Options;
use heapless::Vec;

/// Why a sink refused a fragment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SinkError {
    /// Accepting the fragment would exceed the sink's size cap.
    Overflow,
    /// The sink chose to stop the transfer.
    Aborted,
}

/// Receives the response body, one fragment at a time.
///
/// The client calls [`start`](BodySink::start) when a request begins and then
/// [`on_body`](BodySink::on_body) for every decoded fragment, in order. Any
/// error ends the exchange: `Overflow` as `BodyTooLarge`, `Aborted` as
/// `SinkAborted`.
pub trait BodySink {
    /// Prepares for a new response.
    fn start(&mut self, _options: &Options) {}

    /// Consumes the next body fragment.
    fn on_body(&mut self, fragment: &[u8]) -> Result<(), SinkError>;

    /// Drops any state kept from a previous response.
    fn reset(&mut self) {}
}

impl<S: BodySink + ?Sized> BodySink for &mut S {
    fn start(&mut self, options: &Options) {
        (**self).start(options)
    }

    fn on_body(&mut self, fragment: &[u8]) -> Result<(), SinkError> {
        (**self).on_body(fragment)
    }

    fn reset(&mut self) {
        (**self).reset()
    }
}

/// Buffers the body in memory, up to `min(N, Options::max_body_bytes)` bytes.
///
/// A fragment that would cross the cap is rejected whole: the bytes already
/// buffered are kept and the sink reports [`SinkError::Overflow`]. With
/// `Options::keep_body` off, fragments are accepted and dropped.
#[derive(Debug, Clone)]
pub struct BufferedBody<const N: usize> {
    data: Vec<u8, N>,
    limit: usize,
    keep: bool,
}

impl<const N: usize> Default for BufferedBody<N> {
    fn default() -> Self {
        Self {
            data: Vec::new(),
            limit: N,
            keep: true,
        }
    }
}

impl<const N: usize> BufferedBody<N> {
    /// An empty buffer.
    pub fn new() -> Self {
        Self::default()
    }

    /// The bytes received so far.
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// The body as text, if it is valid UTF-8.
    pub fn as_str(&self) -> Option<&str> {
        core::str::from_utf8(&self.data).ok()
    }

    /// Number of buffered bytes.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Whether nothing has been buffered.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// The effective size cap for the current response.
    pub fn limit(&self) -> usize {
        self.limit
    }
}

impl<const N: usize> BodySink for BufferedBody<N> {
    fn start(&mut self, options: &Options) {
        self.data.clear();
        self.limit = options.max_body_bytes.min(N);
        self.keep = options.keep_body;
    }

    fn on_body(&mut self, fragment: &[u8]) -> Result<(), SinkError> {
        if !self.keep {
            return Ok(());
        }
        if self.data.len() + fragment.len() > self.limit {
            return Err(SinkError::Overflow);
        }
        self.data
            .extend_from_slice(fragment)
            .map_err(|_| SinkError::Overflow)
    }

    fn reset(&mut self) {
        self.data.clear();
    }
}

/// Streams the body through a CRC-32 without storing it.
///
/// Suited to downloads too large for RAM, such as firmware images, where only
/// the length and checksum need to be checked once the transfer is done.
#[derive(Clone, Default)]
pub struct Crc32Body {
    hasher: crc32fast::Hasher,
    len: usize,
}

impl core::fmt::Debug for Crc32Body {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Crc32Body")
            .field("len", &self.len)
            .field("checksum", &self.checksum())
            .finish()
    }
}

impl Crc32Body {
    /// A sink that has seen no bytes.
    pub fn new() -> Self {
        Self::default()
    }

    /// CRC-32 (IEEE) of every byte received so far.
    pub fn checksum(&self) -> u32 {
        self.hasher.clone().finalize()
    }

    /// Number of bytes received so far.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether no bytes have been received.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

impl BodySink for Crc32Body {
    fn start(&mut self, _options: &Options) {
        self.reset();
    }

    fn on_body(&mut self, fragment: &[u8]) -> Result<(), SinkError> {
        self.hasher.update(fragment);
        self.len += fragment.len();
        Ok(())
    }

    fn reset(&mut self) {
        self.hasher = crc32fast::Hasher::new();
        self.len = 0;
    }
}

/// Adapts a closure into a [`BodySink`].
pub struct FnSink<F> {
    handler: F,
}

impl<F> FnSink<F>
where
    F: FnMut(&[u8]) -> Result<(), SinkError>,
{
    /// Wraps `handler`, which is called for every body fragment.
    pub fn new(handler: F) -> Self {
        Self { handler }
    }
}

impl<F> core::fmt::Debug for FnSink<F> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str("FnSink")
    }
}

impl<F> BodySink for FnSink<F>
where
    F: FnMut(&[u8]) -> Result<(), SinkError>,
{
    fn on_body(&mut self, fragment: &[u8]) -> Result<(), SinkError> {
        (self.handler)(fragment)
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for SinkError {
    fn format(&self, f: defmt::Formatter) {
        match self {
            SinkError::Overflow => defmt::write!(f, "Overflow"),
            SinkError::Aborted => defmt::write!(f, "Aborted"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options(max_body_bytes: usize, keep_body: bool) -> Options {
        Options {
            max_body_bytes,
            keep_body,
            ..Options::default()
        }
    }

    #[test]
    fn buffer_never_exceeds_cap() {
        let mut sink: BufferedBody<64> = BufferedBody::new();
        sink.start(&options(10, true));
        assert_eq!(sink.limit(), 10);

        assert_eq!(sink.on_body(b"0123"), Ok(()));
        assert_eq!(sink.on_body(b"45678"), Ok(()));
        assert_eq!(sink.on_body(b"9ab"), Err(SinkError::Overflow));
        assert_eq!(sink.as_bytes(), b"012345678");
        assert_eq!(sink.on_body(b"9"), Ok(()));
        assert_eq!(sink.len(), 10);
    }

    #[test]
    fn capacity_bounds_the_configured_cap() {
        let mut sink: BufferedBody<4> = BufferedBody::new();
        sink.start(&options(1024, true));
        assert_eq!(sink.limit(), 4);
        assert_eq!(sink.on_body(b"abcde"), Err(SinkError::Overflow));
        assert!(sink.is_empty());
    }

    #[test]
    fn stream_only_mode_discards() {
        let mut sink: BufferedBody<4> = BufferedBody::new();
        sink.start(&options(4, false));
        assert_eq!(sink.on_body(b"far more than four bytes"), Ok(()));
        assert!(sink.is_empty());
    }

    #[test]
    fn start_clears_previous_body() {
        let mut sink: BufferedBody<16> = BufferedBody::new();
        sink.start(&options(16, true));
        sink.on_body(b"old").unwrap();
        sink.start(&options(16, true));
        assert!(sink.is_empty());
        assert_eq!(sink.as_str(), Some(""));
    }

    #[test]
    fn crc_matches_one_shot_hash() {
        let mut sink = Crc32Body::new();
        sink.start(&Options::default());
        sink.on_body(b"1234").unwrap();
        sink.on_body(b"56789").unwrap();
        assert_eq!(sink.len(), 9);
        // CRC-32/ISO-HDLC check value
        assert_eq!(sink.checksum(), 0xCBF4_3926);
        sink.reset();
        assert!(sink.is_empty());
        assert_eq!(sink.checksum(), 0);
    }

    #[test]
    fn closure_sink_decides() {
        let mut seen = 0usize;
        let mut sink = FnSink::new(|fragment: &[u8]| {
            seen += fragment.len();
            if seen > 3 { Err(SinkError::Aborted) } else { Ok(()) }
        });
        assert_eq!(sink.on_body(b"ab"), Ok(()));
        assert_eq!(sink.on_body(b"cd"), Err(SinkError::Aborted));
    }
}
