use criterion::{BatchSize, Criterion, Throughput};
use libhttps::network::application::http::{Client, Crc32Body, HeaderParser, Options};
use libhttps::network::error::Error;
use libhttps::network::tls::TlsConfig;
use libhttps::network::{Clock, Read, Transport, Write};
use std::hint::black_box;

const BODY_LEN: usize = 8 * 1024;

/// Replays a canned response and then hangs up.
struct ReplayTransport {
    response: Vec<u8>,
    pos: usize,
    connected: bool,
}

impl ReplayTransport {
    fn new(response: Vec<u8>) -> Self {
        Self {
            response,
            pos: 0,
            connected: false,
        }
    }
}

impl Read for ReplayTransport {
    type Error = Error;
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
        let len = buf.len().min(self.response.len() - self.pos);
        buf[..len].copy_from_slice(&self.response[self.pos..self.pos + len]);
        self.pos += len;
        Ok(len)
    }
}

impl Write for ReplayTransport {
    type Error = Error;
    fn write(&mut self, buf: &[u8]) -> Result<usize, Self::Error> {
        Ok(buf.len())
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }
}

impl Transport for ReplayTransport {
    type ConnectError = Error;

    fn connect(&mut self, _host: &str, _port: u16, _tls: &TlsConfig) -> Result<(), Error> {
        self.connected = true;
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.connected && self.pos < self.response.len()
    }

    fn available(&self) -> usize {
        self.response.len() - self.pos
    }

    fn close(&mut self) {
        self.connected = false;
    }
}

struct FrozenClock;

impl Clock for FrozenClock {
    fn now_ms(&self) -> u64 {
        0
    }
}

fn content_length_response() -> Vec<u8> {
    let mut response = format!(
        "HTTP/1.1 200 OK\r\nContent-Type: application/octet-stream\r\nContent-Length: {BODY_LEN}\r\n\r\n"
    )
    .into_bytes();
    response.extend((0..BODY_LEN).map(|i| i as u8));
    response
}

fn chunked_response() -> Vec<u8> {
    let mut response = b"HTTP/1.1 200 OK\r\nTransfer-Encoding: chunked\r\n\r\n".to_vec();
    let body: Vec<u8> = (0..BODY_LEN).map(|i| i as u8).collect();
    for chunk in body.chunks(500) {
        response.extend_from_slice(format!("{:x}\r\n", chunk.len()).as_bytes());
        response.extend_from_slice(chunk);
        response.extend_from_slice(b"\r\n");
    }
    response.extend_from_slice(b"0\r\n\r\n");
    response
}

fn run_to_completion(response: &[u8]) -> u32 {
    let mut client = Client::with_sink(
        ReplayTransport::new(response.to_vec()),
        FrozenClock,
        Crc32Body::new(),
    );
    client.set_insecure();
    client.set_options(Options {
        max_body_bytes: BODY_LEN,
        ..Options::default()
    });
    client
        .begin_get("bench.local", 443, "/blob", "")
        .expect("Failed to begin request");
    while !client.is_done() && !client.is_error() {
        client.poll();
    }
    assert!(client.is_done());
    client.sink().checksum()
}

pub fn bench_content_length(c: &mut Criterion) {
    let response = content_length_response();
    let mut group = c.benchmark_group("content_length");
    group.throughput(Throughput::Bytes(BODY_LEN as u64));
    group.bench_function("poll_to_done", |b| {
        b.iter(|| black_box(run_to_completion(&response)));
    });
    group.finish();
}

pub fn bench_chunked(c: &mut Criterion) {
    let response = chunked_response();
    let mut group = c.benchmark_group("chunked");
    group.throughput(Throughput::Bytes(BODY_LEN as u64));
    group.bench_function("poll_to_done", |b| {
        b.iter(|| black_box(run_to_completion(&response)));
    });
    group.finish();
}

pub fn bench_begin_get(c: &mut Criterion) {
    c.bench_function("begin_get", |b| {
        b.iter_batched_ref(
            || {
                let mut client = Client::new(ReplayTransport::new(Vec::new()), FrozenClock);
                client.set_insecure();
                client
            },
            |client| {
                client
                    .begin_get(
                        black_box("api.example.com"),
                        443,
                        black_box("/v1/devices/42/telemetry?limit=10"),
                        "Authorization: Bearer abcdef0123456789\r\n",
                    )
                    .expect("Failed to begin request");
            },
            BatchSize::SmallInput,
        );
    });
}

pub fn bench_header_parse(c: &mut Criterion) {
    let head = b"HTTP/1.1 200 OK\r\nServer: nginx\r\nDate: Tue, 01 Oct 2024 10:00:00 GMT\r\n\
        Content-Type: application/json\r\nContent-Length: 1234\r\nConnection: close\r\n\r\n";
    let mut group = c.benchmark_group("headers");
    group.throughput(Throughput::Bytes(head.len() as u64));
    group.bench_function("parse", |b| {
        b.iter(|| {
            let mut parser = HeaderParser::new();
            for &byte in head.iter() {
                if parser.push(byte, 4096).expect("Failed to parse headers") {
                    break;
                }
            }
            black_box(parser.content_length())
        });
    });
    group.finish();
}
