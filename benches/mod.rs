use criterion::{criterion_group, criterion_main};

mod network;

criterion_group!(
    benches,
    network::application::http::client::bench_content_length,
    network::application::http::client::bench_chunked,
    network::application::http::client::bench_begin_get,
    network::application::http::client::bench_header_parse
);
criterion_main!(benches);
