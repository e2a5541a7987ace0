//! Benchmarks for the request instrumentation path.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use hello_metrics::config::Config;
use hello_metrics::metrics::MetricsCollector;
use hello_metrics::server::handle_request;
use hello_metrics::AppState;
use hyper::{Method, Request};
use std::time::Duration;

fn benchmark_record_request(c: &mut Criterion) {
    let collector = MetricsCollector::new();

    c.bench_function("record_request_existing_labels", |b| {
        b.iter(|| {
            collector.record_request(
                black_box("GET"),
                black_box("/api/hello"),
                black_box(200),
                Duration::from_millis(3),
            );
        })
    });

    c.bench_function("record_request_error", |b| {
        b.iter(|| {
            collector.record_request(
                black_box("GET"),
                black_box("unmatched"),
                black_box(404),
                Duration::from_millis(1),
            );
        })
    });
}

fn benchmark_encode(c: &mut Criterion) {
    let collector = MetricsCollector::with_process_metrics();
    for status in [200, 404, 500] {
        for method in ["GET", "POST", "HEAD"] {
            collector.record_request(method, "/api/hello", status, Duration::from_millis(5));
        }
    }

    c.bench_function("encode_registry", |b| {
        b.iter(|| black_box(collector.encode().unwrap()))
    });
}

fn benchmark_handle_request(c: &mut Criterion) {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .build()
        .unwrap();
    let state = AppState::new(&Config::default(), MetricsCollector::new()).unwrap();

    c.bench_function("handle_hello", |b| {
        b.iter(|| {
            let req = Request::builder()
                .method(Method::GET)
                .uri("/api/hello")
                .body(())
                .unwrap();
            black_box(runtime.block_on(handle_request(req, &state)).unwrap());
        })
    });

    c.bench_function("handle_not_found", |b| {
        b.iter(|| {
            let req = Request::builder()
                .method(Method::GET)
                .uri("/does/not/exist")
                .body(())
                .unwrap();
            black_box(runtime.block_on(handle_request(req, &state)).unwrap());
        })
    });
}

criterion_group!(
    benches,
    benchmark_record_request,
    benchmark_encode,
    benchmark_handle_request
);
criterion_main!(benches);
