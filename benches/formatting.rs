use chrono::{TimeZone, Utc};
use criterion::{Criterion, criterion_group, criterion_main};
use std::hint::black_box;
use std::io;
use std::time::Duration;
use tinct::{Attr, ConsoleHandler, Level, Options, Record, Value};

fn record() -> Record {
    let time = Utc
        .with_ymd_and_hms(2009, 11, 10, 23, 0, 0)
        .unwrap()
        .fixed_offset();
    Record::new(Some(time), Level::INFO, "request handled")
        .with_attr(Attr::new("method", "GET"))
        .with_attr(Attr::new("status", 200i64))
        .with_attr(Attr::new("took", Duration::from_millis(497)))
}

fn bench_handle(c: &mut Criterion) {
    let mut group = c.benchmark_group("ConsoleHandler::handle");

    let colored = ConsoleHandler::new(io::sink(), Options::new());
    group.bench_function("colored", |b| {
        let record = record();
        b.iter(|| colored.handle(black_box(&record)));
    });

    let plain = ConsoleHandler::new(io::sink(), Options::new().no_color(true));
    group.bench_function("no_color", |b| {
        let record = record();
        b.iter(|| plain.handle(black_box(&record)));
    });

    group.bench_function("quoted_values", |b| {
        let record = record()
            .with_attr(Attr::new("path", "/var/log/app current.log"))
            .with_attr(Attr::new("note", "needs \"escaping\""));
        b.iter(|| colored.handle(black_box(&record)));
    });

    group.bench_function("nested_groups", |b| {
        let record = record().with_attr(Attr::group(
            "http",
            vec![
                Attr::new("host", "example.com"),
                Attr::group("tls", vec![Attr::new("version", "1.3")]),
            ],
        ));
        b.iter(|| colored.handle(black_box(&record)));
    });

    let rewriting = ConsoleHandler::new(
        io::sink(),
        Options::new().replace_attr(|_, attr| {
            if attr.key == "status" {
                None
            } else {
                Some(attr)
            }
        }),
    );
    group.bench_function("replace_attr", |b| {
        let record = record();
        b.iter(|| rewriting.handle(black_box(&record)));
    });

    group.finish();
}

fn bench_bound_attrs(c: &mut Criterion) {
    let handler = ConsoleHandler::new(io::sink(), Options::new())
        .with_attrs(vec![
            Attr::new("service", "api"),
            Attr::new("instance", 3i64),
        ])
        .with_group("request");
    let record = record();

    c.bench_function("ConsoleHandler::handle/bound_attrs", |b| {
        b.iter(|| handler.handle(black_box(&record)));
    });
}

fn bench_with_attrs(c: &mut Criterion) {
    let handler = ConsoleHandler::new(io::sink(), Options::new());

    c.bench_function("ConsoleHandler::with_attrs", |b| {
        b.iter(|| {
            handler.with_attrs(black_box(vec![
                Attr::new("service", "api"),
                Attr::new("region", "eu-west-1"),
            ]))
        });
    });
}

fn bench_value_resolve(c: &mut Criterion) {
    let value = Value::lazy(|| Value::from("resolved"));

    c.bench_function("Value::resolve/lazy", |b| {
        b.iter(|| black_box(&value).resolve());
    });
}

criterion_group!(
    benches,
    bench_handle,
    bench_bound_attrs,
    bench_with_attrs,
    bench_value_resolve,
);
criterion_main!(benches);
