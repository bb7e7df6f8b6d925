use std::hint::black_box;

use chrono::NaiveDate;
use criterion::{criterion_group, criterion_main, Criterion};
use recurrence_engine::{next_occurrence, RecurrenceRule};

fn bench_next_occurrence(c: &mut Criterion) {
    let reference = NaiveDate::from_ymd_opt(2024, 6, 5).unwrap();
    let recent = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
    let distant = NaiveDate::from_ymd_opt(1990, 1, 1).unwrap();

    let cases = [
        ("daily", "d 3"),
        ("yearly", "y"),
        ("weekly", "w 1,3,5"),
        ("monthly", "m 15,-1"),
        ("monthly_filtered", "m -2 2,11"),
        ("monthly_leap_day", "m 29 2"),
    ];

    let mut group = c.benchmark_group("next_occurrence");
    for (name, text) in cases {
        let rule = RecurrenceRule::parse(text).unwrap();
        group.bench_function(format!("{name}/recent_anchor"), |b| {
            b.iter(|| next_occurrence(black_box(reference), black_box(recent), &rule))
        });
        group.bench_function(format!("{name}/distant_anchor"), |b| {
            b.iter(|| next_occurrence(black_box(reference), black_box(distant), &rule))
        });
    }
    group.finish();
}

fn bench_parse(c: &mut Criterion) {
    c.bench_function("parse_rule/monthly", |b| {
        b.iter(|| RecurrenceRule::parse(black_box("m 1,15,-1,-2 1,3,6,9,12")))
    });
}

criterion_group!(benches, bench_next_occurrence, bench_parse);
criterion_main!(benches);
