use std::hint::black_box;

use chrono::NaiveDate;
use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use sim4d_rust::algorithms::compute_critical_path;
use sim4d_rust::config::Palette;
use sim4d_rust::models::time::add_days;
use sim4d_rust::models::{Activity, ElementActivityLink, ScheduleData, ScheduleMode, VisualizationStyle};
use sim4d_rust::services::{LinkIndex, ProgressVisibilityEngine};
use sim4d_rust::viewer::FramePlan;

/// Chain of `activities` overlapping activities, each with `per_activity`
/// elements. Every tenth activity also feeds the one five places ahead.
fn generated_schedule(activities: usize, per_activity: usize) -> ScheduleData {
    let origin = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
    let mut acts = Vec::with_capacity(activities);
    let mut links = Vec::with_capacity(activities * per_activity);

    for i in 0..activities {
        let id = i as i64 + 1;
        let start = add_days(origin, i as i64 * 3);
        let end = add_days(start, 7 + (i % 5) as i64);
        let mut predecessors = Vec::new();
        if id > 1 {
            predecessors.push(id - 1);
        }
        if i >= 5 && (i - 5) % 10 == 0 {
            predecessors.push(id - 5);
        }
        acts.push(
            Activity::planned(id, format!("Activity {}", id), start, end)
                .with_progress((i % 11) as f64 * 10.0)
                .with_predecessors(predecessors),
        );
        for j in 0..per_activity {
            links.push(ElementActivityLink::new(format!("el-{}-{}", id, j), id));
        }
    }
    ScheduleData::new(acts, links)
}

fn bench_compute_frame(c: &mut Criterion) {
    let mut group = c.benchmark_group("compute_frame");

    for &(activities, per_activity) in &[(100usize, 10usize), (1000, 20)] {
        let data = generated_schedule(activities, per_activity);
        let index = LinkIndex::build(&data.links);
        let critical = compute_critical_path(&data.activities).unwrap();
        let engine = ProgressVisibilityEngine::new(&data.activities, &index, &critical);
        let date = add_days(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(), activities as i64);

        for style in [VisualizationStyle::ElementCount, VisualizationStyle::Opacity] {
            group.bench_with_input(
                BenchmarkId::new(style.to_string(), activities * per_activity),
                &date,
                |b, &date| {
                    b.iter(|| engine.compute_frame(black_box(date), ScheduleMode::Planned, style, true));
                },
            );
        }
    }

    group.finish();
}

fn bench_critical_path(c: &mut Criterion) {
    let mut group = c.benchmark_group("critical_path");

    for activities in [100usize, 1000, 5000] {
        let data = generated_schedule(activities, 1);
        group.bench_with_input(BenchmarkId::from_parameter(activities), &data, |b, data| {
            b.iter(|| compute_critical_path(black_box(&data.activities)));
        });
    }

    group.finish();
}

fn bench_frame_plan(c: &mut Criterion) {
    let data = generated_schedule(1000, 20);
    let index = LinkIndex::build(&data.links);
    let critical = compute_critical_path(&data.activities).unwrap();
    let engine = ProgressVisibilityEngine::new(&data.activities, &index, &critical);
    let date = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
    let frame = engine.compute_frame(date, ScheduleMode::Planned, VisualizationStyle::ElementCount, true);
    let palette = Palette::default();

    c.bench_function("frame_plan_20k", |b| {
        b.iter(|| FramePlan::from_frame(black_box(&frame), &palette));
    });
    c.bench_function("link_index_build_20k", |b| {
        b.iter(|| LinkIndex::build(black_box(&data.links)));
    });
}

criterion_group!(benches, bench_compute_frame, bench_critical_path, bench_frame_plan);
criterion_main!(benches);
