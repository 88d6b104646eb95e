use criterion::{criterion_group, criterion_main, BatchSize, Criterion, Throughput};
use hquant_chart::aggregator::aggregate;
use hquant_chart::indicator::{IndicatorKind, KindTag};
use hquant_chart::{Bar, ChartEngine, IndicatorConfig, IndicatorConfigSet};
use std::hint::black_box;

fn bars(n: usize) -> Vec<Bar> {
    (0..n)
        .map(|i| {
            let x = i as f64;
            let close = 100.0 + (x * 0.05).sin() * 10.0 + (x * 0.71).cos();
            Bar::new(i as i64 * 60, close - 0.2, close + 0.8, close - 0.9, close, 100.0 + (i % 13) as f64)
        })
        .collect()
}

fn kinds() -> Vec<(&'static str, IndicatorKind)> {
    vec![
        ("sma20", IndicatorKind::defaults(KindTag::Sma)),
        ("ema12", IndicatorKind::defaults(KindTag::Ema)),
        ("vwap", IndicatorKind::Vwap),
        ("rsi14", IndicatorKind::defaults(KindTag::Rsi)),
        ("macd", IndicatorKind::defaults(KindTag::Macd)),
        ("bb20", IndicatorKind::defaults(KindTag::BollingerBands)),
    ]
}

fn full_compute(c: &mut Criterion) {
    let data = bars(10_000);
    let mut group = c.benchmark_group("compute");
    group.throughput(Throughput::Elements(data.len() as u64));
    for (name, kind) in kinds() {
        group.bench_function(name, |b| b.iter(|| black_box(kind.compute(black_box(&data)))));
    }
    group.finish();
}

fn tick(c: &mut Criterion) {
    let data = bars(5_000);
    let (history, live) = data.split_at(data.len() - 1);
    let config: IndicatorConfigSet = kinds()
        .into_iter()
        .map(|(name, kind)| IndicatorConfig::new(name, kind))
        .collect();

    c.bench_function("tick/append_all_kinds", |b| {
        b.iter_batched(
            || {
                let mut e = ChartEngine::default();
                let _ = e.load_base_series(history.to_vec());
                e.set_indicator_config(config.clone());
                e
            },
            |mut e| black_box(e.apply_tick(live[0])),
            BatchSize::LargeInput,
        );
    });
}

fn aggregation(c: &mut Criterion) {
    let data = bars(50_000);
    c.bench_function("aggregate/15m", |b| b.iter(|| black_box(aggregate(black_box(&data), 900))));
}

criterion_group!(benches, full_compute, tick, aggregation);
criterion_main!(benches);
