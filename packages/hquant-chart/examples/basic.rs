use hquant_chart::coalesce::EffectCoalescer;
use hquant_chart::{Bar, ChartEngine, SeriesEffect};

// The engine speaks JSON to its host; the same calls exist as typed methods
// (`load_base_series`, `apply_tick`, ...) on `ChartEngine`.

fn main() -> hquant_chart::Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();

    let mut engine = ChartEngine::default();

    engine.dispatch_json(
        r##"{"type":"setIndicatorConfig","indicators":[
            {"id":"sma-20","kind":"sma","color":"#f5a623"},
            {"id":"rsi","kind":"RSI","parameters":{"period":14}},
            {"id":"macd","kind":"macd","parameters":{"fastPeriod":12,"slowPeriod":26,"signalPeriod":9}},
            {"id":"bands","kind":"bollinger","parameters":{"stdDevMultiplier":2.5}}
        ]}"##,
    )?;

    let history: Vec<Bar> = (0..300)
        .map(|i| {
            let close = 100.0 + (i as f64 * 0.1).sin() * 3.0 + i as f64 * 0.02;
            Bar::new(i * 60, close - 0.1, close + 0.5, close - 0.5, close, 1_000.0)
        })
        .collect();
    for effect in engine.load_base_series(history)? {
        describe(&effect);
    }

    // Live ticks: each minute is revised a few times before the next one opens.
    let mut coalescer = EffectCoalescer::new(250);
    let mut now_ms = 0u64;
    for minute in 300..305i64 {
        for step in 0..4 {
            let close = 106.0 + step as f64 * 0.1;
            let effects = engine.apply_tick(Bar::new(minute * 60, 106.0, close + 0.2, 105.8, close, 50.0 * (step + 1) as f64))?;
            coalescer.extend(effects);
            now_ms += 100;
            if let Some(batch) = coalescer.poll(now_ms) {
                println!("t={now_ms}ms -> {} effect(s)", batch.len());
            }
        }
    }
    println!("flushed {} effect(s)", coalescer.flush().len());

    let out = engine.dispatch_json(r#"{"type":"setAggregationInterval","seconds":"15m"}"#)?;
    println!("15m view: {} bars, {} bytes of effects", engine.bars().len(), out.len());

    if let Err(e) = engine.dispatch_json(r#"{"type":"applyTick","point":{"time":30,"open":1,"high":1,"low":1,"close":1}}"#) {
        println!("rejected: {e}");
    }
    Ok(())
}

fn describe(effect: &SeriesEffect) {
    match effect {
        SeriesEffect::SeriesCreated { id, kind, placement, .. } => {
            println!("created {id}: {kind} {placement:?}")
        }
        SeriesEffect::SeriesUpdated { id, .. } => println!("updated {id}"),
        SeriesEffect::SeriesRemoved { id } => println!("removed {id}"),
    }
}
