//! Shared bar fixtures.
#![allow(dead_code)]

use hquant_chart::Bar;

/// Deterministic random walk of `n` one-minute bars (xorshift, fixed seed).
pub fn random_walk(n: usize, seed: u64) -> Vec<Bar> {
    let mut state = seed.max(1);
    let mut next = move || {
        state ^= state << 13;
        state ^= state >> 7;
        state ^= state << 17;
        (state >> 11) as f64 / (1u64 << 53) as f64
    };
    let mut close = 100.0;
    (0..n)
        .map(|i| {
            let open = close;
            close = (open + (next() - 0.5) * 4.0).max(1.0);
            let high = open.max(close) + next();
            let low = (open.min(close) - next()).max(0.5);
            let volume = (next() * 1_000.0).floor();
            Bar::new(i as i64 * 60, open, high, low, close, volume)
        })
        .collect()
}

/// Closes `start, start + 1, ...` on flat bars, times 0, 1, 2, ...
pub fn linear_ramp(start: f64, n: usize) -> Vec<Bar> {
    (0..n)
        .map(|i| Bar::flat(i as i64, start + i as f64, 1.0))
        .collect()
}
