//! # Timer probe
//!
//! Watches the tick counter for a fixed budget and prints the number of whole
//! intervals elapsed each time another interval has gone by.

use super::{ Console, ProbeResult };
use crate::services::Clock;

/// Samples `clock` until `budget` ticks have elapsed since the first sample.
///
/// `on_sample` sees every elapsed value below the budget, starting with `0`.
/// There is no timeout: a clock that stops ticking keeps the caller here.
pub fn watch<F>(clock: &dyn Clock, budget: u64, mut on_sample: F)
where
    F: FnMut(u64),
{
    let start = clock.now();
    let mut elapsed = 0;
    while elapsed < budget {
        on_sample(elapsed);
        clock.relax();
        elapsed = clock.now().saturating_sub(start);
    }
}

pub fn run(console: &mut dyn Console, clock: &dyn Clock, budget: u64, interval: u64) -> ProbeResult {
    let mut last_print = 0;
    watch(clock, budget, |elapsed| {
        if elapsed - last_print >= interval {
            console.line(format_args!("{}...", elapsed / interval));
            last_print = elapsed;
        }
    });
    Ok(())
}
