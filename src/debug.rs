/*
 * Debug Information Module
 *
 * Statistics published together with each tick so the overlay and the
 * headless runner can report on the simulation without touching its state.
 */

use std::time::Duration;

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TickStats {
    /// Ticks completed and published so far.
    pub ticks: u64,
    /// Wall time of the last tick, snapshot to publish.
    pub last_tick: Duration,
    /// Entries in the last tick's neighbor index, ghosts included.
    pub index_entries: usize,
    pub ghost_entries: usize,
}

impl TickStats {
    pub fn last_tick_ms(&self) -> f64 {
        self.last_tick.as_secs_f64() * 1000.0
    }
}
