/*
 * Tick Driver Module
 *
 * Runs whole ticks back to back on a dedicated thread at a fixed interval.
 * Ticks never overlap, and a stop request is only honored between ticks so a
 * half-finished tick is never published. Missed deadlines are dropped rather
 * than replayed in a burst.
 */

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use tracing::{error, info, warn};

use crate::error::SimulationError;
use crate::simulation::Simulation;

pub struct TickDriver {
    stop: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl TickDriver {
    /// Spawn the tick thread using the simulation's configured interval.
    pub fn start(simulation: Arc<Simulation>) -> Result<Self, SimulationError> {
        let interval = simulation.params().tick_interval();
        Self::start_with_interval(simulation, interval)
    }

    pub fn start_with_interval(
        simulation: Arc<Simulation>,
        interval: Duration,
    ) -> Result<Self, SimulationError> {
        let stop = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&stop);
        let handle = thread::Builder::new()
            .name("quadflock-tick".into())
            .spawn(move || run_loop(&simulation, interval, &flag))
            .map_err(SimulationError::Spawn)?;

        info!(interval_ms = interval.as_millis() as u64, "tick driver started");
        Ok(Self {
            stop,
            handle: Some(handle),
        })
    }

    pub fn is_running(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }

    /// Ask the thread to exit after the current tick and wait for it.
    pub fn stop(mut self) {
        self.shutdown();
    }

    fn shutdown(&mut self) {
        let Some(handle) = self.handle.take() else {
            return;
        };
        self.stop.store(true, Ordering::Release);
        handle.thread().unpark();
        if handle.join().is_err() {
            warn!("tick driver thread panicked");
        } else {
            info!("tick driver stopped");
        }
    }
}

impl Drop for TickDriver {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn run_loop(simulation: &Simulation, interval: Duration, stop: &AtomicBool) {
    let mut next = Instant::now() + interval;

    while !stop.load(Ordering::Acquire) {
        let now = Instant::now();
        if now < next {
            // Woken early by stop() or spuriously; re-check either way
            thread::park_timeout(next - now);
            continue;
        }

        if let Err(err) = simulation.tick() {
            error!(%err, "tick failed, stopping driver");
            break;
        }

        next += interval;
        let now = Instant::now();
        if next < now {
            next = now + interval;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::SimulationParams;

    fn simulation() -> Arc<Simulation> {
        let params = SimulationParams {
            width: 120.0,
            height: 90.0,
            boids_count: 60,
            view_radius: 8.0,
            tick_interval_ms: 1,
            seed: Some(3),
            ..SimulationParams::default()
        };
        Arc::new(Simulation::new(params).expect("sim"))
    }

    #[test]
    fn driver_ticks_until_stopped() {
        let sim = simulation();
        let driver = TickDriver::start(Arc::clone(&sim)).expect("start");
        assert!(driver.is_running());

        let deadline = Instant::now() + Duration::from_secs(10);
        while sim.stats().ticks < 3 && Instant::now() < deadline {
            thread::sleep(Duration::from_millis(2));
        }
        driver.stop();

        let ticks = sim.stats().ticks;
        assert!(ticks >= 3, "only {ticks} ticks ran");
        thread::sleep(Duration::from_millis(20));
        assert_eq!(sim.stats().ticks, ticks, "ticks kept running after stop");
    }

    #[test]
    fn stop_interrupts_a_long_wait() {
        let sim = simulation();
        let driver = TickDriver::start_with_interval(Arc::clone(&sim), Duration::from_secs(3600))
            .expect("start");
        let started = Instant::now();
        drop(driver);
        assert!(started.elapsed() < Duration::from_secs(5));
        assert_eq!(sim.stats().ticks, 0);
    }
}
