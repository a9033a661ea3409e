//! Tokio tick loop for the engine.

use std::future::Future;
use tokio::time::{interval, Duration, MissedTickBehavior};
use tracing::debug;

use super::Engine;
use crate::source::InputSource;

/// Fires the engine's pending tick at `rate_hz` until `shutdown` completes.
///
/// Periods in which the engine has no pending tick (polling stopped or the
/// engine destroyed) pass without work. Returns the number of ticks fired.
///
/// # Examples
///
/// ```no_run
/// use gc_input::engine::{driver, Engine, EngineOptions};
/// use gc_input::source::linux::EvdevSource;
/// use std::time::Duration;
///
/// # async fn run() {
/// let source = EvdevSource::new("/dev/input", Duration::from_secs(1));
/// let mut engine = Engine::new(source, EngineOptions::default());
/// let ticks = driver::run_until(&mut engine, 60, tokio::signal::ctrl_c()).await;
/// println!("{} ticks", ticks);
/// # }
/// ```
pub async fn run_until<S, F>(engine: &mut Engine<S>, rate_hz: u32, shutdown: F) -> u64
where
    S: InputSource,
    F: Future,
{
    let period = Duration::from_secs_f64(1.0 / f64::from(rate_hz.max(1)));
    let mut ticker = interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    tokio::pin!(shutdown);

    let mut fired: u64 = 0;
    loop {
        tokio::select! {
            biased;

            _ = &mut shutdown => {
                debug!("Tick loop stopping after {} ticks", fired);
                break;
            }

            _ = ticker.tick() => {
                if let Some(handle) = engine.pending_tick() {
                    if engine.on_tick(handle) {
                        fired += 1;
                    }
                }
            }
        }
    }

    fired
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::EngineOptions;
    use crate::source::mocks::ScriptedSource;
    use tokio::time::sleep;

    fn manual_options() -> EngineOptions {
        EngineOptions {
            auto_start: false,
            ..EngineOptions::default()
        }
    }

    #[test]
    fn test_runs_ticks_until_shutdown() {
        let source = ScriptedSource::new();
        source.connect(0, "0079-1844 Mayflash GameCube");
        let mut engine = Engine::new(source.clone(), EngineOptions::default());

        let fired = tokio_test::block_on(async { run_until(&mut engine, 1000, sleep(Duration::from_millis(50))).await });

        assert!(fired > 0);
        assert_eq!(source.enumerate_calls() as u64, fired);
        assert!(engine.pending_tick().is_some());
    }

    #[test]
    fn test_no_ticks_while_stopped() {
        let source = ScriptedSource::new();
        let mut engine = Engine::new(source.clone(), manual_options());

        let fired = tokio_test::block_on(async { run_until(&mut engine, 1000, sleep(Duration::from_millis(20))).await });

        assert_eq!(fired, 0);
        assert_eq!(source.enumerate_calls(), 0);
    }

    #[test]
    fn test_no_ticks_after_destroy() {
        let source = ScriptedSource::new();
        let mut engine = Engine::new(source.clone(), EngineOptions::default());
        engine.destroy();

        let fired = tokio_test::block_on(async { run_until(&mut engine, 1000, sleep(Duration::from_millis(20))).await });

        assert_eq!(fired, 0);
    }

    #[test]
    fn test_immediate_shutdown() {
        let mut engine = Engine::new(ScriptedSource::new(), EngineOptions::default());
        let fired = tokio_test::block_on(run_until(&mut engine, 60, std::future::ready(())));
        assert_eq!(fired, 0);
    }
}
