use crate::match_handle::MatchHandle;
use palisade_core::Game;
use std::time::Duration;
use tokio::time::{interval, MissedTickBehavior};

/// Runs the clock for one match until it finishes or shutdown is requested.
///
/// Missed ticks are skipped rather than bursted; cooldowns and spawn
/// pacing are counted in ticks, so a stall slows the match instead of
/// fast-forwarding it.
pub async fn run_tick_loop<G: Game + Send + 'static>(handle: MatchHandle<G>) {
    let tick_hz = handle.tick_hz();
    let tick_duration = Duration::from_secs_f64(1.0 / tick_hz as f64);

    let mut interval = interval(tick_duration);
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        interval.tick().await;

        if handle.should_shutdown() {
            break;
        }

        let finished = handle.step_one_tick().await;
        if finished {
            break;
        }
    }
}

/// Spawns the tick loop as a tokio task.
pub fn spawn_tick_loop<G: Game + Send + 'static>(
    handle: MatchHandle<G>,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(run_tick_loop(handle))
}
