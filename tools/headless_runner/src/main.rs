//! Drives a scripted two-player match against the default map with no
//! renderer or transport attached, then prints what happened. Handy for
//! eyeballing balance changes and for profiling the tick loop.

use clap::Parser;
use palisade_core::IntentEnvelope;
use palisade_host::MatchHost;
use palisade_td::{GameConfig, GameEvent, Intent, TowerDefense};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "headless_runner")]
#[command(about = "Run a scripted tower-defense match without a renderer")]
struct Args {
    /// Ticks to simulate (60 per second of game time)
    #[arg(long, default_value = "3600")]
    ticks: u64,

    /// Match seed; the same seed replays the same match
    #[arg(long, default_value = "12345")]
    seed: u64,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    let mut host = MatchHost::<TowerDefense>::new(GameConfig::default(), args.seed, 60)?;
    let (ada, _) = host.join_player("ada");
    let (brin, _) = host.join_player("brin");

    // Towers hugging the spawn lanes and the shared goal lane.
    let builds = [
        (ada, 6u16, 2u16),
        (ada, 8, 2),
        (brin, 8, 4),
        (brin, 10, 4),
        (ada, 8, 6),
        (brin, 6, 8),
    ];
    for (i, (player, x, y)) in builds.into_iter().enumerate() {
        host.submit(IntentEnvelope {
            player_id: player,
            action_id: i as u64 + 1,
            scheduled_tick: i as u64 * 10 + 1,
            payload: Intent::PlaceTower { x, y },
        });
    }

    // Upgrade the front towers once kill gold has trickled in.
    host.submit(IntentEnvelope {
        player_id: ada,
        action_id: 100,
        scheduled_tick: 600,
        payload: Intent::UpgradeTower { x: 6, y: 2 },
    });
    host.submit(IntentEnvelope {
        player_id: brin,
        action_id: 101,
        scheduled_tick: 900,
        payload: Intent::UpgradeTower { x: 8, y: 4 },
    });

    let result = host.run_for_ticks(args.ticks);

    println!("=== Match summary ===");
    println!("Outcome: {:?}", result.outcome);
    println!("Final tick: {}", result.final_tick);

    let state = host.game().state();
    println!("Lives: {}", state.lives);
    println!("Towers standing: {}", state.world.towers.len());
    println!("Monsters on the field: {}", state.world.monsters.len());
    for (id, player) in state.ledger.players() {
        println!(
            "  {} (player {}): {} gold, {} towers",
            player.display_name,
            id,
            player.gold,
            player.towers.len()
        );
    }

    print_event_summary(&result.events);
    Ok(())
}

fn print_event_summary(events: &[GameEvent]) {
    let mut spawned = 0usize;
    let mut killed = 0usize;
    let mut leaked = 0usize;
    let mut shots = 0usize;
    let mut rejected = 0usize;

    for event in events {
        match event {
            GameEvent::MonsterSpawned { .. } => spawned += 1,
            GameEvent::MonsterDied { .. } => killed += 1,
            GameEvent::MonsterLeaked { .. } => leaked += 1,
            GameEvent::ProjectileSpawned { .. } => shots += 1,
            GameEvent::IntentRejected { .. } => rejected += 1,
            _ => {}
        }
    }

    println!("=== Events ===");
    println!("Monsters spawned: {}", spawned);
    println!("Monsters killed: {}", killed);
    println!("Monsters leaked: {}", leaked);
    println!("Shots fired: {}", shots);
    println!("Intents rejected: {}", rejected);
}
