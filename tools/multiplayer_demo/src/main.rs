//! Two scripted players sharing one server-hosted match: join, build and
//! upgrade towers over the live event stream, then tear the server down.
//! Run it to watch the session layer and the simulation talk to each other.

use palisade_core::MatchId;
use palisade_server::{EventCursor, GameServer, MatchStatus, ServerConfig};
use palisade_td::{GameConfig, GameEvent, Intent, TowerDefense};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;

#[tokio::main]
async fn main() {
    println!("=== Palisade multiplayer demo ===\n");

    let server_config = ServerConfig {
        default_tick_hz: 120, // compress a few minutes of game into the demo
        ..ServerConfig::default()
    };
    let server = Arc::new(GameServer::<TowerDefense>::new(server_config));

    // Lives-out ends the demo instead of resetting the board.
    let game_config = GameConfig {
        restart_delay_ticks: None,
        ..GameConfig::default()
    };

    println!("Creating a match for 2 players...");
    let match_id = server
        .create_match_with_players(game_config, 42, 2)
        .await
        .expect("failed to create match");
    println!("Match {} created\n", match_id);

    let ada = tokio::spawn(run_player(
        Arc::clone(&server),
        match_id,
        "ada",
        vec![(6, 2), (6, 3), (6, 4), (8, 2), (6, 6)],
    ));
    let brin = tokio::spawn(run_player(
        Arc::clone(&server),
        match_id,
        "brin",
        vec![(8, 4), (8, 6), (8, 7), (10, 4), (6, 8)],
    ));

    // Let the match play out, then pull the plug on whatever is left.
    sleep(Duration::from_secs(20)).await;

    println!("\n=== Final match status ===");
    if let Some(info) = server
        .list_matches()
        .await
        .iter()
        .find(|m| m.match_id == match_id)
    {
        println!("Status: {:?}", info.status);
        println!("Final tick: {}", info.current_tick);
        println!("Players: {}", info.player_count);
    }

    let _ = server.terminate_match(match_id).await;
    let _ = tokio::join!(ada, brin);

    server.shutdown().await;
    println!("\nServer shutdown complete.");
}

async fn run_player(
    server: Arc<GameServer<TowerDefense>>,
    match_id: MatchId,
    name: &'static str,
    builds: Vec<(u16, u16)>,
) {
    let (session, player_id) = server
        .join_match(match_id, name)
        .await
        .expect("failed to join match");
    println!(
        "[{}] seated as player {} (session {})",
        name, player_id, session.0
    );

    // The clock holds until both seats fill.
    loop {
        match server
            .list_matches()
            .await
            .iter()
            .find(|m| m.match_id == match_id)
        {
            Some(info) if matches!(info.status, MatchStatus::Running) => break,
            Some(_) => sleep(Duration::from_millis(20)).await,
            None => return,
        }
    }
    println!("[{}] match started", name);

    let mut cursor = EventCursor(0);
    let mut built = 0;
    let mut upgraded = false;

    loop {
        match server
            .list_matches()
            .await
            .into_iter()
            .find(|m| m.match_id == match_id)
        {
            Some(info)
                if matches!(
                    info.status,
                    MatchStatus::Finished(_) | MatchStatus::Terminated
                ) =>
            {
                println!("[{}] match ended: {:?}", name, info.status);
                break;
            }
            Some(_) => {}
            None => {
                println!("[{}] match is gone", name);
                break;
            }
        }

        if let Ok((events, next)) = server.poll_events(match_id, session, cursor).await {
            for event in &events {
                print_event(name, event.tick, &event.event);
            }
            cursor = next;
        }

        let Ok(snap) = server.observe(match_id, session).await else {
            break;
        };
        let gold = snap
            .players
            .iter()
            .find(|p| p.id == player_id)
            .map(|p| p.gold)
            .unwrap_or(0);

        if built < builds.len() && gold >= 5 {
            let (x, y) = builds[built];
            if let Ok((_, scheduled)) = server
                .submit_intent(match_id, session, Intent::PlaceTower { x, y }, snap.tick + 1)
                .await
            {
                println!("[{}] building at ({}, {}) for tick {}", name, x, y, scheduled);
                built += 1;
            }
        } else if built == builds.len() && !upgraded && gold >= 10 {
            // Kill gold has trickled in; beef up the front tower.
            let (x, y) = builds[0];
            if server
                .submit_intent(
                    match_id,
                    session,
                    Intent::UpgradeTower { x, y },
                    snap.tick + 1,
                )
                .await
                .is_ok()
            {
                println!("[{}] upgrading the tower at ({}, {})", name, x, y);
                upgraded = true;
            }
        }

        sleep(Duration::from_millis(100)).await;
    }

    println!("[{}] done", name);
}

fn print_event(player: &str, tick: u64, event: &GameEvent) {
    match event {
        GameEvent::PlayerJoined {
            display_name, gold, ..
        } => {
            println!(
                "[{}] [{:>5}] {} joined with {} gold",
                player, tick, display_name, gold
            );
        }
        GameEvent::TowerPlaced { player: p, x, y, .. } => {
            println!(
                "[{}] [{:>5}] player {} built a tower at ({}, {})",
                player, tick, p, x, y
            );
        }
        GameEvent::TowerUpgraded { player: p, level, .. } => {
            println!(
                "[{}] [{:>5}] player {} upgraded a tower to level {}",
                player, tick, p, level
            );
        }
        GameEvent::MonsterDied { killer, .. } => {
            println!("[{}] [{:>5}] monster down (killer: {:?})", player, tick, killer);
        }
        GameEvent::MonsterLeaked { .. } => {
            println!("[{}] [{:>5}] A MONSTER LEAKED", player, tick);
        }
        GameEvent::LivesChanged { lives } => {
            println!("[{}] [{:>5}] {} lives remain", player, tick, lives);
        }
        GameEvent::GameOver => {
            println!("[{}] [{:>5}] === GAME OVER ===", player, tick);
        }
        GameEvent::IntentRejected { player: p, reason, .. } => {
            println!(
                "[{}] [{:>5}] player {}'s request bounced: {:?}",
                player, tick, p, reason
            );
        }
        // Spawns, shots and gold ticks are too chatty at 120 Hz.
        _ => {}
    }
}
