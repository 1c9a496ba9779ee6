use palisade_core::Tick;
use palisade_server::{
    CreateMatchError, EventCursor, GameServer, JoinError, MatchStatus, ServerConfig, SessionToken,
};
use palisade_td::{GameConfig, GameEvent, Intent, TowerDefense};
use std::time::Duration;
use tokio::time::sleep;

fn server_config() -> ServerConfig {
    ServerConfig {
        default_tick_hz: 200, // fast ticks keep the sleeps short
        max_matches: 10,
        max_players_per_match: 8,
        event_buffer_capacity: 4096,
    }
}

fn lane_map() -> Vec<String> {
    vec!["S++++++G".into(), "........".into()]
}

fn game_config() -> GameConfig {
    GameConfig {
        map_rows: lane_map(),
        // Keep the board quiet while tests poke at the economy.
        spawn_interval_ticks: 100_000,
        ..GameConfig::default()
    }
}

async fn submit_now(
    server: &GameServer<TowerDefense>,
    match_id: u64,
    session: SessionToken,
    intent: Intent,
) -> Tick {
    let tick = server.current_tick(match_id).await.unwrap();
    let (_, scheduled) = server
        .submit_intent(match_id, session, intent, tick + 1)
        .await
        .unwrap();
    scheduled
}

#[tokio::test]
async fn create_and_list_matches() {
    let server: GameServer<TowerDefense> = GameServer::new(server_config());

    let match_id = server.create_match(game_config(), 42).await.unwrap();

    let matches = server.list_matches().await;
    assert_eq!(matches.len(), 1);
    assert_eq!(matches[0].match_id, match_id);

    server.shutdown().await;
}

#[tokio::test]
async fn goalless_map_is_rejected_at_creation() {
    let server: GameServer<TowerDefense> = GameServer::new(server_config());

    let config = GameConfig {
        map_rows: vec!["S+++".into()],
        ..GameConfig::default()
    };
    let err = server.create_match(config, 42).await.unwrap_err();
    assert!(matches!(err, CreateMatchError::InvalidConfig(_)));
    assert!(server.list_matches().await.is_empty());

    server.shutdown().await;
}

#[tokio::test]
async fn join_policy_shows_up_in_observations() {
    let server: GameServer<TowerDefense> = GameServer::new(server_config());
    let match_id = server.create_match(game_config(), 42).await.unwrap();

    let (ada, _) = server.join_match(match_id, "ada").await.unwrap();
    let (brin, _) = server.join_match(match_id, "brin").await.unwrap();

    sleep(Duration::from_millis(30)).await;

    let snap = server.observe(match_id, brin).await.unwrap();
    assert_eq!(snap.players.len(), 2);
    let gold_of = |name: &str| {
        snap.players
            .iter()
            .find(|p| p.display_name == name)
            .unwrap()
            .gold
    };
    assert_eq!(gold_of("ada"), 200);
    assert_eq!(gold_of("brin"), 100);

    // Both seats see the same authoritative state.
    let snap_ada = server.observe(match_id, ada).await.unwrap();
    assert_eq!(snap_ada.players.len(), 2);

    server.shutdown().await;
}

#[tokio::test]
async fn placing_a_tower_flows_through_events_and_observations() {
    let server: GameServer<TowerDefense> = GameServer::new(server_config());
    let match_id = server.create_match(game_config(), 42).await.unwrap();
    let (session, player) = server.join_match(match_id, "ada").await.unwrap();

    submit_now(&server, match_id, session, Intent::PlaceTower { x: 2, y: 1 }).await;
    sleep(Duration::from_millis(50)).await;

    let (events, cursor) = server
        .poll_events(match_id, session, EventCursor(0))
        .await
        .unwrap();
    assert!(cursor.0 > 0);
    assert!(events
        .iter()
        .any(|e| matches!(e.event, GameEvent::TowerPlaced { player: p, x: 2, y: 1, .. } if p == player)));
    assert!(events
        .iter()
        .any(|e| matches!(e.event, GameEvent::GoldChanged { gold: 195, .. })));

    let snap = server.observe(match_id, session).await.unwrap();
    assert_eq!(snap.towers.len(), 1);
    assert_eq!(snap.towers[0].owner, player);
    assert_eq!(snap.players[0].gold, 195);

    server.shutdown().await;
}

#[tokio::test]
async fn leaving_liquidates_towers_and_pays_the_table() {
    let server: GameServer<TowerDefense> = GameServer::new(server_config());
    let match_id = server.create_match(game_config(), 42).await.unwrap();

    let (ada, _) = server.join_match(match_id, "ada").await.unwrap();
    let (brin, _) = server.join_match(match_id, "brin").await.unwrap();
    let (_cato, _) = server.join_match(match_id, "cato").await.unwrap();

    // Build a level 3 tower: 5 + 10 + 15 invested, half comes back.
    submit_now(&server, match_id, ada, Intent::PlaceTower { x: 2, y: 1 }).await;
    sleep(Duration::from_millis(40)).await;
    submit_now(&server, match_id, ada, Intent::UpgradeTower { x: 2, y: 1 }).await;
    sleep(Duration::from_millis(40)).await;
    submit_now(&server, match_id, ada, Intent::UpgradeTower { x: 2, y: 1 }).await;
    sleep(Duration::from_millis(40)).await;

    server.leave_match(match_id, ada).await.unwrap();
    sleep(Duration::from_millis(40)).await;

    let snap = server.observe(match_id, brin).await.unwrap();
    assert_eq!(snap.players.len(), 2);
    // floor(15 / 2) = 7 to each of the two remaining players.
    for p in &snap.players {
        assert_eq!(p.gold, 107, "{}", p.display_name);
    }
    assert!(snap.towers.is_empty());

    // The departed session is dead.
    assert!(server.observe(match_id, ada).await.is_err());

    server.shutdown().await;
}

#[tokio::test]
async fn lobby_waits_for_required_players() {
    let server: GameServer<TowerDefense> = GameServer::new(server_config());
    let match_id = server
        .create_match_with_players(game_config(), 42, 2)
        .await
        .unwrap();

    let (_ada, _) = server.join_match(match_id, "ada").await.unwrap();
    sleep(Duration::from_millis(30)).await;

    let info = &server.list_matches().await[0];
    assert!(matches!(
        info.status,
        MatchStatus::WaitingForPlayers { current: 1, required: 2 }
    ));
    // The clock holds while the lobby waits.
    assert_eq!(info.current_tick, 0);

    let (_brin, _) = server.join_match(match_id, "brin").await.unwrap();
    sleep(Duration::from_millis(50)).await;

    let info = &server.list_matches().await[0];
    assert!(matches!(info.status, MatchStatus::Running));
    assert!(info.current_tick > 0);

    server.shutdown().await;
}

#[tokio::test]
async fn a_full_match_refuses_further_seats() {
    let config = ServerConfig {
        max_players_per_match: 2,
        ..server_config()
    };
    let server: GameServer<TowerDefense> = GameServer::new(config);
    let match_id = server.create_match(game_config(), 42).await.unwrap();

    server.join_match(match_id, "ada").await.unwrap();
    server.join_match(match_id, "brin").await.unwrap();
    let err = server.join_match(match_id, "cato").await.unwrap_err();
    assert_eq!(err, JoinError::MatchFull);

    server.shutdown().await;
}

#[tokio::test]
async fn spectators_observe_but_never_act() {
    let server: GameServer<TowerDefense> = GameServer::new(server_config());
    let match_id = server.create_match(game_config(), 42).await.unwrap();
    server.join_match(match_id, "ada").await.unwrap();

    let viewer = server.spectate_match(match_id).await.unwrap();
    sleep(Duration::from_millis(30)).await;

    let snap = server.observe(match_id, viewer).await.unwrap();
    assert_eq!(snap.players.len(), 1);

    let err = server
        .submit_intent(match_id, viewer, Intent::PlaceTower { x: 2, y: 1 }, 1)
        .await
        .unwrap_err();
    assert_eq!(err, palisade_server::SubmitError::InvalidSession);

    server.shutdown().await;
}

#[tokio::test]
async fn terminate_removes_the_match() {
    let server: GameServer<TowerDefense> = GameServer::new(server_config());
    let match_id = server.create_match(game_config(), 42).await.unwrap();
    let (session, _) = server.join_match(match_id, "ada").await.unwrap();

    server.terminate_match(match_id).await.unwrap();

    assert!(server.list_matches().await.is_empty());
    assert!(server.observe(match_id, session).await.is_err());

    server.shutdown().await;
}

#[tokio::test]
async fn monsters_march_once_the_clock_runs() {
    let config = GameConfig {
        map_rows: lane_map(),
        spawn_interval_ticks: 10,
        ..GameConfig::default()
    };
    let server: GameServer<TowerDefense> = GameServer::new(server_config());
    let match_id = server.create_match(config, 42).await.unwrap();
    let (session, _) = server.join_match(match_id, "ada").await.unwrap();

    sleep(Duration::from_millis(200)).await;

    let snap = server.observe(match_id, session).await.unwrap();
    assert!(!snap.monsters.is_empty());

    let (events, _) = server
        .poll_events(match_id, session, EventCursor(0))
        .await
        .unwrap();
    assert!(events
        .iter()
        .any(|e| matches!(e.event, GameEvent::MonsterSpawned { .. })));

    server.shutdown().await;
}
