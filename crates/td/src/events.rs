use crate::intents::{Intent, RejectReason};
use crate::world::{MonsterId, ProjectileId, TowerId};
use palisade_core::PlayerId;

/// Externally observable state changes, emitted once per mutation in the
/// order they happened.
///
/// Continuous entity positions are not streamed as events; renderers and
/// transports read them from [`crate::observe::GameSnapshot`].
#[derive(Clone, Debug)]
pub enum GameEvent {
    PlayerJoined {
        player: PlayerId,
        display_name: String,
        gold: u32,
    },
    PlayerLeft {
        player: PlayerId,
        refund_pool: u32,
    },
    GoldChanged {
        player: PlayerId,
        gold: u32,
    },
    TowerPlaced {
        id: TowerId,
        player: PlayerId,
        x: u16,
        y: u16,
    },
    TowerUpgraded {
        id: TowerId,
        player: PlayerId,
        level: u32,
    },
    TowerSold {
        id: TowerId,
        player: PlayerId,
        x: u16,
        y: u16,
        refund: u32,
    },
    MonsterSpawned {
        id: MonsterId,
        spawn: (u16, u16),
    },
    MonsterDied {
        id: MonsterId,
        killer: Option<PlayerId>,
    },
    MonsterLeaked {
        id: MonsterId,
    },
    ProjectileSpawned {
        id: ProjectileId,
        tower: TowerId,
        target: MonsterId,
    },
    ProjectileDestroyed {
        id: ProjectileId,
    },
    LivesChanged {
        lives: u32,
    },
    GameOver,
    GameRestarted,
    IntentRejected {
        player: PlayerId,
        intent: Intent,
        reason: RejectReason,
    },
}
