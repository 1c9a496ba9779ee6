pub mod config;
pub mod economy;
pub mod events;
pub mod game;
pub mod grid;
pub mod intents;
pub mod observe;
pub mod pathing;
mod systems;
pub mod world;

pub use config::{GameConfig, TowerStats, DEFAULT_MAP};
pub use events::GameEvent;
pub use game::TowerDefense;
pub use grid::{Grid, MapError, Tile};
pub use intents::{Intent, RejectReason};
pub use observe::GameSnapshot;
pub use world::{MonsterId, ProjectileId, TowerId};
