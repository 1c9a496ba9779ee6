use crate::grid::{Grid, Tile};
use glam::Vec2;
use palisade_core::PlayerId;
use slotmap::{new_key_type, SlotMap};
use std::sync::Arc;

new_key_type! { pub struct TowerId; }
new_key_type! { pub struct MonsterId; }
new_key_type! { pub struct ProjectileId; }

#[derive(Clone, Debug)]
pub struct Tower {
    pub x: u16,
    pub y: u16,
    pub level: u32,
    pub owner: PlayerId,
    pub damage: i32,
    pub attack_speed_ticks: u32,
    pub range: f32,
    pub cooldown_ticks: u32,
}

#[derive(Clone, Debug)]
pub struct Monster {
    /// Shared waypoint route from the spawn's path cache entry.
    pub route: Arc<[Vec2]>,
    pub waypoint: usize,
    pub pos: Vec2,
    pub hp: i32,
    pub max_hp: i32,
    pub speed: f32,
    pub alive: bool,
    pub last_damager: Option<PlayerId>,
}

impl Monster {
    /// Remaining-health fraction, clamped to [0, 1] for display.
    pub fn hp_ratio(&self) -> f32 {
        (self.hp as f32 / self.max_hp as f32).clamp(0.0, 1.0)
    }
}

#[derive(Clone, Debug)]
pub struct Projectile {
    pub pos: Vec2,
    /// Re-validated against the monster registry every tick; a vanished or
    /// dead target destroys the projectile the same tick.
    pub target: MonsterId,
    pub damage: i32,
    pub speed: f32,
    pub owner: PlayerId,
}

/// The entity registry: owns every live Monster, Tower and Projectile and
/// the grid they stand on. Storage and existence queries only; the combat
/// systems decide what is created or destroyed.
///
/// Slotmap iteration follows slot order, which is stable for a given
/// operation history; that is the "registry order" tower targeting and
/// damage resolution rely on.
#[derive(Clone, Debug)]
pub struct World {
    pub grid: Grid,
    pub towers: SlotMap<TowerId, Tower>,
    pub monsters: SlotMap<MonsterId, Monster>,
    pub projectiles: SlotMap<ProjectileId, Projectile>,
}

impl World {
    pub fn new(grid: Grid) -> Self {
        Self {
            grid,
            towers: SlotMap::with_key(),
            monsters: SlotMap::with_key(),
            projectiles: SlotMap::with_key(),
        }
    }

    pub fn tower_at(&self, x: u16, y: u16) -> Option<TowerId> {
        match self.grid.get(x, y) {
            Tile::Tower(id) => Some(id),
            _ => None,
        }
    }

    pub fn alive_monsters(&self) -> impl Iterator<Item = (MonsterId, &Monster)> {
        self.monsters.iter().filter(|(_, m)| m.alive)
    }
}
