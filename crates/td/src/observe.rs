//! Serializable full-state snapshots for rendering and broadcast.
//!
//! Slotmap keys are flattened to their ffi form so snapshots can cross a
//! wire; the ids stay stable for the lifetime of the entity and match the
//! ids carried by the event stream within one process.

use crate::game::GameState;
use crate::grid::Tile;
use palisade_core::Tick;
use serde::{Deserialize, Serialize};
use slotmap::Key;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Position {
    pub x: u16,
    pub y: u16,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TileView {
    Ground,
    Block,
    Tower,
    Path,
    Spawn,
    Goal,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PlayerView {
    pub id: u64,
    pub display_name: String,
    pub gold: u32,
    pub alive: bool,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TowerView {
    pub id: u64,
    pub x: u16,
    pub y: u16,
    pub level: u32,
    pub owner: u64,
    pub damage: i32,
    pub attack_speed_ticks: u32,
    pub range: f32,
    pub cooldown_ticks: u32,
    pub upgrade_cost: u32,
    pub sale_refund: u32,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MonsterView {
    pub id: u64,
    pub x: f32,
    pub y: f32,
    pub hp: i32,
    pub max_hp: i32,
    pub hp_ratio: f32,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ProjectileView {
    pub id: u64,
    pub x: f32,
    pub y: f32,
    pub target: u64,
}

/// Everything a renderer or spectator needs in one message.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GameSnapshot {
    pub tick: Tick,
    pub lives: u32,
    pub game_over: bool,
    pub width: u16,
    pub height: u16,
    pub tiles: Vec<TileView>,
    pub goal: Position,
    pub spawn_points: Vec<Position>,
    pub players: Vec<PlayerView>,
    pub towers: Vec<TowerView>,
    pub monsters: Vec<MonsterView>,
    pub projectiles: Vec<ProjectileView>,
}

pub fn snapshot(state: &GameState, tick: Tick) -> GameSnapshot {
    let grid = &state.world.grid;
    GameSnapshot {
        tick,
        lives: state.lives,
        game_over: state.game_over,
        width: grid.width(),
        height: grid.height(),
        tiles: grid
            .tiles()
            .iter()
            .map(|tile| match tile {
                Tile::Ground => TileView::Ground,
                Tile::Block => TileView::Block,
                Tile::Tower(_) => TileView::Tower,
                Tile::Path => TileView::Path,
                Tile::Spawn => TileView::Spawn,
                Tile::Goal => TileView::Goal,
            })
            .collect(),
        goal: Position {
            x: state.goal.0,
            y: state.goal.1,
        },
        spawn_points: state
            .spawn_points
            .iter()
            .map(|&(x, y)| Position { x, y })
            .collect(),
        players: state
            .ledger
            .players()
            .map(|(id, p)| PlayerView {
                id,
                display_name: p.display_name.clone(),
                gold: p.gold,
                alive: p.alive,
            })
            .collect(),
        towers: state
            .world
            .towers
            .iter()
            .map(|(id, t)| TowerView {
                id: id.data().as_ffi(),
                x: t.x,
                y: t.y,
                level: t.level,
                owner: t.owner,
                damage: t.damage,
                attack_speed_ticks: t.attack_speed_ticks,
                range: t.range,
                cooldown_ticks: t.cooldown_ticks,
                upgrade_cost: state.config.upgrade_cost(t.level),
                sale_refund: state.config.sale_refund(t.level),
            })
            .collect(),
        monsters: state
            .world
            .monsters
            .iter()
            .map(|(id, m)| MonsterView {
                id: id.data().as_ffi(),
                x: m.pos.x,
                y: m.pos.y,
                hp: m.hp,
                max_hp: m.max_hp,
                hp_ratio: m.hp_ratio(),
            })
            .collect(),
        projectiles: state
            .world
            .projectiles
            .iter()
            .map(|(id, p)| ProjectileView {
                id: id.data().as_ffi(),
                x: p.pos.x,
                y: p.pos.y,
                target: p.target.data().as_ffi(),
            })
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GameConfig;
    use crate::game::TowerDefense;
    use crate::intents::Intent;
    use palisade_core::{Game, IntentEnvelope};

    #[test]
    fn snapshot_reflects_the_live_state_and_round_trips() {
        let config = GameConfig {
            map_rows: vec!["S++++++G".into(), "........".into()],
            ..GameConfig::default()
        };
        let mut game = TowerDefense::new(config, 3).unwrap();
        let mut events = Vec::new();
        game.player_joined(1, "ada", &mut events);
        game.step(
            1,
            &[IntentEnvelope {
                player_id: 1,
                action_id: 1,
                scheduled_tick: 1,
                payload: Intent::PlaceTower { x: 2, y: 1 },
            }],
            &mut events,
        );

        let snap = game.observe(1, 1);
        assert_eq!(snap.width, 8);
        assert_eq!(snap.height, 2);
        assert_eq!(snap.lives, 10);
        assert_eq!(snap.goal, Position { x: 7, y: 0 });
        assert_eq!(snap.spawn_points, vec![Position { x: 0, y: 0 }]);
        assert_eq!(snap.players.len(), 1);
        assert_eq!(snap.players[0].gold, 195);
        assert_eq!(snap.towers.len(), 1);
        assert_eq!(snap.towers[0].upgrade_cost, 10);
        assert_eq!(snap.tiles[8 + 2], TileView::Tower);
        // Spawn tiles were normalized away during setup.
        assert_eq!(snap.tiles[0], TileView::Path);

        let json = serde_json::to_string(&snap).unwrap();
        let back: GameSnapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(back.towers[0].id, snap.towers[0].id);
        assert_eq!(back.players[0].display_name, "ada");
    }
}
