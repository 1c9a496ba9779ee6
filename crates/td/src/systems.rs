//! The per-tick combat resolver and spawn clock.
//!
//! Order within a tick: spawn, towers, projectiles, monsters, death sweep.
//! Every pass iterates entities in registry (insertion) order; combined
//! with the seeded damage roll this keeps whole matches replayable.

use crate::events::GameEvent;
use crate::game::GameState;
use crate::grid::tile_center;
use crate::world::{Monster, MonsterId, Projectile, ProjectileId, TowerId, World};
use palisade_core::{PlayerId, Tick};
use rand::Rng;

/// Periodic spawn: one monster per interval from a uniformly random spawn
/// point. A spawn whose cached route is empty stays silent for the whole
/// match (the pathfinder already logged it).
pub(crate) fn spawn_monsters(state: &mut GameState, tick: Tick, events: &mut Vec<GameEvent>) {
    if state.spawn_points.is_empty() || tick < state.next_spawn_tick {
        return;
    }
    state.next_spawn_tick = tick + state.config.spawn_interval_ticks as u64;

    let pick = state.rng.gen_range(0, state.spawn_points.len());
    let spawn = state.spawn_points[pick];
    let route = state
        .paths
        .route(&state.world.grid, spawn, state.goal, state.config.tile_size);
    if route.is_empty() {
        return;
    }

    let pos = route[0];
    let id = state.world.monsters.insert(Monster {
        route,
        waypoint: 0,
        pos,
        hp: state.config.monster_max_hp,
        max_hp: state.config.monster_max_hp,
        speed: state.config.monster_speed,
        alive: true,
        last_damager: None,
    });
    events.push(GameEvent::MonsterSpawned { id, spawn });
}

/// Tower fire decisions. A ready tower targets the first alive monster in
/// registry order within Euclidean range of its center; nearest or weakest
/// play no part in the choice.
pub(crate) fn update_towers(state: &mut GameState, events: &mut Vec<GameEvent>) {
    let tower_ids: Vec<TowerId> = state.world.towers.keys().collect();
    for id in tower_ids {
        let tower = &state.world.towers[id];
        if tower.cooldown_ticks > 0 {
            state.world.towers[id].cooldown_ticks -= 1;
            continue;
        }

        let center = tile_center(tower.x, tower.y, state.config.tile_size);
        let (range, damage, owner, attack_speed) =
            (tower.range, tower.damage, tower.owner, tower.attack_speed_ticks);

        let target = state
            .world
            .alive_monsters()
            .find(|(_, m)| m.pos.distance(center) <= range)
            .map(|(monster_id, _)| monster_id);
        let Some(target) = target else { continue };

        let roll = damage + state.rng.gen_range(0, 21);
        state.world.towers[id].cooldown_ticks = attack_speed;
        let projectile = state.world.projectiles.insert(Projectile {
            pos: center,
            target,
            damage: roll,
            speed: state.config.projectile_speed,
            owner,
        });
        events.push(GameEvent::ProjectileSpawned {
            id: projectile,
            tower: id,
            target,
        });
    }
}

/// Projectile homing. A projectile whose target died or vanished is
/// destroyed this tick; one within a speed-step of its target applies
/// damage and is destroyed; anything else advances along the direction
/// vector.
pub(crate) fn update_projectiles(state: &mut GameState, events: &mut Vec<GameEvent>) {
    let ids: Vec<ProjectileId> = state.world.projectiles.keys().collect();
    for id in ids {
        let (target, speed, damage, owner, pos) = {
            let p = &state.world.projectiles[id];
            (p.target, p.speed, p.damage, p.owner, p.pos)
        };

        let target_pos = match state.world.monsters.get(target) {
            Some(m) if m.alive => m.pos,
            _ => {
                state.world.projectiles.remove(id);
                events.push(GameEvent::ProjectileDestroyed { id });
                continue;
            }
        };

        let to_target = target_pos - pos;
        let dist = to_target.length();
        if dist <= speed {
            apply_damage(&mut state.world, target, damage, owner);
            state.world.projectiles.remove(id);
            events.push(GameEvent::ProjectileDestroyed { id });
        } else {
            state.world.projectiles[id].pos = pos + to_target / dist * speed;
        }
    }
}

/// Damage state machine: Alive stays Alive while hp is positive, flips to
/// Dead (terminal) at hp <= 0. Dead monsters absorb nothing further; the
/// sweep pays out and removes them.
pub(crate) fn apply_damage(world: &mut World, target: MonsterId, amount: i32, source: PlayerId) {
    let Some(monster) = world.monsters.get_mut(target) else {
        return;
    };
    if !monster.alive {
        return;
    }
    monster.hp -= amount;
    monster.last_damager = Some(source);
    if monster.hp <= 0 {
        monster.alive = false;
    }
}

/// Monster movement. A monster standing on its final waypoint has reached
/// the goal: it costs a shared life and disappears. Anyone else advances
/// toward the next waypoint, snapping to it once within a speed-step on
/// both axes.
pub(crate) fn update_monsters(state: &mut GameState, events: &mut Vec<GameEvent>) {
    let ids: Vec<MonsterId> = state.world.monsters.keys().collect();
    let mut leaked = Vec::new();

    for id in ids {
        let monster = &mut state.world.monsters[id];
        if !monster.alive {
            continue;
        }
        if monster.waypoint + 1 >= monster.route.len() {
            monster.alive = false;
            leaked.push(id);
            continue;
        }

        let next = monster.route[monster.waypoint + 1];
        let dir = (next - monster.pos).normalize_or_zero();
        let moved = monster.pos + dir * monster.speed;
        if (moved.x - next.x).abs() < monster.speed && (moved.y - next.y).abs() < monster.speed {
            monster.waypoint += 1;
            monster.pos = next;
        } else {
            monster.pos = moved;
        }
    }

    for id in leaked {
        state.world.monsters.remove(id);
        state.lives = state.lives.saturating_sub(1);
        events.push(GameEvent::MonsterLeaked { id });
        events.push(GameEvent::LivesChanged { lives: state.lives });
    }
}

/// Removes monsters the damage state machine marked dead and credits the
/// kill reward to the last damager, if that player is still seated.
pub(crate) fn remove_dead(state: &mut GameState, events: &mut Vec<GameEvent>) {
    let dead: Vec<MonsterId> = state
        .world
        .monsters
        .iter()
        .filter(|(_, m)| !m.alive)
        .map(|(id, _)| id)
        .collect();

    for id in dead {
        if let Some(monster) = state.world.monsters.remove(id) {
            events.push(GameEvent::MonsterDied {
                id,
                killer: monster.last_damager,
            });
            if let Some(killer) = monster.last_damager {
                if let Some(balance) = state.ledger.credit(killer, state.config.kill_reward) {
                    events.push(GameEvent::GoldChanged {
                        player: killer,
                        gold: balance,
                    });
                }
            }
        }
    }
}
