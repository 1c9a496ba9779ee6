use crate::config::GameConfig;
use crate::economy::Ledger;
use crate::events::GameEvent;
use crate::grid::{Grid, MapError, Tile};
use crate::intents::{Intent, RejectReason};
use crate::observe::{self, GameSnapshot};
use crate::pathing::PathCache;
use crate::systems;
use crate::world::{Tower, World};
use palisade_core::{Game, IntentEnvelope, PlayerId, TerminalOutcome, Tick};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{debug, info, warn};

/// Everything one match owns. All mutation funnels through
/// [`TowerDefense`], which the host drives one tick at a time.
#[derive(Clone, Debug)]
pub struct GameState {
    pub config: GameConfig,
    pub world: World,
    pub ledger: Ledger,
    pub paths: PathCache,
    pub spawn_points: Vec<(u16, u16)>,
    pub goal: (u16, u16),
    pub lives: u32,
    pub game_over: bool,
    pub restart_at: Option<Tick>,
    pub next_spawn_tick: Tick,
    pub(crate) rng: StdRng,
    base_grid: Grid,
}

impl GameState {
    pub(crate) fn new(config: GameConfig, seed: u64) -> Result<Self, MapError> {
        let base_grid = Grid::from_rows(&config.map_rows)?;
        let mut grid = base_grid.clone();
        let spawn_points = grid.find_spawn_points();
        if spawn_points.is_empty() {
            warn!("map has no spawn tiles; nothing will ever spawn");
        }
        let goal = grid.goal();
        Ok(Self {
            ledger: Ledger::new(config.base_start_gold),
            world: World::new(grid),
            paths: PathCache::default(),
            spawn_points,
            goal,
            lives: config.start_lives,
            game_over: false,
            restart_at: None,
            next_spawn_tick: config.spawn_interval_ticks as u64,
            rng: StdRng::seed_from_u64(seed),
            base_grid,
            config,
        })
    }
}

/// The tower-defense match: grid, economy, entities and the combat
/// resolver behind the [`Game`] interface.
#[derive(Debug)]
pub struct TowerDefense {
    state: GameState,
}

impl TowerDefense {
    pub fn state(&self) -> &GameState {
        &self.state
    }

    fn apply_intent(&mut self, envelope: &IntentEnvelope<Intent>, events: &mut Vec<GameEvent>) {
        let player = envelope.player_id;
        if !self.state.ledger.contains(player) {
            debug!(player, "intent from an unseated player dropped");
            return;
        }
        if self.state.game_over {
            events.push(reject(player, envelope.payload, RejectReason::GameOver));
            return;
        }
        match envelope.payload {
            Intent::PlaceTower { x, y } => self.place_tower(player, x, y, events),
            Intent::UpgradeTower { x, y } => self.upgrade_tower(player, x, y, events),
            Intent::SellTower { x, y } => self.sell_tower(player, x, y, events),
        }
    }

    fn place_tower(&mut self, player: PlayerId, x: u16, y: u16, events: &mut Vec<GameEvent>) {
        let state = &mut self.state;
        let intent = Intent::PlaceTower { x, y };
        if !state.world.grid.in_bounds(x, y) {
            events.push(reject(player, intent, RejectReason::OutOfBounds));
            return;
        }
        if !state.world.grid.get(x, y).is_buildable() {
            events.push(reject(player, intent, RejectReason::NotBuildable));
            return;
        }
        let cost = state.config.tower_cost;
        let balance = match state.ledger.debit(player, cost) {
            Ok(balance) => balance,
            Err(short) => {
                events.push(reject(
                    player,
                    intent,
                    RejectReason::InsufficientGold {
                        needed: short.needed,
                        have: short.have,
                    },
                ));
                return;
            }
        };

        let stats = state.config.tower_stats(1);
        let id = state.world.towers.insert(Tower {
            x,
            y,
            level: 1,
            owner: player,
            damage: stats.damage,
            attack_speed_ticks: stats.attack_speed_ticks,
            range: stats.range,
            cooldown_ticks: 0,
        });
        state.world.grid.set(x, y, Tile::Tower(id));
        state.ledger.note_tower(player, id);
        events.push(GameEvent::TowerPlaced { id, player, x, y });
        events.push(GameEvent::GoldChanged {
            player,
            gold: balance,
        });
    }

    fn upgrade_tower(&mut self, player: PlayerId, x: u16, y: u16, events: &mut Vec<GameEvent>) {
        let state = &mut self.state;
        let intent = Intent::UpgradeTower { x, y };
        if !state.world.grid.in_bounds(x, y) {
            events.push(reject(player, intent, RejectReason::OutOfBounds));
            return;
        }
        let Some(id) = state.world.tower_at(x, y) else {
            events.push(reject(player, intent, RejectReason::NoTowerThere));
            return;
        };
        let (owner, level) = {
            let tower = &state.world.towers[id];
            (tower.owner, tower.level)
        };
        if owner != player {
            events.push(reject(player, intent, RejectReason::NotTheOwner));
            return;
        }
        let cost = state.config.upgrade_cost(level);
        let balance = match state.ledger.debit(player, cost) {
            Ok(balance) => balance,
            Err(short) => {
                events.push(reject(
                    player,
                    intent,
                    RejectReason::InsufficientGold {
                        needed: short.needed,
                        have: short.have,
                    },
                ));
                return;
            }
        };

        let stats = state.config.tower_stats(level + 1);
        let tower = &mut state.world.towers[id];
        tower.level = level + 1;
        tower.damage = stats.damage;
        tower.attack_speed_ticks = stats.attack_speed_ticks;
        tower.range = stats.range;
        // An in-flight cooldown keeps counting from where it was.
        events.push(GameEvent::TowerUpgraded {
            id,
            player,
            level: level + 1,
        });
        events.push(GameEvent::GoldChanged {
            player,
            gold: balance,
        });
    }

    fn sell_tower(&mut self, player: PlayerId, x: u16, y: u16, events: &mut Vec<GameEvent>) {
        let state = &mut self.state;
        let intent = Intent::SellTower { x, y };
        if !state.world.grid.in_bounds(x, y) {
            events.push(reject(player, intent, RejectReason::OutOfBounds));
            return;
        }
        let Some(id) = state.world.tower_at(x, y) else {
            events.push(reject(player, intent, RejectReason::NoTowerThere));
            return;
        };
        if state.world.towers[id].owner != player {
            events.push(reject(player, intent, RejectReason::NotTheOwner));
            return;
        }

        let Some(tower) = state.world.towers.remove(id) else {
            return;
        };
        let refund = state.config.sale_refund(tower.level);
        state.world.grid.set(x, y, Tile::Ground);
        state.ledger.forget_tower(player, id);
        events.push(GameEvent::TowerSold {
            id,
            player,
            x,
            y,
            refund,
        });
        if let Some(balance) = state.ledger.credit(player, refund) {
            events.push(GameEvent::GoldChanged {
                player,
                gold: balance,
            });
        }
    }

    fn finish(&mut self, tick: Tick, events: &mut Vec<GameEvent>) {
        self.state.game_over = true;
        self.state.restart_at = self
            .state
            .config
            .restart_delay_ticks
            .map(|delay| tick + delay as u64);
        events.push(GameEvent::GameOver);
        info!(tick, "out of lives; game over");
    }

    fn restart(&mut self, tick: Tick, events: &mut Vec<GameEvent>) {
        let state = &mut self.state;
        let mut grid = state.base_grid.clone();
        state.spawn_points = grid.find_spawn_points();
        state.world = World::new(grid);
        state.paths.clear();
        state.lives = state.config.start_lives;
        state.game_over = false;
        state.restart_at = None;
        state.next_spawn_tick = tick + state.config.spawn_interval_ticks as u64;

        events.push(GameEvent::GameRestarted);
        events.push(GameEvent::LivesChanged { lives: state.lives });
        for (player, gold) in state.ledger.reset_balances() {
            events.push(GameEvent::GoldChanged { player, gold });
        }
        info!(tick, "match restarted");
    }
}

fn reject(player: PlayerId, intent: Intent, reason: RejectReason) -> GameEvent {
    GameEvent::IntentRejected {
        player,
        intent,
        reason,
    }
}

impl Game for TowerDefense {
    type Config = GameConfig;
    type Intent = Intent;
    type Observation = GameSnapshot;
    type Event = GameEvent;
    type SetupError = MapError;

    fn new(config: Self::Config, seed: u64) -> Result<Self, MapError> {
        Ok(Self {
            state: GameState::new(config, seed)?,
        })
    }

    fn player_joined(
        &mut self,
        player: PlayerId,
        display_name: &str,
        out_events: &mut Vec<GameEvent>,
    ) {
        let gold = self.state.ledger.on_join(player, display_name);
        info!(player, display_name, gold, "player joined");
        out_events.push(GameEvent::PlayerJoined {
            player,
            display_name: display_name.to_string(),
            gold,
        });
    }

    fn player_left(&mut self, player: PlayerId, out_events: &mut Vec<GameEvent>) {
        let Some(record) = self.state.ledger.remove(player) else {
            return;
        };

        let mut pool = 0;
        for id in record.towers {
            if let Some(tower) = self.state.world.towers.remove(id) {
                self.state.world.grid.set(tower.x, tower.y, Tile::Ground);
                let refund = self.state.config.sale_refund(tower.level);
                pool += refund;
                out_events.push(GameEvent::TowerSold {
                    id,
                    player,
                    x: tower.x,
                    y: tower.y,
                    refund,
                });
            }
        }
        for (beneficiary, gold) in self.state.ledger.distribute(pool) {
            out_events.push(GameEvent::GoldChanged {
                player: beneficiary,
                gold,
            });
        }
        info!(player, pool, "player left; refunds redistributed");
        out_events.push(GameEvent::PlayerLeft {
            player,
            refund_pool: pool,
        });
    }

    fn step(
        &mut self,
        tick: Tick,
        intents: &[IntentEnvelope<Intent>],
        out_events: &mut Vec<GameEvent>,
    ) {
        for envelope in intents {
            self.apply_intent(envelope, out_events);
        }

        if self.state.game_over {
            if let Some(at) = self.state.restart_at {
                if tick >= at {
                    self.restart(tick, out_events);
                }
            }
            return;
        }

        systems::spawn_monsters(&mut self.state, tick, out_events);
        systems::update_towers(&mut self.state, out_events);
        systems::update_projectiles(&mut self.state, out_events);
        systems::update_monsters(&mut self.state, out_events);
        systems::remove_dead(&mut self.state, out_events);

        if self.state.lives == 0 {
            self.finish(tick, out_events);
        }
    }

    fn observe(&self, tick: Tick, _player: PlayerId) -> GameSnapshot {
        observe::snapshot(&self.state, tick)
    }

    fn is_terminal(&self) -> Option<TerminalOutcome> {
        if self.state.game_over && self.state.restart_at.is_none() {
            Some(TerminalOutcome::Lose)
        } else {
            None
        }
    }
}
