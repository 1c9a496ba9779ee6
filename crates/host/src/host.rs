use palisade_core::{Game, IntentEnvelope, PlayerId, TerminalOutcome, Tick};
use std::collections::BTreeMap;

#[derive(Debug)]
pub struct RunResult<G: Game> {
    pub outcome: Option<TerminalOutcome>,
    pub final_tick: Tick,
    pub events: Vec<G::Event>,
}

/// Deterministic driver for a single match.
///
/// Owns the game, the tick counter, the player-id allocator and the queue
/// of pending intents. All time advances here and nowhere else; intents for
/// the same tick execute sorted by (player id, action id), so replaying the
/// same seed and intent schedule reproduces the match exactly.
pub struct MatchHost<G: Game> {
    game: G,
    current_tick: Tick,
    tick_hz: u32,
    next_player_id: PlayerId,
    pending: BTreeMap<Tick, Vec<IntentEnvelope<G::Intent>>>,
}

impl<G: Game> MatchHost<G> {
    pub fn new(config: G::Config, seed: u64, tick_hz: u32) -> Result<Self, G::SetupError> {
        Ok(Self {
            game: G::new(config, seed)?,
            current_tick: 0,
            tick_hz,
            next_player_id: 0,
            pending: BTreeMap::new(),
        })
    }

    /// Seats a new player and hands the join to the game. Returns the
    /// assigned id plus whatever events the join produced.
    pub fn join_player(&mut self, display_name: &str) -> (PlayerId, Vec<G::Event>) {
        let id = self.next_player_id;
        self.next_player_id += 1;

        let mut events = Vec::new();
        self.game.player_joined(id, display_name, &mut events);
        (id, events)
    }

    /// Unseats a player; the game releases everything the player owned.
    pub fn leave_player(&mut self, player: PlayerId) -> Vec<G::Event> {
        let mut events = Vec::new();
        self.game.player_left(player, &mut events);
        events
    }

    /// Queues an intent. A scheduled tick at or before the current one is
    /// moved to the next tick. Returns the tick it will actually run on.
    pub fn submit(&mut self, mut intent: IntentEnvelope<G::Intent>) -> Tick {
        let scheduled = if intent.scheduled_tick <= self.current_tick {
            self.current_tick + 1
        } else {
            intent.scheduled_tick
        };
        intent.scheduled_tick = scheduled;
        self.pending.entry(scheduled).or_default().push(intent);
        scheduled
    }

    /// Advances one tick, or returns `None` when the game is already
    /// terminal.
    pub fn step_one_tick(&mut self) -> Option<Vec<G::Event>> {
        if self.game.is_terminal().is_some() {
            return None;
        }

        self.current_tick += 1;

        let mut intents = self.pending.remove(&self.current_tick).unwrap_or_default();
        intents.sort_by_key(|i| (i.player_id, i.action_id));

        let mut events = Vec::new();
        self.game.step(self.current_tick, &intents, &mut events);
        Some(events)
    }

    /// Runs up to `max_ticks`, stopping early at a terminal outcome.
    pub fn run_for_ticks(&mut self, max_ticks: Tick) -> RunResult<G> {
        let mut all_events = Vec::new();

        for _ in 0..max_ticks {
            match self.step_one_tick() {
                Some(events) => all_events.extend(events),
                None => break,
            }
        }

        RunResult {
            outcome: self.game.is_terminal(),
            final_tick: self.current_tick,
            events: all_events,
        }
    }

    pub fn game(&self) -> &G {
        &self.game
    }

    pub fn current_tick(&self) -> Tick {
        self.current_tick
    }

    pub fn tick_hz(&self) -> u32 {
        self.tick_hz
    }

    pub fn is_terminal(&self) -> Option<TerminalOutcome> {
        self.game.is_terminal()
    }
}
