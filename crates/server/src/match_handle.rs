use crate::errors::{JoinError, SubmitError};
use crate::events::EventBuffer;
use crate::types::{EventCursor, MatchStatus, ServerEvent, SessionToken};
use palisade_core::{ActionId, Game, IntentEnvelope, PlayerId, Tick};
use palisade_host::MatchHost;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::Mutex;

/// Internal state of a match: the host plus the session bookkeeping.
pub struct MatchInner<G: Game> {
    pub host: MatchHost<G>,
    pub events: EventBuffer<G::Event>,
    pub sessions: HashMap<SessionToken, PlayerId>,
    pub players: HashMap<PlayerId, SessionToken>,
    pub spectators: HashSet<SessionToken>,
    pub next_session_id: u64,
    pub next_action_id: ActionId,
    pub required_players: u8,
    pub max_players: u8,
    pub status: MatchStatus,
}

impl<G: Game> MatchInner<G> {
    fn new(
        host: MatchHost<G>,
        event_buffer_capacity: usize,
        required_players: u8,
        max_players: u8,
    ) -> Self {
        Self {
            host,
            events: EventBuffer::new(event_buffer_capacity),
            sessions: HashMap::new(),
            players: HashMap::new(),
            spectators: HashSet::new(),
            next_session_id: 1,
            next_action_id: 1,
            required_players,
            max_players: max_players.max(required_players),
            status: MatchStatus::WaitingForPlayers {
                current: 0,
                required: required_players,
            },
        }
    }

    fn player_count(&self) -> u8 {
        self.sessions.len() as u8
    }

    fn buffer_events(&mut self, events: Vec<G::Event>) {
        let tick = self.host.current_tick();
        for event in events {
            self.events.push(tick, event);
        }
    }
}

/// The single ownership boundary for one match: every intent handler and
/// every clock tick locks the inner state, runs to completion and releases.
/// Nothing else can reach the grid, registry or ledger.
pub struct MatchHandle<G: Game> {
    pub inner: Arc<Mutex<MatchInner<G>>>,
    shutdown: Arc<AtomicBool>,
    tick_hz: u32,
}

impl<G: Game> Clone for MatchHandle<G> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
            shutdown: Arc::clone(&self.shutdown),
            tick_hz: self.tick_hz,
        }
    }
}

impl<G: Game> MatchHandle<G> {
    pub fn new(
        host: MatchHost<G>,
        event_buffer_capacity: usize,
        required_players: u8,
        max_players: u8,
    ) -> Self {
        let tick_hz = host.tick_hz();
        Self {
            inner: Arc::new(Mutex::new(MatchInner::new(
                host,
                event_buffer_capacity,
                required_players,
                max_players,
            ))),
            shutdown: Arc::new(AtomicBool::new(false)),
            tick_hz,
        }
    }

    pub fn tick_hz(&self) -> u32 {
        self.tick_hz
    }

    pub fn should_shutdown(&self) -> bool {
        self.shutdown.load(Ordering::Relaxed)
    }

    pub fn request_shutdown(&self) {
        self.shutdown.store(true, Ordering::Relaxed);
    }

    /// Creates a read-only session: observe and poll, never submit.
    pub async fn spectate(&self) -> SessionToken {
        let mut inner = self.inner.lock().await;
        let session = SessionToken(inner.next_session_id);
        inner.next_session_id += 1;
        inner.spectators.insert(session);
        session
    }

    /// Seats a new player. Allowed while waiting for the lobby to fill and
    /// while the match is running, up to the seat cap; a finished or
    /// terminated match refuses. Join-side events (starting gold and so on)
    /// land in the event stream.
    pub async fn join_player(
        &self,
        display_name: &str,
    ) -> Result<(SessionToken, PlayerId), JoinError> {
        let mut inner = self.inner.lock().await;

        match inner.status {
            MatchStatus::WaitingForPlayers { .. } | MatchStatus::Running => {}
            _ => return Err(JoinError::NotJoinable),
        }
        if inner.player_count() >= inner.max_players {
            return Err(JoinError::MatchFull);
        }

        let (player_id, events) = inner.host.join_player(display_name);
        inner.buffer_events(events);

        let session = SessionToken(inner.next_session_id);
        inner.next_session_id += 1;
        inner.sessions.insert(session, player_id);
        inner.players.insert(player_id, session);

        if let MatchStatus::WaitingForPlayers { current, required } = inner.status {
            let current = current + 1;
            inner.status = if current >= required {
                MatchStatus::Running
            } else {
                MatchStatus::WaitingForPlayers { current, required }
            };
        }

        Ok((session, player_id))
    }

    /// Removes a player or spectator. A departing player's towers are
    /// liquidated by the game; those events land in the stream.
    pub async fn leave_player(&self, session: SessionToken) -> bool {
        let mut inner = self.inner.lock().await;

        if let Some(player_id) = inner.sessions.remove(&session) {
            inner.players.remove(&player_id);
            let events = inner.host.leave_player(player_id);
            inner.buffer_events(events);
            true
        } else {
            inner.spectators.remove(&session)
        }
    }

    /// Queues an intent for its player. Returns the action id and the tick
    /// it will execute on.
    pub async fn submit_intent(
        &self,
        session: SessionToken,
        intent: G::Intent,
        scheduled_tick: Tick,
    ) -> Result<(ActionId, Tick), SubmitError> {
        let mut inner = self.inner.lock().await;

        let player_id = inner
            .sessions
            .get(&session)
            .copied()
            .ok_or(SubmitError::InvalidSession)?;

        if matches!(
            inner.status,
            MatchStatus::Finished(_) | MatchStatus::Terminated
        ) {
            return Err(SubmitError::Terminated);
        }

        let action_id = inner.next_action_id;
        inner.next_action_id += 1;

        let scheduled = inner.host.submit(IntentEnvelope {
            player_id,
            action_id,
            scheduled_tick,
            payload: intent,
        });

        Ok((action_id, scheduled))
    }

    /// Current observation for a player or spectator.
    pub async fn observe(&self, session: SessionToken) -> Option<G::Observation> {
        let inner = self.inner.lock().await;

        let player_id = if let Some(&pid) = inner.sessions.get(&session) {
            pid
        } else if inner.spectators.contains(&session) {
            0
        } else {
            return None;
        };
        let tick = inner.host.current_tick();
        Some(inner.host.game().observe(tick, player_id))
    }

    pub async fn poll_events(
        &self,
        session: SessionToken,
        cursor: EventCursor,
    ) -> Option<(Vec<ServerEvent<G::Event>>, EventCursor)> {
        let inner = self.inner.lock().await;

        if !inner.sessions.contains_key(&session) && !inner.spectators.contains(&session) {
            return None;
        }
        Some(inner.events.get_from_cursor(cursor))
    }

    pub async fn current_tick(&self) -> Tick {
        let inner = self.inner.lock().await;
        inner.host.current_tick()
    }

    pub async fn status(&self) -> MatchStatus {
        let inner = self.inner.lock().await;
        inner.status
    }

    pub async fn player_count(&self) -> u8 {
        let inner = self.inner.lock().await;
        inner.player_count()
    }

    /// Advances the simulation by one tick while the match is running.
    /// Returns true once the match has finished or been terminated.
    pub async fn step_one_tick(&self) -> bool {
        let mut inner = self.inner.lock().await;

        if !matches!(inner.status, MatchStatus::Running) {
            return matches!(
                inner.status,
                MatchStatus::Finished(_) | MatchStatus::Terminated
            );
        }

        if let Some(events) = inner.host.step_one_tick() {
            inner.buffer_events(events);
        }

        if let Some(outcome) = inner.host.is_terminal() {
            inner.status = MatchStatus::Finished(outcome);
            return true;
        }

        false
    }

    pub async fn terminate(&self) {
        let mut inner = self.inner.lock().await;
        inner.status = MatchStatus::Terminated;
        drop(inner);
        self.request_shutdown();
    }
}
