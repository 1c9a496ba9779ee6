use crate::errors::{CreateMatchError, JoinError, MatchError, SubmitError};
use crate::match_handle::MatchHandle;
use crate::tick_loop::spawn_tick_loop;
use crate::types::{EventCursor, MatchInfo, ServerConfig, ServerEvent, SessionToken};
use palisade_core::{ActionId, Game, MatchId, PlayerId, Tick};
use palisade_host::MatchHost;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;

struct MatchEntry<G: Game> {
    handle: MatchHandle<G>,
    task: JoinHandle<()>,
}

/// Manages concurrent matches for one game type. This is the surface a
/// network transport talks to; it never touches simulation state directly.
pub struct GameServer<G: Game> {
    pub config: ServerConfig,
    matches: Arc<RwLock<HashMap<MatchId, MatchEntry<G>>>>,
    next_match_id: AtomicU64,
}

impl<G: Game + Send + 'static> GameServer<G> {
    pub fn new(config: ServerConfig) -> Self {
        Self {
            config,
            matches: Arc::new(RwLock::new(HashMap::new())),
            next_match_id: AtomicU64::new(1),
        }
    }

    /// Shuts down the server, terminating every match.
    pub async fn shutdown(&self) {
        let mut matches = self.matches.write().await;

        for (_, entry) in matches.drain() {
            entry.handle.request_shutdown();
            let _ = entry.task.await;
        }
    }

    /// Creates a match that starts as soon as one player is seated.
    pub async fn create_match(
        &self,
        game_config: G::Config,
        seed: u64,
    ) -> Result<MatchId, CreateMatchError> {
        self.create_match_with_players(game_config, seed, 1).await
    }

    /// Creates a match that waits for `required_players` before its clock
    /// starts. Configuration problems surface here, before anything runs.
    pub async fn create_match_with_players(
        &self,
        game_config: G::Config,
        seed: u64,
        required_players: u8,
    ) -> Result<MatchId, CreateMatchError> {
        let matches = self.matches.read().await;
        if matches.len() >= self.config.max_matches {
            return Err(CreateMatchError::TooManyMatches);
        }
        drop(matches);

        let host = MatchHost::<G>::new(game_config, seed, self.config.default_tick_hz)
            .map_err(|e| CreateMatchError::InvalidConfig(e.to_string()))?;

        let match_id = self.next_match_id.fetch_add(1, Ordering::Relaxed);
        let handle = MatchHandle::new(
            host,
            self.config.event_buffer_capacity,
            required_players,
            self.config.max_players_per_match,
        );
        let task = spawn_tick_loop(handle.clone());

        let mut matches = self.matches.write().await;
        matches.insert(match_id, MatchEntry { handle, task });

        Ok(match_id)
    }

    pub async fn list_matches(&self) -> Vec<MatchInfo> {
        let matches = self.matches.read().await;
        let mut infos = Vec::with_capacity(matches.len());

        for (&match_id, entry) in matches.iter() {
            infos.push(MatchInfo {
                match_id,
                status: entry.handle.status().await,
                current_tick: entry.handle.current_tick().await,
                player_count: entry.handle.player_count().await,
            });
        }

        infos
    }

    pub async fn terminate_match(&self, match_id: MatchId) -> Result<(), MatchError> {
        let mut matches = self.matches.write().await;

        if let Some(entry) = matches.remove(&match_id) {
            entry.handle.terminate().await;
            let _ = entry.task.await;
            Ok(())
        } else {
            Err(MatchError::NotFound)
        }
    }

    /// Opens a read-only session on a match.
    pub async fn spectate_match(&self, match_id: MatchId) -> Result<SessionToken, MatchError> {
        let matches = self.matches.read().await;
        let entry = matches.get(&match_id).ok_or(MatchError::NotFound)?;
        Ok(entry.handle.spectate().await)
    }

    /// Seats a player with the given display name.
    pub async fn join_match(
        &self,
        match_id: MatchId,
        display_name: &str,
    ) -> Result<(SessionToken, PlayerId), JoinError> {
        let matches = self.matches.read().await;
        let entry = matches.get(&match_id).ok_or(JoinError::NotFound)?;

        entry.handle.join_player(display_name).await
    }

    pub async fn leave_match(
        &self,
        match_id: MatchId,
        session: SessionToken,
    ) -> Result<(), MatchError> {
        let matches = self.matches.read().await;
        let entry = matches.get(&match_id).ok_or(MatchError::NotFound)?;

        if entry.handle.leave_player(session).await {
            Ok(())
        } else {
            Err(MatchError::InvalidSession)
        }
    }

    /// Submits an intent on behalf of a seated player. Returns the action
    /// id and the tick the intent will execute on.
    pub async fn submit_intent(
        &self,
        match_id: MatchId,
        session: SessionToken,
        intent: G::Intent,
        scheduled_tick: Tick,
    ) -> Result<(ActionId, Tick), SubmitError> {
        let matches = self.matches.read().await;
        let entry = matches.get(&match_id).ok_or(SubmitError::NotFound)?;

        entry
            .handle
            .submit_intent(session, intent, scheduled_tick)
            .await
    }

    pub async fn observe(
        &self,
        match_id: MatchId,
        session: SessionToken,
    ) -> Result<G::Observation, MatchError> {
        let matches = self.matches.read().await;
        let entry = matches.get(&match_id).ok_or(MatchError::NotFound)?;

        entry
            .handle
            .observe(session)
            .await
            .ok_or(MatchError::InvalidSession)
    }

    pub async fn poll_events(
        &self,
        match_id: MatchId,
        session: SessionToken,
        cursor: EventCursor,
    ) -> Result<(Vec<ServerEvent<G::Event>>, EventCursor), MatchError> {
        let matches = self.matches.read().await;
        let entry = matches.get(&match_id).ok_or(MatchError::NotFound)?;

        entry
            .handle
            .poll_events(session, cursor)
            .await
            .ok_or(MatchError::InvalidSession)
    }

    pub async fn current_tick(&self, match_id: MatchId) -> Result<Tick, MatchError> {
        let matches = self.matches.read().await;
        let entry = matches.get(&match_id).ok_or(MatchError::NotFound)?;
        Ok(entry.handle.current_tick().await)
    }
}
