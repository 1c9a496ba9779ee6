use palisade_core::{MatchId, TerminalOutcome, Tick};

/// Identifies one connection's seat (or spectator slot) within a match.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SessionToken(pub u64);

/// Position in a match's event stream for cursor-based retrieval.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct EventCursor(pub u64);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MatchStatus {
    /// The simulation holds until enough players are seated. Late joiners
    /// are still welcome once it is running.
    WaitingForPlayers { current: u8, required: u8 },
    Running,
    Finished(TerminalOutcome),
    Terminated,
}

#[derive(Clone, Debug)]
pub struct MatchInfo {
    pub match_id: MatchId,
    pub status: MatchStatus,
    pub current_tick: Tick,
    pub player_count: u8,
}

/// An event with its stream sequence number, as handed to transports.
#[derive(Clone, Debug)]
pub struct ServerEvent<E> {
    pub sequence: u64,
    pub tick: Tick,
    pub event: E,
}

#[derive(Clone, Debug)]
pub struct ServerConfig {
    /// Tick rate for match simulation (ticks per second).
    pub default_tick_hz: u32,
    /// Maximum number of concurrent matches.
    pub max_matches: usize,
    /// Seats per match; joins beyond this are refused.
    pub max_players_per_match: u8,
    /// Capacity of the per-match event ring.
    pub event_buffer_capacity: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            default_tick_hz: 60,
            max_matches: 100,
            max_players_per_match: 8,
            event_buffer_capacity: 1024,
        }
    }
}
