/// Monotonically increasing simulation tick counter.
pub type Tick = u64;

/// Stable identity of a seated player, assigned by the match host and kept
/// for the lifetime of the player's session.
pub type PlayerId = u64;

/// Per-match ordering id for submitted intents. Intents scheduled for the
/// same tick execute sorted by `(PlayerId, ActionId)`.
pub type ActionId = u64;

/// Identifies a match on a server.
pub type MatchId = u64;
