use crate::types::{ActionId, PlayerId, Tick};

/// A player-attributed intent scheduled for execution at a specific tick.
#[derive(Clone, Debug)]
pub struct IntentEnvelope<I> {
    pub player_id: PlayerId,
    pub action_id: ActionId,
    pub scheduled_tick: Tick,
    pub payload: I,
}
