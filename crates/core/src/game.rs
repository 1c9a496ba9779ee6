use crate::envelope::IntentEnvelope;
use crate::types::{PlayerId, Tick};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TerminalOutcome {
    Win,
    Lose,
}

/// A deterministic, tick-stepped simulation driven by a match host.
///
/// Construction validates the supplied configuration and is the only
/// fallible operation; after that the game advances exclusively through
/// `step`, one tick at a time, with all external intents delivered as an
/// ordered batch. Two games built from the same config and seed and fed
/// the same intent schedule produce identical event streams.
pub trait Game: Sized {
    type Config: Clone + Send + Sync + 'static;
    type Intent: Clone + Send + Sync + 'static;
    type Observation: Clone + Send + Sync + 'static;
    type Event: Clone + Send + Sync + 'static;
    type SetupError: std::error::Error + Send + Sync + 'static;

    fn new(config: Self::Config, seed: u64) -> Result<Self, Self::SetupError>;

    /// A player has been seated by the host.
    fn player_joined(
        &mut self,
        player: PlayerId,
        display_name: &str,
        out_events: &mut Vec<Self::Event>,
    );

    /// A seated player has left. Everything the player owned is released.
    fn player_left(&mut self, player: PlayerId, out_events: &mut Vec<Self::Event>);

    fn step(
        &mut self,
        tick: Tick,
        intents: &[IntentEnvelope<Self::Intent>],
        out_events: &mut Vec<Self::Event>,
    );

    fn observe(&self, tick: Tick, player: PlayerId) -> Self::Observation;

    fn is_terminal(&self) -> Option<TerminalOutcome>;
}
