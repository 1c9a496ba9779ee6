/// Player intents delivered by the session transport. Tile coordinates are
/// already converted from screen space by the caller.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Intent {
    PlaceTower { x: u16, y: u16 },
    UpgradeTower { x: u16, y: u16 },
    SellTower { x: u16, y: u16 },
}

/// Why an intent was refused. Reported back to the requesting player;
/// nothing is mutated on rejection.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RejectReason {
    OutOfBounds,
    NotBuildable,
    NoTowerThere,
    NotTheOwner,
    InsufficientGold { needed: u32, have: u32 },
    GameOver,
}
