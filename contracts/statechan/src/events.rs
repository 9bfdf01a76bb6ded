use soroban_sdk::{contractevent, Address};

// ═══════════════════════════════════════════════════════════════════════════════
//  Controller events
// ═══════════════════════════════════════════════════════════════════════════════

#[contractevent]
pub struct EvDeposited {
    pub player: Address,
    pub amount: i128,
}

#[contractevent]
pub struct EvDepositCancelled {
    pub caller: Address,
}

#[contractevent]
pub struct EvSeedCommitted {
    pub player: Address,
}

#[contractevent]
pub struct EvSeedRevealed {
    pub player: Address,
}

/// Seeding finished or a ring refresh landed.
#[contractevent]
pub struct EvRandomReady {
    pub ring_turn: u32,
}

/// A move asked for fresh entropy; `ring_turn` (0-based) must reveal next.
#[contractevent]
pub struct EvRandomRequested {
    pub ring_turn: u32,
}

#[contractevent]
pub struct EvGameStarted {
    pub control: u32,
}

#[contractevent]
pub struct EvPlayerMoved {
    pub player: Address,
    pub turn: u32,
}

#[contractevent]
pub struct EvGameEnded {
    pub turn: u32,
}

#[contractevent]
pub struct EvFastforwarded {
    pub turn: u32,
}

#[contractevent]
pub struct EvTimerStarted {
    pub turn: u32,
    pub control: u32,
    pub rng_ready: bool,
    pub deadline: u32,
}

#[contractevent]
pub struct EvTimedOut {
    pub offender: u32,
}

#[contractevent]
pub struct EvWithdrawn {
    pub player: Address,
    pub amount: i128,
}
