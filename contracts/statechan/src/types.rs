use soroban_sdk::{contracttype, Address, BytesN, Vec};

// ═══════════════════════════════════════════════════════════════════════════════
//  Configuration
// ═══════════════════════════════════════════════════════════════════════════════

/// Fixed at construction.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ChannelConfig {
    /// Seat order; seat `i + 1` is `players[i]`.
    pub players: Vec<Address>,
    /// Uncompressed SEC1 secp256k1 keys (65 bytes) signing for each seat.
    pub signers: Vec<BytesN<65>>,
    /// Stellar token the bets are escrowed in.
    pub token: Address,
    pub bet_amount: i128,
    /// Ledgers the deposit window (and later the start window) stays open.
    pub deposit_duration: u32,
    pub min_timer_duration: u32,
}

// ═══════════════════════════════════════════════════════════════════════════════
//  Match record
// ═══════════════════════════════════════════════════════════════════════════════

#[contracttype]
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[repr(u32)]
pub enum Lifecycle {
    Deposit = 0,
    Starting = 1,
    Playing = 2,
    Terminal = 3,
    Cancelled = 4,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Seat {
    pub deposited: i128,
    pub withdrawn: bool,
}

/// Snapshot taken when a timer is armed. Any progress clears the timer, so
/// a timer still present at its deadline means nobody moved since.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TimerState {
    pub deadline: u32,
    pub turn: u32,
    pub control: u32,
    pub rng_ready: bool,
    pub ring_turn: u32,
}

impl TimerState {
    /// Seat (1-based) that failed to act: the pending ring revealer if the
    /// random source was waiting, otherwise the seat in control.
    pub fn offender(&self) -> u32 {
        if self.rng_ready {
            self.control
        } else {
            self.ring_turn + 1
        }
    }
}

/// Everything the controller tracks outside the canonical blob.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct MatchRecord {
    pub lifecycle: Lifecycle,
    pub seats: Vec<Seat>,
    pub deposit_deadline: u32,
    pub start_deadline: u32,
    pub timer: Option<TimerState>,
    /// Seat that lost the pot by timing out.
    pub forfeit: Option<u32>,
}

#[contracttype]
#[derive(Clone)]
pub(crate) enum DataKey {
    Config,
    Record,
    Channel,
}

// ═══════════════════════════════════════════════════════════════════════════════
//  Constants
// ═══════════════════════════════════════════════════════════════════════════════

// Ledger rate is approximately 5 seconds per ledger on Stellar
const LEDGER_RATE_SECS: u32 = 5;

// A match is kept alive for 30 days after its last write
const TTL_SECONDS: u32 = 30 * 24 * 60 * 60;

pub(crate) const CHANNEL_TTL_LEDGERS: u32 = TTL_SECONDS / LEDGER_RATE_SECS;

pub const MIN_PLAYERS: u32 = 2;
