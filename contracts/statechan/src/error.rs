use soroban_sdk::contracterror;

// ═══════════════════════════════════════════════════════════════════════════════
//  Errors
// ═══════════════════════════════════════════════════════════════════════════════
//
// Codes are grouped by kind so a client can classify a failure from the
// numeric code alone:
//   1xx  authorization   2xx  lifecycle / protocol state
//   3xx  validation      4xx  replay   5xx  timing

#[contracterror]
#[derive(Copy, Clone, Debug, Eq, PartialEq, PartialOrd, Ord)]
#[repr(u32)]
pub enum ChannelError {
    NotParticipant = 101,
    NotInControl = 102,
    OutOfOrderReveal = 103,
    NotOwner = 104,

    WrongPhase = 201,
    NotReady = 202,
    NotAllCommitted = 203,
    AlreadyCommitted = 204,
    AlreadyRevealed = 205,
    NoPendingUpdate = 206,
    DuplicateDeposit = 207,
    NotTerminal = 208,
    AlreadyTerminal = 209,
    NotSettleable = 210,
    AlreadyWithdrawn = 211,
    TimerAlreadyRunning = 212,
    TimerNotStarted = 213,
    NotConfigured = 214,

    WrongAmount = 301,
    InvalidReveal = 302,
    IllegalMove = 303,
    InvalidSignature = 304,
    OutOfRange = 305,
    ValueOverflow = 306,
    MalformedState = 307,
    InvalidConfig = 308,

    StaleOrInvalidTarget = 401,

    DeadlineNotReached = 501,
    TimerTooShort = 502,
}

/// Coarse classification of a [`ChannelError`].
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum ErrorKind {
    Authorization,
    State,
    Validation,
    Replay,
    Timing,
}

impl ChannelError {
    pub fn kind(&self) -> ErrorKind {
        match *self as u32 / 100 {
            1 => ErrorKind::Authorization,
            2 => ErrorKind::State,
            3 => ErrorKind::Validation,
            4 => ErrorKind::Replay,
            _ => ErrorKind::Timing,
        }
    }
}
