//! Commit-reveal ring random source.
//!
//! ## Seeding
//! Every participant commits `keccak256(secret)`; once all `N` commitments
//! are in, each participant reveals. Reveals are XORed into `seed`, and the
//! reveal call also stores the participant's *next* commitment, which is
//! spent later during a ring refresh.
//!
//! ## Ring refresh
//! After seeding, `next()` walks a hash chain from the seed:
//! `current' = keccak256(current)`. When a consumer needs entropy no
//! participant could have predicted, it calls `request()`. The participant at
//! `ring_turn` must then reveal the secret behind their stored commitment,
//! which is XORed into the seed and restarts the chain. `ring_turn` rotates.
//!
//! ## Serialized layout (7 + N words)
//! ```text
//! [state, ring_turn, seed, current, index, committed_mask, revealed_mask,
//!  commit_1 .. commit_N]
//! ```

use soroban_sdk::{contracttype, BytesN, Env, Vec};

use crate::codec::{self, WordReader, WordWriter};
use crate::ChannelError;

/// Largest ring supported; commit/reveal progress is tracked in `u32` masks.
pub const MAX_PLAYERS: u32 = 16;

/// Number of fixed words preceding the per-participant commitments.
pub const HEADER_WORDS: u32 = 7;

/// Consumer-facing side of a random source.
pub trait RandomSource {
    fn ready(&self) -> bool;
    fn current(&self) -> Result<BytesN<32>, ChannelError>;
    fn next(&mut self, env: &Env) -> Result<BytesN<32>, ChannelError>;
    fn request(&mut self) -> Result<(), ChannelError>;
}

#[contracttype]
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[repr(u32)]
pub enum RandomState {
    CommittingSeed = 0,
    RevealingSeed = 1,
    Ready = 2,
    PendingUpdate = 3,
}

impl RandomState {
    fn from_u32(value: u32) -> Result<Self, ChannelError> {
        match value {
            0 => Ok(Self::CommittingSeed),
            1 => Ok(Self::RevealingSeed),
            2 => Ok(Self::Ready),
            3 => Ok(Self::PendingUpdate),
            _ => Err(ChannelError::MalformedState),
        }
    }
}

/// What a successful `reveal_and_commit` did.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Revealed {
    /// Seeding reveal; other participants still have to reveal.
    Seeding,
    /// Last seeding reveal; the source is now ready.
    Seeded,
    /// Ring reveal answering a `request()`.
    Refreshed,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RingRandom {
    pub state: RandomState,
    pub ring_turn: u32,
    pub seed: BytesN<32>,
    pub current: BytesN<32>,
    pub index: u32,
    pub committed: u32,
    pub revealed: u32,
    pub commits: Vec<BytesN<32>>,
}

impl RingRandom {
    pub fn new(env: &Env, players: u32) -> Self {
        let mut commits = Vec::new(env);
        for _ in 0..players {
            commits.push_back(codec::zero(env));
        }
        Self {
            state: RandomState::CommittingSeed,
            ring_turn: 0,
            seed: codec::zero(env),
            current: codec::zero(env),
            index: 0,
            committed: 0,
            revealed: 0,
            commits,
        }
    }

    pub fn players(&self) -> u32 {
        self.commits.len()
    }

    fn full_mask(&self) -> u32 {
        full_mask(self.players())
    }

    fn check_slot(&self, slot: u32) -> Result<(), ChannelError> {
        if slot >= self.players() {
            return Err(ChannelError::NotParticipant);
        }
        Ok(())
    }

    /// Stored commitment for a 0-based slot.
    pub fn commit_of(&self, slot: u32) -> Result<BytesN<32>, ChannelError> {
        self.commits.get(slot).ok_or(ChannelError::NotParticipant)
    }

    /// Record the seeding commitment of `slot` (0-based).
    pub fn commit(&mut self, slot: u32, hash: BytesN<32>) -> Result<(), ChannelError> {
        self.check_slot(slot)?;
        let bit = 1u32 << slot;
        if self.committed & bit != 0 {
            return Err(ChannelError::AlreadyCommitted);
        }
        if self.state != RandomState::CommittingSeed {
            return Err(ChannelError::WrongPhase);
        }

        self.commits.set(slot, hash);
        self.committed |= bit;
        if self.committed == self.full_mask() {
            self.state = RandomState::RevealingSeed;
        }
        Ok(())
    }

    /// Reveal the secret behind `slot`'s stored commitment and replace it
    /// with `next`.
    pub fn reveal_and_commit(
        &mut self,
        env: &Env,
        slot: u32,
        secret: &BytesN<32>,
        next: BytesN<32>,
    ) -> Result<Revealed, ChannelError> {
        self.check_slot(slot)?;
        let bit = 1u32 << slot;

        match self.state {
            RandomState::CommittingSeed => Err(ChannelError::NotAllCommitted),
            RandomState::Ready => Err(ChannelError::NoPendingUpdate),
            RandomState::RevealingSeed => {
                if self.revealed & bit != 0 {
                    return Err(ChannelError::AlreadyRevealed);
                }
                self.absorb(env, slot, secret, next)?;
                self.revealed |= bit;
                if self.revealed == self.full_mask() {
                    self.state = RandomState::Ready;
                    Ok(Revealed::Seeded)
                } else {
                    Ok(Revealed::Seeding)
                }
            }
            RandomState::PendingUpdate => {
                if slot != self.ring_turn {
                    return Err(ChannelError::OutOfOrderReveal);
                }
                self.absorb(env, slot, secret, next)?;
                self.ring_turn = (self.ring_turn + 1) % self.players();
                self.state = RandomState::Ready;
                Ok(Revealed::Refreshed)
            }
        }
    }

    fn absorb(
        &mut self,
        env: &Env,
        slot: u32,
        secret: &BytesN<32>,
        next: BytesN<32>,
    ) -> Result<(), ChannelError> {
        if codec::hash(env, secret) != self.commit_of(slot)? {
            return Err(ChannelError::InvalidReveal);
        }
        self.seed = codec::xor(env, &self.seed, secret);
        self.current = self.seed.clone();
        self.index = 0;
        self.commits.set(slot, next);
        Ok(())
    }

    /// Forget every commitment and go back to seeding.
    pub fn reset(&mut self, env: &Env) {
        *self = Self::new(env, self.players());
    }

    pub fn serialize(&self, w: &mut WordWriter) {
        w.u32(self.state as u32)
            .u32(self.ring_turn)
            .word(&self.seed)
            .word(&self.current)
            .u32(self.index)
            .u32(self.committed)
            .u32(self.revealed);
        for commit in self.commits.iter() {
            w.word(&commit);
        }
    }

    /// Inverse of [`serialize`](Self::serialize) for a ring of `players`.
    pub fn deserialize(
        env: &Env,
        players: u32,
        r: &mut WordReader,
    ) -> Result<Self, ChannelError> {
        if players == 0 || players > MAX_PLAYERS {
            return Err(ChannelError::MalformedState);
        }
        let state = RandomState::from_u32(r.u32()?)?;
        let ring_turn = r.u32()?;
        let seed = r.word()?;
        let current = r.word()?;
        let index = r.u32()?;
        let committed = r.u32()?;
        let revealed = r.u32()?;

        let full = full_mask(players);
        if ring_turn >= players || committed & !full != 0 || revealed & !full != 0 {
            return Err(ChannelError::MalformedState);
        }
        let consistent = match state {
            RandomState::CommittingSeed => committed != full && revealed == 0,
            RandomState::RevealingSeed => committed == full && revealed != full,
            RandomState::Ready | RandomState::PendingUpdate => {
                committed == full && revealed == full
            }
        };
        if !consistent {
            return Err(ChannelError::MalformedState);
        }

        let mut commits = Vec::new(env);
        for _ in 0..players {
            commits.push_back(r.word()?);
        }

        Ok(Self {
            state,
            ring_turn,
            seed,
            current,
            index,
            committed,
            revealed,
            commits,
        })
    }
}

impl RandomSource for RingRandom {
    fn ready(&self) -> bool {
        self.state == RandomState::Ready
    }

    fn current(&self) -> Result<BytesN<32>, ChannelError> {
        if !self.ready() {
            return Err(ChannelError::NotReady);
        }
        Ok(self.current.clone())
    }

    fn next(&mut self, env: &Env) -> Result<BytesN<32>, ChannelError> {
        if !self.ready() {
            return Err(ChannelError::NotReady);
        }
        self.current = codec::hash(env, &self.current);
        self.index = self.index.checked_add(1).ok_or(ChannelError::ValueOverflow)?;
        Ok(self.current.clone())
    }

    fn request(&mut self) -> Result<(), ChannelError> {
        match self.state {
            RandomState::Ready => {
                self.state = RandomState::PendingUpdate;
                Ok(())
            }
            RandomState::PendingUpdate => Ok(()),
            _ => Err(ChannelError::NotReady),
        }
    }
}

fn full_mask(players: u32) -> u32 {
    if players >= 32 {
        u32::MAX
    } else {
        (1u32 << players) - 1
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
//  Table source (tests)
// ═══════════════════════════════════════════════════════════════════════════════

/// Replays a fixed table. The cursor starts on `table[0]`, so the first
/// `next()` yields `table[1]`; `request()` rewinds the cursor.
#[cfg(any(test, feature = "testutils"))]
pub struct TableRandom {
    table: Vec<BytesN<32>>,
    index: u32,
}

#[cfg(any(test, feature = "testutils"))]
impl TableRandom {
    pub fn new(env: &Env, values: &[u32]) -> Self {
        let mut table = Vec::new(env);
        for value in values {
            table.push_back(codec::from_u32(env, *value));
        }
        Self { table, index: 0 }
    }
}

#[cfg(any(test, feature = "testutils"))]
impl RandomSource for TableRandom {
    fn ready(&self) -> bool {
        true
    }

    fn current(&self) -> Result<BytesN<32>, ChannelError> {
        if self.table.is_empty() {
            return Err(ChannelError::OutOfRange);
        }
        self.table
            .get(self.index % self.table.len())
            .ok_or(ChannelError::OutOfRange)
    }

    fn next(&mut self, _env: &Env) -> Result<BytesN<32>, ChannelError> {
        self.index += 1;
        self.current()
    }

    fn request(&mut self) -> Result<(), ChannelError> {
        self.index = 0;
        Ok(())
    }
}
