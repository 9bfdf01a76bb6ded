use soroban_sdk::{Bytes, BytesN, Env};

use crate::codec::{self, WordReader, WordWriter};
use crate::game::Game;
use crate::random::{RingRandom, HEADER_WORDS};
use crate::ChannelError;

/// The canonical state of a match: `[turn, control, random..., game...]`.
///
/// Its serialized form is what the controller persists, what participants
/// sign off-chain, and what `request_fastforward` accepts.
pub struct Channel<G: Game> {
    pub turn: u32,
    pub control: u32,
    pub rng: RingRandom,
    pub game: G,
}

impl<G: Game> Channel<G> {
    /// Pre-start channel; serializes to all zeros.
    pub fn blank(env: &Env, players: u32) -> Self {
        Self {
            turn: 0,
            control: 0,
            rng: RingRandom::new(env, players),
            game: G::blank(env, players),
        }
    }

    pub fn words(players: u32) -> u32 {
        2 + HEADER_WORDS + players + G::state_words(players)
    }

    pub fn serialize(&self, env: &Env) -> Bytes {
        let mut w = WordWriter::new(env);
        w.u32(self.turn).u32(self.control);
        self.rng.serialize(&mut w);
        self.game.encode_state(&mut w);
        w.into_bytes()
    }

    pub fn deserialize(env: &Env, players: u32, blob: &Bytes) -> Result<Self, ChannelError> {
        if codec::word_count(blob)? != Self::words(players) {
            return Err(ChannelError::MalformedState);
        }
        let mut r = WordReader::new(env, blob)?;
        let turn = r.u32()?;
        let control = r.u32()?;
        // control is 0 only before start
        if control > players || (control == 0) != (turn == 0) {
            return Err(ChannelError::MalformedState);
        }
        let rng = RingRandom::deserialize(env, players, &mut r)?;
        let game = G::set_state(env, players, &mut r)?;
        r.finish()?;
        Ok(Self {
            turn,
            control,
            rng,
            game,
        })
    }
}

/// Seat (1-based) that moves first, drawn from the first random value after
/// seeding.
pub fn derive_initial_control(draw: &BytesN<32>, players: u32) -> u32 {
    codec::rem(draw, players) + 1
}

/// Leading `turn` word of a canonical blob.
pub fn peek_turn(env: &Env, blob: &Bytes) -> Result<u32, ChannelError> {
    let head = codec::decode(env, blob, 0, 1)?;
    let word = head.get(0).ok_or(ChannelError::OutOfRange)?;
    codec::to_u32(&word)
}
