use soroban_sdk::{Bytes, Env};

use crate::codec::{WordReader, WordWriter};
use crate::random::RandomSource;
use crate::ChannelError;

/// Rules of one concrete game.
///
/// Participants are addressed by their 1-based seat index. The controller
/// owns turn order and escrow and never looks inside the board; everything it
/// needs goes through this trait. Actions and init arguments are canonical
/// word blobs (see [`crate::codec`]).
pub trait Game: Sized {
    /// Exact number of words `encode_state` writes for `players` seats.
    fn state_words(players: u32) -> u32;

    /// State before `init`. Must encode to all-zero words.
    fn blank(env: &Env, players: u32) -> Self;

    /// Fresh game with `first` to act.
    fn init(env: &Env, players: u32, first: u32, args: &Bytes) -> Result<Self, ChannelError>;

    fn legal(&self, env: &Env, actor: u32, action: &Bytes) -> bool;

    /// Apply a legal action. Randomness is drawn from `rng`.
    fn update<R: RandomSource>(
        &mut self,
        env: &Env,
        actor: u32,
        action: &Bytes,
        rng: &mut R,
    ) -> Result<(), ChannelError>;

    /// Seat to act after `actor` has moved.
    fn next(&self, actor: u32) -> u32;

    fn terminal(&self) -> bool;

    /// Payout weight of `player`.
    fn goal(&self, player: u32) -> u32;

    fn encode_state(&self, w: &mut WordWriter);

    /// Inverse of `encode_state`; rejects out-of-domain values.
    fn set_state(env: &Env, players: u32, r: &mut WordReader) -> Result<Self, ChannelError>;
}
