#![no_std]

//! # statechan
//!
//! Turn-based game state channels on Soroban.
//!
//! A match is played between 2 to 16 seats that escrow the same bet. Moves
//! normally land on-chain one `play` at a time, but at any point the seats
//! can agree off-chain on a later state, sign its canonical encoding, and
//! jump there with a single `request_fastforward`. A seat that stalls can be
//! timed out and forfeits the pot.
//!
//! ## Match flow
//! 1. Every seat deposits `bet_amount` of the configured token.
//! 2. Every seat commits `keccak256(secret)`, then reveals `secret` together
//!    with the commitment for its next ring reveal.
//! 3. `start` draws the first mover from the seeded random source and
//!    initialises the game.
//! 4. Seats `play` in turn (or fast-forward). Moves that need fresh entropy
//!    `request()` it, and the seat at the ring turn must reveal before play
//!    continues.
//! 5. Once the game is terminal the pot is paid out in proportion to
//!    `Game::goal`.
//!
//! ## Canonical blob
//! `[turn, control, random source (7 + N words), game words]`, each a 32-byte
//! big-endian word. `turn` is the replay watermark: a fast-forward must carry
//! a strictly larger one.
//!
//! Concrete games implement [`Game`] and get a contract from
//! [`channel_contract!`].

mod channel;
pub mod codec;
mod controller;
mod error;
pub mod events;
mod game;
pub mod quorum;
pub mod random;
pub mod settlement;
mod types;

pub use channel::{derive_initial_control, peek_turn, Channel};
pub use controller::Controller;
pub use error::{ChannelError, ErrorKind};
pub use game::Game;
pub use quorum::StateSignature;
pub use random::{RandomSource, RandomState, RingRandom};
pub use types::{ChannelConfig, Lifecycle, MatchRecord, Seat, TimerState};

#[cfg(any(test, feature = "testutils"))]
pub use random::TableRandom;

/// Declare a state channel contract `$contract` playing game `$game`.
///
/// Expands at the call site to a `#[contract]` struct whose entry points
/// forward to [`Controller`]. The invoking crate must depend on
/// `soroban-sdk`.
#[macro_export]
macro_rules! channel_contract {
    ($contract:ident, $game:ty) => {
        use soroban_sdk::{contract, contractimpl, Address, Bytes, BytesN, Env, Vec};
        use $crate::{
            ChannelConfig, ChannelError, Controller, Lifecycle, MatchRecord, RingRandom,
            StateSignature, TimerState,
        };

        #[contract]
        pub struct $contract;

        #[contractimpl]
        impl $contract {
            pub fn __constructor(env: Env, config: ChannelConfig) {
                Controller::<$game>::init(&env, config)
            }

            pub fn deposit(env: Env, player: Address, amount: i128) -> Result<(), ChannelError> {
                Controller::<$game>::deposit(&env, player, amount)
            }

            pub fn cancel_deposit(env: Env, caller: Address) -> Result<(), ChannelError> {
                Controller::<$game>::cancel_deposit(&env, caller)
            }

            pub fn commit(env: Env, player: Address, hash: BytesN<32>) -> Result<(), ChannelError> {
                Controller::<$game>::commit(&env, player, hash)
            }

            pub fn reveal_and_commit(
                env: Env,
                player: Address,
                secret: BytesN<32>,
                next: BytesN<32>,
            ) -> Result<(), ChannelError> {
                Controller::<$game>::reveal_and_commit(&env, player, secret, next)
            }

            pub fn start(env: Env, caller: Address, args: Bytes) -> Result<u32, ChannelError> {
                Controller::<$game>::start(&env, caller, args)
            }

            pub fn play(env: Env, player: Address, action: Bytes) -> Result<(), ChannelError> {
                Controller::<$game>::play(&env, player, action)
            }

            pub fn end(env: Env) -> Result<(), ChannelError> {
                Controller::<$game>::end(&env)
            }

            pub fn withdraw(env: Env, player: Address) -> Result<i128, ChannelError> {
                Controller::<$game>::withdraw(&env, player)
            }

            pub fn request_fastforward(
                env: Env,
                state: Bytes,
                signatures: Vec<StateSignature>,
            ) -> Result<(), ChannelError> {
                Controller::<$game>::request_fastforward(&env, state, signatures)
            }

            pub fn start_timer(env: Env, caller: Address, duration: u32) -> Result<u32, ChannelError> {
                Controller::<$game>::start_timer(&env, caller, duration)
            }

            pub fn timeout(env: Env) -> Result<u32, ChannelError> {
                Controller::<$game>::timeout(&env)
            }

            pub fn config(env: Env) -> Result<ChannelConfig, ChannelError> {
                Controller::<$game>::config(&env)
            }

            pub fn lifecycle(env: Env) -> Result<Lifecycle, ChannelError> {
                Controller::<$game>::lifecycle(&env)
            }

            pub fn record(env: Env) -> Result<MatchRecord, ChannelError> {
                Controller::<$game>::record(&env)
            }

            pub fn control(env: Env) -> Result<u32, ChannelError> {
                Controller::<$game>::control(&env)
            }

            pub fn turn(env: Env) -> Result<u32, ChannelError> {
                Controller::<$game>::turn(&env)
            }

            pub fn player_index(env: Env, player: Address) -> Result<u32, ChannelError> {
                Controller::<$game>::player_index(&env, player)
            }

            pub fn random(env: Env) -> Result<RingRandom, ChannelError> {
                Controller::<$game>::random(&env)
            }

            pub fn timer(env: Env) -> Result<Option<TimerState>, ChannelError> {
                Controller::<$game>::timer(&env)
            }

            pub fn terminal(env: Env) -> Result<bool, ChannelError> {
                Controller::<$game>::terminal(&env)
            }

            pub fn goal(env: Env, player: u32) -> Result<u32, ChannelError> {
                Controller::<$game>::goal(&env, player)
            }

            pub fn serialize(env: Env) -> Result<Bytes, ChannelError> {
                Controller::<$game>::serialize(&env)
            }
        }
    };
}
