#![no_std]

//! # Tic-Tac-Toe Channel
//!
//! Two seats, each escrowing the same bet. The first mover is drawn from the
//! seeded ring random source; moves are `[x, y]` word pairs. The winner
//! takes the pot, a draw refunds both bets.

mod game;

pub use game::TicTacToe;

statechan::channel_contract!(TicTacToeContract, TicTacToe);
