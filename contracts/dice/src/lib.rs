#![no_std]

//! # Dice Channel
//!
//! A fixed number of rounds; each round every seat may roll one die. Rolls
//! draw from the ring random source and immediately ask the ring for fresh
//! entropy, so the seat at the ring turn has to reveal before the next roll.
//! The pot is split in proportion to the final scores.
//!
//! `start` takes the number of rounds as its single argument word.

mod game;

pub use game::Dice;

statechan::channel_contract!(DiceContract, Dice);

#[cfg(test)]
mod test;
