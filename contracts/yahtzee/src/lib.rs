#![no_std]

//! # Yahtzee Channel
//!
//! Any number of seats fill a thirteen-box score card each. Every roll
//! draws one ring value per rerolled die and then asks the ring for fresh
//! entropy. The pot is split in proportion to the final card totals,
//! including the 35-point upper bonus.

mod game;

pub use game::{Combo, Yahtzee, ALL_DICE, COMBOS, DICE, ROLLS};

statechan::channel_contract!(YahtzeeContract, Yahtzee);
