//! Pot division.
//!
//! * Finished game: proportional to `Game::goal`, floored; the remainder goes
//!   to the first seat with a positive weight. All-zero weights split evenly.
//! * Timeout: the offender forfeits, the others split the pot evenly.
//! * Cancelled: each seat gets its own deposit back.

use soroban_sdk::{Env, Vec};

use crate::types::Seat;
use crate::ChannelError;

/// Per-seat payout for weights `weights[i]` over `pot`.
pub fn weighted_shares(env: &Env, pot: i128, weights: &Vec<u32>) -> Result<Vec<i128>, ChannelError> {
    let total: i128 = weights.iter().map(|w| w as i128).sum();
    if total == 0 && !weights.is_empty() {
        let mut all = Vec::new(env);
        for _ in 0..weights.len() {
            all.push_back(1u32);
        }
        return weighted_shares(env, pot, &all);
    }

    let mut shares = Vec::new(env);
    if weights.is_empty() {
        return Ok(shares);
    }
    let mut paid: i128 = 0;
    for w in weights.iter() {
        let share = pot
            .checked_mul(w as i128)
            .ok_or(ChannelError::ValueOverflow)?
            / total;
        paid += share;
        shares.push_back(share);
    }

    let dust = pot - paid;
    if dust > 0 {
        if let Some(first) = weights.iter().position(|w| w > 0) {
            let first = first as u32;
            let share = shares.get(first).unwrap_or(0);
            shares.set(first, share + dust);
        }
    }
    Ok(shares)
}

/// Even split among everyone but `offender` (1-based).
pub fn forfeit_shares(
    env: &Env,
    pot: i128,
    players: u32,
    offender: u32,
) -> Result<Vec<i128>, ChannelError> {
    let mut weights = Vec::new(env);
    for seat in 1..=players {
        weights.push_back(if seat == offender { 0 } else { 1 });
    }
    weighted_shares(env, pot, &weights)
}

pub fn refunds(env: &Env, seats: &Vec<Seat>) -> Vec<i128> {
    let mut out = Vec::new(env);
    for seat in seats.iter() {
        out.push_back(seat.deposited);
    }
    out
}

pub fn pot(seats: &Vec<Seat>) -> i128 {
    seats.iter().map(|s| s.deposited).sum()
}
