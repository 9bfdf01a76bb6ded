#![no_std]

//! # Ring Random
//!
//! Standalone commit-reveal ring random source. Participants seed it with a
//! blind commit/reveal round; afterwards the owner (typically a game
//! contract) pulls values with `next` and asks for fresh entropy with
//! `request`, which the participant at the ring turn answers with
//! `reveal_and_commit`.
//!
//! Participants are addressed by address; internally they occupy 0-based
//! ring slots in constructor order.

use soroban_sdk::{
    contract, contractevent, contractimpl, contracttype, panic_with_error, Address, Bytes, BytesN,
    Env, Vec,
};
use statechan::codec::{WordReader, WordWriter};
use statechan::random::MAX_PLAYERS;
use statechan::{ChannelError, RandomSource, RandomState, RingRandom};

// ═══════════════════════════════════════════════════════════════════════════════
//  Contract Events
// ═══════════════════════════════════════════════════════════════════════════════

#[contractevent]
pub struct EvCommitted {
    pub player: Address,
}

#[contractevent]
pub struct EvRevealed {
    pub player: Address,
}

#[contractevent]
pub struct EvRandomGenerated {
    pub index: u32,
    pub number: BytesN<32>,
}

#[contractevent]
pub struct EvStateChanged {
    pub state: RandomState,
}

// ═══════════════════════════════════════════════════════════════════════════════
//  Storage
// ═══════════════════════════════════════════════════════════════════════════════

#[contracttype]
#[derive(Clone)]
enum DataKey {
    Owner,
    Players,
    Random,
}

// Ledger rate is approximately 5 seconds per ledger on Stellar
const LEDGER_RATE_SECS: u32 = 5;
const TTL_SECONDS: u32 = 30 * 24 * 60 * 60;
const RANDOM_TTL_LEDGERS: u32 = TTL_SECONDS / LEDGER_RATE_SECS;

// ═══════════════════════════════════════════════════════════════════════════════
//  Contract
// ═══════════════════════════════════════════════════════════════════════════════

#[contract]
pub struct RingRandomContract;

#[contractimpl]
impl RingRandomContract {
    pub fn __constructor(env: Env, owner: Address, players: Vec<Address>) {
        let n = players.len();
        if !(2..=MAX_PLAYERS).contains(&n) {
            panic_with_error!(&env, ChannelError::InvalidConfig);
        }
        for i in 0..n {
            for j in (i + 1)..n {
                if players.get(i) == players.get(j) {
                    panic_with_error!(&env, ChannelError::InvalidConfig);
                }
            }
        }
        env.storage().instance().set(&DataKey::Owner, &owner);
        env.storage().instance().set(&DataKey::Players, &players);
        Self::write_random(&env, &RingRandom::new(&env, n));
    }

    // ───────────────────────────────────────────────────────────────────────────
    //  Public: Participants
    // ───────────────────────────────────────────────────────────────────────────

    pub fn commit(env: Env, player: Address, hash: BytesN<32>) -> Result<(), ChannelError> {
        player.require_auth();

        let slot = Self::slot_of(&env, &player)?;
        let mut rng = Self::read_random(&env)?;
        let before = rng.state;
        rng.commit(slot, hash)?;

        EvCommitted { player }.publish(&env);
        Self::publish_transition(&env, before, rng.state);
        Self::write_random(&env, &rng);
        Ok(())
    }

    pub fn reveal_and_commit(
        env: Env,
        player: Address,
        secret: BytesN<32>,
        next: BytesN<32>,
    ) -> Result<(), ChannelError> {
        player.require_auth();

        let slot = Self::slot_of(&env, &player)?;
        let mut rng = Self::read_random(&env)?;
        let before = rng.state;
        rng.reveal_and_commit(&env, slot, &secret, next)?;

        EvRevealed { player }.publish(&env);
        Self::publish_transition(&env, before, rng.state);
        Self::write_random(&env, &rng);
        Ok(())
    }

    // ───────────────────────────────────────────────────────────────────────────
    //  Public: Owner
    // ───────────────────────────────────────────────────────────────────────────

    pub fn next(env: Env, owner: Address) -> Result<BytesN<32>, ChannelError> {
        Self::require_owner(&env, &owner)?;

        let mut rng = Self::read_random(&env)?;
        let number = rng.next(&env)?;
        EvRandomGenerated {
            index: rng.index,
            number: number.clone(),
        }
        .publish(&env);
        Self::write_random(&env, &rng);
        Ok(number)
    }

    pub fn request(env: Env, owner: Address) -> Result<(), ChannelError> {
        Self::require_owner(&env, &owner)?;

        let mut rng = Self::read_random(&env)?;
        let before = rng.state;
        rng.request()?;
        Self::publish_transition(&env, before, rng.state);
        Self::write_random(&env, &rng);
        Ok(())
    }

    pub fn reset(env: Env, owner: Address) -> Result<(), ChannelError> {
        Self::require_owner(&env, &owner)?;

        let mut rng = Self::read_random(&env)?;
        let before = rng.state;
        rng.reset(&env);
        Self::publish_transition(&env, before, rng.state);
        Self::write_random(&env, &rng);
        Ok(())
    }

    /// Replace the whole state with a canonical blob (see `serialize`).
    pub fn deserialize_by_owner(env: Env, owner: Address, state: Bytes) -> Result<(), ChannelError> {
        Self::require_owner(&env, &owner)?;

        let n = Self::load_players(&env)?.len();
        let before = Self::read_random(&env)?.state;
        let mut reader = WordReader::new(&env, &state)?;
        let rng = RingRandom::deserialize(&env, n, &mut reader)?;
        reader.finish()?;

        Self::publish_transition(&env, before, rng.state);
        Self::write_random(&env, &rng);
        Ok(())
    }

    // ───────────────────────────────────────────────────────────────────────────
    //  Public: Read
    // ───────────────────────────────────────────────────────────────────────────

    pub fn ready(env: Env) -> Result<bool, ChannelError> {
        Ok(Self::read_random(&env)?.ready())
    }

    pub fn current(env: Env) -> Result<BytesN<32>, ChannelError> {
        Self::read_random(&env)?.current()
    }

    pub fn seed(env: Env) -> Result<BytesN<32>, ChannelError> {
        Ok(Self::read_random(&env)?.seed)
    }

    pub fn index(env: Env) -> Result<u32, ChannelError> {
        Ok(Self::read_random(&env)?.index)
    }

    pub fn ring_turn(env: Env) -> Result<u32, ChannelError> {
        Ok(Self::read_random(&env)?.ring_turn)
    }

    pub fn state(env: Env) -> Result<RandomState, ChannelError> {
        Ok(Self::read_random(&env)?.state)
    }

    pub fn player_count(env: Env) -> Result<u32, ChannelError> {
        Ok(Self::load_players(&env)?.len())
    }

    pub fn commit_of(env: Env, player: Address) -> Result<BytesN<32>, ChannelError> {
        let slot = Self::slot_of(&env, &player)?;
        Self::read_random(&env)?.commit_of(slot)
    }

    pub fn serialize(env: Env) -> Result<Bytes, ChannelError> {
        let rng = Self::read_random(&env)?;
        let mut writer = WordWriter::new(&env);
        rng.serialize(&mut writer);
        Ok(writer.into_bytes())
    }

    pub fn owner(env: Env) -> Result<Address, ChannelError> {
        Self::load_owner(&env)
    }

    // ═══════════════════════════════════════════════════════════════════════════
    //  Internal
    // ═══════════════════════════════════════════════════════════════════════════

    fn publish_transition(env: &Env, before: RandomState, after: RandomState) {
        if before != after {
            EvStateChanged { state: after }.publish(env);
        }
    }

    fn require_owner(env: &Env, caller: &Address) -> Result<(), ChannelError> {
        caller.require_auth();
        if *caller != Self::load_owner(env)? {
            return Err(ChannelError::NotOwner);
        }
        Ok(())
    }

    fn slot_of(env: &Env, player: &Address) -> Result<u32, ChannelError> {
        Self::load_players(env)?
            .first_index_of(player)
            .ok_or(ChannelError::NotParticipant)
    }

    fn load_owner(env: &Env) -> Result<Address, ChannelError> {
        env.storage()
            .instance()
            .get(&DataKey::Owner)
            .ok_or(ChannelError::NotConfigured)
    }

    fn load_players(env: &Env) -> Result<Vec<Address>, ChannelError> {
        env.storage()
            .instance()
            .get(&DataKey::Players)
            .ok_or(ChannelError::NotConfigured)
    }

    fn read_random(env: &Env) -> Result<RingRandom, ChannelError> {
        env.storage()
            .instance()
            .get(&DataKey::Random)
            .ok_or(ChannelError::NotConfigured)
    }

    fn write_random(env: &Env, rng: &RingRandom) {
        env.storage().instance().set(&DataKey::Random, rng);
        env.storage()
            .instance()
            .extend_ttl(RANDOM_TTL_LEDGERS, RANDOM_TTL_LEDGERS);
    }
}
