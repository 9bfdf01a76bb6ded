#![cfg(test)]

use crate::{Dice, DiceContract, DiceContractClient};
use soroban_sdk::testutils::{Address as _, Ledger as _};
use soroban_sdk::token::{StellarAssetClient, TokenClient};
use soroban_sdk::{vec, Address, Bytes, BytesN, Env};
use statechan::codec::{self, WordReader, WordWriter};
use statechan::{ChannelConfig, ChannelError, Game, Lifecycle, RandomState, TableRandom};

const BET: i128 = 100;
const DEPOSIT_DURATION: u32 = 50;
const MIN_TIMER: u32 = 10;

// ════════════════════════════════════════════════════════════════════════════
//  Test Helpers
// ════════════════════════════════════════════════════════════════════════════

fn words(env: &Env, values: &[u32]) -> Bytes {
    let mut w = WordWriter::new(env);
    for value in values {
        w.u32(*value);
    }
    w.into_bytes()
}

fn roll(env: &Env) -> Bytes {
    words(env, &[1])
}

fn pass(env: &Env) -> Bytes {
    words(env, &[0])
}

fn word(env: &Env, value: u32) -> BytesN<32> {
    codec::from_u32(env, value)
}

fn commitment(env: &Env, value: u32) -> BytesN<32> {
    codec::hash(env, &word(env, value))
}

fn advance_ledger(env: &Env, delta: u32) {
    let info = env.ledger().get();
    env.ledger().set(soroban_sdk::testutils::LedgerInfo {
        timestamp: info.timestamp + (delta as u64) * 5,
        protocol_version: info.protocol_version,
        sequence_number: info.sequence_number + delta,
        network_id: info.network_id,
        base_reserve: info.base_reserve,
        min_temp_entry_ttl: info.min_temp_entry_ttl,
        min_persistent_entry_ttl: info.min_persistent_entry_ttl,
        max_entry_ttl: info.max_entry_ttl,
    });
}

fn assert_channel_error<T, E>(
    result: &Result<Result<T, E>, Result<ChannelError, soroban_sdk::InvokeError>>,
    expected: ChannelError,
) {
    match result {
        Err(Ok(actual)) => {
            assert_eq!(
                *actual, expected,
                "Expected error {:?} ({}), got {:?} ({})",
                expected, expected as u32, actual, *actual as u32
            );
        }
        Err(Err(invoke_err)) => {
            panic!(
                "Expected {:?} ({}), got invoke error: {:?}",
                expected, expected as u32, invoke_err
            );
        }
        Ok(_) => {
            panic!(
                "Expected error {:?} ({}), but operation succeeded",
                expected, expected as u32
            );
        }
    }
}

struct Match {
    env: Env,
    client: DiceContractClient<'static>,
    token: TokenClient<'static>,
    p1: Address,
    p2: Address,
}

/// Deposited, seeded with 1337/9001 and started for `rounds`; seat 1 first.
fn started(rounds: u32) -> Match {
    let env = Env::default();
    env.mock_all_auths();

    env.ledger().set(soroban_sdk::testutils::LedgerInfo {
        timestamp: 1_700_000_000,
        protocol_version: 25,
        sequence_number: 100,
        network_id: Default::default(),
        base_reserve: 10,
        min_temp_entry_ttl: u32::MAX / 2,
        min_persistent_entry_ttl: u32::MAX / 2,
        max_entry_ttl: u32::MAX / 2,
    });

    let p1 = Address::generate(&env);
    let p2 = Address::generate(&env);
    let asset = env.register_stellar_asset_contract_v2(Address::generate(&env));
    let minter = StellarAssetClient::new(&env, &asset.address());
    minter.mint(&p1, &1_000);
    minter.mint(&p2, &1_000);

    let config = ChannelConfig {
        players: vec![&env, p1.clone(), p2.clone()],
        signers: vec![
            &env,
            BytesN::from_array(&env, &[4u8; 65]),
            BytesN::from_array(&env, &[5u8; 65]),
        ],
        token: asset.address(),
        bet_amount: BET,
        deposit_duration: DEPOSIT_DURATION,
        min_timer_duration: MIN_TIMER,
    };
    let contract_id = env.register(DiceContract, (config,));
    let client = DiceContractClient::new(&env, &contract_id);

    client.deposit(&p1, &BET);
    client.deposit(&p2, &BET);
    client.commit(&p1, &commitment(&env, 1337));
    client.commit(&p2, &commitment(&env, 9001));
    client.reveal_and_commit(&p1, &word(&env, 1337), &commitment(&env, 1338));
    client.reveal_and_commit(&p2, &word(&env, 9001), &commitment(&env, 9002));
    client.start(&p1, &words(&env, &[rounds]));

    let token = TokenClient::new(&env, &asset.address());
    Match {
        env,
        client,
        token,
        p1,
        p2,
    }
}

fn decode(env: &Env, game: &Dice) -> Dice {
    let mut w = WordWriter::new(env);
    game.encode_state(&mut w);
    let blob = w.into_bytes();
    let mut r = WordReader::new(env, &blob).unwrap();
    let decoded = Dice::set_state(env, game.players(), &mut r).unwrap();
    r.finish().unwrap();
    decoded
}

// ════════════════════════════════════════════════════════════════════════════
//  Rules
// ════════════════════════════════════════════════════════════════════════════

#[test]
fn test_init_takes_rounds() {
    let env = Env::default();
    let game = Dice::init(&env, 2, 2, &words(&env, &[3])).unwrap();
    assert_eq!(game.rounds_left, 3);
    assert_eq!(game.first, 2);
    assert_eq!(game.goal(1), 0);
    assert!(!game.terminal());

    assert_eq!(
        Dice::init(&env, 2, 1, &Bytes::new(&env)),
        Err(ChannelError::InvalidConfig)
    );
    assert_eq!(
        Dice::init(&env, 2, 1, &words(&env, &[0])),
        Err(ChannelError::InvalidConfig)
    );
    assert_eq!(
        Dice::init(&env, 2, 1, &words(&env, &[1, 1])),
        Err(ChannelError::InvalidConfig)
    );
}

#[test]
fn test_blank_is_not_terminal() {
    let env = Env::default();
    let game = Dice::blank(&env, 3);
    assert!(!game.terminal());
    assert_eq!(Dice::state_words(3), 5);
}

#[test]
fn test_rolls_over_three_rounds() {
    let env = Env::default();
    let mut game = Dice::init(&env, 2, 1, &words(&env, &[3])).unwrap();
    let mut rng = TableRandom::new(&env, &[0, 1, 2, 3, 4, 5]);

    let mut actor = 1;
    for _ in 0..6 {
        assert!(!game.terminal());
        assert!(game.legal(&env, actor, &roll(&env)));
        game.update(&env, actor, &roll(&env), &mut rng).unwrap();
        actor = game.next(actor);
    }

    assert!(game.terminal());
    assert_eq!(game.goal(1), 6);
    assert_eq!(game.goal(2), 6);
    assert!(!game.legal(&env, 1, &roll(&env)));
}

#[test]
fn test_each_roll_is_one_draw() {
    let env = Env::default();
    let mut game = Dice::init(&env, 2, 1, &words(&env, &[1])).unwrap();

    game.update(&env, 1, &roll(&env), &mut TableRandom::new(&env, &[1]))
        .unwrap();
    game.update(&env, 2, &roll(&env), &mut TableRandom::new(&env, &[5]))
        .unwrap();

    assert!(game.terminal());
    assert_eq!(game.goal(1), 2);
    assert_eq!(game.goal(2), 6);
}

#[test]
fn test_round_ends_when_back_at_first() {
    let env = Env::default();
    let mut game = Dice::init(&env, 3, 2, &words(&env, &[2])).unwrap();
    let mut rng = TableRandom::new(&env, &[0]);

    game.update(&env, 2, &pass(&env), &mut rng).unwrap();
    game.update(&env, 3, &pass(&env), &mut rng).unwrap();
    assert_eq!(game.rounds_left, 2);
    assert_eq!(game.next(3), 1);
    game.update(&env, 1, &roll(&env), &mut rng).unwrap();
    assert_eq!(game.rounds_left, 1);
    assert_eq!(game.goal(1), 1);
    assert_eq!(game.goal(2), 0);
}

#[test]
fn test_malformed_actions_are_illegal() {
    let env = Env::default();
    let game = Dice::init(&env, 2, 1, &words(&env, &[1])).unwrap();
    assert!(game.legal(&env, 1, &pass(&env)));
    assert!(!game.legal(&env, 1, &words(&env, &[2])));
    assert!(!game.legal(&env, 1, &words(&env, &[1, 1])));
    assert!(!game.legal(&env, 1, &Bytes::new(&env)));
    assert!(!game.legal(&env, 1, &Bytes::from_array(&env, &[1u8; 3])));
}

#[test]
fn test_state_words_round_trip() {
    let env = Env::default();
    let mut game = Dice::init(&env, 2, 2, &words(&env, &[4])).unwrap();
    game.update(&env, 2, &roll(&env), &mut TableRandom::new(&env, &[3]))
        .unwrap();
    assert_eq!(decode(&env, &game), game);
}

#[test]
fn test_set_state_rejects_unknown_first() {
    let env = Env::default();
    let blob = words(&env, &[1, 3, 0, 0]);
    let mut r = WordReader::new(&env, &blob).unwrap();
    assert_eq!(
        Dice::set_state(&env, 2, &mut r),
        Err(ChannelError::MalformedState)
    );
}

// ════════════════════════════════════════════════════════════════════════════
//  Controller
// ════════════════════════════════════════════════════════════════════════════

#[test]
fn test_start_draws_first_seat() {
    let m = started(2);
    assert_eq!(m.client.control(), 1);
    assert_eq!(m.client.turn(), 1);

    let blob = m.client.serialize();
    assert_eq!(blob.len(), (2 + 9 + 4) * codec::WORD_SIZE);
}

#[test]
fn test_roll_requests_ring_refresh() {
    let m = started(1);
    m.client.play(&m.p1, &roll(&m.env));

    let rng = m.client.random();
    assert_eq!(rng.state, RandomState::PendingUpdate);
    assert_eq!(rng.ring_turn, 0);
    assert_eq!(m.client.control(), 2);

    // nothing to draw from until seat 1 reveals
    assert_channel_error(
        &m.client.try_play(&m.p2, &roll(&m.env)),
        ChannelError::NotReady,
    );
    assert_eq!(m.client.turn(), 2);
}

#[test]
fn test_ring_reveal_then_finish() {
    let m = started(1);
    m.client.play(&m.p1, &roll(&m.env));
    m.client.reveal_and_commit(
        &m.p1,
        &word(&m.env, 1338),
        &commitment(&m.env, 1339),
    );
    assert_eq!(m.client.random().state, RandomState::Ready);
    assert_eq!(m.client.random().ring_turn, 1);

    m.client.play(&m.p2, &roll(&m.env));
    assert_eq!(m.client.lifecycle(), Lifecycle::Terminal);
    assert_eq!(m.client.random().ring_turn, 1);

    let g1 = m.client.goal(&1);
    let g2 = m.client.goal(&2);
    assert!((1..=6).contains(&g1));
    assert!((1..=6).contains(&g2));

    let paid = m.client.withdraw(&m.p1) + m.client.withdraw(&m.p2);
    assert_eq!(paid, 2 * BET);
    assert_eq!(m.token.balance(&m.client.address), 0);
}

#[test]
fn test_pass_does_not_touch_ring() {
    let m = started(2);
    m.client.play(&m.p1, &pass(&m.env));
    m.client.play(&m.p2, &pass(&m.env));
    assert_eq!(m.client.random().state, RandomState::Ready);
    assert_eq!(m.client.random().index, 1);
    assert_eq!(m.client.lifecycle(), Lifecycle::Playing);
}

#[test]
fn test_timeout_blames_pending_revealer() {
    let m = started(1);
    m.client.play(&m.p1, &roll(&m.env));

    // seat 2 holds control but seat 1 owes the reveal
    m.client.start_timer(&m.p2, &MIN_TIMER);
    let timer = m.client.timer().unwrap();
    assert!(!timer.rng_ready);
    assert_eq!(timer.control, 2);
    assert_eq!(timer.offender(), 1);

    advance_ledger(&m.env, MIN_TIMER);
    assert_eq!(m.client.timeout(), 1);
    assert_eq!(m.client.withdraw(&m.p2), 2 * BET);
    assert_eq!(m.client.withdraw(&m.p1), 0);
    assert_eq!(m.token.balance(&m.p2), 1_000 + BET);
}

#[test]
fn test_reveal_clears_timer() {
    let m = started(1);
    m.client.play(&m.p1, &roll(&m.env));
    m.client.start_timer(&m.p2, &MIN_TIMER);

    m.client.reveal_and_commit(
        &m.p1,
        &word(&m.env, 1338),
        &commitment(&m.env, 1339),
    );
    assert_eq!(m.client.timer(), None);

    advance_ledger(&m.env, MIN_TIMER);
    assert_channel_error(&m.client.try_timeout(), ChannelError::TimerNotStarted);
}

#[test]
fn test_reveal_out_of_ring_order() {
    let m = started(1);
    m.client.play(&m.p1, &roll(&m.env));
    assert_channel_error(
        &m.client.try_reveal_and_commit(
            &m.p2,
            &word(&m.env, 9002),
            &commitment(&m.env, 9003),
        ),
        ChannelError::OutOfOrderReveal,
    );
    assert_channel_error(
        &m.client.try_reveal_and_commit(
            &m.p1,
            &word(&m.env, 7),
            &commitment(&m.env, 1339),
        ),
        ChannelError::InvalidReveal,
    );
}
