//! Generic match controller.
//!
//! `Controller<G>` drives one match of game `G` through
//! `Deposit → Starting → Playing → Terminal` (or `Cancelled`), holding the
//! escrow and the canonical channel blob in instance storage. Every entry
//! point either commits its whole transition or returns an error, which the
//! host rolls back.

use core::marker::PhantomData;

use soroban_sdk::{panic_with_error, token, Address, Bytes, BytesN, Env, Vec};

use crate::channel::{derive_initial_control, peek_turn, Channel};
use crate::events::*;
use crate::game::Game;
use crate::quorum::{verify_quorum, StateSignature};
use crate::random::{RandomSource, RandomState, Revealed, RingRandom, MAX_PLAYERS};
use crate::settlement;
use crate::types::{
    ChannelConfig, DataKey, Lifecycle, MatchRecord, Seat, TimerState, CHANNEL_TTL_LEDGERS,
    MIN_PLAYERS,
};
use crate::ChannelError;

pub struct Controller<G: Game>(PhantomData<G>);

impl<G: Game> Controller<G> {
    // ───────────────────────────────────────────────────────────────────────────
    //  Constructor
    // ───────────────────────────────────────────────────────────────────────────

    pub fn init(env: &Env, config: ChannelConfig) {
        if !Self::valid_config(&config) {
            panic_with_error!(env, ChannelError::InvalidConfig);
        }
        let n = config.players.len();

        let mut seats = Vec::new(env);
        for _ in 0..n {
            seats.push_back(Seat {
                deposited: 0,
                withdrawn: false,
            });
        }
        let record = MatchRecord {
            lifecycle: Lifecycle::Deposit,
            seats,
            deposit_deadline: env
                .ledger()
                .sequence()
                .saturating_add(config.deposit_duration),
            start_deadline: 0,
            timer: None,
            forfeit: None,
        };

        env.storage().instance().set(&DataKey::Config, &config);
        Self::write_record(env, &record);
        Self::write_channel(env, &Channel::<G>::blank(env, n));
    }

    fn valid_config(config: &ChannelConfig) -> bool {
        let n = config.players.len();
        if !(MIN_PLAYERS..=MAX_PLAYERS).contains(&n) || config.signers.len() != n {
            return false;
        }
        if config.bet_amount <= 0 || config.deposit_duration == 0 || config.min_timer_duration == 0
        {
            return false;
        }
        for i in 0..n {
            for j in (i + 1)..n {
                if config.players.get(i) == config.players.get(j) {
                    return false;
                }
            }
        }
        true
    }

    // ───────────────────────────────────────────────────────────────────────────
    //  Escrow
    // ───────────────────────────────────────────────────────────────────────────

    pub fn deposit(env: &Env, player: Address, amount: i128) -> Result<(), ChannelError> {
        player.require_auth();

        let config = Self::load_config(env)?;
        let mut record = Self::read_record(env)?;
        if record.lifecycle != Lifecycle::Deposit {
            return Err(ChannelError::WrongPhase);
        }
        let seat = Self::seat_of(&config, &player)?;
        let mut entry = Self::seat(&record, seat)?;
        if entry.deposited > 0 {
            return Err(ChannelError::DuplicateDeposit);
        }
        if amount != config.bet_amount {
            return Err(ChannelError::WrongAmount);
        }

        token::Client::new(env, &config.token).transfer(
            &player,
            &env.current_contract_address(),
            &amount,
        );
        entry.deposited = amount;
        record.seats.set(seat - 1, entry);

        EvDeposited {
            player: player.clone(),
            amount,
        }
        .publish(env);

        if record.seats.iter().all(|s| s.deposited > 0) {
            record.lifecycle = Lifecycle::Starting;
            record.start_deadline = env
                .ledger()
                .sequence()
                .saturating_add(config.deposit_duration);
        }

        Self::write_record(env, &record);
        Ok(())
    }

    /// Abort a match that never got going. Open in `Deposit` after the
    /// deposit deadline and in `Starting` after the start deadline.
    pub fn cancel_deposit(env: &Env, caller: Address) -> Result<(), ChannelError> {
        caller.require_auth();

        let config = Self::load_config(env)?;
        Self::seat_of(&config, &caller)?;
        let mut record = Self::read_record(env)?;
        let deadline = match record.lifecycle {
            Lifecycle::Deposit => record.deposit_deadline,
            Lifecycle::Starting => record.start_deadline,
            _ => return Err(ChannelError::WrongPhase),
        };
        if env.ledger().sequence() <= deadline {
            return Err(ChannelError::DeadlineNotReached);
        }

        record.lifecycle = Lifecycle::Cancelled;
        record.timer = None;
        EvDepositCancelled { caller }.publish(env);
        Self::write_record(env, &record);
        Ok(())
    }

    /// Pay `player` their share once the match is settled.
    pub fn withdraw(env: &Env, player: Address) -> Result<i128, ChannelError> {
        player.require_auth();

        let config = Self::load_config(env)?;
        let mut record = Self::read_record(env)?;
        let seat = Self::seat_of(&config, &player)?;
        let mut entry = Self::seat(&record, seat)?;
        if entry.withdrawn {
            return Err(ChannelError::AlreadyWithdrawn);
        }

        let shares = match record.lifecycle {
            Lifecycle::Cancelled => settlement::refunds(env, &record.seats),
            Lifecycle::Terminal => Self::final_shares(env, &config, &record)?,
            _ => return Err(ChannelError::NotSettleable),
        };
        let amount = shares.get(seat - 1).unwrap_or(0);

        entry.withdrawn = true;
        record.seats.set(seat - 1, entry);
        Self::write_record(env, &record);

        if amount > 0 {
            token::Client::new(env, &config.token).transfer(
                &env.current_contract_address(),
                &player,
                &amount,
            );
        }
        EvWithdrawn { player, amount }.publish(env);
        Ok(amount)
    }

    fn final_shares(
        env: &Env,
        config: &ChannelConfig,
        record: &MatchRecord,
    ) -> Result<Vec<i128>, ChannelError> {
        let pot = settlement::pot(&record.seats);
        let n = config.players.len();
        if let Some(offender) = record.forfeit {
            return settlement::forfeit_shares(env, pot, n, offender);
        }
        let channel = Self::read_channel(env, n)?;
        let mut weights = Vec::new(env);
        for seat in 1..=n {
            weights.push_back(channel.game.goal(seat));
        }
        settlement::weighted_shares(env, pot, &weights)
    }

    // ───────────────────────────────────────────────────────────────────────────
    //  Seeding
    // ───────────────────────────────────────────────────────────────────────────

    pub fn commit(env: &Env, player: Address, hash: BytesN<32>) -> Result<(), ChannelError> {
        player.require_auth();

        let config = Self::load_config(env)?;
        let record = Self::read_record(env)?;
        if !matches!(record.lifecycle, Lifecycle::Deposit | Lifecycle::Starting) {
            return Err(ChannelError::WrongPhase);
        }
        let seat = Self::seat_of(&config, &player)?;

        let mut channel = Self::read_channel(env, config.players.len())?;
        channel.rng.commit(seat - 1, hash)?;
        Self::write_channel(env, &channel);

        EvSeedCommitted { player }.publish(env);
        Ok(())
    }

    /// Reveal the secret behind the caller's commitment and commit the next
    /// one. Serves both the seeding round and ring refreshes.
    pub fn reveal_and_commit(
        env: &Env,
        player: Address,
        secret: BytesN<32>,
        next: BytesN<32>,
    ) -> Result<(), ChannelError> {
        player.require_auth();

        let config = Self::load_config(env)?;
        let mut record = Self::read_record(env)?;
        if !matches!(
            record.lifecycle,
            Lifecycle::Deposit | Lifecycle::Starting | Lifecycle::Playing
        ) {
            return Err(ChannelError::WrongPhase);
        }
        let seat = Self::seat_of(&config, &player)?;

        let mut channel = Self::read_channel(env, config.players.len())?;
        let outcome = channel.rng.reveal_and_commit(env, seat - 1, &secret, next)?;
        Self::write_channel(env, &channel);

        EvSeedRevealed { player }.publish(env);
        if outcome != Revealed::Seeding {
            EvRandomReady {
                ring_turn: channel.rng.ring_turn,
            }
            .publish(env);
        }

        if record.timer.is_some() {
            record.timer = None;
            Self::write_record(env, &record);
        }
        Ok(())
    }

    // ───────────────────────────────────────────────────────────────────────────
    //  Play
    // ───────────────────────────────────────────────────────────────────────────

    /// Draw the first mover and initialise the game.
    pub fn start(env: &Env, caller: Address, args: Bytes) -> Result<u32, ChannelError> {
        caller.require_auth();

        let config = Self::load_config(env)?;
        Self::seat_of(&config, &caller)?;
        let mut record = Self::read_record(env)?;
        if record.lifecycle != Lifecycle::Starting {
            return Err(ChannelError::WrongPhase);
        }

        let n = config.players.len();
        let mut channel = Self::read_channel(env, n)?;
        if !channel.rng.ready() {
            return Err(ChannelError::NotReady);
        }
        let draw = channel.rng.next(env)?;
        let control = derive_initial_control(&draw, n);
        channel.game = G::init(env, n, control, &args)?;
        channel.control = control;
        channel.turn = 1;

        record.lifecycle = Lifecycle::Playing;
        Self::write_channel(env, &channel);
        Self::write_record(env, &record);

        EvGameStarted { control }.publish(env);
        Ok(control)
    }

    pub fn play(env: &Env, player: Address, action: Bytes) -> Result<(), ChannelError> {
        player.require_auth();

        let config = Self::load_config(env)?;
        let mut record = Self::read_record(env)?;
        if record.lifecycle != Lifecycle::Playing {
            return Err(ChannelError::WrongPhase);
        }
        let seat = Self::seat_of(&config, &player)?;
        let mut channel = Self::read_channel(env, config.players.len())?;
        if seat != channel.control {
            return Err(ChannelError::NotInControl);
        }
        if channel.game.terminal() {
            return Err(ChannelError::AlreadyTerminal);
        }
        if !channel.game.legal(env, seat, &action) {
            return Err(ChannelError::IllegalMove);
        }

        let was_pending = channel.rng.state == RandomState::PendingUpdate;
        channel.game.update(env, seat, &action, &mut channel.rng)?;
        channel.control = channel.game.next(seat);
        channel.turn = channel
            .turn
            .checked_add(1)
            .ok_or(ChannelError::ValueOverflow)?;
        record.timer = None;

        EvPlayerMoved {
            player,
            turn: channel.turn,
        }
        .publish(env);
        if !was_pending && channel.rng.state == RandomState::PendingUpdate {
            EvRandomRequested {
                ring_turn: channel.rng.ring_turn,
            }
            .publish(env);
        }
        if channel.game.terminal() {
            record.lifecycle = Lifecycle::Terminal;
            EvGameEnded { turn: channel.turn }.publish(env);
        }

        Self::write_channel(env, &channel);
        Self::write_record(env, &record);
        Ok(())
    }

    /// Settle a terminal game reached without `play` (fast-forward).
    /// Does nothing once the match is already `Terminal`.
    pub fn end(env: &Env) -> Result<(), ChannelError> {
        let config = Self::load_config(env)?;
        let mut record = Self::read_record(env)?;
        match record.lifecycle {
            Lifecycle::Terminal => return Ok(()),
            Lifecycle::Playing => {}
            _ => return Err(ChannelError::WrongPhase),
        }
        let channel = Self::read_channel(env, config.players.len())?;
        if !channel.game.terminal() {
            return Err(ChannelError::NotTerminal);
        }

        record.lifecycle = Lifecycle::Terminal;
        record.timer = None;
        Self::write_record(env, &record);
        EvGameEnded { turn: channel.turn }.publish(env);
        Ok(())
    }

    // ───────────────────────────────────────────────────────────────────────────
    //  Fast-forward
    // ───────────────────────────────────────────────────────────────────────────

    /// Jump to a later state every participant signed.
    pub fn request_fastforward(
        env: &Env,
        state: Bytes,
        signatures: Vec<StateSignature>,
    ) -> Result<(), ChannelError> {
        let config = Self::load_config(env)?;
        let mut record = Self::read_record(env)?;
        if !matches!(record.lifecycle, Lifecycle::Starting | Lifecycle::Playing) {
            return Err(ChannelError::WrongPhase);
        }

        verify_quorum(env, &state, &config.signers, &signatures)?;

        let n = config.players.len();
        let current = Self::read_channel(env, n)?;
        let target_turn = peek_turn(env, &state)?;
        if target_turn <= current.turn {
            return Err(ChannelError::StaleOrInvalidTarget);
        }
        let target = Channel::<G>::deserialize(env, n, &state)?;

        record.lifecycle = Lifecycle::Playing;
        record.timer = None;
        Self::write_channel(env, &target);
        Self::write_record(env, &record);

        EvFastforwarded { turn: target.turn }.publish(env);
        Ok(())
    }

    // ───────────────────────────────────────────────────────────────────────────
    //  Timeout
    // ───────────────────────────────────────────────────────────────────────────

    /// Arm a timer against whoever currently owes an action.
    pub fn start_timer(env: &Env, caller: Address, duration: u32) -> Result<u32, ChannelError> {
        caller.require_auth();

        let config = Self::load_config(env)?;
        Self::seat_of(&config, &caller)?;
        let mut record = Self::read_record(env)?;
        if record.lifecycle != Lifecycle::Playing {
            return Err(ChannelError::WrongPhase);
        }
        let channel = Self::read_channel(env, config.players.len())?;
        if channel.game.terminal() {
            return Err(ChannelError::AlreadyTerminal);
        }
        if duration < config.min_timer_duration {
            return Err(ChannelError::TimerTooShort);
        }
        if record.timer.is_some() {
            return Err(ChannelError::TimerAlreadyRunning);
        }

        let deadline = env.ledger().sequence().saturating_add(duration);
        let timer = TimerState {
            deadline,
            turn: channel.turn,
            control: channel.control,
            rng_ready: channel.rng.ready(),
            ring_turn: channel.rng.ring_turn,
        };
        EvTimerStarted {
            turn: timer.turn,
            control: timer.control,
            rng_ready: timer.rng_ready,
            deadline,
        }
        .publish(env);

        record.timer = Some(timer);
        Self::write_record(env, &record);
        Ok(deadline)
    }

    /// Close the match against the seat that let an armed timer expire.
    /// Returns the offending seat.
    pub fn timeout(env: &Env) -> Result<u32, ChannelError> {
        let mut record = Self::read_record(env)?;
        if record.lifecycle != Lifecycle::Playing {
            return Err(ChannelError::WrongPhase);
        }
        let timer = record.timer.clone().ok_or(ChannelError::TimerNotStarted)?;
        if env.ledger().sequence() < timer.deadline {
            return Err(ChannelError::DeadlineNotReached);
        }

        let offender = timer.offender();
        record.forfeit = Some(offender);
        record.lifecycle = Lifecycle::Terminal;
        record.timer = None;
        Self::write_record(env, &record);

        EvTimedOut { offender }.publish(env);
        Ok(offender)
    }

    // ───────────────────────────────────────────────────────────────────────────
    //  Read
    // ───────────────────────────────────────────────────────────────────────────

    pub fn config(env: &Env) -> Result<ChannelConfig, ChannelError> {
        Self::load_config(env)
    }

    pub fn lifecycle(env: &Env) -> Result<Lifecycle, ChannelError> {
        Ok(Self::read_record(env)?.lifecycle)
    }

    pub fn record(env: &Env) -> Result<MatchRecord, ChannelError> {
        Self::read_record(env)
    }

    pub fn control(env: &Env) -> Result<u32, ChannelError> {
        Ok(Self::load_channel(env)?.control)
    }

    pub fn turn(env: &Env) -> Result<u32, ChannelError> {
        Ok(Self::load_channel(env)?.turn)
    }

    pub fn player_index(env: &Env, player: Address) -> Result<u32, ChannelError> {
        Self::seat_of(&Self::load_config(env)?, &player)
    }

    pub fn random(env: &Env) -> Result<RingRandom, ChannelError> {
        Ok(Self::load_channel(env)?.rng)
    }

    pub fn timer(env: &Env) -> Result<Option<TimerState>, ChannelError> {
        Ok(Self::read_record(env)?.timer)
    }

    pub fn terminal(env: &Env) -> Result<bool, ChannelError> {
        Ok(Self::load_channel(env)?.game.terminal())
    }

    pub fn goal(env: &Env, player: u32) -> Result<u32, ChannelError> {
        let n = Self::load_config(env)?.players.len();
        if player == 0 || player > n {
            return Err(ChannelError::NotParticipant);
        }
        Ok(Self::load_channel(env)?.game.goal(player))
    }

    /// Canonical blob participants sign.
    pub fn serialize(env: &Env) -> Result<Bytes, ChannelError> {
        env.storage()
            .instance()
            .get(&DataKey::Channel)
            .ok_or(ChannelError::NotConfigured)
    }

    // ═══════════════════════════════════════════════════════════════════════════
    //  Internal: Seats & Storage
    // ═══════════════════════════════════════════════════════════════════════════

    fn seat_of(config: &ChannelConfig, player: &Address) -> Result<u32, ChannelError> {
        config
            .players
            .first_index_of(player)
            .map(|i| i + 1)
            .ok_or(ChannelError::NotParticipant)
    }

    fn seat(record: &MatchRecord, seat: u32) -> Result<Seat, ChannelError> {
        record
            .seats
            .get(seat - 1)
            .ok_or(ChannelError::NotParticipant)
    }

    fn load_config(env: &Env) -> Result<ChannelConfig, ChannelError> {
        env.storage()
            .instance()
            .get(&DataKey::Config)
            .ok_or(ChannelError::NotConfigured)
    }

    fn read_record(env: &Env) -> Result<MatchRecord, ChannelError> {
        env.storage()
            .instance()
            .get(&DataKey::Record)
            .ok_or(ChannelError::NotConfigured)
    }

    fn write_record(env: &Env, record: &MatchRecord) {
        env.storage().instance().set(&DataKey::Record, record);
        env.storage()
            .instance()
            .extend_ttl(CHANNEL_TTL_LEDGERS, CHANNEL_TTL_LEDGERS);
    }

    fn load_channel(env: &Env) -> Result<Channel<G>, ChannelError> {
        let n = Self::load_config(env)?.players.len();
        Self::read_channel(env, n)
    }

    fn read_channel(env: &Env, players: u32) -> Result<Channel<G>, ChannelError> {
        let blob = Self::serialize(env)?;
        Channel::deserialize(env, players, &blob)
    }

    fn write_channel(env: &Env, channel: &Channel<G>) {
        env.storage()
            .instance()
            .set(&DataKey::Channel, &channel.serialize(env));
        env.storage()
            .instance()
            .extend_ttl(CHANNEL_TTL_LEDGERS, CHANNEL_TTL_LEDGERS);
    }
}
