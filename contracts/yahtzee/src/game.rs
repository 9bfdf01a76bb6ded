use soroban_sdk::{Bytes, Env, Vec};
use statechan::codec::{self, WordReader, WordWriter};
use statechan::{ChannelError, Game, RandomSource};

pub const COMBOS: u32 = 13;
pub const DICE: usize = 5;
pub const ROLLS: u32 = 3;
pub const ALL_DICE: u32 = 0b11111;

const FACES: u32 = 6;
const UPPER_BONUS_AT: u32 = 63;
const UPPER_BONUS: u32 = 35;

/// Scoring boxes, in score-card order.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[repr(u32)]
pub enum Combo {
    Ones = 0,
    Twos = 1,
    Threes = 2,
    Fours = 3,
    Fives = 4,
    Sixes = 5,
    ThreeOfAKind = 6,
    FourOfAKind = 7,
    FullHouse = 8,
    SmallStraight = 9,
    LargeStraight = 10,
    Chance = 11,
    Yahtzee = 12,
}

impl Combo {
    pub fn from_u32(value: u32) -> Option<Self> {
        Some(match value {
            0 => Self::Ones,
            1 => Self::Twos,
            2 => Self::Threes,
            3 => Self::Fours,
            4 => Self::Fives,
            5 => Self::Sixes,
            6 => Self::ThreeOfAKind,
            7 => Self::FourOfAKind,
            8 => Self::FullHouse,
            9 => Self::SmallStraight,
            10 => Self::LargeStraight,
            11 => Self::Chance,
            12 => Self::Yahtzee,
            _ => return None,
        })
    }

    /// Points `dice` are worth in this box.
    pub fn score(self, dice: &[u32; DICE]) -> u32 {
        // counts[f] = dice showing face f; index 0 stays unused
        let mut counts = [0u32; FACES as usize + 1];
        for die in dice.iter().filter(|d| (1..=FACES).contains(*d)) {
            counts[*die as usize] += 1;
        }
        let faces = &counts[1..];
        let sum: u32 = dice.iter().sum();
        let most = faces.iter().copied().max().unwrap_or(0);
        let run = |from: usize, len: usize| counts[from..from + len].iter().all(|c| *c > 0);

        match self {
            Self::Ones | Self::Twos | Self::Threes | Self::Fours | Self::Fives | Self::Sixes => {
                let face = self as u32 + 1;
                counts[face as usize] * face
            }
            Self::ThreeOfAKind if most >= 3 => sum,
            Self::FourOfAKind if most >= 4 => sum,
            Self::FullHouse if faces.contains(&3) && faces.contains(&2) => 25,
            Self::SmallStraight if run(1, 4) || run(2, 4) || run(3, 4) => 30,
            Self::LargeStraight if run(1, 5) || run(2, 5) => 40,
            Self::Chance => sum,
            Self::Yahtzee if most == 5 => 50,
            _ => 0,
        }
    }
}

/// Multi-seat Yahtzee. A turn is up to three rolls followed by scoring one
/// of the thirteen boxes; every seat fills its whole card.
///
/// An action is `[reroll_mask, combo]`. While rolls remain and a reroll is
/// pending, the action rolls the dice selected by the previous mask and
/// records `reroll_mask` for the next roll (0 ends rolling). Otherwise the
/// action scores `combo`; the third roll scores straight away.
///
/// State words:
/// ```text
/// [rounds_left, card (13 per seat), picked (13 per seat),
///  rolls_left, roll_pick, dice x5, current]
/// ```
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Yahtzee {
    pub rounds_left: u32,
    pub card: Vec<u32>,
    pub picked: Vec<bool>,
    pub rolls_left: u32,
    pub roll_pick: u32,
    pub dice: [u32; DICE],
    pub current: u32,
}

impl Yahtzee {
    pub fn players(&self) -> u32 {
        self.card.len() / COMBOS
    }

    fn parse(env: &Env, action: &Bytes) -> Option<(u32, Combo)> {
        let mut r = WordReader::new(env, action).ok()?;
        let mask = r.u32().ok()?;
        let combo = r.u32().ok()?;
        r.finish().ok()?;
        if mask > ALL_DICE {
            return None;
        }
        Some((mask, Combo::from_u32(combo)?))
    }

    fn slot(player: u32, combo: Combo) -> Option<u32> {
        player
            .checked_sub(1)
            .map(|seat| seat * COMBOS + combo as u32)
    }

    pub fn is_picked(&self, player: u32, combo: Combo) -> bool {
        Self::slot(player, combo)
            .and_then(|slot| self.picked.get(slot))
            .unwrap_or(true)
    }

    /// True when the next action by the current seat scores a box.
    fn scoring(&self) -> bool {
        self.roll_pick == 0 || self.rolls_left <= 1
    }

    fn roll<R: RandomSource>(&mut self, env: &Env, rng: &mut R) -> Result<(), ChannelError> {
        for (i, die) in self.dice.iter_mut().enumerate() {
            if self.roll_pick & (1 << i) != 0 {
                *die = codec::rem(&rng.next(env)?, FACES) + 1;
            }
        }
        rng.request()
    }

    fn score(&mut self, actor: u32, combo: Combo) -> Result<(), ChannelError> {
        let slot = Self::slot(actor, combo).ok_or(ChannelError::NotParticipant)?;
        self.card.set(slot, combo.score(&self.dice));
        self.picked.set(slot, true);
        self.rounds_left = self.rounds_left.saturating_sub(1);
        self.rolls_left = ROLLS;
        self.roll_pick = ALL_DICE;
        self.current = actor % self.players() + 1;
        Ok(())
    }
}

impl Game for Yahtzee {
    fn state_words(players: u32) -> u32 {
        1 + 2 * COMBOS * players + 2 + DICE as u32 + 1
    }

    fn blank(env: &Env, players: u32) -> Self {
        let mut card = Vec::new(env);
        let mut picked = Vec::new(env);
        for _ in 0..(COMBOS * players) {
            card.push_back(0);
            picked.push_back(false);
        }
        Self {
            rounds_left: 0,
            card,
            picked,
            rolls_left: 0,
            roll_pick: 0,
            dice: [0; DICE],
            current: 0,
        }
    }

    fn init(env: &Env, players: u32, first: u32, _args: &Bytes) -> Result<Self, ChannelError> {
        if first == 0 || first > players {
            return Err(ChannelError::InvalidConfig);
        }
        let mut game = Self::blank(env, players);
        game.rounds_left = COMBOS * players;
        game.rolls_left = ROLLS;
        game.roll_pick = ALL_DICE;
        game.current = first;
        Ok(game)
    }

    fn legal(&self, env: &Env, actor: u32, action: &Bytes) -> bool {
        if self.terminal() || actor != self.current {
            return false;
        }
        let Some((mask, combo)) = Self::parse(env, action) else {
            return false;
        };
        if !self.scoring() {
            return true;
        }
        mask == 0 && !self.is_picked(actor, combo)
    }

    fn update<R: RandomSource>(
        &mut self,
        env: &Env,
        actor: u32,
        action: &Bytes,
        rng: &mut R,
    ) -> Result<(), ChannelError> {
        let (mask, combo) = Self::parse(env, action).ok_or(ChannelError::IllegalMove)?;
        if self.roll_pick != 0 {
            self.roll(env, rng)?;
            self.rolls_left = self.rolls_left.saturating_sub(1);
            self.roll_pick = mask;
            if self.rolls_left > 0 {
                return Ok(());
            }
        }
        self.score(actor, combo)
    }

    fn next(&self, _actor: u32) -> u32 {
        self.current
    }

    fn terminal(&self) -> bool {
        self.current != 0 && self.rounds_left == 0
    }

    /// Card total plus the upper-section bonus.
    fn goal(&self, player: u32) -> u32 {
        let Some(seat) = player.checked_sub(1) else {
            return 0;
        };
        if seat >= self.players() {
            return 0;
        }
        let mut upper = 0;
        let mut total = 0;
        for combo in 0..COMBOS {
            let points = self.card.get(seat * COMBOS + combo).unwrap_or(0);
            if combo <= Combo::Sixes as u32 {
                upper += points;
            }
            total += points;
        }
        if upper >= UPPER_BONUS_AT {
            total += UPPER_BONUS;
        }
        total
    }

    fn encode_state(&self, w: &mut WordWriter) {
        w.u32(self.rounds_left);
        for points in self.card.iter() {
            w.u32(points);
        }
        for picked in self.picked.iter() {
            w.bool(picked);
        }
        w.u32(self.rolls_left).u32(self.roll_pick);
        for die in self.dice.iter() {
            w.u32(*die);
        }
        w.u32(self.current);
    }

    fn set_state(env: &Env, players: u32, r: &mut WordReader) -> Result<Self, ChannelError> {
        let mut game = Self::blank(env, players);

        game.rounds_left = r.u32()?;
        if game.rounds_left > COMBOS * players {
            return Err(ChannelError::MalformedState);
        }
        for slot in 0..(COMBOS * players) {
            game.card.set(slot, r.u32()?);
        }
        for slot in 0..(COMBOS * players) {
            game.picked.set(slot, r.bool()?);
        }
        game.rolls_left = r.u32()?;
        game.roll_pick = r.u32()?;
        if game.rolls_left > ROLLS || game.roll_pick > ALL_DICE {
            return Err(ChannelError::MalformedState);
        }
        for die in game.dice.iter_mut() {
            *die = r.u32()?;
            if *die > FACES {
                return Err(ChannelError::MalformedState);
            }
        }
        game.current = r.u32()?;
        if game.current > players {
            return Err(ChannelError::MalformedState);
        }
        Ok(game)
    }
}
