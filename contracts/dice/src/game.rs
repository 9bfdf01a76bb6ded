use soroban_sdk::{Bytes, Env, Vec};
use statechan::codec::{self, WordReader, WordWriter};
use statechan::{ChannelError, Game, RandomSource};

const PASS: u32 = 0;
const ROLL: u32 = 1;
const FACES: u32 = 6;

/// Round-based dice race. Starting from the drawn seat, each seat in turn
/// either rolls one die and adds the face to its score, or passes. A round
/// ends when play comes back around to `first`.
///
/// State words: `[rounds_left, first, score_1 .. score_N]`.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Dice {
    pub rounds_left: u32,
    pub first: u32,
    pub scores: Vec<u32>,
}

impl Dice {
    pub fn players(&self) -> u32 {
        self.scores.len()
    }

    fn parse(env: &Env, action: &Bytes) -> Option<u32> {
        let mut r = WordReader::new(env, action).ok()?;
        let choice = r.u32().ok()?;
        r.finish().ok()?;
        matches!(choice, PASS | ROLL).then_some(choice)
    }

    fn rounds(env: &Env, args: &Bytes) -> Option<u32> {
        let mut r = WordReader::new(env, args).ok()?;
        let rounds = r.u32().ok()?;
        r.finish().ok()?;
        (rounds > 0).then_some(rounds)
    }
}

impl Game for Dice {
    fn state_words(players: u32) -> u32 {
        2 + players
    }

    fn blank(env: &Env, players: u32) -> Self {
        let mut scores = Vec::new(env);
        for _ in 0..players {
            scores.push_back(0);
        }
        Self {
            rounds_left: 0,
            first: 0,
            scores,
        }
    }

    /// `args` is the single word `[rounds]`, at least one.
    fn init(env: &Env, players: u32, first: u32, args: &Bytes) -> Result<Self, ChannelError> {
        let rounds = Self::rounds(env, args).ok_or(ChannelError::InvalidConfig)?;
        if first == 0 || first > players {
            return Err(ChannelError::InvalidConfig);
        }
        let mut game = Self::blank(env, players);
        game.rounds_left = rounds;
        game.first = first;
        Ok(game)
    }

    fn legal(&self, env: &Env, _actor: u32, action: &Bytes) -> bool {
        !self.terminal() && Self::parse(env, action).is_some()
    }

    fn update<R: RandomSource>(
        &mut self,
        env: &Env,
        actor: u32,
        action: &Bytes,
        rng: &mut R,
    ) -> Result<(), ChannelError> {
        let choice = Self::parse(env, action).ok_or(ChannelError::IllegalMove)?;
        if choice == ROLL {
            let face = codec::rem(&rng.next(env)?, FACES) + 1;
            let seat = actor.checked_sub(1).ok_or(ChannelError::NotParticipant)?;
            let score = self.scores.get(seat).ok_or(ChannelError::NotParticipant)?;
            self.scores
                .set(seat, score.checked_add(face).ok_or(ChannelError::ValueOverflow)?);
            rng.request()?;
        }
        if self.next(actor) == self.first {
            self.rounds_left = self.rounds_left.saturating_sub(1);
        }
        Ok(())
    }

    fn next(&self, actor: u32) -> u32 {
        actor % self.players() + 1
    }

    fn terminal(&self) -> bool {
        self.first != 0 && self.rounds_left == 0
    }

    fn goal(&self, player: u32) -> u32 {
        player
            .checked_sub(1)
            .and_then(|seat| self.scores.get(seat))
            .unwrap_or(0)
    }

    fn encode_state(&self, w: &mut WordWriter) {
        w.u32(self.rounds_left).u32(self.first);
        for score in self.scores.iter() {
            w.u32(score);
        }
    }

    fn set_state(env: &Env, players: u32, r: &mut WordReader) -> Result<Self, ChannelError> {
        let rounds_left = r.u32()?;
        let first = r.u32()?;
        if first > players {
            return Err(ChannelError::MalformedState);
        }
        let mut scores = Vec::new(env);
        for _ in 0..players {
            scores.push_back(r.u32()?);
        }
        Ok(Self {
            rounds_left,
            first,
            scores,
        })
    }
}
