use soroban_sdk::{Bytes, Env};
use statechan::codec::{WordReader, WordWriter};
use statechan::{ChannelError, Game, RandomSource};

const SIZE: u32 = 3;
const CELLS: usize = 9;
const EMPTY: u32 = 0;

const LINES: [[usize; 3]; 8] = [
    [0, 1, 2],
    [3, 4, 5],
    [6, 7, 8],
    [0, 3, 6],
    [1, 4, 7],
    [2, 5, 8],
    [0, 4, 8],
    [2, 4, 6],
];

/// Two-seat tic-tac-toe. Cell `x + 3y` holds 0 or the seat that took it.
/// An action is the word pair `[x, y]`.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TicTacToe {
    pub cells: [u32; CELLS],
}

impl TicTacToe {
    fn parse(env: &Env, action: &Bytes) -> Option<usize> {
        let mut r = WordReader::new(env, action).ok()?;
        let x = r.u32().ok()?;
        let y = r.u32().ok()?;
        r.finish().ok()?;
        if x >= SIZE || y >= SIZE {
            return None;
        }
        Some((x + SIZE * y) as usize)
    }

    pub fn winner(&self) -> Option<u32> {
        LINES.iter().find_map(|[a, b, c]| {
            let seat = self.cells[*a];
            (seat != EMPTY && seat == self.cells[*b] && seat == self.cells[*c]).then_some(seat)
        })
    }

    fn full(&self) -> bool {
        self.cells.iter().all(|c| *c != EMPTY)
    }
}

impl Game for TicTacToe {
    fn state_words(_players: u32) -> u32 {
        CELLS as u32
    }

    fn blank(_env: &Env, _players: u32) -> Self {
        Self {
            cells: [EMPTY; CELLS],
        }
    }

    fn init(env: &Env, players: u32, _first: u32, _args: &Bytes) -> Result<Self, ChannelError> {
        if players != 2 {
            return Err(ChannelError::InvalidConfig);
        }
        Ok(Self::blank(env, players))
    }

    fn legal(&self, env: &Env, _actor: u32, action: &Bytes) -> bool {
        match Self::parse(env, action) {
            Some(cell) => self.cells[cell] == EMPTY && !self.terminal(),
            None => false,
        }
    }

    fn update<R: RandomSource>(
        &mut self,
        env: &Env,
        actor: u32,
        action: &Bytes,
        _rng: &mut R,
    ) -> Result<(), ChannelError> {
        let cell = Self::parse(env, action).ok_or(ChannelError::IllegalMove)?;
        self.cells[cell] = actor;
        Ok(())
    }

    fn next(&self, actor: u32) -> u32 {
        3 - actor
    }

    fn terminal(&self) -> bool {
        self.winner().is_some() || self.full()
    }

    /// 1 for the winner, 1 for both on a draw.
    fn goal(&self, player: u32) -> u32 {
        match self.winner() {
            Some(seat) => (seat == player) as u32,
            None if self.full() => 1,
            None => 0,
        }
    }

    fn encode_state(&self, w: &mut WordWriter) {
        for cell in self.cells.iter() {
            w.u32(*cell);
        }
    }

    fn set_state(_env: &Env, players: u32, r: &mut WordReader) -> Result<Self, ChannelError> {
        if players != 2 {
            return Err(ChannelError::MalformedState);
        }
        let mut cells = [EMPTY; CELLS];
        for cell in cells.iter_mut() {
            *cell = r.u32()?;
            if *cell > players {
                return Err(ChannelError::MalformedState);
            }
        }
        Ok(Self { cells })
    }
}
