//! Canonical word codec.
//!
//! Every piece of channel state is flattened into a sequence of 256-bit
//! big-endian words. The same bytes are persisted, hashed for off-chain
//! signatures and accepted by fast-forward, so the layout must never drift:
//!
//! ```text
//! blob = word_0 || word_1 || ... || word_{k-1}      (32 bytes each)
//! ```

use soroban_sdk::{Bytes, BytesN, Env, Vec};

use crate::ChannelError;

/// Width of one canonical word in bytes.
pub const WORD_SIZE: u32 = 32;

/// Concatenate `values` into a blob, preserving order.
pub fn encode(env: &Env, values: &Vec<BytesN<32>>) -> Bytes {
    let mut out = Bytes::new(env);
    for value in values.iter() {
        out.extend_from_array(&value.to_array());
    }
    out
}

/// Read `count` words starting at word `offset`.
pub fn decode(
    env: &Env,
    blob: &Bytes,
    offset: u32,
    count: u32,
) -> Result<Vec<BytesN<32>>, ChannelError> {
    let end = offset
        .checked_add(count)
        .and_then(|words| words.checked_mul(WORD_SIZE))
        .ok_or(ChannelError::OutOfRange)?;
    if end > blob.len() {
        return Err(ChannelError::OutOfRange);
    }
    let mut out = Vec::new(env);
    for i in offset..offset + count {
        out.push_back(word_at(env, blob, i));
    }
    Ok(out)
}

/// Number of whole words in `blob`, or `MalformedState` if it is ragged.
pub fn word_count(blob: &Bytes) -> Result<u32, ChannelError> {
    if blob.len() % WORD_SIZE != 0 {
        return Err(ChannelError::MalformedState);
    }
    Ok(blob.len() / WORD_SIZE)
}

fn word_at(env: &Env, blob: &Bytes, index: u32) -> BytesN<32> {
    let start = index * WORD_SIZE;
    let mut buf = [0u8; 32];
    blob.slice(start..start + WORD_SIZE).copy_into_slice(&mut buf);
    BytesN::from_array(env, &buf)
}

// ═══════════════════════════════════════════════════════════════════════════════
//  Word arithmetic
// ═══════════════════════════════════════════════════════════════════════════════

pub fn zero(env: &Env) -> BytesN<32> {
    BytesN::from_array(env, &[0u8; 32])
}

pub fn from_u32(env: &Env, value: u32) -> BytesN<32> {
    from_u64(env, value as u64)
}

pub fn from_u64(env: &Env, value: u64) -> BytesN<32> {
    let mut buf = [0u8; 32];
    buf[24..].copy_from_slice(&value.to_be_bytes());
    BytesN::from_array(env, &buf)
}

pub fn to_u32(word: &BytesN<32>) -> Result<u32, ChannelError> {
    let buf = word.to_array();
    if buf[..28].iter().any(|b| *b != 0) {
        return Err(ChannelError::ValueOverflow);
    }
    Ok(u32::from_be_bytes([buf[28], buf[29], buf[30], buf[31]]))
}

pub fn is_zero(word: &BytesN<32>) -> bool {
    word.to_array().iter().all(|b| *b == 0)
}

pub fn xor(env: &Env, a: &BytesN<32>, b: &BytesN<32>) -> BytesN<32> {
    let mut out = a.to_array();
    for (x, y) in out.iter_mut().zip(b.to_array().iter()) {
        *x ^= *y;
    }
    BytesN::from_array(env, &out)
}

/// `word mod n` for a small modulus.
pub fn rem(word: &BytesN<32>, n: u32) -> u32 {
    if n == 0 {
        return 0;
    }
    let n = n as u64;
    word.to_array()
        .iter()
        .fold(0u64, |acc, b| (acc * 256 + *b as u64) % n) as u32
}

/// keccak256 over the 32-byte big-endian form of `word`.
pub fn hash(env: &Env, word: &BytesN<32>) -> BytesN<32> {
    env.crypto()
        .keccak256(&Bytes::from_array(env, &word.to_array()))
        .into()
}

// ═══════════════════════════════════════════════════════════════════════════════
//  Streaming writer / reader
// ═══════════════════════════════════════════════════════════════════════════════

pub struct WordWriter {
    buf: Bytes,
}

impl WordWriter {
    pub fn new(env: &Env) -> Self {
        Self { buf: Bytes::new(env) }
    }

    pub fn word(&mut self, word: &BytesN<32>) -> &mut Self {
        self.buf.extend_from_array(&word.to_array());
        self
    }

    pub fn u32(&mut self, value: u32) -> &mut Self {
        let mut buf = [0u8; 32];
        buf[28..].copy_from_slice(&value.to_be_bytes());
        self.buf.extend_from_array(&buf);
        self
    }

    pub fn bool(&mut self, value: bool) -> &mut Self {
        self.u32(value as u32)
    }

    pub fn into_bytes(self) -> Bytes {
        self.buf
    }
}

pub struct WordReader<'a> {
    env: &'a Env,
    blob: &'a Bytes,
    cursor: u32,
    len: u32,
}

impl<'a> WordReader<'a> {
    pub fn new(env: &'a Env, blob: &'a Bytes) -> Result<Self, ChannelError> {
        let len = word_count(blob)?;
        Ok(Self {
            env,
            blob,
            cursor: 0,
            len,
        })
    }

    pub fn remaining(&self) -> u32 {
        self.len - self.cursor
    }

    pub fn word(&mut self) -> Result<BytesN<32>, ChannelError> {
        if self.cursor >= self.len {
            return Err(ChannelError::OutOfRange);
        }
        let word = word_at(self.env, self.blob, self.cursor);
        self.cursor += 1;
        Ok(word)
    }

    pub fn u32(&mut self) -> Result<u32, ChannelError> {
        to_u32(&self.word()?)
    }

    /// A word that must be 0 or 1.
    pub fn bool(&mut self) -> Result<bool, ChannelError> {
        match self.u32()? {
            0 => Ok(false),
            1 => Ok(true),
            _ => Err(ChannelError::MalformedState),
        }
    }

    /// Fails unless every word has been consumed.
    pub fn finish(self) -> Result<(), ChannelError> {
        if self.cursor != self.len {
            return Err(ChannelError::MalformedState);
        }
        Ok(())
    }
}
