//! Signature quorum over canonical state blobs.
//!
//! Participants sign `keccak256(blob)` off-chain with their secp256k1 key.
//! A quorum is one recoverable signature per participant, in seat order, and
//! each must recover to that participant's registered public key.

use soroban_sdk::{contracttype, crypto::Hash, Bytes, BytesN, Env, Vec};

use crate::ChannelError;

/// secp256k1 group order halved, big-endian. Signatures with a larger `s`
/// are malleable twins of a low-`s` signature.
const HALF_ORDER: [u8; 32] = [
    0x7f, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff,
    0x5d, 0x57, 0x6e, 0x73, 0x57, 0xa4, 0x50, 0x1d, 0xdf, 0xe9, 0x2f, 0x46, 0x68, 0x1b, 0x20, 0xa0,
];

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct StateSignature {
    pub recovery_id: u32,
    /// `r || s`, 32 bytes each.
    pub signature: BytesN<64>,
}

/// Digest participants sign for `blob`.
pub fn state_digest(env: &Env, blob: &Bytes) -> Hash<32> {
    env.crypto().keccak256(blob)
}

fn well_formed(sig: &StateSignature) -> bool {
    if sig.recovery_id > 3 {
        return false;
    }
    let raw = sig.signature.to_array();
    let mut r = [0u8; 32];
    let mut s = [0u8; 32];
    r.copy_from_slice(&raw[..32]);
    s.copy_from_slice(&raw[32..]);
    let zero = [0u8; 32];
    r != zero && s != zero && s <= HALF_ORDER
}

/// Check that `signatures[i]` recovers to `signers[i]` for every seat.
pub fn verify_quorum(
    env: &Env,
    blob: &Bytes,
    signers: &Vec<BytesN<65>>,
    signatures: &Vec<StateSignature>,
) -> Result<(), ChannelError> {
    if signatures.len() != signers.len() {
        return Err(ChannelError::InvalidSignature);
    }
    let digest = state_digest(env, blob);
    for (signer, sig) in signers.iter().zip(signatures.iter()) {
        if !well_formed(&sig) {
            return Err(ChannelError::InvalidSignature);
        }
        let recovered =
            env.crypto()
                .secp256k1_recover(&digest, &sig.signature, sig.recovery_id);
        if recovered != signer {
            return Err(ChannelError::InvalidSignature);
        }
    }
    Ok(())
}
