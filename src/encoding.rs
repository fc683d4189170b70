// src/encoding.rs
//! # Canonical field encoding
//!
//! Every value that enters a commitment or a proof's public input is first
//! encoded as a sequence of Goldilocks field elements, then hashed with
//! Poseidon. The encoding is fixed so that commitments are reproducible
//! bit-for-bit across implementations:
//!
//! * bytes are split into little-endian 32-bit limbs, the last limb zero-padded;
//! * a `u64` is two limbs, low half first;
//! * a `u32` is a single limb;
//! * a public key is its 33-byte compressed serialization.
//!
//! Limbs are always below 2^32, so every element is canonical.

use plonky2::field::goldilocks_field::GoldilocksField;
use plonky2::field::types::{Field, PrimeField64};
use plonky2::hash::hash_types::HashOut;
use plonky2::hash::poseidon::PoseidonHash;
use plonky2::plonk::config::Hasher;

use crate::types::{Bytes32, PublicKey};

/// Field used for all public inputs and record digests.
pub type F = GoldilocksField;

/// Values with a canonical field encoding.
pub trait ToFields {
    fn to_fields(&self) -> Vec<F>;

    /// Poseidon digest of [`ToFields::to_fields`].
    fn digest(&self) -> Bytes32 {
        poseidon_digest(&self.to_fields())
    }
}

/// Splits bytes into little-endian 32-bit limbs.
pub fn bytes_to_fields(bytes: &[u8]) -> Vec<F> {
    bytes
        .chunks(4)
        .map(|chunk| {
            let mut limb = [0u8; 4];
            limb[..chunk.len()].copy_from_slice(chunk);
            F::from_canonical_u32(u32::from_le_bytes(limb))
        })
        .collect()
}

pub fn u64_to_fields(value: u64) -> [F; 2] {
    [F::from_canonical_u32(value as u32), F::from_canonical_u32((value >> 32) as u32)]
}

pub fn u32_to_field(value: u32) -> F { F::from_canonical_u32(value) }

pub fn public_key_to_fields(key: &PublicKey) -> Vec<F> { bytes_to_fields(&key.serialize()) }

/// Hashes field elements with Poseidon and returns the 32-byte digest.
pub fn poseidon_digest(inputs: &[F]) -> Bytes32 {
    let hash_out = PoseidonHash::hash_no_pad(inputs);
    hash_out_to_bytes(&hash_out)
}

/// Converts a Poseidon HashOut to a byte array.
pub fn hash_out_to_bytes(hash: &HashOut<F>) -> Bytes32 {
    let mut bytes = [0u8; 32];
    for (i, &element) in hash.elements.iter().enumerate() {
        let elem_u64 = element.to_canonical_u64();
        bytes[i * 8..(i + 1) * 8].copy_from_slice(&elem_u64.to_le_bytes());
    }
    bytes
}
