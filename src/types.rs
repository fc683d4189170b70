//! Core type definitions for the rollup proof library
//!
//! This module defines fundamental types used across multiple modules,
//! providing a centralized location for shared type definitions.

/// Type alias for 32-byte arrays used as commitments and digests
pub type Bytes32 = [u8; 32];

/// Commitment of an empty accumulator.
pub const ZERO_HASH: Bytes32 = [0u8; 32];

/// Account owner and deposit recipient key.
pub use secp256k1::PublicKey;

/// Transaction signature, attributable to the sender key.
pub use secp256k1::ecdsa::Signature;
