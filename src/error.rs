// ./src/error.rs
//! Error types for the rollup proof library
//!
//! Every variant is a precondition violation of one rule invocation. None are
//! retried internally; the caller decides whether to skip, requeue or abort.

use thiserror::Error;

use crate::state_transition::RollupState;
use crate::types::PublicKey;

/// The main error type for the rollup proof library
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum RollupError {
    /// Witness was drawn from a different root than the accumulator's current one
    #[error("Witness does not match the current accumulator root")]
    WitnessMismatch,

    /// Pop on an empty pending queue
    #[error("Pending deposit queue is empty")]
    EmptyQueue,

    /// Deposit targets a key that already owns an account
    #[error("Account already exists for key {0}")]
    DuplicateAccount(PublicKey),

    /// Signature does not authenticate the transaction under its sender
    #[error("Invalid transaction signature")]
    InvalidSignature,

    /// Sender (or receiver, per policy) has no account
    #[error("Unknown account: {0}")]
    UnknownAccount(PublicKey),

    /// Replayed or stale transaction
    #[error("Nonce mismatch: account is at {expected}, transaction carries {actual}")]
    NonceMismatch { expected: u32, actual: u32 },

    /// Transfer would underflow the sender balance
    #[error("Insufficient balance: have {balance}, need {amount}")]
    InsufficientBalance { balance: u64, amount: u64 },

    /// Credit would exceed the maximum balance
    #[error("Balance overflow: would exceed maximum value")]
    BalanceOverflow,

    /// Nonce overflow: cannot increment further
    #[error("Nonce overflow: cannot increment further")]
    NonceOverflow,

    /// Merge precondition `left.target == right.source` failed
    #[error("Non-contiguous transitions: left ends at {left_target}, right starts at {right_source}")]
    NonContiguousTransitions {
        left_target: RollupState,
        right_source: RollupState,
    },

    /// Reduction over zero proofs
    #[error("Cannot reduce an empty batch of proofs")]
    EmptyBatch,
}

/// Result type alias for the library
pub type Result<T> = std::result::Result<T, RollupError>;
