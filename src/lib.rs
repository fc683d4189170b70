// ./src/lib.rs
//! Rollup state-transition proof core.
//!
//! Deposits and signed transfers move an account accumulator from one
//! commitment to the next; each move is captured as a [`RollupProof`] whose
//! public input is the [`RollupStateTransition`]. Contiguous proofs merge into
//! one covering the whole batch.

pub mod account;
pub mod builder;
pub mod config;
pub mod encoding;
pub mod error;
pub mod logging;
pub mod merkle;
pub mod pending;
pub mod proof;
pub mod sequencer;
pub mod state_transition;
pub mod transaction;
pub mod tree;
pub mod types;

pub use account::{AccountStore, RollupAccount};
pub use builder::TransitionBuilder;
pub use config::{DepositPolicy, ReceiverPolicy, RollupConfig};
pub use error::{Result, RollupError};
pub use pending::{PendingQueue, RollupDeposit};
pub use proof::{reduce, ProofBranch, RollupProof};
pub use sequencer::Sequencer;
pub use state_transition::{RollupState, RollupStateTransition};
pub use transaction::{RollupTransaction, Secp256k1Verifier, SignatureVerifier};
pub use tree::{Accumulator, SparseMerkleTree, Witness};
pub use types::{Bytes32, PublicKey, Signature};
