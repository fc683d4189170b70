// src/proof.rs
//! # Recursive proof artifacts
//!
//! A [`RollupProof`] is what the proving environment hands back for one rule
//! invocation. Its validity is certified by that environment; this crate only
//! sees the public [`RollupStateTransition`] and the branch that produced it.
//!
//! Merging two artifacts is the composition step of recursion: if one proof
//! moves the rollup from `a` to `b` and another from `b` to `c`, their merge
//! moves it from `a` to `c`. Merge is associative, so a batch can be folded as
//! a balanced tree instead of a sequential chain.

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::encoding::{ToFields, F};
use crate::error::{Result, RollupError};
use crate::state_transition::{RollupState, RollupStateTransition};
use crate::types::Bytes32;

/// Branch of the proof system that produced an artifact.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProofBranch {
    Deposit,
    Transaction,
    Merge,
}

impl fmt::Display for ProofBranch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ProofBranch::Deposit => "deposit",
            ProofBranch::Transaction => "transaction",
            ProofBranch::Merge => "merge",
        };
        f.write_str(name)
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum RollupProof {
    Deposit(RollupStateTransition),
    Transaction(RollupStateTransition),
    Merge(RollupStateTransition),
}

impl RollupProof {
    /// The public input of the proof.
    pub fn public_input(&self) -> &RollupStateTransition {
        match self {
            RollupProof::Deposit(t) | RollupProof::Transaction(t) | RollupProof::Merge(t) => t,
        }
    }

    pub fn source(&self) -> &RollupState { &self.public_input().source }

    pub fn target(&self) -> &RollupState { &self.public_input().target }

    pub fn branch(&self) -> ProofBranch {
        match self {
            RollupProof::Deposit(_) => ProofBranch::Deposit,
            RollupProof::Transaction(_) => ProofBranch::Transaction,
            RollupProof::Merge(_) => ProofBranch::Merge,
        }
    }

    /// Field encoding of the public input, as bound by the proving harness.
    pub fn public_inputs(&self) -> Vec<F> { self.public_input().to_fields() }

    /// Poseidon digest of [`RollupProof::public_inputs`].
    pub fn digest(&self) -> Bytes32 { self.public_input().digest() }

    /// Composes `self` followed by `next`.
    ///
    /// Fails with [`RollupError::NonContiguousTransitions`] unless
    /// `self.target() == next.source()`. Neither child is re-executed.
    pub fn merge(&self, next: &RollupProof) -> Result<RollupProof> {
        let transition = self.public_input().chain(next.public_input())?;
        debug!(
            left = %self.branch(),
            right = %next.branch(),
            source = %transition.source,
            target = %transition.target,
            "merged rollup proofs"
        );
        Ok(RollupProof::Merge(transition))
    }
}

impl fmt::Display for RollupProof {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} proof {}", self.branch(), self.public_input())
    }
}

/// Folds a sequence of contiguous proofs into one with a balanced merge tree.
///
/// Adjacent pairs are merged level by level; an odd proof at the end of a
/// level is carried up unchanged. A single proof reduces to itself.
pub fn reduce(proofs: Vec<RollupProof>) -> Result<RollupProof> {
    let mut level = proofs;
    if level.is_empty() {
        return Err(RollupError::EmptyBatch);
    }
    while level.len() > 1 {
        let mut next = Vec::with_capacity(level.len().div_ceil(2));
        let mut iter = level.into_iter();
        while let Some(left) = iter.next() {
            match iter.next() {
                Some(right) => next.push(left.merge(&right)?),
                None => next.push(left),
            }
        }
        level = next;
    }
    level.pop().ok_or(RollupError::EmptyBatch)
}
