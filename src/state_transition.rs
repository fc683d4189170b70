// src/state_transition.rs
//! Commitment snapshots and the transitions between them.
//!
//! A [`RollupStateTransition`] is the only thing a proof reveals: the rollup
//! moved from `source` to `target` through one batch of validated operations.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::encoding::{bytes_to_fields, ToFields, F};
use crate::error::{Result, RollupError};
use crate::types::Bytes32;

/// Number of field elements in an encoded [`RollupState`].
pub const STATE_FIELDS: usize = 16;

/// Snapshot of both accumulators at one instant.
///
/// Two states are equal iff both commitments are bit-identical.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RollupState {
    pub pending_commitment: Bytes32,
    pub account_commitment: Bytes32,
}

impl RollupState {
    pub fn new(pending_commitment: Bytes32, account_commitment: Bytes32) -> Self {
        Self { pending_commitment, account_commitment }
    }
}

impl ToFields for RollupState {
    fn to_fields(&self) -> Vec<F> {
        let mut fields = bytes_to_fields(&self.pending_commitment);
        fields.extend(bytes_to_fields(&self.account_commitment));
        fields
    }
}

impl fmt::Display for RollupState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "(pending: 0x{}, accounts: 0x{})",
            hex::encode(self.pending_commitment),
            hex::encode(self.account_commitment)
        )
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RollupStateTransition {
    pub source: RollupState,
    pub target: RollupState,
}

impl RollupStateTransition {
    pub fn new(source: RollupState, target: RollupState) -> Self { Self { source, target } }

    /// Chains `self` and `next` into one transition covering both.
    ///
    /// Requires `self.target == next.source`.
    pub fn chain(&self, next: &RollupStateTransition) -> Result<RollupStateTransition> {
        if self.target != next.source {
            return Err(RollupError::NonContiguousTransitions {
                left_target: self.target,
                right_source: next.source,
            });
        }
        Ok(RollupStateTransition::new(self.source, next.target))
    }

    /// Whether the transition leaves both commitments unchanged.
    pub fn is_identity(&self) -> bool { self.source == self.target }
}

impl ToFields for RollupStateTransition {
    fn to_fields(&self) -> Vec<F> {
        let mut fields = self.source.to_fields();
        fields.extend(self.target.to_fields());
        fields
    }
}

impl fmt::Display for RollupStateTransition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.source, self.target)
    }
}
