// src/pending.rs
//! Pending deposits and their stack commitment.
//!
//! The queue commits to its contents as a hash chain:
//! `c0 = ZERO`, `c(n+1) = SHA-256(c(n) || digest(deposit(n+1)))`.
//! Deposits are consumed newest first, and popping one restores exactly the
//! commitment that preceded its push.

use serde::{Deserialize, Serialize};

use crate::encoding::{public_key_to_fields, u64_to_fields, ToFields, F};
use crate::error::{Result, RollupError};
use crate::merkle::hash_pair;
use crate::types::{Bytes32, PublicKey, ZERO_HASH};

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct RollupDeposit {
    pub public_key: PublicKey,
    pub amount: u64,
}

impl ToFields for RollupDeposit {
    fn to_fields(&self) -> Vec<F> {
        let mut fields = public_key_to_fields(&self.public_key);
        fields.extend(u64_to_fields(self.amount));
        fields
    }
}

#[derive(Debug, Clone)]
struct Entry {
    deposit: RollupDeposit,
    /// Commitment before this deposit was pushed.
    below: Bytes32,
}

/// LIFO queue of deposits awaiting processing.
#[derive(Debug, Clone)]
pub struct PendingQueue {
    entries: Vec<Entry>,
    commitment: Bytes32,
}

impl PendingQueue {
    pub fn new() -> Self { Self { entries: Vec::new(), commitment: ZERO_HASH } }

    pub fn commitment(&self) -> Bytes32 { self.commitment }

    pub fn len(&self) -> usize { self.entries.len() }

    pub fn is_empty(&self) -> bool { self.entries.is_empty() }

    /// Enqueues a deposit and returns the new commitment.
    pub fn push(&mut self, deposit: RollupDeposit) -> Bytes32 {
        let below = self.commitment;
        self.commitment = hash_pair(below, deposit.digest());
        self.entries.push(Entry { deposit, below });
        self.commitment
    }

    /// Newest deposit, left in place.
    pub fn peek(&self) -> Result<&RollupDeposit> {
        self.entries.last().map(|e| &e.deposit).ok_or(RollupError::EmptyQueue)
    }

    /// Removes and returns the newest deposit.
    pub fn pop(&mut self) -> Result<RollupDeposit> {
        let entry = self.entries.pop().ok_or(RollupError::EmptyQueue)?;
        self.commitment = entry.below;
        Ok(entry.deposit)
    }
}

impl Default for PendingQueue {
    fn default() -> Self { Self::new() }
}

impl FromIterator<RollupDeposit> for PendingQueue {
    fn from_iter<I: IntoIterator<Item = RollupDeposit>>(iter: I) -> Self {
        let mut queue = Self::new();
        for deposit in iter {
            queue.push(deposit);
        }
        queue
    }
}
