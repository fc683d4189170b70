// src/account.rs
//! Rollup accounts and the keyed account store.

use serde::{Deserialize, Serialize};

use crate::encoding::{public_key_to_fields, u32_to_field, u64_to_fields, ToFields, F};
use crate::error::{Result, RollupError};
use crate::tree::{Accumulator, SparseMerkleTree, TreeLeaf, Witness};
use crate::types::{Bytes32, PublicKey};

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct RollupAccount {
    pub balance: u64,
    pub nonce: u32,
    pub owner_key: PublicKey,
}

impl RollupAccount {
    /// Fresh account as minted by deposit processing.
    pub fn new(owner_key: PublicKey, balance: u64) -> Self { Self { balance, nonce: 0, owner_key } }

    /// Debits `amount` and advances the nonce.
    pub fn debit(&self, amount: u64) -> Result<Self> {
        let balance = self
            .balance
            .checked_sub(amount)
            .ok_or(RollupError::InsufficientBalance { balance: self.balance, amount })?;
        let nonce = self.nonce.checked_add(1).ok_or(RollupError::NonceOverflow)?;
        Ok(Self { balance, nonce, owner_key: self.owner_key })
    }

    pub fn credit(&self, amount: u64) -> Result<Self> {
        let balance = self.balance.checked_add(amount).ok_or(RollupError::BalanceOverflow)?;
        Ok(Self { balance, ..*self })
    }
}

impl ToFields for RollupAccount {
    fn to_fields(&self) -> Vec<F> {
        let mut fields = u64_to_fields(self.balance).to_vec();
        fields.push(u32_to_field(self.nonce));
        fields.extend(public_key_to_fields(&self.owner_key));
        fields
    }
}

impl TreeLeaf for RollupAccount {
    type Key = PublicKey;

    fn key(&self) -> PublicKey { self.owner_key }

    fn leaf_hash(&self) -> Bytes32 { self.digest() }
}

/// Keyed accumulator of [`RollupAccount`] records, one per owner key.
#[derive(Debug, Clone, Default)]
pub struct AccountStore {
    tree: SparseMerkleTree<RollupAccount>,
}

impl AccountStore {
    pub fn new() -> Self { Self::default() }

    pub fn len(&self) -> usize { self.tree.len() }

    pub fn is_empty(&self) -> bool { self.tree.is_empty() }

    /// Looks up an account without producing a witness.
    pub fn account(&self, key: &PublicKey) -> Option<RollupAccount> { self.tree.get(key).0 }

    pub fn accounts(&self) -> impl Iterator<Item = &RollupAccount> { self.tree.records() }

    /// Sum of all balances, widened so it cannot overflow.
    pub fn total_balance(&self) -> u128 { self.accounts().map(|a| a.balance as u128).sum() }
}

impl Accumulator for AccountStore {
    type Key = PublicKey;
    type Record = RollupAccount;

    fn commitment(&self) -> Bytes32 { self.tree.commitment() }

    fn get(&self, key: &PublicKey) -> (Option<RollupAccount>, Witness) { self.tree.get(key) }

    fn set(&mut self, witness: &Witness, record: RollupAccount) -> Result<Bytes32> {
        self.tree.set(witness, record)
    }
}
