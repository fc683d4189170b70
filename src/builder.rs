// src/builder.rs
//! # Transition builder
//!
//! The three rules of the rollup proof system:
//!
//! * **deposit**: pop the newest pending deposit and open a fresh account for it;
//! * **transaction**: apply a signed transfer between two accounts;
//! * **merge**: compose two contiguous proofs into one.
//!
//! Each leaf rule captures the [`RollupState`] before and after it runs and
//! returns the pair as the public input of a [`RollupProof`]. Every
//! precondition is checked before the first write, so a rejected input leaves
//! both accumulators exactly as they were.

use tracing::{debug, warn};

use crate::account::RollupAccount;
use crate::config::{DepositPolicy, ReceiverPolicy, RollupConfig};
use crate::error::{Result, RollupError};
use crate::pending::PendingQueue;
use crate::proof::RollupProof;
use crate::state_transition::{RollupState, RollupStateTransition};
use crate::transaction::{RollupTransaction, Secp256k1Verifier, SignatureVerifier};
use crate::tree::Accumulator;
use crate::types::{PublicKey, Signature};

/// Snapshot of both commitments.
pub fn capture_state<A>(pending: &PendingQueue, accounts: &A) -> RollupState
where
    A: Accumulator<Key = PublicKey, Record = RollupAccount>,
{
    RollupState::new(pending.commitment(), accounts.commitment())
}

#[derive(Debug, Clone)]
pub struct TransitionBuilder<V = Secp256k1Verifier> {
    verifier: V,
    deposit_policy: DepositPolicy,
    receiver_policy: ReceiverPolicy,
}

impl TransitionBuilder<Secp256k1Verifier> {
    /// Builder with secp256k1 verification and the default policies.
    pub fn new() -> Self { Self::with_verifier(Secp256k1Verifier) }
}

impl Default for TransitionBuilder<Secp256k1Verifier> {
    fn default() -> Self { Self::new() }
}

impl<V: SignatureVerifier> TransitionBuilder<V> {
    pub fn with_verifier(verifier: V) -> Self {
        Self {
            verifier,
            deposit_policy: DepositPolicy::default(),
            receiver_policy: ReceiverPolicy::default(),
        }
    }

    /// Applies the policies of `config`.
    pub fn with_config(self, config: &RollupConfig) -> Self {
        self.with_deposit_policy(config.deposit_policy)
            .with_receiver_policy(config.receiver_policy)
    }

    pub fn with_deposit_policy(mut self, policy: DepositPolicy) -> Self {
        self.deposit_policy = policy;
        self
    }

    pub fn with_receiver_policy(mut self, policy: ReceiverPolicy) -> Self {
        self.receiver_policy = policy;
        self
    }

    pub fn deposit_policy(&self) -> DepositPolicy { self.deposit_policy }

    pub fn receiver_policy(&self) -> ReceiverPolicy { self.receiver_policy }

    /// Processes the newest pending deposit by creating its account.
    ///
    /// Fails with [`RollupError::EmptyQueue`] when nothing is pending and with
    /// [`RollupError::DuplicateAccount`] when the key already has an account.
    pub fn process_deposit<A>(
        &self,
        pending: &mut PendingQueue,
        accounts: &mut A,
    ) -> Result<RollupProof>
    where
        A: Accumulator<Key = PublicKey, Record = RollupAccount>,
    {
        self.apply_deposit(pending, accounts).map_err(|err| {
            warn!(%err, "deposit rejected");
            err
        })
    }

    fn apply_deposit<A>(&self, pending: &mut PendingQueue, accounts: &mut A) -> Result<RollupProof>
    where
        A: Accumulator<Key = PublicKey, Record = RollupAccount>,
    {
        let before = capture_state(pending, accounts);

        let deposit = *pending.peek()?;
        let (existing, witness) = accounts.get(&deposit.public_key);
        if existing.is_some() {
            return Err(RollupError::DuplicateAccount(deposit.public_key));
        }

        let balance = match self.deposit_policy {
            DepositPolicy::ZeroBalance => 0,
            DepositPolicy::CreditAmount => deposit.amount,
        };
        accounts.set(&witness, RollupAccount::new(deposit.public_key, balance))?;
        pending.pop()?;

        let after = capture_state(pending, accounts);
        debug!(
            key = %deposit.public_key,
            amount = deposit.amount,
            balance,
            source = %before,
            target = %after,
            "deposit processed"
        );
        Ok(RollupProof::Deposit(RollupStateTransition::new(before, after)))
    }

    /// Applies a signed transfer from `tx.sender` to `tx.receiver`.
    ///
    /// The signature is checked first, then the sender's existence, nonce and
    /// balance, then the receiver. The sender's nonce advances by one, which
    /// makes a resubmission of the same signed transaction fail with
    /// [`RollupError::NonceMismatch`].
    pub fn process_transaction<A>(
        &self,
        tx: &RollupTransaction,
        signature: &Signature,
        pending: &PendingQueue,
        accounts: &mut A,
    ) -> Result<RollupProof>
    where
        A: Accumulator<Key = PublicKey, Record = RollupAccount>,
    {
        self.apply_transaction(tx, signature, pending, accounts).map_err(|err| {
            warn!(%err, sender = %tx.sender, nonce = tx.nonce, "transaction rejected");
            err
        })
    }

    fn apply_transaction<A>(
        &self,
        tx: &RollupTransaction,
        signature: &Signature,
        pending: &PendingQueue,
        accounts: &mut A,
    ) -> Result<RollupProof>
    where
        A: Accumulator<Key = PublicKey, Record = RollupAccount>,
    {
        if !self.verifier.verify(&tx.sender, &tx.signing_message(), signature) {
            return Err(RollupError::InvalidSignature);
        }

        let before = capture_state(pending, accounts);

        let (sender, sender_witness) = accounts.get(&tx.sender);
        let sender = sender.ok_or(RollupError::UnknownAccount(tx.sender))?;
        if sender.nonce != tx.nonce {
            return Err(RollupError::NonceMismatch { expected: sender.nonce, actual: tx.nonce });
        }
        let debited = sender.debit(tx.amount)?;

        // A self-transfer credits the debited record, which cannot overflow.
        if tx.receiver != tx.sender {
            match accounts.get(&tx.receiver).0 {
                Some(receiver) => {
                    receiver.credit(tx.amount)?;
                }
                None if self.receiver_policy == ReceiverPolicy::RequireExisting => {
                    return Err(RollupError::UnknownAccount(tx.receiver));
                }
                None => {}
            }
        }

        accounts.set(&sender_witness, debited)?;

        let (receiver, receiver_witness) = accounts.get(&tx.receiver);
        let credited = match receiver {
            Some(receiver) => receiver.credit(tx.amount)?,
            None => RollupAccount::new(tx.receiver, tx.amount),
        };
        accounts.set(&receiver_witness, credited)?;

        let after = capture_state(pending, accounts);
        debug!(
            sender = %tx.sender,
            receiver = %tx.receiver,
            amount = tx.amount,
            nonce = tx.nonce,
            source = %before,
            target = %after,
            "transaction processed"
        );
        Ok(RollupProof::Transaction(RollupStateTransition::new(before, after)))
    }

    /// Composes two contiguous proofs. See [`RollupProof::merge`].
    pub fn merge(&self, first: &RollupProof, second: &RollupProof) -> Result<RollupProof> {
        first.merge(second).map_err(|err| {
            warn!(%err, "merge rejected");
            err
        })
    }
}
