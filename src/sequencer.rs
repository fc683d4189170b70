// src/sequencer.rs
//! Single-writer batch sequencer.
//!
//! A witness is only valid against the exact root it was drawn from, so rules
//! that touch the same accumulators must run one at a time. The sequencer owns
//! the account store and the pending queue, applies rules in order and keeps
//! the proofs of the open batch until it is sealed into one merged proof.

use tracing::info;

use crate::account::AccountStore;
use crate::builder::{capture_state, TransitionBuilder};
use crate::config::RollupConfig;
use crate::error::Result;
use crate::logging;
use crate::pending::{PendingQueue, RollupDeposit};
use crate::proof::{reduce, RollupProof};
use crate::state_transition::RollupState;
use crate::transaction::{RollupTransaction, Secp256k1Verifier, SignatureVerifier};
use crate::types::{Bytes32, Signature};

#[derive(Debug)]
pub struct Sequencer<V = Secp256k1Verifier> {
    builder: TransitionBuilder<V>,
    accounts: AccountStore,
    pending: PendingQueue,
    batch: Vec<RollupProof>,
}

impl Sequencer<Secp256k1Verifier> {
    /// Sequencer with the policies of `config`. Also installs the global
    /// tracing subscriber at `config.log_level` unless one is already set.
    pub fn new(config: &RollupConfig) -> Self {
        logging::init_from_config(config);
        Self::with_builder(TransitionBuilder::new().with_config(config))
    }
}

impl<V: SignatureVerifier> Sequencer<V> {
    pub fn with_builder(builder: TransitionBuilder<V>) -> Self {
        Self {
            builder,
            accounts: AccountStore::new(),
            pending: PendingQueue::new(),
            batch: Vec::new(),
        }
    }

    pub fn state(&self) -> RollupState { capture_state(&self.pending, &self.accounts) }

    pub fn accounts(&self) -> &AccountStore { &self.accounts }

    pub fn pending(&self) -> &PendingQueue { &self.pending }

    /// Proofs applied since the last seal, oldest first.
    pub fn pending_proofs(&self) -> &[RollupProof] { &self.batch }

    /// Queues a deposit. Enqueuing is not a rule and produces no proof.
    pub fn enqueue_deposit(&mut self, deposit: RollupDeposit) -> Bytes32 {
        self.pending.push(deposit)
    }

    pub fn apply_next_deposit(&mut self) -> Result<RollupProof> {
        let proof = self.builder.process_deposit(&mut self.pending, &mut self.accounts)?;
        self.batch.push(proof);
        Ok(proof)
    }

    pub fn apply_transaction(
        &mut self,
        tx: &RollupTransaction,
        signature: &Signature,
    ) -> Result<RollupProof> {
        let proof =
            self.builder
                .process_transaction(tx, signature, &self.pending, &mut self.accounts)?;
        self.batch.push(proof);
        Ok(proof)
    }

    /// Folds the open batch into one proof and starts a new batch.
    ///
    /// Fails with [`crate::RollupError::EmptyBatch`] when nothing was applied;
    /// the open batch is kept on failure.
    pub fn seal_batch(&mut self) -> Result<RollupProof> {
        let proof = reduce(self.batch.clone())?;
        info!(steps = self.batch.len(), transition = %proof.public_input(), "batch sealed");
        self.batch.clear();
        Ok(proof)
    }
}

#[cfg(test)]
mod tests {
    use secp256k1::{SecretKey, SECP256K1};

    use super::*;
    use crate::config::DepositPolicy;
    use crate::error::RollupError;
    use crate::proof::ProofBranch;
    use crate::types::PublicKey;

    fn keypair(seed: u8) -> (SecretKey, PublicKey) {
        let sk = SecretKey::from_slice(&[seed; 32]).unwrap();
        (sk, PublicKey::from_secret_key(SECP256K1, &sk))
    }

    fn crediting() -> Sequencer {
        let config =
            RollupConfig { deposit_policy: DepositPolicy::CreditAmount, ..Default::default() };
        Sequencer::new(&config)
    }

    #[test]
    fn test_seal_covers_whole_batch() -> Result<()> {
        let mut sequencer = crediting();
        sequencer.enqueue_deposit(RollupDeposit { public_key: keypair(1).1, amount: 100 });
        sequencer.enqueue_deposit(RollupDeposit { public_key: keypair(2).1, amount: 0 });
        let start = sequencer.state();

        sequencer.apply_next_deposit()?;
        sequencer.apply_next_deposit()?;
        let tx = RollupTransaction {
            sender: keypair(1).1,
            receiver: keypair(2).1,
            amount: 25,
            nonce: 0,
        };
        sequencer.apply_transaction(&tx, &tx.sign(&keypair(1).0).unwrap())?;
        assert_eq!(sequencer.pending_proofs().len(), 3);

        let sealed = sequencer.seal_batch()?;
        assert_eq!(sealed.branch(), ProofBranch::Merge);
        assert_eq!(*sealed.source(), start);
        assert_eq!(*sealed.target(), sequencer.state());
        assert!(sequencer.pending_proofs().is_empty());
        assert_eq!(sequencer.accounts().total_balance(), 100);
        Ok(())
    }

    #[test]
    fn test_rejected_rule_does_not_join_batch() -> Result<()> {
        let mut sequencer = crediting();
        sequencer.enqueue_deposit(RollupDeposit { public_key: keypair(1).1, amount: 10 });
        sequencer.apply_next_deposit()?;

        let tx = RollupTransaction {
            sender: keypair(1).1,
            receiver: keypair(1).1,
            amount: 11,
            nonce: 0,
        };
        let state = sequencer.state();
        assert!(sequencer.apply_transaction(&tx, &tx.sign(&keypair(1).0).unwrap()).is_err());
        assert_eq!(sequencer.state(), state);
        assert_eq!(sequencer.pending_proofs().len(), 1);
        Ok(())
    }

    #[test]
    fn test_new_installs_configured_subscriber() {
        let config = RollupConfig { log_level: "debug".to_string(), ..Default::default() };
        let sequencer = Sequencer::new(&config);
        assert!(!logging::init_tracing("info"));
        assert!(sequencer.pending_proofs().is_empty());
    }

    #[test]
    fn test_seal_empty_batch() {
        let mut sequencer = Sequencer::new(&RollupConfig::default());
        assert_eq!(sequencer.seal_batch(), Err(RollupError::EmptyBatch));
    }

    #[test]
    fn test_consecutive_batches_chain() -> Result<()> {
        let mut sequencer = Sequencer::new(&RollupConfig::default());
        for seed in 1..=4 {
            sequencer.enqueue_deposit(RollupDeposit { public_key: keypair(seed).1, amount: 1 });
        }
        sequencer.apply_next_deposit()?;
        sequencer.apply_next_deposit()?;
        let first = sequencer.seal_batch()?;
        sequencer.apply_next_deposit()?;
        sequencer.apply_next_deposit()?;
        let second = sequencer.seal_batch()?;

        let whole = first.merge(&second)?;
        assert_eq!(whole.target().pending_commitment, sequencer.pending().commitment());
        assert_eq!(sequencer.accounts().len(), 4);
        Ok(())
    }
}
