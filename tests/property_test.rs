// File: tests/property_test.rs
//! Randomised checks of the rollup invariants, driven by a seeded RNG so
//! failures reproduce.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rollup_proof::account::AccountStore;
use rollup_proof::{
    Accumulator, DepositPolicy, PendingQueue, PublicKey, RollupDeposit, RollupError, RollupProof,
    RollupTransaction, TransitionBuilder,
};
use secp256k1::{SecretKey, SECP256K1};

const ACCOUNTS: u8 = 6;

fn keypair(seed: u8) -> (SecretKey, PublicKey) {
    let sk = SecretKey::from_slice(&[seed; 32]).expect("seed is a valid secret key");
    (sk, PublicKey::from_secret_key(SECP256K1, &sk))
}

/// Store and queue after crediting deposits of random size to every account.
fn seeded_rollup(rng: &mut StdRng, builder: &TransitionBuilder) -> (PendingQueue, AccountStore) {
    let mut pending: PendingQueue = (1..=ACCOUNTS)
        .map(|seed| RollupDeposit { public_key: keypair(seed).1, amount: rng.gen_range(0..1_000) })
        .collect();
    let mut accounts = AccountStore::new();
    for _ in 0..ACCOUNTS {
        builder.process_deposit(&mut pending, &mut accounts).unwrap();
    }
    (pending, accounts)
}

#[test]
fn prop_transfers_conserve_value_and_advance_nonces() {
    let builder = TransitionBuilder::new().with_deposit_policy(DepositPolicy::CreditAmount);
    for seed in 0..8u64 {
        let mut rng = StdRng::seed_from_u64(seed);
        let (pending, mut accounts) = seeded_rollup(&mut rng, &builder);
        let total = accounts.total_balance();

        for _ in 0..40 {
            let from = rng.gen_range(1..=ACCOUNTS);
            let to = rng.gen_range(1..=ACCOUNTS);
            let (sk, sender) = keypair(from);
            let receiver = keypair(to).1;
            let before_sender = accounts.account(&sender).unwrap();
            let before_receiver = accounts.account(&receiver).unwrap();
            let amount = rng.gen_range(0..=before_sender.balance + 50);
            let tx = RollupTransaction { sender, receiver, amount, nonce: before_sender.nonce };
            let root = accounts.commitment();

            match builder.process_transaction(&tx, &tx.sign(&sk).unwrap(), &pending, &mut accounts) {
                Ok(proof) => {
                    let after_sender = accounts.account(&sender).unwrap();
                    let after_receiver = accounts.account(&receiver).unwrap();
                    assert_eq!(after_sender.nonce, before_sender.nonce + 1);
                    if from != to {
                        assert_eq!(
                            after_sender.balance as u128 + after_receiver.balance as u128,
                            before_sender.balance as u128 + before_receiver.balance as u128
                        );
                    }
                    assert_eq!(proof.source().account_commitment, root);
                }
                Err(err) => {
                    assert!(amount > before_sender.balance);
                    assert_eq!(
                        err,
                        RollupError::InsufficientBalance { balance: before_sender.balance, amount }
                    );
                    assert_eq!(accounts.commitment(), root);
                }
            }
            assert_eq!(accounts.total_balance(), total);
        }
    }
}

#[test]
fn prop_replayed_transactions_always_fail() {
    let builder = TransitionBuilder::new().with_deposit_policy(DepositPolicy::CreditAmount);
    let mut rng = StdRng::seed_from_u64(42);
    let (pending, mut accounts) = seeded_rollup(&mut rng, &builder);

    let mut applied = Vec::new();
    for _ in 0..20 {
        let from = rng.gen_range(1..=ACCOUNTS);
        let (sk, sender) = keypair(from);
        let receiver = keypair(rng.gen_range(1..=ACCOUNTS)).1;
        let nonce = accounts.account(&sender).unwrap().nonce;
        let tx = RollupTransaction { sender, receiver, amount: 0, nonce };
        let sig = tx.sign(&sk).unwrap();
        builder.process_transaction(&tx, &sig, &pending, &mut accounts).unwrap();
        applied.push((tx, sig));
    }

    for (tx, sig) in applied {
        let result = builder.process_transaction(&tx, &sig, &pending, &mut accounts);
        assert!(matches!(result, Err(RollupError::NonceMismatch { actual, .. }) if actual == tx.nonce));
    }
}

#[test]
fn prop_duplicate_deposits_rejected() {
    let builder = TransitionBuilder::new();
    let mut rng = StdRng::seed_from_u64(7);
    let mut pending = PendingQueue::new();
    let mut accounts = AccountStore::new();

    let mut seen = std::collections::HashSet::new();
    for _ in 0..30 {
        let seed = rng.gen_range(1..=ACCOUNTS);
        pending.push(RollupDeposit { public_key: keypair(seed).1, amount: 1 });
        match builder.process_deposit(&mut pending, &mut accounts) {
            Ok(_) => assert!(seen.insert(seed)),
            Err(err) => {
                assert!(seen.contains(&seed));
                assert_eq!(err, RollupError::DuplicateAccount(keypair(seed).1));
                // Drop the rejected deposit so the next one sits on top.
                pending.pop().unwrap();
            }
        }
    }
    assert_eq!(accounts.len(), seen.len());
}

#[test]
fn prop_merge_associative_over_random_splits() {
    let builder = TransitionBuilder::new().with_deposit_policy(DepositPolicy::CreditAmount);
    let mut rng = StdRng::seed_from_u64(99);
    let (pending, mut accounts) = seeded_rollup(&mut rng, &builder);

    let mut proofs: Vec<RollupProof> = Vec::new();
    for _ in 0..12 {
        let (sk, sender) = keypair(rng.gen_range(1..=ACCOUNTS));
        let receiver = keypair(rng.gen_range(1..=ACCOUNTS)).1;
        let account = accounts.account(&sender).unwrap();
        let amount = rng.gen_range(0..=account.balance);
        let tx = RollupTransaction { sender, receiver, amount, nonce: account.nonce };
        proofs.push(builder.process_transaction(&tx, &tx.sign(&sk).unwrap(), &pending, &mut accounts).unwrap());
    }

    let expected = rollup_proof::reduce(proofs.clone()).unwrap();
    for _ in 0..10 {
        let split = rng.gen_range(1..proofs.len());
        let left = rollup_proof::reduce(proofs[..split].to_vec()).unwrap();
        let right = rollup_proof::reduce(proofs[split..].to_vec()).unwrap();
        let merged = builder.merge(&left, &right).unwrap();
        assert_eq!(merged.source(), expected.source());
        assert_eq!(merged.target(), expected.target());
    }
}
