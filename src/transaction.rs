// src/transaction.rs
//! Signed transfers between rollup accounts.

use secp256k1::{Message, SecretKey, SECP256K1};
use serde::{Deserialize, Serialize};

use crate::encoding::{public_key_to_fields, u32_to_field, u64_to_fields, ToFields, F};
use crate::types::{Bytes32, PublicKey, Signature};

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct RollupTransaction {
    pub sender: PublicKey,
    pub receiver: PublicKey,
    pub amount: u64,
    pub nonce: u32,
}

impl RollupTransaction {
    /// Message the sender signs: the Poseidon digest of the canonical encoding.
    pub fn signing_message(&self) -> Bytes32 { self.digest() }

    /// Signs the transaction. `secret_key` must belong to `sender` for the
    /// signature to verify.
    pub fn sign(&self, secret_key: &SecretKey) -> Result<Signature, secp256k1::Error> {
        let message = Message::from_slice(&self.signing_message())?;
        Ok(SECP256K1.sign_ecdsa(&message, secret_key))
    }
}

impl ToFields for RollupTransaction {
    fn to_fields(&self) -> Vec<F> {
        let mut fields = public_key_to_fields(&self.sender);
        fields.extend(public_key_to_fields(&self.receiver));
        fields.extend(u64_to_fields(self.amount));
        fields.push(u32_to_field(self.nonce));
        fields
    }
}

/// Signature-verification primitive supplied by the proving environment.
pub trait SignatureVerifier {
    fn verify(&self, public_key: &PublicKey, message: &Bytes32, signature: &Signature) -> bool;
}

/// ECDSA over secp256k1.
#[derive(Debug, Clone, Copy, Default)]
pub struct Secp256k1Verifier;

impl SignatureVerifier for Secp256k1Verifier {
    fn verify(&self, public_key: &PublicKey, message: &Bytes32, signature: &Signature) -> bool {
        match Message::from_slice(message) {
            Ok(message) => SECP256K1.verify_ecdsa(&message, signature, public_key).is_ok(),
            Err(_) => false,
        }
    }
}
