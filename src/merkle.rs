// src/merkle.rs

use sha2::{Digest, Sha256};

use crate::types::Bytes32;

/// Hashes two bytes32 together to form parent node.
pub fn hash_pair(left: Bytes32, right: Bytes32) -> Bytes32 {
    let mut hasher = Sha256::new();
    hasher.update(left);
    hasher.update(right);
    let result = hasher.finalize();
    let mut parent = [0u8; 32];
    parent.copy_from_slice(&result);
    parent
}

/// Hashes arbitrary bytes with SHA-256.
pub fn sha256(data: &[u8]) -> Bytes32 {
    let result = Sha256::digest(data);
    let mut out = [0u8; 32];
    out.copy_from_slice(&result);
    out
}

/// Computes the default hashes of empty subtrees, indexed by subtree height.
///
/// `defaults[0]` is the empty leaf, `defaults[depth]` the root of an empty tree.
pub fn empty_subtree_hashes(depth: usize) -> Vec<Bytes32> {
    let mut defaults = Vec::with_capacity(depth + 1);
    let mut current = [0u8; 32];
    defaults.push(current);
    for _ in 0..depth {
        current = hash_pair(current, current);
        defaults.push(current);
    }
    defaults
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_pair_inequality() {
        let a = [1u8; 32];
        let b = [2u8; 32];
        assert_ne!(hash_pair(a, b), hash_pair(b, a));
    }

    #[test]
    fn test_empty_subtree_hashes_chain() {
        let defaults = empty_subtree_hashes(3);
        assert_eq!(defaults.len(), 4);
        assert_eq!(defaults[0], [0u8; 32]);
        assert_eq!(defaults[1], hash_pair([0u8; 32], [0u8; 32]));
        assert_eq!(defaults[3], hash_pair(defaults[2], defaults[2]));
    }

    #[test]
    fn test_sha256_known_vector() {
        assert_eq!(
            hex::encode(sha256(b"abc")),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }
}
