// src/tree.rs
//! # Sparse Merkle Tree Module
//!
//! Keyed accumulator with membership and non-membership witnesses.
//!
//! The tree has a fixed depth of 256: a record lives at the leaf whose index is
//! the SHA-256 of its key encoding, read most-significant bit first from the
//! root. Internal nodes are `SHA-256(left || right)`. Empty subtrees are never
//! materialised; their hashes come from a precomputed table rooted at an
//! all-zero empty leaf. Occupied leaves hold the record's Poseidon digest.
//!
//! A [`Witness`] records the root it was drawn from. [`Accumulator::set`] only
//! accepts a witness for the current root, so an update computed against an
//! outdated snapshot is rejected instead of corrupting the commitment.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::error::{Result, RollupError};
use crate::merkle::{empty_subtree_hashes, hash_pair, sha256};
use crate::types::{Bytes32, PublicKey, ZERO_HASH};

/// Depth of every sparse Merkle tree, one level per bit of the leaf index.
pub const TREE_DEPTH: usize = 256;

/// Keys that can address a leaf.
pub trait TreeKey {
    /// 256-bit leaf index of this key.
    fn tree_path(&self) -> Bytes32;
}

impl TreeKey for PublicKey {
    fn tree_path(&self) -> Bytes32 { sha256(&self.serialize()) }
}

/// Records stored in a [`SparseMerkleTree`].
pub trait TreeLeaf: Clone {
    type Key: TreeKey;

    /// Key the record is stored under.
    fn key(&self) -> Self::Key;

    /// Digest placed in the leaf.
    fn leaf_hash(&self) -> Bytes32;
}

/// Commitment over a keyed collection with witnessed updates.
pub trait Accumulator {
    type Key;
    type Record;

    /// Current root. A pure function of the contents.
    fn commitment(&self) -> Bytes32;

    /// Returns an owned copy of the record (if any) and a witness for its leaf.
    fn get(&self, key: &Self::Key) -> (Option<Self::Record>, Witness);

    /// Writes `record` at the witnessed leaf and returns the new root.
    ///
    /// Fails with [`RollupError::WitnessMismatch`] if the witness was not drawn
    /// from the current root or does not address the record's key.
    fn set(&mut self, witness: &Witness, record: Self::Record) -> Result<Bytes32>;
}

/// Merkle path of one leaf under one root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Witness {
    /// Leaf index.
    pub path: Bytes32,
    /// Sibling hashes, leaf level first.
    pub siblings: Vec<Bytes32>,
    /// Root the witness was drawn from.
    pub root: Bytes32,
}

impl Witness {
    /// Recomputes the root for `leaf` placed at this witness's path.
    ///
    /// Fails with [`RollupError::WitnessMismatch`] unless the witness carries
    /// exactly [`TREE_DEPTH`] siblings.
    pub fn compute_root(&self, leaf: Bytes32) -> Result<Bytes32> {
        if self.siblings.len() != TREE_DEPTH {
            return Err(RollupError::WitnessMismatch);
        }
        let mut current = leaf;
        for (level, sibling) in self.siblings.iter().enumerate() {
            let depth = TREE_DEPTH - level;
            current = if path_bit(&self.path, depth - 1) {
                hash_pair(*sibling, current)
            } else {
                hash_pair(current, *sibling)
            };
        }
        Ok(current)
    }

    /// Whether `leaf` sits at this path under the recorded root.
    pub fn verify(&self, leaf: Bytes32) -> bool {
        self.compute_root(leaf).map_or(false, |root| root == self.root)
    }
}

/// Fixed-depth sparse Merkle tree keyed by [`TreeLeaf::Key`].
#[derive(Clone)]
pub struct SparseMerkleTree<V: TreeLeaf> {
    root: Bytes32,
    /// Materialised nodes keyed by (depth from root, path prefix).
    nodes: HashMap<(usize, Bytes32), Bytes32>,
    leaves: HashMap<Bytes32, V>,
    defaults: Vec<Bytes32>,
}

impl<V: TreeLeaf> SparseMerkleTree<V> {
    /// Creates a new empty tree.
    pub fn new() -> Self {
        let defaults = empty_subtree_hashes(TREE_DEPTH);
        Self {
            root: defaults[TREE_DEPTH],
            nodes: HashMap::new(),
            leaves: HashMap::new(),
            defaults,
        }
    }

    /// Root of a tree with no records.
    pub fn empty_root() -> Bytes32 { empty_subtree_hashes(TREE_DEPTH)[TREE_DEPTH] }

    pub fn len(&self) -> usize { self.leaves.len() }

    pub fn is_empty(&self) -> bool { self.leaves.is_empty() }

    /// Iterates over stored records in no particular order.
    pub fn records(&self) -> impl Iterator<Item = &V> { self.leaves.values() }

    /// Checks a lookup result against a witness without access to the tree.
    ///
    /// `record == None` checks non-membership.
    pub fn verify(key: &V::Key, record: Option<&V>, witness: &Witness) -> bool {
        if witness.path != key.tree_path() {
            return false;
        }
        let leaf = record.map(TreeLeaf::leaf_hash).unwrap_or(ZERO_HASH);
        witness.verify(leaf)
    }

    fn node(&self, depth: usize, prefix: &Bytes32) -> Bytes32 {
        self.nodes
            .get(&(depth, *prefix))
            .copied()
            .unwrap_or(self.defaults[TREE_DEPTH - depth])
    }

    fn current_leaf(&self, path: &Bytes32) -> Bytes32 {
        self.leaves.get(path).map(TreeLeaf::leaf_hash).unwrap_or(ZERO_HASH)
    }
}

impl<V: TreeLeaf> Default for SparseMerkleTree<V> {
    fn default() -> Self { Self::new() }
}

impl<V: TreeLeaf> Accumulator for SparseMerkleTree<V> {
    type Key = V::Key;
    type Record = V;

    fn commitment(&self) -> Bytes32 { self.root }

    fn get(&self, key: &V::Key) -> (Option<V>, Witness) {
        let path = key.tree_path();
        let siblings = (1..=TREE_DEPTH)
            .rev()
            .map(|depth| self.node(depth, &prefix(&flip_bit(&path, depth - 1), depth)))
            .collect();
        let record = self.leaves.get(&path).cloned();
        (record, Witness { path, siblings, root: self.root })
    }

    fn set(&mut self, witness: &Witness, record: V) -> Result<Bytes32> {
        if witness.root != self.root || record.key().tree_path() != witness.path {
            return Err(RollupError::WitnessMismatch);
        }
        if witness.compute_root(self.current_leaf(&witness.path))? != self.root {
            return Err(RollupError::WitnessMismatch);
        }

        let path = witness.path;
        let mut current = record.leaf_hash();
        self.nodes.insert((TREE_DEPTH, path), current);
        for (level, sibling) in witness.siblings.iter().enumerate() {
            let depth = TREE_DEPTH - level;
            current = if path_bit(&path, depth - 1) {
                hash_pair(*sibling, current)
            } else {
                hash_pair(current, *sibling)
            };
            self.nodes.insert((depth - 1, prefix(&path, depth - 1)), current);
        }

        self.root = current;
        self.leaves.insert(path, record);
        trace!(root = %hex::encode(self.root), "sparse merkle tree updated");
        Ok(self.root)
    }
}

impl<V: TreeLeaf> fmt::Debug for SparseMerkleTree<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SparseMerkleTree")
            .field("root", &hex::encode(self.root))
            .field("records", &self.leaves.len())
            .finish()
    }
}

fn path_bit(path: &Bytes32, index: usize) -> bool { (path[index / 8] >> (7 - index % 8)) & 1 == 1 }

fn flip_bit(path: &Bytes32, index: usize) -> Bytes32 {
    let mut out = *path;
    out[index / 8] ^= 1 << (7 - index % 8);
    out
}

/// Keeps the first `depth` bits of `path` and zeroes the rest.
fn prefix(path: &Bytes32, depth: usize) -> Bytes32 {
    let mut out = *path;
    let full = depth / 8;
    if full < out.len() {
        let rem = depth % 8;
        out[full] &= if rem == 0 { 0 } else { 0xffu8 << (8 - rem) };
        out[full + 1..].iter_mut().for_each(|b| *b = 0);
    }
    out
}
