//! Hash primitives and merkle root computation
//!
//! Hashes handed around the crate are in display order. The helpers here take care of
//! flipping to wire order wherever a hash feeds another hash.

use bitcoin_hashes::{sha256d, Hash as BitcoinHash, HashEngine};
use ripemd::Ripemd160;
use sha2::{Digest, Sha256};

use crate::types::Hash;

/// SHA256(SHA256(x)) in wire order
pub fn sha256d(data: &[u8]) -> Hash {
    sha256d::Hash::hash(data).into_inner()
}

/// SHA256(SHA256(a ‖ b ‖ ...)) in wire order, without concatenating the parts
pub fn sha256d_parts(parts: &[&[u8]]) -> Hash {
    let mut engine = sha256d::Hash::engine();
    for part in parts {
        engine.input(part);
    }
    sha256d::Hash::from_engine(engine).into_inner()
}

/// RIPEMD160(SHA256(x))
pub fn hash160(data: &[u8]) -> [u8; 20] {
    let sha256_hash = Sha256::digest(data);
    let ripemd160_hash = Ripemd160::digest(sha256_hash);
    let mut out = [0u8; 20];
    out.copy_from_slice(&ripemd160_hash);
    out
}

/// Double-SHA256 reversed into display order
pub fn display_hash(data: &[u8]) -> Hash {
    reversed(&sha256d(data))
}

pub fn reversed(hash: &Hash) -> Hash {
    let mut out = *hash;
    out.reverse();
    out
}

/// Hex string of a display-order hash
pub fn to_hex(hash: &Hash) -> String {
    hex::encode(hash)
}

/// Parse a display-order hex hash
pub fn from_hex(s: &str) -> Option<Hash> {
    let bytes = hex::decode(s).ok()?;
    bytes.try_into().ok()
}

fn hash_pair(left: &Hash, right: &Hash) -> Hash {
    let left = reversed(left);
    let right = reversed(right);
    reversed(&sha256d_parts(&[&left, &right]))
}

/// Merkle root over display-order transaction hashes.
///
/// Pairs are hashed as SHA256d(rev(a) ‖ rev(b)) and reversed back; a level with an odd
/// number of entries duplicates its last one. Returns `None` for an empty list.
pub fn merkle_root(hashes: &[Hash]) -> Option<Hash> {
    let mut level = hashes.to_vec();
    if level.is_empty() {
        return None;
    }

    while level.len() > 1 {
        level = level
            .chunks(2)
            .map(|chunk| match chunk {
                [left, right] => hash_pair(left, right),
                [last] => hash_pair(last, last),
                _ => unreachable!("chunks(2) yields one or two items"),
            })
            .collect();
    }

    Some(level[0])
}
