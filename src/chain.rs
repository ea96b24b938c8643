//! Ordering of decoded blocks and index entries
//!
//! Block files store blocks in arrival order, not chain order.

use std::collections::{HashMap, HashSet};

use log::warn;

use crate::hashes::to_hex;
use crate::types::*;

/// Order blocks by previous-hash linkage.
///
/// The walk starts at the block whose parent is not among `blocks` and follows
/// children. With several candidate roots, the first one in input order wins. Blocks
/// not on the resulting chain (forks, orphans) are dropped.
pub fn order_by_linkage(blocks: Vec<Block>) -> Vec<Block> {
    let mut by_parent: HashMap<Hash, Block> = HashMap::with_capacity(blocks.len());
    let known: HashSet<Hash> = blocks.iter().map(|b| b.hash).collect();
    let mut root = None;
    let total = blocks.len();

    for block in blocks {
        if root.is_none() && !known.contains(&block.header.prev_block_hash) {
            root = Some(block.header.prev_block_hash);
        }
        by_parent.entry(block.header.prev_block_hash).or_insert(block);
    }

    let mut ordered = Vec::with_capacity(total);
    let mut next = root;
    while let Some(parent) = next {
        match by_parent.remove(&parent) {
            Some(block) => {
                next = Some(block.hash);
                ordered.push(block);
            }
            None => next = None,
        }
    }

    if ordered.len() != total {
        warn!(
            "{} of {} blocks are not linked to the chain starting after {}",
            total - ordered.len(),
            total,
            root.as_ref().map(to_hex).unwrap_or_default()
        );
    }
    ordered
}

/// Sort index entries by height; entries at equal heights keep their relative order.
pub fn sort_by_height(entries: &mut [BlockIndexEntry]) {
    entries.sort_by_key(|e| e.height);
}
