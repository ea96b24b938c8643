//! Block decoding: record framing, header, transactions and merkle verification

use log::{debug, warn};

use crate::constants::*;
use crate::error::{DecodeError, Result};
use crate::hashes::{display_hash, merkle_root, to_hex};
use crate::params::ChainParams;
use crate::reader::Cursor;
use crate::transaction::{decode_transaction, TxContext};
use crate::types::*;

/// Decode the fixed 80-byte header layout
pub fn decode_header(cursor: &mut Cursor) -> Result<BlockHeader> {
    Ok(BlockHeader {
        version: cursor.read_i32_le()?,
        prev_block_hash: cursor.read_hash()?,
        merkle_root: cursor.read_hash()?,
        timestamp: cursor.read_u32_le()?,
        bits: cursor.read_u32_le()?,
        nonce: cursor.read_u32_le()?,
    })
}

/// Advance to the next occurrence of `magic`.
///
/// Files still being written can carry zero padding (or torn records) between blocks.
/// Returns `false`, with the cursor at the end, when only zero bytes remain; non-zero
/// bytes without a magic are `Truncated`.
pub fn skip_to_magic(cursor: &mut Cursor, magic: &[u8; 4]) -> Result<bool> {
    let start = cursor.position();
    match cursor.rest().windows(magic.len()).position(|w| w == magic) {
        Some(skipped) => {
            if skipped > 0 {
                debug!("skipped {} bytes before block magic at offset {}", skipped, start);
            }
            cursor.seek(start + skipped);
            Ok(true)
        }
        None if cursor.rest().iter().all(|&b| b == 0) => {
            if !cursor.is_empty() {
                debug!("{} bytes of padding at offset {}", cursor.remaining(), start);
            }
            cursor.seek(cursor.data().len());
            Ok(false)
        }
        None => Err(DecodeError::Truncated {
            offset: start,
            needed: magic.len(),
            available: cursor.remaining(),
        }),
    }
}

/// Decode the first block record at or after the cursor, skipping padding.
pub fn decode_block(
    cursor: &mut Cursor,
    params: &ChainParams,
    height: Option<Natural>,
) -> Result<Block> {
    let start = cursor.position();
    if !skip_to_magic(cursor, &params.magic)? {
        return Err(DecodeError::Truncated {
            offset: start,
            needed: RECORD_PREFIX_SIZE,
            available: 0,
        });
    }
    decode_block_record(cursor, params, height)
}

/// DecodeBlock: 𝔹* × ℕ? → ℬ
///
/// For a record magic ‖ size ‖ h ‖ n ‖ tx₁..txₙ at the cursor:
/// 1. hash(b) = rev(SHA256d(h))
/// 2. merkle_matches ⟺ MerkleRoot(txid₁..txidₙ) = h.merkle_root
/// 3. reward_fees(b) = reward_fees(tx₁) when tx₁ is a coinbase
///
/// The record must start exactly at the cursor; any other leading bytes are
/// `MagicMismatch`. A merkle mismatch is flagged on the result, never an error. On
/// return the cursor sits at the end of the record as declared by `size`, when that
/// lies inside the buffer.
pub fn decode_block_record(
    cursor: &mut Cursor,
    params: &ChainParams,
    height: Option<Natural>,
) -> Result<Block> {
    let record_start = cursor.position();
    let mut magic = [0u8; 4];
    magic.copy_from_slice(cursor.read_slice(4)?);
    if magic != params.magic {
        return Err(DecodeError::MagicMismatch {
            offset: record_start,
            found: magic,
        });
    }
    let size = cursor.read_u32_le()?;
    let payload_start = cursor.position();

    let header_bytes = cursor.read_slice(BLOCK_HEADER_SIZE)?;
    let header = decode_header(&mut Cursor::new(header_bytes))?;
    let hash = display_hash(header_bytes);

    let ctx = TxContext {
        height,
        bip34: header.version >= 2,
    };
    let tx_count = cursor.read_compact_size()?.value();
    let mut transactions = Vec::with_capacity(
        usize::try_from(tx_count)
            .unwrap_or(usize::MAX)
            .min(cursor.remaining()),
    );
    for _ in 0..tx_count {
        transactions.push(decode_transaction(cursor, params, ctx)?);
    }

    let txids: Vec<Hash> = transactions.iter().map(|tx| tx.txid).collect();
    let computed_merkle_root = merkle_root(&txids);
    let merkle_matches = computed_merkle_root == Some(header.merkle_root);
    if !merkle_matches {
        warn!(
            "block {} merkle root mismatch: declared {}, computed {}",
            to_hex(&hash),
            to_hex(&header.merkle_root),
            computed_merkle_root
                .as_ref()
                .map(to_hex)
                .unwrap_or_else(|| "none".to_string()),
        );
    }

    let reward_fees = transactions
        .first()
        .filter(|tx| tx.is_coinbase)
        .and_then(|tx| tx.reward_fees);
    let height = height.or_else(|| reward_fees.and_then(|rf| rf.height));

    let payload_end = payload_start + size as usize;
    if cursor.position() != payload_end {
        warn!(
            "block {} declares {} bytes but {} were decoded",
            to_hex(&hash),
            size,
            cursor.position() - payload_start
        );
        if payload_end <= cursor.data().len() {
            cursor.seek(payload_end);
        }
    }

    Ok(Block {
        magic,
        size,
        header,
        hash,
        transactions,
        computed_merkle_root,
        merkle_matches,
        height,
        reward_fees,
    })
}
