//! Block index records, as stored in the node's key-value index
//!
//! Keys are `'b' ‖ block hash (wire order)`, values a run of varints followed by the
//! serialized block header.

use crate::block::decode_header;
use crate::constants::*;
use crate::error::{DecodeError, Result};
use crate::reader::Cursor;
use crate::types::*;

/// Block hash (display order) of a block index key; `None` for other key kinds
pub fn parse_index_key(key: &[u8]) -> Option<Hash> {
    match key {
        [BLOCK_INDEX_KEY_PREFIX, hash @ ..] if hash.len() == 32 => {
            let mut out: Hash = [0u8; 32];
            out.copy_from_slice(hash);
            out.reverse();
            Some(out)
        }
        _ => None,
    }
}

/// Decode the value stored under the index key of block `hash`.
///
/// The trailing header must be exactly 80 bytes; anything else means the index
/// itself is damaged.
pub fn decode_index_record(hash: Hash, value: &[u8]) -> Result<BlockIndexEntry> {
    let mut cursor = Cursor::new(value);
    let version = cursor.read_leveldb_varint()?.value();
    let height = cursor.read_leveldb_varint()?.value();
    let status = cursor.read_leveldb_varint()?.value();
    let tx_count = cursor.read_leveldb_varint()?.value();

    let file = if status & (BLOCK_HAVE_DATA | BLOCK_HAVE_UNDO) != 0 {
        Some(cursor.read_leveldb_varint()?.value())
    } else {
        None
    };
    let data_offset = if status & BLOCK_HAVE_DATA != 0 {
        Some(cursor.read_leveldb_varint()?.value())
    } else {
        None
    };
    let undo_offset = if status & BLOCK_HAVE_UNDO != 0 {
        Some(cursor.read_leveldb_varint()?.value())
    } else {
        None
    };

    if cursor.remaining() != BLOCK_HEADER_SIZE {
        return Err(DecodeError::InvalidIndexRecord(cursor.remaining()));
    }
    let header = decode_header(&mut cursor)?;

    Ok(BlockIndexEntry {
        hash,
        version,
        height,
        status,
        tx_count,
        file,
        data_offset,
        undo_offset,
        header,
    })
}
