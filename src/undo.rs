//! Undo record decoding: the outputs spent by each transaction of a block
//!
//! Payload layout (`rev*.dat`):
//!
//! ```text
//! CompactSize tx count
//!   CompactSize spent output count
//!     varint height code   height << 1 | coinbase
//!     varint version       only when height > 0
//!     varint amount        compressed
//!     varint nSize ‖ script  compact script
//! ```
//!
//! Every payload is followed by a 32-byte checksum, see [`undo_checksum`].

use crate::constants::{MAX_MONEY, NSPECIALSCRIPTS};
use crate::error::{DecodeError, Result};
use crate::hashes::{reversed, sha256d_parts};
use crate::params::ChainParams;
use crate::reader::Cursor;
use crate::script::{decompress_script, special_script_size};
use crate::types::*;

/// Inverse of [`compress_amount`]; `None` when the value does not fit in 64 bits
pub fn decompress_amount(x: u64) -> Option<u64> {
    if x == 0 {
        return Some(0);
    }
    let mut x = x - 1;
    let e = (x % 10) as u32;
    x /= 10;
    let n = if e < 9 {
        let d = (x % 9) + 1;
        x /= 9;
        x.checked_mul(10)?.checked_add(d)?
    } else {
        x + 1
    };
    n.checked_mul(10u64.pow(e))
}

/// Amount compression used by undo records: trailing decimal zeros become an exponent
pub fn compress_amount(n: u64) -> u64 {
    if n == 0 {
        return 0;
    }
    let mut n = n;
    let mut e = 0;
    while n % 10 == 0 && e < 9 {
        n /= 10;
        e += 1;
    }
    if e < 9 {
        let d = n % 10;
        n /= 10;
        1 + (n * 9 + d - 1) * 10 + e
    } else {
        1 + (n - 1) * 10 + 9
    }
}

/// Checksum written after an undo payload: SHA256d(prev block hash ‖ payload), wire order
pub fn undo_checksum(prev_block_hash: &Hash, payload: &[u8]) -> Hash {
    sha256d_parts(&[&reversed(prev_block_hash), payload])
}

fn read_compact_script<'a>(cursor: &mut Cursor<'a>) -> Result<(u64, &'a [u8])> {
    let offset = cursor.position();
    let n_size = cursor.read_leveldb_varint()?.value();
    let len = match special_script_size(n_size) {
        Some(len) => len,
        None => usize::try_from(n_size - NSPECIALSCRIPTS).map_err(|_| DecodeError::Truncated {
            offset,
            needed: usize::MAX,
            available: cursor.remaining(),
        })?,
    };
    Ok((n_size, cursor.read_slice(len)?))
}

/// Decode one spent output
pub fn decode_undo_output(cursor: &mut Cursor, params: &ChainParams) -> Result<UndoOutput> {
    let code = cursor.read_leveldb_varint()?.value();
    let height = code >> 1;
    let is_coinbase = code & 1 == 1;
    if height > 0 {
        // reserved transaction version, always zero
        cursor.read_leveldb_varint()?;
    }
    let amount_offset = cursor.position();
    let compressed = cursor.read_leveldb_varint()?.value();
    let amount = decompress_amount(compressed)
        .and_then(|n| Integer::try_from(n).ok())
        .filter(|&n| n <= MAX_MONEY)
        .ok_or(DecodeError::AmountOutOfRange {
            offset: amount_offset,
            compressed,
        })?;
    let (n_size, payload) = read_compact_script(cursor)?;
    let script = decompress_script(params, n_size, payload);

    Ok(UndoOutput {
        height,
        is_coinbase,
        amount,
        script: script.class,
        address: script.address,
    })
}

/// Decode one block's undo payload; the cursor is left at the checksum.
pub fn decode_block_undo(cursor: &mut Cursor, params: &ChainParams) -> Result<BlockUndo> {
    let start = cursor.position();
    let tx_count = cursor.read_compact_size()?.value();
    let mut transactions = Vec::new();
    for _ in 0..tx_count {
        let output_count = cursor.read_compact_size()?.value();
        let mut outputs = Vec::new();
        for _ in 0..output_count {
            outputs.push(decode_undo_output(cursor, params)?);
        }
        transactions.push(outputs);
    }
    Ok(BlockUndo {
        transactions,
        size: cursor.position() - start,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hashes::sha256d;
    use crate::reader::{CompactSize, LevelDbVarint};

    fn varint(n: u64) -> Vec<u8> {
        LevelDbVarint(n).encode()
    }

    #[test]
    fn test_decompress_amount_known_values() {
        assert_eq!(decompress_amount(0), Some(0));
        assert_eq!(decompress_amount(1), Some(1));
        assert_eq!(decompress_amount(9), Some(100_000_000));
        assert_eq!(decompress_amount(50), Some(5_000_000_000));
    }

    #[test]
    fn test_decompress_amount_overflow() {
        assert_eq!(decompress_amount(u64::MAX), None);
        assert_eq!(decompress_amount(u64::MAX - 1), None);
        // largest exponent on a mantissa that still fits
        assert_eq!(decompress_amount(10), Some(1_000_000_000));
    }

    #[test]
    fn test_compress_amount_known_values() {
        assert_eq!(compress_amount(0), 0);
        assert_eq!(compress_amount(1), 1);
        assert_eq!(compress_amount(100_000_000), 9);
        assert_eq!(compress_amount(5_000_000_000), 50);
    }

    #[test]
    fn test_amount_round_trip() {
        for n in [
            0u64,
            1,
            2,
            10,
            546,
            12_345,
            100_000_000,
            5_000_000_000,
            2_099_999_997_690_000,
            MAX_MONEY as u64,
        ] {
            assert_eq!(decompress_amount(compress_amount(n)), Some(n), "amount {}", n);
        }
    }

    #[test]
    fn test_decode_p2pkh_undo_output() {
        let mut data = varint(100_000 << 1);
        data.extend(varint(0));
        data.extend(varint(compress_amount(1_000_000)));
        data.extend(varint(0));
        data.extend_from_slice(&[0x11; 20]);

        let mut cursor = Cursor::new(&data);
        let out = decode_undo_output(&mut cursor, &ChainParams::mainnet()).unwrap();
        assert!(cursor.is_empty());
        assert_eq!(out.height, 100_000);
        assert!(!out.is_coinbase);
        assert_eq!(out.amount, 1_000_000);
        assert_eq!(out.script, ScriptClass::P2pkh(vec![0x11; 20]));
        assert!(out.address.unwrap().starts_with('1'));
    }

    #[test]
    fn test_height_zero_has_no_version_byte() {
        let mut data = varint(1); // height 0, coinbase
        data.extend(varint(compress_amount(5_000_000_000)));
        data.extend(varint(1));
        data.extend_from_slice(&[0x22; 20]);

        let mut cursor = Cursor::new(&data);
        let out = decode_undo_output(&mut cursor, &ChainParams::mainnet()).unwrap();
        assert!(cursor.is_empty());
        assert_eq!(out.height, 0);
        assert!(out.is_coinbase);
        assert_eq!(out.amount, 5_000_000_000);
        assert_eq!(out.script, ScriptClass::P2sh(vec![0x22; 20]));
    }

    #[test]
    fn test_decode_raw_script_undo_output() {
        let mut script = vec![0x00, 0x14];
        script.extend_from_slice(&[0x33; 20]);

        let mut data = varint(700_001 << 1 | 1);
        data.extend(varint(0));
        data.extend(varint(compress_amount(625_000_000)));
        data.extend(varint(script.len() as u64 + NSPECIALSCRIPTS));
        data.extend_from_slice(&script);

        let mut cursor = Cursor::new(&data);
        let out = decode_undo_output(&mut cursor, &ChainParams::mainnet()).unwrap();
        assert_eq!(out.height, 700_001);
        assert!(out.is_coinbase);
        assert_eq!(out.script, ScriptClass::P2wpkh(vec![0x33; 20]));
        assert!(out.address.unwrap().starts_with("bc1q"));
    }

    #[test]
    fn test_decode_block_undo() {
        let mut data = CompactSize(2).encode();
        // first transaction spends two outputs
        data.extend(CompactSize(2).encode());
        for amount in [1_000u64, 2_000] {
            data.extend(varint(10 << 1));
            data.extend(varint(0));
            data.extend(varint(compress_amount(amount)));
            data.extend(varint(0));
            data.extend_from_slice(&[0x44; 20]);
        }
        // second transaction spends one
        data.extend(CompactSize(1).encode());
        data.extend(varint(11 << 1));
        data.extend(varint(0));
        data.extend(varint(compress_amount(3_000)));
        data.extend(varint(1));
        data.extend_from_slice(&[0x55; 20]);
        let payload_len = data.len();
        data.extend_from_slice(&[0xcc; 32]);

        let mut cursor = Cursor::new(&data);
        let undo = decode_block_undo(&mut cursor, &ChainParams::mainnet()).unwrap();
        assert_eq!(undo.transactions.len(), 2);
        assert_eq!(undo.transactions[0].len(), 2);
        assert_eq!(undo.transactions[1].len(), 1);
        assert_eq!(undo.total_spent(), 6_000);
        assert_eq!(undo.size, payload_len);
        assert_eq!(cursor.remaining(), 32);
    }

    #[test]
    fn test_amount_out_of_range() {
        let params = ChainParams::mainnet();
        for compressed in [u64::MAX - 1, compress_amount(MAX_MONEY as u64 + 1)] {
            let mut data = CompactSize(1).encode();
            data.extend(CompactSize(1).encode());
            data.extend(varint(10 << 1));
            data.extend(varint(0));
            let amount_offset = data.len();
            data.extend(varint(compressed));
            data.extend(varint(0));
            data.extend_from_slice(&[0x44; 20]);

            let err = decode_block_undo(&mut Cursor::new(&data), &params).unwrap_err();
            match err {
                DecodeError::AmountOutOfRange { offset, compressed: c } => {
                    assert_eq!(offset, amount_offset);
                    assert_eq!(c, compressed);
                }
                other => panic!("expected amount out of range, got {:?}", other),
            }
        }
    }

    #[test]
    fn test_truncated_undo_script() {
        let mut data = varint(10 << 1);
        data.extend(varint(0));
        data.extend(varint(9));
        data.extend(varint(2));
        data.extend_from_slice(&[0x66; 31]);
        let mut cursor = Cursor::new(&data);
        let err = decode_undo_output(&mut cursor, &ChainParams::mainnet()).unwrap_err();
        assert!(err.is_truncated());
    }

    #[test]
    fn test_undo_checksum() {
        let prev = [0x01u8; 32];
        let payload = [0x00u8];
        let mut preimage = reversed(&prev).to_vec();
        preimage.extend_from_slice(&payload);
        assert_eq!(undo_checksum(&prev, &payload), sha256d(&preimage));
    }
}
