//! Primitive reader: fixed-width and variable-length integers over a byte cursor
//!
//! Two unrelated variable-length encodings appear in the storage files:
//! - [`CompactSize`]: the wire encoding used inside blocks, transactions and undo counts
//! - [`LevelDbVarint`]: the base-128 encoding used inside index values and undo records
//!
//! They are exposed as distinct types so one can never be passed where the other is expected.

use crate::error::{DecodeError, Result};
use crate::types::Hash;

/// Byte order of a fixed-width field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endian {
    /// Stored little-endian; bytes are reversed on read (hashes, display fields)
    Little,
    /// Returned as stored (script and witness bytes)
    Big,
}

/// Wire CompactSize: 1, 3, 5 or 9 bytes keyed by the first byte
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CompactSize(pub u64);

impl CompactSize {
    pub fn value(self) -> u64 {
        self.0
    }

    /// Minimal encoding, as written by the reference node
    pub fn encode(self) -> Vec<u8> {
        let value = self.0;
        if value < 0xfd {
            vec![value as u8]
        } else if value <= 0xffff {
            let mut result = vec![0xfd];
            result.extend_from_slice(&(value as u16).to_le_bytes());
            result
        } else if value <= 0xffff_ffff {
            let mut result = vec![0xfe];
            result.extend_from_slice(&(value as u32).to_le_bytes());
            result
        } else {
            let mut result = vec![0xff];
            result.extend_from_slice(&value.to_le_bytes());
            result
        }
    }
}

/// LevelDB-style varint (base-128, MSB continuation, add-one on every continuation)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LevelDbVarint(pub u64);

impl LevelDbVarint {
    pub fn value(self) -> u64 {
        self.0
    }

    pub fn encode(self) -> Vec<u8> {
        let mut n = self.0;
        let mut tmp = Vec::with_capacity(10);
        loop {
            let continuation = if tmp.is_empty() { 0x00 } else { 0x80 };
            tmp.push((n & 0x7f) as u8 | continuation);
            if n <= 0x7f {
                break;
            }
            n = (n >> 7) - 1;
        }
        tmp.reverse();
        tmp
    }
}

/// Position into an immutable byte buffer.
///
/// A cursor is owned by the decode call advancing it; concurrent decoders each
/// build their own cursor over the shared buffer.
#[derive(Debug, Clone)]
pub struct Cursor<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    pub fn at(data: &'a [u8], pos: usize) -> Self {
        Self {
            data,
            pos: pos.min(data.len()),
        }
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    pub fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    pub fn data(&self) -> &'a [u8] {
        self.data
    }

    /// Unread bytes
    pub fn rest(&self) -> &'a [u8] {
        &self.data[self.pos..]
    }

    /// Move to an absolute position; positions past the end clamp to the end.
    pub fn seek(&mut self, pos: usize) {
        self.pos = pos.min(self.data.len());
    }

    /// Bytes between two absolute positions already visited by this cursor
    pub fn slice(&self, start: usize, end: usize) -> &'a [u8] {
        &self.data[start.min(end)..end.min(self.data.len())]
    }

    fn truncated(&self, needed: usize) -> DecodeError {
        DecodeError::Truncated {
            offset: self.pos,
            needed,
            available: self.remaining(),
        }
    }

    /// Borrow exactly `n` bytes as stored
    pub fn read_slice(&mut self, n: usize) -> Result<&'a [u8]> {
        if self.remaining() < n {
            return Err(self.truncated(n));
        }
        let bytes = &self.data[self.pos..self.pos + n];
        self.pos += n;
        Ok(bytes)
    }

    /// Read exactly `n` bytes; `Endian::Little` reverses them
    pub fn read_fixed(&mut self, n: usize, endian: Endian) -> Result<Vec<u8>> {
        let mut bytes = self.read_slice(n)?.to_vec();
        if endian == Endian::Little {
            bytes.reverse();
        }
        Ok(bytes)
    }

    fn read_array<const N: usize>(&mut self) -> Result<[u8; N]> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.read_slice(N)?);
        Ok(out)
    }

    pub fn peek_u8(&self) -> Result<u8> {
        self.data
            .get(self.pos)
            .copied()
            .ok_or_else(|| self.truncated(1))
    }

    pub fn read_u8(&mut self) -> Result<u8> {
        Ok(self.read_array::<1>()?[0])
    }

    pub fn read_u16_le(&mut self) -> Result<u16> {
        Ok(u16::from_le_bytes(self.read_array()?))
    }

    pub fn read_u32_le(&mut self) -> Result<u32> {
        Ok(u32::from_le_bytes(self.read_array()?))
    }

    pub fn read_i32_le(&mut self) -> Result<i32> {
        Ok(i32::from_le_bytes(self.read_array()?))
    }

    pub fn read_u64_le(&mut self) -> Result<u64> {
        Ok(u64::from_le_bytes(self.read_array()?))
    }

    pub fn read_i64_le(&mut self) -> Result<i64> {
        Ok(i64::from_le_bytes(self.read_array()?))
    }

    /// 32-byte hash, returned in display order
    pub fn read_hash(&mut self) -> Result<Hash> {
        let mut hash: Hash = self.read_array()?;
        hash.reverse();
        Ok(hash)
    }

    pub fn read_compact_size(&mut self) -> Result<CompactSize> {
        let value = match self.read_u8()? {
            0xfd => self.read_u16_le()? as u64,
            0xfe => self.read_u32_le()? as u64,
            0xff => self.read_u64_le()?,
            b => b as u64,
        };
        Ok(CompactSize(value))
    }

    pub fn read_leveldb_varint(&mut self) -> Result<LevelDbVarint> {
        let mut n: u64 = 0;
        loop {
            let byte = self.read_u8()?;
            n = (n << 7) | (byte & 0x7f) as u64;
            if byte & 0x80 == 0 {
                return Ok(LevelDbVarint(n));
            }
            n = n.wrapping_add(1);
        }
    }

    /// CompactSize length prefix followed by that many bytes
    pub fn read_var_bytes(&mut self) -> Result<&'a [u8]> {
        let len = self.read_compact_size()?.value();
        let len = usize::try_from(len).map_err(|_| self.truncated(usize::MAX))?;
        self.read_slice(len)
    }
}
