//! Read-only views over block (`blk*.dat`) and undo (`rev*.dat`) files
//!
//! A view is shared freely between threads; every decode call builds its own
//! [`Cursor`] over the view's bytes.

use std::fs::File;
use std::path::Path;

use log::debug;
use memmap2::Mmap;

use crate::block::{decode_block_record, skip_to_magic};
use crate::constants::RECORD_PREFIX_SIZE;
use crate::error::{DecodeError, Result};
use crate::params::ChainParams;
use crate::reader::Cursor;
use crate::types::*;
use crate::undo::{decode_block_undo, undo_checksum};

enum FileBytes {
    Mapped(Mmap),
    Owned(Vec<u8>),
}

impl FileBytes {
    fn open(path: &Path) -> Result<Self> {
        let file = File::open(path)?;
        if file.metadata()?.len() == 0 {
            return Ok(FileBytes::Owned(Vec::new()));
        }
        // SAFETY: storage files are append-only; bytes already written never change.
        let mmap = unsafe { Mmap::map(&file)? };
        Ok(FileBytes::Mapped(mmap))
    }

    fn as_slice(&self) -> &[u8] {
        match self {
            FileBytes::Mapped(mmap) => &mmap[..],
            FileBytes::Owned(bytes) => bytes,
        }
    }
}

fn offset_to_usize(offset: Natural, len: usize) -> Result<usize> {
    usize::try_from(offset)
        .ok()
        .filter(|&o| o <= len)
        .ok_or(DecodeError::Truncated {
            offset: len,
            needed: 1,
            available: 0,
        })
}

/// A block file
pub struct BlockFile {
    bytes: FileBytes,
}

impl BlockFile {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        debug!("mapping block file {}", path.display());
        Ok(Self {
            bytes: FileBytes::open(path)?,
        })
    }

    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        Self {
            bytes: FileBytes::Owned(bytes),
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.bytes.as_slice()
    }

    /// Blocks in file order
    pub fn blocks<'a>(&'a self, params: &'a ChainParams) -> Blocks<'a> {
        Blocks {
            cursor: Cursor::new(self.as_bytes()),
            params,
            done: false,
        }
    }

    /// Decode the block whose payload starts at `data_offset`, as recorded in the block index.
    ///
    /// The record prefix must sit exactly 8 bytes before the payload; a misplaced offset
    /// is `MagicMismatch`, never the next block in the file.
    pub fn block_at(
        &self,
        params: &ChainParams,
        data_offset: Natural,
        height: Option<Natural>,
    ) -> Result<Block> {
        let data = self.as_bytes();
        let payload = offset_to_usize(data_offset, data.len())?;
        let record = payload
            .checked_sub(RECORD_PREFIX_SIZE)
            .ok_or(DecodeError::Truncated {
                offset: 0,
                needed: RECORD_PREFIX_SIZE,
                available: payload,
            })?;
        decode_block_record(&mut Cursor::at(data, record), params, height)
    }
}

/// Iterator over the blocks of a [`BlockFile`].
///
/// Ends when only zero padding remains. A decode error is yielded once and ends the
/// iteration, since the position of the next record is unknown after it.
pub struct Blocks<'a> {
    cursor: Cursor<'a>,
    params: &'a ChainParams,
    done: bool,
}

impl<'a> Iterator for Blocks<'a> {
    type Item = Result<Block>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let block = match skip_to_magic(&mut self.cursor, &self.params.magic) {
            Ok(true) => decode_block_record(&mut self.cursor, self.params, None),
            Ok(false) => {
                self.done = true;
                return None;
            }
            Err(e) => Err(e),
        };
        if block.is_err() {
            self.done = true;
        }
        Some(block)
    }
}

/// An undo file
pub struct UndoFile {
    bytes: FileBytes,
}

impl UndoFile {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        debug!("mapping undo file {}", path.display());
        Ok(Self {
            bytes: FileBytes::open(path)?,
        })
    }

    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        Self {
            bytes: FileBytes::Owned(bytes),
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.bytes.as_slice()
    }

    /// Decode the undo payload starting at `undo_offset`, as recorded in the block index.
    pub fn undo_at(&self, params: &ChainParams, undo_offset: Natural) -> Result<BlockUndo> {
        let data = self.as_bytes();
        let offset = offset_to_usize(undo_offset, data.len())?;
        decode_block_undo(&mut Cursor::at(data, offset), params)
    }

    /// Compare the checksum stored after an undo payload with the one computed from
    /// the previous block hash.
    pub fn checksum_matches(
        &self,
        undo_offset: Natural,
        undo: &BlockUndo,
        prev_block_hash: &Hash,
    ) -> Result<bool> {
        let data = self.as_bytes();
        let offset = offset_to_usize(undo_offset, data.len())?;
        let mut cursor = Cursor::at(data, offset);
        let payload = cursor.read_slice(undo.size)?;
        let stored = cursor.read_slice(32)?;
        Ok(stored == &undo_checksum(prev_block_hash, payload)[..])
    }
}
