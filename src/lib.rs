//! # blk-decode
//!
//! Decoder for a Bitcoin node's on-disk storage: block files (`blk*.dat`), undo files
//! (`rev*.dat`) and block index records.
//!
//! Decoding turns raw bytes into typed records: blocks with their transactions,
//! classified scripts and derived addresses, coinbase reward and fees, the outputs each
//! block spent, and the file positions recorded in the block index.
//!
//! ## Layout
//!
//! - [`reader`]: byte cursor, CompactSize and LevelDB varints
//! - [`script`], [`address`]: script classification and address derivation
//! - [`transaction`], [`block`]: wire format decoding, txid and merkle verification
//! - [`undo`]: spent outputs with compressed amounts and scripts
//! - [`index`]: block index keys and values
//! - [`file`]: memory-mapped file views
//! - [`chain`]: ordering of decoded blocks
//!
//! ## Design Principles
//!
//! 1. **Pure decoding**: records are immutable values, no state survives a decode call
//! 2. **Exact wire format**: hashes are computed over the bytes as read
//! 3. **Exact Version Pinning**: hashing and key handling dependencies pinned to exact versions
//! 4. **No validation**: signatures and consensus rules are not checked
//!
//! ## Usage
//!
//! ```rust
//! use blk_decode::{ChainDecoder, ChainParams};
//! use blk_decode::reader::LevelDbVarint;
//!
//! let decoder = ChainDecoder::new(ChainParams::mainnet());
//!
//! // version, height, status (HAVE_DATA), tx count, file, data offset
//! let mut value: Vec<u8> = [220_000u64, 1, 8, 1, 0, 8]
//!     .iter()
//!     .flat_map(|&v| LevelDbVarint(v).encode())
//!     .collect();
//! value.extend_from_slice(&[0u8; 80]);
//!
//! let entry = decoder.decode_index_record([0u8; 32], &value).unwrap();
//! assert_eq!(entry.height, 1);
//! assert_eq!(entry.data_offset, Some(8));
//! assert_eq!(entry.undo_offset, None);
//! ```

pub mod address;
pub mod block;
pub mod chain;
pub mod constants;
pub mod error;
pub mod file;
pub mod hashes;
pub mod index;
pub mod params;
pub mod reader;
pub mod script;
pub mod transaction;
pub mod types;
pub mod undo;

// Re-export commonly used types
pub use constants::*;
pub use error::{DecodeError, Result};
pub use file::{BlockFile, Blocks, UndoFile};
pub use params::{ChainParams, SubsidySchedule};
pub use reader::{CompactSize, Cursor, Endian, LevelDbVarint};
pub use transaction::TxContext;
pub use types::*;

/// Decoder bound to one network's parameters
///
/// # Examples
///
/// ```
/// use blk_decode::{ChainDecoder, ScriptClass};
///
/// let decoder = ChainDecoder::default();
///
/// let mut script = vec![0x00, 0x14];
/// script.extend_from_slice(&[0x75; 20]);
/// let output = decoder.classify_output(&script);
/// assert_eq!(output.class, ScriptClass::P2wpkh(vec![0x75; 20]));
/// assert!(output.address.unwrap().starts_with("bc1q"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct ChainDecoder {
    params: ChainParams,
}

impl ChainDecoder {
    pub fn new(params: ChainParams) -> Self {
        Self { params }
    }

    /// Decoder configured from a JSON parameter document
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(Self::new(ChainParams::from_json(json)?))
    }

    pub fn params(&self) -> &ChainParams {
        &self.params
    }

    /// Decode the first block record (`magic ‖ size ‖ payload`) found in `bytes`
    pub fn decode_block(&self, bytes: &[u8], height: Option<Natural>) -> Result<Block> {
        block::decode_block(&mut Cursor::new(bytes), &self.params, height)
    }

    /// Decode one serialized transaction
    pub fn decode_transaction(&self, bytes: &[u8], ctx: TxContext) -> Result<Transaction> {
        transaction::decode_transaction(&mut Cursor::new(bytes), &self.params, ctx)
    }

    /// Decode one block's undo payload
    pub fn decode_undo(&self, bytes: &[u8]) -> Result<BlockUndo> {
        undo::decode_block_undo(&mut Cursor::new(bytes), &self.params)
    }

    pub fn decode_index_record(&self, hash: Hash, value: &[u8]) -> Result<BlockIndexEntry> {
        index::decode_index_record(hash, value)
    }

    pub fn classify_output(&self, script_pubkey: &[u8]) -> Classified<ScriptClass> {
        script::classify_output(&self.params, script_pubkey)
    }

    pub fn classify_input(&self, script_sig: &[u8]) -> Classified<InputClass> {
        script::classify_input(&self.params, script_sig)
    }

    /// Blocks of a block file, in file order
    pub fn blocks<'a>(&'a self, blocks: &'a BlockFile) -> Blocks<'a> {
        blocks.blocks(&self.params)
    }

    /// Block located by an index entry; `None` when the entry has no block data
    pub fn block_for(&self, file: &BlockFile, entry: &BlockIndexEntry) -> Result<Option<Block>> {
        entry
            .data_offset
            .map(|offset| file.block_at(&self.params, offset, Some(entry.height)))
            .transpose()
    }

    /// Undo data located by an index entry; `None` when the entry has no undo data
    pub fn undo_for(&self, file: &UndoFile, entry: &BlockIndexEntry) -> Result<Option<BlockUndo>> {
        entry
            .undo_offset
            .map(|offset| file.undo_at(&self.params, offset))
            .transpose()
    }
}
