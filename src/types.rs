//! Decoded record types for blocks, transactions, undo data and index entries

use serde::{Deserialize, Serialize};

use crate::constants::OP_RETURN;

/// Hash type: 256-bit hash, stored in display (byte-reversed wire) order
pub type Hash = [u8; 32];

/// Byte string type
pub type ByteString = Vec<u8>;

/// Natural number type
pub type Natural = u64;

/// Integer type
pub type Integer = i64;

/// Witness stack of one input
pub type Witness = Vec<ByteString>;

/// Classification of a locking script (scriptPubKey)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScriptClass {
    P2pkh(ByteString),
    P2sh(ByteString),
    P2wpkh(ByteString),
    P2wsh(ByteString),
    P2tr(ByteString),
    /// Bare public key, compressed (33 bytes) or uncompressed (65 bytes)
    P2pk(ByteString),
    Multisig {
        m: u8,
        n: u8,
        pubkeys: Vec<ByteString>,
    },
    Unknown(ByteString),
}

impl ScriptClass {
    pub fn name(&self) -> &'static str {
        match self {
            ScriptClass::P2pkh(_) => "P2PKH",
            ScriptClass::P2sh(_) => "P2SH",
            ScriptClass::P2wpkh(_) => "P2WPKH",
            ScriptClass::P2wsh(_) => "P2WSH",
            ScriptClass::P2tr(_) => "P2TR",
            ScriptClass::P2pk(_) => "P2PK",
            ScriptClass::Multisig { .. } => "Multisig",
            ScriptClass::Unknown(_) => "Unknown",
        }
    }

    /// `OP_RETURN` outputs can never be spent.
    pub fn is_unspendable(&self) -> bool {
        matches!(self, ScriptClass::Unknown(raw) if raw.first() == Some(&OP_RETURN))
    }
}

/// Classification of an unlocking script (scriptSig)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum InputClass {
    /// `<sig> <pubkey>`
    P2pkh { pubkey: ByteString },
    /// `<sig>` only; the key lives in the spent output
    P2pk,
    /// Empty scriptSig; spending data is carried in the witness
    Witness,
    P2sh { redeem_script: ByteString },
    /// P2SH-wrapped P2WPKH redeem script
    P2shP2wpkh { pubkey_hash: ByteString },
    Coinbase,
    Unknown,
}

/// Script classification together with the address it resolves to, if any
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Classified<C> {
    pub class: C,
    pub address: Option<String>,
}

/// OutPoint: previous transaction hash and output index
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OutPoint {
    pub hash: Hash,
    pub index: u32,
}

impl OutPoint {
    pub fn is_null(&self) -> bool {
        self.hash == [0u8; 32]
    }
}

/// Transaction input
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionInput {
    pub prevout: OutPoint,
    pub script: Classified<InputClass>,
    pub sequence: u32,
}

/// Transaction output
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionOutput {
    pub value: Integer,
    pub script: Classified<ScriptClass>,
}

/// Coinbase payout bookkeeping
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewardFees {
    /// Sum of the coinbase outputs
    pub reward: Integer,
    /// Height the subsidy was looked up for
    pub height: Option<Natural>,
    /// Subsidy for the block height, when it could be determined
    pub subsidy: Option<Integer>,
    /// `reward - subsidy`
    pub fees: Option<Integer>,
}

/// Decoded transaction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub version: i32,
    pub inputs: Vec<TransactionInput>,
    pub outputs: Vec<TransactionOutput>,
    /// Present iff the segwit marker was observed
    pub witnesses: Option<Vec<Witness>>,
    pub lock_time: u32,
    /// Hash of the witness-stripped serialization
    pub txid: Hash,
    /// Hash of the full serialization (equals `txid` without witness data)
    pub wtxid: Hash,
    pub size: usize,
    pub stripped_size: usize,
    pub is_coinbase: bool,
    pub reward_fees: Option<RewardFees>,
}

impl Transaction {
    /// Weight(tx) = 3 × |stripped| + |total|
    pub fn weight(&self) -> usize {
        self.stripped_size * 3 + self.size
    }

    pub fn has_witness(&self) -> bool {
        self.witnesses.is_some()
    }

    /// Σ output values, saturating at the bounds of `Integer`
    pub fn total_output_value(&self) -> Integer {
        self.outputs
            .iter()
            .fold(0, |acc: Integer, o| acc.saturating_add(o.value))
    }
}

/// Block header
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockHeader {
    pub version: i32,
    pub prev_block_hash: Hash,
    pub merkle_root: Hash,
    pub timestamp: u32,
    pub bits: u32,
    pub nonce: u32,
}

/// Declared and computed merkle roots of a block that disagree
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MerkleMismatch {
    pub declared: Hash,
    pub computed: Option<Hash>,
}

/// Decoded block
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    pub magic: [u8; 4],
    pub size: u32,
    pub header: BlockHeader,
    pub hash: Hash,
    pub transactions: Vec<Transaction>,
    pub computed_merkle_root: Option<Hash>,
    pub merkle_matches: bool,
    /// Height supplied by the caller or read from the coinbase (BIP34)
    pub height: Option<Natural>,
    pub reward_fees: Option<RewardFees>,
}

impl Block {
    pub fn merkle_mismatch(&self) -> Option<MerkleMismatch> {
        if self.merkle_matches {
            return None;
        }
        Some(MerkleMismatch {
            declared: self.header.merkle_root,
            computed: self.computed_merkle_root,
        })
    }

    pub fn coinbase(&self) -> Option<&Transaction> {
        self.transactions.first().filter(|tx| tx.is_coinbase)
    }
}

/// Block index entry decoded from an index store value
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockIndexEntry {
    pub hash: Hash,
    pub version: Natural,
    pub height: Natural,
    pub status: Natural,
    pub tx_count: Natural,
    pub file: Option<Natural>,
    pub data_offset: Option<Natural>,
    pub undo_offset: Option<Natural>,
    pub header: BlockHeader,
}

/// Spent output recovered from an undo record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UndoOutput {
    pub height: Natural,
    pub is_coinbase: bool,
    pub amount: Integer,
    pub script: ScriptClass,
    pub address: Option<String>,
}

/// Undo payload of one block: spent outputs per non-coinbase transaction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockUndo {
    pub transactions: Vec<Vec<UndoOutput>>,
    /// Payload bytes consumed; the record checksum follows
    pub size: usize,
}

impl BlockUndo {
    pub fn spent_outputs(&self) -> impl Iterator<Item = &UndoOutput> {
        self.transactions.iter().flatten()
    }

    /// Σ spent amounts, saturating at the bounds of `Integer`
    pub fn total_spent(&self) -> Integer {
        self.spent_outputs()
            .fold(0, |acc: Integer, o| acc.saturating_add(o.amount))
    }
}
