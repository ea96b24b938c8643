//! Wire-format constants for block, undo and index files

/// Mainnet message start, as it appears on disk
pub const MAINNET_MAGIC: [u8; 4] = [0xf9, 0xbe, 0xb4, 0xd9];

/// Serialized block header size
pub const BLOCK_HEADER_SIZE: usize = 80;

/// Size of the `[magic][size]` prefix in front of every block record
pub const RECORD_PREFIX_SIZE: usize = 8;

/// Maximum money supply: 21,000,000 BTC in satoshis
pub const MAX_MONEY: i64 = 21_000_000 * 100_000_000;

/// Halving interval: 210,000 blocks
pub const HALVING_INTERVAL: u64 = 210_000;

/// Initial block subsidy: 50 BTC
pub const INITIAL_SUBSIDY: i64 = 50 * 100_000_000;

/// Satoshis per BTC
pub const SATOSHIS_PER_BTC: i64 = 100_000_000;

/// Mainnet version byte for pay-to-pubkey-hash addresses
pub const PUBKEY_ADDRESS_PREFIX: u8 = 0x00;

/// Mainnet version byte for pay-to-script-hash addresses
pub const SCRIPT_ADDRESS_PREFIX: u8 = 0x05;

/// Mainnet human-readable part for segwit addresses
pub const MAINNET_HRP: &str = "bc";

/// Number of special compact script encodings in undo records
pub const NSPECIALSCRIPTS: u64 = 6;

/// Block index status bit: full block data available in a blk file
pub const BLOCK_HAVE_DATA: u64 = 8;

/// Block index status bit: undo data available in a rev file
pub const BLOCK_HAVE_UNDO: u64 = 16;

/// Key prefix of block index records in the index store
pub const BLOCK_INDEX_KEY_PREFIX: u8 = b'b';

// Opcodes used by the classifier
pub const OP_0: u8 = 0x00;
pub const OP_PUSHBYTES_20: u8 = 0x14;
pub const OP_PUSHBYTES_32: u8 = 0x20;
pub const OP_PUSHBYTES_33: u8 = 0x21;
pub const OP_PUSHBYTES_65: u8 = 0x41;
pub const OP_PUSHBYTES_75: u8 = 0x4b;
pub const OP_1: u8 = 0x51;
pub const OP_16: u8 = 0x60;
pub const OP_RETURN: u8 = 0x6a;
pub const OP_DUP: u8 = 0x76;
pub const OP_EQUAL: u8 = 0x87;
pub const OP_EQUALVERIFY: u8 = 0x88;
pub const OP_HASH160: u8 = 0xa9;
pub const OP_CHECKSIG: u8 = 0xac;
pub const OP_CHECKMULTISIG: u8 = 0xae;
