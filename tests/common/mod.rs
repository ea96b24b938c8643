//! Shared fixtures: mainnet blocks 0 and 100000, and file builders
#![allow(dead_code)]

use blk_decode::undo::compress_amount;
use blk_decode::{CompactSize, LevelDbVarint, MAINNET_MAGIC};

pub const GENESIS_HEX: &str = "0100000000000000000000000000000000000000000000000000000000000000000000003ba3edfd7a7b12b27ac72c3e67768f617fc81bc3888a51323a9fb8aa4b1e5e4a29ab5f49ffff001d1dac2b7c0101000000010000000000000000000000000000000000000000000000000000000000000000ffffffff4d04ffff001d0104455468652054696d65732030332f4a616e2f32303039204368616e63656c6c6f72206f6e206272696e6b206f66207365636f6e64206261696c6f757420666f722062616e6b73ffffffff0100f2052a01000000434104678afdb0fe5548271967f1a67130b7105cd6a828e03909a67962e0ea1f61deb649f6bc3f4cef38c4f35504e51ec112de5c384df7ba0b8d578a4c702b6bf11d5fac00000000";

pub const BLOCK_100000_HEX: &str = "0100000050120119172a610421a6c3011dd330d9df07b63616c2cc1f1cd00200000000006657a9252aacd5c0b2940996ecff952228c3067cc38d4885efb5a4ac4247e9f337221b4d4c86041b0f2b57100401000000010000000000000000000000000000000000000000000000000000000000000000ffffffff08044c86041b020602ffffffff0100f2052a010000004341041b0e8c2567c12536aa13357b79a073dc4444acb83c4ec7a0e2f99dd7457516c5817242da796924ca4e99947d087fedf9ce467cb9f7c6287078f801df276fdf84ac000000000100000001032e38e9c0a84c6046d687d10556dcacc41d275ec55fc00779ac88fdf357a187000000008c493046022100c352d3dd993a981beba4a63ad15c209275ca9470abfcd57da93b58e4eb5dce82022100840792bc1f456062819f15d33ee7055cf7b5ee1af1ebcc6028d9cdb1c3af7748014104f46db5e9d61a9dc27b8d64ad23e7383a4e6ca164593c2527c038c0857eb67ee8e825dca65046b82c9331586c82e0fd1f633f25f87c161bc6f8a630121df2b3d3ffffffff0200e32321000000001976a914c398efa9c392ba6013c5e04ee729755ef7f58b3288ac000fe208010000001976a914948c765a6914d43f2a7ac177da2c2f6b52de3d7c88ac000000000100000001c33ebff2a709f13d9f9a7569ab16a32786af7d7e2de09265e41c61d078294ecf010000008a4730440220032d30df5ee6f57fa46cddb5eb8d0d9fe8de6b342d27942ae90a3231e0ba333e02203deee8060fdc70230a7f5b4ad7d7bc3e628cbe219a886b84269eaeb81e26b4fe014104ae31c31bf91278d99b8377a35bbce5b27d9fff15456839e919453fc7b3f721f0ba403ff96c9deeb680e5fd341c0fc3a7b90da4631ee39560639db462e9cb850fffffffff0240420f00000000001976a914b0dcbf97eabf4404e31d952477ce822dadbe7e1088acc060d211000000001976a9146b1281eec25ab4e1e0793ff4e08ab1abb3409cd988ac0000000001000000010b6072b386d4a773235237f64c1126ac3b240c84b917a3909ba1c43ded5f51f4000000008c493046022100bb1ad26df930a51cce110cf44f7a48c3c561fd977500b1ae5d6b6fd13d0b3f4a022100c5b42951acedff14abba2736fd574bdb465f3e6f8da12e2c5303954aca7f78f3014104a7135bfe824c97ecc01ec7d7e336185c81e2aa2c41ab175407c09484ce9694b44953fcb751206564a9c24dd094d42fdbfdd5aad3e063ce6af4cfaaea4ea14fbbffffffff0140420f00000000001976a91439aa3d569e06a1d7926dc4be1193c99bf2eb9ee088ac00000000";

pub const GENESIS_HASH: &str = "000000000019d6689c085ae165831e934ff763ae46a2a6c172b3f1b60a8ce26f";
pub const BLOCK_100000_HASH: &str = "000000000003ba27aa200b1cecaad478d2b00432346c3f1f3986da1afd33e506";

/// Outputs spent by block 100000, in input order: (value, pubkey hash)
pub const BLOCK_100000_SPENT: [(u64, &str); 3] = [
    (5_000_000_000, "71d7dd96d9edda09180fe9d57a477b5acc9cad11"),
    (300_000_000, "35fbee6a3bf8d99f17724ec54787567393a8a6b1"),
    (1_000_000, "c4eb47ecfdcf609a1848ee79acc2fa49d3caad70"),
];

/// `magic ‖ size ‖ payload` for each payload; returns the bytes and each payload offset
pub fn block_file(payloads: &[Vec<u8>]) -> (Vec<u8>, Vec<u64>) {
    let mut data = Vec::new();
    let mut offsets = Vec::new();
    for payload in payloads {
        data.extend_from_slice(&MAINNET_MAGIC);
        data.extend_from_slice(&(payload.len() as u32).to_le_bytes());
        offsets.push(data.len() as u64);
        data.extend_from_slice(payload);
    }
    (data, offsets)
}

/// Undo payload spending the given P2PKH outputs, one transaction per output
pub fn p2pkh_undo_payload(spent: &[(u64, &str)], height: u64) -> Vec<u8> {
    let mut payload = CompactSize(spent.len() as u64).encode();
    for (value, pubkey_hash) in spent {
        payload.extend(CompactSize(1).encode());
        payload.extend(LevelDbVarint(height << 1).encode());
        payload.extend(LevelDbVarint(0).encode());
        payload.extend(LevelDbVarint(compress_amount(*value)).encode());
        payload.extend(LevelDbVarint(0).encode());
        payload.extend(hex::decode(pubkey_hash).unwrap());
    }
    payload
}

/// Index value with data and undo positions followed by the header
pub fn index_value(
    height: u64,
    tx_count: u64,
    file: u64,
    data_pos: u64,
    undo_pos: u64,
    header: &[u8],
) -> Vec<u8> {
    let status = blk_decode::BLOCK_HAVE_DATA | blk_decode::BLOCK_HAVE_UNDO | 5;
    let mut value: Vec<u8> = [230_000, height, status, tx_count, file, data_pos, undo_pos]
        .iter()
        .flat_map(|&v| LevelDbVarint(v).encode())
        .collect();
    value.extend_from_slice(header);
    value
}
