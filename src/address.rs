//! Address derivation: Base58Check for legacy addresses, Bech32/Bech32m for segwit

use bech32::{segwit, Hrp};

use crate::hashes::{hash160, sha256d};
use crate::params::ChainParams;

const BASE58_ALPHABET: &[u8; 58] = b"123456789ABCDEFGHJKLMNPQRSTUVWXYZabcdefghijkmnopqrstuvwxyz";

/// Base58 encoding; leading zero bytes map to leading '1's
pub fn base58_encode(data: &[u8]) -> String {
    let zeros = data.iter().take_while(|&&b| b == 0).count();

    // base-58 digits, least significant first
    let mut digits: Vec<u8> = Vec::with_capacity(data.len() * 138 / 100 + 1);
    for &byte in &data[zeros..] {
        let mut carry = byte as u32;
        for digit in digits.iter_mut() {
            carry += (*digit as u32) << 8;
            *digit = (carry % 58) as u8;
            carry /= 58;
        }
        while carry > 0 {
            digits.push((carry % 58) as u8);
            carry /= 58;
        }
    }

    let mut out = String::with_capacity(zeros + digits.len());
    out.extend(std::iter::repeat('1').take(zeros));
    out.extend(digits.iter().rev().map(|&d| BASE58_ALPHABET[d as usize] as char));
    out
}

/// Base58Check(version ‖ payload ‖ first4(SHA256d(version ‖ payload)))
pub fn base58check_encode(version: u8, payload: &[u8]) -> String {
    let mut data = Vec::with_capacity(1 + payload.len() + 4);
    data.push(version);
    data.extend_from_slice(payload);
    let checksum = sha256d(&data);
    data.extend_from_slice(&checksum[..4]);
    base58_encode(&data)
}

pub fn p2pkh_address(params: &ChainParams, pubkey_hash: &[u8]) -> String {
    base58check_encode(params.pubkey_address_prefix, pubkey_hash)
}

pub fn p2sh_address(params: &ChainParams, script_hash: &[u8]) -> String {
    base58check_encode(params.script_address_prefix, script_hash)
}

/// P2PKH address of a public key
pub fn pubkey_address(params: &ChainParams, pubkey: &[u8]) -> String {
    p2pkh_address(params, &hash160(pubkey))
}

fn hrp(params: &ChainParams) -> Option<Hrp> {
    Hrp::parse(&params.bech32_hrp).ok()
}

/// Bech32, witness version 0; the program must be 20 or 32 bytes
pub fn segwit_v0_address(params: &ChainParams, program: &[u8]) -> Option<String> {
    segwit::encode_v0(hrp(params)?, program).ok()
}

/// Bech32m, witness version 1
pub fn taproot_address(params: &ChainParams, output_key: &[u8]) -> Option<String> {
    segwit::encode_v1(hrp(params)?, output_key).ok()
}

/// Native segwit address of a public key found in a witness
pub fn witness_pubkey_address(params: &ChainParams, pubkey: &[u8]) -> Option<String> {
    segwit_v0_address(params, &hash160(pubkey))
}

#[cfg(test)]
mod tests {
    use super::*;
    use hex_lit::hex;

    fn mainnet() -> ChainParams {
        ChainParams::mainnet()
    }

    #[test]
    fn test_base58_leading_zeros() {
        assert_eq!(base58_encode(&[]), "");
        assert_eq!(base58_encode(&[0, 0]), "11");
        assert_eq!(base58_encode(&[0, 0, 0x39]), "11z");
        assert_eq!(base58_encode(b"hello world"), "StV1DL6CwTryKyV");
    }

    #[test]
    fn test_p2pkh_genesis_address() {
        let hash = hex!("62e907b15cbf27d5425399ebf6f0fb50ebb88f18");
        assert_eq!(
            p2pkh_address(&mainnet(), &hash),
            "1A1zP1eP5QGefi2DMPTfTL5SLmv7DivfNa"
        );
    }

    #[test]
    fn test_pubkey_address_compressed() {
        let pubkey = hex!("0250863ad64a87ae8a2fe83c1af1a8403cb53f53e486d8511dad8a04887e5b2352");
        assert_eq!(
            pubkey_address(&mainnet(), &pubkey),
            "1PMycacnJaSqwwJqjawXBErnLsZ7RkXUAs"
        );
    }

    #[test]
    fn test_p2sh_address_prefix() {
        let address = p2sh_address(&mainnet(), &[0x11; 20]);
        assert!(address.starts_with('3'));
    }

    #[test]
    fn test_segwit_v0_addresses() {
        assert_eq!(
            segwit_v0_address(&mainnet(), &hex!("751e76e8199196d454941c45d1b3a323f1433bd6")),
            Some("bc1qw508d6qejxtdg4y5r3zarvary0c5xw7kv8f3t4".to_string())
        );
        assert_eq!(
            segwit_v0_address(
                &mainnet(),
                &hex!("1863143c14c5166804bd19203356da136c985678cd4d27a1b8c6329604903262")
            ),
            Some("bc1qrp33g0q5c5txsp9arysrx4k6zdkfs4nce4xj0gdcccefvpysxf3qccfmv3".to_string())
        );
    }

    #[test]
    fn test_segwit_v0_rejects_bad_program_length() {
        assert_eq!(segwit_v0_address(&mainnet(), &[0u8; 21]), None);
    }

    #[test]
    fn test_taproot_address() {
        assert_eq!(
            taproot_address(
                &mainnet(),
                &hex!("79be667ef9dcbbac55a06295ce870b07029bfcdb2dce28d959f2815b16f81798")
            ),
            Some("bc1p0xlxvlhemja6c4dqv22uapctqupfhlxm9h8z3k2e72q4k9hcz7vqzk5jj0".to_string())
        );
    }

    #[test]
    fn test_witness_pubkey_address() {
        let pubkey = hex!("0279be667ef9dcbbac55a06295ce870b07029bfcdb2dce28d959f2815b16f81798");
        assert_eq!(
            witness_pubkey_address(&mainnet(), &pubkey),
            Some("bc1qw508d6qejxtdg4y5r3zarvary0c5xw7kv8f3t4".to_string())
        );
    }
}
