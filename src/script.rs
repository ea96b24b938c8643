//! Script classification for locking scripts, unlocking scripts and undo compact scripts
//!
//! Classification never fails: anything unrecognised ends up as `Unknown`, without an
//! address.

use log::debug;
use secp256k1::PublicKey;

use crate::address::{
    p2pkh_address, p2sh_address, pubkey_address, segwit_v0_address, taproot_address,
};
use crate::constants::*;
use crate::hashes::hash160;
use crate::params::ChainParams;
use crate::types::*;

const OP_PUSHDATA1: u8 = 0x4c;
const OP_PUSHDATA2: u8 = 0x4d;
const OP_PUSHDATA4: u8 = 0x4e;
const OP_1NEGATE: u8 = 0x4f;

/// Split a push-only script into its data pushes; `None` if any other opcode occurs.
///
/// Small-integer opcodes yield an empty push.
fn pushes(script: &[u8]) -> Option<Vec<&[u8]>> {
    let mut items = Vec::new();
    let mut i = 0;
    while i < script.len() {
        let opcode = script[i];
        i += 1;
        let len = match opcode {
            OP_0 | OP_1NEGATE | OP_1..=OP_16 => 0,
            0x01..=OP_PUSHBYTES_75 => opcode as usize,
            OP_PUSHDATA1 => {
                let len = *script.get(i)? as usize;
                i += 1;
                len
            }
            OP_PUSHDATA2 => {
                let len = u16::from_le_bytes(script.get(i..i + 2)?.try_into().ok()?) as usize;
                i += 2;
                len
            }
            OP_PUSHDATA4 => {
                let len = u32::from_le_bytes(script.get(i..i + 4)?.try_into().ok()?) as usize;
                i += 4;
                len
            }
            _ => return None,
        };
        items.push(script.get(i..i + len)?);
        i += len;
    }
    Some(items)
}

fn is_pubkey(bytes: &[u8]) -> bool {
    match bytes.len() {
        33 => matches!(bytes[0], 0x02 | 0x03),
        65 => bytes[0] == 0x04,
        _ => false,
    }
}

fn small_int(opcode: u8) -> Option<u8> {
    (OP_1..=OP_16).contains(&opcode).then(|| opcode - OP_1 + 1)
}

fn parse_multisig(script: &[u8]) -> Option<ScriptClass> {
    if script.len() < 3 || script[script.len() - 1] != OP_CHECKMULTISIG {
        return None;
    }
    let m = small_int(script[0])?;
    let n = small_int(script[script.len() - 2])?;
    let keys = pushes(&script[1..script.len() - 2])?;
    if keys.len() != n as usize || keys.iter().any(|k| k.is_empty()) {
        return None;
    }
    Some(ScriptClass::Multisig {
        m,
        n,
        pubkeys: keys.into_iter().map(<[u8]>::to_vec).collect(),
    })
}

/// Classify a locking script (scriptPubKey)
pub fn classify_output(params: &ChainParams, script: &[u8]) -> Classified<ScriptClass> {
    let (class, address) = match script {
        [OP_DUP, OP_HASH160, OP_PUSHBYTES_20, hash @ .., OP_EQUALVERIFY, OP_CHECKSIG]
            if hash.len() == 20 =>
        {
            (ScriptClass::P2pkh(hash.to_vec()), Some(p2pkh_address(params, hash)))
        }
        [OP_HASH160, OP_PUSHBYTES_20, hash @ .., OP_EQUAL] if hash.len() == 20 => {
            (ScriptClass::P2sh(hash.to_vec()), Some(p2sh_address(params, hash)))
        }
        [OP_0, OP_PUSHBYTES_20, hash @ ..] if hash.len() == 20 => (
            ScriptClass::P2wpkh(hash.to_vec()),
            segwit_v0_address(params, hash),
        ),
        [OP_0, OP_PUSHBYTES_32, hash @ ..] if hash.len() == 32 => (
            ScriptClass::P2wsh(hash.to_vec()),
            segwit_v0_address(params, hash),
        ),
        [OP_1, OP_PUSHBYTES_32, key @ ..] if key.len() == 32 => {
            (ScriptClass::P2tr(key.to_vec()), taproot_address(params, key))
        }
        [OP_PUSHBYTES_33 | OP_PUSHBYTES_65, key @ .., OP_CHECKSIG]
            if key.len() == script[0] as usize && is_pubkey(key) =>
        {
            (ScriptClass::P2pk(key.to_vec()), Some(pubkey_address(params, key)))
        }
        _ => match parse_multisig(script) {
            Some(multisig) => (multisig, None),
            None => (ScriptClass::Unknown(script.to_vec()), None),
        },
    };
    Classified { class, address }
}

/// `<sig> <pubkey>` at the typical compressed-key lengths
fn extract_p2pkh_pubkey(script: &[u8]) -> Option<&[u8]> {
    let sig_len = *script.first()? as usize;
    let pubkey_len = *script.get(1 + sig_len)? as usize;
    script.get(2 + sig_len..2 + sig_len + pubkey_len)
}

/// `<sig> <pubkey>` with any key encoding
fn two_push_pubkey(script: &[u8]) -> Option<&[u8]> {
    match pushes(script)?.as_slice() {
        [sig, pubkey] if !sig.is_empty() && is_pubkey(pubkey) => Some(pubkey),
        _ => None,
    }
}

/// Classify an unlocking script (scriptSig) of a non-coinbase input.
///
/// Inputs with an empty scriptSig resolve their sender later, from the witness.
pub fn classify_input(params: &ChainParams, script: &[u8]) -> Classified<InputClass> {
    let pubkey = match script.len() {
        106 | 107 => extract_p2pkh_pubkey(script),
        _ => two_push_pubkey(script),
    };
    if let Some(pubkey) = pubkey {
        return Classified {
            class: InputClass::P2pkh {
                pubkey: pubkey.to_vec(),
            },
            address: Some(pubkey_address(params, pubkey)),
        };
    }

    match script.len() {
        71 | 72 => Classified {
            class: InputClass::P2pk,
            address: None,
        },
        0 => Classified {
            class: InputClass::Witness,
            address: None,
        },
        _ => classify_p2sh_input(params, script),
    }
}

fn classify_p2sh_input(params: &ChainParams, script: &[u8]) -> Classified<InputClass> {
    let redeem_script = match pushes(script).as_deref() {
        Some([.., last]) => last.to_vec(),
        _ => {
            return Classified {
                class: InputClass::Unknown,
                address: None,
            }
        }
    };

    if let [OP_0, OP_PUSHBYTES_20, pubkey_hash @ ..] = redeem_script.as_slice() {
        if pubkey_hash.len() == 20 {
            return Classified {
                class: InputClass::P2shP2wpkh {
                    pubkey_hash: pubkey_hash.to_vec(),
                },
                address: Some(p2sh_address(params, &hash160(&redeem_script))),
            };
        }
    }

    Classified {
        class: InputClass::P2sh { redeem_script },
        address: None,
    }
}

/// Payload length of a special compact script type, `None` for raw scripts
pub fn special_script_size(n_size: u64) -> Option<usize> {
    match n_size {
        0 | 1 => Some(20),
        2..=5 => Some(32),
        _ => None,
    }
}

/// Expand a compact (undo record) script of type `n_size` with its payload.
///
/// `n_size >= NSPECIALSCRIPTS` means `payload` is a raw scriptPubKey.
pub fn decompress_script(params: &ChainParams, n_size: u64, payload: &[u8]) -> Classified<ScriptClass> {
    match n_size {
        0 if payload.len() == 20 => Classified {
            class: ScriptClass::P2pkh(payload.to_vec()),
            address: Some(p2pkh_address(params, payload)),
        },
        1 if payload.len() == 20 => Classified {
            class: ScriptClass::P2sh(payload.to_vec()),
            address: Some(p2sh_address(params, payload)),
        },
        2 | 3 if payload.len() == 32 => {
            let mut pubkey = Vec::with_capacity(33);
            pubkey.push(n_size as u8);
            pubkey.extend_from_slice(payload);
            let address = Some(pubkey_address(params, &pubkey));
            Classified {
                class: ScriptClass::P2pk(pubkey),
                address,
            }
        }
        4 | 5 if payload.len() == 32 => {
            let mut compressed = Vec::with_capacity(33);
            compressed.push(n_size as u8 - 2);
            compressed.extend_from_slice(payload);
            let address = Some(pubkey_address(params, &compressed));
            let pubkey = match PublicKey::from_slice(&compressed) {
                Ok(key) => key.serialize_uncompressed().to_vec(),
                Err(e) => {
                    debug!("compact script key is not on the curve ({}), keeping compressed form", e);
                    compressed
                }
            };
            Classified {
                class: ScriptClass::P2pk(pubkey),
                address,
            }
        }
        n if n >= NSPECIALSCRIPTS => classify_output(params, payload),
        _ => Classified {
            class: ScriptClass::Unknown(payload.to_vec()),
            address: None,
        },
    }
}
