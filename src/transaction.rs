//! Transaction decoding: wire layout, witness data, txid reconstruction and coinbase payout

use log::{debug, warn};

use crate::address::witness_pubkey_address;
use crate::constants::*;
use crate::error::Result;
use crate::hashes::{display_hash, reversed, sha256d_parts};
use crate::params::ChainParams;
use crate::reader::Cursor;
use crate::script::{classify_input, classify_output};
use crate::types::*;

/// Context a transaction is decoded in: what is known about the enclosing block
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TxContext {
    /// Block height, when the caller knows it
    pub height: Option<Natural>,
    /// The coinbase scriptSig starts with the block height (block version >= 2)
    pub bip34: bool,
}

impl TxContext {
    pub fn at_height(height: Natural) -> Self {
        Self {
            height: Some(height),
            bip34: false,
        }
    }
}

/// Height pushed at the start of a BIP34 coinbase scriptSig
pub fn bip34_height(script_sig: &[u8]) -> Option<Natural> {
    let first = *script_sig.first()?;
    match first {
        OP_0 => Some(0),
        OP_1..=OP_16 => Some((first - OP_1 + 1) as Natural),
        1..=8 => {
            let bytes = script_sig.get(1..1 + first as usize)?;
            Some(
                bytes
                    .iter()
                    .rev()
                    .fold(0, |acc, &b| (acc << 8) | b as Natural),
            )
        }
        _ => None,
    }
}

struct RawInput<'a> {
    prevout: OutPoint,
    script_sig: &'a [u8],
    sequence: u32,
}

fn read_input<'a>(cursor: &mut Cursor<'a>) -> Result<RawInput<'a>> {
    let hash = cursor.read_hash()?;
    let index = cursor.read_u32_le()?;
    let script_sig = cursor.read_var_bytes()?;
    let sequence = cursor.read_u32_le()?;
    Ok(RawInput {
        prevout: OutPoint { hash, index },
        script_sig,
        sequence,
    })
}

fn read_output(cursor: &mut Cursor, params: &ChainParams) -> Result<TransactionOutput> {
    let value = cursor.read_i64_le()?;
    let script_pubkey = cursor.read_var_bytes()?;
    Ok(TransactionOutput {
        value,
        script: classify_output(params, script_pubkey),
    })
}

fn read_witness(cursor: &mut Cursor) -> Result<Witness> {
    let count = cursor.read_compact_size()?.value();
    let mut items = Vec::with_capacity(capacity_hint(count, cursor));
    for _ in 0..count {
        items.push(cursor.read_var_bytes()?.to_vec());
    }
    Ok(items)
}

/// Declared counts are untrusted; every element takes at least one byte.
fn capacity_hint(count: u64, cursor: &Cursor) -> usize {
    usize::try_from(count).unwrap_or(usize::MAX).min(cursor.remaining())
}

/// Coinbase payout: reward = Σ outputs, fees = reward − subsidy(height)
fn reward_fees(
    params: &ChainParams,
    ctx: TxContext,
    coinbase_script: &[u8],
    outputs: &[TransactionOutput],
) -> RewardFees {
    let total = outputs
        .iter()
        .try_fold(0 as Integer, |acc, o| acc.checked_add(o.value));
    if total.is_none() {
        warn!("coinbase output values overflow; reward saturated, fees unknown");
    }
    let height = ctx.height.or_else(|| {
        if ctx.bip34 {
            bip34_height(coinbase_script)
        } else {
            None
        }
    });
    let subsidy = params.subsidy.subsidy(height);
    RewardFees {
        reward: total.unwrap_or(Integer::MAX),
        height,
        subsidy,
        fees: total.zip(subsidy).and_then(|(r, s)| r.checked_sub(s)),
    }
}

/// DecodeTransaction: 𝔹* → 𝒯𝒳
///
/// For a serialization tx = v ‖ [0x00 f] ‖ ins ‖ outs ‖ [wits] ‖ lt:
/// 1. txid  = rev(SHA256d(v ‖ ins ‖ outs ‖ lt)) over the bytes exactly as read
/// 2. wtxid = rev(SHA256d(tx))
/// 3. coinbase ⟺ |ins| = 1 ∧ ins[0].prevout.hash = 0³²
///
/// The cursor is left after the locktime.
pub fn decode_transaction(
    cursor: &mut Cursor,
    params: &ChainParams,
    ctx: TxContext,
) -> Result<Transaction> {
    let start = cursor.position();
    let version = cursor.read_i32_le()?;

    // 0x00 0x00 is an empty input list followed by an empty output list, not a marker
    let mut segwit = false;
    if cursor.peek_u8()? == 0 {
        let marker = cursor.position();
        cursor.read_u8()?;
        match cursor.read_u8()? {
            0 => cursor.seek(marker),
            flag => {
                if flag != 1 {
                    debug!("transaction at offset {} has witness flag {:#04x}", start, flag);
                }
                segwit = true;
            }
        }
    }

    let body_start = cursor.position();
    let input_count = cursor.read_compact_size()?.value();
    let mut raw_inputs = Vec::with_capacity(capacity_hint(input_count, cursor));
    for _ in 0..input_count {
        raw_inputs.push(read_input(cursor)?);
    }

    let output_count = cursor.read_compact_size()?.value();
    let mut outputs = Vec::with_capacity(capacity_hint(output_count, cursor));
    for _ in 0..output_count {
        outputs.push(read_output(cursor, params)?);
    }
    let body_end = cursor.position();

    let witnesses = if segwit {
        let mut witnesses = Vec::with_capacity(raw_inputs.len());
        for _ in 0..raw_inputs.len() {
            witnesses.push(read_witness(cursor)?);
        }
        Some(witnesses)
    } else {
        None
    };

    let lock_time_start = cursor.position();
    let lock_time = cursor.read_u32_le()?;
    let end = cursor.position();

    let is_coinbase = raw_inputs.len() == 1 && raw_inputs[0].prevout.is_null();

    let mut inputs: Vec<TransactionInput> = raw_inputs
        .iter()
        .map(|raw| TransactionInput {
            prevout: raw.prevout.clone(),
            script: if is_coinbase {
                Classified {
                    class: InputClass::Coinbase,
                    address: None,
                }
            } else {
                classify_input(params, raw.script_sig)
            },
            sequence: raw.sequence,
        })
        .collect();

    if let Some(witnesses) = &witnesses {
        resolve_witness_senders(params, &mut inputs, witnesses);
    }

    let txid = reversed(&sha256d_parts(&[
        cursor.slice(start, start + 4),
        cursor.slice(body_start, body_end),
        cursor.slice(lock_time_start, end),
    ]));
    let wtxid = display_hash(cursor.slice(start, end));

    let reward_fees =
        is_coinbase.then(|| reward_fees(params, ctx, raw_inputs[0].script_sig, &outputs));

    Ok(Transaction {
        version,
        inputs,
        outputs,
        witnesses,
        lock_time,
        txid,
        wtxid,
        size: end - start,
        stripped_size: 4 + (body_end - body_start) + 4,
        is_coinbase,
        reward_fees,
    })
}

/// Witness inputs take their sender from a 33-byte public key in the witness stack.
fn resolve_witness_senders(params: &ChainParams, inputs: &mut [TransactionInput], witnesses: &[Witness]) {
    for (input, witness) in inputs.iter_mut().zip(witnesses) {
        if input.script.class != InputClass::Witness || input.script.address.is_some() {
            continue;
        }
        if let Some(pubkey) = witness.iter().find(|item| item.len() == 33) {
            input.script.address = witness_pubkey_address(params, pubkey);
        }
    }
}
