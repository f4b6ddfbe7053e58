//! # Unvetting Encoder
//!
//! Turns flagged keys into on-chain unvetting instructions: for each
//! affected operator, the new vetted key count is the lowest flagged index,
//! so every key from the first bad one onwards stops being depositable.
//!
//! Operator ids are packed as 8-byte big-endian words and vetted counts as
//! 16-byte big-endian words, each list rendered as `0x`-prefixed hex.

use crate::error::{GuardError, GuardResult};
use shared_types::RegistryKey;
use std::collections::BTreeMap;

/// Width of a packed operator id.
pub const OPERATOR_ID_BYTES: usize = 8;

/// Width of a packed vetted key count.
pub const VETTED_COUNT_BYTES: usize = 16;

/// One operator's new vetted key count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct OperatorUnvetting {
    pub operator_id: u64,
    pub vetted_keys: u64,
}

/// One unvetting call's packed arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnvetChunk {
    pub operators: Vec<OperatorUnvetting>,
    pub operator_ids: String,
    pub vetted_keys_by_operator: String,
}

/// New vetted count per operator, sorted by operator id.
pub fn unvetting_targets(keys: &[RegistryKey]) -> Vec<OperatorUnvetting> {
    let mut lowest: BTreeMap<u64, u64> = BTreeMap::new();
    for key in keys {
        lowest
            .entry(key.operator_index)
            .and_modify(|index| *index = (*index).min(key.index))
            .or_insert(key.index);
    }
    lowest
        .into_iter()
        .map(|(operator_id, vetted_keys)| OperatorUnvetting {
            operator_id,
            vetted_keys,
        })
        .collect()
}

/// Split `keys` into packed chunks of at most `max_operators` operators.
///
/// # Errors
/// * `InvalidChunkSize` if `max_operators` is zero
pub fn unvetting_chunks(keys: &[RegistryKey], max_operators: u64) -> GuardResult<Vec<UnvetChunk>> {
    if max_operators == 0 {
        return Err(GuardError::InvalidChunkSize);
    }
    let chunk_size = usize::try_from(max_operators).unwrap_or(usize::MAX);

    Ok(unvetting_targets(keys)
        .chunks(chunk_size)
        .map(|chunk| {
            let ids: Vec<u128> = chunk.iter().map(|t| u128::from(t.operator_id)).collect();
            let counts: Vec<u128> = chunk.iter().map(|t| u128::from(t.vetted_keys)).collect();
            UnvetChunk {
                operators: chunk.to_vec(),
                operator_ids: pack(&ids, OPERATOR_ID_BYTES),
                vetted_keys_by_operator: pack(&counts, VETTED_COUNT_BYTES),
            }
        })
        .collect())
}

/// Pack `values` as fixed-width big-endian words into `0x` hex.
///
/// `width` is at most 16; values are truncated to the low `width` bytes.
pub fn pack(values: &[u128], width: usize) -> String {
    let width = width.min(16);
    let mut bytes = Vec::with_capacity(values.len() * width);
    for value in values {
        bytes.extend_from_slice(&value.to_be_bytes()[16 - width..]);
    }
    format!("0x{}", hex::encode(bytes))
}

/// Inverse of [`pack`].
///
/// # Errors
/// * `InvalidEncoding` if the input is not hex, its length is not a whole
///   number of `width`-byte words, or `width` is not in `1..=16`
pub fn unpack(encoded: &str, width: usize) -> GuardResult<Vec<u128>> {
    if width == 0 || width > 16 {
        return Err(GuardError::InvalidEncoding(format!("unsupported word width {width}")));
    }
    let digits = encoded.strip_prefix("0x").unwrap_or(encoded);
    let bytes = hex::decode(digits).map_err(|e| GuardError::InvalidEncoding(e.to_string()))?;
    if bytes.len() % width != 0 {
        return Err(GuardError::InvalidEncoding(format!(
            "{} bytes is not a multiple of {width}",
            bytes.len()
        )));
    }

    Ok(bytes
        .chunks(width)
        .map(|word| {
            let mut padded = [0u8; 16];
            padded[16 - width..].copy_from_slice(word);
            u128::from_be_bytes(padded)
        })
        .collect())
}
