//! # SSZ Merkleization
//!
//! The subset of SSZ `hash_tree_root` needed for deposit signing roots:
//! fixed-size byte vectors, `uint64`, and containers of those.
//!
//! Every value is split into 32-byte chunks; a container's root is the
//! binary SHA-256 merkle tree over its field roots, padded with zero chunks
//! to the next power of two.

use sha2::{Digest, Sha256};

/// Width of one merkle leaf.
pub const BYTES_PER_CHUNK: usize = 32;

/// One 32-byte merkle leaf or node.
pub type Chunk = [u8; BYTES_PER_CHUNK];

/// Types that have an SSZ hash tree root.
pub trait HashTreeRoot {
    fn hash_tree_root(&self) -> Chunk;
}

/// Hash two sibling nodes into their parent.
pub fn hash_pair(left: &Chunk, right: &Chunk) -> Chunk {
    let mut hasher = Sha256::new();
    hasher.update(left);
    hasher.update(right);
    hasher.finalize().into()
}

/// Merkleize a list of chunks, padding to the next power of two.
///
/// An empty list has the zero chunk as its root.
pub fn merkleize(chunks: &[Chunk]) -> Chunk {
    if chunks.is_empty() {
        return Chunk::default();
    }

    let width = chunks.len().next_power_of_two();
    let mut layer = chunks.to_vec();
    layer.resize(width, Chunk::default());

    while layer.len() > 1 {
        layer = layer
            .chunks_exact(2)
            .map(|pair| hash_pair(&pair[0], &pair[1]))
            .collect();
    }

    layer.first().copied().unwrap_or_default()
}

/// Split bytes into right-padded chunks.
pub fn pack_bytes(bytes: &[u8]) -> Vec<Chunk> {
    bytes
        .chunks(BYTES_PER_CHUNK)
        .map(|piece| {
            let mut chunk = Chunk::default();
            chunk[..piece.len()].copy_from_slice(piece);
            chunk
        })
        .collect()
}

/// Root of a fixed-size byte vector (`Bytes4`, `Bytes32`, `Bytes48`, ...).
pub fn bytes_root(bytes: &[u8]) -> Chunk {
    merkleize(&pack_bytes(bytes))
}

/// Root of a `uint64`: little-endian, zero padded.
pub fn uint64_root(value: u64) -> Chunk {
    let mut chunk = Chunk::default();
    chunk[..8].copy_from_slice(&value.to_le_bytes());
    chunk
}
