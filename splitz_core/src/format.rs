/// Size of one block header in bytes: `original_len:u32` + `compressed_len:u32`.
pub const BLOCK_HEADER_SIZE: usize = 8;

/// Default raw bytes per chunk: 50 MiB.
///
/// The chunk size never appears in the stream; every block carries its own
/// lengths, so a decoder does not need to know it.
pub const DEFAULT_CHUNK_SIZE: usize = 50 * 1024 * 1024;

/// Default entropy-coder level.
pub const DEFAULT_LEVEL: i32 = 3;

// ── Block header ───────────────────────────────────────────────────────────

/// Decoded representation of the 8-byte header that prefixes every block.
///
/// ```text
/// Stream := Block*
/// Block  := original_len:u32(LE) compressed_len:u32(LE) payload[compressed_len]
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockHeader {
    /// Length of the byte-split buffer handed to the codec (equals the raw
    /// chunk length).
    pub original_len: u32,
    /// Length of the compressed payload that immediately follows the header.
    pub compressed_len: u32,
}

impl BlockHeader {
    /// Serialize to exactly `BLOCK_HEADER_SIZE` bytes.
    pub fn to_bytes(&self) -> [u8; BLOCK_HEADER_SIZE] {
        let mut buf = [0u8; BLOCK_HEADER_SIZE];
        buf[0..4].copy_from_slice(&self.original_len.to_le_bytes());
        buf[4..8].copy_from_slice(&self.compressed_len.to_le_bytes());
        buf
    }

    /// Deserialize from `BLOCK_HEADER_SIZE` bytes.
    pub fn from_bytes(buf: &[u8; BLOCK_HEADER_SIZE]) -> Self {
        let [a, b, c, d, e, f, g, h] = *buf;
        Self {
            original_len: u32::from_le_bytes([a, b, c, d]),
            compressed_len: u32::from_le_bytes([e, f, g, h]),
        }
    }

    /// Total bytes this block occupies in the stream, header included.
    pub fn framed_len(&self) -> u64 {
        BLOCK_HEADER_SIZE as u64 + self.compressed_len as u64
    }
}
