use crate::error::Result;

/// Entropy-coding capability used by the block codec.
///
/// Each `Codec` implementation:
/// - Compresses and decompresses individual blocks independently; no state may
///   carry over between blocks.
/// - Is not recorded in the stream. A file must be decoded with the same codec
///   that encoded it.
/// - Reports library failures as [`Error::Compression`](crate::Error::Compression)
///   or [`Error::Decompression`](crate::Error::Decompression), carrying the
///   library's own error text.
pub trait Codec: Send + Sync {
    /// Human-readable codec name for CLI display and error messages.
    fn name(&self) -> &'static str;

    /// Compress one block at `level`. Codecs without levels ignore it.
    fn compress(&self, raw: &[u8], level: i32) -> Result<Vec<u8>>;

    /// Decompress one block into exactly `expected_len` bytes.
    ///
    /// Must fail rather than return more than `expected_len` bytes.
    fn decompress(&self, compressed: &[u8], expected_len: usize) -> Result<Vec<u8>>;

    /// Worst-case compressed size for an input of `len` bytes.
    fn bound(&self, len: usize) -> usize;
}
