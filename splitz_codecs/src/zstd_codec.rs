use splitz_core::{Codec, Error, Result};

/// Zstandard block codec.
///
/// Each block is a complete, independent zstd frame compressed at the level
/// supplied by the stream driver (default: 3). Decompression writes into a
/// buffer capped at the header's `original_len`, so an oversized frame is an
/// error rather than an unbounded allocation.
///
/// Best for: tensor weights and other large binary assets.
#[derive(Debug, Default, Clone, Copy)]
pub struct ZstdCodec;

impl Codec for ZstdCodec {
    fn name(&self) -> &'static str {
        "zstd"
    }

    fn compress(&self, raw: &[u8], level: i32) -> Result<Vec<u8>> {
        zstd::bulk::compress(raw, level).map_err(|e| Error::compression(self.name(), e.to_string()))
    }

    fn decompress(&self, compressed: &[u8], expected_len: usize) -> Result<Vec<u8>> {
        zstd::bulk::decompress(compressed, expected_len)
            .map_err(|e| Error::decompression(self.name(), e.to_string()))
    }

    fn bound(&self, len: usize) -> usize {
        zstd::zstd_safe::compress_bound(len)
    }
}
