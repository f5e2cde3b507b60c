use lz4_flex::block::{compress, decompress, get_maximum_output_size};
use splitz_core::{Codec, Error, Result};

/// LZ4 raw-block codec.
///
/// Uses the unframed block API: the splitz header already carries the
/// uncompressed length, so no size prefix is stored in the payload. Ignores the
/// compression level.
///
/// Best for: fast restores where decode speed matters more than size.
#[derive(Debug, Default, Clone, Copy)]
pub struct Lz4Codec;

impl Codec for Lz4Codec {
    fn name(&self) -> &'static str {
        "lz4"
    }

    fn compress(&self, raw: &[u8], _level: i32) -> Result<Vec<u8>> {
        Ok(compress(raw))
    }

    fn decompress(&self, compressed: &[u8], expected_len: usize) -> Result<Vec<u8>> {
        decompress(compressed, expected_len)
            .map_err(|e| Error::decompression(self.name(), e.to_string()))
    }

    fn bound(&self, len: usize) -> usize {
        get_maximum_output_size(len)
    }
}
