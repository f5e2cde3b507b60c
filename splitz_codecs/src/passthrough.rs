use splitz_core::{Codec, Error, Result};

/// No-op codec: stores byte-split blocks verbatim.
///
/// Useful for:
/// - Verifying framing and the byte-split transform independently of any
///   entropy coder.
/// - Inputs that are already compressed.
#[derive(Debug, Default, Clone, Copy)]
pub struct PassThroughCodec;

impl Codec for PassThroughCodec {
    fn name(&self) -> &'static str {
        "passthrough"
    }

    fn compress(&self, raw: &[u8], _level: i32) -> Result<Vec<u8>> {
        Ok(raw.to_vec())
    }

    fn decompress(&self, compressed: &[u8], expected_len: usize) -> Result<Vec<u8>> {
        if compressed.len() != expected_len {
            return Err(Error::decompression(
                self.name(),
                format!(
                    "stored block is {} bytes but {} were expected",
                    compressed.len(),
                    expected_len
                ),
            ));
        }
        Ok(compressed.to_vec())
    }

    fn bound(&self, len: usize) -> usize {
        len
    }
}
