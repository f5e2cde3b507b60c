use std::sync::Arc;

use crate::codec::Codec;
use crate::error::{Error, FramingError, Result};
use crate::transform::{transform, untransform};

/// Byte-split transform plus entropy coding for a single block.
///
/// Holds no per-block state, so one `BlockCodec` can encode or decode any
/// number of blocks, from any number of threads.
#[derive(Clone)]
pub struct BlockCodec {
    codec: Arc<dyn Codec>,
}

impl BlockCodec {
    pub fn new(codec: Arc<dyn Codec>) -> Self {
        Self { codec }
    }

    pub fn codec(&self) -> &dyn Codec {
        self.codec.as_ref()
    }

    /// Split `plain` into byte planes and compress the result at `level`.
    pub fn encode_block(&self, plain: &[u8], level: i32) -> Result<Vec<u8>> {
        let split = transform(plain);
        self.codec.compress(&split, level)
    }

    /// Decompress `payload` to exactly `original_len` bytes and re-interleave.
    ///
    /// A payload larger than the codec could ever produce for `original_len`
    /// is rejected before any decompression buffer is allocated.
    pub fn decode_block(&self, payload: &[u8], original_len: usize) -> Result<Vec<u8>> {
        let bound = self.codec.bound(original_len);
        if payload.len() > bound {
            return Err(FramingError::PayloadExceedsBound {
                compressed_len: payload.len(),
                bound,
            }
            .into());
        }

        let split = self.codec.decompress(payload, original_len)?;
        if split.len() != original_len {
            return Err(Error::decompression(
                self.codec.name(),
                format!(
                    "block decompressed to {} bytes but header declares {}",
                    split.len(),
                    original_len
                ),
            ));
        }

        untransform(&split, original_len)
    }
}

impl std::fmt::Debug for BlockCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BlockCodec")
            .field("codec", &self.codec.name())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Stores bytes verbatim; optionally drops the last byte on decode.
    struct Verbatim {
        lose_last_byte: bool,
    }

    impl Codec for Verbatim {
        fn name(&self) -> &'static str {
            "verbatim"
        }

        fn compress(&self, raw: &[u8], _level: i32) -> Result<Vec<u8>> {
            Ok(raw.to_vec())
        }

        fn decompress(&self, compressed: &[u8], _expected_len: usize) -> Result<Vec<u8>> {
            let mut out = compressed.to_vec();
            if self.lose_last_byte {
                out.pop();
            }
            Ok(out)
        }

        fn bound(&self, len: usize) -> usize {
            len
        }
    }

    fn block_codec(lose_last_byte: bool) -> BlockCodec {
        BlockCodec::new(Arc::new(Verbatim { lose_last_byte }))
    }

    #[test]
    fn payload_is_byte_split() {
        let codec = block_codec(false);
        let payload = codec.encode_block(b"ABCDE", 3).unwrap();
        assert_eq!(payload, b"ACBDE");
        assert_eq!(codec.decode_block(&payload, 5).unwrap(), b"ABCDE");
    }

    #[test]
    fn payload_over_bound_is_framing_error() {
        let err = block_codec(false).decode_block(b"ABCDEF", 5).unwrap_err();
        assert_eq!(
            err.as_framing(),
            Some(&FramingError::PayloadExceedsBound {
                compressed_len: 6,
                bound: 5
            })
        );
    }

    #[test]
    fn short_decode_is_decompression_error() {
        let err = block_codec(true).decode_block(b"ACBDE", 5).unwrap_err();
        match err {
            Error::Decompression { codec, message } => {
                assert_eq!(codec, "verbatim");
                assert!(message.contains("4 bytes"), "{message}");
            }
            other => panic!("expected decompression error, got {other:?}"),
        }
    }
}
