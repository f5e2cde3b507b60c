mod lz4_codec;
mod passthrough;
mod zstd_codec;

pub use lz4_codec::Lz4Codec;
pub use passthrough::PassThroughCodec;
pub use zstd_codec::ZstdCodec;

use splitz_core::{Codec, Error, Result};
use std::sync::Arc;

/// Names accepted by [`codec_by_name`], canonical spelling first.
pub const CODEC_NAMES: &[&str] = &["zstd", "lz4", "passthrough"];

/// Resolve a codec from its CLI name.
///
/// The stream does not record which codec produced it, so the caller must pick
/// the same name for decompression that was used for compression.
pub fn codec_by_name(name: &str) -> Result<Arc<dyn Codec>> {
    match name {
        "zstd" | "z" => Ok(Arc::new(ZstdCodec)),
        "lz4" | "l" => Ok(Arc::new(Lz4Codec)),
        "passthrough" | "pass" | "none" => Ok(Arc::new(PassThroughCodec)),
        other => Err(Error::InvalidConfig(format!(
            "unknown codec '{}'. Valid options: {}",
            other,
            CODEC_NAMES.join(", ")
        ))),
    }
}
