pub mod block;
pub mod codec;
pub mod config;
pub mod error;
pub mod format;
pub mod frame;
pub mod stats;
pub mod stream;
pub mod transform;

pub use block::BlockCodec;
pub use codec::Codec;
pub use config::StreamConfig;
pub use error::{Error, FramingError, Result};
pub use format::{BlockHeader, BLOCK_HEADER_SIZE, DEFAULT_CHUNK_SIZE, DEFAULT_LEVEL};
pub use frame::{Block, FrameReader, FrameWriter};
pub use stats::{CompressStats, DecompressStats};
pub use stream::{compress_file, decompress_file, Compressor, Decompressor};
pub use transform::{transform, untransform};
