use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use log::{info, trace};
use rayon::prelude::*;

use crate::block::BlockCodec;
use crate::codec::Codec;
use crate::config::StreamConfig;
use crate::error::{Error, Result};
use crate::frame::{Block, FrameReader, FrameWriter};
use crate::stats::{CompressStats, DecompressStats};

/// Chunked compressor: raw input in, framed block stream out.
///
/// # Loop
/// ```text
/// read ≤ chunk_size bytes → byte-split → compress(level) → write block
/// ```
/// repeated until a read returns 0 bytes. With `workers > 1` up to `workers`
/// chunks are encoded concurrently, and always written in input order.
///
/// A failure aborts the stream. Blocks already written stay on the output.
pub struct Compressor {
    codec: BlockCodec,
    config: StreamConfig,
}

impl Compressor {
    pub fn new(codec: Arc<dyn Codec>, config: StreamConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            codec: BlockCodec::new(codec),
            config,
        })
    }

    pub fn config(&self) -> &StreamConfig {
        &self.config
    }

    /// Compress all of `input` into `output` and flush it.
    pub fn compress<R: Read, W: Write>(&self, mut input: R, output: W) -> Result<CompressStats> {
        let t0 = Instant::now();
        let mut writer = FrameWriter::new(output);
        let mut stats = CompressStats::default();

        loop {
            let chunks = self.read_batch(&mut input)?;
            if chunks.is_empty() {
                break;
            }
            trace!("encoding batch of {} chunk(s)", chunks.len());

            let level = self.config.level;
            let encoded: Vec<Result<Vec<u8>>> = if chunks.len() == 1 {
                vec![self.codec.encode_block(&chunks[0], level)]
            } else {
                chunks
                    .par_iter()
                    .map(|chunk| self.codec.encode_block(chunk, level))
                    .collect()
            };

            for (chunk, payload) in chunks.iter().zip(encoded) {
                let payload = match payload {
                    Ok(payload) => payload,
                    Err(e) => {
                        writer.flush()?;
                        return Err(e);
                    }
                };
                writer.write_block(chunk.len(), &payload)?;
                stats.blocks += 1;
                stats.original_bytes += chunk.len() as u64;
                stats.compressed_bytes += payload.len() as u64;
            }
        }

        writer.flush()?;
        stats.framed_bytes = writer.bytes_written();
        stats.elapsed = t0.elapsed();

        info!(
            "compressed {} bytes into {} blocks ({} bytes framed, {:.2}x) with {}",
            stats.original_bytes,
            stats.blocks,
            stats.framed_bytes,
            stats.ratio(),
            self.codec.codec().name()
        );
        Ok(stats)
    }

    /// Read up to `workers` chunks; empty when the input is exhausted.
    fn read_batch<R: Read>(&self, input: &mut R) -> Result<Vec<Vec<u8>>> {
        let mut batch = Vec::with_capacity(self.config.workers);
        while batch.len() < self.config.workers {
            let mut chunk = Vec::new();
            let n = input
                .by_ref()
                .take(self.config.chunk_size as u64)
                .read_to_end(&mut chunk)?;
            if n == 0 {
                break;
            }
            batch.push(chunk);
            if n < self.config.chunk_size {
                break;
            }
        }
        Ok(batch)
    }
}

/// Sequential decompressor: framed block stream in, raw bytes out.
///
/// # Loop
/// ```text
/// read header → read payload → decompress(original_len) → un-split → write
/// ```
/// repeated until the stream ends on a block boundary. A framing or
/// decompression error aborts with the output holding every block reconstructed
/// before the failure.
pub struct Decompressor {
    codec: BlockCodec,
    config: StreamConfig,
}

impl Decompressor {
    /// Only `config.workers` is consulted; blocks describe their own lengths,
    /// so `chunk_size` and `level` are not validated here.
    pub fn new(codec: Arc<dyn Codec>, config: StreamConfig) -> Result<Self> {
        config.validate_workers()?;
        Ok(Self {
            codec: BlockCodec::new(codec),
            config,
        })
    }

    /// Decompress every block of `input` into `output` and flush it.
    pub fn decompress<R: Read, W: Write>(
        &self,
        input: R,
        mut output: W,
    ) -> Result<DecompressStats> {
        let t0 = Instant::now();
        let mut reader = FrameReader::new(input);
        let mut stats = DecompressStats::default();

        loop {
            let (blocks, read_err) = self.read_batch(&mut reader);
            if blocks.is_empty() && read_err.is_none() {
                break;
            }
            trace!("decoding batch of {} block(s)", blocks.len());

            let decoded: Vec<Result<Vec<u8>>> = if blocks.len() <= 1 {
                blocks
                    .iter()
                    .map(|b| self.codec.decode_block(&b.payload, b.original_len()))
                    .collect()
            } else {
                blocks
                    .par_iter()
                    .map(|b| self.codec.decode_block(&b.payload, b.original_len()))
                    .collect()
            };

            for (block, raw) in blocks.iter().zip(decoded) {
                let raw = match raw {
                    Ok(raw) => raw,
                    Err(e) => {
                        output.flush()?;
                        return Err(e);
                    }
                };
                output.write_all(&raw)?;
                stats.blocks += 1;
                stats.compressed_bytes += block.payload.len() as u64;
                stats.framed_bytes += block.header.framed_len();
                stats.restored_bytes += raw.len() as u64;
            }

            if let Some(e) = read_err {
                output.flush()?;
                return Err(e);
            }
        }

        output.flush()?;
        stats.elapsed = t0.elapsed();

        info!(
            "restored {} bytes from {} blocks ({} bytes framed) with {}",
            stats.restored_bytes,
            stats.blocks,
            stats.framed_bytes,
            self.codec.codec().name()
        );
        Ok(stats)
    }

    /// Read up to `workers` blocks. A read error ends the batch early and is
    /// returned alongside the blocks read before it, so those still get written.
    fn read_batch<R: Read>(&self, reader: &mut FrameReader<R>) -> (Vec<Block>, Option<Error>) {
        let mut batch = Vec::with_capacity(self.config.workers);
        while batch.len() < self.config.workers {
            match reader.read_block() {
                Ok(Some(block)) => batch.push(block),
                Ok(None) => break,
                Err(e) => return (batch, Some(e)),
            }
        }
        (batch, None)
    }
}

/// Compress the file at `input` into a new framed stream at `output`.
///
/// Overwrites any existing `output`.
pub fn compress_file(
    input: impl AsRef<Path>,
    output: impl AsRef<Path>,
    codec: Arc<dyn Codec>,
    config: StreamConfig,
) -> Result<CompressStats> {
    let compressor = Compressor::new(codec, config)?;
    let src = BufReader::new(File::open(input)?);
    let dst = BufWriter::new(File::create(output)?);
    compressor.compress(src, dst)
}

/// Restore the framed stream at `input` into a new file at `output`.
///
/// On failure `output` is left holding every block restored before it.
pub fn decompress_file(
    input: impl AsRef<Path>,
    output: impl AsRef<Path>,
    codec: Arc<dyn Codec>,
    config: StreamConfig,
) -> Result<DecompressStats> {
    let decompressor = Decompressor::new(codec, config)?;
    let src = BufReader::new(File::open(input)?);
    let dst = BufWriter::new(File::create(output)?);
    decompressor.decompress(src, dst)
}
