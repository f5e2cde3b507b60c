//! Side-by-side comparison of byte-split codecs against plain general-purpose
//! compressors on one in-memory sample.

use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Context;
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression as GzCompression;
use log::{info, warn};

use splitz_codecs::{Lz4Codec, ZstdCodec};
use splitz_core::{Codec, Compressor, Decompressor, StreamConfig};

use crate::human_bytes;

/// Default sample: 100 MiB.
pub const DEFAULT_SAMPLE_BYTES: usize = 100 * 1024 * 1024;

struct Outcome {
    name: String,
    compressed_len: usize,
    compress_time: Duration,
    decompress_time: Duration,
}

pub fn run(file: &Path, sample_bytes: usize, level: i32) -> anyhow::Result<()> {
    let sample = load_sample(file, sample_bytes)?;
    eprintln!(
        "benchmarking {} sample (zstd level {})...",
        human_bytes(sample.len() as u64),
        level
    );

    let mut outcomes = vec![
        measure("gzip", &sample, gzip_compress, gzip_decompress)?,
        measure(
            &format!("zstd-{level}"),
            &sample,
            |d| Ok(zstd::bulk::compress(d, level)?),
            |c, n| Ok(zstd::bulk::decompress(c, n)?),
        )?,
        measure(
            "lz4",
            &sample,
            |d| Ok(lz4_flex::compress_prepend_size(d)),
            |c, _| {
                lz4_flex::decompress_size_prepended(c)
                    .map_err(|e| anyhow::anyhow!("lz4 decompress error: {}", e))
            },
        )?,
    ];

    let config = StreamConfig::default().with_level(level);
    for codec in [Arc::new(ZstdCodec) as Arc<dyn Codec>, Arc::new(Lz4Codec)] {
        let name = format!("split+{}", codec.name());
        let compressor = Compressor::new(codec.clone(), config)?;
        let decompressor = Decompressor::new(codec, config)?;
        outcomes.push(measure(
            &name,
            &sample,
            |d| {
                let mut out = Vec::new();
                compressor.compress(d, &mut out)?;
                Ok(out)
            },
            |c, n| {
                let mut out = Vec::with_capacity(n);
                decompressor.decompress(c, &mut out)?;
                Ok(out)
            },
        )?);
    }

    println!();
    println!("=== Compression Benchmark ({}) ===", human_bytes(sample.len() as u64));
    println!(
        "  {:<12}  {:>12}  {:>8}  {:>12}  {:>12}",
        "method", "compressed", "ratio", "compress", "decompress"
    );
    println!("  {}", "-".repeat(64));
    for o in &outcomes {
        let ratio = sample.len() as f64 / o.compressed_len.max(1) as f64;
        println!(
            "  {:<12}  {:>12}  {:>7.3}x  {:>10.3}s  {:>10.3}s",
            o.name,
            human_bytes(o.compressed_len as u64),
            ratio,
            o.compress_time.as_secs_f64(),
            o.decompress_time.as_secs_f64()
        );
    }
    Ok(())
}

/// Time one compress/decompress pair and check the round trip.
fn measure<C, D>(name: &str, sample: &[u8], compress: C, decompress: D) -> anyhow::Result<Outcome>
where
    C: Fn(&[u8]) -> anyhow::Result<Vec<u8>>,
    D: Fn(&[u8], usize) -> anyhow::Result<Vec<u8>>,
{
    let t0 = Instant::now();
    let compressed = compress(sample).with_context(|| format!("{name}: compress"))?;
    let compress_time = t0.elapsed();

    let t1 = Instant::now();
    let restored =
        decompress(&compressed, sample.len()).with_context(|| format!("{name}: decompress"))?;
    let decompress_time = t1.elapsed();

    if restored != sample {
        anyhow::bail!("{name}: round trip produced different bytes");
    }
    info!(
        "{}: {} -> {} in {:.3}s",
        name,
        sample.len(),
        compressed.len(),
        compress_time.as_secs_f64()
    );

    Ok(Outcome {
        name: name.to_string(),
        compressed_len: compressed.len(),
        compress_time,
        decompress_time,
    })
}

fn gzip_compress(data: &[u8]) -> anyhow::Result<Vec<u8>> {
    let mut enc = GzEncoder::new(Vec::new(), GzCompression::default());
    enc.write_all(data)?;
    Ok(enc.finish()?)
}

fn gzip_decompress(data: &[u8], len: usize) -> anyhow::Result<Vec<u8>> {
    let mut out = Vec::with_capacity(len);
    GzDecoder::new(data).read_to_end(&mut out)?;
    Ok(out)
}

/// First `sample_bytes` of `file`, or synthetic weights if it does not exist.
fn load_sample(file: &Path, sample_bytes: usize) -> anyhow::Result<Vec<u8>> {
    if !file.is_file() {
        warn!("{:?} not found; using synthetic bf16 weights", file);
        return Ok(synthetic_bf16_weights(sample_bytes));
    }
    let mut sample = Vec::new();
    File::open(file)
        .with_context(|| format!("opening sample file {:?}", file))?
        .take(sample_bytes as u64)
        .read_to_end(&mut sample)?;
    Ok(sample)
}

/// Deterministic little-endian bf16 values in roughly [-0.05, 0.05], shaped
/// like transformer weights: near-constant exponent bytes, noisy mantissas.
fn synthetic_bf16_weights(len: usize) -> Vec<u8> {
    let mut rng = 0x5EED_u64;
    let mut out = Vec::with_capacity(len + 1);
    while out.len() < len {
        rng = rng
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        // Sum of two uniforms: a cheap bell-shaped distribution.
        let a = (rng >> 40) as f32 / (1u64 << 24) as f32;
        let b = ((rng >> 16) & 0xFF_FFFF) as f32 / (1u64 << 24) as f32;
        let value = (a + b - 1.0) * 0.05;
        let bf16 = (value.to_bits() >> 16) as u16;
        out.extend_from_slice(&bf16.to_le_bytes());
    }
    out.truncate(len);
    out
}
