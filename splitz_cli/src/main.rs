use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use log::info;
use xxhash_rust::xxh3::Xxh3;

use splitz_codecs::codec_by_name;
use splitz_core::{
    compress_file, decompress_file, Codec, CompressStats, DecompressStats, FrameReader,
    StreamConfig, DEFAULT_CHUNK_SIZE, DEFAULT_LEVEL,
};

mod bench;

// ── CLI definition ─────────────────────────────────────────────────────────

#[derive(Parser)]
#[command(
    name = "splitz",
    about = "Byte-split + entropy-coded chunked compression for large binary assets",
    long_about = "Byte-split + entropy-coded chunked compression for large binary assets.\n\n\
                  Without a subcommand, compresses INPUT to COMPRESSED, restores it to \
                  RESTORED, and verifies the restored file against the input.",
    version,
    args_conflicts_with_subcommands = true
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    #[command(flatten)]
    roundtrip: RoundtripArgs,
}

#[derive(Args)]
struct RoundtripArgs {
    /// Source file to compress
    #[arg(default_value = "model.safetensors")]
    input: PathBuf,
    /// Destination for the compressed stream
    #[arg(default_value = "model.safetensors.zst_split")]
    compressed: PathBuf,
    /// Destination for the restored copy
    #[arg(default_value = "model_restored.safetensors")]
    restored: PathBuf,
    #[command(flatten)]
    stream: StreamArgs,
}

#[derive(Args, Clone)]
struct StreamArgs {
    /// Entropy codec: zstd | lz4 | passthrough (must match on decompress)
    #[arg(short, long, default_value = "zstd")]
    codec: String,
    /// Compression level (1–22, only used with --codec zstd)
    #[arg(short, long, default_value_t = DEFAULT_LEVEL,
          value_parser = clap::value_parser!(i32).range(1..=22))]
    level: i32,
    /// Raw bytes per block (default: 52428800 = 50 MiB)
    #[arg(short = 'b', long, default_value_t = DEFAULT_CHUNK_SIZE)]
    chunk_size: usize,
    /// Blocks encoded/decoded in parallel
    #[arg(short, long, default_value_t = 1)]
    workers: usize,
}

impl StreamArgs {
    fn resolve(&self) -> anyhow::Result<(Arc<dyn Codec>, StreamConfig)> {
        let codec = codec_by_name(&self.codec)?;
        let config = StreamConfig::default()
            .with_chunk_size(self.chunk_size)
            .with_level(self.level)
            .with_workers(self.workers);
        config.validate()?;
        Ok((codec, config))
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Compress a file into a splitz stream
    Compress {
        /// Source file to compress
        input: PathBuf,
        /// Destination splitz file
        output: PathBuf,
        #[command(flatten)]
        stream: StreamArgs,
    },
    /// Restore a splitz stream back to raw bytes
    Decompress {
        /// Source splitz file
        input: PathBuf,
        /// Destination file
        output: PathBuf,
        #[command(flatten)]
        stream: StreamArgs,
    },
    /// Print block count, sizes, and ratio by scanning block headers
    Inspect {
        /// splitz file to inspect
        file: PathBuf,
        /// Print per-block details
        #[arg(long)]
        blocks: bool,
    },
    /// Compare byte-split codecs against plain gzip / zstd / lz4 on a sample
    Bench {
        /// File to sample (synthetic bf16 weights are used if it is missing)
        #[arg(default_value = "model.safetensors")]
        file: PathBuf,
        /// Bytes to read from the start of the file
        #[arg(short, long, default_value_t = bench::DEFAULT_SAMPLE_BYTES)]
        sample_bytes: usize,
        /// Compression level for the zstd-based methods
        #[arg(short, long, default_value_t = DEFAULT_LEVEL,
              value_parser = clap::value_parser!(i32).range(1..=22))]
        level: i32,
    },
}

// ── Helpers ────────────────────────────────────────────────────────────────

pub(crate) fn human_bytes(n: u64) -> String {
    const UNITS: &[&str] = &["B", "KB", "MB", "GB", "TB"];
    let mut v = n as f64;
    let mut unit = 0;
    while v >= 1024.0 && unit < UNITS.len() - 1 {
        v /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{} B", n)
    } else {
        format!("{:.2} {}", v, UNITS[unit])
    }
}

fn report_compress(stats: &CompressStats) {
    eprintln!("  blocks      : {}", stats.blocks);
    eprintln!("  original    : {}", human_bytes(stats.original_bytes));
    eprintln!("  compressed  : {}", human_bytes(stats.framed_bytes));
    eprintln!("  ratio       : {:.2}x", stats.ratio());
    eprintln!("  throughput  : {}/s", human_bytes(stats.throughput() as u64));
    eprintln!("  elapsed     : {:.3}s", stats.elapsed.as_secs_f64());
}

fn report_decompress(stats: &DecompressStats) {
    eprintln!("  blocks      : {}", stats.blocks);
    eprintln!("  restored    : {}", human_bytes(stats.restored_bytes));
    eprintln!("  throughput  : {}/s", human_bytes(stats.throughput() as u64));
    eprintln!("  elapsed     : {:.3}s", stats.elapsed.as_secs_f64());
}

/// Size and xxh3-64 digest of a file, read in 1 MiB slices.
fn file_digest(path: &Path) -> anyhow::Result<(u64, u64)> {
    let mut src = BufReader::new(
        File::open(path).with_context(|| format!("opening {:?} for verification", path))?,
    );
    let mut hasher = Xxh3::new();
    let mut buf = vec![0u8; 1024 * 1024];
    let mut total = 0u64;
    loop {
        let n = src.read(&mut buf)?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
        total += n as u64;
    }
    Ok((total, hasher.digest()))
}

// ── Subcommand implementations ─────────────────────────────────────────────

fn run_compress(input: &Path, output: &Path, stream: &StreamArgs) -> anyhow::Result<CompressStats> {
    let (codec, config) = stream.resolve()?;
    info!(
        "compressing {:?} -> {:?} ({}, level {}, chunk {} bytes, {} worker(s))",
        input,
        output,
        codec.name(),
        config.level,
        config.chunk_size,
        config.workers
    );
    let stats = compress_file(input, output, codec, config)
        .with_context(|| format!("compressing {:?} into {:?}", input, output))?;
    report_compress(&stats);
    Ok(stats)
}

fn run_decompress(
    input: &Path,
    output: &Path,
    stream: &StreamArgs,
) -> anyhow::Result<DecompressStats> {
    let (codec, config) = stream.resolve()?;
    info!("decompressing {:?} -> {:?} ({})", input, output, codec.name());
    let stats = decompress_file(input, output, codec, config)
        .with_context(|| format!("restoring {:?} into {:?}", input, output))?;
    report_decompress(&stats);
    Ok(stats)
}

fn run_roundtrip(args: RoundtripArgs) -> anyhow::Result<()> {
    if !args.input.is_file() {
        anyhow::bail!("File {:?} not found.", args.input);
    }

    eprintln!("Starting compression...");
    run_compress(&args.input, &args.compressed, &args.stream)?;

    eprintln!();
    eprintln!("Starting decompression...");
    run_decompress(&args.compressed, &args.restored, &args.stream)?;

    let (orig_size, orig_hash) = file_digest(&args.input)?;
    let (rest_size, rest_hash) = file_digest(&args.restored)?;
    eprintln!();
    if orig_size != rest_size || orig_hash != rest_hash {
        anyhow::bail!(
            "verification FAILED: original {} bytes (xxh3 {:016x}), restored {} bytes (xxh3 {:016x})",
            orig_size,
            orig_hash,
            rest_size,
            rest_hash
        );
    }
    eprintln!("Verification: OK ({} bytes, xxh3 {:016x})", orig_size, orig_hash);
    Ok(())
}

fn run_inspect(file: PathBuf, show_blocks: bool) -> anyhow::Result<()> {
    let src = File::open(&file).with_context(|| format!("opening {:?}", file))?;
    let file_size = src.metadata()?.len();
    let mut reader = FrameReader::new(BufReader::new(src));

    let mut headers = Vec::new();
    while let Some(header) = reader.read_header()? {
        reader.skip_payload(&header)?;
        headers.push(header);
    }

    let raw: u64 = headers.iter().map(|h| h.original_len as u64).sum();
    let compressed: u64 = headers.iter().map(|h| h.compressed_len as u64).sum();
    let ratio = if compressed == 0 {
        1.0
    } else {
        raw as f64 / compressed as f64
    };

    println!("=== splitz stream: {:?} ===", file);
    println!();
    println!("  block count    : {}", headers.len());
    println!("  raw size       : {}", human_bytes(raw));
    println!("  compressed     : {}", human_bytes(compressed));
    println!("  file on disk   : {}", human_bytes(file_size));
    println!("  ratio          : {:.2}x", ratio);

    if show_blocks {
        println!();
        println!(
            "  {:>8}  {:>14}  {:>12}  {:>12}  {:>8}",
            "block", "file offset", "compressed", "raw", "ratio"
        );
        println!("  {}", "-".repeat(62));
        let mut offset = 0u64;
        for (i, h) in headers.iter().enumerate() {
            let block_ratio = if h.compressed_len == 0 {
                1.0
            } else {
                h.original_len as f64 / h.compressed_len as f64
            };
            println!(
                "  {:>8}  {:>14}  {:>12}  {:>12}  {:>7.2}x",
                i,
                offset,
                human_bytes(h.compressed_len as u64),
                human_bytes(h.original_len as u64),
                block_ratio
            );
            offset += h.framed_len();
        }
    }

    Ok(())
}

// ── Entry point ────────────────────────────────────────────────────────────

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();
    match cli.command {
        None => run_roundtrip(cli.roundtrip),
        Some(Commands::Compress {
            input,
            output,
            stream,
        }) => run_compress(&input, &output, &stream).map(|_| ()),
        Some(Commands::Decompress {
            input,
            output,
            stream,
        }) => run_decompress(&input, &output, &stream).map(|_| ()),
        Some(Commands::Inspect { file, blocks }) => run_inspect(file, blocks),
        Some(Commands::Bench {
            file,
            sample_bytes,
            level,
        }) => bench::run(&file, sample_bytes, level),
    }
}
