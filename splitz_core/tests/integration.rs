/// Integration tests: full compress → decompress round trips through the real
/// codecs, plus the corruption cases a decoder must refuse.
///
/// Chunk sizes are kept small so that below/at/above-chunk boundaries can be
/// exercised quickly; one ignored test covers the default 50 MiB chunk.
use std::sync::Arc;

use splitz_codecs::{Lz4Codec, PassThroughCodec, ZstdCodec};
use splitz_core::{
    compress_file, decompress_file, BlockCodec, Codec, Compressor, Decompressor, Error,
    FrameReader, FramingError, StreamConfig, BLOCK_HEADER_SIZE, DEFAULT_CHUNK_SIZE,
};

const CHUNK: usize = 4096;

/// Generate `len` deterministic bytes using a simple LCG.
fn pseudo_random_bytes(len: usize, seed: u64) -> Vec<u8> {
    let mut rng = seed;
    (0..len)
        .map(|_| {
            rng = rng
                .wrapping_mul(6364136223846793005)
                .wrapping_add(1442695040888963407);
            (rng >> 56) as u8
        })
        .collect()
}

/// bf16-like weights: a slowly varying high byte and a noisy low byte.
fn tensor_like_bytes(len: usize) -> Vec<u8> {
    let noise = pseudo_random_bytes(len, 0xBF16);
    (0..len)
        .map(|i| if i % 2 == 1 { 0x3c + (i / 8192 % 3) as u8 } else { noise[i] })
        .collect()
}

fn zstd() -> Arc<dyn Codec> {
    Arc::new(ZstdCodec)
}

fn small_chunks() -> StreamConfig {
    StreamConfig::default().with_chunk_size(CHUNK)
}

fn compress(codec: Arc<dyn Codec>, config: StreamConfig, data: &[u8]) -> Vec<u8> {
    let mut out = Vec::new();
    Compressor::new(codec, config)
        .unwrap()
        .compress(data, &mut out)
        .unwrap();
    out
}

fn decompress(codec: Arc<dyn Codec>, config: StreamConfig, stream: &[u8]) -> Result<Vec<u8>, Error> {
    let mut out = Vec::new();
    Decompressor::new(codec, config)?.decompress(stream, &mut out)?;
    Ok(out)
}

// ── round trips ────────────────────────────────────────────────────────────

#[test]
fn test_roundtrip_across_chunk_boundaries() {
    for len in [0, 1, CHUNK - 1, CHUNK, CHUNK + 1, 3 * CHUNK] {
        let data = tensor_like_bytes(len);
        let stream = compress(zstd(), small_chunks(), &data);
        let restored = decompress(zstd(), small_chunks(), &stream).unwrap();
        assert_eq!(restored, data, "round trip failed for len {len}");
    }
}

#[test]
fn test_roundtrip_every_codec() {
    let data = tensor_like_bytes(5 * CHUNK + 7);
    let codecs: [Arc<dyn Codec>; 3] = [zstd(), Arc::new(Lz4Codec), Arc::new(PassThroughCodec)];
    for codec in codecs {
        let stream = compress(codec.clone(), small_chunks(), &data);
        let restored = decompress(codec.clone(), small_chunks(), &stream).unwrap();
        assert_eq!(restored, data, "{} round trip", codec.name());
    }
}

#[test]
fn test_block_count_and_lengths_follow_chunk_size() {
    let data = tensor_like_bytes(3 * CHUNK + 5);
    let stream = compress(zstd(), small_chunks(), &data);

    let lens: Vec<u32> = FrameReader::new(&stream[..])
        .map(|b| b.unwrap().header.original_len)
        .collect();
    assert_eq!(lens, vec![CHUNK as u32, CHUNK as u32, CHUNK as u32, 5]);
}

#[test]
fn test_decoded_block_length_matches_header() {
    let data = pseudo_random_bytes(2 * CHUNK + 3, 7);
    let stream = compress(zstd(), small_chunks(), &data);
    let codec = BlockCodec::new(zstd());

    let mut offset = 0;
    for block in FrameReader::new(&stream[..]) {
        let block = block.unwrap();
        let raw = codec.decode_block(&block.payload, block.original_len()).unwrap();
        assert_eq!(raw.len(), block.original_len());
        assert_eq!(raw, &data[offset..offset + raw.len()]);
        offset += raw.len();
    }
    assert_eq!(offset, data.len());
}

#[test]
fn test_empty_input_yields_empty_stream() {
    let mut out = Vec::new();
    let stats = Compressor::new(zstd(), small_chunks())
        .unwrap()
        .compress(&b""[..], &mut out)
        .unwrap();
    assert!(out.is_empty());
    assert_eq!(stats.blocks, 0);
    assert_eq!(stats.ratio(), 1.0);

    let restored = decompress(zstd(), small_chunks(), &out).unwrap();
    assert!(restored.is_empty());
}

#[test]
fn test_odd_length_single_block() {
    let data = b"ABCDE";
    let stream = compress(Arc::new(PassThroughCodec), small_chunks(), data);
    assert_eq!(&stream[..BLOCK_HEADER_SIZE], &[5, 0, 0, 0, 5, 0, 0, 0]);
    assert_eq!(&stream[BLOCK_HEADER_SIZE..], b"ACBDE");
    assert_eq!(decompress(Arc::new(PassThroughCodec), small_chunks(), &stream).unwrap(), data);
}

#[test]
fn test_encoding_is_deterministic() {
    let data = tensor_like_bytes(CHUNK);
    let codec = BlockCodec::new(zstd());
    assert_eq!(
        codec.encode_block(&data, 3).unwrap(),
        codec.encode_block(&data, 3).unwrap()
    );
    assert_eq!(
        compress(zstd(), small_chunks(), &data),
        compress(zstd(), small_chunks(), &data)
    );
}

#[test]
fn test_parallel_output_is_identical() {
    let data = tensor_like_bytes(9 * CHUNK + 11);
    let sequential = compress(zstd(), small_chunks(), &data);
    let parallel = compress(zstd(), small_chunks().with_workers(4), &data);
    assert_eq!(parallel, sequential);

    let restored = decompress(zstd(), small_chunks().with_workers(3), &parallel).unwrap();
    assert_eq!(restored, data);
}

#[test]
fn test_byte_split_helps_tensor_like_data() {
    let data = tensor_like_bytes(8 * CHUNK);
    let split = compress(zstd(), small_chunks(), &data);
    let plain = zstd::bulk::compress(&data, 3).unwrap();
    assert!(
        split.len() < plain.len(),
        "split={} plain={}",
        split.len(),
        plain.len()
    );
}

#[test]
fn test_stats_account_for_every_byte() {
    let data = tensor_like_bytes(2 * CHUNK + 1);
    let mut out = Vec::new();
    let stats = Compressor::new(zstd(), small_chunks())
        .unwrap()
        .compress(&data[..], &mut out)
        .unwrap();
    assert_eq!(stats.blocks, 3);
    assert_eq!(stats.original_bytes, data.len() as u64);
    assert_eq!(stats.framed_bytes, out.len() as u64);
    assert_eq!(stats.compressed_bytes + 3 * BLOCK_HEADER_SIZE as u64, stats.framed_bytes);

    let mut restored = Vec::new();
    let dstats = Decompressor::new(zstd(), small_chunks())
        .unwrap()
        .decompress(&out[..], &mut restored)
        .unwrap();
    assert_eq!(dstats.blocks, 3);
    assert_eq!(dstats.restored_bytes, data.len() as u64);
    assert_eq!(dstats.framed_bytes, out.len() as u64);
    assert_eq!(dstats.compressed_bytes, stats.compressed_bytes);
}

// ── corruption ─────────────────────────────────────────────────────────────

#[test]
fn test_truncated_payload_is_framing_error() {
    let data = tensor_like_bytes(2 * CHUNK + 3);
    let mut stream = compress(zstd(), small_chunks(), &data);
    stream.pop();

    let err = decompress(zstd(), small_chunks(), &stream).unwrap_err();
    assert!(
        matches!(err.as_framing(), Some(FramingError::TruncatedPayload { .. })),
        "got {err:?}"
    );
}

#[test]
fn test_trailing_partial_header_is_framing_error() {
    let data = tensor_like_bytes(CHUNK + 3);
    let mut stream = compress(zstd(), small_chunks(), &data);
    stream.extend_from_slice(&[0xAA; 4]);

    let err = decompress(zstd(), small_chunks(), &stream).unwrap_err();
    assert_eq!(err.as_framing(), Some(&FramingError::TruncatedHeader { got: 4 }));
}

#[test]
fn test_partial_output_survives_mid_stream_error() {
    let data = tensor_like_bytes(3 * CHUNK);
    let mut stream = compress(zstd(), small_chunks(), &data);
    stream.truncate(stream.len() - 1);

    let mut restored = Vec::new();
    let result = Decompressor::new(zstd(), small_chunks())
        .unwrap()
        .decompress(&stream[..], &mut restored);
    assert!(result.is_err());
    assert_eq!(restored, &data[..2 * CHUNK]);
}

#[test]
fn test_corrupt_payload_is_decompression_error() {
    let data = tensor_like_bytes(CHUNK);
    let mut stream = compress(zstd(), small_chunks(), &data);
    // Clobber the zstd frame magic.
    stream[BLOCK_HEADER_SIZE] ^= 0xFF;

    let err = decompress(zstd(), small_chunks(), &stream).unwrap_err();
    assert!(matches!(err, Error::Decompression { .. }), "got {err:?}");
}

#[test]
fn test_wrong_original_len_is_rejected() {
    let data = tensor_like_bytes(CHUNK);
    let mut stream = compress(zstd(), small_chunks(), &data);
    stream[0..4].copy_from_slice(&(CHUNK as u32 - 2).to_le_bytes());

    let err = decompress(zstd(), small_chunks(), &stream).unwrap_err();
    assert!(matches!(err, Error::Decompression { .. }), "got {err:?}");
}

#[test]
fn test_decompressor_ignores_chunk_size() {
    let data = tensor_like_bytes(CHUNK + 1);
    let stream = compress(zstd(), small_chunks(), &data);
    let decode_only = StreamConfig::default().with_chunk_size(0);
    assert_eq!(decompress(zstd(), decode_only, &stream).unwrap(), data);
}

// ── compress-side failure ──────────────────────────────────────────────────

/// Stores blocks verbatim but refuses any block whose first byte is 0xFF.
struct RejectsMarker;

const MARKER: u8 = 0xFF;

impl Codec for RejectsMarker {
    fn name(&self) -> &'static str {
        "rejects-marker"
    }

    fn compress(&self, raw: &[u8], level: i32) -> splitz_core::Result<Vec<u8>> {
        if raw.first() == Some(&MARKER) {
            return Err(Error::compression(self.name(), "marker block"));
        }
        PassThroughCodec.compress(raw, level)
    }

    fn decompress(&self, compressed: &[u8], expected_len: usize) -> splitz_core::Result<Vec<u8>> {
        PassThroughCodec.decompress(compressed, expected_len)
    }

    fn bound(&self, len: usize) -> usize {
        len
    }
}

/// Six 4-byte chunks; chunk `bad` starts with the marker.
fn chunks_with_marker_at(bad: usize) -> Vec<u8> {
    (0..6u8)
        .flat_map(|i| {
            let first = if i as usize == bad { MARKER } else { b'a' + i };
            [first, b'0' + i, b'k' + i, b'x' + i]
        })
        .collect()
}

fn assert_compress_stops_at(bad: usize, workers: usize) {
    let config = StreamConfig::default().with_chunk_size(4).with_workers(workers);
    let data = chunks_with_marker_at(bad);

    let mut out = Vec::new();
    let err = Compressor::new(Arc::new(RejectsMarker), config)
        .unwrap()
        .compress(&data[..], &mut out)
        .unwrap_err();
    match err {
        Error::Compression { codec, message } => {
            assert_eq!(codec, "rejects-marker");
            assert_eq!(message, "marker block");
        }
        other => panic!("expected compression error, got {other:?}"),
    }

    let expected = compress(Arc::new(PassThroughCodec), config, &data[..4 * bad]);
    assert_eq!(out, expected, "bad chunk {bad}, {workers} worker(s)");
    assert_eq!(FrameReader::new(&out[..]).count(), bad);
}

#[test]
fn test_compression_error_keeps_prior_blocks_sequential() {
    assert_compress_stops_at(0, 1);
    assert_compress_stops_at(1, 1);
    assert_compress_stops_at(4, 1);
}

#[test]
fn test_compression_error_keeps_prior_blocks_parallel() {
    // Failure in the first batch, and in the middle of a later one.
    assert_compress_stops_at(1, 3);
    assert_compress_stops_at(3, 2);
    assert_compress_stops_at(5, 4);
}

#[test]
fn test_compression_error_flushes_buffered_output() {
    let config = StreamConfig::default().with_chunk_size(4);
    let data = chunks_with_marker_at(2);

    let mut out = std::io::BufWriter::with_capacity(1 << 16, Vec::new());
    let result = Compressor::new(Arc::new(RejectsMarker), config)
        .unwrap()
        .compress(&data[..], &mut out);
    assert!(matches!(result, Err(Error::Compression { .. })));

    let expected = compress(Arc::new(PassThroughCodec), config, &data[..8]);
    assert_eq!(out.get_ref(), &expected);
}

// ── files ──────────────────────────────────────────────────────────────────

#[test]
fn test_file_roundtrip() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("model.safetensors");
    let packed = dir.path().join("model.safetensors.zst_split");
    let restored = dir.path().join("model_restored.safetensors");

    let data = tensor_like_bytes(4 * CHUNK + 1);
    std::fs::write(&input, &data).unwrap();

    let cstats = compress_file(&input, &packed, zstd(), small_chunks()).unwrap();
    assert_eq!(cstats.framed_bytes, std::fs::metadata(&packed).unwrap().len());

    let dstats = decompress_file(&packed, &restored, zstd(), small_chunks()).unwrap();
    assert_eq!(dstats.restored_bytes, data.len() as u64);
    assert_eq!(std::fs::read(&restored).unwrap(), data);
}

#[test]
fn test_missing_input_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = compress_file(
        dir.path().join("absent.bin"),
        dir.path().join("out.spz"),
        zstd(),
        StreamConfig::default(),
    )
    .unwrap_err();
    assert!(matches!(err, Error::Io(_)), "got {err:?}");
}

#[test]
fn test_invalid_config_is_rejected() {
    let err = Compressor::new(zstd(), StreamConfig::default().with_chunk_size(0))
        .err()
        .unwrap();
    assert!(matches!(err, Error::InvalidConfig(_)));
}

#[test]
#[ignore = "allocates and compresses ~100 MiB"]
fn test_roundtrip_default_chunk_size() {
    let data = tensor_like_bytes(DEFAULT_CHUNK_SIZE + 1);
    let config = StreamConfig::default();
    let stream = compress(zstd(), config, &data);
    assert_eq!(FrameReader::new(&stream[..]).count(), 2);
    assert_eq!(decompress(zstd(), config, &stream).unwrap(), data);
}
