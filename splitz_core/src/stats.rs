use std::time::Duration;

/// Totals gathered while compressing one stream.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CompressStats {
    pub blocks: u64,
    /// Raw input bytes consumed.
    pub original_bytes: u64,
    /// Compressed payload bytes, headers excluded.
    pub compressed_bytes: u64,
    /// Bytes written to the output, headers included.
    pub framed_bytes: u64,
    pub elapsed: Duration,
}

impl CompressStats {
    /// Compression ratio (original / compressed payload).
    pub fn ratio(&self) -> f64 {
        ratio(self.original_bytes, self.compressed_bytes)
    }

    /// Raw bytes consumed per second.
    pub fn throughput(&self) -> f64 {
        per_second(self.original_bytes, self.elapsed)
    }
}

/// Totals gathered while decompressing one stream.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DecompressStats {
    pub blocks: u64,
    /// Compressed payload bytes, headers excluded.
    pub compressed_bytes: u64,
    /// Bytes consumed from the input, headers included.
    pub framed_bytes: u64,
    /// Reconstructed bytes written to the output.
    pub restored_bytes: u64,
    pub elapsed: Duration,
}

impl DecompressStats {
    pub fn ratio(&self) -> f64 {
        ratio(self.restored_bytes, self.compressed_bytes)
    }

    /// Restored bytes produced per second.
    pub fn throughput(&self) -> f64 {
        per_second(self.restored_bytes, self.elapsed)
    }
}

fn ratio(raw: u64, compressed: u64) -> f64 {
    if compressed == 0 {
        return 1.0;
    }
    raw as f64 / compressed as f64
}

fn per_second(bytes: u64, elapsed: Duration) -> f64 {
    bytes as f64 / elapsed.as_secs_f64().max(1e-9)
}
