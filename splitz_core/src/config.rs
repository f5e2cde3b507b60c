use crate::error::{Error, Result};
use crate::format::{DEFAULT_CHUNK_SIZE, DEFAULT_LEVEL};

/// Knobs for the stream driver.
///
/// Only `chunk_size` and `level` affect the bytes written; `workers` changes
/// throughput, never output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamConfig {
    /// Raw bytes per block (the last block may be smaller).
    pub chunk_size: usize,
    /// Entropy-coder level (zstd: 1 = fast / larger, 22 = slow / smallest).
    pub level: i32,
    /// Blocks encoded or decoded concurrently. 1 keeps everything on the
    /// calling thread.
    pub workers: usize,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            level: DEFAULT_LEVEL,
            workers: 1,
        }
    }
}

impl StreamConfig {
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size;
        self
    }

    pub fn with_level(mut self, level: i32) -> Self {
        self.level = level;
        self
    }

    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    /// Reject values the stream format or driver cannot honour.
    pub fn validate(&self) -> Result<()> {
        if self.chunk_size == 0 {
            return Err(Error::InvalidConfig("chunk_size must be at least 1 byte".into()));
        }
        if self.chunk_size as u64 > u32::MAX as u64 {
            return Err(Error::InvalidConfig(format!(
                "chunk_size {} exceeds the u32 block length limit {}",
                self.chunk_size,
                u32::MAX
            )));
        }
        self.validate_workers()
    }

    /// The only check that applies when decoding.
    pub fn validate_workers(&self) -> Result<()> {
        if self.workers == 0 {
            return Err(Error::InvalidConfig("workers must be at least 1".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_matches_format_defaults() {
        let config = StreamConfig::default();
        assert_eq!(config.chunk_size, 50 * 1024 * 1024);
        assert_eq!(config.level, 3);
        assert_eq!(config.workers, 1);
        config.validate().unwrap();
    }

    #[test]
    fn rejects_out_of_range_values() {
        assert!(StreamConfig::default().with_chunk_size(0).validate().is_err());
        assert!(StreamConfig::default().with_workers(0).validate().is_err());
        assert!(StreamConfig::default().with_workers(0).validate_workers().is_err());
        let too_big = u32::MAX as usize + 1;
        assert!(matches!(
            StreamConfig::default().with_chunk_size(too_big).validate(),
            Err(Error::InvalidConfig(_))
        ));
    }

    #[test]
    fn worker_check_ignores_chunk_size() {
        let decode_only = StreamConfig::default().with_chunk_size(0);
        assert!(decode_only.validate().is_err());
        decode_only.validate_workers().unwrap();
    }
}
