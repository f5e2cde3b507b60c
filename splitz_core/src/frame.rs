use std::io::{self, ErrorKind, Read, Write};

use log::debug;

use crate::error::{FramingError, Result};
use crate::format::{BlockHeader, BLOCK_HEADER_SIZE};

/// One framed block as read from a stream: header plus compressed payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    pub header: BlockHeader,
    pub payload: Vec<u8>,
}

impl Block {
    pub fn original_len(&self) -> usize {
        self.header.original_len as usize
    }
}

/// Sequential writer of length-prefixed blocks.
///
/// # Format layout written
/// ```text
/// [original_len:u32][compressed_len:u32][payload]   ← block 0
/// [original_len:u32][compressed_len:u32][payload]   ← block 1
/// ...
/// ```
/// There is no file header, index, or footer.
pub struct FrameWriter<W: Write> {
    inner: W,
    blocks_written: u64,
    bytes_written: u64,
}

impl<W: Write> FrameWriter<W> {
    pub fn new(inner: W) -> Self {
        Self {
            inner,
            blocks_written: 0,
            bytes_written: 0,
        }
    }

    /// Write one block header followed by its payload.
    ///
    /// Fails with [`FramingError::LengthOverflow`] before writing anything if
    /// either length does not fit in a u32.
    pub fn write_block(&mut self, original_len: usize, compressed: &[u8]) -> Result<()> {
        let header = BlockHeader {
            original_len: u32::try_from(original_len).map_err(|_| {
                FramingError::LengthOverflow {
                    field: "original_len",
                    len: original_len,
                }
            })?,
            compressed_len: u32::try_from(compressed.len()).map_err(|_| {
                FramingError::LengthOverflow {
                    field: "compressed_len",
                    len: compressed.len(),
                }
            })?,
        };

        self.inner.write_all(&header.to_bytes())?;
        self.inner.write_all(compressed)?;

        debug!(
            "wrote block {}: original_len={} compressed_len={}",
            self.blocks_written, header.original_len, header.compressed_len
        );
        self.blocks_written += 1;
        self.bytes_written += header.framed_len();
        Ok(())
    }

    pub fn flush(&mut self) -> Result<()> {
        self.inner.flush()?;
        Ok(())
    }

    pub fn blocks_written(&self) -> u64 {
        self.blocks_written
    }

    /// Bytes written so far, headers included.
    pub fn bytes_written(&self) -> u64 {
        self.bytes_written
    }

    pub fn into_inner(self) -> W {
        self.inner
    }
}

/// Sequential reader of length-prefixed blocks.
///
/// Also usable as an iterator of `Result<Block>`; iteration stops after the
/// first error or at clean end of stream.
pub struct FrameReader<R: Read> {
    inner: R,
    blocks_read: u64,
    bytes_read: u64,
    done: bool,
}

impl<R: Read> FrameReader<R> {
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            blocks_read: 0,
            bytes_read: 0,
            done: false,
        }
    }

    /// Read the next block.
    ///
    /// Returns `Ok(None)` when the stream ends exactly on a block boundary.
    /// A stream ending inside a header or payload is a [`FramingError`].
    pub fn read_block(&mut self) -> Result<Option<Block>> {
        let header = match self.read_header()? {
            Some(h) => h,
            None => return Ok(None),
        };

        let expected = header.compressed_len;
        let mut payload = Vec::new();
        let got = (&mut self.inner)
            .take(expected as u64)
            .read_to_end(&mut payload)?;
        if got != expected as usize {
            return Err(FramingError::TruncatedPayload { expected, got }.into());
        }

        debug!(
            "read block {}: original_len={} compressed_len={}",
            self.blocks_read, header.original_len, header.compressed_len
        );
        self.blocks_read += 1;
        self.bytes_read += header.framed_len();
        Ok(Some(Block { header, payload }))
    }

    /// Read only the next header, leaving the reader positioned at its payload.
    pub fn read_header(&mut self) -> Result<Option<BlockHeader>> {
        let mut buf = [0u8; BLOCK_HEADER_SIZE];
        match read_full(&mut self.inner, &mut buf)? {
            0 => Ok(None),
            BLOCK_HEADER_SIZE => Ok(Some(BlockHeader::from_bytes(&buf))),
            got => Err(FramingError::TruncatedHeader { got }.into()),
        }
    }

    /// Skip over `header`'s payload without buffering it.
    pub fn skip_payload(&mut self, header: &BlockHeader) -> Result<()> {
        let expected = header.compressed_len;
        let got = io::copy(&mut (&mut self.inner).take(expected as u64), &mut io::sink())?;
        if got != expected as u64 {
            return Err(FramingError::TruncatedPayload {
                expected,
                got: got as usize,
            }
            .into());
        }
        self.blocks_read += 1;
        self.bytes_read += header.framed_len();
        Ok(())
    }

    pub fn blocks_read(&self) -> u64 {
        self.blocks_read
    }

    /// Bytes consumed so far, headers included.
    pub fn bytes_read(&self) -> u64 {
        self.bytes_read
    }

    pub fn into_inner(self) -> R {
        self.inner
    }
}

impl<R: Read> Iterator for FrameReader<R> {
    type Item = Result<Block>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.read_block() {
            Ok(Some(block)) => Some(Ok(block)),
            Ok(None) => {
                self.done = true;
                None
            }
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}

impl<R: Read> std::iter::FusedIterator for FrameReader<R> {}

/// Fill `buf` from `reader`, stopping early only at end of input.
///
/// Returns the number of bytes read; anything short of `buf.len()` means the
/// source is exhausted.
pub(crate) fn read_full<R: Read + ?Sized>(reader: &mut R, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}
