//! Byte-plane splitting.
//!
//! Multi-byte numeric data (f16/bf16 tensor weights in particular) keeps its
//! high-entropy mantissa bytes and its low-entropy exponent/sign bytes at
//! alternating offsets. Gathering the even-indexed bytes into the first half of
//! the buffer and the odd-indexed bytes into the second half gives the entropy
//! coder two long runs of similar bytes instead of one interleaved stream.
//!
//! ```text
//! input:   A B C D E F G        (len 7, odd)
//! output:  A C E | B D F | G
//!          even    odd     tail
//! ```
//!
//! When the length is odd the final byte has no partner and is carried through
//! unchanged at the end. The inverse needs the original length because the
//! tail's existence depends on parity.

use crate::error::{Error, Result};

/// Split `src` into its even-indexed bytes followed by its odd-indexed bytes.
///
/// The output always has the same length as the input. Infallible for every
/// input, including empty.
pub fn transform(src: &[u8]) -> Vec<u8> {
    let half = src.len() / 2;
    let mut out = vec![0u8; src.len()];

    let (evens, rest) = out.split_at_mut(half);
    let (odds, tail) = rest.split_at_mut(half);

    let pairs = src.chunks_exact(2);
    tail.copy_from_slice(pairs.remainder());
    for ((pair, e), o) in pairs.zip(evens.iter_mut()).zip(odds.iter_mut()) {
        *e = pair[0];
        *o = pair[1];
    }

    out
}

/// Re-interleave a buffer produced by [`transform`].
///
/// `original_len` must equal `src.len()`; a mismatch means the block header and
/// the decoded payload disagree and is reported as a decompression failure.
pub fn untransform(src: &[u8], original_len: usize) -> Result<Vec<u8>> {
    if src.len() != original_len {
        return Err(Error::decompression(
            "byte-split",
            format!(
                "transformed buffer is {} bytes but header declares {}",
                src.len(),
                original_len
            ),
        ));
    }

    let half = original_len / 2;
    let mut out = vec![0u8; original_len];

    let (evens, rest) = src.split_at(half);
    let (odds, tail) = rest.split_at(half);

    let mut pairs = out.chunks_exact_mut(2);
    for ((pair, &e), &o) in (&mut pairs).zip(evens).zip(odds) {
        pair[0] = e;
        pair[1] = o;
    }
    pairs.into_remainder().copy_from_slice(tail);

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lcg_bytes(len: usize, seed: u64) -> Vec<u8> {
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

    #[test]
    fn odd_length_keeps_tail_in_place() {
        let split = transform(b"ABCDE");
        assert_eq!(split, b"ACBDE".to_vec());
        assert_eq!(untransform(&split, 5).unwrap(), b"ABCDE".to_vec());
    }

    #[test]
    fn even_length_splits_into_halves() {
        assert_eq!(transform(b"ABCDEF"), b"ACEBDF".to_vec());
        assert_eq!(untransform(b"ACEBDF", 6).unwrap(), b"ABCDEF".to_vec());
    }

    #[test]
    fn empty_and_single_byte_are_identity() {
        assert!(transform(&[]).is_empty());
        assert!(untransform(&[], 0).unwrap().is_empty());
        assert_eq!(transform(&[0x7f]), vec![0x7f]);
        assert_eq!(untransform(&[0x7f], 1).unwrap(), vec![0x7f]);
    }

    #[test]
    fn bijection_across_lengths() {
        for (i, &len) in [0usize, 1, 2, 3, 1024, 1024 * 1024 + 1].iter().enumerate() {
            let data = lcg_bytes(len, 0xC0FFEE + i as u64);
            let split = transform(&data);
            assert_eq!(split.len(), len);
            assert_eq!(untransform(&split, len).unwrap(), data, "len {len}");
        }
    }

    #[test]
    fn length_mismatch_is_rejected() {
        let err = untransform(b"ACBDE", 6).unwrap_err();
        assert!(matches!(err, Error::Decompression { .. }), "got {err:?}");
    }
}
