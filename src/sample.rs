//! Little-endian PCM sample decoding for 8/16/24-bit strides.

use serde::{Deserialize, Serialize};

use crate::error::{PcmError, PcmResult};

/// How 8-bit payload bytes map to signed amplitudes.
///
/// WAV stores 8-bit PCM as offset-binary, but some producers emit raw unsigned
/// bytes and expect them to be plotted as-is.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EightBitEncoding {
    /// Unsigned byte minus 128, so `0x80` is silence.
    #[default]
    OffsetBinary,
    /// Unsigned byte value without re-centering.
    RawUnsigned,
}

/// Decode one sample from the start of `bytes` using the canonical 8-bit convention.
#[inline]
pub fn decode_sample(bytes: &[u8], stride: usize) -> PcmResult<i32> {
    decode_sample_with(bytes, stride, EightBitEncoding::OffsetBinary)
}

/// Decode one sample from the start of `bytes` with an explicit 8-bit policy.
#[inline]
pub fn decode_sample_with(
    bytes: &[u8],
    stride: usize,
    eight_bit: EightBitEncoding,
) -> PcmResult<i32> {
    match (stride, bytes) {
        (1, [b0, ..]) => Ok(match eight_bit {
            EightBitEncoding::OffsetBinary => i32::from(*b0) - 128,
            EightBitEncoding::RawUnsigned => i32::from(*b0),
        }),
        (2, [b0, b1, ..]) => Ok(i32::from(i16::from_le_bytes([*b0, *b1]))),
        // Place the 24-bit value in the top of an i32 and shift back to sign-extend.
        (3, [b0, b1, b2, ..]) => Ok(i32::from_le_bytes([0, *b0, *b1, *b2]) >> 8),
        (1..=3, _) => Err(PcmError::InvalidIterator {
            message: format!(
                "Not enough bytes to decode a {stride}-byte sample ({} available)",
                bytes.len()
            ),
        }),
        _ => Err(PcmError::InvalidBitDepth {
            bits: (stride as u32).saturating_mul(8),
        }),
    }
}

/// Largest magnitude a decoded sample of `bit_depth` can reach.
pub fn full_scale(bit_depth: u16) -> f64 {
    (1u64 << bit_depth.clamp(1, 32).saturating_sub(1)) as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sixteen_bit_extremes() {
        assert_eq!(decode_sample(&[0x00, 0x80], 2).unwrap(), -32_768);
        assert_eq!(decode_sample(&[0xFF, 0x7F], 2).unwrap(), 32_767);
        assert_eq!(decode_sample(&[0xFF, 0xFF], 2).unwrap(), -1);
    }

    #[test]
    fn eight_bit_is_offset_binary_by_default() {
        assert_eq!(decode_sample(&[0x00], 1).unwrap(), -128);
        assert_eq!(decode_sample(&[0x80], 1).unwrap(), 0);
        assert_eq!(decode_sample(&[0xFF], 1).unwrap(), 127);
    }

    #[test]
    fn eight_bit_raw_unsigned_policy() {
        let value = decode_sample_with(&[0x00], 1, EightBitEncoding::RawUnsigned).unwrap();
        assert_eq!(value, 0);
        let value = decode_sample_with(&[0xFF], 1, EightBitEncoding::RawUnsigned).unwrap();
        assert_eq!(value, 255);
    }

    #[test]
    fn twenty_four_bit_sign_extends() {
        assert_eq!(decode_sample(&[0xFF, 0xFF, 0x7F], 3).unwrap(), 8_388_607);
        assert_eq!(decode_sample(&[0x00, 0x00, 0x80], 3).unwrap(), -8_388_608);
        assert_eq!(decode_sample(&[0xFF, 0xFF, 0xFF], 3).unwrap(), -1);
        assert_eq!(decode_sample(&[0x01, 0x00, 0x00], 3).unwrap(), 1);
    }

    #[test]
    fn unsupported_strides_fail() {
        let err = decode_sample(&[0; 4], 4).unwrap_err();
        assert!(matches!(err, PcmError::InvalidBitDepth { bits: 32 }));
        assert!(matches!(
            decode_sample(&[], 0).unwrap_err(),
            PcmError::InvalidBitDepth { bits: 0 }
        ));
    }

    #[test]
    fn truncated_input_is_an_access_error() {
        let err = decode_sample(&[0x01], 2).unwrap_err();
        assert!(matches!(err, PcmError::InvalidIterator { .. }));
    }

    #[test]
    fn full_scale_matches_bit_depth() {
        assert_eq!(full_scale(8), 128.0);
        assert_eq!(full_scale(16), 32_768.0);
        assert_eq!(full_scale(24), 8_388_608.0);
    }
}
