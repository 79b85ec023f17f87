//! Canonical 44-byte RIFF/WAVE header parsing, validation and synthesis.

use std::fmt;
use std::time::Duration;

use crate::error::{PcmError, PcmResult};

const RIFF_ID: [u8; 4] = *b"RIFF";
const WAVE_ID: [u8; 4] = *b"WAVE";
const FMT_ID: [u8; 4] = *b"fmt ";
const DATA_ID: [u8; 4] = *b"data";
const PCM_FORMAT_CODE: u16 = 1;
const PCM_FMT_CHUNK_SIZE: u32 = 16;

/// Size of the canonical PCM header that precedes the sample payload.
pub const HEADER_SIZE: usize = 44;

/// Bit depths a header may declare.
pub const SUPPORTED_BIT_DEPTHS: [u16; 4] = [8, 16, 24, 32];

/// Parsed WAV header fields, read once per stream and never mutated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WavHeader {
    riff_id: [u8; 4],
    chunk_size: u32,
    wave_id: [u8; 4],
    fmt_id: [u8; 4],
    fmt_chunk_size: u32,
    format_code: u16,
    channel_count: u16,
    sample_rate: u32,
    byte_rate: u32,
    block_align: u16,
    bits_per_sample: u16,
    data_id: [u8; 4],
    data_size: u32,
}

impl WavHeader {
    /// Parse the fixed-offset little-endian fields from the first 44 bytes.
    ///
    /// Parsing only checks that every field can be read; call [`WavHeader::validate`]
    /// or [`WavHeader::is_valid`] before trusting the values.
    pub fn parse(bytes: &[u8]) -> PcmResult<Self> {
        if bytes.len() < HEADER_SIZE {
            return Err(PcmError::invalid_header(format!(
                "WAV header is too small: {} bytes (minimum {HEADER_SIZE} bytes required)",
                bytes.len()
            )));
        }
        Ok(Self {
            riff_id: read_id(bytes, 0)?,
            chunk_size: read_u32(bytes, 4)?,
            wave_id: read_id(bytes, 8)?,
            fmt_id: read_id(bytes, 12)?,
            fmt_chunk_size: read_u32(bytes, 16)?,
            format_code: read_u16(bytes, 20)?,
            channel_count: read_u16(bytes, 22)?,
            sample_rate: read_u32(bytes, 24)?,
            byte_rate: read_u32(bytes, 28)?,
            block_align: read_u16(bytes, 32)?,
            bits_per_sample: read_u16(bytes, 34)?,
            data_id: read_id(bytes, 36)?,
            data_size: read_u32(bytes, 40)?,
        })
    }

    /// Build a canonical PCM header for the given layout and payload size.
    pub fn synthesize(
        channels: u16,
        sample_rate: u32,
        bits_per_sample: u16,
        data_size: u32,
    ) -> PcmResult<Self> {
        if channels == 0 {
            return Err(PcmError::invalid_header(
                "Channel count must be positive, got 0",
            ));
        }
        if sample_rate == 0 {
            return Err(PcmError::invalid_header("Sample rate must be positive, got 0"));
        }
        if !SUPPORTED_BIT_DEPTHS.contains(&bits_per_sample) {
            return Err(PcmError::invalid_header(format!(
                "Bits per sample must be 8, 16, 24, or 32, got {bits_per_sample}"
            )));
        }
        let block_align = u16::try_from(u32::from(channels) * u32::from(bits_per_sample / 8))
            .map_err(|_| PcmError::invalid_header("Block align does not fit in 16 bits"))?;
        let byte_rate = sample_rate
            .checked_mul(u32::from(block_align))
            .ok_or_else(|| PcmError::invalid_header("Byte rate does not fit in 32 bits"))?;
        let chunk_size = data_size
            .checked_add((HEADER_SIZE - 8) as u32)
            .ok_or_else(|| PcmError::invalid_header("Data size too large for a RIFF chunk"))?;
        Ok(Self {
            riff_id: RIFF_ID,
            chunk_size,
            wave_id: WAVE_ID,
            fmt_id: FMT_ID,
            fmt_chunk_size: PCM_FMT_CHUNK_SIZE,
            format_code: PCM_FORMAT_CODE,
            channel_count: channels,
            sample_rate,
            byte_rate,
            block_align,
            bits_per_sample,
            data_id: DATA_ID,
            data_size,
        })
    }

    /// Check chunk markers, format code, bit depth and the derived rate fields.
    pub fn validate(&self) -> PcmResult<()> {
        if self.riff_id != RIFF_ID
            || self.wave_id != WAVE_ID
            || self.fmt_id != FMT_ID
            || self.data_id != DATA_ID
        {
            return Err(PcmError::invalid_header("Missing RIFF/WAVE/fmt/data markers"));
        }
        if self.format_code != PCM_FORMAT_CODE {
            return Err(PcmError::invalid_header(format!(
                "Format code {} is not PCM",
                self.format_code
            )));
        }
        if !SUPPORTED_BIT_DEPTHS.contains(&self.bits_per_sample) {
            return Err(PcmError::invalid_header(format!(
                "Unsupported bit depth {}",
                self.bits_per_sample
            )));
        }
        if self.channel_count == 0 || self.sample_rate == 0 {
            return Err(PcmError::invalid_header(
                "Channel count and sample rate must be positive",
            ));
        }
        let bytes_per_sample = u64::from(self.bits_per_sample / 8);
        let expected_block_align = u64::from(self.channel_count) * bytes_per_sample;
        let expected_byte_rate = u64::from(self.sample_rate) * expected_block_align;
        if u64::from(self.block_align) != expected_block_align {
            return Err(PcmError::invalid_header(format!(
                "Block align {} does not match expected {expected_block_align}",
                self.block_align
            )));
        }
        if u64::from(self.byte_rate) != expected_byte_rate {
            return Err(PcmError::invalid_header(format!(
                "Byte rate {} does not match expected {expected_byte_rate}",
                self.byte_rate
            )));
        }
        Ok(())
    }

    /// True when [`WavHeader::validate`] passes.
    pub fn is_valid(&self) -> bool {
        self.validate().is_ok()
    }

    /// Serialize the stored fields back into the canonical 44-byte layout.
    pub fn to_bytes(&self) -> [u8; HEADER_SIZE] {
        let mut out = [0u8; HEADER_SIZE];
        out[0..4].copy_from_slice(&self.riff_id);
        out[4..8].copy_from_slice(&self.chunk_size.to_le_bytes());
        out[8..12].copy_from_slice(&self.wave_id);
        out[12..16].copy_from_slice(&self.fmt_id);
        out[16..20].copy_from_slice(&self.fmt_chunk_size.to_le_bytes());
        out[20..22].copy_from_slice(&self.format_code.to_le_bytes());
        out[22..24].copy_from_slice(&self.channel_count.to_le_bytes());
        out[24..28].copy_from_slice(&self.sample_rate.to_le_bytes());
        out[28..32].copy_from_slice(&self.byte_rate.to_le_bytes());
        out[32..34].copy_from_slice(&self.block_align.to_le_bytes());
        out[34..36].copy_from_slice(&self.bits_per_sample.to_le_bytes());
        out[36..40].copy_from_slice(&self.data_id);
        out[40..44].copy_from_slice(&self.data_size.to_le_bytes());
        out
    }

    /// Copy of this header with a different payload size, keeping the RIFF size in step.
    pub fn with_data_size(&self, data_size: u32) -> Self {
        Self {
            data_size,
            chunk_size: data_size.saturating_add((HEADER_SIZE - 8) as u32),
            ..*self
        }
    }

    pub fn channel_count(&self) -> u16 {
        self.channel_count
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn bit_depth(&self) -> u16 {
        self.bits_per_sample
    }

    pub fn byte_rate(&self) -> u32 {
        self.byte_rate
    }

    /// Bits per second of payload.
    pub fn bit_rate(&self) -> u64 {
        u64::from(self.byte_rate) * 8
    }

    pub fn block_align(&self) -> u16 {
        self.block_align
    }

    pub fn data_size(&self) -> u32 {
        self.data_size
    }

    pub fn header_size(&self) -> usize {
        HEADER_SIZE
    }

    /// Bytes occupied by one sample of one channel.
    pub fn bytes_per_sample(&self) -> usize {
        usize::from(self.bits_per_sample / 8)
    }

    /// Samples per channel declared by the payload size.
    pub fn sample_count(&self) -> u64 {
        let block_align = u64::from(self.block_align);
        if block_align == 0 {
            return 0;
        }
        u64::from(self.data_size) / block_align
    }

    /// Playback length implied by the payload size and sample rate.
    pub fn duration(&self) -> Duration {
        if self.sample_rate == 0 {
            return Duration::ZERO;
        }
        let frames = self.sample_count();
        let rate = u64::from(self.sample_rate);
        let secs = frames / rate;
        let nanos = (frames % rate) * 1_000_000_000 / rate;
        Duration::new(secs, nanos as u32)
    }
}

impl fmt::Display for WavHeader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "WAV Header:")?;
        writeln!(f, "  RIFF ID: {}", String::from_utf8_lossy(&self.riff_id))?;
        writeln!(f, "  Chunk Size: {} bytes", self.chunk_size)?;
        writeln!(f, "  Format: {}", String::from_utf8_lossy(&self.wave_id))?;
        writeln!(f, "  Format Chunk ID: {}", String::from_utf8_lossy(&self.fmt_id))?;
        writeln!(f, "  Format Chunk Size: {} bytes", self.fmt_chunk_size)?;
        writeln!(f, "  Format Code: {}", self.format_code)?;
        writeln!(f, "  Channels: {}", self.channel_count)?;
        writeln!(f, "  Sample Rate: {} Hz", self.sample_rate)?;
        writeln!(f, "  Byte Rate: {} bytes/sec", self.byte_rate)?;
        writeln!(f, "  Block Align: {} bytes", self.block_align)?;
        writeln!(f, "  Bits Per Sample: {} bits", self.bits_per_sample)?;
        writeln!(f, "  Data Chunk ID: {}", String::from_utf8_lossy(&self.data_id))?;
        writeln!(f, "  Data Size: {} bytes", self.data_size)?;
        write!(f, "  Valid: {}", self.is_valid())
    }
}

fn field<const N: usize>(bytes: &[u8], offset: usize) -> PcmResult<[u8; N]> {
    bytes
        .get(offset..offset + N)
        .and_then(|slice| slice.try_into().ok())
        .ok_or_else(|| {
            PcmError::invalid_header(format!(
                "Cannot read {N} bytes at offset {offset} (buffer size: {})",
                bytes.len()
            ))
        })
}

fn read_id(bytes: &[u8], offset: usize) -> PcmResult<[u8; 4]> {
    field::<4>(bytes, offset)
}

fn read_u16(bytes: &[u8], offset: usize) -> PcmResult<u16> {
    field::<2>(bytes, offset).map(u16::from_le_bytes)
}

fn read_u32(bytes: &[u8], offset: usize) -> PcmResult<u32> {
    field::<4>(bytes, offset).map(u32::from_le_bytes)
}
