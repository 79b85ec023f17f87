//! Immutable windows of raw PCM bytes with lazily decoded samples.

use std::sync::Arc;

use crate::error::{PcmError, PcmResult};
use crate::sample::{EightBitEncoding, decode_sample_with};

/// A window of consecutive single-channel samples over a shared byte buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonoFrame {
    bytes: Arc<[u8]>,
    stride: usize,
    capacity: usize,
    eight_bit: EightBitEncoding,
}

impl MonoFrame {
    /// Wrap `bytes` as samples of `stride` bytes each.
    ///
    /// `capacity` is the sample count the frame was sized for; near the end of a
    /// stream it exceeds the number of samples actually present.
    pub fn new(bytes: impl Into<Arc<[u8]>>, stride: usize, capacity: usize) -> PcmResult<Self> {
        if stride == 0 {
            return Err(PcmError::InvalidBitDepth { bits: 0 });
        }
        let bytes = bytes.into();
        let capacity = capacity.max(bytes.len() / stride);
        Ok(Self {
            bytes,
            stride,
            capacity,
            eight_bit: EightBitEncoding::default(),
        })
    }

    /// Same bytes, decoded with a different 8-bit convention.
    pub fn with_eight_bit_encoding(mut self, encoding: EightBitEncoding) -> Self {
        self.eight_bit = encoding;
        self
    }

    pub fn eight_bit_encoding(&self) -> EightBitEncoding {
        self.eight_bit
    }

    /// Decode the sample at `index`.
    pub fn get(&self, index: usize) -> PcmResult<i32> {
        let count = self.sample_count();
        if index >= count {
            return Err(PcmError::InvalidIterator {
                message: format!("Sample index {index} out of bounds (sample count {count})"),
            });
        }
        let start = index * self.stride;
        let Some(sample_bytes) = self.bytes.get(start..start + self.stride) else {
            return Err(PcmError::InvalidIterator {
                message: format!("Not enough bytes to read a complete sample at index {index}"),
            });
        };
        decode_sample_with(sample_bytes, self.stride, self.eight_bit)
    }

    /// Lazily decode every sample from index 0.
    pub fn samples(&self) -> Samples<'_> {
        Samples {
            frame: self,
            index: 0,
        }
    }

    /// Decode all samples eagerly, failing on the first bad one.
    pub fn decode_all(&self) -> PcmResult<Vec<i32>> {
        self.samples().collect()
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn sample_count(&self) -> usize {
        self.bytes.len() / self.stride
    }

    pub fn sample_byte_stride(&self) -> usize {
        self.stride
    }

    pub fn sample_capacity(&self) -> usize {
        self.capacity
    }

    pub fn channel_count(&self) -> u16 {
        1
    }

    pub fn is_empty(&self) -> bool {
        self.sample_count() == 0
    }
}

impl<'a> IntoIterator for &'a MonoFrame {
    type Item = PcmResult<i32>;
    type IntoIter = Samples<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.samples()
    }
}

/// Iterator over the decoded samples of a [`MonoFrame`].
#[derive(Debug, Clone)]
pub struct Samples<'a> {
    frame: &'a MonoFrame,
    index: usize,
}

impl Iterator for Samples<'_> {
    type Item = PcmResult<i32>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.index >= self.frame.sample_count() {
            return None;
        }
        let sample = self.frame.get(self.index);
        self.index += 1;
        Some(sample)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.frame.sample_count().saturating_sub(self.index);
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for Samples<'_> {}

/// Interleaved stereo window split into two same-length channel frames.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StereoFrame {
    interleaved: Arc<[u8]>,
    left: MonoFrame,
    right: MonoFrame,
}

impl StereoFrame {
    /// De-interleave `bytes` (L, R, L, R, ...) into left and right channel frames.
    ///
    /// Trailing bytes that do not form a whole stereo sample are dropped.
    pub fn from_interleaved(
        bytes: impl Into<Arc<[u8]>>,
        stride: usize,
        capacity: usize,
    ) -> PcmResult<Self> {
        if stride == 0 {
            return Err(PcmError::InvalidBitDepth { bits: 0 });
        }
        let bytes: Arc<[u8]> = bytes.into();
        let unit = stride * 2;
        let whole = bytes.len() / unit * unit;
        let interleaved: Arc<[u8]> = if whole == bytes.len() {
            bytes
        } else {
            Arc::from(&bytes[..whole])
        };

        let mut left = Vec::with_capacity(whole / 2);
        let mut right = Vec::with_capacity(whole / 2);
        for pair in interleaved.chunks_exact(unit) {
            let (l, r) = pair.split_at(stride);
            left.extend_from_slice(l);
            right.extend_from_slice(r);
        }

        Ok(Self {
            left: MonoFrame::new(left, stride, capacity)?,
            right: MonoFrame::new(right, stride, capacity)?,
            interleaved,
        })
    }

    /// Same bytes, decoded with a different 8-bit convention.
    pub fn with_eight_bit_encoding(self, encoding: EightBitEncoding) -> Self {
        Self {
            interleaved: self.interleaved,
            left: self.left.with_eight_bit_encoding(encoding),
            right: self.right.with_eight_bit_encoding(encoding),
        }
    }

    pub fn left_channel(&self) -> &MonoFrame {
        &self.left
    }

    pub fn right_channel(&self) -> &MonoFrame {
        &self.right
    }

    /// Decode the `(left, right)` pair at `index`.
    pub fn get(&self, index: usize) -> PcmResult<(i32, i32)> {
        Ok((self.left.get(index)?, self.right.get(index)?))
    }

    /// Interleaved bytes exactly as they were read.
    pub fn bytes(&self) -> &[u8] {
        &self.interleaved
    }

    pub fn sample_count(&self) -> usize {
        self.left.sample_count()
    }

    pub fn sample_byte_stride(&self) -> usize {
        self.left.sample_byte_stride()
    }

    pub fn sample_capacity(&self) -> usize {
        self.left.sample_capacity()
    }

    pub fn channel_count(&self) -> u16 {
        2
    }

    pub fn is_empty(&self) -> bool {
        self.sample_count() == 0
    }
}

/// One read's worth of samples in either channel layout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Frame {
    Mono(MonoFrame),
    Stereo(StereoFrame),
}

impl Frame {
    /// Raw payload bytes, interleaved for stereo.
    pub fn bytes(&self) -> &[u8] {
        match self {
            Frame::Mono(frame) => frame.bytes(),
            Frame::Stereo(frame) => frame.bytes(),
        }
    }

    /// Samples per channel.
    pub fn sample_count(&self) -> usize {
        match self {
            Frame::Mono(frame) => frame.sample_count(),
            Frame::Stereo(frame) => frame.sample_count(),
        }
    }

    pub fn sample_byte_stride(&self) -> usize {
        match self {
            Frame::Mono(frame) => frame.sample_byte_stride(),
            Frame::Stereo(frame) => frame.sample_byte_stride(),
        }
    }

    pub fn sample_capacity(&self) -> usize {
        match self {
            Frame::Mono(frame) => frame.sample_capacity(),
            Frame::Stereo(frame) => frame.sample_capacity(),
        }
    }

    pub fn channel_count(&self) -> u16 {
        match self {
            Frame::Mono(_) => 1,
            Frame::Stereo(_) => 2,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.sample_count() == 0
    }

    pub fn as_mono(&self) -> Option<&MonoFrame> {
        match self {
            Frame::Mono(frame) => Some(frame),
            Frame::Stereo(_) => None,
        }
    }

    pub fn as_stereo(&self) -> Option<&StereoFrame> {
        match self {
            Frame::Stereo(frame) => Some(frame),
            Frame::Mono(_) => None,
        }
    }
}

impl From<MonoFrame> for Frame {
    fn from(frame: MonoFrame) -> Self {
        Frame::Mono(frame)
    }
}

impl From<StereoFrame> for Frame {
    fn from(frame: StereoFrame) -> Self {
        Frame::Stereo(frame)
    }
}
