//! Seekable, windowed reading of PCM payloads from WAV files on disk.
//!
//! A [`WavStream`] parses its header eagerly, then reads successive [`Frame`]s
//! from a cursor that always sits on a whole multi-channel sample boundary.

mod frames;
mod layout;


use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};

use tracing::{debug, trace, warn};

use crate::error::{PcmError, PcmResult};
use crate::frame::{Frame, MonoFrame, StereoFrame};
use crate::header::{HEADER_SIZE, WavHeader};
use crate::sample::EightBitEncoding;

pub use frames::FrameIter;
pub use layout::ChannelLayout;

/// Samples per channel read by [`WavStream::read_default_frame`] unless configured otherwise.
pub const DEFAULT_SAMPLES_PER_FRAME: usize = 44_100;

/// Windowed reader over one WAV file.
///
/// The stream starts closed; [`WavStream::open`] acquires the file handle and
/// [`WavStream::close`] releases it. Reads and seeks on a closed stream fail with
/// [`PcmError::FileStream`]. One instance serves one consumer at a time.
#[derive(Debug)]
pub struct WavStream {
    path: PathBuf,
    header: WavHeader,
    layout: ChannelLayout,
    eight_bit: EightBitEncoding,
    samples_per_frame: usize,
    handle: Option<File>,
    byte_offset: u64,
    payload_end: u64,
}

impl WavStream {
    /// Read and validate the header of `path` without opening the stream.
    pub fn new(path: impl Into<PathBuf>) -> PcmResult<Self> {
        let path = path.into();
        let header = read_header(&path)?;
        Self::with_header(path, header)
    }

    /// Build a stream over `path` from an already parsed header.
    ///
    /// Fails when the header is invalid or declares an unsupported channel count.
    pub fn with_header(path: impl Into<PathBuf>, header: WavHeader) -> PcmResult<Self> {
        header.validate()?;
        let layout = ChannelLayout::from_channel_count(header.channel_count())?;
        let header_end = header.header_size() as u64;
        Ok(Self {
            path: path.into(),
            header,
            layout,
            eight_bit: EightBitEncoding::default(),
            samples_per_frame: DEFAULT_SAMPLES_PER_FRAME,
            handle: None,
            byte_offset: header_end,
            payload_end: header_end + u64::from(header.data_size()),
        })
    }

    /// Decode 8-bit payloads of produced frames with `encoding`.
    pub fn with_eight_bit_encoding(mut self, encoding: EightBitEncoding) -> Self {
        self.eight_bit = encoding;
        self
    }

    /// Frame size used by [`WavStream::read_default_frame`] and [`WavStream::default_frames`].
    pub fn with_samples_per_frame(mut self, samples_per_frame: usize) -> Self {
        self.samples_per_frame = samples_per_frame.max(1);
        self
    }

    pub fn samples_per_frame(&self) -> usize {
        self.samples_per_frame
    }

    /// Open the underlying file and rewind the cursor to the first sample.
    pub fn open(&mut self) -> PcmResult<()> {
        let metadata = std::fs::metadata(&self.path).map_err(|err| {
            PcmError::file_stream(&self.path, format!("Cannot open file: {err}"))
        })?;
        if !metadata.is_file() {
            return Err(PcmError::file_stream(&self.path, "Not a regular file"));
        }
        let file = File::open(&self.path).map_err(|err| {
            PcmError::file_stream(&self.path, format!("Cannot open file: {err}"))
        })?;

        let header_end = self.header_end();
        let declared = u64::from(self.header.data_size());
        let available = metadata.len().saturating_sub(header_end);
        if available < declared {
            warn!(
                "Header of {} declares {declared} payload bytes but only {available} are present",
                self.path.display()
            );
        }
        self.payload_end = header_end + declared.min(available);
        self.byte_offset = header_end;
        self.handle = Some(file);
        debug!("Opened {} ({:?})", self.path.display(), self.layout);
        Ok(())
    }

    /// Release the file handle and reset the cursor. Closing twice is harmless.
    pub fn close(&mut self) {
        if self.handle.take().is_some() {
            debug!("Closed {}", self.path.display());
        }
        self.byte_offset = self.header_end();
    }

    pub fn is_open(&self) -> bool {
        self.handle.is_some()
    }

    /// Header parsed at construction; available while closed.
    pub fn descriptor(&self) -> &WavHeader {
        &self.header
    }

    pub fn layout(&self) -> ChannelLayout {
        self.layout
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Absolute byte offset of the next read.
    pub fn position(&self) -> u64 {
        self.byte_offset
    }

    /// Fraction of the payload already behind the cursor.
    pub fn progress(&self) -> f64 {
        let header_end = self.header_end();
        let payload = self.payload_end.saturating_sub(header_end);
        if payload == 0 {
            return 0.0;
        }
        let consumed = self.byte_offset.saturating_sub(header_end).min(payload);
        consumed as f64 / payload as f64
    }

    /// Read up to `sample_count` samples per channel from the cursor.
    ///
    /// Returns `Ok(None)` once the payload is exhausted. The returned frame spans
    /// exactly the bytes read, which is fewer than requested near the end.
    pub fn read_next_frame(&mut self, sample_count: usize) -> PcmResult<Option<Frame>> {
        let block_align = u64::from(self.header.block_align());
        let offset = self.byte_offset;
        let remaining = self.payload_end.saturating_sub(offset);
        let requested = (sample_count as u64).saturating_mul(block_align);
        let span = requested.min(remaining) / block_align * block_align;

        let path = self.path.clone();
        let handle = self.handle_mut()?;
        if span == 0 {
            return Ok(None);
        }

        let read_error = |source: std::io::Error| {
            PcmError::io(
                format!("Error reading frame from '{}'", path.display()),
                source,
            )
        };
        handle.seek(SeekFrom::Start(offset)).map_err(read_error)?;
        let mut buffer = Vec::with_capacity(span as usize);
        handle
            .by_ref()
            .take(span)
            .read_to_end(&mut buffer)
            .map_err(read_error)?;

        let aligned = buffer.len() / block_align as usize * block_align as usize;
        if aligned == 0 {
            return Ok(None);
        }
        buffer.truncate(aligned);
        self.byte_offset = offset + aligned as u64;
        trace!(
            "Read {aligned} bytes at offset {offset} from {}",
            self.path.display()
        );

        let stride = self.header.bytes_per_sample();
        let frame = match self.layout {
            ChannelLayout::Mono => Frame::Mono(
                MonoFrame::new(buffer, stride, sample_count)?
                    .with_eight_bit_encoding(self.eight_bit),
            ),
            ChannelLayout::Stereo => Frame::Stereo(
                StereoFrame::from_interleaved(buffer, stride, sample_count)?
                    .with_eight_bit_encoding(self.eight_bit),
            ),
        };
        Ok(Some(frame))
    }

    /// Read the next frame at the configured frame size.
    pub fn read_default_frame(&mut self) -> PcmResult<Option<Frame>> {
        self.read_next_frame(self.samples_per_frame)
    }

    /// Move the cursor to `fraction` of the payload, floored to a whole sample.
    ///
    /// `fraction` is clamped to `[0, 1]`; NaN is treated as 0. Passing a value
    /// returned by [`WavStream::progress`] lands on the same offset. Any state a
    /// caller accumulated from earlier frames is stale after this call.
    pub fn set_progress(&mut self, fraction: f64) -> PcmResult<()> {
        let fraction = if fraction.is_nan() {
            0.0
        } else {
            fraction.clamp(0.0, 1.0)
        };
        let header_end = self.header_end();
        let block_align = u64::from(self.header.block_align());
        let payload = self.payload_end.saturating_sub(header_end);
        let mut consumed =
            (fraction * payload as f64 / block_align as f64).floor() as u64 * block_align;
        // Rounding in the product can leave us one sample short of an offset
        // whose progress is exactly `fraction`.
        let next = consumed + block_align;
        if next <= payload && next as f64 / payload as f64 <= fraction {
            consumed = next;
        }
        let target = (header_end + consumed).min(self.payload_end);

        let path = self.path.clone();
        let handle = self.handle_mut()?;
        handle.seek(SeekFrom::Start(target)).map_err(|source| {
            PcmError::io(format!("Error seeking in '{}'", path.display()), source)
        })?;
        self.byte_offset = target;
        debug!(
            "Seeked {} to offset {target} (progress {fraction:.4})",
            self.path.display()
        );
        Ok(())
    }

    /// Iterate frames of `sample_count` samples from the current cursor.
    pub fn frames(&mut self, sample_count: usize) -> FrameIter<'_> {
        FrameIter::new(self, sample_count)
    }

    /// Iterate frames at the configured frame size.
    pub fn default_frames(&mut self) -> FrameIter<'_> {
        let sample_count = self.samples_per_frame;
        FrameIter::new(self, sample_count)
    }

    /// Open the stream, run `action`, and close it again whatever the outcome.
    pub fn with_open<T>(
        &mut self,
        action: impl FnOnce(&mut Self) -> PcmResult<T>,
    ) -> PcmResult<T> {
        self.open()?;
        let result = action(self);
        self.close();
        result
    }

    fn header_end(&self) -> u64 {
        self.header.header_size() as u64
    }

    fn handle_mut(&mut self) -> PcmResult<&mut File> {
        match self.handle.as_mut() {
            Some(handle) => Ok(handle),
            None => Err(PcmError::file_stream(&self.path, "Stream is not open")),
        }
    }
}

/// Read the first header bytes of `path`, then parse and validate them.
pub(crate) fn read_header(path: &Path) -> PcmResult<WavHeader> {
    let file = File::open(path)
        .map_err(|err| PcmError::file_stream(path, format!("Cannot open file: {err}")))?;
    let mut bytes = Vec::with_capacity(HEADER_SIZE);
    file.take(HEADER_SIZE as u64)
        .read_to_end(&mut bytes)
        .map_err(|source| {
            PcmError::io(format!("Error reading header of '{}'", path.display()), source)
        })?;
    if bytes.len() < HEADER_SIZE {
        return Err(PcmError::invalid_header(
            "File too small to contain a complete WAV header",
        ));
    }
    let header = WavHeader::parse(&bytes)?;
    header.validate()?;
    Ok(header)
}
