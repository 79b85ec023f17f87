//! Writing canonical PCM WAV files frame by frame.

use std::fs::File;
use std::io::{BufWriter, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{PcmError, PcmResult};
use crate::frame::Frame;
use crate::header::{HEADER_SIZE, WavHeader};

/// Appends PCM payload behind a synthesized 44-byte header.
///
/// The header's size fields are patched by [`WavWriter::finalize`]; a writer
/// dropped without finalizing leaves a file whose header declares no payload.
pub struct WavWriter {
    path: PathBuf,
    out: BufWriter<File>,
    header: WavHeader,
    data_len: u64,
}

impl WavWriter {
    /// Create (or truncate) `path` and write a header for the given layout.
    pub fn create(
        path: impl AsRef<Path>,
        channels: u16,
        sample_rate: u32,
        bits_per_sample: u16,
    ) -> PcmResult<Self> {
        let path = path.as_ref().to_path_buf();
        let header = WavHeader::synthesize(channels, sample_rate, bits_per_sample, 0)?;
        let file = File::create(&path).map_err(|err| {
            PcmError::file_stream(&path, format!("Cannot create file: {err}"))
        })?;
        let mut out = BufWriter::new(file);
        out.write_all(&header.to_bytes())
            .map_err(|source| write_error(&path, source))?;
        Ok(Self {
            path,
            out,
            header,
            data_len: 0,
        })
    }

    pub fn header(&self) -> &WavHeader {
        &self.header
    }

    /// Payload bytes written so far.
    pub fn data_len(&self) -> u64 {
        self.data_len
    }

    /// Append the raw bytes of `frame`; its layout must match the header.
    pub fn append_frame(&mut self, frame: &Frame) -> PcmResult<()> {
        if frame.channel_count() != self.header.channel_count()
            || frame.sample_byte_stride() != self.header.bytes_per_sample()
        {
            return Err(PcmError::invalid_header(format!(
                "Frame layout ({} channels, {} bytes per sample) does not match writer ({} channels, {} bytes per sample)",
                frame.channel_count(),
                frame.sample_byte_stride(),
                self.header.channel_count(),
                self.header.bytes_per_sample()
            )));
        }
        self.append_payload(frame.bytes())
    }

    /// Append every frame in order, stopping at the first failure.
    pub fn append_frames<'a>(&mut self, frames: impl IntoIterator<Item = &'a Frame>) -> PcmResult<()> {
        for frame in frames {
            self.append_frame(frame)?;
        }
        Ok(())
    }

    /// Encode interleaved sample values at the header's bit depth and append them.
    ///
    /// Values outside the representable range are clamped. A trailing partial
    /// multi-channel sample is rejected.
    pub fn append_samples(&mut self, samples: &[i32]) -> PcmResult<()> {
        let channels = usize::from(self.header.channel_count());
        if samples.len() % channels != 0 {
            return Err(PcmError::InvalidIterator {
                message: format!(
                    "{} samples do not fill whole {channels}-channel frames",
                    samples.len()
                ),
            });
        }
        let bits = self.header.bit_depth();
        let mut bytes = Vec::with_capacity(samples.len() * self.header.bytes_per_sample());
        for &sample in samples {
            encode_sample(sample, bits, &mut bytes)?;
        }
        self.append_payload(&bytes)
    }

    /// Drop everything appended so far, keeping the header.
    pub fn clear_all(&mut self) -> PcmResult<()> {
        self.out
            .flush()
            .map_err(|source| write_error(&self.path, source))?;
        let file = self.out.get_mut();
        file.set_len(HEADER_SIZE as u64)
            .and_then(|_| file.seek(SeekFrom::End(0)).map(|_| ()))
            .map_err(|source| write_error(&self.path, source))?;
        self.data_len = 0;
        Ok(())
    }

    /// Patch the header with the final payload size and flush to disk.
    pub fn finalize(mut self) -> PcmResult<WavHeader> {
        let data_size = u32::try_from(self.data_len)
            .map_err(|_| PcmError::invalid_header("Payload exceeds the 4 GiB WAV limit"))?;
        let header = self.header.with_data_size(data_size);
        let path = self.path.clone();
        let io = |source: std::io::Error| write_error(&path, source);
        self.out.seek(SeekFrom::Start(0)).map_err(io)?;
        self.out.write_all(&header.to_bytes()).map_err(io)?;
        self.out.flush().map_err(io)?;
        self.out.get_ref().sync_all().map_err(io)?;
        debug!(
            "Finalized {} with {data_size} payload bytes",
            self.path.display()
        );
        Ok(header)
    }

    fn append_payload(&mut self, bytes: &[u8]) -> PcmResult<()> {
        let next = self.data_len + bytes.len() as u64;
        if next > u64::from(u32::MAX) - (HEADER_SIZE as u64 - 8) {
            return Err(PcmError::invalid_header("Payload exceeds the 4 GiB WAV limit"));
        }
        self.out
            .write_all(bytes)
            .map_err(|source| write_error(&self.path, source))?;
        self.data_len = next;
        Ok(())
    }
}

fn write_error(path: &Path, source: std::io::Error) -> PcmError {
    PcmError::io(format!("Error writing '{}'", path.display()), source)
}

fn encode_sample(sample: i32, bits: u16, out: &mut Vec<u8>) -> PcmResult<()> {
    match bits {
        8 => out.push((sample.clamp(-128, 127) + 128) as u8),
        16 => out.extend_from_slice(&(sample.clamp(-32_768, 32_767) as i16).to_le_bytes()),
        24 => {
            let bytes = sample.clamp(-8_388_608, 8_388_607).to_le_bytes();
            out.extend_from_slice(&bytes[..3]);
        }
        32 => out.extend_from_slice(&sample.to_le_bytes()),
        other => {
            return Err(PcmError::InvalidBitDepth {
                bits: u32::from(other),
            });
        }
    }
    Ok(())
}
