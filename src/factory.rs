//! Admission point that turns a candidate file into a validated [`WavStream`].

use std::path::Path;

use tracing::debug;

use crate::config::StreamSettings;
use crate::envelope::{Envelope, compute_frame_envelope};
use crate::error::{PcmError, PcmResult};
use crate::frame::Frame;
use crate::stream::{WavStream, read_header};

/// Builds readers for WAV files, picking the channel layout from the header.
///
/// Construct one per consumer (or share a reference); it holds no mutable state.
#[derive(Debug, Clone, Default)]
pub struct StreamFactory {
    settings: StreamSettings,
}

impl StreamFactory {
    pub fn new(settings: StreamSettings) -> Self {
        Self {
            settings: settings.normalized(),
        }
    }

    pub fn settings(&self) -> &StreamSettings {
        &self.settings
    }

    /// Validate `path` and its header, then return a closed reader for it.
    ///
    /// Fails with [`PcmError::FileStream`] for missing, non-regular or non-WAV
    /// paths, [`PcmError::InvalidHeader`] for short or inconsistent headers, and
    /// [`PcmError::Unknown`] for channel counts other than 1 or 2.
    pub fn provide_stream(&self, path: &Path) -> PcmResult<WavStream> {
        if !path.exists() {
            return Err(PcmError::file_stream(path, "File does not exist"));
        }
        if !path.is_file() {
            return Err(PcmError::file_stream(path, "Path is not a file"));
        }
        if !self.settings.accepts_extension(path) {
            return Err(PcmError::file_stream(path, "File is not a WAV file"));
        }
        let header = read_header(path)?;
        let stream = WavStream::with_header(path, header)?
            .with_eight_bit_encoding(self.settings.eight_bit_encoding)
            .with_samples_per_frame(self.settings.samples_per_frame);
        debug!(
            "Provided {:?} stream for {} ({} Hz, {} bit)",
            stream.layout(),
            path.display(),
            header.sample_rate(),
            header.bit_depth()
        );
        Ok(stream)
    }

    /// RMS bars of `frame` using the configured envelope window.
    pub fn envelope(&self, frame: &Frame) -> PcmResult<Envelope> {
        compute_frame_envelope(frame, self.settings.envelope_window)
    }
}
