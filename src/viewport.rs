//! Planning which part of a stream a waveform view shows and loading its bars.
//!
//! A file is split into `total_frames` equal time slices; a view shows
//! `visible_frames` of them starting at a slice chosen from the playhead.

use std::time::Duration;

use tracing::debug;

use crate::envelope::{Envelope, compute_frame_envelope};
use crate::error::PcmResult;
use crate::header::WavHeader;
use crate::stream::WavStream;

/// Share of a frame that one bar covers.
const BAR_FRACTION: f64 = 0.10;

/// Frame and bar sizing for a waveform view over one file.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewportPlan {
    total_frames: usize,
    visible_frames: usize,
    duration: Duration,
    frame_length: Duration,
    samples_per_frame: usize,
    samples_per_bar: usize,
}

impl ViewportPlan {
    pub fn new(
        total_frames: usize,
        visible_frames: usize,
        duration: Duration,
        sample_rate: u32,
    ) -> Self {
        let total_frames = total_frames.max(1);
        let frame_length = duration / u32::try_from(total_frames).unwrap_or(u32::MAX);
        let samples_per_frame =
            (frame_length.as_secs_f64() * f64::from(sample_rate)).round() as usize;
        let samples_per_bar = ((samples_per_frame as f64 * BAR_FRACTION).round() as usize).max(1);
        Self {
            total_frames,
            visible_frames: visible_frames.min(total_frames),
            duration,
            frame_length,
            samples_per_frame,
            samples_per_bar,
        }
    }

    /// Plan from a header's duration and sample rate.
    pub fn for_header(header: &WavHeader, total_frames: usize, visible_frames: usize) -> Self {
        Self::new(
            total_frames,
            visible_frames,
            header.duration(),
            header.sample_rate(),
        )
    }

    pub fn total_frames(&self) -> usize {
        self.total_frames
    }

    pub fn visible_frames(&self) -> usize {
        self.visible_frames
    }

    pub fn frame_length(&self) -> Duration {
        self.frame_length
    }

    pub fn samples_per_frame(&self) -> usize {
        self.samples_per_frame
    }

    pub fn samples_per_bar(&self) -> usize {
        self.samples_per_bar
    }

    /// First visible frame for a playhead fraction in `[0, 1]`.
    pub fn start_frame(&self, playhead: f64) -> usize {
        let playhead = if playhead.is_nan() {
            0.0
        } else {
            playhead.clamp(0.0, 1.0)
        };
        let scrollable = self.total_frames - self.visible_frames;
        (playhead * scrollable as f64).round() as usize
    }

    /// Stream progress fraction at which the first visible frame begins.
    pub fn stream_progress(&self, playhead: f64) -> f64 {
        if self.duration.is_zero() {
            return 0.0;
        }
        let start = self.frame_length * u32::try_from(self.start_frame(playhead)).unwrap_or(u32::MAX);
        (start.as_secs_f64() / self.duration.as_secs_f64()).clamp(0.0, 1.0)
    }
}

/// Seek `stream` to the view for `playhead` and compute one envelope per visible frame.
///
/// Stops early at end-of-stream. The stream must be open.
pub fn load_visible(
    stream: &mut WavStream,
    plan: &ViewportPlan,
    playhead: f64,
) -> PcmResult<Vec<Envelope>> {
    stream.set_progress(plan.stream_progress(playhead))?;
    let mut envelopes = Vec::with_capacity(plan.visible_frames());
    if plan.samples_per_frame() == 0 {
        return Ok(envelopes);
    }
    for frame in stream.frames(plan.samples_per_frame()).take(plan.visible_frames()) {
        envelopes.push(compute_frame_envelope(&frame?, plan.samples_per_bar())?);
    }
    debug!(
        "Loaded {} of {} visible frames at playhead {playhead:.3}",
        envelopes.len(),
        plan.visible_frames()
    );
    Ok(envelopes)
}
