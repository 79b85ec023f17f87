//! RMS envelope reduction used to turn frames into waveform bars.

use crate::error::PcmResult;
use crate::frame::{Frame, MonoFrame};
use crate::sample::full_scale;

/// Samples per RMS bar when no window is configured: a tenth of a default frame.
pub const DEFAULT_WINDOW_SIZE: usize = 4_410;

/// Per-channel RMS bars computed from one frame.
#[derive(Debug, Clone, PartialEq)]
pub enum Envelope {
    Mono(Vec<f64>),
    Stereo { left: Vec<f64>, right: Vec<f64> },
}

impl Envelope {
    /// Bars per channel.
    pub fn bar_count(&self) -> usize {
        match self {
            Envelope::Mono(bars) => bars.len(),
            Envelope::Stereo { left, .. } => left.len(),
        }
    }

    /// Scale every bar into `[0, 1]` relative to the full scale of `bit_depth`.
    pub fn normalized(&self, bit_depth: u16) -> NormalizedEnvelope {
        match self {
            Envelope::Mono(bars) => NormalizedEnvelope::Mono(normalize(bars, bit_depth)),
            Envelope::Stereo { left, right } => NormalizedEnvelope::Stereo {
                left: normalize(left, bit_depth),
                right: normalize(right, bit_depth),
            },
        }
    }
}

/// [`Envelope`] bars scaled into `[0, 1]` for drawing.
#[derive(Debug, Clone, PartialEq)]
pub enum NormalizedEnvelope {
    Mono(Vec<f32>),
    Stereo { left: Vec<f32>, right: Vec<f32> },
}

/// Reduce `frame` to `sqrt(mean(sample^2))` over consecutive windows of `window_size` samples.
///
/// The last window may be shorter. A zero window size yields no bars.
pub fn compute_envelope(frame: &MonoFrame, window_size: usize) -> PcmResult<Vec<f64>> {
    let count = frame.sample_count();
    if window_size == 0 || count == 0 {
        return Ok(Vec::new());
    }
    let mut bars = Vec::with_capacity(count.div_ceil(window_size));
    let mut sum_squares = 0.0_f64;
    let mut in_window = 0usize;
    for sample in frame.samples() {
        let value = f64::from(sample?);
        sum_squares += value * value;
        in_window += 1;
        if in_window == window_size {
            bars.push(window_rms(sum_squares, in_window));
            sum_squares = 0.0;
            in_window = 0;
        }
    }
    if in_window > 0 {
        bars.push(window_rms(sum_squares, in_window));
    }
    Ok(bars)
}

/// Compute bars for every channel of `frame`.
pub fn compute_frame_envelope(frame: &Frame, window_size: usize) -> PcmResult<Envelope> {
    match frame {
        Frame::Mono(mono) => Ok(Envelope::Mono(compute_envelope(mono, window_size)?)),
        Frame::Stereo(stereo) => Ok(Envelope::Stereo {
            left: compute_envelope(stereo.left_channel(), window_size)?,
            right: compute_envelope(stereo.right_channel(), window_size)?,
        }),
    }
}

/// Scale RMS bars by the full scale of `bit_depth`, clamped to `[0, 1]`.
pub fn normalize(bars: &[f64], bit_depth: u16) -> Vec<f32> {
    let scale = full_scale(bit_depth);
    bars.iter()
        .map(|bar| (bar / scale).clamp(0.0, 1.0) as f32)
        .collect()
}

fn window_rms(sum_squares: f64, len: usize) -> f64 {
    if len == 0 {
        return 0.0;
    }
    (sum_squares / len as f64).sqrt()
}
