//! Streaming PCM WAV reader with frame windowing and RMS envelopes for waveform views.

/// Application directory helpers for config and logs.
pub mod app_dirs;
/// Persisted stream and envelope settings.
pub mod config;
/// RMS envelope computation over decoded frames.
pub mod envelope;
/// Error type shared by the reading and writing paths.
pub mod error;
/// Validated stream construction.
pub mod factory;
/// Mono and stereo frames of raw PCM bytes.
pub mod frame;
/// Canonical 44-byte WAV header parsing and synthesis.
pub mod header;
/// Tracing subscriber setup.
pub mod logging;
/// Little-endian PCM sample decoding.
pub mod sample;
/// Seekable windowed reading of WAV payloads.
pub mod stream;
/// Waveform view planning on top of a stream.
pub mod viewport;
/// Canonical PCM WAV output.
pub mod writer;

pub use config::StreamSettings;
pub use envelope::{Envelope, NormalizedEnvelope, compute_envelope, compute_frame_envelope};
pub use error::{PcmError, PcmResult};
pub use factory::StreamFactory;
pub use frame::{Frame, MonoFrame, StereoFrame};
pub use header::{HEADER_SIZE, WavHeader};
pub use sample::{EightBitEncoding, decode_sample};
pub use stream::{ChannelLayout, FrameIter, WavStream};
pub use viewport::{ViewportPlan, load_visible};
pub use writer::WavWriter;
