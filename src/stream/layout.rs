use crate::error::{PcmError, PcmResult};

/// Channel arrangement a [`super::WavStream`] decodes, chosen once from the header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChannelLayout {
    Mono,
    Stereo,
}

impl ChannelLayout {
    /// Map a header channel count to a layout; anything but 1 or 2 is unsupported.
    pub fn from_channel_count(channels: u16) -> PcmResult<Self> {
        match channels {
            1 => Ok(Self::Mono),
            2 => Ok(Self::Stereo),
            other => Err(PcmError::unsupported_channels(other)),
        }
    }

    pub fn channel_count(self) -> u16 {
        match self {
            Self::Mono => 1,
            Self::Stereo => 2,
        }
    }
}
