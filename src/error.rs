use std::path::PathBuf;
use thiserror::Error;

/// Result alias used across the PCM stream core.
pub type PcmResult<T> = Result<T, PcmError>;

/// Failures raised while parsing, reading or decoding PCM WAV data.
///
/// Every variant is terminal for the operation that produced it; nothing in the
/// core retries on the caller's behalf.
#[derive(Debug, Error)]
pub enum PcmError {
    /// Header bytes were too short, malformed or internally inconsistent.
    #[error("Invalid wav header: {message}")]
    InvalidHeader { message: String },
    /// The source file is missing, unreadable or not a regular file, or the
    /// stream was used while closed.
    #[error("Cannot stream {path}: {message}")]
    FileStream { path: PathBuf, message: String },
    /// A decode was requested for a sample width the decoder does not handle.
    #[error("Unsupported bit depth: {bits} bits")]
    InvalidBitDepth { bits: u32 },
    /// Index or byte range outside a frame's bounds.
    #[error("Invalid frame access: {message}")]
    InvalidIterator { message: String },
    /// Any other fault, with the lower-level I/O cause when there is one.
    #[error("{context}")]
    Unknown {
        context: String,
        #[source]
        source: Option<std::io::Error>,
    },
}

impl PcmError {
    pub(crate) fn invalid_header(message: impl Into<String>) -> Self {
        Self::InvalidHeader {
            message: message.into(),
        }
    }

    pub(crate) fn file_stream(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::FileStream {
            path: path.into(),
            message: message.into(),
        }
    }

    pub(crate) fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Unknown {
            context: context.into(),
            source: Some(source),
        }
    }

    pub(crate) fn unsupported_channels(channels: u16) -> Self {
        Self::Unknown {
            context: format!("Channel count {channels} not supported"),
            source: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn io_faults_keep_their_cause() {
        let err = PcmError::io(
            "Error reading frame from 'a.wav'",
            std::io::Error::new(std::io::ErrorKind::UnexpectedEof, "short read"),
        );
        assert_eq!(err.to_string(), "Error reading frame from 'a.wav'");
        let cause = err.source().expect("io source");
        assert_eq!(cause.to_string(), "short read");
    }

    #[test]
    fn unsupported_layout_has_no_source() {
        let err = PcmError::unsupported_channels(6);
        assert!(matches!(err, PcmError::Unknown { source: None, .. }));
        assert_eq!(err.to_string(), "Channel count 6 not supported");
    }
}
