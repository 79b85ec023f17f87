use super::WavStream;
use crate::error::PcmResult;
use crate::frame::Frame;

/// Successive frames read from a stream until end-of-stream or the first error.
pub struct FrameIter<'a> {
    stream: &'a mut WavStream,
    sample_count: usize,
    done: bool,
}

impl<'a> FrameIter<'a> {
    pub(super) fn new(stream: &'a mut WavStream, sample_count: usize) -> Self {
        Self {
            stream,
            sample_count,
            done: false,
        }
    }
}

impl Iterator for FrameIter<'_> {
    type Item = PcmResult<Frame>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.stream.read_next_frame(self.sample_count) {
            Ok(Some(frame)) => Some(Ok(frame)),
            Ok(None) => {
                self.done = true;
                None
            }
            Err(err) => {
                self.done = true;
                Some(Err(err))
            }
        }
    }
}

impl std::iter::FusedIterator for FrameIter<'_> {}
