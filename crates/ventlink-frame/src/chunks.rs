use heapless::Vec;

use crate::error::ChunkError;

/// Progress reported by [`ChunkSplitter::input`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChunkInput {
    /// The byte was buffered; no complete chunk yet.
    Pending,
    /// A delimiter completed a chunk; call [`ChunkSplitter::output`].
    Ready,
}

/// Result of [`ChunkSplitter::output`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChunkOutput {
    /// A complete chunk was moved into the output buffer.
    Available,
    /// No complete chunk has been received yet.
    Waiting,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Filling,
    Ready,
    // Too long; bytes are dropped until the next delimiter.
    Overflowed,
    // An overflowed chunk was closed by a delimiter and not yet reported.
    Discarded,
}

/// Splits a byte stream into delimiter-terminated chunks.
///
/// At most one unread chunk is held. Bytes arriving after a chunk became
/// ready, but before it was taken with [`output`](Self::output), start a new
/// chunk and the old one is dropped; [`overwritten`](Self::overwritten)
/// reports when that happened.
#[derive(Debug, Clone)]
pub struct ChunkSplitter<const N: usize> {
    buffer: Vec<u8, N>,
    delimiter: u8,
    include_delimiter: bool,
    state: State,
    overwritten: bool,
}

impl<const N: usize> ChunkSplitter<N> {
    /// Create a splitter that drops the delimiter from emitted chunks.
    pub const fn new(delimiter: u8) -> Self {
        Self::with_delimiter_included(delimiter, false)
    }

    /// Create a splitter, choosing whether emitted chunks end with the delimiter.
    pub const fn with_delimiter_included(delimiter: u8, include_delimiter: bool) -> Self {
        Self {
            buffer: Vec::new(),
            delimiter,
            include_delimiter,
            state: State::Filling,
            overwritten: false,
        }
    }

    /// Feed one byte.
    pub fn input(&mut self, byte: u8) -> Result<ChunkInput, ChunkError> {
        self.overwritten = false;
        match self.state {
            State::Filling => {}
            State::Ready => {
                tracing::trace!(len = self.buffer.len(), "unread chunk overwritten");
                self.buffer.clear();
                self.state = State::Filling;
                self.overwritten = true;
            }
            State::Discarded => {
                self.buffer.clear();
                self.state = State::Filling;
            }
            State::Overflowed => {
                if byte == self.delimiter {
                    self.state = State::Discarded;
                }
                return Err(ChunkError::InvalidLength { capacity: N });
            }
        }

        if byte == self.delimiter {
            if self.include_delimiter && self.buffer.push(byte).is_err() {
                self.state = State::Discarded;
                return Err(ChunkError::InvalidLength { capacity: N });
            }
            self.state = State::Ready;
            return Ok(ChunkInput::Ready);
        }

        if self.buffer.push(byte).is_err() {
            self.state = State::Overflowed;
            return Err(ChunkError::InvalidLength { capacity: N });
        }
        Ok(ChunkInput::Pending)
    }

    /// Whether the most recent [`input`](Self::input) dropped an unread chunk.
    pub fn overwritten(&self) -> bool {
        self.overwritten
    }

    /// Take the completed chunk, replacing the contents of `output`.
    ///
    /// An over-long chunk is reported as [`ChunkError::InvalidLength`]; once
    /// its closing delimiter has been seen the splitter starts over empty.
    pub fn output(&mut self, output: &mut Vec<u8, N>) -> Result<ChunkOutput, ChunkError> {
        match self.state {
            State::Filling => Ok(ChunkOutput::Waiting),
            State::Overflowed => Err(ChunkError::InvalidLength { capacity: N }),
            State::Discarded => {
                self.buffer.clear();
                self.state = State::Filling;
                Err(ChunkError::InvalidLength { capacity: N })
            }
            State::Ready => {
                core::mem::swap(output, &mut self.buffer);
                self.buffer.clear();
                self.state = State::Filling;
                Ok(ChunkOutput::Available)
            }
        }
    }
}

impl<const N: usize> Default for ChunkSplitter<N> {
    fn default() -> Self {
        Self::new(0x00)
    }
}

/// Terminates a chunk with the delimiter, in place.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkMerger {
    delimiter: u8,
}

impl ChunkMerger {
    pub const fn new(delimiter: u8) -> Self {
        Self { delimiter }
    }

    /// Append the delimiter; fails when the buffer is already full.
    pub fn transform<const N: usize>(&self, buffer: &mut Vec<u8, N>) -> Result<(), ChunkError> {
        buffer
            .push(self.delimiter)
            .map_err(|_| ChunkError::InvalidLength { capacity: N })
    }
}

impl Default for ChunkMerger {
    fn default() -> Self {
        Self::new(0x00)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn feed<const N: usize>(splitter: &mut ChunkSplitter<N>, bytes: &[u8]) {
        for &byte in bytes {
            assert_eq!(splitter.input(byte), Ok(ChunkInput::Pending));
        }
    }

    #[test]
    fn test_waiting_until_delimiter() {
        let mut splitter = ChunkSplitter::<16>::default();
        let mut out = Vec::new();
        assert_eq!(splitter.output(&mut out), Ok(ChunkOutput::Waiting));

        feed(&mut splitter, b"\x01\x02\x03");
        assert_eq!(splitter.output(&mut out), Ok(ChunkOutput::Waiting));

        assert_eq!(splitter.input(0x00), Ok(ChunkInput::Ready));
        assert_eq!(splitter.output(&mut out), Ok(ChunkOutput::Available));
        assert_eq!(out.as_slice(), b"\x01\x02\x03");

        assert_eq!(splitter.output(&mut out), Ok(ChunkOutput::Waiting));
    }

    #[test]
    fn test_delimiter_included() {
        let mut splitter = ChunkSplitter::<16>::with_delimiter_included(0x00, true);
        let mut out = Vec::new();
        feed(&mut splitter, b"\x05\x06");
        assert_eq!(splitter.input(0x00), Ok(ChunkInput::Ready));
        splitter.output(&mut out).unwrap();
        assert_eq!(out.as_slice(), b"\x05\x06\x00");
    }

    #[test]
    fn test_custom_delimiter() {
        let mut splitter = ChunkSplitter::<16>::new(b'\n');
        let mut out = Vec::new();
        feed(&mut splitter, b"abc\x00");
        assert_eq!(splitter.input(b'\n'), Ok(ChunkInput::Ready));
        splitter.output(&mut out).unwrap();
        assert_eq!(out.as_slice(), b"abc\x00");
    }

    #[test]
    fn test_consecutive_chunks() {
        let mut splitter = ChunkSplitter::<16>::default();
        let mut out = Vec::new();

        feed(&mut splitter, b"\x01\x02");
        splitter.input(0x00).unwrap();
        splitter.output(&mut out).unwrap();
        assert_eq!(out.as_slice(), b"\x01\x02");

        feed(&mut splitter, b"\x03");
        assert!(!splitter.overwritten());
        splitter.input(0x00).unwrap();
        splitter.output(&mut out).unwrap();
        assert_eq!(out.as_slice(), b"\x03");
    }

    #[test]
    fn test_unread_chunk_is_overwritten() {
        let mut splitter = ChunkSplitter::<16>::default();
        let mut out = Vec::new();

        feed(&mut splitter, b"\x01\x02\x03");
        assert_eq!(splitter.input(0x00), Ok(ChunkInput::Ready));

        assert_eq!(splitter.input(0x04), Ok(ChunkInput::Pending));
        assert!(splitter.overwritten());
        assert_eq!(splitter.input(0x05), Ok(ChunkInput::Pending));
        assert!(!splitter.overwritten());
        assert_eq!(splitter.output(&mut out), Ok(ChunkOutput::Waiting));

        assert_eq!(splitter.input(0x00), Ok(ChunkInput::Ready));
        assert_eq!(splitter.output(&mut out), Ok(ChunkOutput::Available));
        assert_eq!(out.as_slice(), b"\x04\x05");
    }

    #[test]
    fn test_full_buffer_then_delimiter() {
        let mut splitter = ChunkSplitter::<4>::default();
        let mut out = Vec::new();
        feed(&mut splitter, b"\x01\x02\x03\x04");
        assert_eq!(splitter.input(0x00), Ok(ChunkInput::Ready));
        splitter.output(&mut out).unwrap();
        assert_eq!(out.as_slice(), b"\x01\x02\x03\x04");
    }

    #[test]
    fn test_full_buffer_with_included_delimiter_overflows() {
        let mut splitter = ChunkSplitter::<4>::with_delimiter_included(0x00, true);
        let mut out = Vec::new();
        feed(&mut splitter, b"\x01\x02\x03\x04");
        assert_eq!(
            splitter.input(0x00),
            Err(ChunkError::InvalidLength { capacity: 4 })
        );
        assert_eq!(
            splitter.output(&mut out),
            Err(ChunkError::InvalidLength { capacity: 4 })
        );
        assert_eq!(splitter.output(&mut out), Ok(ChunkOutput::Waiting));
    }

    #[test]
    fn test_overflow_discards_until_delimiter() {
        let mut splitter = ChunkSplitter::<4>::default();
        let mut out = Vec::new();
        feed(&mut splitter, b"\x01\x02\x03\x04");

        let overflow = ChunkError::InvalidLength { capacity: 4 };
        assert_eq!(splitter.input(0x05), Err(overflow));
        assert_eq!(splitter.output(&mut out), Err(overflow));
        assert_eq!(splitter.input(0x06), Err(overflow));
        assert_eq!(splitter.input(0x00), Err(overflow));

        // The next chunk starts cleanly.
        feed(&mut splitter, b"\x07");
        assert!(!splitter.overwritten());
        assert_eq!(splitter.input(0x00), Ok(ChunkInput::Ready));
        assert_eq!(splitter.output(&mut out), Ok(ChunkOutput::Available));
        assert_eq!(out.as_slice(), b"\x07");
    }

    #[test]
    fn test_overflowed_chunk_reported_once() {
        let mut splitter = ChunkSplitter::<2>::default();
        let mut out = Vec::new();
        feed(&mut splitter, b"\x01\x02");
        assert!(splitter.input(0x03).is_err());
        assert!(splitter.input(0x00).is_err());

        assert!(splitter.output(&mut out).is_err());
        assert_eq!(splitter.output(&mut out), Ok(ChunkOutput::Waiting));
    }

    #[test]
    fn test_empty_chunk() {
        let mut splitter = ChunkSplitter::<4>::default();
        let mut out: Vec<u8, 4> = Vec::from_slice(b"\x09").unwrap();
        assert_eq!(splitter.input(0x00), Ok(ChunkInput::Ready));
        assert_eq!(splitter.output(&mut out), Ok(ChunkOutput::Available));
        assert!(out.is_empty());
    }

    #[test]
    fn test_merger_appends_delimiter() {
        let merger = ChunkMerger::default();
        let mut buffer: Vec<u8, 4> = Vec::from_slice(b"\x01\x02").unwrap();
        merger.transform(&mut buffer).unwrap();
        assert_eq!(buffer.as_slice(), b"\x01\x02\x00");
    }

    #[test]
    fn test_merger_full_buffer() {
        let merger = ChunkMerger::new(0x0A);
        let mut buffer: Vec<u8, 3> = Vec::from_slice(b"\x01\x02\x03").unwrap();
        assert_eq!(
            merger.transform(&mut buffer),
            Err(ChunkError::InvalidLength { capacity: 3 })
        );
        assert_eq!(buffer.as_slice(), b"\x01\x02\x03");
    }

    #[test]
    fn test_merger_then_splitter() {
        let merger = ChunkMerger::default();
        let mut splitter = ChunkSplitter::<8>::default();
        let mut wire: Vec<u8, 8> = Vec::from_slice(b"\x11\x22").unwrap();
        merger.transform(&mut wire).unwrap();

        let mut ready = false;
        for &byte in wire.iter() {
            ready = splitter.input(byte).unwrap() == ChunkInput::Ready;
        }
        assert!(ready);

        let mut out = Vec::new();
        splitter.output(&mut out).unwrap();
        assert_eq!(out.as_slice(), b"\x11\x22");
    }
}
