use heapless::Vec;

use crate::chunks::{ChunkInput, ChunkMerger, ChunkOutput, ChunkSplitter};
use crate::cobs;
use crate::error::Result;

/// Frame delimiter on the wire.
pub const DELIMITER: u8 = 0x00;

/// Maximum decoded frame payload.
pub const FRAME_PAYLOAD_MAX_SIZE: usize = 254;

/// Maximum COBS-encoded frame body, excluding the delimiter.
pub const ENCODED_MAX_SIZE: usize = FRAME_PAYLOAD_MAX_SIZE + 1;

/// Maximum frame on the wire, including the delimiter.
pub const CHUNK_MAX_SIZE: usize = FRAME_PAYLOAD_MAX_SIZE + 2;

/// Decoded frame payload.
pub type PayloadBuffer = Vec<u8, FRAME_PAYLOAD_MAX_SIZE>;

/// Encoded frame body as collected by the receiver.
pub type EncodedBuffer = Vec<u8, ENCODED_MAX_SIZE>;

/// Complete outgoing frame, delimiter included.
pub type ChunkBuffer = Vec<u8, CHUNK_MAX_SIZE>;

/// Progress reported by [`FrameReceiver::input`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameInput {
    /// Byte buffered, frame incomplete.
    Pending,
    /// A complete frame is waiting in the receiver.
    Ready,
    /// A ready frame was never read and a new, incomplete one replaced it.
    ///
    /// When the replacing frame completes on the same byte, `Ready` is
    /// reported instead and [`FrameReceiver::overwritten`] is set.
    Overwritten,
}

/// Result of [`FrameReceiver::output`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameOutput {
    /// The decoded payload was written to the output buffer.
    Available,
    /// No complete frame has been received yet.
    Waiting,
}

/// Collects delimited frames byte by byte and COBS-decodes them.
#[derive(Debug, Clone)]
pub struct FrameReceiver {
    splitter: ChunkSplitter<ENCODED_MAX_SIZE>,
}

impl FrameReceiver {
    pub const fn new() -> Self {
        Self {
            splitter: ChunkSplitter::new(DELIMITER),
        }
    }

    /// Feed one byte from the link.
    pub fn input(&mut self, byte: u8) -> Result<FrameInput> {
        match self.splitter.input(byte)? {
            ChunkInput::Ready => Ok(FrameInput::Ready),
            ChunkInput::Pending if self.splitter.overwritten() => Ok(FrameInput::Overwritten),
            ChunkInput::Pending => Ok(FrameInput::Pending),
        }
    }

    /// Whether the most recent [`input`](Self::input) dropped an unread frame.
    pub fn overwritten(&self) -> bool {
        self.splitter.overwritten()
    }

    /// Decode the completed frame into `output`.
    pub fn output(&mut self, output: &mut PayloadBuffer) -> Result<FrameOutput> {
        let mut encoded = EncodedBuffer::new();
        if self.splitter.output(&mut encoded)? == ChunkOutput::Waiting {
            return Ok(FrameOutput::Waiting);
        }

        cobs::decode(&encoded, output)?;
        tracing::trace!(encoded = encoded.len(), decoded = output.len(), "frame decoded");
        Ok(FrameOutput::Available)
    }
}

impl Default for FrameReceiver {
    fn default() -> Self {
        Self::new()
    }
}

/// COBS-encodes a payload and terminates it with the delimiter.
#[derive(Debug, Clone, Copy)]
pub struct FrameSender {
    merger: ChunkMerger,
}

impl FrameSender {
    pub const fn new() -> Self {
        Self {
            merger: ChunkMerger::new(DELIMITER),
        }
    }

    /// Write the complete wire frame for `payload` into `output`.
    pub fn transform(&self, payload: &[u8], output: &mut ChunkBuffer) -> Result<()> {
        cobs::encode(payload, output)?;
        self.merger.transform(output)?;
        Ok(())
    }
}

impl Default for FrameSender {
    fn default() -> Self {
        Self::new()
    }
}
