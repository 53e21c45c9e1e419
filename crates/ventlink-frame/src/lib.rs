//! COBS byte stuffing and delimited frame splitting.
//!
//! Every frame on the serial link is a COBS-encoded payload of at most
//! [`FRAME_PAYLOAD_MAX_SIZE`] bytes followed by a single `0x00` delimiter.
//! COBS guarantees the encoded bytes never contain the delimiter, so a
//! receiver can resynchronize on the next `0x00` after any corruption.
//!
//! All buffers are fixed-capacity `heapless` vectors; nothing here allocates.

pub mod chunks;
#[cfg(feature = "async")]
pub mod codec;
pub mod cobs;
pub mod error;
pub mod frames;

pub use chunks::{ChunkInput, ChunkMerger, ChunkOutput, ChunkSplitter};
#[cfg(feature = "async")]
pub use codec::CobsCodec;
pub use error::{ChunkError, CobsError, FrameError, Result};
pub use frames::{
    ChunkBuffer, EncodedBuffer, FrameInput, FrameOutput, FrameReceiver, FrameSender,
    PayloadBuffer, CHUNK_MAX_SIZE, DELIMITER, ENCODED_MAX_SIZE, FRAME_PAYLOAD_MAX_SIZE,
};
