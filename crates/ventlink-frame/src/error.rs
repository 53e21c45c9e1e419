/// Errors from the COBS byte codec.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum CobsError {
    /// The output buffer cannot hold the worst-case encoding of the input.
    #[error("encoded output out of bounds ({needed} bytes needed, capacity {capacity})")]
    OutOfBounds { needed: usize, capacity: usize },

    /// A length byte points past the end of the encoded input.
    #[error("malformed COBS block at offset {offset}")]
    Malformed { offset: usize },

    /// The decoded output does not fit the output buffer.
    #[error("decoded output exceeds capacity {capacity}")]
    Overflow { capacity: usize },
}

/// Errors from chunk splitting and merging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ChunkError {
    /// The chunk does not fit the buffer.
    #[error("chunk exceeds capacity {capacity}")]
    InvalidLength { capacity: usize },
}

/// Errors from the frame receiver and sender.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum FrameError {
    /// The frame is longer than the frame buffers allow.
    #[error("invalid frame length: {0}")]
    InvalidLength(#[from] ChunkError),

    /// The frame body is not valid COBS, or does not fit once encoded.
    #[error("invalid frame encoding: {0}")]
    InvalidCobs(#[from] CobsError),
}

pub type Result<T> = std::result::Result<T, FrameError>;
