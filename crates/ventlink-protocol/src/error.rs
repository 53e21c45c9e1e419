/// Errors from the integrity (CRC) layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum IntegrityError {
    /// The body is shorter than the checksum header, or longer than the payload buffer.
    #[error("cannot parse integrity element from {len} bytes")]
    InvalidParse { len: usize },

    /// The checksum in the header does not match the payload.
    #[error("crc mismatch (received {received:#010x}, computed {computed:#010x})")]
    InvalidCrc { received: u32, computed: u32 },

    /// The element does not fit the output buffer.
    #[error("integrity element does not fit ({size} bytes, capacity {capacity})")]
    InvalidLength { size: usize, capacity: usize },
}

/// Errors from the sequenced datagram layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum DatagramError {
    /// The body is shorter than the datagram header, or longer than the payload buffer.
    #[error("cannot parse datagram from {len} bytes")]
    InvalidParse { len: usize },

    /// The length field disagrees with the received payload size.
    #[error("datagram length field {declared} does not match payload size {actual}")]
    LengthMismatch { declared: u8, actual: usize },

    /// The sequence number is not the one expected next.
    #[error("datagram sequence {received} received, {expected} expected")]
    InvalidSequence { expected: u8, received: u8 },

    /// The datagram does not fit the output buffer.
    #[error("datagram does not fit ({size} bytes, capacity {capacity})")]
    InvalidLength { size: usize, capacity: usize },
}

/// Errors from a per-kind schema codec.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum CodecError {
    /// The encoded value does not fit the output buffer.
    #[error("encoded value does not fit")]
    BufferFull,

    /// The input is not a valid encoding of the kind.
    #[error("malformed encoding")]
    Malformed,

    /// The payload does not hold the kind this codec handles.
    #[error("payload kind does not match codec")]
    KindMismatch,
}

/// Errors from the typed message layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum MessageError {
    /// The input is empty, or the encoded message does not fit.
    #[error("invalid message length")]
    InvalidLength,

    /// The type code has no schema in the descriptor table.
    #[error("unrecognized message type {0}")]
    InvalidType(u8),

    /// The schema codec rejected the payload.
    #[error("invalid message encoding: {0}")]
    InvalidEncoding(#[source] CodecError),
}

/// Errors from building a broadcast schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ScheduleError {
    /// A schedule needs at least one entry.
    #[error("schedule is empty")]
    Empty,

    /// More entries than the scheduler can hold.
    #[error("schedule has {count} entries, capacity {capacity}")]
    TooManyEntries { count: usize, capacity: usize },
}
