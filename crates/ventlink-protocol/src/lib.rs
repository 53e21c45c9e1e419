//! Protocol layers carried inside a link frame.
//!
//! Each layer wraps the body of the layer above it:
//!
//! ```text
//! frame payload    [crc32c (4B BE)][integrity payload ≤250]
//! integrity body   [seq (1B)][len (1B)][datagram payload ≤248]
//! datagram body    [type (1B)][schema-encoded state ≤247]
//! ```
//!
//! Receivers validate bottom-up and stop at the first failing layer; senders
//! wrap top-down. The [`scheduler`] decides which state kind goes out next.

pub mod crc;
pub mod datagram;
pub mod error;
pub mod integrity;
pub mod message;
pub mod scheduler;

pub use crate::crc::{Crc32, Crc32c};
pub use datagram::{Datagram, DatagramReceiver, DatagramSender, ParsedDatagram};
pub use error::{CodecError, DatagramError, IntegrityError, MessageError, ScheduleError};
pub use integrity::{IntegrityElement, IntegrityReceiver, IntegritySender, ParsedIntegrity};
pub use message::{
    Descriptor, Message, MessagePayload, MessageReceiver, MessageSender, SchemaCodec,
};
pub use scheduler::{ScheduleEntry, Scheduler};

/// Largest body an integrity element may carry (one full frame payload).
pub const INTEGRITY_BODY_MAX_SIZE: usize = 254;

/// Integrity payload capacity, i.e. the datagram body.
pub const INTEGRITY_PAYLOAD_MAX_SIZE: usize = INTEGRITY_BODY_MAX_SIZE - integrity::HEADER_SIZE;

/// Datagram payload capacity, i.e. the message body.
pub const DATAGRAM_PAYLOAD_MAX_SIZE: usize = INTEGRITY_PAYLOAD_MAX_SIZE - datagram::HEADER_SIZE;

/// Schema-encoded state capacity inside a message.
pub const MESSAGE_PAYLOAD_MAX_SIZE: usize = DATAGRAM_PAYLOAD_MAX_SIZE - message::HEADER_SIZE;

const _: () = assert!(INTEGRITY_PAYLOAD_MAX_SIZE == 250);
const _: () = assert!(DATAGRAM_PAYLOAD_MAX_SIZE == 248);
const _: () = assert!(MESSAGE_PAYLOAD_MAX_SIZE == 247);
