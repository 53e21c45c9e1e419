//! Byte transport abstraction for the ventilator serial link.
//!
//! The link protocol never touches a peripheral directly. It consumes bytes
//! one at a time through [`ByteTransport::read_byte`] and hands finished
//! frames to [`ByteTransport::write`]. Interrupt handling, queue depth and
//! flow control all belong to the implementation behind the trait.
//!
//! Two implementations ship here:
//! - [`QueueTransport`], bounded in-memory receive/transmit queues
//! - [`StreamTransport`], an adapter over any `Read + Write` stream

pub mod error;
pub mod queue;
pub mod stream;
pub mod traits;

pub use error::{Result, TransportError};
pub use queue::{bridge, QueueTransport};
pub use stream::StreamTransport;
pub use traits::ByteTransport;
