//! Serial link protocol stack for ventilator firmware and its host peer.
//!
//! Frames on the link are COBS-encoded and `0x00`-delimited. Each frame
//! carries a CRC-32C integrity element, which carries a sequenced datagram,
//! which carries a typed message holding one state value. The firmware
//! rebroadcasts its live state on a fixed cyclic schedule, so a lost frame
//! is corrected by the next cycle rather than by retransmission.
//!
//! # Crate Structure
//!
//! - [`transport`]: byte transport trait, queue and stream transports
//! - [`frame`]: COBS codec and delimited frame splitting
//! - [`protocol`]: integrity, datagram and message layers, broadcast scheduler
//! - [`backend`]: state kinds and the link orchestrator (behind `backend` feature)

/// Re-export transport types.
pub mod transport {
    pub use ventlink_transport::*;
}

/// Re-export frame types.
pub mod frame {
    pub use ventlink_frame::*;
}

/// Re-export protocol layer types.
pub mod protocol {
    pub use ventlink_protocol::*;
}

/// Re-export backend types (requires `backend` feature).
#[cfg(feature = "backend")]
pub mod backend {
    pub use ventlink_backend::*;
}
