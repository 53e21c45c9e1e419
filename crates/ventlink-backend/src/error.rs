use ventlink_frame::FrameError;
use ventlink_protocol::{DatagramError, IntegrityError, MessageError, ScheduleError};
use ventlink_transport::TransportError;

use crate::states::MessageType;

/// The first layer that rejected an incoming frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ReceiveError {
    #[error("frame error: {0}")]
    Frame(#[from] FrameError),

    #[error("integrity error: {0}")]
    Integrity(#[from] IntegrityError),

    #[error("datagram error: {0}")]
    Datagram(#[from] DatagramError),

    #[error("message error: {0}")]
    Message(#[from] MessageError),
}

impl ReceiveError {
    /// Flat status code of the failing layer.
    pub fn status(&self) -> &'static str {
        match self {
            ReceiveError::Frame(_) => "invalid_frame_length",
            ReceiveError::Integrity(IntegrityError::InvalidCrc { .. }) => "invalid_crcelement_crc",
            ReceiveError::Integrity(_) => "invalid_crcelement_parse",
            ReceiveError::Datagram(DatagramError::InvalidParse { .. }) => "invalid_datagram_parse",
            ReceiveError::Datagram(DatagramError::InvalidSequence { .. }) => {
                "invalid_datagram_sequence"
            }
            ReceiveError::Datagram(_) => "invalid_datagram_length",
            ReceiveError::Message(err) => message_status(err),
        }
    }
}

/// The first layer that failed to wrap an outgoing message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum SendError {
    #[error("message error: {0}")]
    Message(#[from] MessageError),

    #[error("datagram error: {0}")]
    Datagram(#[from] DatagramError),

    #[error("integrity error: {0}")]
    Integrity(#[from] IntegrityError),

    #[error("frame error: {0}")]
    Frame(#[from] FrameError),

    /// The state store has no value for a scheduled kind.
    #[error("no state available for {0}")]
    StateUnavailable(MessageType),
}

impl SendError {
    /// Flat status code of the failing layer.
    pub fn status(&self) -> &'static str {
        match self {
            SendError::Message(err) => message_status(err),
            SendError::Datagram(_) => "invalid_datagram_length",
            SendError::Integrity(_) => "invalid_crcelement_length",
            SendError::Frame(_) => "invalid_frame_length",
            SendError::StateUnavailable(_) => "invalid_return_code",
        }
    }
}

fn message_status(err: &MessageError) -> &'static str {
    match err {
        MessageError::InvalidLength => "invalid_message_length",
        MessageError::InvalidType(_) => "invalid_message_type",
        MessageError::InvalidEncoding(_) => "invalid_message_encoding",
    }
}

/// Errors from the live state store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// The segment carries no state kind.
    #[error("state segment has no known type")]
    InvalidType,
}

/// A message type name that does not exist.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown message type `{0}`")]
pub struct UnknownKind(pub String);

/// Errors from the backend and the link driver.
#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    #[error("receive failed: {0}")]
    Receive(#[from] ReceiveError),

    #[error("send failed: {0}")]
    Send(#[from] SendError),

    #[error("state store error: {0}")]
    Store(#[from] StoreError),

    #[error("invalid schedule: {0}")]
    Schedule(#[from] ScheduleError),

    #[error("transport error: {0}")]
    Transport(#[from] TransportError),
}

pub type Result<T> = std::result::Result<T, BackendError>;
