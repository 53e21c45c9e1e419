//! Link orchestrator for the ventilator serial link.
//!
//! Composes the frame, integrity, datagram and message layers into a
//! [`BackendReceiver`] and a [`BackendSender`], and drives outgoing state
//! broadcasts from a clock through the [`Backend`]:
//!
//! ```text
//! bytes ─► FrameReceiver ─► IntegrityReceiver ─► DatagramReceiver ─► MessageReceiver ─► StateStore
//! clock ─► Scheduler ─► StateStore ─► MessageSender ─► DatagramSender ─► IntegritySender ─► FrameSender ─► bytes
//! ```
//!
//! State kinds are plain `serde` structs encoded with `postcard`. The
//! [`LinkDriver`] pumps a backend over any [`ventlink_transport::ByteTransport`].

pub mod backend;
pub mod driver;
pub mod error;
pub mod schedule;
pub mod schema;
pub mod states;

pub use backend::{
    Backend, BackendMessage, BackendReceiver, BackendSender, InputStatus, OutputStatus, Received,
};
pub use driver::LinkDriver;
pub use error::{BackendError, ReceiveError, Result, SendError, StoreError};
pub use schedule::{BackendConfig, DEFAULT_SCHEDULE, SCHEDULE_MAX_ENTRIES};
pub use schema::{PostcardSchema, DESCRIPTORS};
pub use states::{
    AlarmLimits, AlarmLimitsRequest, CycleMeasurements, MessageType, Parameters,
    ParametersRequest, Range, SensorMeasurements, StateKind, StateSegment, StateStore, States,
    VentilationMode,
};
