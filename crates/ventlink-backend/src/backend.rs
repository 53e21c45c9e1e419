//! Receive and send pipelines, and the clock-driven backend.

use heapless::Vec;
use ventlink_frame::{
    ChunkBuffer, FrameInput, FrameOutput, FrameReceiver, FrameSender, PayloadBuffer,
};
use ventlink_protocol::{
    Crc32, DatagramError, DatagramReceiver, DatagramSender, IntegrityReceiver, IntegritySender,
    Message, MessageReceiver, MessageSender, ParsedDatagram, ParsedIntegrity, Scheduler,
    DATAGRAM_PAYLOAD_MAX_SIZE, INTEGRITY_PAYLOAD_MAX_SIZE,
};

use crate::error::{ReceiveError, Result, SendError, StoreError};
use crate::schedule::{BackendConfig, SCHEDULE_MAX_ENTRIES};
use crate::schema::DESCRIPTORS;
use crate::states::{MessageType, StateSegment, StateStore};

/// Message carried over the backend link.
pub type BackendMessage = Message<StateSegment>;

/// Progress reported by [`BackendReceiver::input`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputStatus {
    /// Byte buffered, frame incomplete.
    Pending,
    /// A complete frame can be read with [`BackendReceiver::output`].
    Ready,
}

/// Result of the `output` calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputStatus {
    Available,
    Waiting,
}

/// Result of [`Backend::input`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Received {
    /// No complete message yet.
    Waiting,
    /// A message was decoded and written to the state store.
    Applied(MessageType),
}

/// Byte-by-byte receive chain: frame, integrity, datagram, message.
#[derive(Debug, Clone)]
pub struct BackendReceiver<C> {
    frame: FrameReceiver,
    integrity: IntegrityReceiver<C>,
    datagram: DatagramReceiver,
    message: MessageReceiver<'static, StateSegment>,
}

impl<C: Crc32> BackendReceiver<C> {
    pub fn new(engine: C) -> Self {
        Self {
            frame: FrameReceiver::new(),
            integrity: IntegrityReceiver::new(engine),
            datagram: DatagramReceiver::new(),
            message: MessageReceiver::new(&DESCRIPTORS),
        }
    }

    /// Feed one byte from the link.
    pub fn input(&mut self, byte: u8) -> std::result::Result<InputStatus, ReceiveError> {
        match self.frame.input(byte)? {
            FrameInput::Pending => Ok(InputStatus::Pending),
            FrameInput::Ready => {
                if self.frame.overwritten() {
                    tracing::debug!("unread frame replaced by newer frame");
                }
                Ok(InputStatus::Ready)
            }
            FrameInput::Overwritten => {
                tracing::debug!("unread frame replaced by newer input");
                Ok(InputStatus::Pending)
            }
        }
    }

    /// Run the completed frame through the remaining layers into `message`.
    ///
    /// Returns the first failing layer's error. A sequence mismatch is only
    /// reported once the message itself has decoded, so on
    /// [`DatagramError::InvalidSequence`] `message` holds valid data.
    pub fn output(
        &mut self,
        message: &mut BackendMessage,
    ) -> std::result::Result<OutputStatus, ReceiveError> {
        let mut frame = PayloadBuffer::new();
        if self.frame.output(&mut frame)? == FrameOutput::Waiting {
            return Ok(OutputStatus::Waiting);
        }

        let mut integrity = ParsedIntegrity::<INTEGRITY_PAYLOAD_MAX_SIZE>::default();
        self.integrity.transform(&frame, &mut integrity)?;

        let mut datagram = ParsedDatagram::<DATAGRAM_PAYLOAD_MAX_SIZE>::default();
        let sequence = match self.datagram.transform(integrity.payload(), &mut datagram) {
            Ok(()) => Ok(()),
            Err(err @ DatagramError::InvalidSequence { .. }) => Err(err),
            Err(err) => return Err(err.into()),
        };

        self.message.transform(datagram.payload(), message)?;
        sequence?;
        Ok(OutputStatus::Available)
    }

    /// Sequence number the next datagram should carry.
    pub fn expected_seq(&self) -> u8 {
        self.datagram.expected_seq()
    }
}

/// Send chain: message, datagram, integrity, frame.
#[derive(Debug, Clone)]
pub struct BackendSender<C> {
    message: MessageSender<'static, StateSegment>,
    datagram: DatagramSender,
    integrity: IntegritySender<C>,
    frame: FrameSender,
}

impl<C: Crc32> BackendSender<C> {
    pub fn new(engine: C) -> Self {
        Self::starting_at(engine, 0)
    }

    /// A sender whose first datagram carries sequence `next_seq`.
    pub fn starting_at(engine: C, next_seq: u8) -> Self {
        Self {
            message: MessageSender::new(&DESCRIPTORS),
            datagram: DatagramSender::starting_at(next_seq),
            integrity: IntegritySender::new(engine),
            frame: FrameSender::new(),
        }
    }

    /// Write the complete wire frame for `message` into `output`.
    pub fn transform(
        &mut self,
        message: &mut BackendMessage,
        output: &mut ChunkBuffer,
    ) -> std::result::Result<(), SendError> {
        output.clear();

        let mut body = Vec::<u8, DATAGRAM_PAYLOAD_MAX_SIZE>::new();
        self.message.transform(message, &mut body)?;

        let mut datagram = Vec::<u8, INTEGRITY_PAYLOAD_MAX_SIZE>::new();
        self.datagram.transform(&body, &mut datagram)?;

        let mut payload = PayloadBuffer::new();
        self.integrity.transform(&datagram, &mut payload)?;

        self.frame.transform(&payload, output)?;
        Ok(())
    }

    /// Sequence number the next datagram will carry.
    pub fn next_seq(&self) -> u8 {
        self.datagram.next_seq()
    }
}

#[derive(Debug, Clone, Default)]
enum Pending {
    #[default]
    None,
    Frame(ChunkBuffer),
    Failed(SendError),
}

/// Both directions of the link plus the broadcast schedule.
///
/// Incoming messages are written to the state store. Outgoing frames are
/// produced by [`Backend::update_clock`] and collected with
/// [`Backend::output`]; at most one frame is held, and a newer one replaces
/// an unread older one.
#[derive(Debug)]
pub struct Backend<C, S> {
    receiver: BackendReceiver<C>,
    sender: BackendSender<C>,
    scheduler: Scheduler<MessageType, SCHEDULE_MAX_ENTRIES>,
    states: S,
    last_time: u32,
    pending: Pending,
}

impl<C: Crc32 + Clone, S: StateStore> Backend<C, S> {
    pub fn new(engine: C, states: S, config: &BackendConfig) -> Result<Self> {
        Ok(Self {
            receiver: BackendReceiver::new(engine.clone()),
            sender: BackendSender::new(engine),
            scheduler: Scheduler::new(&config.schedule)?,
            states,
            last_time: 0,
            pending: Pending::None,
        })
    }

    /// Feed one byte from the link, applying any completed message.
    pub fn input(&mut self, byte: u8) -> Result<Received> {
        if self.receiver.input(byte)? == InputStatus::Pending {
            return Ok(Received::Waiting);
        }

        let mut message = BackendMessage::default();
        match self.receiver.output(&mut message) {
            Ok(OutputStatus::Waiting) => return Ok(Received::Waiting),
            Ok(OutputStatus::Available) => {}
            Err(ReceiveError::Datagram(DatagramError::InvalidSequence { expected, received })) => {
                tracing::warn!(expected, received, "datagram sequence mismatch, resynchronized");
            }
            Err(err) => {
                tracing::warn!(status = err.status(), error = %err, "discarding frame");
                return Err(err.into());
            }
        }

        let segment = message.into_payload();
        let kind = segment.kind().ok_or(StoreError::InvalidType)?;
        self.states.write(segment)?;
        tracing::debug!(%kind, "state received");
        Ok(Received::Applied(kind))
    }

    /// Advance the schedule to `current_time`, preparing a frame if a kind is due.
    ///
    /// Returns the kind that became due. The clock may wrap.
    pub fn update_clock(&mut self, current_time: u32) -> Option<MessageType> {
        let ticks = current_time.wrapping_sub(self.last_time);
        self.last_time = current_time;
        let kind = self.scheduler.advance_by(ticks)?;

        if matches!(self.pending, Pending::Frame(_)) {
            tracing::debug!(%kind, "unsent frame replaced");
        }
        self.pending = match self.prepare(kind) {
            Ok(frame) => Pending::Frame(frame),
            Err(err) => {
                tracing::warn!(%kind, status = err.status(), error = %err, "cannot encode state");
                Pending::Failed(err)
            }
        };
        Some(kind)
    }

    fn prepare(&mut self, kind: MessageType) -> std::result::Result<ChunkBuffer, SendError> {
        let segment = self
            .states
            .read(kind)
            .ok_or(SendError::StateUnavailable(kind))?;
        let mut message = BackendMessage::new(segment);
        let mut frame = ChunkBuffer::new();
        self.sender.transform(&mut message, &mut frame)?;
        tracing::trace!(%kind, len = frame.len(), "frame prepared");
        Ok(frame)
    }

    /// Hand over the pending frame, if any.
    pub fn output(&mut self, buffer: &mut ChunkBuffer) -> std::result::Result<OutputStatus, SendError> {
        match core::mem::take(&mut self.pending) {
            Pending::None => Ok(OutputStatus::Waiting),
            Pending::Frame(frame) => {
                *buffer = frame;
                Ok(OutputStatus::Available)
            }
            Pending::Failed(err) => Err(err),
        }
    }

    pub fn states(&self) -> &S {
        &self.states
    }

    pub fn states_mut(&mut self) -> &mut S {
        &mut self.states
    }

    pub fn scheduler(&self) -> &Scheduler<MessageType, SCHEDULE_MAX_ENTRIES> {
        &self.scheduler
    }

    pub fn receiver(&self) -> &BackendReceiver<C> {
        &self.receiver
    }

    pub fn sender(&self) -> &BackendSender<C> {
        &self.sender
    }

    pub fn into_states(self) -> S {
        self.states
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::states::{Parameters, SensorMeasurements, States};
    use ventlink_protocol::{Crc32c, MessageError, ScheduleEntry};

    fn encode(sender: &mut BackendSender<Crc32c>, segment: StateSegment) -> ChunkBuffer {
        let mut frame = ChunkBuffer::new();
        sender
            .transform(&mut BackendMessage::new(segment), &mut frame)
            .unwrap();
        frame
    }

    fn feed(
        receiver: &mut BackendReceiver<Crc32c>,
        wire: &[u8],
        message: &mut BackendMessage,
    ) -> std::result::Result<OutputStatus, ReceiveError> {
        for &byte in wire {
            if receiver.input(byte)? == InputStatus::Ready {
                return receiver.output(message);
            }
        }
        Ok(OutputStatus::Waiting)
    }

    fn measurements(time: u64) -> SensorMeasurements {
        SensorMeasurements {
            time,
            paw: 15.0,
            ..Default::default()
        }
    }

    #[test]
    fn sender_receiver_roundtrip() {
        let mut sender = BackendSender::new(Crc32c);
        let mut receiver = BackendReceiver::new(Crc32c);
        let frame = encode(&mut sender, measurements(7).into());
        assert_eq!(frame.last(), Some(&0x00));

        let mut message = BackendMessage::default();
        assert_eq!(
            feed(&mut receiver, &frame, &mut message),
            Ok(OutputStatus::Available)
        );
        assert_eq!(message.type_code(), MessageType::SensorMeasurements.code());
        assert_eq!(message.payload(), &StateSegment::from(measurements(7)));
        assert_eq!(receiver.expected_seq(), 1);
    }

    #[test]
    fn receiver_keeps_only_latest_unread_frame() {
        let mut sender = BackendSender::new(Crc32c);
        let mut receiver = BackendReceiver::new(Crc32c);
        let first = encode(&mut sender, measurements(1).into());
        let second = encode(&mut sender, measurements(2).into());

        for &byte in &first {
            receiver.input(byte).unwrap();
        }
        let statuses: std::vec::Vec<_> = second
            .iter()
            .map(|&byte| receiver.input(byte).unwrap())
            .collect();
        assert_eq!(statuses.last(), Some(&InputStatus::Ready));
        assert!(statuses[..statuses.len() - 1]
            .iter()
            .all(|status| *status == InputStatus::Pending));

        let mut message = BackendMessage::default();
        assert_eq!(
            receiver.output(&mut message),
            Err(ReceiveError::Datagram(DatagramError::InvalidSequence {
                expected: 0,
                received: 1
            }))
        );
        assert_eq!(message.payload(), &StateSegment::from(measurements(2)));
    }

    #[test]
    fn receiver_waits_without_frame() {
        let mut receiver = BackendReceiver::new(Crc32c);
        let mut message = BackendMessage::default();
        assert_eq!(receiver.output(&mut message), Ok(OutputStatus::Waiting));
    }

    #[test]
    fn corrupted_frame_is_crc_error() {
        let mut sender = BackendSender::new(Crc32c);
        let mut receiver = BackendReceiver::new(Crc32c);
        let wire = encode(&mut sender, measurements(1).into());
        let mut payload = PayloadBuffer::new();
        ventlink_frame::cobs::decode(&wire[..wire.len() - 1], &mut payload).unwrap();
        let last = payload.len() - 1;
        payload[last] ^= 0x10;
        let mut frame = ChunkBuffer::new();
        FrameSender::new().transform(&payload, &mut frame).unwrap();

        let mut message = BackendMessage::default();
        let err = feed(&mut receiver, &frame, &mut message).unwrap_err();
        assert_eq!(err.status(), "invalid_crcelement_crc");
    }

    #[test]
    fn sequence_gap_still_yields_message() {
        let mut sender = BackendSender::new(Crc32c);
        let mut receiver = BackendReceiver::new(Crc32c);
        let mut message = BackendMessage::default();

        let _lost = encode(&mut sender, measurements(1).into());
        let frame = encode(&mut sender, measurements(2).into());
        assert_eq!(
            feed(&mut receiver, &frame, &mut message),
            Err(ReceiveError::Datagram(DatagramError::InvalidSequence {
                expected: 0,
                received: 1
            }))
        );
        assert_eq!(message.payload(), &StateSegment::from(measurements(2)));

        let frame = encode(&mut sender, measurements(3).into());
        assert_eq!(
            feed(&mut receiver, &frame, &mut message),
            Ok(OutputStatus::Available)
        );
    }

    #[test]
    fn sender_rejects_unknown_segment() {
        let mut sender = BackendSender::new(Crc32c);
        let mut frame = ChunkBuffer::new();
        assert_eq!(
            sender.transform(&mut BackendMessage::default(), &mut frame),
            Err(SendError::Message(MessageError::InvalidType(0)))
        );
        assert!(frame.is_empty());
    }

    #[test]
    fn backend_waits_before_schedule() {
        let config = BackendConfig::with_schedule([ScheduleEntry::new(
            3,
            MessageType::Parameters,
        )]);
        let mut backend = Backend::new(Crc32c, States::default(), &config).unwrap();
        let mut buffer = ChunkBuffer::new();
        assert_eq!(backend.update_clock(1), None);
        assert_eq!(backend.update_clock(2), None);
        assert_eq!(backend.output(&mut buffer), Ok(OutputStatus::Waiting));
        assert_eq!(backend.update_clock(3), Some(MessageType::Parameters));
        assert_eq!(backend.output(&mut buffer), Ok(OutputStatus::Available));
        assert!(!buffer.is_empty());
        assert_eq!(backend.output(&mut buffer), Ok(OutputStatus::Waiting));
    }

    #[test]
    fn backend_clock_wraps() {
        let config = BackendConfig::with_schedule([ScheduleEntry::new(
            10,
            MessageType::SensorMeasurements,
        )]);
        let mut backend = Backend::new(Crc32c, States::default(), &config).unwrap();
        assert_eq!(backend.update_clock(u32::MAX - 4), Some(MessageType::SensorMeasurements));
        assert_eq!(backend.update_clock(u32::MAX), None);
        assert_eq!(backend.update_clock(4), None);
        assert_eq!(backend.update_clock(5), Some(MessageType::SensorMeasurements));
    }

    #[test]
    fn backend_applies_received_state() {
        let mut sender = BackendSender::new(Crc32c);
        let parameters = Parameters {
            ventilating: true,
            rr: 20.0,
            ..Default::default()
        };
        let frame = encode(&mut sender, parameters.into());

        let mut backend =
            Backend::new(Crc32c, States::default(), &BackendConfig::default()).unwrap();
        let last = frame.iter().map(|&byte| backend.input(byte).unwrap()).last();
        assert_eq!(last, Some(Received::Applied(MessageType::Parameters)));
        assert_eq!(backend.states().parameters, parameters);
    }

    /// Synchronizes sensor measurements only.
    #[derive(Debug, Default)]
    struct SensorsOnly(SensorMeasurements);

    impl StateStore for SensorsOnly {
        fn read(&self, kind: MessageType) -> Option<StateSegment> {
            (kind == MessageType::SensorMeasurements).then(|| self.0.into())
        }

        fn write(&mut self, segment: StateSegment) -> std::result::Result<(), StoreError> {
            match segment {
                StateSegment::SensorMeasurements(value) => {
                    self.0 = value;
                    Ok(())
                }
                _ => Err(StoreError::InvalidType),
            }
        }
    }

    #[test]
    fn backend_surfaces_unavailable_state_once() {
        let config = BackendConfig::with_schedule([
            ScheduleEntry::new(1, MessageType::Parameters),
            ScheduleEntry::new(1, MessageType::SensorMeasurements),
        ]);
        let mut backend = Backend::new(Crc32c, SensorsOnly::default(), &config).unwrap();
        let mut buffer = ChunkBuffer::new();

        assert_eq!(backend.update_clock(1), Some(MessageType::Parameters));
        let err = backend.output(&mut buffer).unwrap_err();
        assert_eq!(err, SendError::StateUnavailable(MessageType::Parameters));
        assert_eq!(err.status(), "invalid_return_code");
        assert!(buffer.is_empty());
        assert_eq!(backend.output(&mut buffer), Ok(OutputStatus::Waiting));

        assert_eq!(backend.update_clock(2), Some(MessageType::SensorMeasurements));
        assert_eq!(backend.output(&mut buffer), Ok(OutputStatus::Available));
        assert!(!buffer.is_empty());
        assert_eq!(backend.sender().next_seq(), 1);
    }

    #[test]
    fn backend_rejects_empty_schedule() {
        let config = BackendConfig::with_schedule(std::vec::Vec::new());
        assert!(matches!(
            Backend::new(Crc32c, States::default(), &config),
            Err(crate::BackendError::Schedule(_))
        ));
    }
}
