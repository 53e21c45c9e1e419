//! Postcard schema codecs and the descriptor table.

use core::marker::PhantomData;

use ventlink_protocol::{CodecError, Descriptor, SchemaCodec};

use crate::states::{
    AlarmLimits, AlarmLimitsRequest, CycleMeasurements, Parameters, ParametersRequest,
    SensorMeasurements, StateKind, StateSegment,
};

/// Encodes one state kind with `postcard`.
pub struct PostcardSchema<T>(PhantomData<fn() -> T>);

impl<T> PostcardSchema<T> {
    pub const fn new() -> Self {
        Self(PhantomData)
    }
}

impl<T> Default for PostcardSchema<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: StateKind> SchemaCodec<StateSegment> for PostcardSchema<T> {
    fn encode(&self, payload: &StateSegment, output: &mut [u8]) -> Result<usize, CodecError> {
        let value = T::from_segment(payload).ok_or(CodecError::KindMismatch)?;
        match postcard::to_slice(value, output) {
            Ok(used) => Ok(used.len()),
            Err(postcard::Error::SerializeBufferFull) => Err(CodecError::BufferFull),
            Err(err) => {
                tracing::debug!(kind = %T::TYPE, error = %err, "postcard encode failed");
                Err(CodecError::Malformed)
            }
        }
    }

    fn decode(&self, input: &[u8], payload: &mut StateSegment) -> Result<(), CodecError> {
        match postcard::take_from_bytes::<T>(input) {
            Ok((value, [])) => {
                *payload = value.into();
                Ok(())
            }
            Ok((_, rest)) => {
                tracing::debug!(kind = %T::TYPE, trailing = rest.len(), "trailing bytes after state");
                Err(CodecError::Malformed)
            }
            Err(err) => {
                tracing::debug!(kind = %T::TYPE, error = %err, "postcard decode failed");
                Err(CodecError::Malformed)
            }
        }
    }

    fn default_payload(&self) -> StateSegment {
        T::default().into()
    }
}

static SENSOR_MEASUREMENTS: PostcardSchema<SensorMeasurements> = PostcardSchema::new();
static CYCLE_MEASUREMENTS: PostcardSchema<CycleMeasurements> = PostcardSchema::new();
static PARAMETERS: PostcardSchema<Parameters> = PostcardSchema::new();
static PARAMETERS_REQUEST: PostcardSchema<ParametersRequest> = PostcardSchema::new();
static ALARM_LIMITS: PostcardSchema<AlarmLimits> = PostcardSchema::new();
static ALARM_LIMITS_REQUEST: PostcardSchema<AlarmLimitsRequest> = PostcardSchema::new();

/// Descriptor table; the index is the message type code.
pub static DESCRIPTORS: [Descriptor<StateSegment>; 8] = [
    Descriptor::Unrecognized,
    Descriptor::Unrecognized,
    Descriptor::Schema(&SENSOR_MEASUREMENTS),
    Descriptor::Schema(&CYCLE_MEASUREMENTS),
    Descriptor::Schema(&PARAMETERS),
    Descriptor::Schema(&PARAMETERS_REQUEST),
    Descriptor::Schema(&ALARM_LIMITS),
    Descriptor::Schema(&ALARM_LIMITS_REQUEST),
];
