//! Application state kinds and the live state store.

use core::fmt;
use core::str::FromStr;

use serde::{de::DeserializeOwned, Deserialize, Serialize};
use ventlink_protocol::MessagePayload;

use crate::error::{StoreError, UnknownKind};

/// Lower and upper bound of an alarm limit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Range {
    pub lower: i32,
    pub upper: i32,
}

impl Range {
    pub const fn new(lower: i32, upper: i32) -> Self {
        Self { lower, upper }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VentilationMode {
    #[default]
    Hfnc,
    PcAc,
    VcAc,
    NivPc,
    NivPs,
    Psv,
    Prvc,
}

/// Live sensor readings, broadcast most often.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SensorMeasurements {
    pub time: u64,
    pub cycle: u32,
    pub fio2: f32,
    pub spo2: f32,
    pub hr: f32,
    pub paw: f32,
    pub flow: f32,
    pub volume: f32,
}

/// Per-breath measurements.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CycleMeasurements {
    pub time: u64,
    pub vt: f32,
    pub rr: f32,
    pub peep: f32,
    pub pip: f32,
    pub ip: f32,
    pub ve: f32,
}

/// Ventilation parameters in effect.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Parameters {
    pub time: u64,
    pub ventilating: bool,
    pub mode: VentilationMode,
    pub fio2: f32,
    pub flow: f32,
    pub pip: f32,
    pub peep: f32,
    pub vt: f32,
    pub rr: f32,
    pub ie: f32,
}

/// Ventilation parameters requested by the operator.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParametersRequest {
    pub time: u64,
    pub ventilating: bool,
    pub mode: VentilationMode,
    pub fio2: f32,
    pub flow: f32,
    pub pip: f32,
    pub peep: f32,
    pub vt: f32,
    pub rr: f32,
    pub ie: f32,
}

/// Alarm limits in effect.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AlarmLimits {
    pub time: u64,
    pub fio2: Range,
    pub flow: Range,
    pub spo2: Range,
    pub hr: Range,
    pub rr: Range,
    pub pip: Range,
    pub peep: Range,
    pub ip_above_peep: Range,
    pub insp_time: Range,
    pub paw: Range,
    pub mve: Range,
    pub tv: Range,
    pub etco2: Range,
    pub apnea: Range,
}

/// Alarm limits requested by the operator.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AlarmLimitsRequest {
    pub time: u64,
    pub fio2: Range,
    pub flow: Range,
    pub spo2: Range,
    pub hr: Range,
    pub rr: Range,
    pub pip: Range,
    pub peep: Range,
    pub ip_above_peep: Range,
    pub insp_time: Range,
    pub paw: Range,
    pub mve: Range,
    pub tv: Range,
    pub etco2: Range,
    pub apnea: Range,
}

/// Message type codes, i.e. indices into [`crate::DESCRIPTORS`].
///
/// Codes 0 and 1 are reserved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum MessageType {
    SensorMeasurements = 2,
    CycleMeasurements = 3,
    Parameters = 4,
    ParametersRequest = 5,
    AlarmLimits = 6,
    AlarmLimitsRequest = 7,
}

impl MessageType {
    pub const ALL: [MessageType; 6] = [
        MessageType::SensorMeasurements,
        MessageType::CycleMeasurements,
        MessageType::Parameters,
        MessageType::ParametersRequest,
        MessageType::AlarmLimits,
        MessageType::AlarmLimitsRequest,
    ];

    pub const fn code(self) -> u8 {
        self as u8
    }

    pub fn from_code(code: u8) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.code() == code)
    }

    pub const fn name(self) -> &'static str {
        match self {
            MessageType::SensorMeasurements => "sensor_measurements",
            MessageType::CycleMeasurements => "cycle_measurements",
            MessageType::Parameters => "parameters",
            MessageType::ParametersRequest => "parameters_request",
            MessageType::AlarmLimits => "alarm_limits",
            MessageType::AlarmLimitsRequest => "alarm_limits_request",
        }
    }
}

impl fmt::Display for MessageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for MessageType {
    type Err = UnknownKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.name() == s)
            .ok_or_else(|| UnknownKind(s.to_string()))
    }
}

/// One state value of any kind, as carried by a message.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StateSegment {
    #[default]
    Unknown,
    SensorMeasurements(SensorMeasurements),
    CycleMeasurements(CycleMeasurements),
    Parameters(Parameters),
    ParametersRequest(ParametersRequest),
    AlarmLimits(AlarmLimits),
    AlarmLimitsRequest(AlarmLimitsRequest),
}

impl StateSegment {
    /// The active kind, or `None` for [`StateSegment::Unknown`].
    pub fn kind(&self) -> Option<MessageType> {
        match self {
            StateSegment::Unknown => None,
            StateSegment::SensorMeasurements(_) => Some(MessageType::SensorMeasurements),
            StateSegment::CycleMeasurements(_) => Some(MessageType::CycleMeasurements),
            StateSegment::Parameters(_) => Some(MessageType::Parameters),
            StateSegment::ParametersRequest(_) => Some(MessageType::ParametersRequest),
            StateSegment::AlarmLimits(_) => Some(MessageType::AlarmLimits),
            StateSegment::AlarmLimitsRequest(_) => Some(MessageType::AlarmLimitsRequest),
        }
    }
}

impl MessagePayload for StateSegment {
    fn type_code(&self) -> u8 {
        self.kind().map_or(0, MessageType::code)
    }

    fn unknown() -> Self {
        StateSegment::Unknown
    }
}

/// A concrete state struct that can be carried in a [`StateSegment`].
pub trait StateKind: Serialize + DeserializeOwned + Default + Into<StateSegment> {
    const TYPE: MessageType;

    /// Borrow the value if `segment` holds this kind.
    fn from_segment(segment: &StateSegment) -> Option<&Self>;
}

macro_rules! state_kind {
    ($($ty:ident),* $(,)?) => {
        $(
            impl From<$ty> for StateSegment {
                fn from(value: $ty) -> Self {
                    StateSegment::$ty(value)
                }
            }

            impl StateKind for $ty {
                const TYPE: MessageType = MessageType::$ty;

                fn from_segment(segment: &StateSegment) -> Option<&Self> {
                    match segment {
                        StateSegment::$ty(value) => Some(value),
                        _ => None,
                    }
                }
            }
        )*
    };
}

state_kind!(
    SensorMeasurements,
    CycleMeasurements,
    Parameters,
    ParametersRequest,
    AlarmLimits,
    AlarmLimitsRequest,
);

/// The live application state read by the sender and written by the receiver.
pub trait StateStore {
    /// Snapshot of the current value of `kind`, or `None` if the store does
    /// not synchronize that kind.
    fn read(&self, kind: MessageType) -> Option<StateSegment>;

    /// Replace the stored value of the segment's kind.
    fn write(&mut self, segment: StateSegment) -> Result<(), StoreError>;
}

impl<T: StateStore + ?Sized> StateStore for &mut T {
    fn read(&self, kind: MessageType) -> Option<StateSegment> {
        (**self).read(kind)
    }

    fn write(&mut self, segment: StateSegment) -> Result<(), StoreError> {
        (**self).write(segment)
    }
}

/// One value of every state kind.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct States {
    pub sensor_measurements: SensorMeasurements,
    pub cycle_measurements: CycleMeasurements,
    pub parameters: Parameters,
    pub parameters_request: ParametersRequest,
    pub alarm_limits: AlarmLimits,
    pub alarm_limits_request: AlarmLimitsRequest,
}

impl StateStore for States {
    fn read(&self, kind: MessageType) -> Option<StateSegment> {
        Some(match kind {
            MessageType::SensorMeasurements => self.sensor_measurements.into(),
            MessageType::CycleMeasurements => self.cycle_measurements.into(),
            MessageType::Parameters => self.parameters.into(),
            MessageType::ParametersRequest => self.parameters_request.into(),
            MessageType::AlarmLimits => self.alarm_limits.into(),
            MessageType::AlarmLimitsRequest => self.alarm_limits_request.into(),
        })
    }

    fn write(&mut self, segment: StateSegment) -> Result<(), StoreError> {
        match segment {
            StateSegment::Unknown => return Err(StoreError::InvalidType),
            StateSegment::SensorMeasurements(value) => self.sensor_measurements = value,
            StateSegment::CycleMeasurements(value) => self.cycle_measurements = value,
            StateSegment::Parameters(value) => self.parameters = value,
            StateSegment::ParametersRequest(value) => self.parameters_request = value,
            StateSegment::AlarmLimits(value) => self.alarm_limits = value,
            StateSegment::AlarmLimitsRequest(value) => self.alarm_limits_request = value,
        }
        Ok(())
    }
}
