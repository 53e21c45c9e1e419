//! Broadcast schedule and backend configuration.

use serde::{Deserialize, Serialize};
use ventlink_protocol::ScheduleEntry;

use crate::states::MessageType;

/// Most entries a backend schedule may hold.
pub const SCHEDULE_MAX_ENTRIES: usize = 32;

/// Firmware broadcast schedule. Sensor measurements occupy every third slot.
pub const DEFAULT_SCHEDULE: [ScheduleEntry<MessageType>; 9] = [
    ScheduleEntry::new(10, MessageType::SensorMeasurements),
    ScheduleEntry::new(10, MessageType::Parameters),
    ScheduleEntry::new(10, MessageType::AlarmLimits),
    ScheduleEntry::new(10, MessageType::SensorMeasurements),
    ScheduleEntry::new(10, MessageType::CycleMeasurements),
    ScheduleEntry::new(10, MessageType::AlarmLimitsRequest),
    ScheduleEntry::new(10, MessageType::SensorMeasurements),
    ScheduleEntry::new(10, MessageType::ParametersRequest),
    ScheduleEntry::new(10, MessageType::CycleMeasurements),
];

/// Settings for a [`crate::Backend`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendConfig {
    /// Broadcast schedule, walked in order.
    pub schedule: Vec<ScheduleEntry<MessageType>>,
}

impl BackendConfig {
    pub fn with_schedule(schedule: impl Into<Vec<ScheduleEntry<MessageType>>>) -> Self {
        Self {
            schedule: schedule.into(),
        }
    }
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self::with_schedule(DEFAULT_SCHEDULE)
    }
}
