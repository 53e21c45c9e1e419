use std::path::Path;

use serde::Deserialize;
use ventlink_backend::{BackendConfig, MessageType};
use ventlink_protocol::ScheduleEntry;

use crate::exit::{io_error, CliError, CliResult};

/// A schedule file holds either a bare entry list or a full backend config.
#[derive(Deserialize)]
#[serde(untagged)]
enum ConfigFile {
    Schedule(Vec<ScheduleEntry<MessageType>>),
    Backend(BackendConfig),
}

/// Load a backend config, falling back to the firmware default.
pub fn load(path: Option<&Path>) -> CliResult<BackendConfig> {
    let Some(path) = path else {
        return Ok(BackendConfig::default());
    };
    let text = std::fs::read_to_string(path)
        .map_err(|err| io_error(&format!("failed reading {}", path.display()), err))?;
    let config = parse(&text)
        .map_err(|err| CliError::usage(format!("invalid config {}: {err}", path.display())))?;
    tracing::debug!(path = %path.display(), entries = config.schedule.len(), "config loaded");
    Ok(config)
}

fn parse(text: &str) -> serde_json::Result<BackendConfig> {
    Ok(match serde_json::from_str(text)? {
        ConfigFile::Schedule(schedule) => BackendConfig::with_schedule(schedule),
        ConfigFile::Backend(config) => config,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_bare_schedule() {
        let config = parse(r#"[{"interval": 10, "kind": "sensor_measurements"}]"#).unwrap();
        assert_eq!(
            config.schedule,
            [ScheduleEntry::new(10, MessageType::SensorMeasurements)]
        );
    }

    #[test]
    fn parses_backend_config() {
        let config =
            parse(r#"{"schedule": [{"interval": 3, "kind": "alarm_limits"}]}"#).unwrap();
        assert_eq!(
            config.schedule,
            [ScheduleEntry::new(3, MessageType::AlarmLimits)]
        );
    }

    #[test]
    fn rejects_unknown_kind() {
        assert!(parse(r#"[{"interval": 10, "kind": "ping"}]"#).is_err());
    }

    #[test]
    fn missing_path_is_default() {
        assert_eq!(load(None).unwrap(), BackendConfig::default());
    }
}
