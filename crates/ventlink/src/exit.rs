use std::fmt;
use std::io;

use ventlink_backend::BackendError;

pub const SUCCESS: i32 = 0;
pub const FAILURE: i32 = 1;
pub const DATA_INVALID: i32 = 60;
pub const USAGE: i32 = 64;
pub const INTERNAL: i32 = 125;

pub type CliResult<T> = Result<T, CliError>;

#[derive(Debug)]
pub struct CliError {
    pub code: i32,
    pub message: String,
}

impl CliError {
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn usage(message: impl Into<String>) -> Self {
        Self::new(USAGE, message)
    }

    pub fn data(message: impl Into<String>) -> Self {
        Self::new(DATA_INVALID, message)
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

pub fn io_error(context: &str, err: io::Error) -> CliError {
    let code = match err.kind() {
        io::ErrorKind::NotFound | io::ErrorKind::PermissionDenied => FAILURE,
        io::ErrorKind::InvalidData | io::ErrorKind::UnexpectedEof => DATA_INVALID,
        _ => INTERNAL,
    };
    CliError::new(code, format!("{context}: {err}"))
}

pub fn backend_error(context: &str, err: BackendError) -> CliError {
    match err {
        BackendError::Receive(_) | BackendError::Store(_) => {
            CliError::data(format!("{context}: {err}"))
        }
        BackendError::Schedule(_) => CliError::usage(format!("{context}: {err}")),
        BackendError::Transport(_) => CliError::new(FAILURE, format!("{context}: {err}")),
        BackendError::Send(_) => CliError::new(INTERNAL, format!("{context}: {err}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ventlink_backend::StoreError;
    use ventlink_protocol::ScheduleError;

    #[test]
    fn backend_errors_map_to_exit_codes() {
        assert_eq!(
            backend_error("x", BackendError::from(ScheduleError::Empty)).code,
            USAGE
        );
        assert_eq!(
            backend_error("x", BackendError::from(StoreError::InvalidType)).code,
            DATA_INVALID
        );
    }

    #[test]
    fn io_error_keeps_context() {
        let err = io_error("reading schedule", io::Error::from(io::ErrorKind::NotFound));
        assert_eq!(err.code, FAILURE);
        assert!(err.message.starts_with("reading schedule: "));
    }
}
