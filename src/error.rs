use std::io;
use std::time::Duration;
use thiserror::Error;

/// Failure inside a single host's probe. Never escapes the host boundary.
#[derive(Error, Debug)]
pub enum ProbeError {
    #[error("{what} timed out after {}s", .after.as_secs())]
    Timeout { what: String, after: Duration },

    #[error("failed to run {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },

    #[error("{program} exited with {code}: {stderr}")]
    Command {
        program: String,
        code: String,
        stderr: String,
    },

    #[error("unexpected output from {what}: {detail}")]
    Parse { what: String, detail: String },

    #[error("{0}")]
    Unavailable(String),

    #[error("probe task failed: {0}")]
    Task(String),
}

impl ProbeError {
    pub fn parse<W: Into<String>, D: Into<String>>(what: W, detail: D) -> Self {
        ProbeError::Parse {
            what: what.into(),
            detail: detail.into(),
        }
    }

    pub fn timeout<W: Into<String>>(what: W, after: Duration) -> Self {
        ProbeError::Timeout {
            what: what.into(),
            after,
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, ProbeError::Timeout { .. })
    }
}

pub type ProbeResult<T> = std::result::Result<T, ProbeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timeout_message() {
        let err = ProbeError::timeout("disk query on web01", Duration::from_secs(15));
        assert_eq!(err.to_string(), "disk query on web01 timed out after 15s");
        assert!(err.is_timeout());
    }

    #[test]
    fn test_command_message() {
        let err = ProbeError::Command {
            program: "ssh".to_string(),
            code: "255".to_string(),
            stderr: "Connection refused".to_string(),
        };
        assert_eq!(err.to_string(), "ssh exited with 255: Connection refused");
        assert!(!err.is_timeout());
    }
}
