use crate::models::level::Level;
use serde::{Serialize, Serializer};
use std::fmt;

/// Observed state of a named service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServiceStatus {
    Running,
    Stopped,
    NotFound,
    Other(String),
}

impl ServiceStatus {
    /// Maps a status word to a variant. Unknown words are kept verbatim.
    pub fn parse(status: &str) -> Self {
        match status.trim().to_lowercase().as_str() {
            "running" => ServiceStatus::Running,
            "stopped" => ServiceStatus::Stopped,
            "not-found" | "notfound" => ServiceStatus::NotFound,
            _ => ServiceStatus::Other(status.trim().to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            ServiceStatus::Running => "running",
            ServiceStatus::Stopped => "stopped",
            ServiceStatus::NotFound => "not-found",
            ServiceStatus::Other(status) => status,
        }
    }
}

impl fmt::Display for ServiceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for ServiceStatus {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

/// Unclassified result of one service lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawService {
    pub name: String,
    pub status: ServiceStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ServiceRecord {
    pub name: String,
    pub status: ServiceStatus,
    pub level: Level,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_known_statuses() {
        assert_eq!(ServiceStatus::parse("Running"), ServiceStatus::Running);
        assert_eq!(ServiceStatus::parse("stopped"), ServiceStatus::Stopped);
        assert_eq!(ServiceStatus::parse("not-found"), ServiceStatus::NotFound);
    }

    #[test]
    fn test_parse_keeps_unknown_status() {
        assert_eq!(
            ServiceStatus::parse(" StartPending "),
            ServiceStatus::Other("StartPending".to_string())
        );
    }

    #[test]
    fn test_status_serializes_as_string() {
        let json = serde_json::to_string(&ServiceStatus::NotFound).unwrap();
        assert_eq!(json, "\"not-found\"");
        let json = serde_json::to_string(&ServiceStatus::Other("reloading".into())).unwrap();
        assert_eq!(json, "\"reloading\"");
    }
}
