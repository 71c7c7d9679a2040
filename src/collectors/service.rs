use crate::error::{ProbeError, ProbeResult};
use crate::models::ServiceStatus;
use regex::Regex;
use std::sync::OnceLock;

fn unit_name_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[A-Za-z0-9@._:-]+$").expect("valid unit name regex"))
}

/// Service names are passed through a remote shell, so only plain unit names are allowed.
pub fn is_valid_service_name(name: &str) -> bool {
    unit_name_regex().is_match(name)
}

pub fn systemctl_args(name: &str) -> Vec<String> {
    vec![
        "show".to_string(),
        "--property=LoadState,ActiveState".to_string(),
        name.to_string(),
    ]
}

/// Maps `systemctl show` properties to a status.
///
/// `LoadState=not-found` wins; otherwise `active` is running, `inactive` and
/// `failed` are stopped and any transitional state is kept as-is.
pub fn parse_systemctl_show(output: &str) -> ProbeResult<ServiceStatus> {
    let mut load_state = None;
    let mut active_state = None;

    for line in output.lines() {
        if let Some((key, value)) = line.trim().split_once('=') {
            match key {
                "LoadState" => load_state = Some(value.trim()),
                "ActiveState" => active_state = Some(value.trim()),
                _ => {}
            }
        }
    }

    if load_state == Some("not-found") {
        return Ok(ServiceStatus::NotFound);
    }

    match active_state {
        Some("active") => Ok(ServiceStatus::Running),
        Some("inactive") | Some("failed") => Ok(ServiceStatus::Stopped),
        Some(other) if !other.is_empty() => Ok(ServiceStatus::Other(other.to_string())),
        _ => Err(ProbeError::parse("systemctl show", "no ActiveState property")),
    }
}
