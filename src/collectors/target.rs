/// Names that always mean "this machine", compared case-insensitively.
const LOCAL_ALIASES: [&str; 4] = ["localhost", "127.0.0.1", "::1", "."];

/// Address used for the reachability check of a local target.
const LOCAL_ADDRESS: &str = "localhost";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionContext {
    Local,
    Remote,
}

/// A configured host resolved to where and how its sub-probes run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    pub host: String,
    pub address: String,
    pub context: ExecutionContext,
}

impl Target {
    pub fn resolve(host: &str, local_name: Option<&str>) -> Self {
        let host = host.trim();
        if is_local(host, local_name) {
            Target {
                host: host.to_string(),
                address: LOCAL_ADDRESS.to_string(),
                context: ExecutionContext::Local,
            }
        } else {
            Target {
                host: host.to_string(),
                address: host.to_string(),
                context: ExecutionContext::Remote,
            }
        }
    }

    pub fn is_local(&self) -> bool {
        self.context == ExecutionContext::Local
    }
}

pub fn is_local(host: &str, local_name: Option<&str>) -> bool {
    if LOCAL_ALIASES.iter().any(|alias| alias.eq_ignore_ascii_case(host)) {
        return true;
    }
    match local_name {
        Some(name) if !name.is_empty() => {
            name.eq_ignore_ascii_case(host) || short_name(name).eq_ignore_ascii_case(host)
        }
        _ => false,
    }
}

fn short_name(name: &str) -> &str {
    name.split('.').next().unwrap_or(name)
}
