use crate::error::{ProbeError, ProbeResult};
use log::debug;
use std::process::Stdio;
use std::time::Instant;
use tokio::process::Command;

#[derive(Debug, Clone)]
pub struct CommandOutput {
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }

    /// Turns a non-zero exit into a `ProbeError::Command`.
    pub fn into_stdout(self, program: &str) -> ProbeResult<String> {
        if self.success() {
            return Ok(self.stdout);
        }
        Err(ProbeError::Command {
            program: program.to_string(),
            code: self
                .code
                .map(|code| code.to_string())
                .unwrap_or_else(|| "signal".to_string()),
            stderr: self.stderr.trim().to_string(),
        })
    }
}

/// Runs `program` to completion. The child is killed if this future is dropped,
/// so callers bound it with `tokio::time::timeout`.
pub async fn run(program: &str, args: &[String]) -> ProbeResult<CommandOutput> {
    let start = Instant::now();
    let output = Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .kill_on_drop(true)
        .output()
        .await
        .map_err(|source| ProbeError::Spawn {
            program: program.to_string(),
            source,
        })?;

    debug!(
        "{} {} took: {} ms",
        program,
        args.join(" "),
        start.elapsed().as_millis()
    );

    Ok(CommandOutput {
        code: output.status.code(),
        stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
        stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
    })
}
