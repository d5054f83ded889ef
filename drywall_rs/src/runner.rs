//! jscpd subprocess invocation.
//!
//! Runs `npx jscpd@<version>` with the built argument list and decides
//! whether the exit was a real failure. jscpd signals "completed, and
//! duplicates exist" with a non-zero exit whose stderr mentions the clones
//! it found - that convention is reclassified as success here.

use std::process::Stdio;
use std::time::Duration;

use thiserror::Error;
use tokio::process::Command;
use tracing::debug;

/// jscpd version used when the config carries no `jscpdVersion` override.
pub const DEFAULT_JSCPD_VERSION: &str = "4.0.8";

/// File jscpd's JSON reporter writes inside the `--output` directory.
pub const REPORT_FILE_NAME: &str = "jscpd-report.json";

/// Bound on a single detector run. jscpd gives no liveness signal, so a run
/// exceeding this is killed and reported as a timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(300);

/// Compatibility shim: jscpd exits non-zero when clones were found, with
/// this marker in its diagnostics. Not a general error-suppression pattern -
/// only this exact convention is forgiven.
const CLONES_FOUND_MARKER: &str = "Clone found";

#[derive(Debug, Error)]
pub enum DetectorError {
    /// The process could not be launched or awaited at all.
    #[error("failed to run jscpd: {0}")]
    Spawn(#[from] std::io::Error),
    /// jscpd exited with a real failure; carries its diagnostic text.
    #[error("jscpd failed: {0}")]
    Failed(String),
    /// The run exceeded the configured bound and was killed.
    #[error("jscpd timed out after {}s", .0.as_secs())]
    TimedOut(Duration),
}

/// Run `npx jscpd@<version>` with the given arguments, waiting at most
/// `timeout`. The JSON report lands in the `--output` directory already
/// present in `args`; reading it is the caller's job.
pub async fn run_jscpd(
    version: &str,
    args: &[String],
    timeout: Duration,
) -> Result<(), DetectorError> {
    debug!("Running jscpd@{} with args: {:?}", version, args);

    let mut command = Command::new("npx");
    command
        .arg(format!("jscpd@{version}"))
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    let output = match tokio::time::timeout(timeout, command.output()).await {
        Ok(result) => result?,
        Err(_) => return Err(DetectorError::TimedOut(timeout)),
    };

    let stderr = String::from_utf8_lossy(&output.stderr);
    classify_exit(output.status.success(), output.status.code(), &stderr)
}

/// Decide success vs failure for a finished jscpd process.
fn classify_exit(success: bool, code: Option<i32>, stderr: &str) -> Result<(), DetectorError> {
    if success || stderr.contains(CLONES_FOUND_MARKER) {
        return Ok(());
    }

    let message = if stderr.trim().is_empty() {
        match code {
            Some(code) => format!("jscpd exited with status {code}"),
            None => "jscpd was terminated by a signal".to_string(),
        }
    } else {
        stderr.trim_end().to_string()
    };
    Err(DetectorError::Failed(message))
}
