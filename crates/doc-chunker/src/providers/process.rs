//! Running external tools under a time limit

use std::fs::File;
use std::io;
use std::path::Path;
use std::process::{Command, Stdio};
use std::time::Duration;
use wait_timeout::ChildExt;

/// Exit state of a finished tool
#[derive(Debug)]
pub(crate) struct ToolRun {
    pub success: bool,
    pub stderr: String,
}

/// Run `command` to completion, killing it once `limit` elapses
///
/// Output goes to files, never pipes, so a chatty tool cannot block on a full
/// buffer while we wait. stderr is captured in `scratch`. Returns `Ok(None)`
/// when the tool was killed.
pub(crate) fn run_with_limit(
    command: &mut Command,
    scratch: &Path,
    limit: Option<Duration>,
) -> io::Result<Option<ToolRun>> {
    let stderr_path = scratch.join("stderr.log");
    let stderr_file = File::create(&stderr_path)?;

    let mut child = command
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::from(stderr_file))
        .spawn()?;

    let status = match limit {
        Some(limit) => match child.wait_timeout(limit)? {
            Some(status) => status,
            None => {
                let _ = child.kill();
                let _ = child.wait();
                return Ok(None);
            }
        },
        None => child.wait()?,
    };

    let stderr = std::fs::read_to_string(&stderr_path).unwrap_or_default();
    Ok(Some(ToolRun {
        success: status.success(),
        stderr: stderr.trim().to_string(),
    }))
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use std::time::Instant;

    #[test]
    fn test_stuck_tool_is_killed() {
        let dir = tempfile::tempdir().unwrap();
        let start = Instant::now();

        let run = run_with_limit(
            Command::new("sleep").arg("30"),
            dir.path(),
            Some(Duration::from_millis(200)),
        )
        .unwrap();

        assert!(run.is_none());
        assert!(start.elapsed() < Duration::from_secs(10));
    }

    #[test]
    fn test_finished_tool_reports_stderr() {
        let dir = tempfile::tempdir().unwrap();
        let run = run_with_limit(
            Command::new("sh").args(["-c", "echo broken >&2; exit 3"]),
            dir.path(),
            Some(Duration::from_secs(10)),
        )
        .unwrap()
        .unwrap();

        assert!(!run.success);
        assert_eq!(run.stderr, "broken");
    }
}
