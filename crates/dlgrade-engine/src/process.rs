//! Child process execution with an optional timeout.

use std::path::Path;
use std::process::{Output, Stdio};
use std::time::Duration;

use tokio::io::AsyncReadExt;
use tokio::process::Command;

/// Why a child process could not be run to completion.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProcessError {
    #[error("empty command")]
    EmptyCommand,

    #[error("{0}: command not found")]
    NotFound(String),

    #[error("failed to run {program}: {reason}")]
    Spawn { program: String, reason: String },

    #[error("timed out after {0} seconds")]
    TimedOut(u64),
}

/// A command line plus the environment it runs in.
pub struct ProcessSpec<'a> {
    /// Executable followed by its leading arguments.
    pub command: &'a [String],
    pub args: Vec<&'a std::ffi::OsStr>,
    pub work_dir: Option<&'a Path>,
    /// Directory exported as `TMPDIR` to the child.
    pub scratch_dir: Option<&'a Path>,
    pub capture_stdout: bool,
    pub timeout_secs: u64,
}

/// Run a process to completion. Stderr is always discarded.
///
/// The child leads its own process group. Once it exits, times out, or the
/// returned future is dropped, the whole group is killed, so helpers it left
/// behind neither outlive the scratch directory nor hold stdout open.
pub async fn run(spec: ProcessSpec<'_>) -> Result<Output, ProcessError> {
    let (exe, leading) = spec.command.split_first().ok_or(ProcessError::EmptyCommand)?;

    let mut command = Command::new(exe);
    command
        .args(leading)
        .args(&spec.args)
        .stdin(Stdio::null())
        .stdout(if spec.capture_stdout {
            Stdio::piped()
        } else {
            Stdio::null()
        })
        .stderr(Stdio::null())
        .kill_on_drop(true);
    #[cfg(unix)]
    command.process_group(0);
    if let Some(dir) = spec.work_dir {
        command.current_dir(dir);
    }
    if let Some(dir) = spec.scratch_dir {
        command.env("TMPDIR", dir);
    }

    let mut child = command.spawn().map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            ProcessError::NotFound(exe.clone())
        } else {
            ProcessError::Spawn {
                program: exe.clone(),
                reason: e.to_string(),
            }
        }
    })?;
    let group = ProcessGroup(child.id());

    // Read on a separate task: the pipe only reaches EOF once every holder is gone.
    let stdout = child.stdout.take();
    let reader = tokio::spawn(async move {
        let mut buf = Vec::new();
        if let Some(mut pipe) = stdout {
            pipe.read_to_end(&mut buf).await?;
        }
        Ok::<_, std::io::Error>(buf)
    });

    let waited = if spec.timeout_secs > 0 {
        match tokio::time::timeout(Duration::from_secs(spec.timeout_secs), child.wait()).await {
            Ok(waited) => waited,
            Err(_) => {
                drop(group);
                reader.abort();
                return Err(ProcessError::TimedOut(spec.timeout_secs));
            }
        }
    } else {
        child.wait().await
    };
    let status = waited.map_err(|e| spawn_error(exe, e.to_string()))?;
    drop(group);

    let stdout = reader
        .await
        .map_err(|e| spawn_error(exe, e.to_string()))?
        .map_err(|e| spawn_error(exe, e.to_string()))?;

    Ok(Output {
        status,
        stdout,
        stderr: Vec::new(),
    })
}

fn spawn_error(exe: &str, reason: String) -> ProcessError {
    ProcessError::Spawn {
        program: exe.to_string(),
        reason,
    }
}

/// Kills every process in the group when dropped.
struct ProcessGroup(Option<u32>);

impl Drop for ProcessGroup {
    fn drop(&mut self) {
        if let Some(pgid) = self.0.take() {
            kill_group(pgid);
        }
    }
}

#[cfg(unix)]
fn kill_group(pgid: u32) {
    // ESRCH just means the group already emptied.
    // SAFETY: killpg takes no pointers; an invalid pgid only yields an error code.
    unsafe {
        libc::killpg(pgid as libc::pid_t, libc::SIGKILL);
    }
}

#[cfg(not(unix))]
fn kill_group(_pgid: u32) {}

/// Resolve `path` against the current directory so it survives a `current_dir` change.
pub fn absolute(path: &Path) -> std::path::PathBuf {
    if path.is_absolute() {
        return path.to_path_buf();
    }
    std::env::current_dir()
        .map(|cwd| cwd.join(path))
        .unwrap_or_else(|_| path.to_path_buf())
}
