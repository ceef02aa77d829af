// Process execution seam between the bridge and the OS
use super::error::{AdbError, AdbResult};
use std::path::Path;
use std::process::{Command, Stdio};

/// Runs one external process to completion and returns its stdout.
///
/// A non-zero exit must surface as [`AdbError::CommandFailed`] with stdout
/// and stderr combined in `output`.
pub trait ProcessRunner: Send + Sync {
    fn run(&self, program: &Path, args: &[String]) -> AdbResult<Vec<u8>>;
}

/// Spawns real processes with `std::process::Command`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemRunner {
    suppress_window: bool,
}

impl SystemRunner {
    pub fn new(suppress_window: bool) -> Self {
        Self { suppress_window }
    }
}

impl ProcessRunner for SystemRunner {
    fn run(&self, program: &Path, args: &[String]) -> AdbResult<Vec<u8>> {
        let command = describe_command(program, args);
        log::debug!("exec: {command}");

        let mut cmd = Command::new(program);
        cmd.args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        apply_window_policy(&mut cmd, self.suppress_window);

        let output = cmd.output().map_err(|source| AdbError::Spawn {
            command: command.clone(),
            source,
        })?;

        if output.status.success() {
            return Ok(output.stdout);
        }

        let mut combined = output.stdout;
        combined.extend_from_slice(&output.stderr);
        let err = AdbError::CommandFailed {
            command,
            status: output.status.to_string(),
            output: String::from_utf8_lossy(&combined).trim().to_string(),
        };
        log::warn!("{err}");
        Err(err)
    }
}

#[cfg(windows)]
fn apply_window_policy(cmd: &mut Command, suppress: bool) {
    use std::os::windows::process::CommandExt;
    const CREATE_NO_WINDOW: u32 = 0x0800_0000;
    if suppress {
        cmd.creation_flags(CREATE_NO_WINDOW);
    }
}

#[cfg(not(windows))]
fn apply_window_policy(_cmd: &mut Command, _suppress: bool) {}

/// Render an argv the way it would be typed in a shell, for logs and errors.
pub fn describe_command(program: &Path, args: &[String]) -> String {
    let mut line = program.display().to_string();
    for arg in args {
        line.push(' ');
        line.push_str(arg);
    }
    line
}
