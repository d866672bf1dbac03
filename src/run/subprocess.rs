//! Child-process launch strategy
//!
//! Spawns the located script as a real child process. Slower than running
//! in-process but strictly isolated; nothing in the parent is touched.

use std::io::{Read, Write};
use std::process::{Command, ExitStatus, Stdio};

use crate::error::Result;
use crate::locate::{classify, interpreter_for, locate, ScriptKind};
use crate::run::result::RunResult;
use crate::run::RunOptions;

pub(crate) fn run_subprocess(
    command: &str,
    arguments: &[&str],
    options: RunOptions,
    print_result: bool,
) -> Result<RunResult> {
    // Drain the stdin source up front; the child gets it as one blob.
    let stdin_content = match options.stdin {
        Some(mut source) => {
            let mut content = Vec::new();
            source.read_to_end(&mut content)?;
            Some(content)
        }
        None => None,
    };

    let script_path = locate(command, options.env.as_ref(), options.cwd.as_deref())?;

    let mut child_command = match classify(&script_path) {
        ScriptKind::Source => match interpreter_for(&script_path) {
            Some(interpreter) => {
                let mut child_command = Command::new(interpreter);
                child_command.arg(&script_path);
                child_command
            }
            // No interpreter on the search path: invoke the file directly
            // and let the OS error surface.
            None => Command::new(&script_path),
        },
        ScriptKind::Executable => Command::new(&script_path),
    };
    child_command.args(arguments);

    if let Some(env) = &options.env {
        child_command.env_clear().envs(env);
    }
    if let Some(cwd) = &options.cwd {
        child_command.current_dir(cwd);
    }
    child_command.stdout(Stdio::piped()).stderr(Stdio::piped());
    if stdin_content.is_some() {
        child_command.stdin(Stdio::piped());
    }

    // The caller's hook goes last so it can adjust anything above.
    if let Some(spawn_with) = options.spawn_with {
        spawn_with(&mut child_command);
    }

    log::debug!("spawning {:?}", child_command);
    let mut child = child_command.spawn()?;
    if let Some(content) = stdin_content {
        if let Some(mut stdin) = child.stdin.take() {
            stdin.write_all(&content)?;
        }
    }
    let output = child.wait_with_output()?;

    Ok(RunResult::new(
        exit_code(&output.status),
        normalize_newlines(&output.stdout),
        normalize_newlines(&output.stderr),
        print_result,
    ))
}

/// Child exit code; a signal-terminated child surfaces the negated signal
fn exit_code(status: &ExitStatus) -> i32 {
    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return -signal;
        }
    }
    status.code().unwrap_or(1)
}

/// Decode captured bytes as text with CRLF translated to LF
fn normalize_newlines(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).replace("\r\n", "\n")
}
