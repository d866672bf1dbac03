//! In-process launch strategy
//!
//! Runs a registered entry point inside the test process, with the ambient
//! process state snapshotted around the call and every stream substituted.
//! Fast, but deliberately built on shared global state; see the crate docs
//! for the concurrency constraint.

use std::io::Read;
use std::panic::{self, AssertUnwindSafe};

use crate::error::{Error, Result};
use crate::locate::{resolve, ResolvedTarget};
use crate::registry::ScriptExit;
use crate::run::result::RunResult;
use crate::run::state::{ArgvGuard, CwdGuard, EnvGuard, LogLevelGuard, PanicHookGuard};
use crate::run::stdio::StdioCapture;
use crate::run::{RunOptions, ScriptRunner};

pub(crate) fn run_inprocess(
    runner: &ScriptRunner,
    command: &str,
    arguments: &[&str],
    options: RunOptions,
    print_result: bool,
) -> Result<RunResult> {
    let entry = match resolve(
        &runner.registry,
        command,
        options.env.as_ref(),
        options.cwd.as_deref(),
    )? {
        ResolvedTarget::EntryPoint(entry) => entry,
        ResolvedTarget::Script { path, .. } => {
            return Err(Error::NotLoadable {
                command: command.to_string(),
                path,
            });
        }
    };

    let mut stdin_content = Vec::new();
    if let Some(mut stdin) = options.stdin {
        stdin.read_to_end(&mut stdin_content)?;
    }

    // Ambient state snapshot. Guards restore in reverse declaration order
    // once the invocation is folded below, on every exit path.
    let _log_guard = LogLevelGuard::reset();
    let _cwd_guard = CwdGuard::change_to(options.cwd.as_deref())?;
    let _env_guard = options.env.as_ref().map(EnvGuard::swap);

    let capture = StdioCapture::install(&stdin_content)?;
    let argv = std::iter::once(command)
        .chain(arguments.iter().copied())
        .map(String::from)
        .collect();
    let _argv_guard = ArgvGuard::substitute(argv);
    let panic_guard = PanicHookGuard::install();

    let outcome = panic::catch_unwind(AssertUnwindSafe(|| entry()));

    let (stdout, mut stderr) = capture.finish()?;

    let returncode = match outcome {
        Ok(Ok(Some(code))) => code,
        Ok(Ok(None)) => 0,
        Ok(Err(ScriptExit::Status(code))) => code,
        Ok(Err(ScriptExit::Clean)) => 0,
        Ok(Err(ScriptExit::Message(message))) => {
            stderr.push_str(&message);
            stderr.push('\n');
            1
        }
        Err(_) => {
            // The descriptors are restored, so this reaches the real
            // stderr, reading as the script's own failure.
            if let Some(report) = panic_guard.take_report() {
                eprintln!("script '{}' panicked at {}", command, report);
            }
            1
        }
    };

    Ok(RunResult::new(returncode, stdout, stderr, print_result))
}
