//! Dual-mode script execution
//!
//! [`ScriptRunner`] executes a command under a fixed [`LaunchMode`] and
//! normalizes either path into one [`RunResult`] shape.

#[cfg(unix)]
mod inprocess;
pub mod result;
pub mod state;
#[cfg(unix)]
mod stdio;
mod subprocess;

pub use result::RunResult;
pub use state::args;

use std::collections::HashMap;
use std::fmt;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::Command;

use crate::error::Result;
use crate::mode::LaunchMode;
use crate::registry::{EntryPointRegistry, EntryResult};

/// Per-run options for [`ScriptRunner::run`]
#[derive(Default)]
pub struct RunOptions {
    /// Replacement environment for the run, substituted wholesale
    pub(crate) env: Option<HashMap<String, String>>,
    /// Directory to change into before running
    pub(crate) cwd: Option<PathBuf>,
    /// Source whose content becomes the script's standard input
    pub(crate) stdin: Option<Box<dyn Read>>,
    /// Per-run override of the runner's print-result default
    pub(crate) print_result: Option<bool>,
    /// Hook applied to the spawn command right before launch; ignored by
    /// in-process runs
    pub(crate) spawn_with: Option<Box<dyn FnOnce(&mut Command)>>,
}

impl RunOptions {
    /// Options with nothing set
    pub fn new() -> Self {
        Self::default()
    }

    /// Substitute the entire environment for the run
    pub fn env(mut self, env: HashMap<String, String>) -> Self {
        self.env = Some(env);
        self
    }

    /// Change into `dir` before running
    pub fn cwd(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cwd = Some(dir.into());
        self
    }

    /// Feed the content of `source` to the script as standard input
    pub fn stdin(mut self, source: impl Read + 'static) -> Self {
        self.stdin = Some(Box::new(source));
        self
    }

    /// Override the runner's print-result default for this run
    pub fn print_result(mut self, print: bool) -> Self {
        self.print_result = Some(print);
        self
    }

    /// Adjust the spawn command before it launches, inheriting its full
    /// option surface. Child-process runs only.
    pub fn spawn_with(mut self, hook: impl FnOnce(&mut Command) + 'static) -> Self {
        self.spawn_with = Some(Box::new(hook));
        self
    }
}

impl fmt::Debug for RunOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RunOptions")
            .field("env", &self.env)
            .field("cwd", &self.cwd)
            .field("stdin", &self.stdin.as_ref().map(|_| "..."))
            .field("print_result", &self.print_result)
            .field("spawn_with", &self.spawn_with.as_ref().map(|_| "..."))
            .finish()
    }
}

/// Runs command-line scripts under test in a fixed launch mode
///
/// Construction fixes the mode for the runner's lifetime; the registry of
/// in-process entry points and the print-result default are filled in
/// builder-style.
pub struct ScriptRunner {
    launch_mode: LaunchMode,
    rootdir: PathBuf,
    print_result: bool,
    pub(crate) registry: EntryPointRegistry,
}

impl ScriptRunner {
    /// Create a runner that launches scripts in `launch_mode`, anchored at
    /// `rootdir` (typically a per-test scratch directory).
    pub fn new(launch_mode: LaunchMode, rootdir: impl Into<PathBuf>) -> Self {
        ScriptRunner {
            launch_mode,
            rootdir: rootdir.into(),
            print_result: true,
            registry: EntryPointRegistry::new(),
        }
    }

    /// Set whether results report themselves by default
    pub fn print_result(mut self, print: bool) -> Self {
        self.print_result = print;
        self
    }

    /// Register `entry` as the in-process entry point for `name`
    pub fn register<F>(mut self, name: &str, entry: F) -> Self
    where
        F: Fn() -> EntryResult + Send + Sync + 'static,
    {
        self.registry.register(name, entry);
        self
    }

    /// The mode this runner launches scripts in
    pub fn launch_mode(&self) -> LaunchMode {
        self.launch_mode
    }

    /// The directory this runner is anchored at
    pub fn rootdir(&self) -> &Path {
        &self.rootdir
    }

    /// Run `command` with `arguments` and package the outcome.
    ///
    /// Only setup failures (an unresolvable command, an invalid working
    /// directory) surface as `Err`; whatever the script itself does is
    /// folded into the returned [`RunResult`].
    pub fn run(&self, command: &str, arguments: &[&str], options: RunOptions) -> Result<RunResult> {
        let print_result = options.print_result.unwrap_or(self.print_result);
        if print_result {
            let mut header = format!("# Running console script: {}", command);
            for argument in arguments {
                header.push(' ');
                header.push_str(argument);
            }
            println!("{}", header);
        }

        match self.launch_mode {
            #[cfg(unix)]
            LaunchMode::InProcess => {
                inprocess::run_inprocess(self, command, arguments, options, print_result)
            }
            #[cfg(not(unix))]
            LaunchMode::InProcess => Err(crate::error::Error::Unsupported),
            LaunchMode::Subprocess => {
                subprocess::run_subprocess(command, arguments, options, print_result)
            }
        }
    }
}

impl fmt::Debug for ScriptRunner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<ScriptRunner {}>", self.launch_mode)
    }
}
