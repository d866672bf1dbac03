//! # console-scripts-rs
//!
//! A Rust crate for testing command-line tools by running them in-process
//! or as real subprocesses and asserting on the captured outcome.
//!
//! Test suites hand a [`ScriptRunner`] a command name, arguments, and
//! options (working directory, environment, stdin), and get back a
//! [`RunResult`] with the exit code and the captured stdout/stderr text,
//! uniform across both launch modes:
//!
//! - **In-process**: the command's registered entry point is called inside
//!   the test process, with the standard streams, argument vector, working
//!   directory, environment, and log filter redirected around the call and
//!   restored afterwards. Fast, because nothing is spawned.
//! - **Subprocess**: the command is located on the search path (or in the
//!   working directory) and spawned as a real child process. Isolated, but
//!   slower. Non-executable interpreted source files are routed through
//!   their interpreter transparently.
//!
//! ## Example
//!
//! ```no_run
//! use std::io::Write;
//!
//! use console_scripts_rs::{args, LaunchMode, RunOptions, ScriptRunner};
//!
//! let runner = ScriptRunner::new(LaunchMode::InProcess, std::env::temp_dir())
//!     .register("greet", || {
//!         let name = args().get(1).cloned().unwrap_or_default();
//!         writeln!(std::io::stdout(), "hello {}", name).unwrap();
//!         Ok(None)
//!     });
//!
//! let result = runner
//!     .run("greet", &["world"], RunOptions::new())
//!     .unwrap();
//! assert!(result.success);
//! assert_eq!(result.stdout, "hello world\n");
//! ```
//!
//! ## Concurrency
//!
//! The in-process mode mutates real process-global state for the duration
//! of the call, with snapshot/restore guards as the safety net. It must
//! not run concurrently with anything else in the process that touches the
//! environment, working directory, standard streams, log filter, or the
//! script argument vector; run one in-process script at a time. Subprocess
//! runs have no such constraint.

pub mod error;
pub mod locate;
pub mod mode;
pub mod registry;
pub mod run;

pub use error::{Error, Result};
pub use locate::{locate, resolve, ResolvedTarget, ScriptKind};
pub use mode::{resolve_launch_modes, LaunchMode};
pub use registry::{EntryFn, EntryPointRegistry, EntryResult, ScriptExit};
pub use run::{args, RunOptions, RunResult, ScriptRunner};
