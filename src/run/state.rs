//! Process-state snapshot guards
//!
//! The in-process strategy works by mutating real process-global state
//! around the entry-point call: working directory, environment, the global
//! log filter, the script-visible argument vector, and the panic hook.
//! Each piece of state is held by a guard whose `Drop` restores the saved
//! value, so restoration happens exactly once on every exit path, normal
//! return or panic.
//!
//! None of this is safe to use concurrently with other code that touches
//! the same globals; callers run one in-process script at a time.

use std::any::Any;
use std::collections::HashMap;
use std::env;
use std::ffi::OsString;
use std::io;
use std::panic;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, OnceLock};

/// Saves the working directory, optionally changes it, restores on drop
pub struct CwdGuard {
    saved: PathBuf,
}

impl CwdGuard {
    /// Snapshot the current directory and change into `dir` if given
    pub fn change_to(dir: Option<&Path>) -> io::Result<Self> {
        let saved = env::current_dir()?;
        if let Some(dir) = dir {
            env::set_current_dir(dir)?;
        }
        Ok(CwdGuard { saved })
    }
}

impl Drop for CwdGuard {
    fn drop(&mut self) {
        if let Err(err) = env::set_current_dir(&self.saved) {
            log::warn!(
                "failed to restore working directory {}: {}",
                self.saved.display(),
                err
            );
        }
    }
}

/// Swaps the whole process environment for a replacement, restores on drop
pub struct EnvGuard {
    saved: Vec<(OsString, OsString)>,
}

impl EnvGuard {
    /// Snapshot the current environment and substitute `replacement`
    /// wholesale
    pub fn swap(replacement: &HashMap<String, String>) -> Self {
        let saved: Vec<(OsString, OsString)> = env::vars_os().collect();
        for (key, _) in &saved {
            env::remove_var(key);
        }
        for (key, value) in replacement {
            env::set_var(key, value);
        }
        EnvGuard { saved }
    }
}

impl Drop for EnvGuard {
    fn drop(&mut self) {
        for (key, _) in env::vars_os().collect::<Vec<_>>() {
            env::remove_var(&key);
        }
        for (key, value) in &self.saved {
            env::set_var(key, value);
        }
    }
}

/// Saves the global log max-level filter, resets it to `Off`, restores on
/// drop
///
/// Resetting to `Off` (the uninitialized default) lets a script configure
/// logging as if it were a fresh process. The installed logger itself
/// cannot be swapped; `log::set_logger` is set-once.
pub struct LogLevelGuard {
    saved: log::LevelFilter,
}

impl LogLevelGuard {
    /// Snapshot the max-level filter and reset it
    pub fn reset() -> Self {
        let saved = log::max_level();
        log::set_max_level(log::LevelFilter::Off);
        LogLevelGuard { saved }
    }
}

impl Drop for LogLevelGuard {
    fn drop(&mut self) {
        log::set_max_level(self.saved);
    }
}

static SCRIPT_ARGV: OnceLock<Mutex<Option<Vec<String>>>> = OnceLock::new();

fn script_argv() -> MutexGuard<'static, Option<Vec<String>>> {
    SCRIPT_ARGV
        .get_or_init(|| Mutex::new(None))
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Argument vector visible to in-process scripts.
///
/// During an in-process run this is `[command, arguments...]` as supplied
/// to the runner; outside one it falls back to the process's own argument
/// vector. Entry points call this where a standalone binary would read
/// `std::env::args()`.
pub fn args() -> Vec<String> {
    script_argv()
        .clone()
        .unwrap_or_else(|| env::args().collect())
}

/// Substitutes the script-visible argument vector, restores on drop
pub struct ArgvGuard {
    saved: Option<Vec<String>>,
}

impl ArgvGuard {
    /// Substitute `argv` as the vector [`args`] reports
    pub fn substitute(argv: Vec<String>) -> Self {
        let saved = script_argv().replace(argv);
        ArgvGuard { saved }
    }
}

impl Drop for ArgvGuard {
    fn drop(&mut self) {
        *script_argv() = self.saved.take();
    }
}

/// Replaces the panic hook with one that records the panic instead of
/// printing it, restores the previous hook on drop
///
/// The default hook would write the panic report into the captured stderr
/// buffer; recording it lets the runner report the failure on the real
/// stderr once the streams are back.
pub struct PanicHookGuard {
    record: Arc<Mutex<Option<String>>>,
    previous: Option<Box<dyn Fn(&panic::PanicHookInfo<'_>) + Sync + Send + 'static>>,
}

impl PanicHookGuard {
    /// Install the recording hook
    pub fn install() -> Self {
        let record = Arc::new(Mutex::new(None));
        let sink = Arc::clone(&record);
        let previous = panic::take_hook();
        panic::set_hook(Box::new(move |info| {
            let location = info
                .location()
                .map(|loc| format!("{}:{}:{}", loc.file(), loc.line(), loc.column()))
                .unwrap_or_else(|| "unknown location".to_string());
            let report = format!("{}: {}", location, payload_message(info.payload()));
            if let Ok(mut slot) = sink.lock() {
                *slot = Some(report);
            }
        }));
        PanicHookGuard {
            record,
            previous: Some(previous),
        }
    }

    /// The recorded panic report, if the script panicked
    pub fn take_report(&self) -> Option<String> {
        self.record
            .lock()
            .ok()
            .and_then(|mut slot| slot.take())
    }
}

impl Drop for PanicHookGuard {
    fn drop(&mut self) {
        if let Some(previous) = self.previous.take() {
            panic::set_hook(previous);
        }
    }
}

fn payload_message(payload: &dyn Any) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    // These tests mutate process globals; the lock keeps them serial.
    fn serial() -> MutexGuard<'static, ()> {
        static LOCK: OnceLock<Mutex<()>> = OnceLock::new();
        LOCK.get_or_init(|| Mutex::new(()))
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    #[test]
    fn test_cwd_guard_restores() {
        let _serial = serial();
        let before = env::current_dir().unwrap();
        let temp_dir = TempDir::new().unwrap();

        {
            let _guard = CwdGuard::change_to(Some(temp_dir.path())).unwrap();
            assert_eq!(
                env::current_dir().unwrap().canonicalize().unwrap(),
                temp_dir.path().canonicalize().unwrap()
            );
        }
        assert_eq!(env::current_dir().unwrap(), before);
    }

    #[test]
    fn test_env_guard_swaps_wholesale() {
        let _serial = serial();
        env::set_var("ENV_GUARD_SENTINEL", "kept");

        let mut replacement = HashMap::new();
        replacement.insert("ENV_GUARD_FRESH".to_string(), "1".to_string());
        {
            let _guard = EnvGuard::swap(&replacement);
            assert!(env::var("ENV_GUARD_SENTINEL").is_err());
            assert_eq!(env::var("ENV_GUARD_FRESH").unwrap(), "1");
        }

        assert_eq!(env::var("ENV_GUARD_SENTINEL").unwrap(), "kept");
        assert!(env::var("ENV_GUARD_FRESH").is_err());
        env::remove_var("ENV_GUARD_SENTINEL");
    }

    #[test]
    fn test_log_level_guard_restores() {
        let _serial = serial();
        log::set_max_level(log::LevelFilter::Warn);
        {
            let _guard = LogLevelGuard::reset();
            assert_eq!(log::max_level(), log::LevelFilter::Off);
            log::set_max_level(log::LevelFilter::Trace);
        }
        assert_eq!(log::max_level(), log::LevelFilter::Warn);
    }

    #[test]
    fn test_argv_substitution() {
        let _serial = serial();
        let process_args: Vec<String> = env::args().collect();

        {
            let _guard =
                ArgvGuard::substitute(vec!["mytool".to_string(), "--verbose".to_string()]);
            assert_eq!(args(), vec!["mytool", "--verbose"]);
        }
        assert_eq!(args(), process_args);
    }

    #[test]
    fn test_panic_hook_records_instead_of_printing() {
        let _serial = serial();
        let guard = PanicHookGuard::install();
        let outcome = panic::catch_unwind(|| panic!("boom {}", 7));
        assert!(outcome.is_err());

        let report = guard.take_report().unwrap();
        assert!(report.contains("boom 7"));
        // One-shot: the report is consumed.
        assert!(guard.take_report().is_none());
    }
}
