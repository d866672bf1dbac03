//! Entry-point registry
//!
//! The in-process strategy never spawns anything; it calls a function the
//! test author registered under the command's name, the way an installed
//! package declares its console scripts. This module holds that registry
//! and the signal type entry points use to exit early instead of returning.

use std::sync::Arc;

/// Early-exit request from an entry point
///
/// The analog of a script calling the process-termination primitive rather
/// than returning from its main function.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScriptExit {
    /// Exit with this status code
    Status(i32),
    /// Exit with a message: the message (plus a newline) lands on captured
    /// stderr and the return code is forced to 1
    Message(String),
    /// Exit with no code at all, which counts as success
    Clean,
}

/// What an entry point produces: a normal return, where `None` means code 0,
/// or an early-exit request
pub type EntryResult = std::result::Result<Option<i32>, ScriptExit>;

/// A registered zero-argument entry point
///
/// Panicking inside one is allowed; the in-process runner catches the panic
/// and folds it into a failing [`RunResult`](crate::RunResult).
pub type EntryFn = Arc<dyn Fn() -> EntryResult + Send + Sync>;

/// Named table of command entry points
///
/// Lookup is by exact command name. Registration order is preserved, and
/// when a name is registered more than once the first registration wins.
#[derive(Clone, Default)]
pub struct EntryPointRegistry {
    entries: Vec<(String, EntryFn)>,
}

impl EntryPointRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `entry` under `name`
    pub fn register<F>(&mut self, name: &str, entry: F)
    where
        F: Fn() -> EntryResult + Send + Sync + 'static,
    {
        self.entries.push((name.to_string(), Arc::new(entry)));
    }

    /// Find the first entry registered under `name`
    pub fn lookup(&self, name: &str) -> Option<EntryFn> {
        self.entries
            .iter()
            .find(|(entry_name, _)| entry_name == name)
            .map(|(_, entry)| Arc::clone(entry))
    }

    /// Whether any entry is registered under `name`
    pub fn contains(&self, name: &str) -> bool {
        self.entries.iter().any(|(entry_name, _)| entry_name == name)
    }
}
