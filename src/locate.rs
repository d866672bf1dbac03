//! Script location and classification
//!
//! Maps a command string to something the runner can execute: a registered
//! entry point, or a file found on the executable search path or in the
//! working directory.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::registry::{EntryFn, EntryPointRegistry};

/// How a located script file should be launched
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScriptKind {
    /// Invoke the file directly
    Executable,
    /// Interpretable source with no execute bit; route through its
    /// interpreter
    Source,
}

/// A command resolved to something executable
pub enum ResolvedTarget {
    /// A registered entry-point callable, runnable in-process
    EntryPoint(EntryFn),
    /// A file on disk, runnable as a child process
    Script { path: PathBuf, kind: ScriptKind },
}

/// Locate `command` on the executable search path or in the working
/// directory.
///
/// When `env` is a replacement environment carrying its own `PATH`, the
/// search is restricted to that value. A command not found on the search
/// path still resolves if a same-named file exists directly under `cwd`
/// (or the process working directory); that fallback is a plain existence
/// check, so a non-executable file there resolves too.
pub fn locate(
    command: &str,
    env: Option<&HashMap<String, String>>,
    cwd: Option<&Path>,
) -> Result<PathBuf> {
    let work_dir = match cwd {
        Some(dir) => dir.to_path_buf(),
        None => std::env::current_dir()?,
    };

    let found = match env.and_then(|vars| vars.get("PATH")) {
        Some(search_path) => which::which_in(command, Some(search_path), &work_dir),
        None => which::which(command),
    };
    if let Ok(path) = found {
        return Ok(path);
    }

    let candidate = work_dir.join(command);
    if candidate.exists() {
        return Ok(candidate);
    }

    Err(Error::CommandNotFound {
        command: command.to_string(),
    })
}

/// Classify a located file.
///
/// A file is interpreted [`Source`](ScriptKind::Source) iff its owner
/// execute bit is clear and its extension has a known interpreter;
/// everything else is invoked directly. Only the child-process strategy
/// cares about the distinction.
#[cfg(unix)]
pub fn classify(path: &Path) -> ScriptKind {
    use std::os::unix::fs::PermissionsExt;

    if let Ok(metadata) = std::fs::metadata(path) {
        let owner_exec = metadata.permissions().mode() & 0o100 != 0;
        if !owner_exec && interpreter_candidates(path).is_some() {
            return ScriptKind::Source;
        }
    }
    ScriptKind::Executable
}

/// Classify a located file. Without Unix permission bits every file is
/// invoked directly.
#[cfg(not(unix))]
pub fn classify(_path: &Path) -> ScriptKind {
    ScriptKind::Executable
}

/// Interpreter names to try for a source file, by extension
fn interpreter_candidates(path: &Path) -> Option<&'static [&'static str]> {
    match path.extension().and_then(|ext| ext.to_str())? {
        "py" => Some(&["python3", "python"]),
        "sh" => Some(&["sh"]),
        _ => None,
    }
}

/// Resolve the interpreter to run `path` through, if its extension names
/// one that exists on the search path.
pub fn interpreter_for(path: &Path) -> Option<PathBuf> {
    interpreter_candidates(path)?
        .iter()
        .find_map(|name| which::which(name).ok())
}

/// Resolve `command` to a runnable target: the entry-point registry first,
/// the filesystem second.
pub fn resolve(
    registry: &EntryPointRegistry,
    command: &str,
    env: Option<&HashMap<String, String>>,
    cwd: Option<&Path>,
) -> Result<ResolvedTarget> {
    if let Some(entry) = registry.lookup(command) {
        log::debug!("resolved '{}' to a registered entry point", command);
        return Ok(ResolvedTarget::EntryPoint(entry));
    }

    let path = locate(command, env, cwd)?;
    let kind = classify(&path);
    log::debug!("resolved '{}' to {} ({:?})", command, path.display(), kind);
    Ok(ResolvedTarget::Script { path, kind })
}
