//! Tests for running the same logical test once per launch mode
#![cfg(unix)]

use std::fs;
use std::io::{self, Write};
use std::os::unix::fs::PermissionsExt;
use std::sync::{Mutex, MutexGuard, OnceLock};

use console_scripts_rs::{
    resolve_launch_modes, LaunchMode, RunOptions, ScriptExit, ScriptRunner,
};
use tempfile::TempDir;

// The in-process half of each loop touches process globals.
fn serial() -> MutexGuard<'static, ()> {
    static LOCK: OnceLock<Mutex<()>> = OnceLock::new();
    LOCK.get_or_init(|| Mutex::new(()))
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// A runner per mode for a command that exists both as a registered entry
/// point and as an executable script in `temp_dir`.
fn dual_runner(mode: LaunchMode, temp_dir: &TempDir) -> ScriptRunner {
    ScriptRunner::new(mode, temp_dir.path())
        .print_result(false)
        .register("shared-tool", || {
            writeln!(io::stdout(), "shared output").unwrap();
            Ok(None)
        })
        .register("shared-failer", || Err(ScriptExit::Status(5)))
}

fn write_script(temp_dir: &TempDir, name: &str, content: &str) {
    let path = temp_dir.path().join(name);
    fs::write(&path, content).unwrap();
    let mut perms = fs::metadata(&path).unwrap().permissions();
    perms.set_mode(0o755);
    fs::set_permissions(&path, perms).unwrap();
}

#[test]
fn test_both_value_runs_once_per_mode() {
    let _serial = serial();
    let temp_dir = TempDir::new().unwrap();
    write_script(&temp_dir, "shared-tool", "#!/bin/sh\necho shared output\n");

    let modes = resolve_launch_modes(Some("both"), None, None).unwrap();
    assert_eq!(modes, vec![LaunchMode::InProcess, LaunchMode::Subprocess]);

    let mut executions = 0;
    for mode in modes {
        let runner = dual_runner(mode, &temp_dir);
        let result = runner
            .run("shared-tool", &[], RunOptions::new().cwd(temp_dir.path()))
            .unwrap();

        // Identical assertions hold in either mode.
        assert!(result.success, "mode {} failed", mode);
        assert_eq!(result.returncode, 0);
        assert_eq!(result.stdout, "shared output\n");
        executions += 1;
    }
    assert_eq!(executions, 2);
}

#[test]
fn test_failure_codes_agree_across_modes() {
    let _serial = serial();
    let temp_dir = TempDir::new().unwrap();
    write_script(&temp_dir, "shared-failer", "#!/bin/sh\nexit 5\n");

    for mode in resolve_launch_modes(None, Some("both"), None).unwrap() {
        let runner = dual_runner(mode, &temp_dir);
        let result = runner
            .run("shared-failer", &[], RunOptions::new().cwd(temp_dir.path()))
            .unwrap();
        assert_eq!(result.returncode, 5, "mode {} disagreed", mode);
        assert!(!result.success);
    }
}
