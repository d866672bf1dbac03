//! Run outcome record

use regex::Regex;

use crate::error::Result;

/// Result of running a script, uniform across launch modes
///
/// Fields are set once at construction and never change afterwards.
#[derive(Debug, Clone)]
pub struct RunResult {
    /// Exit code of the run
    pub returncode: i32,
    /// Captured standard output
    pub stdout: String,
    /// Captured standard error
    pub stderr: String,
    /// Whether the run exited 0
    pub success: bool,
}

impl RunResult {
    /// Package a finished run; reports itself immediately when
    /// `print_result` is set, for visibility in failure output.
    pub fn new(returncode: i32, stdout: String, stderr: String, print_result: bool) -> Self {
        let result = RunResult {
            success: returncode == 0,
            returncode,
            stdout,
            stderr,
        };
        if print_result {
            result.print();
        }
        result
    }

    /// Write the three-part report (return code, stdout block, stderr
    /// block) to the current standard output.
    pub fn print(&self) {
        println!("# Script return code: {}", self.returncode);
        println!("# Script stdout:\n{}", self.stdout);
        println!("# Script stderr:\n{}", self.stderr);
    }

    /// Whether the captured stdout matches `pattern`
    pub fn stdout_matches(&self, pattern: &str) -> Result<bool> {
        Ok(Regex::new(pattern)?.is_match(&self.stdout))
    }

    /// Whether the captured stderr matches `pattern`
    pub fn stderr_matches(&self, pattern: &str) -> Result<bool> {
        Ok(Regex::new(pattern)?.is_match(&self.stderr))
    }
}
