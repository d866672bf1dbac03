//! Launch mode selection
//!
//! A launch mode decides whether a script under test runs inside the test
//! process or as a separate child process. The mode is resolved once per
//! test invocation from layered configuration and stays fixed for the run.

use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};

/// How a script under test is executed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LaunchMode {
    /// Invoke the registered entry point inside the test process, with
    /// process-global state redirected around the call
    InProcess,
    /// Spawn a real child process
    Subprocess,
}

impl LaunchMode {
    /// The configuration string naming this mode
    pub fn as_str(self) -> &'static str {
        match self {
            LaunchMode::InProcess => "inprocess",
            LaunchMode::Subprocess => "subprocess",
        }
    }
}

impl fmt::Display for LaunchMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LaunchMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "inprocess" => Ok(LaunchMode::InProcess),
            "subprocess" => Ok(LaunchMode::Subprocess),
            other => Err(Error::InvalidLaunchMode {
                mode: other.to_string(),
            }),
        }
    }
}

/// Resolve the launch modes for one test from layered configuration.
///
/// Sources are checked closest scope first: a per-test marker value, then a
/// global command-line option value, then a configuration-file default.
/// Empty strings count as unset. With nothing set the default is
/// `inprocess`. A value of `both` yields `[InProcess, Subprocess]`, meaning
/// the same logical test executes once per mode.
pub fn resolve_launch_modes(
    marker: Option<&str>,
    option: Option<&str>,
    config: Option<&str>,
) -> Result<Vec<LaunchMode>> {
    let mode = [marker, option, config]
        .into_iter()
        .flatten()
        .find(|s| !s.is_empty())
        .unwrap_or("inprocess");

    if mode == "both" {
        Ok(vec![LaunchMode::InProcess, LaunchMode::Subprocess])
    } else {
        Ok(vec![mode.parse()?])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_modes() {
        assert_eq!(
            "inprocess".parse::<LaunchMode>().unwrap(),
            LaunchMode::InProcess
        );
        assert_eq!(
            "subprocess".parse::<LaunchMode>().unwrap(),
            LaunchMode::Subprocess
        );
        assert!("bogus".parse::<LaunchMode>().is_err());
    }

    #[test]
    fn default_is_inprocess() {
        let modes = resolve_launch_modes(None, None, None).unwrap();
        assert_eq!(modes, vec![LaunchMode::InProcess]);
    }

    #[test]
    fn marker_beats_option_and_config() {
        let modes =
            resolve_launch_modes(Some("subprocess"), Some("inprocess"), Some("inprocess"))
                .unwrap();
        assert_eq!(modes, vec![LaunchMode::Subprocess]);
    }

    #[test]
    fn option_beats_config() {
        let modes = resolve_launch_modes(None, Some("subprocess"), Some("inprocess")).unwrap();
        assert_eq!(modes, vec![LaunchMode::Subprocess]);
    }

    #[test]
    fn empty_string_counts_as_unset() {
        let modes = resolve_launch_modes(Some(""), Some(""), Some("subprocess")).unwrap();
        assert_eq!(modes, vec![LaunchMode::Subprocess]);
    }

    #[test]
    fn both_yields_two_modes() {
        let modes = resolve_launch_modes(Some("both"), None, None).unwrap();
        assert_eq!(modes, vec![LaunchMode::InProcess, LaunchMode::Subprocess]);
    }

    #[test]
    fn invalid_mode_is_an_error() {
        let err = resolve_launch_modes(Some("sideways"), None, None).unwrap_err();
        assert!(err.to_string().contains("sideways"));
    }
}
