//! Standard-stream capture for in-process runs
//!
//! The three standard descriptors are pointed at anonymous temp files for
//! the duration of the call, so anything the script writes through them is
//! captured. The original descriptors are saved with `dup` and put back
//! with `dup2` when the capture is torn down.
//!
//! Note that under a capturing test harness the `print!`/`println!` macros
//! write to the harness's thread-local sink, not to descriptor 1; scripts
//! that want their output captured here write through
//! `std::io::stdout()`/`std::io::stderr()` directly.

use std::fs::File;
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::os::unix::io::{AsRawFd, RawFd};

/// Owned duplicate of a standard descriptor, put back over `target` on drop
struct SavedFd {
    target: RawFd,
    saved: RawFd,
}

impl SavedFd {
    /// Save `target`, then point it at `replacement`
    fn redirect(target: RawFd, replacement: &File) -> io::Result<SavedFd> {
        let saved = unsafe { libc::dup(target) };
        if saved < 0 {
            return Err(io::Error::last_os_error());
        }
        if unsafe { libc::dup2(replacement.as_raw_fd(), target) } < 0 {
            let err = io::Error::last_os_error();
            unsafe { libc::close(saved) };
            return Err(err);
        }
        Ok(SavedFd { target, saved })
    }
}

impl Drop for SavedFd {
    fn drop(&mut self) {
        unsafe {
            libc::dup2(self.saved, self.target);
            libc::close(self.saved);
        }
    }
}

/// Captures stdin/stdout/stderr into temp files for one in-process run
pub struct StdioCapture {
    stdout_file: File,
    stderr_file: File,
    stdin_redirect: SavedFd,
    stdout_redirect: SavedFd,
    stderr_redirect: SavedFd,
}

impl StdioCapture {
    /// Redirect the standard descriptors; `stdin_content` becomes the
    /// script's standard input.
    pub fn install(stdin_content: &[u8]) -> io::Result<StdioCapture> {
        let mut stdin_file = tempfile::tempfile()?;
        stdin_file.write_all(stdin_content)?;
        stdin_file.seek(SeekFrom::Start(0))?;
        let stdout_file = tempfile::tempfile()?;
        let stderr_file = tempfile::tempfile()?;

        // If a later redirect fails, the earlier guards restore on drop.
        let stdin_redirect = SavedFd::redirect(libc::STDIN_FILENO, &stdin_file)?;
        let stdout_redirect = SavedFd::redirect(libc::STDOUT_FILENO, &stdout_file)?;
        let stderr_redirect = SavedFd::redirect(libc::STDERR_FILENO, &stderr_file)?;

        Ok(StdioCapture {
            stdout_file,
            stderr_file,
            stdin_redirect,
            stdout_redirect,
            stderr_redirect,
        })
    }

    /// Restore the original descriptors and read back what was captured
    pub fn finish(self) -> io::Result<(String, String)> {
        // Push buffered writes into the capture files before the
        // descriptors go back.
        let _ = io::stdout().flush();
        let _ = io::stderr().flush();

        let StdioCapture {
            mut stdout_file,
            mut stderr_file,
            stdin_redirect,
            stdout_redirect,
            stderr_redirect,
        } = self;
        drop(stderr_redirect);
        drop(stdout_redirect);
        drop(stdin_redirect);

        let mut stdout = String::new();
        stdout_file.seek(SeekFrom::Start(0))?;
        stdout_file.read_to_string(&mut stdout)?;

        let mut stderr = String::new();
        stderr_file.seek(SeekFrom::Start(0))?;
        stderr_file.read_to_string(&mut stderr)?;

        Ok((stdout, stderr))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Mutex, MutexGuard, OnceLock};

    // Descriptor redirection is process-wide; keep these serial.
    fn serial() -> MutexGuard<'static, ()> {
        static LOCK: OnceLock<Mutex<()>> = OnceLock::new();
        LOCK.get_or_init(|| Mutex::new(()))
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    #[test]
    fn test_captures_direct_stream_writes() {
        let _serial = serial();
        let capture = StdioCapture::install(b"").unwrap();
        write!(io::stdout(), "to stdout").unwrap();
        write!(io::stderr(), "to stderr").unwrap();
        let (stdout, stderr) = capture.finish().unwrap();

        assert_eq!(stdout, "to stdout");
        assert_eq!(stderr, "to stderr");
    }

    #[test]
    fn test_supplies_stdin_content() {
        let _serial = serial();
        let capture = StdioCapture::install(b"line one\n").unwrap();
        let mut input = String::new();
        io::stdin().read_to_string(&mut input).unwrap();
        let (stdout, _) = capture.finish().unwrap();

        assert_eq!(input, "line one\n");
        assert_eq!(stdout, "");
    }
}
