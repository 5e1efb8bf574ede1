//! Subprocess execution utilities.

use std::ffi::OsStr;
use std::io::{self, BufRead, BufReader, Read};
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus, Stdio};

/// Where the IBM i PASE make lives when the open source package is installed.
pub const QOPENSYS_MAKE: &str = "/QOpenSys/pkgs/bin/make";

/// Builder for subprocess execution.
#[derive(Debug, Clone)]
pub struct ProcessBuilder {
    program: PathBuf,
    args: Vec<String>,
    cwd: Option<PathBuf>,
}

impl ProcessBuilder {
    /// Create a new process builder for the given program.
    pub fn new(program: impl AsRef<Path>) -> Self {
        ProcessBuilder {
            program: program.as_ref().to_path_buf(),
            args: Vec::new(),
            cwd: None,
        }
    }

    /// Add a single argument.
    pub fn arg(mut self, arg: impl AsRef<OsStr>) -> Self {
        self.args.push(arg.as_ref().to_string_lossy().into_owned());
        self
    }

    /// Add multiple arguments.
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        self.args.extend(
            args.into_iter()
                .map(|s| s.as_ref().to_string_lossy().into_owned()),
        );
        self
    }

    /// Set the working directory.
    pub fn cwd(mut self, cwd: impl AsRef<Path>) -> Self {
        self.cwd = Some(cwd.as_ref().to_path_buf());
        self
    }

    /// Get the program path.
    pub fn get_program(&self) -> &Path {
        &self.program
    }

    /// Get the arguments.
    pub fn get_args(&self) -> &[String] {
        &self.args
    }

    fn build_command(&self) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args);

        if let Some(ref cwd) = self.cwd {
            cmd.current_dir(cwd);
        }

        cmd
    }

    /// Run the command, handing each stdout line to `on_line` as it arrives.
    ///
    /// Stderr is inherited so compiler diagnostics reach the terminal directly.
    /// Lines that are not valid UTF-8 are converted lossily.
    pub fn stream_stdout<F>(&self, mut on_line: F) -> io::Result<ExitStatus>
    where
        F: FnMut(&str),
    {
        let mut cmd = self.build_command();
        cmd.stdin(Stdio::null());
        cmd.stdout(Stdio::piped());
        cmd.stderr(Stdio::inherit());

        let mut child = cmd.spawn()?;

        if let Some(stdout) = child.stdout.take() {
            if let Err(e) = read_lines(stdout, &mut on_line) {
                // Do not leave make running or unreaped.
                let _ = child.kill();
                let _ = child.wait();
                return Err(e);
            }
        }

        child.wait()
    }

    /// Display the command for logs and error messages.
    pub fn display_command(&self) -> String {
        let mut parts = vec![self.program.display().to_string()];
        parts.extend(self.args.iter().cloned());
        parts.join(" ")
    }
}

fn read_lines<R, F>(source: R, on_line: &mut F) -> io::Result<()>
where
    R: Read,
    F: FnMut(&str),
{
    let mut reader = BufReader::new(source);
    let mut buf = Vec::new();
    loop {
        buf.clear();
        if reader.read_until(b'\n', &mut buf)? == 0 {
            return Ok(());
        }
        let line = String::from_utf8_lossy(&buf);
        on_line(line.trim_end_matches(['\n', '\r']));
    }
}

/// Find an executable in PATH.
pub fn find_executable(name: &str) -> Option<PathBuf> {
    which::which(name).ok()
}

/// Find the make executable.
///
/// Prefers the IBM i open source package location, then `gmake` and `make`
/// on `PATH`. Falls back to a bare `make` so the spawn error names it.
pub fn find_make() -> PathBuf {
    let qopensys = Path::new(QOPENSYS_MAKE);
    if qopensys.is_file() {
        return qopensys.to_path_buf();
    }

    for name in &["gmake", "make"] {
        if let Some(path) = find_executable(name) {
            return path;
        }
    }

    PathBuf::from("make")
}
