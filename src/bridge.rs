//! Typed adb invocations and the seam the dispatcher talks through.
use anyhow::Result;
use std::fmt;
use std::path::Path;

/// Arguments for one adb run. Passed to the process as-is, never through a shell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    args: Vec<String>,
}

impl Invocation {
    pub fn list_devices() -> Self {
        Self::global(["devices", "-l"])
    }

    /// `shell` with no command opens an interactive session.
    pub fn shell(serial: &str, command: Option<&str>) -> Self {
        let mut invocation = Self::on_device(serial, ["shell"]);
        if let Some(command) = command {
            invocation.args.push(command.to_string());
        }
        invocation
    }

    pub fn push(serial: &str, local: &Path, remote: &str) -> Self {
        let local = local.to_string_lossy();
        Self::on_device(serial, ["push", &*local, remote])
    }

    pub fn pull(serial: &str, remote: &str, local: Option<&Path>) -> Self {
        let mut invocation = Self::on_device(serial, ["pull", remote]);
        if let Some(local) = local {
            invocation.args.push(local.to_string_lossy().into_owned());
        }
        invocation
    }

    pub fn reboot(serial: &str) -> Self {
        Self::on_device(serial, ["reboot"])
    }

    /// The device shell re-parses the path, so it is quoted for it.
    pub fn remove(serial: &str, remote: &str) -> Self {
        Self::on_device(serial, ["shell", "rm", shell_quote(remote).as_str()])
    }

    pub fn args(&self) -> &[String] {
        &self.args
    }

    /// The device this invocation is addressed to, if any.
    pub fn serial(&self) -> Option<&str> {
        match self.args.as_slice() {
            [flag, serial, ..] if flag == "-s" => Some(serial.as_str()),
            _ => None,
        }
    }

    fn global<const N: usize>(args: [&str; N]) -> Self {
        Self {
            args: args.iter().map(|arg| arg.to_string()).collect(),
        }
    }

    fn on_device<const N: usize>(serial: &str, args: [&str; N]) -> Self {
        let mut all = vec!["-s".to_string(), serial.to_string()];
        all.extend(args.iter().map(|arg| arg.to_string()));
        Self { args: all }
    }
}

impl fmt::Display for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "adb")?;
        for arg in &self.args {
            if arg.is_empty() || arg.contains(char::is_whitespace) {
                write!(f, " {:?}", arg)?;
            } else {
                write!(f, " {}", arg)?;
            }
        }
        Ok(())
    }
}

/// Single-quote `word` for a POSIX shell.
fn shell_quote(word: &str) -> String {
    format!("'{}'", word.replace('\'', r"'\''"))
}

/// Everything the dispatcher needs from the external tool.
///
/// Exit codes are returned so callers can log them; `None` means the process
/// was terminated by a signal.
pub trait Bridge {
    /// Run to completion and return its standard output.
    fn capture(&self, invocation: &Invocation) -> Result<String>;

    /// Run to completion, streaming merged stdout/stderr to the console.
    /// Each line is prefixed with `prefix` when one is given.
    fn stream(&self, invocation: &Invocation, prefix: Option<&str>) -> Result<Option<i32>>;

    /// Hand the terminal over to the child until it exits.
    fn interactive(&self, invocation: &Invocation) -> Result<Option<i32>>;
}
