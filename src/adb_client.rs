//! Contains the AdbClient struct, the process-spawning side of the bridge.
use crate::bridge::{Bridge, Invocation};
use crate::config::Config;
use crate::error::AadbError;
use anyhow::{anyhow, Context, Result};
use colored::*;
use std::io::{self, BufRead, BufReader, Write};
use std::path::PathBuf;
use std::process::{Command, ExitStatus, Stdio};
use tracing::{debug, warn};
use which::which;

pub struct AdbClient {
    pub adb_path: PathBuf,
}

impl AdbClient {
    pub fn new(config: &Config) -> Result<Self> {
        let adb_path = match &config.adb_path {
            Some(path) => which(path).map_err(|e| {
                AadbError::AdbNotFound(format!("{}: {}", path.display(), e))
            })?,
            None => which("adb").map_err(|e| AadbError::AdbNotFound(e.to_string()))?,
        };
        debug!(adb = %adb_path.display(), "using adb");
        Ok(Self { adb_path })
    }

    fn command(&self, invocation: &Invocation) -> Command {
        debug!(%invocation, "spawning");
        let mut command = Command::new(&self.adb_path);
        command.args(invocation.args());
        command
    }

    fn observe(invocation: &Invocation, status: ExitStatus) -> Option<i32> {
        if !status.success() {
            warn!(
                device = invocation.serial().unwrap_or("-"),
                status = ?status.code(),
                "adb exited unsuccessfully"
            );
        }
        status.code()
    }
}

impl Bridge for AdbClient {
    fn capture(&self, invocation: &Invocation) -> Result<String> {
        let output = self
            .command(invocation)
            .stderr(Stdio::inherit())
            .output()
            .with_context(|| format!("failed to run `{}`", invocation))?;
        Self::observe(invocation, output.status);
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    fn stream(&self, invocation: &Invocation, prefix: Option<&str>) -> Result<Option<i32>> {
        let (reader, writer) = io::pipe()?;
        // The command owns both write ends; it must be dropped before reading
        // or the pipe never reaches EOF.
        let mut child = {
            let mut command = self.command(invocation);
            command
                .stdin(Stdio::null())
                .stdout(writer.try_clone()?)
                .stderr(writer);
            command
                .spawn()
                .with_context(|| format!("failed to run `{}`", invocation))?
        };
        let relayed = relay(BufReader::new(reader), &mut io::stdout().lock(), prefix);
        let status = child.wait()?;
        relayed?;
        Ok(Self::observe(invocation, status))
    }

    fn interactive(&self, invocation: &Invocation) -> Result<Option<i32>> {
        // Ctrl+C belongs to the remote shell for as long as the session lasts.
        ctrlc::set_handler(|| {}).map_err(|e| anyhow!("Error setting Ctrl-C handler: {}", e))?;
        let status = self
            .command(invocation)
            .status()
            .with_context(|| format!("failed to run `{}`", invocation))?;
        Ok(Self::observe(invocation, status))
    }
}

/// Copy `reader` to `out` line by line until EOF. Bytes that are not UTF-8
/// are replaced rather than ending the copy early.
fn relay<R: BufRead, W: Write>(mut reader: R, out: &mut W, prefix: Option<&str>) -> io::Result<()> {
    let mut buf = Vec::new();
    loop {
        buf.clear();
        if reader.read_until(b'\n', &mut buf)? == 0 {
            return Ok(());
        }
        let line = String::from_utf8_lossy(&buf);
        let line = line.trim_end_matches(['\n', '\r']);
        match prefix {
            Some(prefix) => writeln!(out, "{} {}", format!("[{}]", prefix).cyan(), line)?,
            None => writeln!(out, "{}", line)?,
        }
    }
}
