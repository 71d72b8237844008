//! Contains CLI argument parsing: the device index prefix and the sub-commands.
use clap::{Parser, Subcommand};
use std::ffi::OsString;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "aadb",
    author,
    version,
    about = "Run adb commands across every attached Android device",
    override_usage = "aadb [INDEX]... <COMMAND>",
    after_help = "Leading INDEX numbers pick devices by their position in `aadb devices`.\n\
                  Without any, the command runs on every attached device.",
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Run a shell command, or open an interactive shell when none is given
    Shell {
        /// Command text; several words are joined with single spaces
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        command: Vec<String>,
    },
    /// List attached devices
    Devices {
        /// Print index and serial as JSON
        #[arg(long)]
        json: bool,
    },
    /// Push local files or directories to the device(s)
    Push {
        #[arg(required = true, value_name = "LOCAL")]
        locals: Vec<PathBuf>,
        #[arg(value_name = "REMOTE")]
        remote: String,
    },
    /// Pull a file or directory from the device(s)
    Pull {
        #[arg(value_name = "REMOTE")]
        remote: String,
        #[arg(value_name = "LOCAL")]
        local: Option<PathBuf>,
    },
    /// Reboot the device(s)
    Reboot,
    /// Delete a file on the device(s)
    Rm {
        #[arg(value_name = "REMOTE")]
        remote: String,
    },
    /// Run one shell command per device, matched in listing order
    Batch {
        #[arg(required = true, value_name = "COMMAND")]
        commands: Vec<String>,
    },
}

/// The shell text to run, or `None` for an interactive session.
pub fn shell_text(command: &[String]) -> Option<String> {
    if command.is_empty() {
        None
    } else {
        Some(command.join(" "))
    }
}

/// Device indexes given ahead of the sub-command. Empty means every device.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selector(Vec<usize>);

impl Selector {
    pub fn new(indexes: Vec<usize>) -> Self {
        Self(indexes)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn indexes(&self) -> &[usize] {
        &self.0
    }
}

/// Collect the all-digit arguments following the program name.
///
/// Returns the selector and the position of the first argument that is not
/// an index. Indexes too large for `usize` saturate and fail at lookup time.
pub fn parse_selector<S: AsRef<str>>(args: &[S]) -> (Selector, usize) {
    let mut indexes = Vec::new();
    let mut position = 1;
    while let Some(arg) = args.get(position) {
        let arg = arg.as_ref();
        if arg.is_empty() || !arg.bytes().all(|b| b.is_ascii_digit()) {
            break;
        }
        indexes.push(arg.parse().unwrap_or(usize::MAX));
        position += 1;
    }
    (Selector(indexes), position)
}

/// Split argv into the selector and the sub-command.
pub fn parse<S: AsRef<str>>(args: &[S]) -> Result<(Selector, Commands), clap::Error> {
    let (selector, position) = parse_selector(args);
    let program = args
        .first()
        .map(|arg| OsString::from(arg.as_ref()))
        .unwrap_or_else(|| OsString::from("aadb"));
    let rest = args
        .iter()
        .skip(position)
        .map(|arg| OsString::from(arg.as_ref()));
    let cli = Cli::try_parse_from(std::iter::once(program).chain(rest))?;
    Ok((selector, cli.command))
}
