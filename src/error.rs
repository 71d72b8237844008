//! Error type shared by the registry and the dispatcher.
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AadbError {
    #[error("No device present at index {index} ({count} attached)")]
    InvalidIndex { index: usize, count: usize },
    #[error("More than one device present, provide a device index")]
    AmbiguousTarget,
    #[error("One device present, do not specify an index")]
    IndexWithSingleDevice,
    #[error("An interactive shell takes exactly one device index")]
    MultipleInteractiveTargets,
    #[error("Must specify the same number of commands ({commands}) as devices present ({devices})")]
    DeviceCountMismatch { commands: usize, devices: usize },
    #[error("No devices present")]
    NoDevices,
    #[error("Local path does not exist: {}", .0.display())]
    MissingLocalPath(PathBuf),
    #[error("ADB not found ({0}). Please install the Android SDK platform tools or set AADB_ADB.")]
    AdbNotFound(String),
}
