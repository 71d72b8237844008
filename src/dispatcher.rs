//! Resolves a selector against the registry and runs a command per device.
use crate::bridge::{Bridge, Invocation};
use crate::cli::{shell_text, Commands, Selector};
use crate::device::{Device, DeviceRegistry};
use crate::error::AadbError;
use anyhow::Result;
use colored::*;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// What a shell request resolves to once the device count is known.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellPlan {
    Interactive(usize),
    Each(Vec<usize>),
    All,
}

/// Decide how `shell` runs, given the selector, the number of attached
/// devices and whether command text was supplied.
pub fn plan_shell(
    selector: &Selector,
    device_count: usize,
    has_command: bool,
) -> Result<ShellPlan, AadbError> {
    let indexes = selector.indexes();
    match (indexes, device_count, has_command) {
        (_, 0, _) => Err(AadbError::NoDevices),
        ([_, ..], 1, false) => Err(AadbError::IndexWithSingleDevice),
        ([index], _, false) => Ok(ShellPlan::Interactive(*index)),
        ([_, _, ..], _, false) => Err(AadbError::MultipleInteractiveTargets),
        ([_, ..], _, true) => Ok(ShellPlan::Each(indexes.to_vec())),
        ([], 1, false) => Ok(ShellPlan::Interactive(0)),
        ([], _, false) => Err(AadbError::AmbiguousTarget),
        ([], _, true) => Ok(ShellPlan::All),
    }
}

#[derive(Serialize)]
struct DeviceEntry<'a> {
    index: usize,
    serial: &'a str,
}

pub struct Dispatcher<B: Bridge> {
    registry: DeviceRegistry,
    bridge: B,
}

impl<B: Bridge> Dispatcher<B> {
    pub fn new(registry: DeviceRegistry, bridge: B) -> Self {
        Self { registry, bridge }
    }

    /// Populate the registry through `bridge`, then take ownership of both.
    pub fn discover(bridge: B) -> Result<Self> {
        let registry = DeviceRegistry::discover(&bridge)?;
        Ok(Self::new(registry, bridge))
    }

    pub fn registry(&self) -> &DeviceRegistry {
        &self.registry
    }

    pub fn dispatch(&self, selector: &Selector, command: &Commands) -> Result<()> {
        match command {
            Commands::Shell { command } => {
                self.shell(selector, shell_text(command).as_deref())
            }
            Commands::Devices { json } => self.devices(selector, *json),
            Commands::Push { locals, remote } => self.push(selector, locals, remote),
            Commands::Pull { remote, local } => self.pull(selector, remote, local.as_deref()),
            Commands::Reboot => self.reboot(selector),
            Commands::Rm { remote } => self.remove(selector, remote),
            Commands::Batch { commands } => self.run_command_list(commands),
        }
    }

    pub fn shell(&self, selector: &Selector, command: Option<&str>) -> Result<()> {
        match plan_shell(selector, self.registry.len(), command.is_some())? {
            ShellPlan::Interactive(index) => self.open_shell_session(index),
            ShellPlan::Each(indexes) => {
                self.run_shell_command(&Selector::new(indexes), command.unwrap_or_default())
            }
            ShellPlan::All => {
                self.run_shell_command(&Selector::default(), command.unwrap_or_default())
            }
        }
    }

    fn run_shell_command(&self, selector: &Selector, command: &str) -> Result<()> {
        self.fan_out(selector, |device| {
            Invocation::shell(&device.serial, Some(command))
        })
    }

    pub fn open_shell_session(&self, index: usize) -> Result<()> {
        let device = self.registry.at(index)?;
        println!(
            "{} {} ({})",
            "Opening shell session to device index".green(),
            index,
            device.serial.cyan()
        );
        self.bridge
            .interactive(&Invocation::shell(&device.serial, None))?;
        Ok(())
    }

    pub fn devices(&self, selector: &Selector, json: bool) -> Result<()> {
        if selector.is_empty() && !json {
            self.bridge.stream(&Invocation::list_devices(), None)?;
            return Ok(());
        }
        let entries: Vec<DeviceEntry> = if selector.is_empty() {
            self.registry
                .iter()
                .enumerate()
                .map(|(index, device)| DeviceEntry {
                    index,
                    serial: &device.serial,
                })
                .collect()
        } else {
            selector
                .indexes()
                .iter()
                .filter_map(|&index| match self.registry.at(index) {
                    Ok(device) => Some(DeviceEntry {
                        index,
                        serial: &device.serial,
                    }),
                    Err(e) => {
                        report(&e);
                        None
                    }
                })
                .collect()
        };
        if json {
            println!("{}", serde_json::to_string_pretty(&entries)?);
        } else {
            for entry in entries {
                println!("{}\t{}", entry.index, entry.serial);
            }
        }
        Ok(())
    }

    /// Push each local path to `remote`. Every path is checked before adb runs.
    pub fn push(&self, selector: &Selector, locals: &[PathBuf], remote: &str) -> Result<()> {
        if let Some(missing) = locals.iter().find(|local| !local.exists()) {
            return Err(AadbError::MissingLocalPath(missing.clone()).into());
        }
        for local in locals {
            if locals.len() > 1 || local.is_dir() {
                println!(
                    "{}",
                    format!("*** Pushing {} to devices ***", local.display()).yellow()
                );
            }
            self.fan_out(selector, |device| {
                Invocation::push(&device.serial, local, remote)
            })?;
        }
        Ok(())
    }

    pub fn pull(&self, selector: &Selector, remote: &str, local: Option<&Path>) -> Result<()> {
        self.fan_out(selector, |device| {
            Invocation::pull(&device.serial, remote, local)
        })
    }

    pub fn reboot(&self, selector: &Selector) -> Result<()> {
        self.fan_out(selector, |device| Invocation::reboot(&device.serial))
    }

    pub fn remove(&self, selector: &Selector, remote: &str) -> Result<()> {
        self.fan_out(selector, |device| Invocation::remove(&device.serial, remote))
    }

    /// Run `commands[i]` on device `i`. The lengths must match exactly.
    pub fn run_command_list(&self, commands: &[String]) -> Result<()> {
        if commands.len() != self.registry.len() {
            return Err(AadbError::DeviceCountMismatch {
                commands: commands.len(),
                devices: self.registry.len(),
            }
            .into());
        }
        let prefixed = commands.len() > 1;
        for (device, command) in self.registry.iter().zip(commands) {
            self.run_on(device, &Invocation::shell(&device.serial, Some(command)), prefixed);
        }
        Ok(())
    }

    /// Run one invocation per targeted device: the selected indexes in the
    /// order given, or every device in listing order. Bad indexes are
    /// reported and skipped.
    fn fan_out<F>(&self, selector: &Selector, build: F) -> Result<()>
    where
        F: Fn(&Device) -> Invocation,
    {
        if self.registry.is_empty() {
            return Err(AadbError::NoDevices.into());
        }
        if selector.is_empty() {
            let prefixed = self.registry.len() > 1;
            for device in self.registry.iter() {
                self.run_on(device, &build(device), prefixed);
            }
        } else {
            let prefixed = selector.len() > 1;
            for &index in selector.indexes() {
                match self.registry.at(index) {
                    Ok(device) => self.run_on(device, &build(device), prefixed),
                    Err(e) => report(&e),
                }
            }
        }
        Ok(())
    }

    /// Failures stay with the device; the caller moves on to the next one.
    fn run_on(&self, device: &Device, invocation: &Invocation, prefixed: bool) {
        let prefix = prefixed.then_some(device.serial.as_str());
        match self.bridge.stream(invocation, prefix) {
            Ok(code) => debug!(device = %device, code = ?code, "finished"),
            Err(e) => warn!(device = %device, error = %e, "adb invocation failed"),
        }
    }
}

fn report(error: &AadbError) {
    eprintln!("{} {}", "Error:".red(), error);
}
