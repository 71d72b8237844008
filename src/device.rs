//! Contains the Device and DeviceRegistry types and the `adb devices -l` parser.
use crate::bridge::{Bridge, Invocation};
use crate::error::AadbError;
use anyhow::Result;
use std::fmt;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Device {
    pub serial: String,
}

impl Device {
    pub fn new(serial: &str) -> Self {
        Self {
            serial: serial.to_string(),
        }
    }
}

impl fmt::Display for Device {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.serial)
    }
}

/// Attached devices in listing order. Index `i` is the `i`-th device adb reported.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeviceRegistry {
    devices: Vec<Device>,
}

impl DeviceRegistry {
    /// Ask adb for the attached devices. Zero devices is not an error here.
    pub fn discover(bridge: &impl Bridge) -> Result<Self> {
        let listing = bridge.capture(&Invocation::list_devices())?;
        let registry = Self {
            devices: parse_listing(&listing),
        };
        debug!(count = registry.len(), "discovered devices");
        Ok(registry)
    }

    #[cfg(test)]
    pub fn from_serials<I, S>(serials: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            devices: serials
                .into_iter()
                .map(|serial| Device::new(serial.as_ref()))
                .collect(),
        }
    }

    pub fn at(&self, index: usize) -> Result<&Device, AadbError> {
        self.devices.get(index).ok_or(AadbError::InvalidIndex {
            index,
            count: self.devices.len(),
        })
    }

    pub fn len(&self) -> usize {
        self.devices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Device> {
        self.devices.iter()
    }
}

/// Parse `adb devices -l` output. The first line is the header. Daemon status
/// lines (`* daemon ...`), a late header and lines without a state column are
/// dropped as well.
pub fn parse_listing(output: &str) -> Vec<Device> {
    output
        .lines()
        .skip(1)
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .filter(|line| !line.starts_with('*'))
        .filter(|line| !line.starts_with("List of devices"))
        .filter_map(|line| {
            let mut parts = line.split_whitespace();
            let serial = parts.next()?;
            parts.next()?;
            Some(Device::new(serial))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const LISTING: &str = "List of devices attached\n\
        R58M123ABC             device usb:1-1 product:beyond1 model:SM_G973F device:beyond1 transport_id:3\n\
        emulator-5554          device product:sdk_gphone64 model:sdk_gphone64 device:emu64 transport_id:1\n\
        \n";

    #[test]
    fn listing_keeps_adb_order() {
        let devices = parse_listing(LISTING);
        assert_eq!(
            devices,
            vec![Device::new("R58M123ABC"), Device::new("emulator-5554")]
        );
    }

    #[test]
    fn listing_skips_header_and_daemon_chatter() {
        let output = "* daemon not running; starting now at tcp:5037\n\
            * daemon started successfully\n\
            List of devices attached\n\
            0123456789ABCDEF       unauthorized usb:2-1 transport_id:4\n";
        // The first line is always treated as the header.
        let devices = parse_listing(output);
        assert_eq!(devices, vec![Device::new("0123456789ABCDEF")]);
    }

    #[test]
    fn listing_with_only_header_is_empty() {
        assert!(parse_listing("List of devices attached\n\n").is_empty());
        assert!(parse_listing("").is_empty());
    }

    #[test]
    fn listing_ignores_lines_without_state() {
        let output = "List of devices attached\nstray\nA1 device\n";
        assert_eq!(parse_listing(output), vec![Device::new("A1")]);
    }

    #[test]
    fn at_returns_device_in_range() {
        let registry = DeviceRegistry::from_serials(["A1", "B2", "C3"]);
        assert_eq!(registry.at(0).unwrap().serial, "A1");
        assert_eq!(registry.at(2).unwrap().serial, "C3");
    }

    #[test]
    fn at_rejects_out_of_range() {
        let registry = DeviceRegistry::from_serials(["A1", "B2"]);
        assert_eq!(
            registry.at(2),
            Err(AadbError::InvalidIndex { index: 2, count: 2 })
        );
        assert_eq!(
            registry.at(usize::MAX),
            Err(AadbError::InvalidIndex {
                index: usize::MAX,
                count: 2
            })
        );
        assert!(DeviceRegistry::default().at(0).is_err());
    }

    #[test]
    fn duplicates_are_kept() {
        let registry = DeviceRegistry::from_serials(["A1", "A1"]);
        assert_eq!(registry.len(), 2);
    }
}
