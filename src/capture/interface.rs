//! Wireless interface management.
//!
//! Interface discovery goes through nl80211 (via neli-wifi). Mode and
//! channel changes shell out to `iw` and `ip`, which both require root
//! or CAP_NET_ADMIN.

use std::process::Command;

use neli_wifi::Socket;
use thiserror::Error;
use tracing::debug;

use crate::dot11::MacAddr;

#[derive(Debug, Error)]
pub enum InterfaceError {
    #[error("nl80211 socket error: {0}")]
    Socket(String),
    #[error("nl80211 error: {0}")]
    Nl80211(String),
    #[error("interface not found: {0}")]
    NotFound(String),
    #[error("invalid channel: {0}")]
    InvalidChannel(u16),
    #[error("command failed: {0}")]
    Command(String),
}

/// Interface mode as reported by nl80211.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InterfaceMode {
    Managed,
    Monitor,
    Ap,
    Ibss,
    Wds,
    Mesh,
    Unknown,
}

impl From<u32> for InterfaceMode {
    fn from(mode: u32) -> Self {
        match mode {
            0 => InterfaceMode::Ibss,
            1 => InterfaceMode::Managed,
            2 => InterfaceMode::Ap,
            3 => InterfaceMode::Wds,
            4 => InterfaceMode::Monitor,
            5 => InterfaceMode::Mesh,
            _ => InterfaceMode::Unknown,
        }
    }
}

impl InterfaceMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            InterfaceMode::Ibss => "ibss",
            InterfaceMode::Managed => "managed",
            InterfaceMode::Ap => "ap",
            InterfaceMode::Wds => "wds",
            InterfaceMode::Monitor => "monitor",
            InterfaceMode::Mesh => "mesh",
            InterfaceMode::Unknown => "unknown",
        }
    }
}

/// A wireless interface known to nl80211.
#[derive(Debug, Clone)]
pub struct WirelessInterface {
    /// Interface name (wlan0, etc.)
    pub name: String,
    /// Interface index
    pub ifindex: i32,
    /// Current mode
    pub mode: InterfaceMode,
    /// Current channel
    pub channel: Option<u16>,
    /// Current frequency (MHz)
    pub frequency: Option<u32>,
    /// MAC address
    pub mac: Option<MacAddr>,
}

/// List all wireless interfaces on the system.
pub fn list_interfaces() -> Result<Vec<WirelessInterface>, InterfaceError> {
    let mut socket = Socket::connect().map_err(|e| InterfaceError::Socket(e.to_string()))?;

    let interfaces = socket
        .get_interfaces_info()
        .map_err(|e| InterfaceError::Nl80211(e.to_string()))?;

    let mut result = Vec::new();
    for iface in interfaces {
        let name = iface
            .name
            .map(|n| String::from_utf8_lossy(&n).trim_end_matches('\0').to_string())
            .unwrap_or_default();
        if name.is_empty() {
            continue;
        }

        let mac = iface.mac.and_then(|m| MacAddr::from_slice(&m));
        let mode = current_mode(&name).unwrap_or(InterfaceMode::Unknown);

        result.push(WirelessInterface {
            name,
            ifindex: iface.index.unwrap_or(0),
            mode,
            channel: iface.channel.map(|c| c as u16),
            frequency: iface.frequency,
            mac,
        });
    }

    Ok(result)
}

/// Get a specific interface by name.
pub fn get_interface(name: &str) -> Result<WirelessInterface, InterfaceError> {
    list_interfaces()?
        .into_iter()
        .find(|i| i.name == name)
        .ok_or_else(|| InterfaceError::NotFound(name.to_string()))
}

/// Read the current mode with `iw dev <name> info`.
fn current_mode(name: &str) -> Option<InterfaceMode> {
    let output = Command::new("iw").args(["dev", name, "info"]).output().ok()?;

    let stdout = String::from_utf8_lossy(&output.stdout);
    for line in stdout.lines() {
        let line = line.trim();
        if let Some(mode) = line.strip_prefix("type ") {
            return Some(match mode {
                "managed" => InterfaceMode::Managed,
                "monitor" => InterfaceMode::Monitor,
                "AP" => InterfaceMode::Ap,
                "IBSS" => InterfaceMode::Ibss,
                "WDS" => InterfaceMode::Wds,
                "mesh point" => InterfaceMode::Mesh,
                _ => InterfaceMode::Unknown,
            });
        }
    }
    None
}

/// Put an interface into monitor mode, cycling the link down and back up.
///
/// A no-op when the interface already reports monitor mode.
pub fn ensure_monitor_mode(name: &str) -> Result<(), InterfaceError> {
    if current_mode(name) == Some(InterfaceMode::Monitor) {
        debug!("Interface {} is already in monitor mode", name);
        return Ok(());
    }

    link_set(name, "down")?;

    let status = Command::new("iw")
        .args(["dev", name, "set", "type", "monitor"])
        .status()
        .map_err(|e| InterfaceError::Command(e.to_string()))?;

    if !status.success() {
        let _ = link_set(name, "up");
        return Err(InterfaceError::Command(format!(
            "iw could not set {} to monitor mode",
            name
        )));
    }

    link_set(name, "up")?;
    debug!("Interface {} switched to monitor mode", name);
    Ok(())
}

/// Tune an interface with `iw dev <name> set channel <n>`.
pub fn set_channel(name: &str, channel: u16) -> Result<(), InterfaceError> {
    if !is_valid_channel(channel) {
        return Err(InterfaceError::InvalidChannel(channel));
    }

    let status = Command::new("iw")
        .args(["dev", name, "set", "channel", &channel.to_string()])
        .status()
        .map_err(|e| InterfaceError::Command(e.to_string()))?;

    if !status.success() {
        return Err(InterfaceError::Command(format!(
            "iw could not set {} to channel {}",
            name, channel
        )));
    }

    Ok(())
}

fn link_set(name: &str, state: &str) -> Result<(), InterfaceError> {
    let status = Command::new("ip")
        .args(["link", "set", name, state])
        .status()
        .map_err(|e| InterfaceError::Command(e.to_string()))?;

    if !status.success() {
        return Err(InterfaceError::Command(format!(
            "ip link set {} {} failed",
            name, state
        )));
    }
    Ok(())
}

/// Convert a channel number to its center frequency in MHz. Unknown
/// channels map to 0.
pub fn channel_to_freq(channel: u16) -> u32 {
    match channel {
        // 2.4 GHz
        1..=13 => 2407 + (channel as u32 * 5),
        14 => 2484,
        // 5 GHz
        36 => 5180,
        40 => 5200,
        44 => 5220,
        48 => 5240,
        52 => 5260,
        56 => 5280,
        60 => 5300,
        64 => 5320,
        100 => 5500,
        104 => 5520,
        108 => 5540,
        112 => 5560,
        116 => 5580,
        120 => 5600,
        124 => 5620,
        128 => 5640,
        132 => 5660,
        136 => 5680,
        140 => 5700,
        144 => 5720,
        149 => 5745,
        153 => 5765,
        157 => 5785,
        161 => 5805,
        165 => 5825,
        _ => 0,
    }
}

/// A channel is valid when it maps to a known 2.4 or 5 GHz frequency.
pub fn is_valid_channel(channel: u16) -> bool {
    channel_to_freq(channel) != 0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_from_nl80211_iftype() {
        assert_eq!(InterfaceMode::from(1), InterfaceMode::Managed);
        assert_eq!(InterfaceMode::from(4), InterfaceMode::Monitor);
        assert_eq!(InterfaceMode::from(99), InterfaceMode::Unknown);
    }

    #[test]
    fn test_mode_strings() {
        assert_eq!(InterfaceMode::Monitor.as_str(), "monitor");
        assert_eq!(InterfaceMode::Managed.as_str(), "managed");
        assert_eq!(InterfaceMode::Unknown.as_str(), "unknown");
    }

    #[test]
    fn test_channel_frequencies() {
        assert_eq!(channel_to_freq(1), 2412);
        assert_eq!(channel_to_freq(6), 2437);
        assert_eq!(channel_to_freq(11), 2462);
        assert_eq!(channel_to_freq(14), 2484);
        assert_eq!(channel_to_freq(36), 5180);
        assert_eq!(channel_to_freq(165), 5825);
    }

    #[test]
    fn test_channel_validity() {
        assert!(is_valid_channel(1));
        assert!(is_valid_channel(14));
        assert!(is_valid_channel(149));
        assert!(!is_valid_channel(0));
        assert!(!is_valid_channel(15));
        assert!(!is_valid_channel(37));
        assert!(!is_valid_channel(9999));
    }

    #[test]
    fn test_set_channel_rejects_invalid_channel() {
        match set_channel("test-nonexistent0", 15) {
            Err(InterfaceError::InvalidChannel(15)) => {}
            other => panic!("unexpected result: {:?}", other),
        }
    }
}
