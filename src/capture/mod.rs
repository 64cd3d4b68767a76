//! Packet capture layer.
//!
//! - [`interface`] wraps nl80211 discovery and `iw`/`ip` tuning
//! - [`hopper`] rotates an interface through a channel list
//! - [`monitor`] owns the pcap loop feeding the frame pipeline

pub mod hopper;
pub mod interface;
pub mod monitor;

pub use hopper::{ChannelHopper, HopperCommand, HopperHandle};
pub use interface::{list_interfaces, InterfaceError, WirelessInterface};
pub use monitor::FrameMonitor;

use thiserror::Error;

/// Errors raised while opening or reading a capture handle.
#[derive(Debug, Error)]
pub enum CaptureError {
    #[error(transparent)]
    Interface(#[from] InterfaceError),
    #[error("pcap error: {0}")]
    Pcap(String),
    #[error("invalid capture filter: {0}")]
    Filter(String),
}
