//! 802.11 Frame Processing
//!
//! Everything between raw monitor-mode bytes and typed frame records:
//! - Radiotap header parsing and receive metadata
//! - Management frame subtype classification
//! - One parser per monitored subtype
//! - Tagged parameter decoding (SSID, security suites, fingerprints)
//! - Optional SSID/BSSID anonymization

pub mod anonymize;
pub mod frame;
pub mod frames;
pub mod radiotap;
pub mod tagged;

pub use anonymize::Anonymizer;
pub use frame::{Dot11Error, FrameSubtype, MacAddr};
pub use frames::ParsedFrame;
pub use radiotap::{parse_radiotap, RadioMetadata};
pub use tagged::TaggedParameters;
