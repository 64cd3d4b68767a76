//! Tagged Parameters
//!
//! Management frames carry a variable list of tagged elements after their
//! fixed fields: SSID, supported rates, RSN, vendor extensions and more.
//! This module walks that list once per frame and derives everything the
//! pipeline needs from it: SSID, security configurations, WPS presence and
//! the capability fingerprint used for bandit detection.

use std::collections::BTreeMap;

use sha2::{Digest, Sha256};
use tracing::{debug, error};

use crate::dot11::frame::Dot11Error;

/// Offsets of the tagged parameter list within each frame payload,
/// counted from the start of the MAC header.
pub mod positions {
    /// Beacon: 24 byte header, then timestamp, interval and capabilities.
    pub const BEACON: usize = 36;
    /// Probe response: same fixed fields as a beacon.
    pub const PROBE_RESPONSE: usize = 36;
    /// Association request: 24 byte header, capabilities and listen interval.
    pub const ASSOC_REQUEST: usize = 28;
    /// Probe request: tagged elements follow the header directly.
    pub const PROBE_REQUEST: usize = 24;
}

pub const SSID_TAG: u8 = 0;
pub const RSN_TAG: u8 = 48;
pub const VENDOR_SPECIFIC_TAG: u8 = 221;

/// Vendor key of the pre-standard WPA1 information element.
pub const WPA1_VENDOR_KEY: &str = "00:50:F2-1";
/// Vendor key of the WPS information element.
pub const WPS_VENDOR_KEY: &str = "00:50:F2-4";

/// Tag IDs whose values feed the capability fingerprint.
const FINGERPRINT_TAG_IDS: [u8; 6] = [1, 7, 45, 48, 50, 127];

/// Offset of the pairwise cipher suite count within a WPA1 vendor element.
const WPA1_SUITE_COUNT_POSITION: usize = 10;
/// Offset of the pairwise cipher suite count within an RSN element.
const WPA2_SUITE_COUNT_POSITION: usize = 6;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SecurityMode {
    None,
    Wpa1,
    Wpa2,
}

impl SecurityMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            SecurityMode::None => "NONE",
            SecurityMode::Wpa1 => "WPA1",
            SecurityMode::Wpa2 => "WPA2",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyManagementMode {
    Eam,
    Psk,
    Unknown,
}

impl KeyManagementMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            KeyManagementMode::Eam => "EAM",
            KeyManagementMode::Psk => "PSK",
            KeyManagementMode::Unknown => "UNKNOWN",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EncryptionMode {
    Tkip,
    Ccmp,
    Unknown,
}

impl EncryptionMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            EncryptionMode::Tkip => "TKIP",
            EncryptionMode::Ccmp => "CCMP",
            EncryptionMode::Unknown => "UNKNOWN",
        }
    }
}

/// One advertised security configuration of an access point.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SecurityConfiguration {
    pub mode: SecurityMode,
    pub key_management: Vec<KeyManagementMode>,
    pub encryption: Vec<EncryptionMode>,
}

impl std::fmt::Display for SecurityConfiguration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut parts = vec![self.mode.as_str()];
        parts.extend(self.key_management.iter().map(|k| k.as_str()));
        parts.extend(self.encryption.iter().map(|e| e.as_str()));
        write!(f, "{}", parts.join("-"))
    }
}

/// The tagged element list of one management frame.
///
/// Tags are keyed by ID in ascending order; a duplicated tag keeps the
/// last occurrence. Vendor specific elements (tag 221) are additionally
/// keyed by OUI and vendor type, e.g. `00:50:F2-1` for WPA1.
#[derive(Debug, Clone)]
pub struct TaggedParameters {
    tags: BTreeMap<u8, Vec<u8>>,
    vendor_tags: BTreeMap<String, Vec<u8>>,
}

impl TaggedParameters {
    /// Walk the tagged element list starting at `start`.
    ///
    /// Any read past the end of the payload, including a truncated element
    /// value, makes the whole frame malformed. A zero length element is
    /// legal and stored with an empty value.
    pub fn parse(payload: &[u8], start: usize) -> Result<Self, Dot11Error> {
        let mut tags: BTreeMap<u8, Vec<u8>> = BTreeMap::new();
        let mut vendor_tags: BTreeMap<String, Vec<u8>> = BTreeMap::new();

        let mut position = start;
        loop {
            let tag = *payload.get(position).ok_or_else(|| {
                Dot11Error::MalformedFrame(format!("tag ID at position {} out of bounds", position))
            })?;
            let length = *payload.get(position + 1).ok_or_else(|| {
                Dot11Error::MalformedFrame(format!(
                    "tag length at position {} out of bounds",
                    position + 1
                ))
            })? as usize;

            let value: Vec<u8> = if length == 0 {
                Vec::new()
            } else {
                payload
                    .get(position + 2..position + 2 + length)
                    .ok_or_else(|| {
                        Dot11Error::MalformedFrame(format!(
                            "tag {} value truncated at position {}",
                            tag,
                            position + 2
                        ))
                    })?
                    .to_vec()
            };

            if tag == VENDOR_SPECIFIC_TAG {
                // Undersized vendor elements are skipped, not fatal.
                match vendor_key(&value) {
                    Some(key) => {
                        vendor_tags.insert(key, value.clone());
                    }
                    None => {
                        debug!("Skipping undersized vendor specific tag at position {}.", position);
                    }
                }
            }

            tags.insert(tag, value);

            position += length + 2;
            if position >= payload.len() {
                break;
            }
        }

        Ok(Self { tags, vendor_tags })
    }

    /// The SSID element.
    ///
    /// A missing element is an error distinct from a present but empty one:
    /// probes for any network and hidden networks legitimately carry an
    /// empty SSID, which maps to `None`.
    pub fn ssid(&self) -> Result<Option<String>, Dot11Error> {
        match self.tags.get(&SSID_TAG) {
            None => Err(Dot11Error::NoSuchTaggedElement(SSID_TAG)),
            Some(value) if value.is_empty() => Ok(None),
            Some(value) => match std::str::from_utf8(value) {
                Ok(ssid) => Ok(Some(ssid.to_string())),
                Err(_) => Err(Dot11Error::MalformedFrame("SSID is not valid UTF-8".to_string())),
            },
        }
    }

    /// Capability fingerprint of the transmitter.
    ///
    /// SHA-256 over the values of a fixed set of capability related tags in
    /// ascending tag ID order, followed by the vendor element keys in
    /// lexicographic order. Stable across signal strength, timestamps and
    /// sequence numbers, so the same device configuration always hashes to
    /// the same value.
    pub fn fingerprint(&self) -> String {
        let mut hasher = Sha256::new();

        for id in FINGERPRINT_TAG_IDS {
            if let Some(value) = self.tags.get(&id) {
                hasher.update(value);
            }
        }

        for key in self.vendor_tags.keys() {
            hasher.update(key.as_bytes());
        }

        hex::encode(hasher.finalize())
    }

    pub fn is_wpa1(&self) -> bool {
        self.vendor_tags.contains_key(WPA1_VENDOR_KEY)
    }

    pub fn is_wpa2(&self) -> bool {
        self.tags.contains_key(&RSN_TAG)
    }

    pub fn is_wps(&self) -> bool {
        self.vendor_tags.contains_key(WPS_VENDOR_KEY)
    }

    /// All security configurations advertised by this frame.
    ///
    /// A WPA1 or RSN element that is present but does not decode still
    /// counts as a found configuration: the failure is logged and no
    /// descriptor is added, but the frame is not reported as open. Only
    /// when neither element exists is a single `NONE` configuration
    /// returned.
    pub fn security_configurations(&self) -> Vec<SecurityConfiguration> {
        let mut configurations = Vec::new();
        let mut found = 0;

        if let Some(wpa1) = self.vendor_tags.get(WPA1_VENDOR_KEY) {
            found += 1;
            match parse_security_suites(wpa1, WPA1_SUITE_COUNT_POSITION) {
                Ok((key_management, encryption)) => configurations.push(SecurityConfiguration {
                    mode: SecurityMode::Wpa1,
                    key_management,
                    encryption,
                }),
                Err(e) => error!("Could not parse WPA1 security information: {}", e),
            }
        }

        if let Some(rsn) = self.tags.get(&RSN_TAG) {
            found += 1;
            match parse_security_suites(rsn, WPA2_SUITE_COUNT_POSITION) {
                Ok((key_management, encryption)) => configurations.push(SecurityConfiguration {
                    mode: SecurityMode::Wpa2,
                    key_management,
                    encryption,
                }),
                Err(e) => error!("Could not parse WPA2 security information: {}", e),
            }
        }

        if found == 0 {
            configurations.push(SecurityConfiguration {
                mode: SecurityMode::None,
                key_management: Vec::new(),
                encryption: Vec::new(),
            });
        }

        configurations
    }

    /// One human readable string per advertised configuration.
    pub fn security_strings(&self) -> Vec<String> {
        self.security_configurations()
            .iter()
            .map(|c| c.to_string())
            .collect()
    }
}

/// Vendor element key: OUI in uppercase hex plus the vendor type byte.
fn vendor_key(value: &[u8]) -> Option<String> {
    if value.len() >= 4 {
        Some(format!(
            "{:02X}:{:02X}:{:02X}-{}",
            value[0], value[1], value[2], value[3]
        ))
    } else {
        None
    }
}

/// Decode the cipher and key management suite lists of a WPA1 or RSN
/// element. The pairwise suite count sits at `count_position`, followed by
/// the suites themselves; the key management count and suites follow the
/// pairwise list. The suite selector is the last byte of each 4 byte suite.
fn parse_security_suites(
    data: &[u8],
    count_position: usize,
) -> Result<(Vec<KeyManagementMode>, Vec<EncryptionMode>), Dot11Error> {
    let oob = || Dot11Error::MalformedFrame("security element truncated".to_string());

    let encryption_count = *data.get(count_position).ok_or_else(oob)? as usize;
    let mut encryption = Vec::with_capacity(encryption_count);
    for i in 0..encryption_count {
        let offset = count_position + 2 + i * 4;
        let suite = data.get(offset..offset + 4).ok_or_else(oob)?;
        encryption.push(match suite[3] {
            2 => EncryptionMode::Tkip,
            4 => EncryptionMode::Ccmp,
            _ => EncryptionMode::Unknown,
        });
    }

    let km_count_position = count_position + encryption_count * 4 + 2;
    let km_count = *data.get(km_count_position).ok_or_else(oob)? as usize;
    let mut key_management = Vec::with_capacity(km_count);
    for i in 0..km_count {
        let offset = km_count_position + 2 + i * 4;
        let suite = data.get(offset..offset + 4).ok_or_else(oob)?;
        key_management.push(match suite[3] {
            1 => KeyManagementMode::Eam,
            2 => KeyManagementMode::Psk,
            _ => KeyManagementMode::Unknown,
        });
    }

    Ok((key_management, encryption))
}
