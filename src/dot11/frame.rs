//! 802.11 Frame Primitives
//!
//! MAC addresses, management subtype classification and the fixed
//! 24-byte management MAC header.

use thiserror::Error;

/// Errors produced while decoding 802.11 frames.
///
/// `MalformedFrame` is recoverable per frame: the capture loop drops the
/// frame, counts it and keeps running. `NoSuchTaggedElement` signals a
/// missing tagged element and is only fatal where the element is required
/// for the frame type at hand.
#[derive(Debug, Error)]
pub enum Dot11Error {
    #[error("malformed frame: {0}")]
    MalformedFrame(String),

    #[error("tagged element {0} not present")]
    NoSuchTaggedElement(u8),
}

/// MAC address (6 bytes)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MacAddr([u8; 6]);

impl MacAddr {
    pub const BROADCAST: MacAddr = MacAddr([0xff, 0xff, 0xff, 0xff, 0xff, 0xff]);

    pub fn new(bytes: [u8; 6]) -> Self {
        Self(bytes)
    }

    pub fn from_slice(data: &[u8]) -> Option<Self> {
        if data.len() >= 6 {
            let mut bytes = [0u8; 6];
            bytes.copy_from_slice(&data[..6]);
            Some(Self(bytes))
        } else {
            None
        }
    }

    pub fn as_bytes(&self) -> &[u8; 6] {
        &self.0
    }

    pub fn is_broadcast(&self) -> bool {
        self.0 == [0xff, 0xff, 0xff, 0xff, 0xff, 0xff]
    }

    pub fn is_multicast(&self) -> bool {
        self.0[0] & 0x01 != 0
    }
}

impl std::fmt::Display for MacAddr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:02x}:{:02x}:{:02x}:{:02x}:{:02x}:{:02x}",
            self.0[0], self.0[1], self.0[2],
            self.0[3], self.0[4], self.0[5])
    }
}

/// The management frame subtypes this system monitors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FrameSubtype {
    AssociationRequest,
    AssociationResponse,
    ProbeRequest,
    ProbeResponse,
    Beacon,
    Disassociation,
    Authentication,
    Deauthentication,
}

impl FrameSubtype {
    pub const ALL: [FrameSubtype; 8] = [
        FrameSubtype::AssociationRequest,
        FrameSubtype::AssociationResponse,
        FrameSubtype::ProbeRequest,
        FrameSubtype::ProbeResponse,
        FrameSubtype::Beacon,
        FrameSubtype::Disassociation,
        FrameSubtype::Authentication,
        FrameSubtype::Deauthentication,
    ];

    /// Classify a frame from the first byte of its frame control field.
    ///
    /// The first byte carries version, type and subtype bits. Folding the
    /// type bits into the high nibble yields a single code per subtype:
    /// management frames map to 0x00..0x0f, control to 0x1x, data to 0x2x.
    /// Returns `None` for anything outside the monitored management set,
    /// which callers drop without error.
    pub fn classify(first_byte: u8) -> Option<Self> {
        let code = ((first_byte << 2) & 0x30) | ((first_byte >> 4) & 0x0f);

        match code {
            0x00 => Some(FrameSubtype::AssociationRequest),
            0x01 => Some(FrameSubtype::AssociationResponse),
            0x04 => Some(FrameSubtype::ProbeRequest),
            0x05 => Some(FrameSubtype::ProbeResponse),
            0x08 => Some(FrameSubtype::Beacon),
            0x0a => Some(FrameSubtype::Disassociation),
            0x0b => Some(FrameSubtype::Authentication),
            0x0c => Some(FrameSubtype::Deauthentication),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            FrameSubtype::AssociationRequest => "assoc-req",
            FrameSubtype::AssociationResponse => "assoc-resp",
            FrameSubtype::ProbeRequest => "probe-req",
            FrameSubtype::ProbeResponse => "probe-resp",
            FrameSubtype::Beacon => "beacon",
            FrameSubtype::Disassociation => "disassoc",
            FrameSubtype::Authentication => "auth",
            FrameSubtype::Deauthentication => "deauth",
        }
    }

    /// Stable index for per-subtype counters.
    pub fn index(&self) -> usize {
        match self {
            FrameSubtype::AssociationRequest => 0,
            FrameSubtype::AssociationResponse => 1,
            FrameSubtype::ProbeRequest => 2,
            FrameSubtype::ProbeResponse => 3,
            FrameSubtype::Beacon => 4,
            FrameSubtype::Disassociation => 5,
            FrameSubtype::Authentication => 6,
            FrameSubtype::Deauthentication => 7,
        }
    }
}

/// Length of the fixed management MAC header.
pub const MAC_HEADER_LEN: usize = 24;

/// Addresses of the fixed management MAC header.
///
/// Address 1 is the destination, address 2 the transmitter and address 3
/// the BSSID. A frame shorter than an address field simply has no value
/// there; parsers map absent addresses to empty strings unless the frame
/// type requires them.
#[derive(Debug, Clone, Copy)]
pub struct ManagementHeader {
    pub destination: Option<MacAddr>,
    pub transmitter: Option<MacAddr>,
    pub bssid: Option<MacAddr>,
}

impl ManagementHeader {
    pub fn parse(frame: &[u8]) -> Self {
        Self {
            destination: frame.get(4..10).and_then(MacAddr::from_slice),
            transmitter: frame.get(10..16).and_then(MacAddr::from_slice),
            bssid: frame.get(16..22).and_then(MacAddr::from_slice),
        }
    }

    pub fn destination_string(&self) -> String {
        self.destination.map(|m| m.to_string()).unwrap_or_default()
    }

    pub fn transmitter_string(&self) -> String {
        self.transmitter.map(|m| m.to_string()).unwrap_or_default()
    }

    pub fn bssid_string(&self) -> String {
        self.bssid.map(|m| m.to_string()).unwrap_or_default()
    }
}

/// Read a little-endian 16 bit fixed field with bounds validation.
pub fn read_u16_le(frame: &[u8], offset: usize) -> Result<u16, Dot11Error> {
    frame
        .get(offset..offset + 2)
        .map(|b| u16::from_le_bytes([b[0], b[1]]))
        .ok_or_else(|| {
            Dot11Error::MalformedFrame(format!("fixed field at offset {} out of bounds", offset))
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_monitored_subtypes() {
        assert_eq!(FrameSubtype::classify(0x00), Some(FrameSubtype::AssociationRequest));
        assert_eq!(FrameSubtype::classify(0x10), Some(FrameSubtype::AssociationResponse));
        assert_eq!(FrameSubtype::classify(0x40), Some(FrameSubtype::ProbeRequest));
        assert_eq!(FrameSubtype::classify(0x50), Some(FrameSubtype::ProbeResponse));
        assert_eq!(FrameSubtype::classify(0x80), Some(FrameSubtype::Beacon));
        assert_eq!(FrameSubtype::classify(0xa0), Some(FrameSubtype::Disassociation));
        assert_eq!(FrameSubtype::classify(0xb0), Some(FrameSubtype::Authentication));
        assert_eq!(FrameSubtype::classify(0xc0), Some(FrameSubtype::Deauthentication));
    }

    #[test]
    fn test_classify_drops_unmonitored_subtypes() {
        // Action frame (management subtype 13)
        assert_eq!(FrameSubtype::classify(0xd0), None);
        // ATIM (management subtype 9)
        assert_eq!(FrameSubtype::classify(0x90), None);
        // RTS control frame
        assert_eq!(FrameSubtype::classify(0xb4), None);
        // QoS data frame
        assert_eq!(FrameSubtype::classify(0x88), None);
    }

    #[test]
    fn test_mac_addr_display() {
        let mac = MacAddr::new([0x00, 0xc0, 0xca, 0x95, 0x68, 0x3b]);
        assert_eq!(mac.to_string(), "00:c0:ca:95:68:3b");
    }

    #[test]
    fn test_mac_addr_broadcast() {
        assert!(MacAddr::BROADCAST.is_broadcast());
        assert!(MacAddr::BROADCAST.is_multicast());
        assert!(!MacAddr::new([0, 1, 2, 3, 4, 5]).is_broadcast());
    }

    #[test]
    fn test_management_header_extraction() {
        let mut frame = vec![0u8; 24];
        frame[4..10].copy_from_slice(&[0xff; 6]);
        frame[10..16].copy_from_slice(&[0x00, 0xc0, 0xca, 0x95, 0x68, 0x3b]);
        frame[16..22].copy_from_slice(&[0x00, 0xc0, 0xca, 0x95, 0x68, 0x3b]);

        let header = ManagementHeader::parse(&frame);
        assert_eq!(header.destination_string(), "ff:ff:ff:ff:ff:ff");
        assert_eq!(header.transmitter_string(), "00:c0:ca:95:68:3b");
        assert_eq!(header.bssid_string(), "00:c0:ca:95:68:3b");
    }

    #[test]
    fn test_management_header_truncated() {
        let header = ManagementHeader::parse(&[0u8; 12]);
        assert!(header.destination.is_some());
        assert!(header.transmitter.is_none());
        assert_eq!(header.transmitter_string(), "");
    }

    #[test]
    fn test_read_u16_le() {
        let data = [0x00, 0x00, 0x34, 0x12];
        assert_eq!(read_u16_le(&data, 2).unwrap(), 0x1234);
        assert!(read_u16_le(&data, 3).is_err());
    }
}
