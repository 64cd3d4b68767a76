//! Radiotap Header Parser
//!
//! Parses the radiotap header prepended to every frame delivered by a
//! monitor-mode capture, and condenses it into the receive metadata
//! attached to parsed frames.
//!
//! Reference: https://www.radiotap.org/

use chrono::{DateTime, Utc};

/// Radiotap present flags
pub mod flags {
    pub const TSFT: u32 = 1 << 0;
    pub const FLAGS: u32 = 1 << 1;
    pub const RATE: u32 = 1 << 2;
    pub const CHANNEL: u32 = 1 << 3;
    pub const FHSS: u32 = 1 << 4;
    pub const DBM_ANTSIGNAL: u32 = 1 << 5;
    pub const DBM_ANTNOISE: u32 = 1 << 6;
    pub const LOCK_QUALITY: u32 = 1 << 7;
    pub const TX_ATTENUATION: u32 = 1 << 8;
    pub const DB_TX_ATTENUATION: u32 = 1 << 9;
    pub const DBM_TX_POWER: u32 = 1 << 10;
    pub const ANTENNA: u32 = 1 << 11;
    pub const DB_ANTSIGNAL: u32 = 1 << 12;
    pub const DB_ANTNOISE: u32 = 1 << 13;
    pub const EXT: u32 = 1 << 31;
}

/// Bits of the radiotap frame flags field
pub mod frame_flags {
    pub const SHORT_PREAMBLE: u8 = 0x02;
    pub const WEP: u8 = 0x04;
    pub const FCS_AT_END: u8 = 0x10;
    pub const BAD_FCS: u8 = 0x40;
}

/// Parsed radiotap header
#[derive(Debug, Clone, Default)]
pub struct RadiotapHeader {
    /// Header version (usually 0)
    pub version: u8,
    /// Total header length including fields
    pub length: u16,
    /// First present word indicating which fields are present
    pub present_flags: u32,
}

/// Extracted information from radiotap fields
#[derive(Debug, Clone, Default)]
pub struct RadiotapInfo {
    /// MAC timestamp in microseconds
    pub tsft: Option<u64>,
    /// Frame flags
    pub flags: Option<u8>,
    /// Data rate in 500Kbps units
    pub rate: Option<u8>,
    /// Channel frequency in MHz
    pub channel_freq: Option<u16>,
    /// Channel flags
    pub channel_flags: Option<u16>,
    /// Signal strength in dBm
    pub signal_dbm: Option<i8>,
    /// Noise floor in dBm
    pub noise_dbm: Option<i8>,
    /// Antenna index
    pub antenna: Option<u8>,
}

impl RadiotapInfo {
    /// The frame failed its checksum according to the capture driver.
    pub fn bad_fcs(&self) -> bool {
        self.flags.map(|f| f & frame_flags::BAD_FCS != 0).unwrap_or(false)
    }
}

/// Convert frequency to channel number
fn freq_to_channel(freq: u16) -> u16 {
    if freq >= 2412 && freq <= 2484 {
        // 2.4 GHz band
        if freq == 2484 {
            14
        } else {
            (freq - 2407) / 5
        }
    } else if freq >= 5170 && freq <= 5825 {
        // 5 GHz band
        (freq - 5000) / 5
    } else if freq >= 5955 && freq <= 7115 {
        // 6 GHz band (WiFi 6E)
        (freq - 5950) / 5
    } else {
        0
    }
}

/// Parse a radiotap header and extract its fields.
///
/// Returns the header, the extracted fields and the total header length,
/// which is the offset of the 802.11 MAC header within the capture.
/// Returns `None` for truncated headers or unsupported versions.
pub fn parse_radiotap(data: &[u8]) -> Option<(RadiotapHeader, RadiotapInfo, usize)> {
    if data.len() < 8 {
        return None;
    }

    let version = data[0];
    if version != 0 {
        return None; // Only version 0 supported
    }

    let _pad = data[1];
    let length = u16::from_le_bytes([data[2], data[3]]);
    let present_flags = u32::from_le_bytes([data[4], data[5], data[6], data[7]]);

    if data.len() < length as usize || (length as usize) < 8 {
        return None;
    }

    // The present bitmap can chain: bit 31 announces another present word.
    // Fields start after the last word. Only the first word's fields are
    // extracted; the chain still has to be walked to find the field start.
    let mut fields_start = 8usize;
    let mut word = present_flags;
    while word & flags::EXT != 0 {
        if fields_start + 4 > length as usize {
            return None;
        }
        word = u32::from_le_bytes([
            data[fields_start],
            data[fields_start + 1],
            data[fields_start + 2],
            data[fields_start + 3],
        ]);
        fields_start += 4;
    }

    let header = RadiotapHeader {
        version,
        length,
        present_flags,
    };

    let info = parse_radiotap_fields(&data[..length as usize], fields_start, present_flags);

    Some((header, info, length as usize))
}

/// Walk the radiotap fields announced by the first present word.
///
/// Alignment is relative to the start of the radiotap header, which is
/// why the walk runs over the full header slice.
fn parse_radiotap_fields(data: &[u8], start: usize, present: u32) -> RadiotapInfo {
    let mut info = RadiotapInfo::default();
    let mut pos = start;

    // TSFT (8 bytes, 8-byte aligned)
    if present & flags::TSFT != 0 {
        if pos % 8 != 0 {
            pos += 8 - (pos % 8);
        }
        if pos + 8 <= data.len() {
            info.tsft = Some(u64::from_le_bytes([
                data[pos], data[pos+1], data[pos+2], data[pos+3],
                data[pos+4], data[pos+5], data[pos+6], data[pos+7],
            ]));
            pos += 8;
        }
    }

    // Flags (1 byte)
    if present & flags::FLAGS != 0 {
        if pos < data.len() {
            info.flags = Some(data[pos]);
            pos += 1;
        }
    }

    // Rate (1 byte)
    if present & flags::RATE != 0 {
        if pos < data.len() {
            info.rate = Some(data[pos]);
            pos += 1;
        }
    }

    // Channel (4 bytes, 2-byte aligned)
    if present & flags::CHANNEL != 0 {
        if pos % 2 != 0 {
            pos += 1;
        }
        if pos + 4 <= data.len() {
            info.channel_freq = Some(u16::from_le_bytes([data[pos], data[pos+1]]));
            info.channel_flags = Some(u16::from_le_bytes([data[pos+2], data[pos+3]]));
            pos += 4;
        }
    }

    // FHSS (2 bytes, 2-byte aligned)
    if present & flags::FHSS != 0 {
        if pos % 2 != 0 {
            pos += 1;
        }
        pos += 2;
    }

    // Antenna signal (1 byte, signed)
    if present & flags::DBM_ANTSIGNAL != 0 {
        if pos < data.len() {
            info.signal_dbm = Some(data[pos] as i8);
            pos += 1;
        }
    }

    // Antenna noise (1 byte, signed)
    if present & flags::DBM_ANTNOISE != 0 {
        if pos < data.len() {
            info.noise_dbm = Some(data[pos] as i8);
            pos += 1;
        }
    }

    // Lock quality (2 bytes, 2-byte aligned)
    if present & flags::LOCK_QUALITY != 0 {
        if pos % 2 != 0 {
            pos += 1;
        }
        pos += 2;
    }

    // TX attenuation (2 bytes, 2-byte aligned)
    if present & flags::TX_ATTENUATION != 0 {
        if pos % 2 != 0 {
            pos += 1;
        }
        pos += 2;
    }

    // dB TX attenuation (2 bytes, 2-byte aligned)
    if present & flags::DB_TX_ATTENUATION != 0 {
        if pos % 2 != 0 {
            pos += 1;
        }
        pos += 2;
    }

    // dBm TX power (1 byte, signed)
    if present & flags::DBM_TX_POWER != 0 {
        pos += 1;
    }

    // Antenna (1 byte)
    if present & flags::ANTENNA != 0 {
        if pos < data.len() {
            info.antenna = Some(data[pos]);
        }
    }

    info
}

/// Receive-side metadata attached to every parsed frame.
///
/// Produced once per captured frame and immutable afterwards. The
/// `malformed` flag is set when the capture driver reported a failed
/// checksum; such frames are counted but never handed to frame parsers.
#[derive(Debug, Clone)]
pub struct RadioMetadata {
    /// Channel the frame was received on
    pub channel: u16,
    /// Channel frequency in MHz, if the driver reported one
    pub frequency: Option<u16>,
    /// Signal strength in dBm
    pub signal_dbm: Option<i8>,
    /// Antenna index
    pub antenna: Option<u8>,
    /// Capture timestamp
    pub captured_at: DateTime<Utc>,
    /// Frame failed the FCS check
    pub malformed: bool,
}

impl RadioMetadata {
    /// Condense radiotap fields into frame metadata.
    ///
    /// Some drivers omit the channel field. The caller passes the channel
    /// the interface is currently tuned to as a fallback so every frame
    /// still carries a channel.
    pub fn from_info(info: &RadiotapInfo, fallback_channel: u16) -> Self {
        let channel = match info.channel_freq {
            Some(freq) => {
                let ch = freq_to_channel(freq);
                if ch > 0 { ch } else { fallback_channel }
            }
            None => fallback_channel,
        };

        Self {
            channel,
            frequency: info.channel_freq,
            signal_dbm: info.signal_dbm,
            antenna: info.antenna,
            captured_at: Utc::now(),
            malformed: info.bad_fcs(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_freq_to_channel() {
        assert_eq!(freq_to_channel(2412), 1);
        assert_eq!(freq_to_channel(2437), 6);
        assert_eq!(freq_to_channel(2462), 11);
        assert_eq!(freq_to_channel(2484), 14);
        assert_eq!(freq_to_channel(5180), 36);
        assert_eq!(freq_to_channel(5745), 149);
    }

    #[test]
    fn test_parse_minimal_radiotap() {
        // Minimal radiotap header: version, pad, length=8, present=0
        let data = [0x00, 0x00, 0x08, 0x00, 0x00, 0x00, 0x00, 0x00];
        let result = parse_radiotap(&data);
        assert!(result.is_some());

        let (header, info, len) = result.unwrap();
        assert_eq!(header.version, 0);
        assert_eq!(header.length, 8);
        assert_eq!(header.present_flags, 0);
        assert_eq!(len, 8);
        assert!(info.tsft.is_none());
    }

    #[test]
    fn test_parse_radiotap_fields() {
        // Flags + channel + antenna signal present
        let present = flags::FLAGS | flags::CHANNEL | flags::DBM_ANTSIGNAL;
        let mut data = vec![0x00, 0x00, 0x10, 0x00];
        data.extend_from_slice(&present.to_le_bytes());
        data.push(frame_flags::FCS_AT_END); // flags @ 8
        data.push(0x00); // pad to 2-byte alignment
        data.extend_from_slice(&2437u16.to_le_bytes()); // channel freq @ 10
        data.extend_from_slice(&0x0080u16.to_le_bytes()); // channel flags
        data.push(0xc5); // -59 dBm
        data.push(0x00); // pad to declared length 16

        let (_, info, len) = parse_radiotap(&data).unwrap();
        assert_eq!(len, 16);
        assert_eq!(info.flags, Some(frame_flags::FCS_AT_END));
        assert_eq!(info.channel_freq, Some(2437));
        assert_eq!(info.signal_dbm, Some(-59));
        assert!(!info.bad_fcs());
    }

    #[test]
    fn test_parse_radiotap_extended_present_chain() {
        // Two present words; flags field lands after the second word
        let present1 = flags::FLAGS | flags::EXT;
        let present2 = 0u32;
        let mut data = vec![0x00, 0x00, 0x0e, 0x00];
        data.extend_from_slice(&present1.to_le_bytes());
        data.extend_from_slice(&present2.to_le_bytes());
        data.push(frame_flags::BAD_FCS); // flags @ 12
        data.push(0x00);

        let (_, info, len) = parse_radiotap(&data).unwrap();
        assert_eq!(len, 14);
        assert_eq!(info.flags, Some(frame_flags::BAD_FCS));
        assert!(info.bad_fcs());
    }

    #[test]
    fn test_metadata_channel_fallback() {
        let mut info = RadiotapInfo::default();
        let meta = RadioMetadata::from_info(&info, 11);
        assert_eq!(meta.channel, 11);
        assert!(!meta.malformed);

        info.channel_freq = Some(5180);
        let meta = RadioMetadata::from_info(&info, 11);
        assert_eq!(meta.channel, 36);
        assert_eq!(meta.frequency, Some(5180));

        info.flags = Some(frame_flags::BAD_FCS);
        let meta = RadioMetadata::from_info(&info, 11);
        assert!(meta.malformed);
    }
}
