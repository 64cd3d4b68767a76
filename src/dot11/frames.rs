//! Management Frame Parsers
//!
//! One parser per monitored subtype. Each consumes a whole frame payload
//! starting at the MAC header, together with its receive metadata, and
//! produces an immutable frame record. Parsers fail soft: a malformed
//! frame is an error the capture loop counts and drops, never a panic.
//!
//! Fixed 2-byte fields (status codes, reason codes, transaction sequence
//! numbers) are little-endian and bounds-checked before decoding.

use tracing::trace;

use crate::dot11::anonymize::Anonymizer;
use crate::dot11::frame::{read_u16_le, Dot11Error, FrameSubtype, ManagementHeader};
use crate::dot11::radiotap::RadioMetadata;
use crate::dot11::tagged::{positions, TaggedParameters};
use crate::notify::Notification;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthenticationAlgorithm {
    OpenSystem,
    SharedKey,
}

impl AuthenticationAlgorithm {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuthenticationAlgorithm::OpenSystem => "open_system",
            AuthenticationAlgorithm::SharedKey => "shared_key",
        }
    }
}

#[derive(Debug, Clone)]
pub struct BeaconFrame {
    pub transmitter: String,
    pub ssid: Option<String>,
    pub fingerprint: String,
    pub security: Vec<String>,
    pub is_wps: bool,
    pub tagged: TaggedParameters,
    pub meta: RadioMetadata,
}

impl BeaconFrame {
    pub fn parse(
        payload: &[u8],
        meta: RadioMetadata,
        anonymizer: &Anonymizer,
    ) -> Result<Self, Dot11Error> {
        let header = ManagementHeader::parse(payload);
        let tagged = TaggedParameters::parse(payload, positions::BEACON)?;

        // Hidden networks beacon without an SSID element or with an empty
        // one. Both map to no SSID.
        let ssid = match tagged.ssid() {
            Ok(Some(ssid)) => Some(anonymizer.ssid(&ssid)),
            Ok(None) => None,
            Err(Dot11Error::NoSuchTaggedElement(_)) => None,
            Err(e) => return Err(e),
        };

        Ok(Self {
            transmitter: anonymizer.bssid(&header.transmitter_string()),
            ssid,
            fingerprint: tagged.fingerprint(),
            security: tagged.security_strings(),
            is_wps: tagged.is_wps(),
            tagged,
            meta,
        })
    }
}

#[derive(Debug, Clone)]
pub struct ProbeRequestFrame {
    pub requester: String,
    pub ssid: Option<String>,
    pub is_broadcast: bool,
    pub meta: RadioMetadata,
}

impl ProbeRequestFrame {
    pub fn parse(
        payload: &[u8],
        meta: RadioMetadata,
        anonymizer: &Anonymizer,
    ) -> Result<Self, Dot11Error> {
        let header = ManagementHeader::parse(payload);

        // A probe request without a requester address is unusable.
        let requester = header.transmitter.ok_or_else(|| {
            Dot11Error::MalformedFrame("probe request without requester address".to_string())
        })?;

        let tagged = TaggedParameters::parse(payload, positions::PROBE_REQUEST)?;
        let ssid = match tagged.ssid() {
            Ok(Some(ssid)) => Some(anonymizer.ssid(&ssid)),
            Ok(None) => None,
            Err(Dot11Error::NoSuchTaggedElement(_)) => None,
            Err(e) => return Err(e),
        };

        Ok(Self {
            requester: anonymizer.bssid(&requester.to_string()),
            is_broadcast: ssid.is_none(),
            ssid,
            meta,
        })
    }
}

#[derive(Debug, Clone)]
pub struct ProbeResponseFrame {
    pub destination: String,
    pub transmitter: String,
    pub ssid: Option<String>,
    pub fingerprint: String,
    pub security: Vec<String>,
    pub is_wps: bool,
    pub tagged: TaggedParameters,
    pub meta: RadioMetadata,
}

impl ProbeResponseFrame {
    pub fn parse(
        payload: &[u8],
        meta: RadioMetadata,
        anonymizer: &Anonymizer,
    ) -> Result<Self, Dot11Error> {
        let header = ManagementHeader::parse(payload);
        let tagged = TaggedParameters::parse(payload, positions::PROBE_RESPONSE)?;

        // Unlike beacons, a probe response must carry the SSID element. An
        // empty value is still legal.
        let ssid = match tagged.ssid() {
            Ok(Some(ssid)) => Some(anonymizer.ssid(&ssid)),
            Ok(None) => None,
            Err(Dot11Error::NoSuchTaggedElement(_)) => {
                return Err(Dot11Error::MalformedFrame(
                    "probe response without SSID element".to_string(),
                ))
            }
            Err(e) => return Err(e),
        };

        Ok(Self {
            destination: anonymizer.bssid(&header.destination_string()),
            transmitter: anonymizer.bssid(&header.transmitter_string()),
            ssid,
            fingerprint: tagged.fingerprint(),
            security: tagged.security_strings(),
            is_wps: tagged.is_wps(),
            tagged,
            meta,
        })
    }
}

#[derive(Debug, Clone)]
pub struct AssociationRequestFrame {
    pub transmitter: String,
    pub destination: String,
    pub ssid: Option<String>,
    pub meta: RadioMetadata,
}

impl AssociationRequestFrame {
    pub fn parse(
        payload: &[u8],
        meta: RadioMetadata,
        anonymizer: &Anonymizer,
    ) -> Result<Self, Dot11Error> {
        let header = ManagementHeader::parse(payload);
        let tagged = TaggedParameters::parse(payload, positions::ASSOC_REQUEST)?;

        let ssid = match tagged.ssid() {
            Ok(Some(ssid)) => Some(anonymizer.ssid(&ssid)),
            Ok(None) => None,
            Err(Dot11Error::NoSuchTaggedElement(_)) => None,
            Err(e) => return Err(e),
        };

        Ok(Self {
            transmitter: anonymizer.bssid(&header.transmitter_string()),
            destination: anonymizer.bssid(&header.destination_string()),
            ssid,
            meta,
        })
    }
}

#[derive(Debug, Clone)]
pub struct AssociationResponseFrame {
    pub transmitter: String,
    pub destination: String,
    pub response_code: u16,
    pub response_string: String,
    pub meta: RadioMetadata,
}

impl AssociationResponseFrame {
    pub fn parse(
        payload: &[u8],
        meta: RadioMetadata,
        anonymizer: &Anonymizer,
    ) -> Result<Self, Dot11Error> {
        let header = ManagementHeader::parse(payload);

        let response_code = read_u16_le(payload, 26)?;
        let response_string = if response_code == 0 { "success" } else { "refused" };

        Ok(Self {
            transmitter: anonymizer.bssid(&header.transmitter_string()),
            destination: anonymizer.bssid(&header.destination_string()),
            response_code,
            response_string: response_string.to_string(),
            meta,
        })
    }
}

#[derive(Debug, Clone)]
pub struct DisassociationFrame {
    pub destination: String,
    pub transmitter: String,
    pub reason_code: u16,
    pub reason_string: String,
    pub meta: RadioMetadata,
}

impl DisassociationFrame {
    pub fn parse(
        payload: &[u8],
        meta: RadioMetadata,
        anonymizer: &Anonymizer,
    ) -> Result<Self, Dot11Error> {
        let header = ManagementHeader::parse(payload);
        let reason_code = read_u16_le(payload, 24)?;

        Ok(Self {
            destination: anonymizer.bssid(&header.destination_string()),
            transmitter: anonymizer.bssid(&header.transmitter_string()),
            reason_code,
            reason_string: leaving_reason(reason_code),
            meta,
        })
    }
}

#[derive(Debug, Clone)]
pub struct AuthenticationFrame {
    pub algorithm: AuthenticationAlgorithm,
    pub transaction_sequence: u16,
    pub status_code: u16,
    pub status_string: String,
    pub destination: String,
    pub transmitter: String,
    pub meta: RadioMetadata,
}

impl AuthenticationFrame {
    pub fn parse(
        payload: &[u8],
        meta: RadioMetadata,
        anonymizer: &Anonymizer,
    ) -> Result<Self, Dot11Error> {
        let header = ManagementHeader::parse(payload);

        let algorithm = match read_u16_le(payload, 24)? {
            0 => AuthenticationAlgorithm::OpenSystem,
            1 => AuthenticationAlgorithm::SharedKey,
            other => {
                return Err(Dot11Error::MalformedFrame(format!(
                    "invalid authentication algorithm ({})",
                    other
                )))
            }
        };

        let transaction_sequence = read_u16_le(payload, 26)?;
        let status_code = read_u16_le(payload, 28)?;
        let status_string = match status_code {
            0 => "success".to_string(),
            1 => "failure".to_string(),
            other => format!("Invalid/Unknown ({})", other),
        };

        Ok(Self {
            algorithm,
            transaction_sequence,
            status_code,
            status_string,
            destination: anonymizer.bssid(&header.destination_string()),
            transmitter: anonymizer.bssid(&header.transmitter_string()),
            meta,
        })
    }
}

#[derive(Debug, Clone)]
pub struct DeauthenticationFrame {
    pub destination: String,
    pub transmitter: String,
    pub bssid: String,
    pub reason_code: u16,
    pub reason_string: String,
    pub meta: RadioMetadata,
}

impl DeauthenticationFrame {
    pub fn parse(
        payload: &[u8],
        meta: RadioMetadata,
        anonymizer: &Anonymizer,
    ) -> Result<Self, Dot11Error> {
        let header = ManagementHeader::parse(payload);
        let reason_code = read_u16_le(payload, 24)?;

        Ok(Self {
            destination: anonymizer.bssid(&header.destination_string()),
            transmitter: anonymizer.bssid(&header.transmitter_string()),
            bssid: anonymizer.bssid(&header.bssid_string()),
            reason_code,
            reason_string: leaving_reason(reason_code),
            meta,
        })
    }
}

/// A fully parsed management frame of any monitored subtype.
#[derive(Debug, Clone)]
pub enum ParsedFrame {
    AssociationRequest(AssociationRequestFrame),
    AssociationResponse(AssociationResponseFrame),
    ProbeRequest(ProbeRequestFrame),
    ProbeResponse(ProbeResponseFrame),
    Beacon(BeaconFrame),
    Disassociation(DisassociationFrame),
    Authentication(AuthenticationFrame),
    Deauthentication(DeauthenticationFrame),
}

impl ParsedFrame {
    /// Run the parser matching the classified subtype.
    pub fn parse(
        subtype: FrameSubtype,
        payload: &[u8],
        meta: RadioMetadata,
        anonymizer: &Anonymizer,
    ) -> Result<Self, Dot11Error> {
        Ok(match subtype {
            FrameSubtype::AssociationRequest => {
                ParsedFrame::AssociationRequest(AssociationRequestFrame::parse(payload, meta, anonymizer)?)
            }
            FrameSubtype::AssociationResponse => {
                ParsedFrame::AssociationResponse(AssociationResponseFrame::parse(payload, meta, anonymizer)?)
            }
            FrameSubtype::ProbeRequest => {
                ParsedFrame::ProbeRequest(ProbeRequestFrame::parse(payload, meta, anonymizer)?)
            }
            FrameSubtype::ProbeResponse => {
                ParsedFrame::ProbeResponse(ProbeResponseFrame::parse(payload, meta, anonymizer)?)
            }
            FrameSubtype::Beacon => {
                ParsedFrame::Beacon(BeaconFrame::parse(payload, meta, anonymizer)?)
            }
            FrameSubtype::Disassociation => {
                ParsedFrame::Disassociation(DisassociationFrame::parse(payload, meta, anonymizer)?)
            }
            FrameSubtype::Authentication => {
                ParsedFrame::Authentication(AuthenticationFrame::parse(payload, meta, anonymizer)?)
            }
            FrameSubtype::Deauthentication => {
                ParsedFrame::Deauthentication(DeauthenticationFrame::parse(payload, meta, anonymizer)?)
            }
        })
    }

    pub fn subtype(&self) -> FrameSubtype {
        match self {
            ParsedFrame::AssociationRequest(_) => FrameSubtype::AssociationRequest,
            ParsedFrame::AssociationResponse(_) => FrameSubtype::AssociationResponse,
            ParsedFrame::ProbeRequest(_) => FrameSubtype::ProbeRequest,
            ParsedFrame::ProbeResponse(_) => FrameSubtype::ProbeResponse,
            ParsedFrame::Beacon(_) => FrameSubtype::Beacon,
            ParsedFrame::Disassociation(_) => FrameSubtype::Disassociation,
            ParsedFrame::Authentication(_) => FrameSubtype::Authentication,
            ParsedFrame::Deauthentication(_) => FrameSubtype::Deauthentication,
        }
    }

    pub fn meta(&self) -> &RadioMetadata {
        match self {
            ParsedFrame::AssociationRequest(f) => &f.meta,
            ParsedFrame::AssociationResponse(f) => &f.meta,
            ParsedFrame::ProbeRequest(f) => &f.meta,
            ParsedFrame::ProbeResponse(f) => &f.meta,
            ParsedFrame::Beacon(f) => &f.meta,
            ParsedFrame::Disassociation(f) => &f.meta,
            ParsedFrame::Authentication(f) => &f.meta,
            ParsedFrame::Deauthentication(f) => &f.meta,
        }
    }

    /// Build the operator-facing notification for this frame.
    ///
    /// Returns `None` for frames that are valid but carry nothing worth
    /// reporting, like authentication frames with a transaction sequence
    /// the protocol does not define.
    pub fn notification(&self) -> Option<Notification> {
        match self {
            ParsedFrame::Beacon(frame) => {
                let message = match &frame.ssid {
                    Some(ssid) => {
                        format!("Received beacon from {} for SSID {}", frame.transmitter, ssid)
                    }
                    None => format!("Received broadcast beacon from {}", frame.transmitter),
                };

                Some(
                    Notification::new(message, frame.meta.channel)
                        .add_field("transmitter", &frame.transmitter)
                        .add_field("transmitter_fingerprint", &frame.fingerprint)
                        .add_field("ssid", frame.ssid.as_deref().unwrap_or("[no SSID]"))
                        .add_field("security_full", frame.security.join(", "))
                        .add_field("is_wpa1", frame.tagged.is_wpa1())
                        .add_field("is_wpa2", frame.tagged.is_wpa2())
                        .add_field("is_wps", frame.is_wps)
                        .add_field("subtype", "beacon"),
                )
            }
            ParsedFrame::ProbeRequest(frame) => {
                let message = match &frame.ssid {
                    Some(ssid) => {
                        format!("Probe request: {} is looking for {}", frame.requester, ssid)
                    }
                    None => format!(
                        "Probe request: {} is looking for any network. (Broadcast probe)",
                        frame.requester
                    ),
                };

                Some(
                    Notification::new(message, frame.meta.channel)
                        .add_field("ssid", frame.ssid.as_deref().unwrap_or("[no SSID]"))
                        .add_field("transmitter", &frame.requester)
                        .add_field("subtype", "probe-req"),
                )
            }
            ParsedFrame::ProbeResponse(frame) => {
                let ssid = frame.ssid.as_deref().unwrap_or("[no SSID]");
                let message = format!(
                    "{} responded to probe request from {} for {}",
                    frame.transmitter, frame.destination, ssid
                );

                Some(
                    Notification::new(message, frame.meta.channel)
                        .add_field("destination", &frame.destination)
                        .add_field("transmitter", &frame.transmitter)
                        .add_field("transmitter_fingerprint", &frame.fingerprint)
                        .add_field("ssid", ssid)
                        .add_field("security_full", frame.security.join(", "))
                        .add_field("is_wpa1", frame.tagged.is_wpa1())
                        .add_field("is_wpa2", frame.tagged.is_wpa2())
                        .add_field("is_wps", frame.is_wps)
                        .add_field("subtype", "probe-resp"),
                )
            }
            ParsedFrame::AssociationRequest(frame) => {
                let ssid = frame.ssid.as_deref().unwrap_or("[no SSID]");
                let message = format!(
                    "{} is requesting to associate with {} at {}",
                    frame.transmitter, ssid, frame.destination
                );

                Some(
                    Notification::new(message, frame.meta.channel)
                        .add_field("ssid", ssid)
                        .add_field("transmitter", &frame.transmitter)
                        .add_field("destination", &frame.destination)
                        .add_field("subtype", "assoc-req"),
                )
            }
            ParsedFrame::AssociationResponse(frame) => {
                let message = format!(
                    "{} answered association request from {}. Response: {} ({})",
                    frame.transmitter,
                    frame.destination,
                    frame.response_string.to_uppercase(),
                    frame.response_code
                );

                Some(
                    Notification::new(message, frame.meta.channel)
                        .add_field("transmitter", &frame.transmitter)
                        .add_field("destination", &frame.destination)
                        .add_field("response_code", frame.response_code)
                        .add_field("response_string", &frame.response_string)
                        .add_field("subtype", "assoc-resp"),
                )
            }
            ParsedFrame::Disassociation(frame) => {
                let message = format!(
                    "{} is disassociating from {} ({})",
                    frame.transmitter, frame.destination, frame.reason_string
                );

                Some(
                    Notification::new(message, frame.meta.channel)
                        .add_field("transmitter", &frame.transmitter)
                        .add_field("destination", &frame.destination)
                        .add_field("reason_code", frame.reason_code)
                        .add_field("reason_string", &frame.reason_string)
                        .add_field("subtype", "disassoc"),
                )
            }
            ParsedFrame::Authentication(frame) => {
                let message = match frame.algorithm {
                    AuthenticationAlgorithm::OpenSystem => match frame.transaction_sequence {
                        1 => format!(
                            "{} is requesting to authenticate with Open System (WPA, WPA2, ...) at {}",
                            frame.transmitter, frame.destination
                        ),
                        2 => format!(
                            "{} is responding to Open System (WPA, WPA2, ...) authentication request from {}. ({})",
                            frame.transmitter, frame.destination, frame.status_string
                        ),
                        other => {
                            trace!(
                                "Invalid Open System authentication transaction sequence number [{}]. Skipping.",
                                other
                            );
                            return None;
                        }
                    },
                    AuthenticationAlgorithm::SharedKey => match frame.transaction_sequence {
                        1 => format!(
                            "{} is requesting to authenticate using WEP at {}",
                            frame.transmitter, frame.destination
                        ),
                        2 => format!(
                            "{} is responding to WEP authentication request at {} with clear text challenge.",
                            frame.transmitter, frame.destination
                        ),
                        4 => format!(
                            "{} is responding to WEP authentication request from {}. ({})",
                            frame.transmitter, frame.destination, frame.status_string
                        ),
                        other => {
                            trace!(
                                "Invalid WEP authentication transaction sequence number [{}]. Skipping.",
                                other
                            );
                            return None;
                        }
                    },
                };

                Some(
                    Notification::new(message, frame.meta.channel)
                        .add_field("transmitter", &frame.transmitter)
                        .add_field("destination", &frame.destination)
                        .add_field("response_code", frame.status_code)
                        .add_field("response_string", &frame.status_string)
                        .add_field("auth_algorithm", frame.algorithm.as_str())
                        .add_field("transaction_sequence_number", frame.transaction_sequence)
                        .add_field("is_wep", frame.algorithm == AuthenticationAlgorithm::SharedKey)
                        .add_field("subtype", "auth"),
                )
            }
            ParsedFrame::Deauthentication(frame) => {
                let message = format!(
                    "Deauth: Transmitter {} is deauthenticating {} from BSSID {} ({})",
                    frame.transmitter, frame.destination, frame.bssid, frame.reason_string
                );

                Some(
                    Notification::new(message, frame.meta.channel)
                        .add_field("transmitter", &frame.transmitter)
                        .add_field("destination", &frame.destination)
                        .add_field("bssid", &frame.bssid)
                        .add_field("reason_code", frame.reason_code)
                        .add_field("reason_string", &frame.reason_string)
                        .add_field("subtype", "deauth"),
                )
            }
        }
    }
}

/// Human readable text for a deauthentication or disassociation reason
/// code, per IEEE 802.11-2012 table 8-36.
pub fn leaving_reason(code: u16) -> String {
    match code {
        0 => "Reserved".to_string(),
        1 => "Unspecified reason".to_string(),
        2 => "Previous authentication no longer valid".to_string(),
        3 => "Deauthenticated because sending STA is leaving (or has left) IBSS or ESS".to_string(),
        4 => "Disassociated due to inactivity".to_string(),
        5 => "Disassociated because AP is unable to handle all currently associated STAs".to_string(),
        6 => "Class 2 frame received from nonauthenticated STA".to_string(),
        7 => "Class 3 frame received from nonassociated STA".to_string(),
        8 => "Disassociated because sending STA is leaving (or has left) BSS".to_string(),
        9 => "STA requesting (re)association is not authenticated with responding STA".to_string(),
        10 => "Disassociated because the information in the Power Capability element is unacceptable".to_string(),
        11 => "Disassociated because the information in the Supported Channels element is unacceptable".to_string(),
        12 => "Disassociated due to BSS Transition Management".to_string(),
        13 => "Invalid element i.e. an element defined in this standard for which the content does not meet the specifications in Clause 8".to_string(),
        14 => "Message integrity code (MIC) failure".to_string(),
        15 => "4-Way Handshake timeout".to_string(),
        16 => "Group Key Handshake timeout".to_string(),
        17 => "Element in 4-Way Handshake different from (Re)Association Request/Probe Response/Beacon frame".to_string(),
        18 => "Invalid group cypher".to_string(),
        19 => "Invalid pairwise cypher".to_string(),
        20 => "Invalid AKMP".to_string(),
        21 => "Unsupported RSNE version".to_string(),
        22 => "Invalid RSNE capabilities".to_string(),
        23 => "IEEE 802.1X authentication failed".to_string(),
        24 => "Cipher suite rejected because of the security policy".to_string(),
        25 => "TDLS direct-link teardown due to TDLS peer STA unreachable via the TDLS direct link".to_string(),
        26 => "TDLS direct-link teardown for unspecified reason".to_string(),
        27 => "Disassociated because session terminated by SSP request".to_string(),
        28 => "Disassociated because of lack of SSP roaming agreement".to_string(),
        29 => "Requested service rejected because of SSP cipher suite or AKM requirement".to_string(),
        30 => "Requested service not authorized in this location".to_string(),
        31 => "TS deleted because QoS AP lacks sufficient bandwidth for this QoS STA due to change in BSS service characteristics or operational mode (e.g. an HT BSS change from 40 MHz channel to 20 MHz channel".to_string(),
        32 => "Disassociated for unspecified, QoS-related reason".to_string(),
        33 => "Disassociated because QoS AP lacks sufficient bandwidth for this QoS STA".to_string(),
        34 => "Disassociated because excessive number of frames need to be acknowledged, but are not acknowledged due to AP transmissions and/or poor channel conditions".to_string(),
        35 => "Disassociated because STA is transmitting outside the limits of TXOPs".to_string(),
        36 => "Requested from peer STA as the STA is leaving the BSS (or resetting)".to_string(),
        37 => "Requested from peer STA as the STA does not want to use the mechanism".to_string(),
        38 => "Requested from peer STA as the STA received frames using the mechanism for which setup is required".to_string(),
        39 => "Requested from peer STA due to timeout".to_string(),
        45 => "Peer STA does not support the requested cipher suite".to_string(),
        46 => "Disassociated because authorized access limit reached".to_string(),
        47 => "Disassociated due to external service requirements".to_string(),
        48 => "Invalid FT Action frame count".to_string(),
        49 => "Invalid pairwise master key identified (PMKI)".to_string(),
        50 => "Invalid MDE".to_string(),
        51 => "Invalid FTE".to_string(),
        52 => "SME cancels the mesh peering instance with the reason other than reaching the maximum number of peer mesh STAs".to_string(),
        53 => "The mesh STA has reached the supported maximum number of peer STAs".to_string(),
        54 => "The received information violates the Mesh Configuration policy configured in the mesh STA profile".to_string(),
        55 => "The mesh STA has received a Mesh Peering Close message requesting to close the mesh peering".to_string(),
        56 => "The mesh STA has resent dot11MeshMaxRetries Mesh Peering Open messages, without receiving a Mesh Peering Confirm message".to_string(),
        57 => "The confirmTimer for the mesh peering instance times out".to_string(),
        58 => "The mesh STA fails to unwrap the GTK or the values in the wrapped contents do not match".to_string(),
        59 => "The mesh STA receives inconsistent information about the mesh parameters between Mesh Peering Management frames".to_string(),
        60 => "The mesh STA fails the authenticated mesh peering exchange because due to failure in selecting either the pairwise ciphersuite or group ciphersuite".to_string(),
        61 => "The mesh STA does not have proxy information for this external destination".to_string(),
        62 => "The mesh STA does not have forwarding information for this destination".to_string(),
        63 => "The mesh STA determines that the link to the next hop of an active path in its forwarding information is no longer usable".to_string(),
        64 => "The Deauthentication frame was sent because the MAC address of the STA already exists in the mesh BSS.".to_string(),
        65 => "The mesh STA performs channel switch to meet regulatory requirements".to_string(),
        66 => "The mesh STA performs channel switch with unspecified reason".to_string(),
        _ => format!("Unknown reason ({})", code),
    }
}
