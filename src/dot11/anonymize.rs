//! Frame Anonymization
//!
//! Replaces SSIDs and BSSIDs with stable pseudonyms before frames leave
//! the parsers, for demo recordings and shareable captures. Mappings are
//! consistent within a run and kept in memory only.

use std::collections::HashMap;

use parking_lot::Mutex;
use rand::Rng;

/// Replacement SSID pool. Picks are random but stable per original SSID.
const SSID_POPULATION: &[&str] = &[
    "linksys",
    "NETGEAR",
    "NETGEAR24",
    "dlink",
    "default",
    "xfinitywifi",
    "XFINITY",
    "ATTWiFi",
    "CenturyLink0483",
    "MySpectrumWiFi58",
    "TP-Link_Guest",
    "TELUS1122",
    "BELL456",
    "Verizon_B3TQ4C",
    "HP-Print-A2-Officejet",
    "FRITZ!Box 7490",
    "Vodafone-Hotspot",
    "Telekom_FON",
    "eduroam",
    "attwifi",
    "Google Starbucks",
    "CoffeeShopGuest",
    "Airport_Free_WiFi",
    "Hotel Guest",
    "Free Public WiFi",
    "Home-Network",
    "Lakehouse",
    "The Grid",
    "Skynet",
    "PrettyFlyForAWiFi",
    "TellMyWiFiLoveHer",
    "FBI Surveillance Van 4",
    "Abraham Linksys",
    "The LAN Before Time",
    "Bill Wi The Science Fi",
    "Wu-Tang LAN",
    "LAN Solo",
    "It Burns When IP",
    "Drop It Like Its Hotspot",
    "No More Mister WiFi",
    "Silence of the LANs",
    "House LANnister",
    "Winternet Is Coming",
    "The Promised LAN",
    "404 Network Unavailable",
    "Loading...",
    "Hidden Network",
    "GET OFF MY LAN",
];

/// Stable pseudonym store for SSIDs and BSSIDs.
pub struct Anonymizer {
    enabled: bool,
    ssids: Mutex<HashMap<String, String>>,
    bssids: Mutex<HashMap<String, String>>,
}

impl Anonymizer {
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            ssids: Mutex::new(HashMap::new()),
            bssids: Mutex::new(HashMap::new()),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Replace an SSID with a pseudonym from the population.
    ///
    /// Empty SSIDs pass through so hidden networks stay recognizable as
    /// hidden. A population pick already in use by another SSID falls back
    /// to a numbered pseudonym to keep the mapping injective.
    pub fn ssid(&self, ssid: &str) -> String {
        if !self.enabled || ssid.is_empty() {
            return ssid.to_string();
        }

        let mut map = self.ssids.lock();
        if let Some(anonymized) = map.get(ssid) {
            return anonymized.clone();
        }

        let mut rng = rand::thread_rng();
        let candidate = SSID_POPULATION[rng.gen_range(0..SSID_POPULATION.len())].to_string();
        let replacement = if map.values().any(|v| *v == candidate) {
            format!("ssid-{}", rng.gen_range(0..999_999u32))
        } else {
            candidate
        };

        map.insert(ssid.to_string(), replacement.clone());
        replacement
    }

    /// Replace a BSSID with a pseudonym that keeps the OUI.
    ///
    /// The vendor prefix stays intact so OUI lookups on recordings still
    /// work; only the device specific half is randomized.
    pub fn bssid(&self, bssid: &str) -> String {
        if !self.enabled || bssid.is_empty() {
            return bssid.to_string();
        }

        let lower = bssid.to_lowercase();
        let mut map = self.bssids.lock();
        if let Some(anonymized) = map.get(&lower) {
            return anonymized.clone();
        }

        let mut rng = rand::thread_rng();
        let prefix: String = lower.chars().take(8).collect();
        let replacement = format!(
            "{}:{:02x}:{:02x}:{:02x}",
            prefix,
            rng.gen::<u8>(),
            rng.gen::<u8>(),
            rng.gen::<u8>()
        );

        map.insert(lower, replacement.clone());
        replacement
    }
}
