//! Network Registry
//!
//! In-memory inventory of access points observed advertising networks.
//! Beacon and probe response interceptors feed it; the bandit detector
//! queries it for BSSIDs that recently advertised a given fingerprint.
//! A periodic sweep drops records nothing has refreshed within the
//! retention period.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use uuid::Uuid;

use crate::alerts::AlertType;
use crate::dispatch::FrameInterceptor;
use crate::dot11::frames::ParsedFrame;

/// Everything known about one advertising BSSID.
#[derive(Debug, Clone)]
pub struct BssidRecord {
    pub bssid: String,
    /// All SSIDs this BSSID has advertised. More than one usually means
    /// a multi-SSID AP, an SSID change or an impersonation platform.
    pub ssids: HashSet<String>,
    /// Fingerprint to sensor to the last time that sensor saw it.
    pub fingerprints: HashMap<String, HashMap<Uuid, DateTime<Utc>>>,
    pub security: Vec<String>,
    pub channel: u16,
    pub signal_dbm: Option<i8>,
    pub first_seen: DateTime<Utc>,
    pub last_seen: DateTime<Utc>,
    pub frame_count: u64,
}

/// One fingerprint sighting returned by advertisement queries.
#[derive(Debug, Clone)]
pub struct Sighting {
    pub bssid: String,
    pub fingerprint: String,
    pub sensor: Uuid,
    pub last_seen: DateTime<Utc>,
}

pub struct NetworkRegistry {
    networks: DashMap<String, BssidRecord>,
    retention: Duration,
}

impl NetworkRegistry {
    pub fn new(retention: Duration) -> Self {
        Self {
            networks: DashMap::new(),
            retention,
        }
    }

    /// Record one advertisement frame for a BSSID.
    #[allow(clippy::too_many_arguments)]
    pub fn observe_advertisement(
        &self,
        bssid: &str,
        ssid: Option<&str>,
        fingerprint: &str,
        security: &[String],
        channel: u16,
        signal_dbm: Option<i8>,
        sensor: Uuid,
    ) {
        let now = Utc::now();

        match self.networks.entry(bssid.to_string()) {
            Entry::Occupied(mut entry) => {
                let record = entry.get_mut();
                if let Some(ssid) = ssid {
                    record.ssids.insert(ssid.to_string());
                }
                record
                    .fingerprints
                    .entry(fingerprint.to_string())
                    .or_default()
                    .insert(sensor, now);
                record.security = security.to_vec();
                record.channel = channel;
                if signal_dbm.is_some() {
                    record.signal_dbm = signal_dbm;
                }
                record.last_seen = now;
                record.frame_count += 1;
            }
            Entry::Vacant(entry) => {
                let mut ssids = HashSet::new();
                if let Some(ssid) = ssid {
                    ssids.insert(ssid.to_string());
                }
                let mut sensors = HashMap::new();
                sensors.insert(sensor, now);
                let mut fingerprints = HashMap::new();
                fingerprints.insert(fingerprint.to_string(), sensors);

                entry.insert(BssidRecord {
                    bssid: bssid.to_string(),
                    ssids,
                    fingerprints,
                    security: security.to_vec(),
                    channel,
                    signal_dbm,
                    first_seen: now,
                    last_seen: now,
                    frame_count: 1,
                });
            }
        }
    }

    /// All sightings of `fingerprint` within `window`, across sensors.
    pub fn bssids_advertising(&self, fingerprint: &str, window: Duration) -> Vec<Sighting> {
        let cutoff = Utc::now() - window;
        let mut sightings = Vec::new();

        for entry in self.networks.iter() {
            if let Some(sensors) = entry.fingerprints.get(fingerprint) {
                for (sensor, last_seen) in sensors {
                    if *last_seen >= cutoff {
                        sightings.push(Sighting {
                            bssid: entry.bssid.clone(),
                            fingerprint: fingerprint.to_string(),
                            sensor: *sensor,
                            last_seen: *last_seen,
                        });
                    }
                }
            }
        }

        sightings
    }

    /// Drop records and fingerprint sightings older than the retention
    /// period. Returns the number of records removed.
    pub fn retention_sweep(&self) -> usize {
        let cutoff = Utc::now() - self.retention;
        let before = self.networks.len();

        self.networks.retain(|_, record| {
            record.fingerprints.retain(|_, sensors| {
                sensors.retain(|_, last_seen| *last_seen >= cutoff);
                !sensors.is_empty()
            });
            record.last_seen >= cutoff
        });

        before.saturating_sub(self.networks.len())
    }

    pub fn get(&self, bssid: &str) -> Option<BssidRecord> {
        self.networks.get(bssid).map(|record| record.clone())
    }

    pub fn len(&self) -> usize {
        self.networks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.networks.is_empty()
    }
}

/// Feeds advertisement frames of one capture interface into the registry.
pub struct RegistryInterceptor {
    registry: Arc<NetworkRegistry>,
    sensor: Uuid,
}

impl RegistryInterceptor {
    pub fn new(registry: Arc<NetworkRegistry>, sensor: Uuid) -> Self {
        Self { registry, sensor }
    }
}

impl FrameInterceptor for RegistryInterceptor {
    fn name(&self) -> &'static str {
        "network-registry"
    }

    fn raises(&self) -> &'static [AlertType] {
        &[]
    }

    fn intercept(&self, frame: &ParsedFrame) -> anyhow::Result<()> {
        match frame {
            ParsedFrame::Beacon(beacon) => {
                if !beacon.transmitter.is_empty() {
                    self.registry.observe_advertisement(
                        &beacon.transmitter,
                        beacon.ssid.as_deref(),
                        &beacon.fingerprint,
                        &beacon.security,
                        beacon.meta.channel,
                        beacon.meta.signal_dbm,
                        self.sensor,
                    );
                }
            }
            ParsedFrame::ProbeResponse(response) => {
                if !response.transmitter.is_empty() {
                    self.registry.observe_advertisement(
                        &response.transmitter,
                        response.ssid.as_deref(),
                        &response.fingerprint,
                        &response.security,
                        response.meta.channel,
                        response.meta.signal_dbm,
                        self.sensor,
                    );
                }
            }
            _ => {}
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use chrono::Utc;

    use crate::dot11::frames::BeaconFrame;
    use crate::dot11::radiotap::RadioMetadata;
    use crate::dot11::tagged::TaggedParameters;

    const FINGERPRINT: &str = "560f2134c30d48d80fc7849e911e4057d3a4e32ab3c047f7697cf141e150d182";

    fn observe(registry: &NetworkRegistry, bssid: &str, ssid: Option<&str>, sensor: Uuid) {
        registry.observe_advertisement(
            bssid,
            ssid,
            FINGERPRINT,
            &["WPA2-PSK-CCMP".to_string()],
            6,
            Some(-60),
            sensor,
        );
    }

    #[test]
    fn test_advertisements_merge_per_bssid() {
        let registry = NetworkRegistry::new(Duration::minutes(10));
        let sensor = Uuid::new_v4();

        observe(&registry, "00:c0:ca:95:68:3b", Some("WTF"), sensor);
        observe(&registry, "00:c0:ca:95:68:3b", Some("Pineapple"), sensor);

        assert_eq!(registry.len(), 1);
        let record = registry.get("00:c0:ca:95:68:3b").unwrap();
        assert_eq!(record.frame_count, 2);
        assert_eq!(record.ssids.len(), 2);
        assert!(record.ssids.contains("WTF"));
        assert!(record.last_seen >= record.first_seen);
    }

    #[test]
    fn test_bssids_advertising_respects_window() {
        let registry = NetworkRegistry::new(Duration::minutes(10));
        let sensor = Uuid::new_v4();

        observe(&registry, "00:c0:ca:95:68:3b", Some("WTF"), sensor);

        let sightings = registry.bssids_advertising(FINGERPRINT, Duration::minutes(5));
        assert_eq!(sightings.len(), 1);
        assert_eq!(sightings[0].bssid, "00:c0:ca:95:68:3b");
        assert_eq!(sightings[0].sensor, sensor);

        std::thread::sleep(std::time::Duration::from_millis(10));
        assert!(registry
            .bssids_advertising(FINGERPRINT, Duration::milliseconds(5))
            .is_empty());

        assert!(registry
            .bssids_advertising("unseen-fingerprint", Duration::minutes(5))
            .is_empty());
    }

    #[test]
    fn test_sightings_tracked_per_sensor() {
        let registry = NetworkRegistry::new(Duration::minutes(10));
        let sensor_a = Uuid::new_v4();
        let sensor_b = Uuid::new_v4();

        observe(&registry, "00:c0:ca:95:68:3b", Some("WTF"), sensor_a);
        observe(&registry, "00:c0:ca:95:68:3b", Some("WTF"), sensor_b);

        let sightings = registry.bssids_advertising(FINGERPRINT, Duration::minutes(5));
        assert_eq!(sightings.len(), 2);
    }

    #[test]
    fn test_retention_sweep() {
        let registry = NetworkRegistry::new(Duration::milliseconds(5));
        observe(&registry, "00:c0:ca:95:68:3b", Some("WTF"), Uuid::new_v4());

        std::thread::sleep(std::time::Duration::from_millis(10));
        assert_eq!(registry.retention_sweep(), 1);
        assert!(registry.is_empty());
    }

    #[test]
    fn test_interceptor_feeds_beacons() {
        let registry = Arc::new(NetworkRegistry::new(Duration::minutes(10)));
        let interceptor = RegistryInterceptor::new(registry.clone(), Uuid::new_v4());

        let tagged = TaggedParameters::parse(&[0x00, 0x03, 0x57, 0x54, 0x46], 0).unwrap();
        let beacon = BeaconFrame {
            transmitter: "00:c0:ca:95:68:3b".to_string(),
            ssid: Some("WTF".to_string()),
            fingerprint: tagged.fingerprint(),
            security: tagged.security_strings(),
            is_wps: false,
            tagged,
            meta: RadioMetadata {
                channel: 11,
                frequency: Some(2462),
                signal_dbm: Some(-48),
                antenna: None,
                captured_at: Utc::now(),
                malformed: false,
            },
        };

        interceptor.intercept(&ParsedFrame::Beacon(beacon)).unwrap();

        let record = registry.get("00:c0:ca:95:68:3b").unwrap();
        assert_eq!(record.channel, 11);
        assert_eq!(record.security, vec!["NONE"]);
        assert!(record.ssids.contains("WTF"));
    }

    #[test]
    fn test_interceptor_skips_empty_transmitter() {
        let registry = Arc::new(NetworkRegistry::new(Duration::minutes(10)));
        let interceptor = RegistryInterceptor::new(registry.clone(), Uuid::new_v4());

        let tagged = TaggedParameters::parse(&[0x00, 0x00], 0).unwrap();
        let beacon = BeaconFrame {
            transmitter: String::new(),
            ssid: None,
            fingerprint: tagged.fingerprint(),
            security: tagged.security_strings(),
            is_wps: false,
            tagged,
            meta: RadioMetadata {
                channel: 1,
                frequency: None,
                signal_dbm: None,
                antenna: None,
                captured_at: Utc::now(),
                malformed: false,
            },
        };

        interceptor.intercept(&ParsedFrame::Beacon(beacon)).unwrap();
        assert!(registry.is_empty());
    }
}
