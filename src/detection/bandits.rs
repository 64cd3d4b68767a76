//! Bandit Detection
//!
//! A built-in catalog of known attack platform signatures and the
//! periodic detector matching observed fingerprints against it. The
//! catalog is read-only after process start.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::Duration;
use tracing::{debug, error};

use crate::alerts::{AlertCandidate, AlertService, AlertSubsystem, AlertType};
use crate::networks::NetworkRegistry;
use crate::sensors::SensorDirectory;

/// One known attack platform.
#[derive(Debug, Clone, Copy)]
pub struct BanditSignature {
    pub identifier: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    /// Known capability fingerprints. Empty for platforms identified by
    /// frame attributes instead of fingerprints; the sweep skips those.
    pub fingerprints: &'static [&'static str],
}

pub const CATALOG: &[BanditSignature] = &[
    BanditSignature {
        identifier: "esp32marauder",
        name: "ESP32 Marauder",
        description: "A suite of WiFi/Bluetooth offensive and defensive tools for the ESP32 platform.",
        fingerprints: &["560f2134c30d48d80fc7849e911e4057d3a4e32ab3c047f7697cf141e150d182"],
    },
    BanditSignature {
        identifier: "flipperzero_evilportal",
        name: "Flipper Zero Evil Portal",
        description: "A malicious access point for the Flipper Zero (with WiFi Dev Board) that spins up a credential stealing captive portal.",
        fingerprints: &["379211cecb97166728b8bb89c1d0771a437e8c0d969552fc36d86b8abe40be7a"],
    },
    BanditSignature {
        identifier: "pineapple_nano_tetra_pineap",
        name: "WiFi Pineapple Nano/Tetra PineAP",
        description: "The malicious PineAP access point of the popular WiFi Pineapple Nano or Tetra attack platforms.",
        fingerprints: &["29491633b99aad0b2fd647eeee336101abee389175041b48d60e94b4b361388b"],
    },
    BanditSignature {
        identifier: "pineapple_nano_mgmt",
        name: "WiFi Pineapple Nano Management Access Point",
        description: "The management access point of the popular WiFi Pineapple Nano attack platform.",
        fingerprints: &["b12836f7f3ec133f163d98a364b2689fe49b2eeddadff7d6b319f5ce441de8f1"],
    },
    BanditSignature {
        identifier: "pineapple_nano_ap",
        name: "WiFi Pineapple Nano Open Access Point",
        description: "The open access point of the popular WiFi Pineapple Nano attack platform.",
        fingerprints: &["32d24a2b5907e67350b58480e24486cd50c8dffec6242b7fd952f52b02d9ac69"],
    },
    BanditSignature {
        identifier: "pineapple_tetra_mgmt",
        name: "WiFi Pineapple Tetra Management Access Point",
        description: "The management access point of the popular WiFi Pineapple Tetra attack platform.",
        fingerprints: &["a3f0af722f37681235673c658981e74be94024ab6178fd6e99839d198066e483"],
    },
    BanditSignature {
        identifier: "pineapple_tetra_ap",
        name: "WiFi Pineapple Tetra Open Access Point",
        description: "The open access point of the popular WiFi Pineapple Tetra attack platform.",
        fingerprints: &["d79c5908617b92670f73f45b4094c4b15fa0b1a71e536959e43d865ab8ed589f"],
    },
    BanditSignature {
        identifier: "pineapple_markvii_mgmt_pineap",
        name: "WiFi Pineapple Mark VII Management Access Point or PineAP",
        description: "The management access point of the popular WiFi Pineapple Mark VII attack platform. Alternatively, this could be a specific configuration of the Pineapple PineAP.",
        fingerprints: &["23b57e5f4d7d01dba7bfc5b098cf64ba51eeb95740b97c7d56359fb9a328a8ed"],
    },
    BanditSignature {
        identifier: "pineapple_markvii_ap",
        name: "WiFi Pineapple Mark VII Open Access Point",
        description: "The open access point of the popular WiFi Pineapple Mark VII attack platform.",
        fingerprints: &["ec8eaabbdbb6c2cc43b432f66b903d5a60073b107df6715d7dc9cf846385a368"],
    },
    BanditSignature {
        identifier: "pineapple_markvii_impap",
        name: "WiFi Pineapple Mark VII Impersonation Access Point",
        description: "The impersonation access point of the popular WiFi Pineapple Mark VII attack platform.",
        fingerprints: &["7c9fa136d4413fa6173637e883b6998d32e1d675f88cddff9dcbcf331820f4b8"],
    },
    BanditSignature {
        identifier: "pineapple_markvii_evilwpa",
        name: "WiFi Pineapple Mark VII Evil WPA Access Point",
        description: "The \"Evil WPA\" access point of the popular WiFi Pineapple Mark VII attack platform.",
        fingerprints: &[
            "23b57e5f4d7d01dba7bfc5b098cf64ba51eeb95740b97c7d56359fb9a328a8ed",
            "eb725a5c7a80765d88bd11ff8bdf477951cbbc466f4aceb7b30256d537fb1a4d",
            "3ce29bfe2fa4d2f46e7dce8a59cd2e8aaf99f0fa4db901657bb39b71c07b4aed",
            "1566e87e0211da5f19a9488128efacfef39f262b334f5c6ae1d9fbe7b33708af",
            "6aeb39a36bb0fcf7683b7be317fea06950d8087bcd32b55063694a543856e685",
            "0816bacbc26fe3b8808191c3e51812b51b8026710c961d98a353ae004b34b40e",
            "c9fa351aece9c78cc42ca615301df5077c0f3a174fbc040f5fe9143fc231ae2d",
            "73e0cc087977f6d5c5a9612d6ad5beab6d9a2da0ca6a4e070a2667c42d914e9f",
            "850ff3cf6ee3c40e3197508852fa5c7e64254b22cecee6a5a207ea2fb7756ed5",
        ],
    },
    BanditSignature {
        identifier: "pineapple_markvii_evileap",
        name: "WiFi Pineapple Mark VII Evil Enterprise Access Point",
        description: "The \"Evil Enterprise\" access point of the popular WiFi Pineapple Mark VII attack platform.",
        fingerprints: &[
            "8b0fd4de88d226b186c26bab595b98b79b4db3f330eab081fcdba4fda6fe7a46",
            "cf2456fd58965c5fd80bbc295df2da778034a533b1519ebd2cc3ded0d174ff29",
            "e95c93c785807903d4ee35167423c59615f3a4fab47a130a668121c8bd81a852",
            "ff87291ccd489781625e0204588e65950b54f64de791684951d76659aa469c0e",
            "44201633ad1f31856c58aa01bc77624d6ea8ae670bd9fc4396146fd800c9fb3a",
            "a8d80613e2d3fa17dcb1598c877839fbc54ac4b4cbb1b2441bffe9a0b7dd5ae1",
            "47b979bb7de268adfd235bc0bcf758af0bc05c291ea3ba14e0e1937b5ac5c2f4",
        ],
    },
    BanditSignature {
        identifier: "omg_cable_plug",
        name: "O.MG Cable or Plug",
        description: "The access point of the popular \"O.MG\" cable or plug USB implant.",
        fingerprints: &["4b58f00646b7ab9bf84ac14640784ddfde70a269d2b1a068bbc06c08c01460de"],
    },
    BanditSignature {
        identifier: "pwnagotchi",
        name: "Pwnagotchi",
        description: "The Pwnagotchi attack platform. This detection includes additional details about the identity of the detected Pwnagotchi. Note that this detection is not based on fingerprints, but frame attributes.",
        fingerprints: &[],
    },
];

pub fn catalog() -> &'static [BanditSignature] {
    CATALOG
}

/// Matches recently observed fingerprints against the catalog.
pub struct BanditDetector {
    registry: Arc<NetworkRegistry>,
    sensors: Arc<dyn SensorDirectory>,
    alerts: Arc<AlertService>,
    sighting_window: Duration,
}

impl BanditDetector {
    pub fn new(
        registry: Arc<NetworkRegistry>,
        sensors: Arc<dyn SensorDirectory>,
        alerts: Arc<AlertService>,
        sighting_window: Duration,
    ) -> Self {
        Self {
            registry,
            sensors,
            alerts,
            sighting_window,
        }
    }

    /// One detection pass over the whole catalog.
    ///
    /// A sighting whose sensor cannot be resolved is dropped with an
    /// error instead of raising a half populated alert. Returns the
    /// number of alerts raised or merged.
    pub fn sweep(&self) -> usize {
        let mut raised = 0;

        for signature in CATALOG {
            for fingerprint in signature.fingerprints {
                for sighting in self
                    .registry
                    .bssids_advertising(fingerprint, self.sighting_window)
                {
                    let sensor = match self.sensors.resolve(sighting.sensor) {
                        Some(sensor) => sensor,
                        None => {
                            error!(
                                "Cannot resolve sensor {} for sighting of bandit \"{}\". Skipping.",
                                sighting.sensor, signature.name
                            );
                            continue;
                        }
                    };

                    let message = format!(
                        "Bandit \"{}\" advertising BSSID \"{}\" detected in range.",
                        signature.name, sighting.bssid
                    );

                    let mut attributes = BTreeMap::new();
                    attributes.insert("fingerprint".to_string(), sighting.fingerprint.clone());
                    attributes.insert("bssid".to_string(), sighting.bssid.clone());
                    attributes.insert("sensor_id".to_string(), sensor.id.to_string());
                    attributes.insert("sensor_name".to_string(), sensor.name.clone());
                    attributes.insert("bandit_name".to_string(), signature.name.to_string());
                    attributes
                        .insert("bandit_description".to_string(), signature.description.to_string());

                    let candidate = AlertCandidate {
                        alert_type: AlertType::BanditContact,
                        subsystem: AlertSubsystem::Dot11,
                        message,
                        attributes,
                        dedup_keys: vec![
                            "bssid".to_string(),
                            "fingerprint".to_string(),
                            "sensor_id".to_string(),
                        ],
                    };

                    match self.alerts.raise(candidate) {
                        Ok(alert) => {
                            debug!(
                                "Bandit contact alert {} for \"{}\" ({} frames).",
                                alert.id, signature.name, alert.frame_count
                            );
                            raised += 1;
                        }
                        Err(e) => error!("Could not raise bandit contact alert: {}", e),
                    }
                }
            }
        }

        raised
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    use uuid::Uuid;

    use crate::config::SensorEntry;
    use crate::sensors::ConfigSensorDirectory;

    #[test]
    fn test_catalog_sanity() {
        assert_eq!(CATALOG.len(), 14);

        let mut identifiers = HashSet::new();
        for signature in CATALOG {
            assert!(identifiers.insert(signature.identifier));
            assert!(!signature.name.is_empty());
            assert!(!signature.description.is_empty());

            for fingerprint in signature.fingerprints {
                assert_eq!(fingerprint.len(), 64);
                assert!(fingerprint
                    .chars()
                    .all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
            }
        }

        // Exactly one platform is matched on frame attributes instead
        let no_fingerprints: Vec<_> = CATALOG
            .iter()
            .filter(|s| s.fingerprints.is_empty())
            .collect();
        assert_eq!(no_fingerprints.len(), 1);
        assert_eq!(no_fingerprints[0].identifier, "pwnagotchi");
    }

    fn detector_fixture(sensor: Uuid) -> (Arc<NetworkRegistry>, Arc<AlertService>, BanditDetector) {
        let registry = Arc::new(NetworkRegistry::new(Duration::minutes(10)));
        let alerts = Arc::new(AlertService::new());
        let sensors = Arc::new(ConfigSensorDirectory::from_config(&[SensorEntry {
            id: sensor,
            name: "rooftop-north".to_string(),
            organization: None,
            tenant: None,
        }]));
        let detector = BanditDetector::new(
            registry.clone(),
            sensors,
            alerts.clone(),
            Duration::minutes(5),
        );
        (registry, alerts, detector)
    }

    #[test]
    fn test_sweep_raises_on_catalog_match() {
        let sensor = Uuid::new_v4();
        let (registry, alerts, detector) = detector_fixture(sensor);

        registry.observe_advertisement(
            "00:c0:ca:95:68:3b",
            Some("PineAP"),
            CATALOG[0].fingerprints[0],
            &["NONE".to_string()],
            6,
            Some(-40),
            sensor,
        );

        assert_eq!(detector.sweep(), 1);

        let active = alerts.active_alerts();
        assert_eq!(active.len(), 1);
        let alert = &active[0];
        assert_eq!(alert.alert_type, AlertType::BanditContact);
        assert_eq!(
            alert.message,
            "Bandit \"ESP32 Marauder\" advertising BSSID \"00:c0:ca:95:68:3b\" detected in range."
        );
        assert_eq!(
            alert.attributes.get("bandit_name").map(String::as_str),
            Some("ESP32 Marauder")
        );
        assert_eq!(
            alert.attributes.get("sensor_name").map(String::as_str),
            Some("rooftop-north")
        );
        assert_eq!(alert.dedup_keys.len(), 3);
    }

    #[test]
    fn test_repeated_sweeps_merge_alerts() {
        let sensor = Uuid::new_v4();
        let (registry, alerts, detector) = detector_fixture(sensor);

        registry.observe_advertisement(
            "00:c0:ca:95:68:3b",
            None,
            CATALOG[0].fingerprints[0],
            &["NONE".to_string()],
            6,
            None,
            sensor,
        );

        assert_eq!(detector.sweep(), 1);
        assert_eq!(detector.sweep(), 1);

        let active = alerts.active_alerts();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].frame_count, 2);
    }

    #[test]
    fn test_unresolvable_sensor_drops_detection() {
        let registered = Uuid::new_v4();
        let (registry, alerts, detector) = detector_fixture(registered);

        // Observed by a sensor the directory does not know
        registry.observe_advertisement(
            "00:c0:ca:95:68:3b",
            None,
            CATALOG[0].fingerprints[0],
            &["NONE".to_string()],
            6,
            None,
            Uuid::new_v4(),
        );

        assert_eq!(detector.sweep(), 0);
        assert!(alerts.active_alerts().is_empty());
    }

    #[test]
    fn test_sweep_ignores_unknown_fingerprints() {
        let sensor = Uuid::new_v4();
        let (registry, _alerts, detector) = detector_fixture(sensor);

        registry.observe_advertisement(
            "00:c0:ca:95:68:3b",
            Some("HomeWifi"),
            "0000000000000000000000000000000000000000000000000000000000000000",
            &["WPA2-PSK-CCMP".to_string()],
            6,
            Some(-55),
            sensor,
        );

        assert_eq!(detector.sweep(), 0);
    }
}
