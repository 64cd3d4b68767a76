//! Alert Deduplication Store
//!
//! Thread safe store keyed by dedup checksum. Capture threads and the
//! periodic detector raise candidates concurrently; the entry lock of the
//! backing map makes each check-then-act atomic per key, so two frames
//! for the same key arriving from different interfaces can never create
//! two alerts.

use chrono::{DateTime, Duration, Utc};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::alerts::{Alert, AlertCandidate, AlertError};

/// Detections within this window of an alert's last sighting merge into
/// it; later ones start a fresh incident.
const ACTIVE_THRESHOLD_MINUTES: i64 = 5;

pub struct AlertService {
    alerts: DashMap<String, Alert>,
    active_window: Duration,
}

impl AlertService {
    pub fn new() -> Self {
        Self::with_active_window(Duration::minutes(ACTIVE_THRESHOLD_MINUTES))
    }

    pub fn with_active_window(active_window: Duration) -> Self {
        Self {
            alerts: DashMap::new(),
            active_window,
        }
    }

    /// Raise a detection.
    ///
    /// Merges into a matching active alert (bumping `last_seen` and
    /// `frame_count`, keeping UUID and `first_seen`) or creates a fresh
    /// alert. A candidate whose attributes do not cover its declared
    /// dedup keys is rejected.
    pub fn raise(&self, candidate: AlertCandidate) -> Result<Alert, AlertError> {
        let checksum = dedup_checksum(&candidate)?;
        let now = Utc::now();

        let alert = match self.alerts.entry(checksum) {
            Entry::Occupied(mut entry) => {
                if now - entry.get().last_seen <= self.active_window {
                    let alert = entry.get_mut();
                    alert.last_seen = now;
                    alert.frame_count += 1;
                    alert.clone()
                } else {
                    // The previous incident went quiet; same key, new alert.
                    let fresh = new_alert(candidate, now);
                    entry.insert(fresh.clone());
                    fresh
                }
            }
            Entry::Vacant(entry) => {
                let fresh = new_alert(candidate, now);
                entry.insert(fresh.clone());
                fresh
            }
        };

        Ok(alert)
    }

    /// All alerts whose last detection falls within the active window.
    pub fn active_alerts(&self) -> Vec<Alert> {
        let now = Utc::now();
        self.alerts
            .iter()
            .filter(|entry| now - entry.last_seen <= self.active_window)
            .map(|entry| entry.clone())
            .collect()
    }
}

fn new_alert(candidate: AlertCandidate, now: DateTime<Utc>) -> Alert {
    Alert {
        id: Uuid::new_v4(),
        alert_type: candidate.alert_type,
        subsystem: candidate.subsystem,
        message: candidate.message,
        attributes: candidate.attributes,
        dedup_keys: candidate.dedup_keys,
        first_seen: now,
        last_seen: now,
        frame_count: 1,
    }
}

/// Checksum over type, subsystem and the values of the declared dedup
/// attributes in sorted key order. Equal checksum means same alert.
fn dedup_checksum(candidate: &AlertCandidate) -> Result<String, AlertError> {
    let mut hasher = Sha256::new();
    hasher.update(candidate.alert_type.as_str());
    hasher.update(candidate.subsystem.as_str());

    let mut keys: Vec<&String> = candidate.dedup_keys.iter().collect();
    keys.sort();
    for key in keys {
        let value = candidate
            .attributes
            .get(key)
            .ok_or_else(|| AlertError::MissingDedupAttribute(key.clone()))?;
        hasher.update(key);
        hasher.update(value);
    }

    Ok(hex::encode(hasher.finalize()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;
    use std::sync::Arc;

    use crate::alerts::{AlertSubsystem, AlertType};

    fn candidate(bssid: &str) -> AlertCandidate {
        let mut attributes = BTreeMap::new();
        attributes.insert("bssid".to_string(), bssid.to_string());
        attributes.insert("fingerprint".to_string(), "ab".repeat(32));
        attributes.insert("sensor_id".to_string(), "sensor-1".to_string());

        AlertCandidate {
            alert_type: AlertType::BanditContact,
            subsystem: AlertSubsystem::Dot11,
            message: format!("Bandit advertising BSSID \"{}\" detected in range.", bssid),
            attributes,
            dedup_keys: vec![
                "bssid".to_string(),
                "fingerprint".to_string(),
                "sensor_id".to_string(),
            ],
        }
    }

    #[test]
    fn test_same_detection_merges() {
        let service = AlertService::new();

        let first = service.raise(candidate("00:c0:ca:95:68:3b")).unwrap();
        let second = service.raise(candidate("00:c0:ca:95:68:3b")).unwrap();

        assert_eq!(first.id, second.id);
        assert_eq!(first.first_seen, second.first_seen);
        assert_eq!(first.frame_count, 1);
        assert_eq!(second.frame_count, 2);
        assert!(second.last_seen >= first.last_seen);
        assert_eq!(service.active_alerts().len(), 1);
    }

    #[test]
    fn test_differing_dedup_attribute_creates_second_alert() {
        let service = AlertService::new();

        let first = service.raise(candidate("00:c0:ca:95:68:3b")).unwrap();
        let second = service.raise(candidate("02:00:00:aa:bb:cc")).unwrap();

        assert_ne!(first.id, second.id);
        assert_eq!(service.active_alerts().len(), 2);
    }

    #[test]
    fn test_dedup_key_order_does_not_matter() {
        let service = AlertService::new();

        let mut reordered = candidate("00:c0:ca:95:68:3b");
        reordered.dedup_keys = vec![
            "sensor_id".to_string(),
            "bssid".to_string(),
            "fingerprint".to_string(),
        ];

        let first = service.raise(candidate("00:c0:ca:95:68:3b")).unwrap();
        let second = service.raise(reordered).unwrap();

        assert_eq!(first.id, second.id);
        assert_eq!(second.frame_count, 2);
    }

    #[test]
    fn test_missing_dedup_attribute_is_rejected() {
        let service = AlertService::new();

        let mut broken = candidate("00:c0:ca:95:68:3b");
        broken.attributes.remove("sensor_id");

        assert_eq!(
            service.raise(broken),
            Err(AlertError::MissingDedupAttribute("sensor_id".to_string()))
        );
        assert!(service.active_alerts().is_empty());
    }

    #[test]
    fn test_stale_alert_is_replaced_by_fresh_incident() {
        let service = AlertService::with_active_window(Duration::milliseconds(1));

        let first = service.raise(candidate("00:c0:ca:95:68:3b")).unwrap();
        std::thread::sleep(std::time::Duration::from_millis(10));
        let second = service.raise(candidate("00:c0:ca:95:68:3b")).unwrap();

        assert_ne!(first.id, second.id);
        assert_eq!(second.frame_count, 1);
    }

    #[test]
    fn test_concurrent_raises_never_duplicate() {
        let service = Arc::new(AlertService::new());

        let handles: Vec<_> = (0..16)
            .map(|_| {
                let service = service.clone();
                std::thread::spawn(move || {
                    service.raise(candidate("00:c0:ca:95:68:3b")).unwrap();
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let alerts = service.active_alerts();
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].frame_count, 16);
    }
}
