//! Sensors
//!
//! Every capture interface runs as a named sensor. Detections carry the
//! sensor that observed them; the directory resolves a sensor ID back to
//! its identity when an alert is raised. The bundled implementation is
//! backed by the config file, but the trait leaves room for an external
//! directory.

use std::collections::HashMap;

use uuid::Uuid;

use crate::config::SensorEntry;

#[derive(Debug, Clone)]
pub struct Sensor {
    pub id: Uuid,
    pub name: String,
    pub organization: Option<String>,
    pub tenant: Option<String>,
}

pub trait SensorDirectory: Send + Sync {
    fn resolve(&self, id: Uuid) -> Option<Sensor>;
}

/// Directory backed by the `[[sensors]]` entries of the config file.
pub struct ConfigSensorDirectory {
    sensors: HashMap<Uuid, Sensor>,
}

impl ConfigSensorDirectory {
    pub fn from_config(entries: &[SensorEntry]) -> Self {
        let mut sensors = HashMap::new();
        for entry in entries {
            sensors.insert(
                entry.id,
                Sensor {
                    id: entry.id,
                    name: entry.name.clone(),
                    organization: entry.organization.clone(),
                    tenant: entry.tenant.clone(),
                },
            );
        }
        Self { sensors }
    }
}

impl SensorDirectory for ConfigSensorDirectory {
    fn resolve(&self, id: Uuid) -> Option<Sensor> {
        self.sensors.get(&id).cloned()
    }
}
