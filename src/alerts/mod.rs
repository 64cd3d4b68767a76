//! Alerts
//!
//! Alert model and the deduplicating alert store. Detectors raise
//! candidates; the store decides whether a candidate is a new incident or
//! another frame of an already active one.

pub mod service;

pub use service::AlertService;

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AlertSubsystem {
    Dot11,
}

impl AlertSubsystem {
    pub fn as_str(&self) -> &'static str {
        match self {
            AlertSubsystem::Dot11 => "dot11",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AlertType {
    BanditContact,
}

impl AlertType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AlertType::BanditContact => "bandit_contact",
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AlertError {
    #[error("alert attributes are missing dedup key \"{0}\"")]
    MissingDedupAttribute(String),
}

/// A deduplicated alert.
///
/// Two detections are the same alert iff the values of all attributes
/// named in `dedup_keys` are equal; timestamps and frame counts never
/// participate. The UUID is assigned once at creation and survives
/// merges.
#[derive(Debug, Clone, PartialEq)]
pub struct Alert {
    pub id: Uuid,
    pub alert_type: AlertType,
    pub subsystem: AlertSubsystem,
    pub message: String,
    pub attributes: BTreeMap<String, String>,
    pub dedup_keys: Vec<String>,
    pub first_seen: DateTime<Utc>,
    pub last_seen: DateTime<Utc>,
    pub frame_count: u64,
}

/// A detection that has not passed through deduplication yet.
#[derive(Debug, Clone)]
pub struct AlertCandidate {
    pub alert_type: AlertType,
    pub subsystem: AlertSubsystem,
    pub message: String,
    pub attributes: BTreeMap<String, String>,
    pub dedup_keys: Vec<String>,
}
