//! Pipeline Statistics
//!
//! Counters ticked from capture threads and read by the periodic summary
//! task. All counters are atomic; a snapshot is a plain copy and may be
//! slightly torn across fields, which is fine for reporting.

use std::sync::atomic::{AtomicU64, Ordering};

use crate::dot11::frame::FrameSubtype;

#[derive(Debug, Default)]
pub struct PipelineStats {
    frames_captured: AtomicU64,
    frames_malformed: AtomicU64,
    frames_dispatched: AtomicU64,
    interceptor_errors: AtomicU64,
    notifications_dropped: AtomicU64,
    by_subtype: [AtomicU64; 8],
}

impl PipelineStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// A frame arrived from the capture, before any parsing.
    pub fn tick_captured(&self) {
        self.frames_captured.fetch_add(1, Ordering::Relaxed);
    }

    /// A frame was dropped as malformed (bad FCS or parser rejection).
    pub fn tick_malformed(&self) {
        self.frames_malformed.fetch_add(1, Ordering::Relaxed);
    }

    /// A parsed frame was handed to the interceptors of its subtype.
    pub fn tick_dispatched(&self, subtype: FrameSubtype) {
        self.frames_dispatched.fetch_add(1, Ordering::Relaxed);
        self.by_subtype[subtype.index()].fetch_add(1, Ordering::Relaxed);
    }

    /// An interceptor returned an error during dispatch.
    pub fn tick_interceptor_error(&self) {
        self.interceptor_errors.fetch_add(1, Ordering::Relaxed);
    }

    /// A notification was dropped because the uplink channel was full.
    pub fn tick_notification_dropped(&self) {
        self.notifications_dropped.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            frames_captured: self.frames_captured.load(Ordering::Relaxed),
            frames_malformed: self.frames_malformed.load(Ordering::Relaxed),
            frames_dispatched: self.frames_dispatched.load(Ordering::Relaxed),
            interceptor_errors: self.interceptor_errors.load(Ordering::Relaxed),
            notifications_dropped: self.notifications_dropped.load(Ordering::Relaxed),
            by_subtype: std::array::from_fn(|i| self.by_subtype[i].load(Ordering::Relaxed)),
        }
    }
}

#[derive(Debug, Clone)]
pub struct StatsSnapshot {
    pub frames_captured: u64,
    pub frames_malformed: u64,
    pub frames_dispatched: u64,
    pub interceptor_errors: u64,
    pub notifications_dropped: u64,
    pub by_subtype: [u64; 8],
}

impl StatsSnapshot {
    /// Per-subtype counts paired with their names, for summary logging.
    pub fn subtype_counts(&self) -> Vec<(&'static str, u64)> {
        FrameSubtype::ALL
            .iter()
            .map(|s| (s.name(), self.by_subtype[s.index()]))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counters() {
        let stats = PipelineStats::new();
        stats.tick_captured();
        stats.tick_captured();
        stats.tick_malformed();
        stats.tick_dispatched(FrameSubtype::Beacon);
        stats.tick_dispatched(FrameSubtype::Beacon);
        stats.tick_dispatched(FrameSubtype::Deauthentication);

        let snapshot = stats.snapshot();
        assert_eq!(snapshot.frames_captured, 2);
        assert_eq!(snapshot.frames_malformed, 1);
        assert_eq!(snapshot.frames_dispatched, 3);
        assert_eq!(snapshot.by_subtype[FrameSubtype::Beacon.index()], 2);
        assert_eq!(snapshot.by_subtype[FrameSubtype::Deauthentication.index()], 1);
        assert_eq!(snapshot.by_subtype[FrameSubtype::ProbeRequest.index()], 0);
    }

    #[test]
    fn test_subtype_counts_carry_names() {
        let stats = PipelineStats::new();
        stats.tick_dispatched(FrameSubtype::Authentication);

        let counts = stats.snapshot().subtype_counts();
        assert_eq!(counts.len(), 8);
        assert!(counts.contains(&("auth", 1)));
        assert!(counts.contains(&("beacon", 0)));
    }
}
