//! Frame Dispatch
//!
//! Routes each parsed frame to the interceptors registered for its
//! subtype, in registration order. Interceptors run inline on the capture
//! thread, so they must be fast; anything slow goes through a channel.
//! A failing interceptor is isolated: the error is logged and counted and
//! the remaining interceptors for the frame still run.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::error;

use crate::alerts::AlertType;
use crate::dot11::frame::FrameSubtype;
use crate::dot11::frames::ParsedFrame;
use crate::notify::NotificationSink;
use crate::stats::PipelineStats;

/// A frame interceptor reacts to every parsed frame of the subtypes it
/// was registered for.
pub trait FrameInterceptor: Send + Sync {
    fn name(&self) -> &'static str;

    /// Alert types this interceptor may raise. Used for startup
    /// reporting, never for dispatch decisions.
    fn raises(&self) -> &'static [AlertType];

    fn intercept(&self, frame: &ParsedFrame) -> anyhow::Result<()>;
}

/// Registry mapping subtypes to ordered interceptor lists.
pub struct InterceptorTable {
    interceptors: HashMap<FrameSubtype, Vec<Arc<dyn FrameInterceptor>>>,
    stats: Arc<PipelineStats>,
}

impl InterceptorTable {
    pub fn new(stats: Arc<PipelineStats>) -> Self {
        Self {
            interceptors: HashMap::new(),
            stats,
        }
    }

    /// Append an interceptor to the dispatch list of one subtype.
    pub fn register(&mut self, subtype: FrameSubtype, interceptor: Arc<dyn FrameInterceptor>) {
        self.interceptors.entry(subtype).or_default().push(interceptor);
    }

    /// Register an interceptor for every monitored subtype.
    pub fn register_all(&mut self, interceptor: Arc<dyn FrameInterceptor>) {
        for subtype in FrameSubtype::ALL {
            self.register(subtype, interceptor.clone());
        }
    }

    /// All registrations in subtype order, for startup reporting.
    pub fn registrations(&self) -> Vec<(FrameSubtype, &'static str, &'static [AlertType])> {
        let mut out = Vec::new();
        for subtype in FrameSubtype::ALL {
            if let Some(list) = self.interceptors.get(&subtype) {
                for interceptor in list {
                    out.push((subtype, interceptor.name(), interceptor.raises()));
                }
            }
        }
        out
    }

    /// Hand a frame to every interceptor registered for its subtype.
    pub fn dispatch(&self, frame: &ParsedFrame) {
        let subtype = frame.subtype();
        self.stats.tick_dispatched(subtype);

        if let Some(list) = self.interceptors.get(&subtype) {
            for interceptor in list {
                if let Err(e) = interceptor.intercept(frame) {
                    self.stats.tick_interceptor_error();
                    error!("Frame interceptor {} failed: {:#}", interceptor.name(), e);
                }
            }
        }
    }
}

/// Forwards the notification of every frame to a sink.
pub struct UplinkInterceptor {
    sink: Arc<dyn NotificationSink>,
}

impl UplinkInterceptor {
    pub fn new(sink: Arc<dyn NotificationSink>) -> Self {
        Self { sink }
    }
}

impl FrameInterceptor for UplinkInterceptor {
    fn name(&self) -> &'static str {
        "uplink"
    }

    fn raises(&self) -> &'static [AlertType] {
        &[]
    }

    fn intercept(&self, frame: &ParsedFrame) -> anyhow::Result<()> {
        if let Some(notification) = frame.notification() {
            self.sink.notify(notification);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use chrono::Utc;
    use parking_lot::Mutex;

    use crate::dot11::frames::DeauthenticationFrame;
    use crate::dot11::radiotap::RadioMetadata;
    use crate::notify::Notification;

    struct CountingInterceptor {
        calls: AtomicUsize,
    }

    impl FrameInterceptor for CountingInterceptor {
        fn name(&self) -> &'static str {
            "counting"
        }

        fn raises(&self) -> &'static [AlertType] {
            &[]
        }

        fn intercept(&self, _frame: &ParsedFrame) -> anyhow::Result<()> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    struct FailingInterceptor;

    impl FrameInterceptor for FailingInterceptor {
        fn name(&self) -> &'static str {
            "failing"
        }

        fn raises(&self) -> &'static [AlertType] {
            &[]
        }

        fn intercept(&self, _frame: &ParsedFrame) -> anyhow::Result<()> {
            anyhow::bail!("boom")
        }
    }

    struct CollectingSink {
        notifications: Mutex<Vec<Notification>>,
    }

    impl NotificationSink for CollectingSink {
        fn notify(&self, notification: Notification) {
            self.notifications.lock().push(notification);
        }
    }

    fn deauth_frame() -> ParsedFrame {
        ParsedFrame::Deauthentication(DeauthenticationFrame {
            destination: "48:2c:a0:11:22:33".to_string(),
            transmitter: "00:c0:ca:95:68:3b".to_string(),
            bssid: "00:c0:ca:95:68:3b".to_string(),
            reason_code: 7,
            reason_string: "Class 3 frame received from nonassociated STA".to_string(),
            meta: RadioMetadata {
                channel: 6,
                frequency: Some(2437),
                signal_dbm: Some(-61),
                antenna: None,
                captured_at: Utc::now(),
                malformed: false,
            },
        })
    }

    #[test]
    fn test_dispatch_routes_by_subtype() {
        let stats = Arc::new(PipelineStats::new());
        let mut table = InterceptorTable::new(stats.clone());

        let deauth_counter = Arc::new(CountingInterceptor { calls: AtomicUsize::new(0) });
        let beacon_counter = Arc::new(CountingInterceptor { calls: AtomicUsize::new(0) });
        table.register(FrameSubtype::Deauthentication, deauth_counter.clone());
        table.register(FrameSubtype::Beacon, beacon_counter.clone());

        table.dispatch(&deauth_frame());

        assert_eq!(deauth_counter.calls.load(Ordering::SeqCst), 1);
        assert_eq!(beacon_counter.calls.load(Ordering::SeqCst), 0);
        assert_eq!(stats.snapshot().frames_dispatched, 1);
    }

    #[test]
    fn test_failing_interceptor_is_isolated() {
        let stats = Arc::new(PipelineStats::new());
        let mut table = InterceptorTable::new(stats.clone());

        let counter = Arc::new(CountingInterceptor { calls: AtomicUsize::new(0) });
        table.register(FrameSubtype::Deauthentication, Arc::new(FailingInterceptor));
        table.register(FrameSubtype::Deauthentication, counter.clone());

        table.dispatch(&deauth_frame());

        assert_eq!(counter.calls.load(Ordering::SeqCst), 1);
        assert_eq!(stats.snapshot().interceptor_errors, 1);
    }

    #[test]
    fn test_unregistered_subtype_is_noop() {
        let stats = Arc::new(PipelineStats::new());
        let table = InterceptorTable::new(stats.clone());

        table.dispatch(&deauth_frame());

        assert_eq!(stats.snapshot().frames_dispatched, 1);
        assert_eq!(stats.snapshot().interceptor_errors, 0);
    }

    #[test]
    fn test_register_all_covers_every_subtype() {
        let stats = Arc::new(PipelineStats::new());
        let mut table = InterceptorTable::new(stats);

        let counter = Arc::new(CountingInterceptor { calls: AtomicUsize::new(0) });
        table.register_all(counter);

        assert_eq!(table.registrations().len(), 8);
    }

    #[test]
    fn test_uplink_interceptor_forwards_notifications() {
        let sink = Arc::new(CollectingSink { notifications: Mutex::new(Vec::new()) });
        let interceptor = UplinkInterceptor::new(sink.clone());

        interceptor.intercept(&deauth_frame()).unwrap();

        let notifications = sink.notifications.lock();
        assert_eq!(notifications.len(), 1);
        assert_eq!(
            notifications[0].fields.get("subtype").map(String::as_str),
            Some("deauth")
        );
    }
}
