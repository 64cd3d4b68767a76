//! Notifications
//!
//! Structured events describing observed frames, pushed by interceptors
//! towards an operator-facing sink. The daemon wires a channel sink into
//! the capture threads and drains it into the log; other sinks can be
//! plugged in through the same trait.

use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::info;

use crate::stats::PipelineStats;

/// One operator-facing event: a message, the channel the triggering frame
/// was received on, and a set of named attributes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub message: String,
    pub channel: u16,
    pub fields: BTreeMap<String, String>,
}

impl Notification {
    pub fn new(message: impl Into<String>, channel: u16) -> Self {
        Self {
            message: message.into(),
            channel,
            fields: BTreeMap::new(),
        }
    }

    pub fn add_field(mut self, key: &str, value: impl ToString) -> Self {
        self.fields.insert(key.to_string(), value.to_string());
        self
    }
}

pub trait NotificationSink: Send + Sync {
    fn notify(&self, notification: Notification);
}

/// Writes notifications to the log.
pub struct LogSink;

impl NotificationSink for LogSink {
    fn notify(&self, notification: Notification) {
        let fields = notification
            .fields
            .iter()
            .map(|(k, v)| format!("{}=\"{}\"", k, v))
            .collect::<Vec<_>>()
            .join(" ");

        if fields.is_empty() {
            info!("[ch {}] {}", notification.channel, notification.message);
        } else {
            info!("[ch {}] {} {}", notification.channel, notification.message, fields);
        }
    }
}

/// Forwards notifications from capture threads into an async channel.
///
/// Capture threads must never block on a slow consumer, so a full channel
/// drops the notification and ticks a counter instead.
pub struct ChannelSink {
    tx: tokio::sync::mpsc::Sender<Notification>,
    stats: Arc<PipelineStats>,
}

impl ChannelSink {
    pub fn new(tx: tokio::sync::mpsc::Sender<Notification>, stats: Arc<PipelineStats>) -> Self {
        Self { tx, stats }
    }
}

impl NotificationSink for ChannelSink {
    fn notify(&self, notification: Notification) {
        if self.tx.try_send(notification).is_err() {
            self.stats.tick_notification_dropped();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_collects_fields() {
        let notification = Notification::new("Received beacon", 6)
            .add_field("transmitter", "00:c0:ca:95:68:3b")
            .add_field("is_wps", false)
            .add_field("channel_width", 40);

        assert_eq!(notification.channel, 6);
        assert_eq!(notification.fields.len(), 3);
        assert_eq!(
            notification.fields.get("transmitter").map(String::as_str),
            Some("00:c0:ca:95:68:3b")
        );
        assert_eq!(notification.fields.get("is_wps").map(String::as_str), Some("false"));
    }

    #[test]
    fn test_channel_sink_drops_when_full() {
        let stats = Arc::new(PipelineStats::new());
        let (tx, mut rx) = tokio::sync::mpsc::channel(1);
        let sink = ChannelSink::new(tx, stats.clone());

        sink.notify(Notification::new("first", 1));
        sink.notify(Notification::new("second", 1));

        assert_eq!(stats.snapshot().notifications_dropped, 1);
        assert_eq!(rx.try_recv().map(|n| n.message), Ok("first".to_string()));
        assert!(rx.try_recv().is_err());
    }
}
