pub mod alerts;
pub mod capture;
pub mod config;
pub mod detection;
pub mod dispatch;
pub mod dot11;
pub mod networks;
pub mod notify;
pub mod sensors;
pub mod stats;

use anyhow::Result;
use std::sync::atomic::{AtomicU16, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use alerts::AlertService;
use capture::{ChannelHopper, FrameMonitor};
use config::Config;
use detection::BanditDetector;
use dispatch::{InterceptorTable, UplinkInterceptor};
use dot11::{Anonymizer, FrameSubtype};
use networks::{NetworkRegistry, RegistryInterceptor};
use notify::{ChannelSink, LogSink, Notification, NotificationSink};
use sensors::{ConfigSensorDirectory, SensorDirectory};
use stats::PipelineStats;

/// Core airmonban instance, shared by every daemon task.
pub struct Airmonban {
    config: Config,
    stats: Arc<PipelineStats>,
    anonymizer: Arc<Anonymizer>,
    registry: Arc<NetworkRegistry>,
    sensors: Arc<ConfigSensorDirectory>,
    alerts: Arc<AlertService>,
}

impl Airmonban {
    /// Create a new airmonban instance
    pub fn new(config: Config) -> Self {
        let retention = chrono::Duration::minutes(config.detection.retention_minutes as i64);
        let active_window = chrono::Duration::minutes(config.alerts.active_window_minutes);

        Self {
            stats: Arc::new(PipelineStats::new()),
            anonymizer: Arc::new(Anonymizer::new(config.anonymize.enabled)),
            registry: Arc::new(NetworkRegistry::new(retention)),
            sensors: Arc::new(ConfigSensorDirectory::from_config(&config.sensors)),
            alerts: Arc::new(AlertService::with_active_window(active_window)),
            config,
        }
    }

    /// Get configuration reference
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Pipeline counters
    pub fn stats(&self) -> Arc<PipelineStats> {
        Arc::clone(&self.stats)
    }

    /// Observed network registry
    pub fn registry(&self) -> Arc<NetworkRegistry> {
        Arc::clone(&self.registry)
    }

    /// Alert store
    pub fn alerts(&self) -> Arc<AlertService> {
        Arc::clone(&self.alerts)
    }
}

/// Daemon runner wiring capture, dispatch and detection together
pub struct Daemon {
    core: Arc<Airmonban>,
    shutdown_tx: Option<mpsc::Sender<()>>,
}

impl Daemon {
    /// Create a new daemon
    pub fn new(core: Airmonban) -> Self {
        Self {
            core: Arc::new(core),
            shutdown_tx: None,
        }
    }

    /// Run the daemon
    pub async fn run(&mut self) -> Result<()> {
        let core = Arc::clone(&self.core);
        let config = core.config.clone();

        if config.capture.interfaces.is_empty() {
            anyhow::bail!("No capture interfaces configured");
        }

        // Create channels
        let (notify_tx, mut notify_rx) = mpsc::channel::<Notification>(1024);
        let (shutdown_tx, mut shutdown_rx) = mpsc::channel::<()>(1);
        self.shutdown_tx = Some(shutdown_tx);

        let uplink: Arc<dyn NotificationSink> =
            Arc::new(ChannelSink::new(notify_tx, Arc::clone(&core.stats)));

        // Spawn one capture pipeline per interface
        let mut hoppers = Vec::new();
        let mut running_flags = Vec::new();
        let mut liveness = Vec::new();
        let mut monitor_handles = Vec::new();

        for iface in &config.capture.interfaces {
            if core.sensors.resolve(iface.sensor_id).is_none() {
                warn!(
                    "Interface {} references unknown sensor {}",
                    iface.name, iface.sensor_id
                );
            }
            if iface.channels.is_empty() {
                warn!("Interface {} has no channels configured", iface.name);
            }

            let current_channel = if config.hopper.enabled {
                let hopper = ChannelHopper::spawn(
                    iface.name.clone(),
                    iface.channels.clone(),
                    config.hopper.dwell_ms,
                );
                let current = hopper.current_channel();
                hoppers.push(hopper);
                current
            } else {
                let channel = iface.channels.first().copied().unwrap_or(1);
                if let Err(e) = capture::interface::set_channel(&iface.name, channel) {
                    warn!("Could not tune {} to channel {}: {}", iface.name, channel, e);
                }
                Arc::new(AtomicU16::new(channel))
            };

            let mut table = InterceptorTable::new(Arc::clone(&core.stats));
            table.register_all(Arc::new(UplinkInterceptor::new(Arc::clone(&uplink))));
            let registry_interceptor = Arc::new(RegistryInterceptor::new(
                Arc::clone(&core.registry),
                iface.sensor_id,
            ));
            table.register(FrameSubtype::Beacon, registry_interceptor.clone());
            table.register(FrameSubtype::ProbeResponse, registry_interceptor);

            for (subtype, name, raises) in table.registrations() {
                if raises.is_empty() {
                    debug!(
                        "Interface {}: interceptor {} on {} frames",
                        iface.name,
                        name,
                        subtype.name()
                    );
                } else {
                    let kinds: Vec<&str> = raises.iter().map(|t| t.as_str()).collect();
                    debug!(
                        "Interface {}: interceptor {} on {} frames, raises {}",
                        iface.name,
                        name,
                        subtype.name(),
                        kinds.join(", ")
                    );
                }
            }

            let monitor = FrameMonitor::new(
                iface.name.clone(),
                iface.sensor_id,
                Arc::new(table),
                Arc::clone(&core.anonymizer),
                Arc::clone(&core.stats),
                current_channel,
            );
            running_flags.push(monitor.running_flag());
            liveness.push((iface.name.clone(), monitor.in_loop_flag()));

            monitor_handles.push(tokio::task::spawn_blocking(move || monitor.run()));
        }

        // Spawn bandit sweep task
        let detector = BanditDetector::new(
            Arc::clone(&core.registry),
            Arc::clone(&core.sensors) as Arc<dyn SensorDirectory>,
            Arc::clone(&core.alerts),
            chrono::Duration::seconds(config.detection.sighting_window_secs as i64),
        );
        let sweep_secs = config.detection.sweep_interval_secs.max(1);
        let sweep_handle = tokio::spawn(async move {
            let mut interval = tokio::time::interval(tokio::time::Duration::from_secs(sweep_secs));
            loop {
                interval.tick().await;
                let raised = detector.sweep();
                if raised > 0 {
                    info!("Bandit sweep raised {} alert(s)", raised);
                }
            }
        });

        // Spawn registry retention task (runs every minute)
        let registry = Arc::clone(&core.registry);
        let retention_handle = tokio::spawn(async move {
            let mut interval = tokio::time::interval(tokio::time::Duration::from_secs(60));
            loop {
                interval.tick().await;
                let dropped = registry.retention_sweep();
                if dropped > 0 {
                    debug!("Retention sweep dropped {} stale network record(s)", dropped);
                }
            }
        });

        // Spawn stats summary task
        let stats = Arc::clone(&core.stats);
        let summary_registry = Arc::clone(&core.registry);
        let summary_alerts = Arc::clone(&core.alerts);
        let health = liveness.clone();
        let stats_handle = tokio::spawn(async move {
            let mut interval = tokio::time::interval(tokio::time::Duration::from_secs(60));
            interval.tick().await; // skip the immediate first tick
            loop {
                interval.tick().await;
                let snapshot = stats.snapshot();
                info!(
                    "Pipeline: {} captured, {} dispatched, {} malformed, {} interceptor errors, {} notifications dropped, {} networks, {} active alerts",
                    snapshot.frames_captured,
                    snapshot.frames_dispatched,
                    snapshot.frames_malformed,
                    snapshot.interceptor_errors,
                    snapshot.notifications_dropped,
                    summary_registry.len(),
                    summary_alerts.active_alerts().len(),
                );
                debug!("Dispatched by subtype: {:?}", snapshot.subtype_counts());
                for (name, in_loop) in &health {
                    if !in_loop.load(Ordering::SeqCst) {
                        warn!("Capture loop on {} is not live", name);
                    }
                }
            }
        });

        info!(
            "Daemon started, capturing on {} interface(s)",
            config.capture.interfaces.len()
        );

        // Main event loop
        let log_sink = LogSink;
        loop {
            tokio::select! {
                Some(notification) = notify_rx.recv() => {
                    log_sink.notify(notification);
                }

                _ = shutdown_rx.recv() => {
                    info!("Shutdown signal received");
                    break;
                }
            }
        }

        // Cleanup
        for flag in &running_flags {
            flag.store(false, Ordering::SeqCst);
        }
        for hopper in hoppers {
            hopper.stop();
        }
        sweep_handle.abort();
        retention_handle.abort();
        stats_handle.abort();

        for handle in monitor_handles {
            let _ = handle.await;
        }

        info!("Daemon stopped");
        Ok(())
    }

    /// Signal shutdown
    pub async fn shutdown(&self) {
        if let Some(tx) = &self.shutdown_tx {
            let _ = tx.send(()).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn test_core_wires_sensor_directory() {
        let core = Airmonban::new(Config::default());
        assert!(core.sensors.resolve(Uuid::nil()).is_some());
        assert_eq!(core.stats().snapshot().frames_captured, 0);
    }
}
