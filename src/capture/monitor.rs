//! Management frame monitor.
//!
//! One monitor owns one capture handle on one interface. The loop
//! recovers from device errors by reopening the handle after a fixed
//! backoff, so a monitor keeps going until its running flag is cleared.

use std::sync::atomic::{AtomicBool, AtomicU16, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, error, info, trace};
use uuid::Uuid;

use crate::capture::interface::ensure_monitor_mode;
use crate::capture::CaptureError;
use crate::dispatch::InterceptorTable;
use crate::dot11::{parse_radiotap, Anonymizer, FrameSubtype, ParsedFrame, RadioMetadata};
use crate::stats::PipelineStats;

/// Max bytes captured per frame.
pub const SNAPLEN: i32 = 65536;
/// Poll timeout for the capture handle, in milliseconds.
pub const READ_TIMEOUT_MS: i32 = 100;
/// Kernel buffer size for the capture handle.
pub const BUFFER_SIZE: i32 = 5 * 1024 * 1024;
/// Delay before reopening a capture handle after a failure.
pub const REINIT_BACKOFF: Duration = Duration::from_millis(2500);

/// BPF filter matching the eight management subtypes the pipeline handles.
pub const MANAGEMENT_FILTER: &str = "type mgt and (subtype deauth or subtype probe-req or subtype probe-resp or subtype beacon or subtype assoc-req or subtype assoc-resp or subtype disassoc or subtype auth)";

/// Source of raw frames. `Ok(None)` is a poll timeout.
pub trait PacketSource {
    fn next(&mut self) -> Result<Option<Vec<u8>>, CaptureError>;
}

/// Live pcap handle as a packet source.
pub struct PcapSource {
    capture: pcap::Capture<pcap::Active>,
}

impl PcapSource {
    pub fn new(capture: pcap::Capture<pcap::Active>) -> Self {
        Self { capture }
    }
}

impl PacketSource for PcapSource {
    fn next(&mut self) -> Result<Option<Vec<u8>>, CaptureError> {
        match self.capture.next_packet() {
            Ok(packet) => Ok(Some(packet.data.to_vec())),
            Err(pcap::Error::TimeoutExpired) => Ok(None),
            Err(e) => Err(CaptureError::Pcap(e.to_string())),
        }
    }
}

/// Blocking capture loop for one interface.
pub struct FrameMonitor {
    interface: String,
    sensor: Uuid,
    table: Arc<InterceptorTable>,
    anonymizer: Arc<Anonymizer>,
    stats: Arc<PipelineStats>,
    current_channel: Arc<AtomicU16>,
    running: Arc<AtomicBool>,
    in_loop: Arc<AtomicBool>,
    reinit_backoff: Duration,
}

impl FrameMonitor {
    pub fn new(
        interface: String,
        sensor: Uuid,
        table: Arc<InterceptorTable>,
        anonymizer: Arc<Anonymizer>,
        stats: Arc<PipelineStats>,
        current_channel: Arc<AtomicU16>,
    ) -> Self {
        Self {
            interface,
            sensor,
            table,
            anonymizer,
            stats,
            current_channel,
            running: Arc::new(AtomicBool::new(true)),
            in_loop: Arc::new(AtomicBool::new(false)),
            reinit_backoff: REINIT_BACKOFF,
        }
    }

    /// Flag that stops the capture loop when cleared.
    pub fn running_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.running)
    }

    /// Liveness flag, true while the loop is actively polling the device.
    pub fn in_loop_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.in_loop)
    }

    /// Run the capture loop. Blocks until the running flag is cleared.
    pub fn run(&self) {
        let interface = self.interface.clone();
        self.run_with(move || open_capture(&interface));
    }

    fn run_with<F, S>(&self, mut initialize: F)
    where
        F: FnMut() -> Result<S, CaptureError>,
        S: PacketSource,
    {
        info!(
            "Starting management frame capture on {} (sensor {})",
            self.interface, self.sensor
        );

        while self.running.load(Ordering::SeqCst) {
            let mut source = match initialize() {
                Ok(source) => source,
                Err(e) => {
                    error!(
                        "Could not initialize capture on {}: {}. Retrying in {:?}.",
                        self.interface, e, self.reinit_backoff
                    );
                    self.in_loop.store(false, Ordering::SeqCst);
                    std::thread::sleep(self.reinit_backoff);
                    continue;
                }
            };

            self.in_loop.store(true, Ordering::SeqCst);
            debug!("Capture handle on {} is live", self.interface);

            loop {
                if !self.running.load(Ordering::SeqCst) {
                    self.in_loop.store(false, Ordering::SeqCst);
                    return;
                }

                match source.next() {
                    Ok(Some(data)) => self.handle_packet(&data),
                    Ok(None) => {}
                    Err(e) => {
                        error!(
                            "Capture on {} failed: {}. Reinitializing in {:?}.",
                            self.interface, e, self.reinit_backoff
                        );
                        self.in_loop.store(false, Ordering::SeqCst);
                        std::thread::sleep(self.reinit_backoff);
                        break;
                    }
                }
            }
        }

        self.in_loop.store(false, Ordering::SeqCst);
    }

    fn handle_packet(&self, data: &[u8]) {
        self.stats.tick_captured();

        let Some((_, info, offset)) = parse_radiotap(data) else {
            trace!("Skipping frame with unparsable radiotap header");
            self.stats.tick_malformed();
            return;
        };

        let fallback = self.current_channel.load(Ordering::SeqCst);
        let meta = RadioMetadata::from_info(&info, fallback);
        if meta.malformed {
            trace!("Skipping frame with bad FCS");
            self.stats.tick_malformed();
            return;
        }

        let payload = &data[offset..];
        let Some(subtype) = payload.first().and_then(|b| FrameSubtype::classify(*b)) else {
            return;
        };

        match ParsedFrame::parse(subtype, payload, meta, &self.anonymizer) {
            Ok(frame) => self.table.dispatch(&frame),
            Err(e) => {
                trace!("Skipping malformed {} frame: {}", subtype.name(), e);
                self.stats.tick_malformed();
            }
        }
    }
}

/// Open a monitor mode capture handle, filtered down to the management
/// subtypes the pipeline handles.
fn open_capture(interface: &str) -> Result<PcapSource, CaptureError> {
    ensure_monitor_mode(interface)?;

    let mut capture = pcap::Capture::from_device(interface)
        .map_err(|e| CaptureError::Pcap(e.to_string()))?
        .promisc(true)
        .snaplen(SNAPLEN)
        .timeout(READ_TIMEOUT_MS)
        .buffer_size(BUFFER_SIZE)
        .open()
        .map_err(|e| CaptureError::Pcap(e.to_string()))?;

    capture
        .filter(MANAGEMENT_FILTER, true)
        .map_err(|e| CaptureError::Filter(e.to_string()))?;

    Ok(PcapSource::new(capture))
}
