//! Channel hopper.
//!
//! A hopper owns one interface and rotates it through a channel list on
//! a dedicated thread, one `iw` invocation per dwell period. The channel
//! it last tuned successfully is published through an atomic so the
//! capture loop can stamp frames whose radiotap header carries no
//! frequency.

use std::sync::atomic::{AtomicBool, AtomicU16, Ordering};
use std::sync::mpsc;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use tracing::{debug, warn};

use crate::capture::interface::{self, InterfaceError};

/// Dwell time per channel when the config does not set one.
pub const DEFAULT_DWELL_MS: u64 = 1000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HopperState {
    Hopping,
    Paused,
}

/// Control messages for a running hopper.
#[derive(Debug, Clone)]
pub enum HopperCommand {
    Pause,
    Resume,
    SetChannels(Vec<u16>),
}

/// Handle to a running hopper thread.
pub struct HopperHandle {
    current_channel: Arc<AtomicU16>,
    command_tx: mpsc::Sender<HopperCommand>,
    stop: Arc<AtomicBool>,
    thread: Option<thread::JoinHandle<()>>,
}

impl HopperHandle {
    /// Last channel the hopper tuned successfully.
    pub fn current_channel(&self) -> Arc<AtomicU16> {
        Arc::clone(&self.current_channel)
    }

    pub fn send(&self, command: HopperCommand) {
        let _ = self.command_tx.send(command);
    }

    pub fn pause(&self) {
        self.send(HopperCommand::Pause);
    }

    pub fn resume(&self) {
        self.send(HopperCommand::Resume);
    }

    /// Stop the hopper and wait for its thread to exit.
    pub fn stop(mut self) {
        self.stop.store(true, Ordering::SeqCst);
        if let Some(handle) = self.thread.take() {
            let _ = handle.join();
        }
    }
}

pub struct ChannelHopper;

impl ChannelHopper {
    /// Spawn a hopper thread for an interface.
    pub fn spawn(interface: String, channels: Vec<u16>, dwell_ms: u64) -> HopperHandle {
        let name = interface.clone();
        Self::spawn_with_tuner(interface, channels, dwell_ms, move |channel| {
            interface::set_channel(&name, channel)
        })
    }

    fn spawn_with_tuner<F>(
        interface: String,
        channels: Vec<u16>,
        dwell_ms: u64,
        mut tuner: F,
    ) -> HopperHandle
    where
        F: FnMut(u16) -> Result<(), InterfaceError> + Send + 'static,
    {
        let initial = channels.first().copied().unwrap_or(0);
        let current_channel = Arc::new(AtomicU16::new(initial));
        let stop = Arc::new(AtomicBool::new(false));
        let (command_tx, command_rx) = mpsc::channel();

        let dwell = Duration::from_millis(if dwell_ms == 0 { DEFAULT_DWELL_MS } else { dwell_ms });
        let current = Arc::clone(&current_channel);
        let stop_flag = Arc::clone(&stop);

        let thread = thread::spawn(move || {
            let mut state = HopperState::Hopping;
            let mut channels = channels;
            let mut position = 0usize;

            while !stop_flag.load(Ordering::SeqCst) {
                while let Ok(command) = command_rx.try_recv() {
                    match command {
                        HopperCommand::Pause => state = HopperState::Paused,
                        HopperCommand::Resume => state = HopperState::Hopping,
                        HopperCommand::SetChannels(list) => {
                            channels = list;
                            position = 0;
                        }
                    }
                }

                if state == HopperState::Hopping && !channels.is_empty() {
                    let channel = channels[position % channels.len()];
                    match tuner(channel) {
                        Ok(()) => {
                            current.store(channel, Ordering::SeqCst);
                            debug!("Hopped {} to channel {}", interface, channel);
                        }
                        Err(e) => {
                            warn!("Channel hop to {} on {} failed: {}", channel, interface, e)
                        }
                    }
                    position = (position + 1) % channels.len();
                }

                sleep_with_stop(&stop_flag, dwell);
            }

            debug!("Channel hopper for {} exiting", interface);
        });

        HopperHandle {
            current_channel,
            command_tx,
            stop,
            thread: Some(thread),
        }
    }
}

fn sleep_with_stop(stop: &AtomicBool, duration: Duration) {
    let slice = Duration::from_millis(50);
    let mut remaining = duration;
    while !stop.load(Ordering::SeqCst) && !remaining.is_zero() {
        let step = remaining.min(slice);
        thread::sleep(step);
        remaining = remaining.saturating_sub(step);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;

    fn recording_tuner(seen: Arc<Mutex<Vec<u16>>>) -> impl FnMut(u16) -> Result<(), InterfaceError> {
        move |channel| {
            seen.lock().push(channel);
            Ok(())
        }
    }

    #[test]
    fn test_hopper_without_channels_idles_and_stops() {
        let handle = ChannelHopper::spawn_with_tuner(
            "test0".to_string(),
            Vec::new(),
            2,
            |_| panic!("tuner must not run without channels"),
        );
        let current = handle.current_channel();
        thread::sleep(Duration::from_millis(30));
        assert_eq!(current.load(Ordering::SeqCst), 0);
        handle.stop();
    }

    #[test]
    fn test_hopper_rotates_through_channels() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let handle = ChannelHopper::spawn_with_tuner(
            "test0".to_string(),
            vec![1, 6, 11],
            2,
            recording_tuner(Arc::clone(&seen)),
        );
        let current = handle.current_channel();

        for _ in 0..400 {
            if seen.lock().len() >= 4 {
                break;
            }
            thread::sleep(Duration::from_millis(5));
        }
        handle.stop();

        let seen = seen.lock();
        assert_eq!(&seen[..4], &[1, 6, 11, 1]);
        let last = *seen.last().unwrap();
        assert_eq!(current.load(Ordering::SeqCst), last);
    }

    #[test]
    fn test_paused_hopper_stops_tuning() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let handle = ChannelHopper::spawn_with_tuner(
            "test0".to_string(),
            vec![1, 6],
            2,
            recording_tuner(Arc::clone(&seen)),
        );

        handle.pause();
        thread::sleep(Duration::from_millis(50));
        let after_pause = seen.lock().len();
        thread::sleep(Duration::from_millis(50));
        assert_eq!(seen.lock().len(), after_pause);

        handle.resume();
        thread::sleep(Duration::from_millis(50));
        assert!(seen.lock().len() > after_pause);
        handle.stop();
    }

    #[test]
    fn test_set_channels_replaces_rotation() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let handle = ChannelHopper::spawn_with_tuner(
            "test0".to_string(),
            vec![1],
            2,
            recording_tuner(Arc::clone(&seen)),
        );

        handle.send(HopperCommand::SetChannels(vec![36, 40]));
        thread::sleep(Duration::from_millis(100));
        handle.stop();

        let seen = seen.lock();
        assert!(seen.contains(&36));
        assert!(seen.contains(&40));
    }

    #[test]
    fn test_failed_tune_keeps_current_channel() {
        let handle = ChannelHopper::spawn_with_tuner(
            "test0".to_string(),
            vec![6],
            2,
            |channel| Err(InterfaceError::InvalidChannel(channel)),
        );
        let current = handle.current_channel();
        thread::sleep(Duration::from_millis(30));
        // initial value is the first configured channel, never a tuned one
        assert_eq!(current.load(Ordering::SeqCst), 6);
        handle.stop();
    }
}
