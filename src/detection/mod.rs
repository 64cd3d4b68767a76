//! Threat Detection
//!
//! Periodic detectors that correlate what the capture pipeline has
//! observed. Detectors run on their own schedule, not per frame, and
//! raise alerts through the deduplicating alert store.

pub mod bandits;

pub use bandits::{catalog, BanditDetector, BanditSignature};
