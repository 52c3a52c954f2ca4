//! Utility Module
//!
//! - [`time`]: frame timing and the [`Clock`] consumed by playback

pub mod time;

pub use time::{Clock, ManualClock, Timer};
