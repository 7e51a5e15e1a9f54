//! Utility Module
//!
//! - [`time`]: frame timing for driving animations

pub mod time;

pub use time::Timer;
