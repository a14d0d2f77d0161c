// src/display/mod.rs
//! Display half of the engine bridge.
//!
//! - DisplayRegion: inclusive bounding box of one driver write
//! - DisplayDriver: the flush/fill/map contract the engine calls
//! - DisplayDriverAdapter: validates writes and owns the frame buffer

pub mod adapter;
pub mod driver;
pub mod region;

pub use adapter::{DisplayDriverAdapter, DisplayStats};
pub use driver::{DisplayDriver, FlushReady};
pub use region::DisplayRegion;
