//! Background Tasks Module
//!
//! Contains background work that runs for the lifetime of a cache engine.
//!
//! # Tasks
//! - Expiry sweep: removes expired cache entries at a configured interval

mod sweep;

pub use sweep::{spawn_sweep_task, SweepHandle};
