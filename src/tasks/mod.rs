//! Background Tasks Module
//!
//! Contains background tasks that run for the lifetime of a cache service.
//!
//! # Tasks
//! - TTL Sweep: Removes expired cache entries at a fixed interval

mod sweep;

pub use sweep::spawn_sweep_task;
