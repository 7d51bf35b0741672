#![deny(unsafe_code)]

/// Wall-clock abstraction shared by id minting, timestamps and cache expiry.
pub mod clock;
/// Scheduled-task interface for periodic background checks.
pub mod schedule;

pub use clock::{Clock, ManualClock, SharedClock, SystemClock};
pub use schedule::{BoxFuture, ManualScheduler, ScheduledTask, TaskHandle, spawn_task};
