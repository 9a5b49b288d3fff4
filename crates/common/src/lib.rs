//! Snapcrop Common Utilities
//!
//! Shared infrastructure for all Snapcrop crates:
//! - Error types and result aliases
//! - Configuration and preference snapshots
//! - Tracing/logging initialization
//! - Keyed, cancellable timers
//! - Temp artifact cache
//! - User-visible notices

pub mod config;
pub mod error;
pub mod logging;
pub mod notify;
pub mod temp;
pub mod timer;

pub use config::*;
pub use error::*;
pub use notify::{Notice, Notifier, SilentNotifier};
pub use temp::{delete_artifact, TempCache};
pub use timer::{TimerKey, TimerRegistry};
