//! Snapcrop Linux Platform Integration
//!
//! Platform-specific probes for Linux:
//! - **Display Detection:** Display server, window bounds, DPI, top inset
//! - **Session Lock:** logind `LockedHint` for the capture privacy gate
//! - **Permissions:** Capability detection and user guidance

pub mod display;
pub mod lock;
pub mod permissions;

pub use display::*;
pub use lock::is_session_locked;
