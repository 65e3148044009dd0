//! Core domain types and decision logic for the BadgePoint attendance endpoint.
//!
//! This crate is deliberately free of I/O: everything in it is a pure function
//! of its inputs plus a small amount of owned state, so the components can be
//! unit tested without a device, a broker, or a running clock. Time enters
//! only as [`Ticks`], a monotonic millisecond counter since boot.

pub mod classify;
pub mod constants;
pub mod debounce;
pub mod directory;
pub mod error;
pub mod types;

pub use classify::ActionClassifier;
pub use debounce::ScanDebouncer;
pub use directory::{Employee, EmployeeDirectory};
pub use error::{Error, Result};
pub use types::{AttendanceAction, AttendanceEvent, HeartbeatEvent, RfidTag, Ticks};

/// Version info
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
