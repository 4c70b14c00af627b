//! Scan session lifecycle: local state mirroring the remote job plus the
//! background poll task that keeps it current.

pub mod state;
pub mod tracker;

pub use state::{ScanProgress, ScanSession, SessionStatus};
pub use tracker::SessionTracker;
