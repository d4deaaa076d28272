//! Position history and view smoothing

pub mod heading;
pub mod history;
pub mod sync;

pub use heading::{normalize_mod, shortest_delta, unwrap_heading};
pub use history::{Extrapolation, PositionHistory};
pub use sync::{apply_follow, follow_center, ViewFrame, ViewSynchronizer};
