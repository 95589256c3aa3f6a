//! Pure computation for the bid manager: directional bid adjustments
//! with clamping, plus access-link building. No I/O.

pub mod adjust;
pub mod links;

pub use adjust::{compute_updates, AdjustmentParams, BidComputation, Direction};
pub use links::review_link_url;
