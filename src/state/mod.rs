//! State module for tracking crawl progress
//!
//! # Components
//!
//! - `Page`: one discovered URL with its fetch results and link-graph fragment
//! - `FrontierState`: which frontier set a page belongs to (pending, in flight, done)
//! - `FetchStage`: the per-page fetch state machine stages

mod page;
mod page_state;

// Re-export main types
pub use page::{Page, NO_RESPONSE};
pub use page_state::{FetchStage, FrontierState};
