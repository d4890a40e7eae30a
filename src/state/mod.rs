//! State module for tracking batch progress
//!
//! # Components
//!
//! - `UrlState`: Where each URL is in the pipeline (pending, fetching, completed, etc.)
//! - `KeyState`: Per-key rate limiter bookkeeping (last request, adaptive delay)

mod key_state;
mod url_state;

// Re-export main types
pub use key_state::KeyState;
pub use url_state::UrlState;
