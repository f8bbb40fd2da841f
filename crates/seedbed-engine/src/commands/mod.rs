//! Command orchestration layer.
//!
//! Each command validates its inputs through `seedbed-core`, talks to the
//! queue or the database through `seedbed-store`, and logs its lifecycle.

pub mod bundle;
pub mod import;
pub mod seeds;
pub mod worker;
