//! Seedbed Engine - Orchestration layer
//!
//! Provides the import commands that coordinate job preparation in
//! `seedbed-core` with the queue, stores and ledger in `seedbed-store`.
//! Every command owns the lifecycle logging of its operation.

pub mod commands;
pub mod notice;

pub use notice::Notice;
