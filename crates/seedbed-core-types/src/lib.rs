//! Core types shared across seedbed facilities
//!
//! This crate provides foundational types used by the error, logging and
//! queueing layers:
//!
//! - **Correlation types**: RequestId, JobId, TraceId, RequestContext
//! - **Schema constants**: Canonical field keys and event names

pub mod correlation;
pub mod schema;

pub use correlation::{JobId, RequestContext, RequestId, TraceId};
