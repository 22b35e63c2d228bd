//! # recall-index
//!
//! Vector index client for recall.
//!
//! The approximate-nearest-neighbor index is an external service reached
//! over a small REST protocol (upsert/update/query/delete with bearer
//! auth). It is a disposable best-effort mirror of the durable store: every
//! failure here is `Error::Index` and callers recover by falling back or
//! degrading the write outcome.
//!
//! This crate provides:
//! - `HttpVectorIndex`: the REST client, configured from the environment
//! - `MockVectorIndex` (feature `mock`): exact in-memory index for tests

pub mod http;

#[cfg(any(test, feature = "mock"))]
pub mod mock;

// Re-export core types
pub use recall_core::*;

pub use http::{HttpVectorIndex, IndexConfig};

#[cfg(any(test, feature = "mock"))]
pub use mock::MockVectorIndex;
