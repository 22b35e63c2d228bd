//! # recall-core
//!
//! Core types, traits, and abstractions for the recall retrieval library.
//!
//! This crate provides the foundational data structures and trait definitions
//! that the other recall crates depend on: the `KnowledgeItem` domain model,
//! the repository/backend seams, the shared error type, and the structured
//! logging field contract.

pub mod defaults;
pub mod error;
pub mod logging;
pub mod models;
pub mod traits;

// Re-export commonly used types at crate root
pub use error::{Error, Result};
pub use models::*;
pub use traits::*;
