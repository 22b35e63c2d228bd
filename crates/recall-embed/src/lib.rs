//! # recall-embed
//!
//! Embedding provider backends for recall.
//!
//! This crate provides:
//! - `OpenAiEmbeddings`: an OpenAI-compatible `/v1/embeddings` HTTP backend
//!   (works against api.openai.com or any compatible gateway)
//! - `MockEmbeddingBackend` (feature `mock`): deterministic vectors for tests
//!
//! Failures surface as `Error::Embedding` and abort the enclosing operation;
//! a backend never returns a partial or zero vector in place of an error.
//!
//! # Example
//!
//! ```rust,no_run
//! use recall_embed::OpenAiEmbeddings;
//! use recall_core::EmbeddingBackend;
//!
//! #[tokio::main]
//! async fn main() {
//!     let backend = OpenAiEmbeddings::from_env();
//!     let vector = backend.embed("hello world").await.unwrap();
//!     assert_eq!(vector.as_slice().len(), backend.dimension());
//! }
//! ```

pub mod openai;

#[cfg(any(test, feature = "mock"))]
pub mod mock;

// Re-export core types
pub use recall_core::*;

pub use openai::{OpenAiConfig, OpenAiEmbeddings};

#[cfg(any(test, feature = "mock"))]
pub use mock::MockEmbeddingBackend;
