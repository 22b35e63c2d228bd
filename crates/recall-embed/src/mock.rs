//! Mock embedding backend for deterministic testing.
//!
//! Default behavior hashes whitespace tokens into buckets of a fixed-length
//! vector and L2-normalizes, so identical texts always embed identically.
//! Tests that need controlled similarity between two texts register explicit
//! vectors with [`MockEmbeddingBackend::with_vector_for`].

use std::collections::HashMap;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use recall_core::{EmbeddingBackend, Error, Result, Vector};

/// Mock embedding backend for testing.
#[derive(Clone)]
pub struct MockEmbeddingBackend {
    config: Arc<MockConfig>,
    call_log: Arc<Mutex<Vec<String>>>,
}

#[derive(Debug, Clone)]
struct MockConfig {
    dimension: usize,
    overrides: HashMap<String, Vec<f32>>,
    fail_all: bool,
    failure_rate: f64,
}

impl Default for MockConfig {
    fn default() -> Self {
        Self {
            dimension: 8,
            overrides: HashMap::new(),
            fail_all: false,
            failure_rate: 0.0,
        }
    }
}

impl Default for MockEmbeddingBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl MockEmbeddingBackend {
    /// Create a new mock backend with default configuration (dimension 8).
    pub fn new() -> Self {
        Self {
            config: Arc::new(MockConfig::default()),
            call_log: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Set the embedding dimension.
    pub fn with_dimension(mut self, dimension: usize) -> Self {
        Arc::make_mut(&mut self.config).dimension = dimension;
        self
    }

    /// Register an explicit vector for a specific input text.
    pub fn with_vector_for(mut self, text: impl Into<String>, vector: Vec<f32>) -> Self {
        Arc::make_mut(&mut self.config)
            .overrides
            .insert(text.into(), vector);
        self
    }

    /// Make every call fail with `Error::Embedding`.
    pub fn failing() -> Self {
        let mut backend = Self::new();
        Arc::make_mut(&mut backend.config).fail_all = true;
        backend
    }

    /// Set a probabilistic failure rate (0.0 - 1.0).
    pub fn with_failure_rate(mut self, rate: f64) -> Self {
        Arc::make_mut(&mut self.config).failure_rate = rate.clamp(0.0, 1.0);
        self
    }

    /// Inputs passed to `embed`, in call order.
    pub fn calls(&self) -> Vec<String> {
        self.call_log.lock().unwrap().clone()
    }

    /// Number of `embed` calls so far.
    pub fn call_count(&self) -> usize {
        self.call_log.lock().unwrap().len()
    }

    fn should_fail(&self) -> bool {
        if self.config.fail_all {
            return true;
        }
        if self.config.failure_rate > 0.0 {
            use rand::Rng;
            return rand::thread_rng().gen::<f64>() < self.config.failure_rate;
        }
        false
    }

    fn deterministic_vector(&self, text: &str) -> Vec<f32> {
        let dim = self.config.dimension;
        let mut v = vec![0.0f32; dim];

        for token in text
            .to_lowercase()
            .split(|c: char| !c.is_alphanumeric())
            .filter(|t| !t.is_empty())
        {
            let mut hasher = DefaultHasher::new();
            token.hash(&mut hasher);
            v[(hasher.finish() as usize) % dim] += 1.0;
        }

        let norm: f32 = v.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            for x in &mut v {
                *x /= norm;
            }
        } else {
            v[0] = 1.0;
        }
        v
    }
}

#[async_trait]
impl EmbeddingBackend for MockEmbeddingBackend {
    async fn embed(&self, text: &str) -> Result<Vector> {
        self.call_log.lock().unwrap().push(text.to_string());

        if self.should_fail() {
            return Err(Error::Embedding("mock embedding failure".to_string()));
        }

        if let Some(v) = self.config.overrides.get(text) {
            return Ok(Vector::from(v.clone()));
        }

        Ok(Vector::from(self.deterministic_vector(text)))
    }

    fn dimension(&self) -> usize {
        self.config.dimension
    }

    fn model_name(&self) -> &str {
        "mock-embedder"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_embed_is_deterministic() {
        let backend = MockEmbeddingBackend::new();
        let a = backend.embed("revenue growth").await.unwrap();
        let b = backend.embed("revenue growth").await.unwrap();
        assert_eq!(a.as_slice(), b.as_slice());
        assert_eq!(a.as_slice().len(), backend.dimension());
    }

    #[tokio::test]
    async fn test_override_takes_precedence() {
        let backend =
            MockEmbeddingBackend::new().with_vector_for("pinned", vec![1.0, 0.0, 0.0, 0.0]);
        let v = backend.embed("pinned").await.unwrap();
        assert_eq!(v.as_slice(), &[1.0, 0.0, 0.0, 0.0]);
    }

    #[tokio::test]
    async fn test_failing_backend_errors() {
        let backend = MockEmbeddingBackend::failing();
        let err = backend.embed("anything").await.unwrap_err();
        assert!(matches!(err, Error::Embedding(_)));
    }

    #[tokio::test]
    async fn test_call_log_records_inputs() {
        let backend = MockEmbeddingBackend::new();
        backend.embed("one").await.unwrap();
        backend.embed("two").await.unwrap();
        assert_eq!(backend.call_count(), 2);
        assert_eq!(backend.calls(), vec!["one", "two"]);
    }
}
