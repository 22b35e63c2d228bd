//! In-memory mock vector index for deterministic testing.
//!
//! Performs exact cosine scoring instead of approximate search, which makes
//! it a correctness oracle for the primary path. Per-operation failure
//! switches let tests exercise degraded writes and fallback search.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use uuid::Uuid;

use recall_core::{Error, IndexHit, IndexMetadata, Result, Vector, VectorIndex};

#[derive(Debug, Clone)]
struct Entry {
    vector: Vec<f32>,
    metadata: IndexMetadata,
}

/// Mock vector index backed by a HashMap.
#[derive(Clone, Default)]
pub struct MockVectorIndex {
    entries: Arc<Mutex<HashMap<Uuid, Entry>>>,
    fail_upsert: Arc<AtomicBool>,
    fail_query: Arc<AtomicBool>,
    fail_delete: Arc<AtomicBool>,
}

impl MockVectorIndex {
    /// Create an empty mock index.
    pub fn new() -> Self {
        Self::default()
    }

    /// Make subsequent upserts and metadata updates fail.
    pub fn set_fail_upsert(&self, fail: bool) {
        self.fail_upsert.store(fail, Ordering::SeqCst);
    }

    /// Make subsequent queries fail.
    pub fn set_fail_query(&self, fail: bool) {
        self.fail_query.store(fail, Ordering::SeqCst);
    }

    /// Make subsequent deletes fail.
    pub fn set_fail_delete(&self, fail: bool) {
        self.fail_delete.store(fail, Ordering::SeqCst);
    }

    /// Number of stored entries.
    pub fn len(&self) -> usize {
        self.entries.lock().unwrap().len()
    }

    /// True when the index holds no entries.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// True when `id` is present.
    pub fn contains(&self, id: Uuid) -> bool {
        self.entries.lock().unwrap().contains_key(&id)
    }

    /// Current metadata for `id`, if present.
    pub fn metadata_for(&self, id: Uuid) -> Option<IndexMetadata> {
        self.entries
            .lock()
            .unwrap()
            .get(&id)
            .map(|e| e.metadata.clone())
    }
}

fn cosine(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        return 0.0;
    }
    let mut dot = 0.0f32;
    let mut norm_a = 0.0f32;
    let mut norm_b = 0.0f32;
    for (x, y) in a.iter().zip(b) {
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }
    let magnitude = norm_a.sqrt() * norm_b.sqrt();
    if magnitude == 0.0 {
        0.0
    } else {
        dot / magnitude
    }
}

#[async_trait]
impl VectorIndex for MockVectorIndex {
    async fn upsert(&self, id: Uuid, vector: &Vector, metadata: IndexMetadata) -> Result<()> {
        if self.fail_upsert.load(Ordering::SeqCst) {
            return Err(Error::Index("mock index upsert failure".to_string()));
        }
        self.entries.lock().unwrap().insert(
            id,
            Entry {
                vector: vector.as_slice().to_vec(),
                metadata,
            },
        );
        Ok(())
    }

    async fn update_metadata(&self, id: Uuid, metadata: IndexMetadata) -> Result<()> {
        if self.fail_upsert.load(Ordering::SeqCst) {
            return Err(Error::Index("mock index update failure".to_string()));
        }
        if let Some(entry) = self.entries.lock().unwrap().get_mut(&id) {
            entry.metadata = metadata;
        }
        Ok(())
    }

    async fn query(&self, vector: &Vector, top_k: i64) -> Result<Vec<IndexHit>> {
        if self.fail_query.load(Ordering::SeqCst) {
            return Err(Error::Index("mock index query failure".to_string()));
        }

        let entries = self.entries.lock().unwrap();
        let mut hits: Vec<IndexHit> = entries
            .iter()
            .map(|(id, entry)| IndexHit {
                id: *id,
                score: cosine(vector.as_slice(), &entry.vector),
                metadata: entry.metadata.clone(),
            })
            .collect();

        // Score descending, id ascending for stable ordering.
        hits.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.id.cmp(&b.id))
        });
        hits.truncate(top_k.max(0) as usize);
        Ok(hits)
    }

    async fn delete(&self, id: Uuid) -> Result<()> {
        if self.fail_delete.load(Ordering::SeqCst) {
            return Err(Error::Index("mock index delete failure".to_string()));
        }
        self.entries.lock().unwrap().remove(&id);
        Ok(())
    }
}
