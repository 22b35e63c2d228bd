//! Search orchestration: ANN index primary path, brute-force fallback.
//!
//! The primary path asks the vector index for nearest neighbors and
//! hydrates the hits from the durable store. Any index failure is
//! swallowed and the same request is served by scanning stored
//! embeddings, so search degrades in latency but never in correctness.
//! Both paths end at the same tenant gate: a result row must belong to
//! the requested workspace and be `ready`, as judged by the durable
//! store, not by index metadata.

use std::cmp::Ordering;
use std::time::Instant;

use tracing::{debug, instrument, trace, warn};
use uuid::Uuid;

use recall_core::{
    defaults, Error, ItemStatus, KnowledgeItem, Result, RetrievalContext, SearchPath,
    SearchRequest, SearchResponse, SearchResult, Vector, VectorIndex,
};

use crate::scoring::cosine_similarity;
use crate::service::RetrievalService;
use crate::snippet::extract_snippet;

impl RetrievalService {
    /// Run a similarity search scoped to one workspace.
    ///
    /// Embedding the query is the only fatal step; once a query vector
    /// exists, a result always comes back from one of the two paths.
    #[instrument(skip(self, req), fields(
        subsystem = "retrieval",
        component = "search",
        op = "search",
        workspace_id = %req.workspace_id,
        query = %req.query,
    ))]
    pub async fn search(&self, req: SearchRequest) -> Result<SearchResponse> {
        if req.query.trim().is_empty() {
            return Err(Error::InvalidInput("query must not be empty".into()));
        }

        let started = Instant::now();
        let query_vector = self.embedder.embed(&req.query).await?;

        if let Some(index) = &self.index {
            match self.search_primary(index.as_ref(), &query_vector, &req).await {
                Ok(response) => {
                    debug!(
                        search_path = %SearchPath::Primary,
                        result_count = response.results.len(),
                        duration_ms = started.elapsed().as_millis() as u64,
                        "Search served by vector index"
                    );
                    return Ok(response);
                }
                Err(e) => {
                    warn!(
                        error = %e,
                        "Primary search path failed, falling back to stored embeddings"
                    );
                }
            }
        }

        let response = self.search_fallback(&query_vector, &req).await?;
        debug!(
            search_path = %SearchPath::Fallback,
            result_count = response.results.len(),
            truncated = response.truncated,
            duration_ms = started.elapsed().as_millis() as u64,
            "Search served by brute-force scan"
        );
        Ok(response)
    }

    /// Assemble generation context: a search at the context threshold
    /// plus a "title: snippet" digest of the sources.
    #[instrument(skip(self, query), fields(
        subsystem = "retrieval",
        component = "search",
        op = "get_context",
        workspace_id = %workspace_id,
    ))]
    pub async fn get_context(
        &self,
        workspace_id: Uuid,
        query: &str,
        limit: Option<i64>,
    ) -> Result<RetrievalContext> {
        let req = SearchRequest::new(query, workspace_id)
            .with_limit(limit.unwrap_or(defaults::CONTEXT_LIMIT))
            .with_threshold(defaults::CONTEXT_SIMILARITY_THRESHOLD);

        let response = self.search(req).await?;
        let summary = response
            .results
            .iter()
            .map(|r| format!("{}: {}", r.item.title, r.snippet))
            .collect::<Vec<_>>()
            .join("\n\n");

        Ok(RetrievalContext {
            sources: response.results,
            summary,
        })
    }

    /// Primary path: overfetch from the index, pre-filter on mirrored
    /// metadata, then hydrate and re-validate against the durable store.
    ///
    /// Index metadata is treated as a hint only. The workspace and
    /// status checks repeat on the hydrated rows because the mirror can
    /// lag the source of truth.
    async fn search_primary(
        &self,
        index: &dyn VectorIndex,
        query_vector: &Vector,
        req: &SearchRequest,
    ) -> Result<SearchResponse> {
        let limit = req.effective_limit();
        let threshold = req.effective_threshold();
        let top_k = limit * defaults::INDEX_OVERFETCH_FACTOR;

        let hits = index.query(query_vector, top_k).await?;
        trace!(candidate_count = hits.len(), "Vector index returned candidates");

        let candidates: Vec<_> = hits
            .into_iter()
            .filter(|hit| {
                hit.metadata.workspace_id == req.workspace_id
                    && hit.metadata.status == ItemStatus::Ready
                    && req.filters.matches_metadata(&hit.metadata)
                    && hit.score >= threshold
            })
            .collect();

        let ids: Vec<Uuid> = candidates.iter().map(|h| h.id).collect();
        let items = self.repo.fetch_many(req.workspace_id, &ids).await?;

        let mut scored: Vec<(KnowledgeItem, f32)> = Vec::with_capacity(candidates.len());
        for hit in candidates {
            // Hits absent from the durable store are stale mirror
            // entries; drop them silently.
            let Some(item) = items.iter().find(|i| i.id == hit.id) else {
                continue;
            };
            if !Self::item_visible(req.workspace_id, item) || !req.filters.matches_item(item) {
                continue;
            }
            scored.push((item.clone(), hit.score));
        }

        Ok(SearchResponse {
            results: rank_and_snippet(scored, limit, &req.query),
            path: SearchPath::Primary,
            truncated: false,
        })
    }

    /// Fallback path: scan stored embeddings and score with cosine
    /// similarity. Bounded by a row cap; the response says when the cap
    /// was hit so callers know recall may be partial.
    async fn search_fallback(
        &self,
        query_vector: &Vector,
        req: &SearchRequest,
    ) -> Result<SearchResponse> {
        let limit = req.effective_limit();
        let threshold = req.effective_threshold();

        let candidates = self
            .repo
            .scan_ready(req.workspace_id, &req.filters, defaults::FALLBACK_SCAN_CAP)
            .await?;
        let truncated = candidates.len() as i64 >= defaults::FALLBACK_SCAN_CAP;
        trace!(candidate_count = candidates.len(), truncated, "Scanned fallback candidates");

        let query_slice = query_vector.as_slice();
        let mut scored: Vec<(KnowledgeItem, f32)> = Vec::new();
        for item in candidates {
            if !Self::item_visible(req.workspace_id, &item) {
                continue;
            }
            let Some(embedding) = &item.embedding else {
                continue;
            };
            // Stored vectors from a different model/dimension are not
            // comparable; drop them rather than scoring them at 0.0.
            if embedding.as_slice().len() != query_slice.len() {
                continue;
            }
            let score = cosine_similarity(query_slice, embedding.as_slice());
            if score >= threshold {
                scored.push((item, score));
            }
        }

        Ok(SearchResponse {
            results: rank_and_snippet(scored, limit, &req.query),
            path: SearchPath::Fallback,
            truncated,
        })
    }
}

/// Order scored candidates (score descending, id ascending for stable
/// ties), truncate to the limit, and attach snippets.
fn rank_and_snippet(
    mut scored: Vec<(KnowledgeItem, f32)>,
    limit: i64,
    query: &str,
) -> Vec<SearchResult> {
    scored.sort_by(|a, b| {
        b.1.partial_cmp(&a.1)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.0.id.cmp(&b.0.id))
    });
    scored.truncate(limit as usize);

    scored
        .into_iter()
        .map(|(item, score)| {
            let snippet = extract_snippet(&item.content, query, defaults::SNIPPET_MAX_LEN);
            SearchResult {
                item,
                relevance_score: score,
                snippet,
            }
        })
        .collect()
}
