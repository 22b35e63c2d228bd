//! Default values shared across the recall crates.
//!
//! Central place for tunable constants so the service, the adapters, and the
//! tests all agree on the same numbers.

/// Default number of results returned by a search.
pub const SEARCH_LIMIT: i64 = 10;

/// Default minimum cosine similarity for a search hit.
pub const SIMILARITY_THRESHOLD: f32 = 0.7;

/// Similarity threshold used when assembling generation context.
///
/// Slightly looser than the search default so downstream generation sees
/// marginal-but-related sources.
pub const CONTEXT_SIMILARITY_THRESHOLD: f32 = 0.6;

/// Default number of sources included in a generation context.
pub const CONTEXT_LIMIT: i64 = 5;

/// Over-fetch multiplier for the primary (vector index) search path.
///
/// The index has no native tenant partitioning, so tenant/status filtering
/// happens post-hoc and removes candidates. Fetching `limit * 3` keeps the
/// final page full in the common case.
pub const INDEX_OVERFETCH_FACTOR: i64 = 3;

/// Hard cap on rows scanned by the fallback (brute-force) search path.
///
/// When the cap is hit the response carries `truncated = true`.
pub const FALLBACK_SCAN_CAP: i64 = 1000;

/// Maximum snippet length in characters.
pub const SNIPPET_MAX_LEN: usize = 200;

/// Default page size for item listings.
pub const LIST_LIMIT: i64 = 50;

/// Default embedding model.
pub const EMBED_MODEL: &str = "text-embedding-3-small";

/// Default embedding dimension (text-embedding-3-small).
pub const EMBED_DIMENSION: usize = 1536;

/// Default base URL for the embedding provider.
pub const EMBED_URL: &str = "https://api.openai.com";

/// Timeout for embedding requests (seconds).
pub const EMBED_TIMEOUT_SECS: u64 = 30;

/// Timeout for vector index requests (seconds).
///
/// Deliberately short: a slow index should trip the fallback path, not
/// stall the whole search.
pub const INDEX_TIMEOUT_SECS: u64 = 10;
