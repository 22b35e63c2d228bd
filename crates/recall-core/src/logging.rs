//! Structured logging schema and field name constants for recall.
//!
//! All crates use these constants for consistent structured logging fields,
//! so log aggregation tools can query by standardized names across every
//! subsystem.
//!
//! ## Log Level Contract
//!
//! | Level | Usage |
//! |-------|-------|
//! | ERROR | Degraded service, requires operator attention |
//! | WARN  | Recoverable issue, automatic fallback applied |
//! | INFO  | Lifecycle events, operation completions |
//! | DEBUG | Decision points, intermediate values, config choices |
//! | TRACE | Per-item iteration, high-volume data (candidates, hits) |

// ─── Identity fields ───────────────────────────────────────────────────────

/// Subsystem originating the log event.
/// Values: "retrieval", "db", "embed", "index"
pub const SUBSYSTEM: &str = "subsystem";

/// Component within a subsystem.
/// Examples: "search", "dual_write", "pool", "openai", "http_index"
pub const COMPONENT: &str = "component";

/// Logical operation name.
/// Examples: "search", "store_item", "embed", "upsert", "reindex"
pub const OPERATION: &str = "op";

// ─── Entity fields ─────────────────────────────────────────────────────────

/// Knowledge item UUID being operated on.
pub const ITEM_ID: &str = "item_id";

/// Workspace (tenant) UUID scoping the operation.
pub const WORKSPACE_ID: &str = "workspace_id";

/// Search query text.
pub const QUERY: &str = "query";

// ─── Measurement fields ────────────────────────────────────────────────────

/// Wall-clock duration in milliseconds.
pub const DURATION_MS: &str = "duration_ms";

/// Number of results returned by a search or query.
pub const RESULT_COUNT: &str = "result_count";

/// Number of candidates considered before filtering.
pub const CANDIDATE_COUNT: &str = "candidate_count";

// ─── Search-specific fields ────────────────────────────────────────────────

/// Which path served the search ("primary", "fallback").
pub const SEARCH_PATH: &str = "search_path";

/// Similarity threshold applied to the query.
pub const THRESHOLD: &str = "threshold";

/// Whether the fallback scan hit its row cap.
pub const TRUNCATED: &str = "truncated";

// ─── Inference fields ──────────────────────────────────────────────────────

/// Embedding model used.
pub const MODEL: &str = "model";

/// Embedding dimension in play.
pub const DIMENSION: &str = "dimension";

// ─── Outcome fields ────────────────────────────────────────────────────────

/// Boolean success/failure indicator.
pub const SUCCESS: &str = "success";

/// Error message when an operation fails.
pub const ERROR_MSG: &str = "error";

/// Set when a durable write committed but the index mirror failed.
pub const DEGRADED: &str = "degraded";
