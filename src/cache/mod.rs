//! Cache Module
//!
//! Holds oversized API responses in memory and serves them back in
//! line-aligned chunks across several tool calls.

mod chunker;
mod clock;
mod entry;
mod stats;
mod store;


use std::sync::Arc;

use tokio::sync::RwLock;

// Re-export public types
pub use chunker::split_into_chunks;
pub use clock::{Clock, ManualClock, SystemClock};
pub use entry::{serialize_payload, CacheEntry, ChunkState, SchemaSummary, TableSummary};
pub use stats::CacheStats;
pub use store::{CachedEntryInfo, Chunk, ChunkedCache};

/// Cache handle shared between the tool dispatcher and the sweep task.
pub type SharedCache = Arc<RwLock<ChunkedCache>>;

// == Public Constants ==
/// Default chunk target size in characters
pub const DEFAULT_CHUNK_SIZE: usize = 15_000;

/// Default retention window in seconds (30 minutes)
pub const DEFAULT_MAX_AGE_SECS: u64 = 30 * 60;
