//! Repeated-call detection.
//!
//! Agents stuck in a loop tend to issue the same call with the same arguments
//! over and over. The tracker counts identical calls and logs a warning once a
//! call repeats too often.

use std::collections::HashMap;

use serde_json::{Map, Value};
use tokio::sync::Mutex;
use tracing::warn;

/// Identical calls at or above this count are logged as a possible loop
pub const REPEAT_WARN_THRESHOLD: u32 = 5;
/// The table is cleared once it tracks more keys than this
pub const MAX_TRACKED_CALLS: usize = 100;

#[derive(Debug, Default)]
pub struct CallTracker {
    counts: Mutex<HashMap<String, u32>>,
}

impl CallTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records one call and returns how many times it has been seen.
    pub async fn record(&self, name: &str, args: &Map<String, Value>) -> u32 {
        let key = format!("{name}_{}", Value::Object(args.clone()));
        let mut counts = self.counts.lock().await;

        let count = {
            let entry = counts.entry(key).or_insert(0);
            *entry += 1;
            *entry
        };

        if count >= REPEAT_WARN_THRESHOLD {
            warn!(tool = name, count, "Identical tool call repeated, possible loop");
        }
        if counts.len() > MAX_TRACKED_CALLS {
            counts.clear();
        }
        count
    }

    pub async fn tracked(&self) -> usize {
        self.counts.lock().await.len()
    }
}
