use serde::Serialize;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::store::store_model::StoreEvent;

/// One line of the store event journal.
#[derive(Debug, Serialize)]
pub struct JournalEntry<'a> {
    pub timestamp_ms: u128,
    pub seq: u64,

    #[serde(flatten)]
    pub event: &'a StoreEvent,
}

impl<'a> JournalEntry<'a> {
    pub fn now(seq: u64, event: &'a StoreEvent) -> Self {
        Self {
            timestamp_ms: SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map(|d| d.as_millis())
                .unwrap_or_default(),
            seq,
            event,
        }
    }
}
