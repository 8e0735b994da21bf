use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};

use tracing::warn;

use crate::store::analysis_store::StoreListener;
use crate::store::store_model::StoreEvent;
use crate::trace::trace::JournalEntry;

/// Appends every store event to a JSONL file.
///
/// Failures to open or write the file are logged and otherwise ignored;
/// the journal never interrupts the session.
pub struct EventJournal {
    file: Option<Mutex<std::fs::File>>,
    seq: AtomicU64,
}

impl EventJournal {
    pub fn new(path: &Path) -> Self {
        let file = OpenOptions::new().create(true).append(true).open(path);

        match file {
            Ok(f) => Self {
                file: Some(Mutex::new(f)),
                seq: AtomicU64::new(0),
            },
            Err(e) => {
                warn!(path = %path.display(), %e, "could not open event journal");
                Self {
                    file: None,
                    seq: AtomicU64::new(0),
                }
            }
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.file.is_some()
    }

    pub fn log(&self, event: &StoreEvent) {
        let file_mutex = match &self.file {
            Some(f) => f,
            None => return, // journal disabled
        };

        let mut file = match file_mutex.lock() {
            Ok(f) => f,
            Err(e) => {
                warn!(%e, "event journal lock poisoned");
                return;
            }
        };

        // numbered under the lock so lines land in sequence order
        let seq = self.seq.fetch_add(1, Ordering::Relaxed);

        let json = match serde_json::to_string(&JournalEntry::now(seq, event)) {
            Ok(j) => j,
            Err(e) => {
                warn!(%e, "failed to serialize journal entry");
                return;
            }
        };

        if let Err(e) = writeln!(file, "{}", json) {
            warn!(%e, "failed to write journal entry");
        }
    }
}

impl StoreListener for EventJournal {
    fn on_event(&self, event: &StoreEvent) {
        self.log(event);
    }
}
