use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::flow::flow_model::Flow;
use crate::store::store_model::StoreSnapshot;

const FORMAT_VERSION: u32 = 1;

#[derive(Debug, Error)]
pub enum PersistError {
    #[error("failed to access {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to decode {}: {source}", .path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("{} has format version {found}, expected {expected}", .path.display())]
    Version {
        path: PathBuf,
        found: u32,
        expected: u32,
    },
}

/// Everything needed to resume a design session: the start page, the
/// committed flows, and the analysis history that refers to them.
///
/// `startUrl` and `flows` default to empty so files written before they
/// were mirrored still load.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    #[serde(default)]
    pub start_url: Option<String>,
    #[serde(default)]
    pub flows: Vec<Flow>,
    #[serde(flatten)]
    pub history: StoreSnapshot,
}

#[derive(Serialize, Deserialize)]
struct PersistedSession {
    version: u32,
    #[serde(flatten)]
    session: SessionSnapshot,
}

/// Mirror a session to a JSON file.
pub fn save_session(path: &Path, session: &SessionSnapshot) -> Result<(), PersistError> {
    let io_err = |source| PersistError::Io {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(io_err)?;
    }

    let doc = PersistedSession {
        version: FORMAT_VERSION,
        session: session.clone(),
    };
    let json = serde_json::to_string_pretty(&doc).map_err(|source| PersistError::Json {
        path: path.to_path_buf(),
        source,
    })?;

    fs::write(path, json).map_err(io_err)?;
    debug!(
        path = %path.display(),
        flows = session.flows.len(),
        analyses = session.history.analysis_history.len(),
        "saved session"
    );
    Ok(())
}

/// Load a previously saved session. A missing file is not an error.
pub fn load_session(path: &Path) -> Result<Option<SessionSnapshot>, PersistError> {
    let content = match fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(source) => {
            return Err(PersistError::Io {
                path: path.to_path_buf(),
                source,
            });
        }
    };

    let doc: PersistedSession =
        serde_json::from_str(&content).map_err(|source| PersistError::Json {
            path: path.to_path_buf(),
            source,
        })?;

    if doc.version != FORMAT_VERSION {
        return Err(PersistError::Version {
            path: path.to_path_buf(),
            found: doc.version,
            expected: FORMAT_VERSION,
        });
    }

    Ok(Some(doc.session))
}
