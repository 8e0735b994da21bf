use serde_json::Value;
use thiserror::Error;
use tracing::warn;

use crate::element::element_model::RawElement;

#[derive(Debug, Error, PartialEq)]
pub enum IngestError {
    #[error("element {index} is not an object")]
    NotAnObject { index: usize },

    #[error("element {index} has no tag")]
    MissingTag { index: usize },

    #[error("element {index} is malformed: {message}")]
    Malformed { index: usize, message: String },
}

/// Result of converting a backend element list.
#[derive(Debug, Default)]
pub struct Ingested {
    pub elements: Vec<RawElement>,
    pub rejected: Vec<IngestError>,
}

/// Convert a JSON element list into `RawElement`s.
///
/// Bad entries are rejected one by one; the rest of the list still loads.
pub fn ingest_elements(values: Vec<Value>) -> Ingested {
    let mut out = Ingested::default();

    for (index, value) in values.into_iter().enumerate() {
        match ingest_one(index, value) {
            Ok(element) => out.elements.push(element),
            Err(e) => {
                warn!(%e, "rejecting element");
                out.rejected.push(e);
            }
        }
    }

    out
}

fn ingest_one(index: usize, value: Value) -> Result<RawElement, IngestError> {
    let obj = value.as_object().ok_or(IngestError::NotAnObject { index })?;

    match obj.get("tag").and_then(Value::as_str) {
        Some(tag) if !tag.trim().is_empty() => {}
        _ => return Err(IngestError::MissingTag { index }),
    }

    serde_json::from_value(value).map_err(|e| IngestError::Malformed {
        index,
        message: e.to_string(),
    })
}
