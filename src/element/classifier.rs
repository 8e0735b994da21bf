use std::collections::HashMap;

use tracing::debug;

use crate::element::element_model::{ElementInfo, ParsedElements, RawElement};

/// Group raw elements into tag, id and class frequency tables.
///
/// Every tagged element lands in exactly one `tags` entry, every non-empty
/// id in one `ids` entry, and every non-empty class name in its own
/// `classes` entry. Elements with a blank tag are counted in `rejected`
/// and contribute nothing.
pub fn classify(elements: &[RawElement]) -> ParsedElements {
    let mut parsed = ParsedElements::default();

    for el in elements {
        if el.tag.trim().is_empty() {
            parsed.rejected += 1;
            continue;
        }

        record(&mut parsed.tags, &el.tag, el);

        if let Some(id) = el.id_value() {
            record(&mut parsed.ids, id, el);
        }

        for class in el.class_names() {
            record(&mut parsed.classes, class, el);
        }
    }

    debug!(
        tags = parsed.tags.len(),
        ids = parsed.ids.len(),
        classes = parsed.classes.len(),
        rejected = parsed.rejected,
        "classified elements"
    );

    parsed
}

fn record(table: &mut HashMap<String, ElementInfo>, key: &str, el: &RawElement) {
    match table.get_mut(key) {
        Some(info) => info.record(el),
        None => {
            table.insert(key.to_string(), ElementInfo::first(el));
        }
    }
}
