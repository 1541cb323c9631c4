use serde_json::Value;

use crate::chunk::Recommendation;

// Field aliases across the raw document shapes. First match wins.
const CONTENT_KEYS: &[&str] = &["recommendation_content", "content"];
const CLASS_KEYS: &[&str] = &["recommendation_class", "cor"];
const RATING_KEYS: &[&str] = &["rating", "loe"];

/// Map already-structured store documents onto recommendation records.
///
/// Two shapes occur in practice: flat documents carrying the recommendation
/// fields directly (one record each), and nested documents with a
/// list-valued `recommendations` field (one record per element). Missing
/// fields become empty strings; nothing here ever fails. Document order and
/// inner-list order are preserved.
pub fn normalize(docs: &[Value]) -> Vec<Recommendation> {
    let mut records = Vec::new();

    for doc in docs {
        let Some(obj) = doc.as_object() else {
            continue;
        };

        if let Some(nested) = obj.get("recommendations").and_then(Value::as_array) {
            for entry in nested {
                if entry.is_object() {
                    records.push(to_record(entry));
                }
            }
        } else if has_any_key(doc) {
            records.push(to_record(doc));
        }
    }

    records
}

fn to_record(doc: &Value) -> Recommendation {
    Recommendation {
        content: first_field(doc, CONTENT_KEYS),
        class_label: first_field(doc, CLASS_KEYS),
        rating: first_field(doc, RATING_KEYS),
    }
}

fn first_field(doc: &Value, keys: &[&str]) -> String {
    keys.iter()
        .find_map(|k| doc.get(*k).and_then(Value::as_str))
        .map(|s| s.trim().to_string())
        .unwrap_or_default()
}

fn has_any_key(doc: &Value) -> bool {
    CONTENT_KEYS
        .iter()
        .chain(CLASS_KEYS)
        .chain(RATING_KEYS)
        .any(|k| doc.get(*k).is_some())
}
