pub mod normalize;
pub mod table;

use serde_json::Value;

use crate::chunk::Recommendation;
pub use table::HeaderMode;

/// Route fetched documents to the right extractor: documents carrying raw
/// Markdown go through the table parser, already-structured documents go
/// through the normalizer. Results are concatenated in document order.
pub fn records_from_docs(docs: &[Value], mode: HeaderMode) -> Vec<Recommendation> {
    let mut records = Vec::new();

    for doc in docs {
        match doc.get("markdown_content").and_then(Value::as_str) {
            Some(md) => records.extend(table::parse(md, mode)),
            None => records.extend(normalize::normalize(std::slice::from_ref(doc))),
        }
    }

    records
}
