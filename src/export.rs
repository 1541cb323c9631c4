use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use clap::ValueEnum;
use serde_json::{json, Value};
use tracing::warn;

use crate::chunk::{JobMetadata, OutputChunk};

/// Top-level shape of the artifact. `Array` is canonical; the other two
/// reproduce historical variants for consumers that still expect them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputShape {
    /// Array of chunk objects.
    #[default]
    Array,
    /// Bare first chunk (legacy single-record artifact).
    Single,
    /// One metadata object with an embedded `recommendations` array.
    Wrapped,
}

/// Pretty-printed (2-space) UTF-8 JSON for the chosen shape.
pub fn render(chunks: &[OutputChunk], meta: &JobMetadata, shape: OutputShape) -> Result<String> {
    let value = match shape {
        OutputShape::Array => serde_json::to_value(chunks)?,
        OutputShape::Single => {
            if chunks.len() > 1 {
                warn!(
                    chunks = chunks.len(),
                    "single-object shape requested; serializing only the first chunk"
                );
            }
            serde_json::to_value(chunks.first())?
        }
        OutputShape::Wrapped => wrap(chunks, meta),
    };
    Ok(serde_json::to_string_pretty(&value)?)
}

fn wrap(chunks: &[OutputChunk], meta: &JobMetadata) -> Value {
    let recommendations: Vec<Value> = chunks
        .iter()
        .map(|c| {
            json!({
                "recommendation_content": c.recommendation_content,
                "recommendation_class": c.recommendation_class,
                "rating": c.rating,
            })
        })
        .collect();

    json!({
        "title": meta.title,
        "subCategory": [],
        "guide_title": meta.title,
        "stage": [meta.stage],
        "disease": [meta.disease],
        "rationales": [],
        "references": [],
        "specialty": [meta.specialty],
        "job_id": meta.job_id,
        "recommendations": recommendations,
    })
}

pub fn write(path: &Path, rendered: &str) -> Result<()> {
    fs::write(path, rendered).with_context(|| format!("failed to write {}", path.display()))
}
