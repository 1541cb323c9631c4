use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One recommendation row, regardless of which source shape it came from.
/// All fields are passed through verbatim from the source text (trimmed);
/// class and rating are opaque labels, not enums.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recommendation {
    pub content: String,
    pub class_label: String,
    pub rating: String,
}

/// User-supplied envelope for one run. Immutable once built; every output
/// chunk replicates it.
#[derive(Debug, Clone)]
pub struct JobMetadata {
    pub job_id: String,
    pub title: String,
    pub stage: String,
    pub disease: String,
    pub specialty: String,
}

impl JobMetadata {
    /// All fields must be present before any store round trip is attempted.
    pub fn validate(&self) -> anyhow::Result<()> {
        let fields = [
            ("job id", &self.job_id),
            ("title", &self.title),
            ("stage", &self.stage),
            ("disease", &self.disease),
            ("specialty", &self.specialty),
        ];
        for (name, value) in fields {
            if value.trim().is_empty() {
                anyhow::bail!("missing required field: {}", name);
            }
        }
        Ok(())
    }
}

/// One output record: job metadata + one recommendation. Field names and
/// shapes match the downstream ingestion format exactly — `stage`, `disease`
/// and `specialty` are single-element lists for compatibility with a
/// multi-value consumer, and `subCategory`/`rationales`/`references` are
/// empty placeholders reserved for later enrichment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputChunk {
    pub title: String,
    #[serde(rename = "subCategory")]
    pub sub_category: Vec<String>,
    pub guide_title: String,
    pub stage: Vec<String>,
    pub disease: Vec<String>,
    pub rationales: Vec<String>,
    pub references: Vec<String>,
    pub specialty: Vec<String>,
    pub job_id: String,
    pub recommendation_content: String,
    pub recommendation_class: String,
    pub rating: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fetched_data: Option<Value>,
}

/// One chunk per record. When `fetched` is given, the full raw document set
/// is embedded in every chunk (duplicating it once per chunk — kept for
/// compatibility with the historical artifact, off by default upstream).
pub fn build(
    records: &[Recommendation],
    meta: &JobMetadata,
    fetched: Option<&[Value]>,
) -> Vec<OutputChunk> {
    records
        .iter()
        .map(|rec| OutputChunk {
            title: meta.title.clone(),
            sub_category: Vec::new(),
            guide_title: meta.title.clone(),
            stage: vec![meta.stage.clone()],
            disease: vec![meta.disease.clone()],
            rationales: Vec::new(),
            references: Vec::new(),
            specialty: vec![meta.specialty.clone()],
            job_id: meta.job_id.clone(),
            recommendation_content: rec.content.clone(),
            recommendation_class: rec.class_label.clone(),
            rating: rec.rating.clone(),
            fetched_data: fetched.map(|docs| Value::Array(docs.to_vec())),
        })
        .collect()
}
