mod chunk;
mod config;
mod export;
mod parser;
mod store;

use std::path::PathBuf;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use tracing::info;

use crate::chunk::JobMetadata;
use crate::config::StoreConfig;
use crate::export::OutputShape;
use crate::parser::HeaderMode;

#[derive(Parser)]
#[command(
    name = "guideline_chunker",
    about = "Turn clinical-guideline recommendation tables into JSON chunks"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Load a Markdown file into the document store under a job ID
    Seed {
        /// Markdown file to store
        file: PathBuf,
        #[arg(long)]
        job_id: String,
        #[command(flatten)]
        store: StoreArgs,
    },
    /// Fetch a job's documents from the store and emit JSON chunks
    Extract {
        #[command(flatten)]
        store: StoreArgs,
        #[command(flatten)]
        meta: MetaArgs,
        #[command(flatten)]
        output: OutputArgs,
    },
    /// Parse a Markdown file directly and emit JSON chunks
    File {
        /// Markdown file to parse (decoded as UTF-8)
        path: PathBuf,
        #[command(flatten)]
        meta: MetaArgs,
        #[command(flatten)]
        output: OutputArgs,
    },
    /// Show document-store contents
    Stats {
        #[command(flatten)]
        store: StoreArgs,
    },
}

#[derive(Args)]
struct StoreArgs {
    /// Store database path (default: data/guidelines.sqlite)
    #[arg(long)]
    db: Option<PathBuf>,
    /// Collection name (default: dps_data)
    #[arg(long)]
    collection: Option<String>,
    /// Store timeout in seconds (default: 5)
    #[arg(long)]
    timeout_secs: Option<u64>,
}

impl StoreArgs {
    fn into_config(self) -> StoreConfig {
        let mut cfg = StoreConfig::load();
        cfg.apply_overrides(self.db, self.collection, self.timeout_secs);
        cfg
    }
}

#[derive(Args)]
struct MetaArgs {
    #[arg(long)]
    job_id: String,
    #[arg(long, default_value = "Distal Radius Fracture Rehabilitation")]
    title: String,
    #[arg(long, default_value = "Rehabilitation")]
    stage: String,
    #[arg(long, default_value = "Fracture")]
    disease: String,
    #[arg(long, default_value = "orthopedics")]
    specialty: String,
}

impl MetaArgs {
    fn into_metadata(self) -> JobMetadata {
        JobMetadata {
            job_id: self.job_id,
            title: self.title,
            stage: self.stage,
            disease: self.disease,
            specialty: self.specialty,
        }
    }
}

#[derive(Args)]
struct OutputArgs {
    /// Output file
    #[arg(long, default_value = "output.json")]
    out: PathBuf,
    /// Top-level artifact shape
    #[arg(long, value_enum, default_value = "array")]
    shape: OutputShape,
    /// Treat literal CoR/LoE rows as headers everywhere, or first row only
    #[arg(long, value_enum, default_value = "skip-all")]
    header_mode: HeaderMode,
    /// Embed the raw fetched documents in every chunk (duplicates the
    /// whole result set per chunk; kept for artifact compatibility)
    #[arg(long)]
    embed_fetched: bool,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Seed { file, job_id, store } => {
            if job_id.trim().is_empty() {
                anyhow::bail!("missing required field: job id");
            }
            let text = read_markdown(&file)?;
            let cfg = store.into_config();
            let conn = store::connect(&cfg)?;
            store::init_schema(&conn)?;
            let body = serde_json::json!({ "job_id": job_id, "markdown_content": text });
            let id = store::insert_document(&conn, &cfg.collection, &job_id, &body)?;
            println!(
                "Stored {} as document {} (job ID {})",
                file.display(),
                id,
                job_id
            );
            Ok(())
        }
        Commands::Extract { store, meta, output } => {
            let meta = meta.into_metadata();
            meta.validate()?;

            let cfg = store.into_config();
            let conn = store::connect(&cfg)?;
            store::init_schema(&conn)?;

            let docs = store::find_by_job_id(&conn, &cfg.collection, &meta.job_id)?;
            if docs.is_empty() {
                println!("No data found for job ID {}.", meta.job_id);
                return Ok(());
            }
            info!(documents = docs.len(), job_id = %meta.job_id, "fetched documents");

            let records = parser::records_from_docs(&docs, output.header_mode);
            let fetched = output.embed_fetched.then_some(docs.as_slice());
            emit(&records, &meta, fetched, &output)
        }
        Commands::File { path, meta, output } => {
            let meta = meta.into_metadata();
            meta.validate()?;

            let text = read_markdown(&path)?;
            let records = parser::table::parse(&text, output.header_mode);
            emit(&records, &meta, None, &output)
        }
        Commands::Stats { store } => {
            let cfg = store.into_config();
            let conn = store::connect(&cfg)?;
            store::init_schema(&conn)?;
            let s = store::get_stats(&conn, &cfg.collection)?;
            println!("Store:      {}", cfg.path.display());
            println!("Collection: {}", cfg.collection);
            println!("Documents:  {}", s.documents);
            println!("Jobs:       {}", s.jobs);
            Ok(())
        }
    }
}

/// Shared tail of the pipeline: shape records into chunks and write the
/// artifact. An empty record set is an informational exit, not an error,
/// and produces no file.
fn emit(
    records: &[chunk::Recommendation],
    meta: &JobMetadata,
    fetched: Option<&[serde_json::Value]>,
    output: &OutputArgs,
) -> anyhow::Result<()> {
    if records.is_empty() {
        println!("No recommendations found.");
        return Ok(());
    }

    let chunks = chunk::build(records, meta, fetched);
    let rendered = export::render(&chunks, meta, output.shape)?;
    export::write(&output.out, &rendered)?;
    println!("Wrote {} chunks to {}", chunks.len(), output.out.display());
    Ok(())
}

fn read_markdown(path: &PathBuf) -> anyhow::Result<String> {
    let bytes =
        std::fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
    String::from_utf8(bytes).with_context(|| format!("{} is not valid UTF-8", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    fn meta() -> JobMetadata {
        JobMetadata {
            job_id: "job-001".into(),
            title: "Distal Radius Fracture Rehabilitation".into(),
            stage: "Rehabilitation".into(),
            disease: "Fracture".into(),
            specialty: "orthopedics".into(),
        }
    }

    #[test]
    fn seed_then_extract_pipeline() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = StoreConfig {
            path: dir.path().join("guidelines.sqlite"),
            collection: "dps_data".into(),
            timeout_secs: 5,
        };
        let conn = store::connect(&cfg).unwrap();
        store::init_schema(&conn).unwrap();

        let markdown = std::fs::read_to_string("tests/fixtures/distal_radius.md").unwrap();
        let body = json!({ "job_id": "job-001", "markdown_content": markdown });
        store::insert_document(&conn, &cfg.collection, "job-001", &body).unwrap();

        let docs = store::find_by_job_id(&conn, &cfg.collection, "job-001").unwrap();
        assert_eq!(docs.len(), 1);

        let records = parser::records_from_docs(&docs, HeaderMode::default());
        assert_eq!(records.len(), 3);
        assert_eq!(records[0].class_label, "A");
        assert_eq!(records[0].rating, "IV");
        assert_eq!(records[0].content, "Apply splint for 4 weeks");

        let chunks = chunk::build(&records, &meta(), None);
        assert_eq!(chunks.len(), records.len());

        let rendered = export::render(&chunks, &meta(), OutputShape::Array).unwrap();
        let parsed: Value = serde_json::from_str(&rendered).unwrap();
        let arr = parsed.as_array().unwrap();
        assert_eq!(arr.len(), 3);
        assert_eq!(arr[0]["job_id"], "job-001");
        assert_eq!(arr[0]["stage"], json!(["Rehabilitation"]));
        assert_eq!(arr[2]["rating"], "III");
    }

    #[test]
    fn absent_job_is_empty_not_error() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = StoreConfig {
            path: dir.path().join("guidelines.sqlite"),
            collection: "dps_data".into(),
            timeout_secs: 5,
        };
        let conn = store::connect(&cfg).unwrap();
        store::init_schema(&conn).unwrap();
        let docs = store::find_by_job_id(&conn, &cfg.collection, "missing").unwrap();
        assert!(docs.is_empty());
    }

    #[test]
    fn fixture_parses_from_file_path_too() {
        let text = read_markdown(&PathBuf::from("tests/fixtures/distal_radius.md")).unwrap();
        let records = parser::table::parse(&text, HeaderMode::default());
        assert_eq!(records.len(), 3);
    }

    #[test]
    fn embedded_fetched_data_round_trips() {
        let docs = vec![json!({ "job_id": "job-001", "markdown_content": "| A | I | x |" })];
        let records = parser::records_from_docs(&docs, HeaderMode::default());
        let chunks = chunk::build(&records, &meta(), Some(&docs));
        let rendered = export::render(&chunks, &meta(), OutputShape::Array).unwrap();
        let parsed: Value = serde_json::from_str(&rendered).unwrap();
        assert_eq!(parsed[0]["fetched_data"], json!(docs));
    }
}
