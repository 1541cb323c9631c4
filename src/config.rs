use std::path::PathBuf;

use config::Config;

const DEFAULT_DB_PATH: &str = "data/guidelines.sqlite";
const DEFAULT_COLLECTION: &str = "dps_data";
const DEFAULT_TIMEOUT_SECS: u64 = 5;

/// Store settings for one run. Defaults, overlaid with `GUIDELINE_*`
/// environment variables, overlaid with CLI flags.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    pub path: PathBuf,
    pub collection: String,
    pub timeout_secs: u64,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from(DEFAULT_DB_PATH),
            collection: DEFAULT_COLLECTION.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl StoreConfig {
    /// GUIDELINE_DB_PATH, GUIDELINE_COLLECTION, GUIDELINE_TIMEOUT_SECS.
    pub fn load() -> Self {
        let settings = Config::builder()
            .add_source(config::Environment::with_prefix("GUIDELINE"))
            .build()
            .unwrap_or_default();

        let mut cfg = Self::default();
        if let Ok(p) = settings.get_string("db_path") {
            cfg.path = PathBuf::from(p);
        }
        if let Ok(c) = settings.get_string("collection") {
            cfg.collection = c;
        }
        if let Ok(t) = settings.get_int("timeout_secs") {
            if t >= 0 {
                cfg.timeout_secs = t as u64;
            }
        }
        cfg
    }

    pub fn apply_overrides(
        &mut self,
        path: Option<PathBuf>,
        collection: Option<String>,
        timeout_secs: Option<u64>,
    ) {
        if let Some(p) = path {
            self.path = p;
        }
        if let Some(c) = collection {
            self.collection = c;
        }
        if let Some(t) = timeout_secs {
            self.timeout_secs = t;
        }
    }
}
