use serde::Deserialize;

use crate::services::{
    catalog::CatalogOptions,
    session::{DegeneratePolicy, SessionSettings},
};

/// Application configuration loaded from environment variables
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Catalog of normalized item vectors produced by the offline pipeline
    #[serde(default = "default_catalog_path")]
    pub catalog_path: String,

    /// Optional display metadata (titles, genres, ...) keyed by item id
    #[serde(default)]
    pub metadata_path: Option<String>,

    /// Single-byte field delimiter of the catalog file
    #[serde(default = "default_catalog_delimiter")]
    pub catalog_delimiter: String,

    /// Expected vector dimensionality D, checked at load
    #[serde(default)]
    pub vector_dimension: Option<usize>,

    /// Expected catalog size N; when set ids must cover 1..=N
    #[serde(default)]
    pub catalog_size: Option<usize>,

    /// Randomly sampled items shown before ranking starts
    #[serde(default = "default_cold_start_count")]
    pub cold_start_count: usize,

    /// Number of recommendations in the end-of-session report
    #[serde(default = "default_final_batch_size")]
    pub final_batch_size: usize,

    /// Recovery when a feedback update collapses the user vector
    #[serde(default)]
    pub degenerate_policy: DegeneratePolicy,

    /// Seed for reproducible cold starts
    #[serde(default)]
    pub rng_seed: Option<u64>,

    /// Upper bound on concurrently live sessions
    #[serde(default)]
    pub max_sessions: Option<usize>,

    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_catalog_path() -> String {
    "main_data/normalized_vectors.csv".to_string()
}

fn default_catalog_delimiter() -> String {
    ";".to_string()
}

fn default_cold_start_count() -> usize {
    10
}

fn default_final_batch_size() -> usize {
    10
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        let config = envy::from_env::<Config>()
            .map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))?;
        config.validate()?;
        Ok(config)
    }

    /// Rejects settings no session could run with
    pub fn validate(&self) -> anyhow::Result<()> {
        self.delimiter_byte()?;

        if self.final_batch_size == 0 {
            anyhow::bail!("FINAL_BATCH_SIZE must be at least 1");
        }
        if self.vector_dimension == Some(0) {
            anyhow::bail!("VECTOR_DIMENSION must be at least 1");
        }
        if self.catalog_size == Some(0) {
            anyhow::bail!("CATALOG_SIZE must be at least 1");
        }
        if let Some(size) = self.catalog_size {
            if u32::try_from(size).is_err() {
                anyhow::bail!("CATALOG_SIZE {} exceeds the item id range", size);
            }
            if self.cold_start_count > size {
                anyhow::bail!(
                    "COLD_START_COUNT {} exceeds CATALOG_SIZE {}",
                    self.cold_start_count,
                    size
                );
            }
        }
        if self.max_sessions == Some(0) {
            anyhow::bail!("MAX_SESSIONS must be at least 1");
        }

        Ok(())
    }

    pub fn catalog_options(&self) -> anyhow::Result<CatalogOptions> {
        Ok(CatalogOptions {
            delimiter: self.delimiter_byte()?,
            expected_dimension: self.vector_dimension,
            expected_size: self.catalog_size,
            ..CatalogOptions::default()
        })
    }

    pub fn session_settings(&self) -> SessionSettings {
        SessionSettings {
            cold_start_count: self.cold_start_count,
            final_batch_size: self.final_batch_size,
            degenerate_policy: self.degenerate_policy,
        }
    }

    fn delimiter_byte(&self) -> anyhow::Result<u8> {
        match self.catalog_delimiter.as_bytes() {
            [byte] => Ok(*byte),
            _ => anyhow::bail!(
                "CATALOG_DELIMITER must be a single byte, got '{}'",
                self.catalog_delimiter
            ),
        }
    }
}
