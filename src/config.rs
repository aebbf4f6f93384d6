use std::path::PathBuf;

use tracing::debug;

pub const DEFAULT_DB_PATH: &str = "table_documents.db";
pub const DEFAULT_TABLES_COLLECTION: &str = "tables";
pub const DEFAULT_DISCREPANCIES_COLLECTION: &str = "discrepancies";

/// Where records and discrepancies are persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    pub db_path: PathBuf,
    pub tables_collection: String,
    pub discrepancies_collection: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from(DEFAULT_DB_PATH),
            tables_collection: DEFAULT_TABLES_COLLECTION.to_string(),
            discrepancies_collection: DEFAULT_DISCREPANCIES_COLLECTION.to_string(),
        }
    }
}

impl StoreConfig {
    /// Reads the process environment after loading `.env` when one exists.
    #[must_use]
    pub fn from_env() -> Self {
        if let Ok(path) = dotenvy::dotenv() {
            debug!(path = %path.display(), "loaded environment file");
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from any key lookup; unset or blank keys keep
    /// their defaults.
    #[must_use]
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let read = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
        let defaults = Self::default();

        Self {
            db_path: read("TABLEDOC_DB_PATH").map_or(defaults.db_path, PathBuf::from),
            tables_collection: read("TABLES_COLLECTION_NAME")
                .unwrap_or(defaults.tables_collection),
            discrepancies_collection: read("DISCREPANCIES_COLLECTION_NAME")
                .unwrap_or(defaults.discrepancies_collection),
        }
    }
}
