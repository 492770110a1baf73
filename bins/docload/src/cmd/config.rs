use clap::{Args, ValueEnum};
use serde::Deserialize;

use batch_loader::{LoadPlan, DEFAULT_BATCH_SIZE, DEFAULT_TOTAL};
use storage_memory::MemoryStoreConfig;
use storage_mongodb::MongoStoreConfig;

use super::error::DocloadError;

// ═══════════════════════════════════════════════════════════════
//  Config file (TOML)
// ═══════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum Backend {
    #[default]
    Mongodb,
    Memory,
}

#[derive(Debug, Default, Deserialize)]
pub struct Config {
    pub backend: Option<Backend>,
    pub total: Option<u64>,
    pub batch_size: Option<usize>,
    pub fetch_id: Option<u64>,
    pub new_name: Option<String>,
    #[serde(default)]
    pub mongodb: Option<MongoStoreConfig>,
    #[serde(default)]
    pub memory: Option<MemoryStoreConfig>,
}

pub fn load_config(path: &str) -> Result<Config, DocloadError> {
    let content =
        std::fs::read_to_string(path).map_err(|e| DocloadError::Config(format!("cannot read config {path}: {e}")))?;
    parse_config(&content).map_err(|e| DocloadError::Config(format!("bad config {path}: {e}")))
}

pub fn parse_config(content: &str) -> Result<Config, toml::de::Error> {
    toml::from_str(content)
}

// ═══════════════════════════════════════════════════════════════
//  CLI args
// ═══════════════════════════════════════════════════════════════

#[derive(Args, Clone, Debug, Default)]
pub struct LoadArgs {
    /// Path to docload.toml
    #[arg(long, default_value = "docload.toml", env = "DOCLOAD_CONFIG")]
    pub config: String,

    /// Store backend
    #[arg(long, value_enum)]
    pub backend: Option<Backend>,

    /// MongoDB connection string
    #[arg(long)]
    pub uri: Option<String>,

    #[arg(long)]
    pub database: Option<String>,

    #[arg(long)]
    pub collection: Option<String>,

    /// Records to generate
    #[arg(long)]
    pub total: Option<u64>,

    /// Records per bulk insert
    #[arg(long)]
    pub batch_size: Option<usize>,

    /// record_id to fetch and rename after loading
    #[arg(long)]
    pub fetch_id: Option<u64>,

    /// New name for the fetched record
    #[arg(long)]
    pub new_name: Option<String>,
}

// ═══════════════════════════════════════════════════════════════
//  Effective — merged config
// ═══════════════════════════════════════════════════════════════

pub const DEFAULT_FETCH_ID: u64 = 500;

/// Final configuration after merging: docload.toml < CLI
#[derive(Debug, Clone)]
pub struct Effective {
    pub backend: Backend,
    pub plan: LoadPlan,
    pub fetch_id: u64,
    pub new_name: String,
    pub mongodb: MongoStoreConfig,
    pub memory: MemoryStoreConfig,
}

impl Effective {
    pub fn new(args: &LoadArgs) -> Result<Self, DocloadError> {
        let cfg = match load_config(&args.config) {
            Ok(c) => c,
            Err(e) => {
                if std::path::Path::new(&args.config).exists() {
                    return Err(e);
                }
                tracing::debug!(path = %args.config, "no config file, using defaults");
                Config::default()
            }
        };
        Self::merge(args, cfg)
    }

    pub fn merge(args: &LoadArgs, cfg: Config) -> Result<Self, DocloadError> {
        let mut mongodb = cfg.mongodb.unwrap_or_default();
        if let Some(ref uri) = args.uri {
            mongodb.uri = uri.clone();
        }
        if let Some(ref database) = args.database {
            mongodb.database = database.clone();
        }
        if let Some(ref collection) = args.collection {
            mongodb.collection = collection.clone();
        }

        let total = args.total.or(cfg.total).unwrap_or(DEFAULT_TOTAL);
        let batch_size = args.batch_size.or(cfg.batch_size).unwrap_or(DEFAULT_BATCH_SIZE);
        let plan = LoadPlan::new(total, batch_size).map_err(|e| DocloadError::Config(e.to_string()))?;

        let fetch_id = args.fetch_id.or(cfg.fetch_id).unwrap_or(DEFAULT_FETCH_ID);
        let new_name = args
            .new_name
            .clone()
            .or(cfg.new_name)
            .unwrap_or_else(|| format!("Updated_User_{fetch_id}"));

        Ok(Self {
            backend: args.backend.or(cfg.backend).unwrap_or_default(),
            plan,
            fetch_id,
            new_name,
            mongodb,
            memory: cfg.memory.unwrap_or_default(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_without_file_or_flags() {
        let eff = Effective::merge(&LoadArgs::default(), Config::default()).unwrap();
        assert_eq!(eff.backend, Backend::Mongodb);
        assert_eq!(eff.plan, LoadPlan::default());
        assert_eq!(eff.fetch_id, 500);
        assert_eq!(eff.new_name, "Updated_User_500");
        assert_eq!(eff.mongodb.uri, "mongodb://localhost:27017/");
        assert_eq!(eff.mongodb.database, "test_db");
        assert_eq!(eff.mongodb.collection, "test_collection");
    }

    #[test]
    fn file_values_apply() {
        let cfg = parse_config(
            r#"
            backend = "memory"
            total = 250
            batch_size = 20
            fetch_id = 7

            [mongodb]
            database = "bench"
            connect_timeout_ms = 1500

            [memory]
            max_documents = 1000
            "#,
        )
        .unwrap();
        let eff = Effective::merge(&LoadArgs::default(), cfg).unwrap();

        assert_eq!(eff.backend, Backend::Memory);
        assert_eq!(eff.plan, LoadPlan::new(250, 20).unwrap());
        assert_eq!(eff.new_name, "Updated_User_7");
        assert_eq!(eff.mongodb.database, "bench");
        assert_eq!(eff.mongodb.collection, "test_collection");
        assert_eq!(eff.mongodb.connect_timeout_ms, Some(1500));
        assert_eq!(eff.memory.max_documents, Some(1000));
    }

    #[test]
    fn cli_overrides_file() {
        let cfg = parse_config(
            r#"
            total = 250
            [mongodb]
            uri = "mongodb://file-host:27017/"
            "#,
        )
        .unwrap();
        let args = LoadArgs {
            total: Some(40),
            uri: Some("mongodb://cli-host:27017/".into()),
            new_name: Some("Renamed".into()),
            ..LoadArgs::default()
        };
        let eff = Effective::merge(&args, cfg).unwrap();

        assert_eq!(eff.plan.total(), 40);
        assert_eq!(eff.mongodb.uri, "mongodb://cli-host:27017/");
        assert_eq!(eff.new_name, "Renamed");
    }

    #[test]
    fn zero_batch_size_is_config_error() {
        let args = LoadArgs { batch_size: Some(0), ..LoadArgs::default() };
        let err = Effective::merge(&args, Config::default()).unwrap_err();
        assert!(matches!(err, DocloadError::Config(_)));
    }

    #[test]
    fn unknown_backend_rejected() {
        assert!(parse_config(r#"backend = "postgres""#).is_err());
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let args = LoadArgs {
            config: "/nonexistent/docload.toml".into(),
            ..LoadArgs::default()
        };
        let eff = Effective::new(&args).unwrap();
        assert_eq!(eff.plan, LoadPlan::default());
    }
}
