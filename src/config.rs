use std::env;
use anyhow::{bail, Context, Result};

/// Which key-value backend the store handle is bound to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageBackend {
    Memory,
    Spanner(SpannerSettings),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpannerSettings {
    pub emulator_host: Option<String>,
    pub project: String,
    pub instance: String,
    pub database: String,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub access_token: Option<String>,
    pub storage_backend: Option<StorageBackend>,
    pub list_page_size: usize,
    pub service_port: u16,
    pub service_host: String,
    pub api_docs_enabled: bool,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        // An empty secret would let an empty bearer token through, so treat it as unset.
        let access_token = env::var("ACCESS_TOKEN").ok().filter(|t| !t.is_empty());

        let storage_backend = match env::var("STORAGE_BACKEND").ok().as_deref() {
            None | Some("") => None,
            Some("memory") => Some(StorageBackend::Memory),
            Some("spanner") => Some(StorageBackend::Spanner(SpannerSettings::from_env()?)),
            Some(other) => bail!(
                "STORAGE_BACKEND must be one of: memory, spanner, got '{}'",
                other
            ),
        };

        let list_page_size = env::var("KV_LIST_PAGE_SIZE")
            .unwrap_or_else(|_| "1000".to_string())
            .parse::<usize>()
            .context("KV_LIST_PAGE_SIZE must be a positive integer")?;
        if list_page_size == 0 {
            bail!("KV_LIST_PAGE_SIZE must be a positive integer");
        }
        // Spanner takes the page size as an INT64 LIMIT.
        if i64::try_from(list_page_size).is_err() {
            bail!("KV_LIST_PAGE_SIZE must not exceed {}", i64::MAX);
        }

        let service_port = env::var("SERVICE_PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse::<u16>()
            .context("SERVICE_PORT must be a valid port number (0-65535)")?;

        let service_host = env::var("SERVICE_HOST")
            .unwrap_or_else(|_| "0.0.0.0".to_string());

        let api_docs_enabled = env::var("API_DOCS_ENABLED")
            .map(|v| matches!(v.as_str(), "1" | "true" | "yes"))
            .unwrap_or(false);

        Ok(Config {
            access_token,
            storage_backend,
            list_page_size,
            service_port,
            service_host,
            api_docs_enabled,
        })
    }

    pub fn log_startup(&self) {
        tracing::info!("Configuration loaded:");
        if self.access_token.is_some() {
            tracing::info!("  Access token: configured");
        } else {
            tracing::warn!("  Access token: NOT configured, booking requests will fail with 500");
        }
        match &self.storage_backend {
            Some(StorageBackend::Memory) => tracing::info!("  Storage: in-memory"),
            Some(StorageBackend::Spanner(spanner)) => {
                tracing::info!("  Storage: spanner");
                tracing::info!("  Spanner emulator: {}",
                    spanner.emulator_host.as_deref().unwrap_or("disabled (using production)"));
                tracing::info!("  Spanner project: {}", spanner.project);
                tracing::info!("  Spanner instance: {}", spanner.instance);
                tracing::info!("  Spanner database: {}", spanner.database);
            }
            None => tracing::warn!("  Storage: NOT configured, booking requests will fail with 500"),
        }
        tracing::info!("  List page size: {}", self.list_page_size);
        tracing::info!("  API docs: {}", if self.api_docs_enabled { "enabled" } else { "disabled" });
        tracing::info!("  Service listening on: {}:{}", self.service_host, self.service_port);
    }
}

impl SpannerSettings {
    fn from_env() -> Result<Self> {
        let emulator_host = env::var("SPANNER_EMULATOR_HOST").ok();

        let project = env::var("SPANNER_PROJECT")
            .context("SPANNER_PROJECT environment variable is required")?;

        let instance = env::var("SPANNER_INSTANCE")
            .context("SPANNER_INSTANCE environment variable is required")?;

        let database = env::var("SPANNER_DATABASE")
            .context("SPANNER_DATABASE environment variable is required")?;

        Ok(SpannerSettings {
            emulator_host,
            project,
            instance,
            database,
        })
    }

    /// Fully qualified database path
    pub fn database_path(&self) -> String {
        format!(
            "projects/{}/instances/{}/databases/{}",
            self.project, self.instance, self.database
        )
    }
}
