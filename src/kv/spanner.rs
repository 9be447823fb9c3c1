use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use gcloud_gax::grpc::{Code, Status};
use gcloud_googleapis::spanner::admin::database::v1::{
    CreateDatabaseRequest, GetDatabaseDdlRequest, GetDatabaseRequest, UpdateDatabaseDdlRequest,
};
use gcloud_googleapis::spanner::admin::instance::v1::{
    CreateInstanceRequest, GetInstanceRequest, Instance,
};
use gcloud_spanner::admin::client::Client as AdminClient;
use gcloud_spanner::admin::AdminClientConfig;
use gcloud_spanner::client::{Client, ClientConfig};
use gcloud_spanner::mutation::insert_or_update;
use gcloud_spanner::statement::Statement;
use std::sync::Arc;

use super::{KeyPage, KvStore};
use crate::config::SpannerSettings;

const TABLE: &str = "booking_kv";

/// Schema of [`TABLE`]; its declared name must stay in step with the constant
const TABLE_DDL: &str = "CREATE TABLE booking_kv (
    kv_key STRING(MAX) NOT NULL,
    kv_value STRING(MAX) NOT NULL,
) PRIMARY KEY (kv_key)";

/// Key-value store backed by a single Google Cloud Spanner table
#[derive(Clone)]
pub struct SpannerKv {
    inner: Arc<Client>,
    page_size: usize,
    /// `page_size` as a SQL `LIMIT`
    limit: i64,
}

impl SpannerKv {
    /// Connect to Spanner, provisioning whatever the table needs first
    ///
    /// The gcloud-spanner library automatically detects the
    /// SPANNER_EMULATOR_HOST environment variable and connects to
    /// the emulator when set, or production Spanner otherwise.
    pub async fn from_settings(settings: &SpannerSettings, page_size: usize) -> Result<Self> {
        let page_size = page_size.max(1);
        let limit = i64::try_from(page_size)
            .context("List page size does not fit in a Spanner LIMIT")?;

        Provisioner::connect(settings).await?.run().await?;

        let database_path = settings.database_path();

        match &settings.emulator_host {
            Some(host) => tracing::info!("Connecting to Spanner emulator at: {}", host),
            None => tracing::info!("Connecting to production Spanner"),
        }

        // ClientConfig::default() automatically uses SPANNER_EMULATOR_HOST if set
        let client = Client::new(&database_path, ClientConfig::default())
            .await
            .context("Failed to create Spanner client")?;

        tracing::info!(
            "Successfully connected to Spanner database: {}",
            database_path
        );

        Ok(Self {
            inner: Arc::new(client),
            page_size,
            limit,
        })
    }
}

#[async_trait]
impl KvStore for SpannerKv {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let mut statement = Statement::new(format!(
            "SELECT kv_value FROM {} WHERE kv_key = @key",
            TABLE
        ));
        statement.add_param("key", &key.to_string());

        let mut tx = self.inner
            .single()
            .await
            .context("Failed to create read transaction")?;

        let mut result_set = tx
            .query(statement)
            .await
            .context("Failed to query value from Spanner")?;

        if let Some(row) = result_set.next().await? {
            let value: String = row.column_by_name("kv_value")?;
            Ok(Some(value))
        } else {
            tracing::debug!("Key not found: {}", key);
            Ok(None)
        }
    }

    async fn put(&self, key: &str, value: String) -> Result<()> {
        let mutation = insert_or_update(
            TABLE,
            &["kv_key", "kv_value"],
            &[&key.to_string(), &value],
        );

        self.inner
            .apply(vec![mutation])
            .await
            .context("Failed to write value to Spanner")?;

        tracing::debug!("Wrote key: {}", key);
        Ok(())
    }

    /// Keyset pagination: the cursor is the last key of the previous page
    async fn list(&self, prefix: &str, cursor: Option<&str>) -> Result<KeyPage> {
        let mut query = format!(
            "SELECT kv_key FROM {} WHERE STARTS_WITH(kv_key, @prefix)",
            TABLE
        );
        if cursor.is_some() {
            query.push_str(" AND kv_key > @cursor");
        }
        query.push_str(" ORDER BY kv_key LIMIT @limit");

        let mut statement = Statement::new(query);
        statement.add_param("prefix", &prefix.to_string());
        if let Some(cursor) = cursor {
            statement.add_param("cursor", &cursor.to_string());
        }
        statement.add_param("limit", &self.limit);

        let mut tx = self.inner
            .single()
            .await
            .context("Failed to create read transaction for key listing")?;

        let mut result_set = tx
            .query(statement)
            .await
            .context("Failed to list keys from Spanner")?;

        let mut keys = Vec::new();
        while let Some(row) = result_set.next().await? {
            let key: String = row.column_by_name("kv_key")?;
            keys.push(key);
        }

        // A short page means the range is exhausted; a full one may have more behind it.
        let cursor = if keys.len() == self.page_size {
            keys.last().cloned()
        } else {
            None
        };

        tracing::debug!(
            "Listed {} keys (prefix: {:?}, more: {})",
            keys.len(),
            prefix,
            cursor.is_some()
        );

        Ok(KeyPage { keys, cursor })
    }
}

/// Brings the instance, database and table into existence, top-down
///
/// A fresh database is created together with its table; an existing one only
/// gets the table when its DDL does not already declare it.
struct Provisioner<'a> {
    admin: AdminClient,
    settings: &'a SpannerSettings,
}

impl<'a> Provisioner<'a> {
    async fn connect(settings: &'a SpannerSettings) -> Result<Self> {
        let admin = AdminClient::new(AdminClientConfig::default())
            .await
            .context("Failed to create Spanner admin client")?;
        Ok(Self { admin, settings })
    }

    fn project_path(&self) -> String {
        format!("projects/{}", self.settings.project)
    }

    fn instance_path(&self) -> String {
        format!("{}/instances/{}", self.project_path(), self.settings.instance)
    }

    async fn run(&self) -> Result<()> {
        let instance_path = self.instance_path();
        let database_path = self.settings.database_path();

        let instance = self
            .admin
            .instance()
            .get_instance(
                GetInstanceRequest {
                    name: instance_path.clone(),
                    field_mask: None,
                },
                None,
            )
            .await;
        if !found(instance, "instance", &instance_path)? {
            self.create_instance().await?;
        }

        let database = self
            .admin
            .database()
            .get_database(GetDatabaseRequest { name: database_path.clone() }, None)
            .await;
        if !found(database, "database", &database_path)? {
            // The table comes with the database, nothing more to check.
            return self.create_database().await;
        }

        if !self.table_declared().await? {
            self.create_table().await?;
        }
        Ok(())
    }

    async fn create_instance(&self) -> Result<()> {
        let instance_path = self.instance_path();
        tracing::info!("Creating Spanner instance: {}", instance_path);

        // The emulator only knows its own instance config.
        let instance_config = match self.settings.emulator_host {
            Some(_) => "emulator-config",
            None => "regional-us-central1",
        };

        let request = CreateInstanceRequest {
            parent: self.project_path(),
            instance_id: self.settings.instance.clone(),
            instance: Some(Instance {
                name: instance_path,
                config: format!("{}/instanceConfigs/{}", self.project_path(), instance_config),
                display_name: format!("{} instance", self.settings.instance),
                node_count: 1,
                ..Default::default()
            }),
        };

        self.admin
            .instance()
            .create_instance(request, None)
            .await
            .context("Failed to start instance creation")?
            .wait(None)
            .await
            .context("Failed to create instance")?;
        Ok(())
    }

    async fn create_database(&self) -> Result<()> {
        tracing::info!(
            "Creating Spanner database {} with table '{}'",
            self.settings.database,
            TABLE
        );

        let request = CreateDatabaseRequest {
            parent: self.instance_path(),
            create_statement: format!("CREATE DATABASE `{}`", self.settings.database),
            extra_statements: vec![TABLE_DDL.to_string()],
            encryption_config: None,
            database_dialect: 1, // Google Standard SQL
            proto_descriptors: vec![],
        };

        self.admin
            .database()
            .create_database(request, None)
            .await
            .context("Failed to start database creation")?
            .wait(None)
            .await
            .context("Failed to create database")?;
        Ok(())
    }

    async fn table_declared(&self) -> Result<bool> {
        let ddl = self
            .admin
            .database()
            .get_database_ddl(
                GetDatabaseDdlRequest {
                    database: self.settings.database_path(),
                },
                None,
            )
            .await
            .context("Failed to get database DDL")?
            .into_inner();

        Ok(ddl
            .statements
            .iter()
            .any(|statement| created_table(statement) == Some(TABLE)))
    }

    async fn create_table(&self) -> Result<()> {
        tracing::info!("Creating table '{}'", TABLE);

        let request = UpdateDatabaseDdlRequest {
            database: self.settings.database_path(),
            statements: vec![TABLE_DDL.to_string()],
            operation_id: String::new(),
            proto_descriptors: vec![],
            throughput_mode: false,
        };

        self.admin
            .database()
            .update_database_ddl(request, None)
            .await
            .context("Failed to start table creation")?
            .wait(None)
            .await
            .context("Failed to create table")?;
        Ok(())
    }
}

/// `Ok(false)` for NotFound, `Ok(true)` for any successful lookup
fn found<T>(lookup: Result<T, Status>, kind: &str, path: &str) -> Result<bool> {
    match lookup {
        Ok(_) => {
            tracing::info!("Spanner {} exists: {}", kind, path);
            Ok(true)
        }
        Err(status) if status.code() == Code::NotFound => Ok(false),
        Err(status) => Err(anyhow!(
            "Failed to check {} existence: {}",
            kind,
            status.message()
        )),
    }
}

/// Table name declared by a `CREATE TABLE` statement, unquoted
fn created_table(statement: &str) -> Option<&str> {
    let mut words = statement.split_whitespace();
    if !words.next()?.eq_ignore_ascii_case("CREATE") || !words.next()?.eq_ignore_ascii_case("TABLE") {
        return None;
    }

    let mut name = words.next()?;
    if name.eq_ignore_ascii_case("IF") {
        // IF NOT EXISTS <name>
        name = words.nth(2)?;
    }

    let name = name.split('(').next()?.trim_matches('`');
    (!name.is_empty()).then_some(name)
}
