//! Instance connectivity and schema introspection.
//!
//! The walker talks to database instances through the [`Instance`] and
//! [`Connector`] traits so that the orchestration logic can be exercised
//! without a live server. The production implementation introspects MySQL's
//! `information_schema` through lazily-connecting sqlx pools.

use std::fmt;

use sqlx::mysql::{MySqlConnectOptions, MySqlPool, MySqlPoolOptions};
use tracing::debug;

use crate::config::TargetSpec;
use crate::error::{DriftError, Result};
use crate::schema::{quote_ident, ColumnSnapshot, IndexSnapshot, SchemaSnapshot, TableSnapshot};

/// Operations the orchestrator needs from a database instance.
#[allow(async_fn_in_trait)]
pub trait Instance: fmt::Display {
    /// Performs a lightweight connectivity probe.
    async fn can_connect(&self) -> Result<()>;

    /// Introspects a schema by name into a snapshot. Returns `None` when the
    /// schema does not exist; that is a valid, expected state.
    async fn schema(&self, name: &str) -> Result<Option<SchemaSnapshot>>;

    /// Creates an empty schema.
    async fn create_schema(&self, name: &str) -> Result<()>;

    /// Drops a schema if it exists.
    async fn drop_schema(&self, name: &str) -> Result<()>;

    /// Executes statements sequentially with the given schema as the default
    /// schema, all on one connection.
    async fn apply_in_schema(&self, schema: &str, statements: &[String]) -> Result<()>;
}

/// Builds instances from resolved target specs.
pub trait Connector {
    /// The instance type this connector produces.
    type Instance: Instance;

    /// Builds an instance handle for a target. Must not perform network IO;
    /// connectivity is probed separately.
    fn instance(&self, spec: &TargetSpec) -> Result<Self::Instance>;
}

/// Production connector backed by sqlx MySQL pools.
#[derive(Debug, Clone, Copy, Default)]
pub struct MySqlConnector;

impl MySqlConnector {
    /// Creates a new connector.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Connector for MySqlConnector {
    type Instance = MySqlInstance;

    fn instance(&self, spec: &TargetSpec) -> Result<MySqlInstance> {
        // Brackets are address syntax, not part of the IPv6 host itself
        let host = spec.host.trim_start_matches('[').trim_end_matches(']');
        let mut options = MySqlConnectOptions::new()
            .host(host)
            .port(spec.port)
            .username(&spec.user);
        if let Some(password) = &spec.password {
            options = options.password(password);
        }

        let pool = MySqlPoolOptions::new()
            .max_connections(2)
            .connect_lazy_with(options);

        Ok(MySqlInstance {
            pool,
            display: spec.to_string(),
        })
    }
}

/// A MySQL instance handle.
pub struct MySqlInstance {
    pool: MySqlPool,
    display: String,
}

impl fmt::Display for MySqlInstance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display)
    }
}

impl MySqlInstance {
    async fn table_snapshot(
        &self,
        schema: &str,
        name: &str,
        engine: Option<String>,
        next_auto_increment: Option<u64>,
    ) -> Result<TableSnapshot> {
        let mut table = TableSnapshot::new(name);
        table.engine = engine;
        table.next_auto_increment = next_auto_increment;

        let columns: Vec<(String, String, String, Option<String>, String)> = sqlx::query_as(
            "SELECT column_name, column_type, is_nullable, column_default, extra \
             FROM information_schema.columns \
             WHERE table_schema = ? AND table_name = ? \
             ORDER BY ordinal_position",
        )
        .bind(schema)
        .bind(name)
        .fetch_all(&self.pool)
        .await
        .map_err(|source| DriftError::Introspection {
            schema: schema.to_string(),
            source,
        })?;

        for (col_name, column_type, is_nullable, default, extra) in columns {
            let extra = extra.to_ascii_lowercase();
            let mut column = ColumnSnapshot::new(col_name, column_type);
            column.nullable = is_nullable.eq_ignore_ascii_case("YES");
            column.auto_increment = extra.contains("auto_increment");
            column.default = default.map(|raw| default_literal(&raw, &extra));
            table.columns.push(column);
        }

        let key_parts: Vec<(String, i64, String)> = sqlx::query_as(
            "SELECT index_name, non_unique, column_name \
             FROM information_schema.statistics \
             WHERE table_schema = ? AND table_name = ? \
             ORDER BY index_name, seq_in_index",
        )
        .bind(schema)
        .bind(name)
        .fetch_all(&self.pool)
        .await
        .map_err(|source| DriftError::Introspection {
            schema: schema.to_string(),
            source,
        })?;

        for (index_name, non_unique, column_name) in key_parts {
            if index_name == "PRIMARY" {
                table.primary_key.push(column_name);
            } else if let Some(pos) = table.indexes.iter().position(|i| i.name == index_name) {
                table.indexes[pos].columns.push(column_name);
            } else {
                table
                    .indexes
                    .push(IndexSnapshot::new(index_name, vec![column_name], non_unique == 0));
            }
        }

        Ok(table)
    }
}

impl Instance for MySqlInstance {
    async fn can_connect(&self) -> Result<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    async fn schema(&self, name: &str) -> Result<Option<SchemaSnapshot>> {
        let exists: Option<(String,)> = sqlx::query_as(
            "SELECT schema_name FROM information_schema.schemata WHERE schema_name = ?",
        )
        .bind(name)
        .fetch_optional(&self.pool)
        .await
        .map_err(|source| DriftError::Introspection {
            schema: name.to_string(),
            source,
        })?;
        if exists.is_none() {
            return Ok(None);
        }

        let tables: Vec<(String, Option<String>, Option<u64>)> = sqlx::query_as(
            "SELECT table_name, engine, auto_increment \
             FROM information_schema.tables \
             WHERE table_schema = ? AND table_type = 'BASE TABLE' \
             ORDER BY table_name",
        )
        .bind(name)
        .fetch_all(&self.pool)
        .await
        .map_err(|source| DriftError::Introspection {
            schema: name.to_string(),
            source,
        })?;

        let mut snapshot = SchemaSnapshot::new(name);
        for (table_name, engine, next_auto_increment) in tables {
            let table = self
                .table_snapshot(name, &table_name, engine, next_auto_increment)
                .await?;
            snapshot.tables.push(table);
        }

        debug!(instance = %self, schema = name, tables = snapshot.tables.len(), "introspected schema");
        Ok(Some(snapshot))
    }

    async fn create_schema(&self, name: &str) -> Result<()> {
        sqlx::query(&format!("CREATE DATABASE {}", quote_ident(name)))
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn drop_schema(&self, name: &str) -> Result<()> {
        sqlx::query(&format!("DROP DATABASE IF EXISTS {}", quote_ident(name)))
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn apply_in_schema(&self, schema: &str, statements: &[String]) -> Result<()> {
        let mut conn = self.pool.acquire().await?;
        sqlx::query(&format!("USE {}", quote_ident(schema)))
            .execute(&mut *conn)
            .await?;
        for statement in statements {
            debug!(sql = %statement, "applying statement");
            sqlx::query(statement).execute(&mut *conn).await?;
        }
        Ok(())
    }
}

/// Renders an `information_schema` COLUMN_DEFAULT value as a SQL literal.
///
/// Numeric values, NULL, and datetime expressions pass through unquoted;
/// anything else is treated as a string literal.
fn default_literal(raw: &str, extra: &str) -> String {
    if extra.contains("default_generated") {
        return raw.to_string();
    }
    let upper = raw.to_ascii_uppercase();
    if upper == "NULL" || upper.starts_with("CURRENT_TIMESTAMP") {
        return raw.to_string();
    }
    if raw.parse::<f64>().is_ok() {
        return raw.to_string();
    }
    format!("'{}'", raw.replace('\'', "''"))
}
