//! DuckDB-based sink engine
//!
//! Opens an in-memory DuckDB and attaches the target database as the `sink`
//! catalog through the mysql or postgres extension (or attaches a DuckDB
//! file directly). Every statement the pipeline issues goes through DuckDB.

use super::types::Sink;
use crate::config::{SinkEngine, SinkSettings};
use crate::error::{Error, Result};
use crate::types::Row;
use duckdb::{params_from_iter, Connection};

/// Catalog name the target database is attached under
pub const SINK_CATALOG: &str = "sink";

/// Sink backed by a DuckDB connection
pub struct DatabaseEngine {
    /// DuckDB connection
    conn: Connection,
    /// Database type
    engine: SinkEngine,
    /// Connection description (for logging, no password)
    connection_info: String,
}

impl DatabaseEngine {
    /// Connect to the configured sink
    pub fn connect(settings: &SinkSettings) -> Result<Self> {
        let label = settings.engine.label();

        let conn = Connection::open_in_memory().map_err(|e| {
            Error::connection(label, format!("Failed to create DuckDB connection: {e}"))
        })?;

        let target = Self::build_connection_string(settings)?;
        let engine = Self {
            conn,
            engine: settings.engine,
            connection_info: Self::describe(settings),
        };

        tracing::debug!("Attaching {}", engine.connection_info);
        engine.attach_database(&target)?;
        engine.check_connection()?;

        Ok(engine)
    }

    /// Build the DuckDB attach target from settings
    fn build_connection_string(settings: &SinkSettings) -> Result<String> {
        match settings.engine {
            SinkEngine::Duckdb => Ok(settings
                .database_file
                .clone()
                .unwrap_or_else(|| ":memory:".to_string())),
            SinkEngine::Mysql | SinkEngine::Postgres => {
                let host = settings.require_host()?;
                let user = settings.require_user()?;
                let password = settings.password.as_deref().unwrap_or_default();
                let port = settings.port()?;

                let mut parts = vec![
                    format!("host={}", conn_value(host)),
                    format!("user={}", conn_value(user)),
                    format!("password={}", conn_value(password)),
                    format!("port={port}"),
                ];
                if settings.engine == SinkEngine::Postgres {
                    parts.push("dbname=postgres".to_string());
                }
                Ok(parts.join(" "))
            }
        }
    }

    /// Connection description without the password
    fn describe(settings: &SinkSettings) -> String {
        match settings.engine {
            SinkEngine::Duckdb => format!(
                "duckdb {}",
                settings.database_file.as_deref().unwrap_or(":memory:")
            ),
            engine => format!(
                "{engine} {}@{}:{}",
                settings.user.as_deref().unwrap_or_default(),
                settings.host.as_deref().unwrap_or_default(),
                settings.port.as_deref().unwrap_or_default()
            ),
        }
    }

    /// Attach the external database to DuckDB
    fn attach_database(&self, target: &str) -> Result<()> {
        let label = self.engine.label();
        let target = quote_literal(target);

        let attach_sql = match self.engine {
            SinkEngine::Mysql => {
                self.conn
                    .execute_batch("INSTALL mysql; LOAD mysql;")
                    .map_err(|e| {
                        Error::connection(label, format!("Failed to load mysql extension: {e}"))
                    })?;
                format!("ATTACH {target} AS {SINK_CATALOG} (TYPE MYSQL);")
            }
            SinkEngine::Postgres => {
                self.conn
                    .execute_batch("INSTALL postgres; LOAD postgres;")
                    .map_err(|e| {
                        Error::connection(
                            label,
                            format!("Failed to load postgres extension: {e}"),
                        )
                    })?;
                format!("ATTACH {target} AS {SINK_CATALOG} (TYPE POSTGRES);")
            }
            SinkEngine::Duckdb => format!("ATTACH {target} AS {SINK_CATALOG};"),
        };

        self.conn
            .execute_batch(&attach_sql)
            .map_err(|e| Error::connection(label, format!("Failed to attach {label}: {e}")))
    }

    /// Test database connection
    pub fn check_connection(&self) -> Result<()> {
        let query = match self.engine {
            SinkEngine::Postgres => "SELECT 1 FROM sink.pg_catalog.pg_tables LIMIT 1",
            SinkEngine::Mysql => "SELECT 1 FROM sink.information_schema.tables LIMIT 1",
            SinkEngine::Duckdb => "SELECT 1",
        };

        self.conn.execute(query, []).map_err(|e| {
            Error::connection(self.engine.label(), format!("Connection check failed: {e}"))
        })?;

        Ok(())
    }

    /// Count rows in `database.table` of the sink
    pub fn row_count(&self, database: &str, table: &str) -> Result<usize> {
        let sql = format!(
            "SELECT COUNT(*) FROM {SINK_CATALOG}.{}.{}",
            quote_ident(database),
            quote_ident(table)
        );
        let count: i64 = self
            .conn
            .query_row(&sql, [], |row| row.get(0))
            .map_err(|e| Error::statement(e.to_string()))?;
        Ok(count as usize)
    }

    /// Read back `width` text columns of `database.table` in insertion order
    ///
    /// Only meaningful for the DuckDB engine, which exposes `rowid`.
    pub fn select_rows(&self, database: &str, table: &str, width: usize) -> Result<Vec<Row>> {
        let sql = format!(
            "SELECT * FROM {SINK_CATALOG}.{}.{} ORDER BY rowid",
            quote_ident(database),
            quote_ident(table)
        );
        let mut stmt = self
            .conn
            .prepare(&sql)
            .map_err(|e| Error::statement(format!("Failed to prepare query: {e}")))?;

        let rows = stmt
            .query_map([], |row| {
                (0..width)
                    .map(|i| row.get::<_, Option<String>>(i).map(Option::unwrap_or_default))
                    .collect::<std::result::Result<Row, _>>()
            })
            .map_err(|e| Error::statement(e.to_string()))?
            .collect::<std::result::Result<Vec<Row>, _>>()
            .map_err(|e| Error::statement(e.to_string()))?;

        Ok(rows)
    }

    /// Get connection description (for logging - password omitted)
    pub fn connection_info(&self) -> &str {
        &self.connection_info
    }
}

impl Sink for DatabaseEngine {
    fn engine(&self) -> SinkEngine {
        self.engine
    }

    fn catalog(&self) -> Option<&str> {
        Some(SINK_CATALOG)
    }

    fn execute(&mut self, sql: &str) -> Result<()> {
        tracing::debug!("Executing: {}", sql);
        self.conn
            .execute_batch(sql)
            .map_err(|e| Error::statement(e.to_string()))
    }

    fn insert_batch(&mut self, sql: &str, values: &[&str]) -> Result<usize> {
        let tx = self
            .conn
            .transaction()
            .map_err(|e| Error::statement(format!("Failed to begin transaction: {e}")))?;

        // dropping an uncommitted transaction rolls it back
        let inserted = tx
            .execute(sql, params_from_iter(values.iter()))
            .map_err(|e| Error::statement(e.to_string()))?;

        tx.commit()
            .map_err(|e| Error::statement(format!("Failed to commit: {e}")))?;

        Ok(inserted)
    }

    fn close(self) -> Result<()> {
        // the sink catalog may be the default after USE, and the default cannot be detached
        self.conn
            .execute_batch(&format!("USE memory; DETACH {SINK_CATALOG};"))
            .map_err(|e| Error::statement(format!("Failed to detach sink: {e}")))?;

        self.conn
            .close()
            .map_err(|(_, e)| Error::statement(format!("Failed to close DuckDB: {e}")))
    }
}

impl std::fmt::Debug for DatabaseEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DatabaseEngine")
            .field("engine", &self.engine)
            .field("connection_info", &self.connection_info)
            .finish_non_exhaustive()
    }
}

/// Quote an SQL identifier, doubling embedded quotes
pub fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// Quote a MySQL identifier with backticks, doubling embedded backticks
pub fn quote_mysql_ident(name: &str) -> String {
    format!("`{}`", name.replace('`', "``"))
}

/// Quote an SQL string literal, doubling embedded quotes
pub fn quote_literal(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

/// Quote a key=value connection parameter when it needs it
fn conn_value(value: &str) -> String {
    if !value.is_empty()
        && !value
            .chars()
            .any(|c| c.is_whitespace() || c == '\'' || c == '\\')
    {
        return value.to_string();
    }
    let escaped = value.replace('\\', "\\\\").replace('\'', "\\'");
    format!("'{escaped}'")
}
