//! Create-if-absent DDL for the target database and table

use crate::config::{SinkEngine, DATABASE_NAME, TABLE_NAME};
use crate::database::{quote_ident, quote_literal, quote_mysql_ident, Sink, SINK_CATALOG};
use crate::error::Result;
use crate::types::Header;
use tracing::debug;

/// Column type used for every header field
pub const COLUMN_TYPE: &str = "VARCHAR(255)";

/// Longest value a column accepts, in characters
pub const MAX_COLUMN_LENGTH: usize = 255;

/// Issues the idempotent statements that prepare the target table
///
/// An existing table is left alone even when its columns differ from the
/// header; such a mismatch surfaces later as an insert failure.
#[derive(Debug, Clone)]
pub struct SchemaEnsurer {
    database: String,
    table: String,
}

impl Default for SchemaEnsurer {
    fn default() -> Self {
        Self::new(DATABASE_NAME, TABLE_NAME)
    }
}

impl SchemaEnsurer {
    /// Create an ensurer for `database.table`
    pub fn new(database: impl Into<String>, table: impl Into<String>) -> Self {
        Self {
            database: database.into(),
            table: table.into(),
        }
    }

    /// Target database name
    pub fn database(&self) -> &str {
        &self.database
    }

    /// Target table name
    pub fn table(&self) -> &str {
        &self.table
    }

    /// Database name, qualified with the sink catalog when there is one
    fn qualified_database(&self, catalog: Option<&str>) -> String {
        match catalog {
            Some(catalog) => format!("{}.{}", catalog, quote_ident(&self.database)),
            None => quote_ident(&self.database),
        }
    }

    /// `CREATE SCHEMA IF NOT EXISTS` for the target database
    pub fn create_database_sql(&self, catalog: Option<&str>) -> String {
        format!(
            "CREATE SCHEMA IF NOT EXISTS {}",
            self.qualified_database(catalog)
        )
    }

    /// `USE` statement selecting the target database
    pub fn use_database_sql(&self, catalog: Option<&str>) -> String {
        format!("USE {}", self.qualified_database(catalog))
    }

    /// DuckDB `CREATE TABLE IF NOT EXISTS` with one text column per header field
    ///
    /// DuckDB parses the `VARCHAR` length but does not keep it, so each
    /// column also carries a `CHECK` on its length.
    pub fn create_table_sql(&self, header: &Header) -> String {
        let columns: Vec<String> = header
            .fields()
            .iter()
            .map(|field| {
                let column = quote_ident(field);
                format!("{column} {COLUMN_TYPE} CHECK (length({column}) <= {MAX_COLUMN_LENGTH})")
            })
            .collect();

        format!(
            "CREATE TABLE IF NOT EXISTS {} ({})",
            quote_ident(&self.table),
            columns.join(", ")
        )
    }

    /// `CREATE TABLE IF NOT EXISTS` in the server's own dialect
    ///
    /// The table is qualified with the database since the statement runs
    /// outside DuckDB's `USE`.
    pub fn native_create_table_sql(&self, header: &Header, engine: SinkEngine) -> String {
        let quote: fn(&str) -> String = match engine {
            SinkEngine::Mysql => quote_mysql_ident,
            SinkEngine::Postgres | SinkEngine::Duckdb => quote_ident,
        };
        let columns: Vec<String> = header
            .fields()
            .iter()
            .map(|field| format!("{} {COLUMN_TYPE}", quote(field)))
            .collect();

        format!(
            "CREATE TABLE IF NOT EXISTS {}.{} ({})",
            quote(&self.database),
            quote(&self.table),
            columns.join(", ")
        )
    }

    /// Table creation for `engine`
    ///
    /// MySQL and PostgreSQL get their DDL through the extension's execute
    /// call so the column length reaches the server, followed by a cache
    /// clear so DuckDB sees the new table.
    pub fn create_table_statements(
        &self,
        header: &Header,
        engine: SinkEngine,
        catalog: Option<&str>,
    ) -> Vec<String> {
        let catalog = quote_literal(catalog.unwrap_or(SINK_CATALOG));
        let native = quote_literal(&self.native_create_table_sql(header, engine));

        match engine {
            SinkEngine::Duckdb => vec![self.create_table_sql(header)],
            SinkEngine::Mysql => vec![
                format!("CALL mysql_execute({catalog}, {native})"),
                "CALL mysql_clear_cache()".to_string(),
            ],
            SinkEngine::Postgres => vec![
                format!("CALL postgres_execute({catalog}, {native})"),
                "CALL pg_clear_cache()".to_string(),
            ],
        }
    }

    /// All statements in execution order
    pub fn statements(
        &self,
        header: &Header,
        engine: SinkEngine,
        catalog: Option<&str>,
    ) -> Vec<String> {
        let mut statements = vec![
            self.create_database_sql(catalog),
            self.use_database_sql(catalog),
        ];
        statements.extend(self.create_table_statements(header, engine, catalog));
        statements
    }

    /// Run the statements against `sink`, stopping at the first failure
    pub fn ensure<S: Sink + ?Sized>(&self, sink: &mut S, header: &Header) -> Result<()> {
        let catalog = sink.catalog().map(str::to_string);
        for sql in self.statements(header, sink.engine(), catalog.as_deref()) {
            debug!("Schema statement: {}", sql);
            sink.execute(&sql)?;
        }
        Ok(())
    }
}
