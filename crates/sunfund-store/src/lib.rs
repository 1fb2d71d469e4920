//! Sunfund Storage Layer
//!
//! Implements the RecordStore trait on SQLite.
//!
//! # Layout
//!
//! - `updates`: one row per stored article, unique on title
//! - `project` / `organization`: the financed entity, at most one per update
//! - `subupdates`: the parties involved, zero or more per update
//!
//! Figures are stored as REAL, or as the text `n/a` when the article says
//! the value applies but does not give it.
//!
//! # Examples
//!
//! ```no_run
//! use sunfund_store::SqliteStore;
//!
//! let store = SqliteStore::new(":memory:").unwrap();
//! // Store is now ready for records
//! ```

#![warn(missing_docs)]

use rusqlite::types::Value as SqlValue;
use rusqlite::{params, Connection, OptionalExtension, Transaction};
use std::path::Path;
use sunfund_domain::{ExtractedRecord, Figure, RecordStore, NOT_AVAILABLE};
use thiserror::Error;
use tracing::{debug, info};

/// Errors that can occur during storage operations
#[derive(Error, Debug)]
pub enum StoreError {
    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Record could not be mapped to rows
    #[error("Invalid data: {0}")]
    InvalidData(String),
}

/// Tables written by [`SqliteStore::insert`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Table {
    /// One row per record
    Updates,
    /// Financed project rows
    Project,
    /// Financed organization rows
    Organization,
    /// Sub-update rows
    SubUpdates,
}

impl Table {
    /// SQL table name
    pub fn name(&self) -> &'static str {
        match self {
            Table::Updates => "updates",
            Table::Project => "project",
            Table::Organization => "organization",
            Table::SubUpdates => "subupdates",
        }
    }
}

/// SQLite-based implementation of RecordStore
///
/// # Thread Safety
///
/// SQLite connections are not thread-safe. Share a store across tasks behind
/// a mutex.
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Open or create the database at the given path
    ///
    /// Use `:memory:` for an in-memory database (useful for testing).
    /// Tables are created if absent.
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let conn = Connection::open(path)?;
        conn.pragma_update(None, "foreign_keys", "ON")?;
        conn.execute_batch(include_str!("schema.sql"))?;
        Ok(Self { conn })
    }

    /// Number of rows in a table
    pub fn row_count(&self, table: Table) -> Result<i64, StoreError> {
        let sql = format!("SELECT COUNT(*) FROM {}", table.name());
        Ok(self.conn.query_row(&sql, [], |row| row.get(0))?)
    }

    /// Id of the update stored under this title
    pub fn update_id(&self, title: &str) -> Result<Option<i64>, StoreError> {
        Ok(self
            .conn
            .query_row("SELECT id FROM updates WHERE title = ?1", params![title], |row| {
                row.get(0)
            })
            .optional()?)
    }

    fn insert_update(tx: &Transaction<'_>, record: &ExtractedRecord) -> Result<i64, StoreError> {
        let countries = serde_json::to_string(&record.receiver_country)
            .map_err(|e| StoreError::InvalidData(format!("receiverCountry: {}", e)))?;

        tx.execute(
            "INSERT INTO updates (news_url, title, news_update_type, receiver_category,
                                  text_of_article, receiver_country, date, total_amount)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                &record.news_url,
                &record.title,
                record.news_update_type.as_str(),
                record.receiver_category.as_str(),
                &record.text_of_article,
                countries,
                &record.date,
                figure_value(record.total_amount),
            ],
        )?;
        Ok(tx.last_insert_rowid())
    }

    fn insert_financed(
        tx: &Transaction<'_>,
        update_id: i64,
        record: &ExtractedRecord,
    ) -> Result<(), StoreError> {
        if let Some(project) = &record.project_financed {
            tx.execute(
                "INSERT INTO project (update_id, project_id, name, title, project_status,
                                      project_status_date, technology_and_grid_system,
                                      type_of_installation, grid_type, pv_size)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
                params![
                    update_id,
                    &project.id,
                    &project.name,
                    &record.title,
                    record.project_status.map(|s| s.as_str()),
                    &record.project_status_date,
                    record.technology_and_grid_system.map(|t| t.as_str()),
                    record.type_of_installation.map(|t| t.as_str()),
                    record.grid_type.map(|g| g.as_str()),
                    figure_value(record.pv_size),
                ],
            )?;
        }

        if let Some(organization) = &record.organization_financed {
            tx.execute(
                "INSERT INTO organization (update_id, organization_id, name, website_link, role)
                 VALUES (?1, ?2, ?3, NULL, ?4)",
                params![
                    update_id,
                    &organization.id,
                    &organization.name,
                    organization.role.as_str(),
                ],
            )?;
        }

        Ok(())
    }

    fn insert_sub_updates(
        tx: &Transaction<'_>,
        update_id: i64,
        record: &ExtractedRecord,
    ) -> Result<(), StoreError> {
        let mut stmt = tx.prepare(
            "INSERT INTO subupdates (update_id, organization, role, instrument, amount,
                                     financing_structure)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        )?;
        for sub in &record.sub_updates {
            stmt.execute(params![
                update_id,
                &sub.organization,
                sub.role.as_str(),
                sub.instrument.map(|i| i.as_str()),
                figure_value(sub.amount),
                &sub.financing_structure,
            ])?;
        }
        Ok(())
    }
}

/// Map an optional figure to its column value
fn figure_value(figure: Option<Figure>) -> SqlValue {
    match figure {
        None => SqlValue::Null,
        Some(Figure::Value(v)) => SqlValue::Real(v),
        Some(Figure::NotAvailable) => SqlValue::Text(NOT_AVAILABLE.to_string()),
    }
}

impl RecordStore for SqliteStore {
    type Error = StoreError;

    fn exists(&self, title: &str) -> Result<bool, Self::Error> {
        Ok(self.update_id(title)?.is_some())
    }

    fn insert(&mut self, record: &ExtractedRecord) -> Result<i64, Self::Error> {
        let tx = self.conn.transaction()?;

        let update_id = Self::insert_update(&tx, record)?;
        Self::insert_financed(&tx, update_id, record)?;
        Self::insert_sub_updates(&tx, update_id, record)?;

        tx.commit()?;

        debug!(update_id, sub_updates = record.sub_updates.len(), "Rows written");
        info!(title = %record.title, update_id, "Record stored");
        Ok(update_id)
    }
}
