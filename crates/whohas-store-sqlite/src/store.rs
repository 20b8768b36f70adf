//! [`SqliteStore`] — the SQLite implementation of [`LoanStore`].

use std::path::Path;

use chrono::Utc;
use rusqlite::{OptionalExtension as _, params_from_iter, types::Value};
use whohas_core::{LentObject, LentObjectPatch, LoanStore, NewLentObject};

use crate::{
  Result,
  encode::{COLUMNS, RawLentObject, insert_values, update_values},
  schema::{self, PRAGMAS, SchemaOutcome},
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A loan store backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted, so every
/// clone observes the same data.
#[derive(Clone)]
pub struct SqliteStore {
  conn:    tokio_rusqlite::Connection,
  outcome: SchemaOutcome,
}

/// Which rows a list query returns.
#[derive(Debug, Clone, Copy)]
enum Filter {
  All,
  Returned(bool),
}

impl SqliteStore {
  /// Open (or create) a store at `path` and bring its schema up to date.
  ///
  /// The store is not handed out until migration has finished, so no CRUD
  /// call can run against a partially upgraded file.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    Self::init(conn).await
  }

  /// Open an in-memory store — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    Self::init(conn).await
  }

  async fn init(conn: tokio_rusqlite::Connection) -> Result<Self> {
    let outcome = conn
      .call(|conn| {
        conn.execute_batch(PRAGMAS)?;
        Ok(schema::migrate(conn))
      })
      .await??;
    Ok(Self { conn, outcome })
  }

  /// What the schema manager did when this store was opened.
  pub fn schema_outcome(&self) -> SchemaOutcome { self.outcome }

  /// Close the underlying connection. Other clones of this store fail from
  /// then on.
  pub async fn close(self) -> Result<()> {
    self.conn.close().await?;
    Ok(())
  }

  async fn select(&self, filter: Filter) -> Result<Vec<LentObject>> {
    let raws: Vec<RawLentObject> = self
      .conn
      .call(move |conn| {
        let rows = match filter {
          Filter::All => {
            let mut stmt = conn.prepare(&format!(
              "SELECT {COLUMNS} FROM lentobjects ORDER BY date ASC, id ASC"
            ))?;
            stmt
              .query_map([], RawLentObject::from_row)?
              .collect::<rusqlite::Result<Vec<_>>>()?
          }
          Filter::Returned(returned) => {
            let mut stmt = conn.prepare(&format!(
              "SELECT {COLUMNS} FROM lentobjects WHERE returned = ?1
               ORDER BY date ASC, id ASC"
            ))?;
            stmt
              .query_map(rusqlite::params![returned], RawLentObject::from_row)?
              .collect::<rusqlite::Result<Vec<_>>>()?
          }
        };
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawLentObject::into_lent_object).collect()
  }
}

// ─── LoanStore impl ──────────────────────────────────────────────────────────

impl LoanStore for SqliteStore {
  type Error = crate::Error;

  // ── Writes ────────────────────────────────────────────────────────────────

  async fn create(&self, record: NewLentObject) -> Result<i64> {
    record.validate()?;
    let values = insert_values(record, Utc::now());

    let id = self
      .conn
      .call(move |conn| {
        let (columns, values): (Vec<&str>, Vec<Value>) = values.into_iter().unzip();
        let placeholders = (1..=columns.len())
          .map(|i| format!("?{i}"))
          .collect::<Vec<_>>()
          .join(", ");
        conn.execute(
          &format!(
            "INSERT INTO lentobjects ({}) VALUES ({placeholders})",
            columns.join(", ")
          ),
          params_from_iter(values),
        )?;
        Ok(conn.last_insert_rowid())
      })
      .await?;

    Ok(id)
  }

  async fn update(&self, id: i64, patch: LentObjectPatch) -> Result<bool> {
    patch.validate()?;
    let values = update_values(patch, Utc::now());

    let changed = self
      .conn
      .call(move |conn| {
        let (columns, mut values): (Vec<&str>, Vec<Value>) =
          values.into_iter().unzip();
        let assignments = columns
          .iter()
          .enumerate()
          .map(|(i, column)| format!("{column} = ?{}", i + 1))
          .collect::<Vec<_>>()
          .join(", ");
        let id_param = values.len() + 1;
        values.push(Value::Integer(id));
        let changed = conn.execute(
          &format!("UPDATE lentobjects SET {assignments} WHERE id = ?{id_param}"),
          params_from_iter(values),
        )?;
        Ok(changed)
      })
      .await?;

    Ok(changed > 0)
  }

  async fn delete(&self, id: i64) -> Result<bool> {
    let deleted = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "DELETE FROM lentobjects WHERE id = ?1",
          rusqlite::params![id],
        )?)
      })
      .await?;

    Ok(deleted > 0)
  }

  async fn clear(&self) -> Result<()> {
    self.conn.call(|conn| Ok(schema::reset(conn))).await??;
    tracing::info!("cleared lentobjects table");
    Ok(())
  }

  // ── Reads ─────────────────────────────────────────────────────────────────

  async fn get(&self, id: i64) -> Result<Option<LentObject>> {
    let raw: Option<RawLentObject> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!("SELECT {COLUMNS} FROM lentobjects WHERE id = ?1"),
              rusqlite::params![id],
              RawLentObject::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawLentObject::into_lent_object).transpose()
  }

  async fn fetch_all(&self) -> Result<Vec<LentObject>> {
    self.select(Filter::All).await
  }

  async fn fetch_active(&self) -> Result<Vec<LentObject>> {
    self.select(Filter::Returned(false)).await
  }

  async fn fetch_returned(&self) -> Result<Vec<LentObject>> {
    self.select(Filter::Returned(true)).await
  }

  async fn count(&self) -> Result<u64> {
    let count: i64 = self
      .conn
      .call(|conn| {
        Ok(conn.query_row("SELECT COUNT(*) FROM lentobjects", [], |row| {
          row.get(0)
        })?)
      })
      .await?;

    Ok(count.try_into().unwrap_or_default())
  }
}
