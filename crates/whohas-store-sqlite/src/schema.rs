//! SQL schema and version migrations for the whohas SQLite store.
//!
//! The schema version lives in `PRAGMA user_version`. A fresh file (version 0)
//! gets the current table shape directly; an older file is walked forward one
//! [`Migration`] at a time until it reaches [`SCHEMA_VERSION`].

use rusqlite::Connection;
use tracing::info;

use crate::{Error, Result};

/// Newest schema version this crate understands.
pub const SCHEMA_VERSION: u32 = 4;

/// Connection-level settings applied on every open.
pub const PRAGMAS: &str = "
PRAGMA journal_mode = WAL;
PRAGMA busy_timeout = 5000;
";

/// Current table shape; used for fresh files and after a reset.
pub const CREATE_TABLE: &str = "
CREATE TABLE lentobjects (
    id                INTEGER PRIMARY KEY AUTOINCREMENT,
    description       TEXT    NOT NULL,
    type              INTEGER,           -- category code, NULL if none
    date              TEXT    NOT NULL,  -- YYYY-MM-DD HH:MM:SS, UTC
    modification_date TEXT    NOT NULL,  -- same encoding as date
    person            TEXT    NOT NULL,
    person_key        TEXT,
    returned          INTEGER NOT NULL DEFAULT 0,
    calendar_entry    TEXT
);
";

const DROP_TABLE: &str = "DROP TABLE IF EXISTS lentobjects;";

/// One additive step from `target - 1` to `target`.
#[derive(Debug, Clone, Copy)]
pub struct Migration {
  pub target:      u32,
  pub description: &'static str,
  pub sql:         &'static str,
}

/// Ordered upgrade steps. Each runs in its own transaction together with the
/// `user_version` bump, so an interrupted upgrade resumes at the next step.
pub const MIGRATIONS: &[Migration] = &[
  Migration {
    target:      2,
    description: "add calendar reference column",
    sql:         "ALTER TABLE lentobjects ADD COLUMN calendar_entry TEXT;",
  },
  Migration {
    target:      3,
    description: "add category column",
    sql:         "ALTER TABLE lentobjects ADD COLUMN type INTEGER;",
  },
  Migration {
    target:      4,
    description: "add modification date column and backfill it from the loan date",
    sql:         "
      ALTER TABLE lentobjects ADD COLUMN modification_date TEXT;
      UPDATE lentobjects SET modification_date = date;
    ",
  },
];

/// What [`migrate`] did to bring a file up to date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaOutcome {
  /// No table existed; it was created at the current version.
  Created,
  Upgraded { from: u32, to: u32 },
  /// Already at the current version.
  Current,
}

pub fn user_version(conn: &Connection) -> Result<u32> {
  Ok(conn.pragma_query_value(None, "user_version", |row| row.get(0))?)
}

fn set_user_version(conn: &Connection, version: u32) -> Result<()> {
  conn.pragma_update(None, "user_version", version)?;
  Ok(())
}

/// Bring the database to [`SCHEMA_VERSION`].
pub fn migrate(conn: &mut Connection) -> Result<SchemaOutcome> {
  let found = user_version(conn)?;

  if found > SCHEMA_VERSION {
    return Err(Error::UnsupportedSchema { found, latest: SCHEMA_VERSION });
  }

  if found == 0 {
    create(conn)?;
    info!(version = SCHEMA_VERSION, "created lentobjects table");
    return Ok(SchemaOutcome::Created);
  }

  if found == SCHEMA_VERSION {
    return Ok(SchemaOutcome::Current);
  }

  info!(from = found, to = SCHEMA_VERSION, "upgrading database");
  for step in MIGRATIONS.iter().filter(|m| m.target > found) {
    apply(conn, step)?;
  }

  Ok(SchemaOutcome::Upgraded { from: found, to: SCHEMA_VERSION })
}

/// Apply a single step and record its version.
pub fn apply(conn: &mut Connection, step: &Migration) -> Result<()> {
  let tx = conn.transaction()?;
  tx.execute_batch(step.sql)?;
  set_user_version(&tx, step.target)?;
  tx.commit()?;
  info!(version = step.target, "{}", step.description);
  Ok(())
}

fn create(conn: &mut Connection) -> Result<()> {
  let tx = conn.transaction()?;
  tx.execute_batch(CREATE_TABLE)?;
  set_user_version(&tx, SCHEMA_VERSION)?;
  tx.commit()?;
  Ok(())
}

/// Drop all rows by recreating the table at the current version.
pub fn reset(conn: &mut Connection) -> Result<()> {
  let tx = conn.transaction()?;
  tx.execute_batch(DROP_TABLE)?;
  tx.execute_batch(CREATE_TABLE)?;
  set_user_version(&tx, SCHEMA_VERSION)?;
  tx.commit()?;
  Ok(())
}
