//! [`StoreRegistry`] — at most one open [`SqliteStore`] per context.

use std::{
  collections::HashMap,
  path::{Path, PathBuf},
};

use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::{Result, SqliteStore, preferences::Preferences, schema::SchemaOutcome};

const DATABASE_FILE: &str = "lentobjects.db";
const PREFERENCES_FILE: &str = "preferences.json";

/// The scope a store is opened under: one data directory holding the
/// database file and its side preference store.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StoreContext {
  data_dir: PathBuf,
}

impl StoreContext {
  pub fn new(data_dir: impl Into<PathBuf>) -> Self {
    Self { data_dir: data_dir.into() }
  }

  pub fn data_dir(&self) -> &Path { &self.data_dir }

  pub fn database_path(&self) -> PathBuf { self.data_dir.join(DATABASE_FILE) }

  pub fn preferences_path(&self) -> PathBuf {
    self.data_dir.join(PREFERENCES_FILE)
  }
}

/// Maps contexts to their open store.
///
/// Lookup-or-open happens under one lock, so two concurrent callers for the
/// same context never both open the file. Contexts are keyed by their data
/// directory exactly as given; two spellings of one directory are distinct.
#[derive(Default)]
pub struct StoreRegistry {
  stores: Mutex<HashMap<PathBuf, SqliteStore>>,
}

impl StoreRegistry {
  pub fn new() -> Self { Self::default() }

  /// Return the store registered for `ctx`, opening and migrating it first
  /// if this is the first request.
  pub async fn get_instance(&self, ctx: &StoreContext) -> Result<SqliteStore> {
    let mut stores = self.stores.lock().await;

    if let Some(store) = stores.get(ctx.data_dir()) {
      return Ok(store.clone());
    }

    tokio::fs::create_dir_all(ctx.data_dir()).await?;
    let store = SqliteStore::open(ctx.database_path()).await?;
    debug!(path = %ctx.database_path().display(), outcome = ?store.schema_outcome(), "opened store");

    stores.insert(ctx.data_dir().to_path_buf(), store.clone());

    // A failed flag write does not fail the open.
    if store.schema_outcome() == SchemaOutcome::Created
      && let Err(e) = Preferences::mark_first_start(&ctx.preferences_path()).await
    {
      warn!(path = %ctx.preferences_path().display(), error = %e, "failed to record first start");
    }

    Ok(store)
  }

  /// Close and forget the store for `ctx`. Returns `false` if none was open.
  pub async fn close(&self, ctx: &StoreContext) -> Result<bool> {
    let removed = self.stores.lock().await.remove(ctx.data_dir());
    match removed {
      Some(store) => {
        store.close().await?;
        debug!(path = %ctx.database_path().display(), "closed store");
        Ok(true)
      }
      None => Ok(false),
    }
  }

  /// Close every registered store.
  pub async fn close_all(&self) -> Result<()> {
    let stores: Vec<_> = self.stores.lock().await.drain().collect();
    for (dir, store) in stores {
      store.close().await?;
      debug!(path = %dir.display(), "closed store");
    }
    Ok(())
  }

  pub async fn len(&self) -> usize { self.stores.lock().await.len() }

  pub async fn is_empty(&self) -> bool { self.stores.lock().await.is_empty() }
}
