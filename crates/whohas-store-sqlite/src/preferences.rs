//! Side preference store holding the "first start" flag.
//!
//! The flag is written when a database file is created from scratch (never on
//! upgrade or reset) and consumed by onboarding logic outside this crate.

use std::{io::ErrorKind, path::Path};

use serde::{Deserialize, Serialize};

use crate::Result;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Preferences {
  #[serde(default)]
  pub first_start: bool,
}

impl Preferences {
  /// Read preferences from `path`; a missing file yields the defaults.
  pub async fn load(path: &Path) -> Result<Self> {
    match tokio::fs::read(path).await {
      Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
      Err(e) if e.kind() == ErrorKind::NotFound => Ok(Self::default()),
      Err(e) => Err(e.into()),
    }
  }

  pub async fn save(&self, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
      tokio::fs::create_dir_all(parent).await?;
    }
    tokio::fs::write(path, serde_json::to_vec_pretty(self)?).await?;
    Ok(())
  }

  /// Record that the database was just created.
  pub async fn mark_first_start(path: &Path) -> Result<()> {
    let mut prefs = Self::load(path).await?;
    prefs.first_start = true;
    prefs.save(path).await
  }

  /// Return the flag and clear it, so onboarding runs once.
  pub async fn take_first_start(path: &Path) -> Result<bool> {
    let mut prefs = Self::load(path).await?;
    if !prefs.first_start {
      return Ok(false);
    }
    prefs.first_start = false;
    prefs.save(path).await?;
    Ok(true)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[tokio::test]
  async fn missing_file_means_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let prefs = Preferences::load(&dir.path().join("preferences.json"))
      .await
      .unwrap();
    assert!(!prefs.first_start);
  }

  #[tokio::test]
  async fn first_start_is_taken_once() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("preferences.json");

    Preferences::mark_first_start(&path).await.unwrap();
    assert!(Preferences::load(&path).await.unwrap().first_start);

    assert!(Preferences::take_first_start(&path).await.unwrap());
    assert!(!Preferences::take_first_start(&path).await.unwrap());
  }

  #[tokio::test]
  async fn malformed_file_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("preferences.json");
    tokio::fs::write(&path, b"not json").await.unwrap();

    let err = Preferences::load(&path).await.unwrap_err();
    assert!(err.is_storage());
  }
}
