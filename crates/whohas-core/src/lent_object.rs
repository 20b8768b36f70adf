//! Loan records — the single entity tracked by whohas.
//!
//! A [`LentObject`] is one physical item handed to somebody else. Callers
//! build a [`NewLentObject`] to record a loan; the store assigns the id and
//! stamps the modification time. Later edits go through a
//! [`LentObjectPatch`] naming only the fields to change.

use chrono::{DateTime, Datelike as _, Timelike as _, Utc};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::{Error, Result};

// ─── Persisted record ────────────────────────────────────────────────────────

/// A loan record as read back from the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LentObject {
  /// Store-assigned row id; never reused while the row exists.
  pub id:                 i64,
  pub description:        String,
  /// Category code chosen by the UI layer; `None` when uncategorised.
  pub category:           Option<i32>,
  /// When the item was lent out.
  pub date:               DateTime<Utc>,
  /// Stamped by the store on every create and update.
  pub modification_date:  DateTime<Utc>,
  pub person_name:        String,
  /// Identifier of the borrower in an external address book.
  pub person_key:         Option<String>,
  pub returned:           bool,
  /// Reminder linked in an external calendar.
  pub calendar_event_uri: Option<Url>,
}

impl LentObject {
  /// Whether the item is still out on loan.
  pub fn is_active(&self) -> bool { !self.returned }
}

// ─── Create input ────────────────────────────────────────────────────────────

/// Input to [`LoanStore::create`](crate::store::LoanStore::create).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewLentObject {
  pub description:        String,
  pub category:           Option<i32>,
  pub date:               DateTime<Utc>,
  pub person_name:        String,
  pub person_key:         Option<String>,
  #[serde(default)]
  pub returned:           bool,
  pub calendar_event_uri: Option<Url>,
}

impl NewLentObject {
  /// A fresh, not-yet-returned loan with only the required fields set.
  /// `date` is cut to whole seconds, the precision the store keeps.
  pub fn new(
    description: impl Into<String>,
    person_name: impl Into<String>,
    date: DateTime<Utc>,
  ) -> Self {
    Self {
      description: description.into(),
      category: None,
      date: whole_seconds(date),
      person_name: person_name.into(),
      person_key: None,
      returned: false,
      calendar_event_uri: None,
    }
  }

  /// Reject blank required text fields and dates outside years 0000-9999.
  pub fn validate(&self) -> Result<()> {
    require("description", &self.description)?;
    require("person_name", &self.person_name)?;
    in_range("date", self.date)?;
    Ok(())
  }
}

/// Drop sub-second precision.
pub fn whole_seconds(dt: DateTime<Utc>) -> DateTime<Utc> {
  dt.with_nanosecond(0).unwrap_or(dt)
}

// Dates are stored as `YYYY-MM-DD HH:MM:SS`; a year outside four digits would
// break lexical ordering.
fn in_range(field: &'static str, dt: DateTime<Utc>) -> Result<()> {
  if !(0..=9999).contains(&dt.year()) {
    return Err(Error::DateOutOfRange(field));
  }
  Ok(())
}

fn require(field: &'static str, value: &str) -> Result<()> {
  if value.trim().is_empty() {
    return Err(Error::MissingField(field));
  }
  Ok(())
}

// ─── Partial update ──────────────────────────────────────────────────────────

/// A partial update: `None` leaves the column untouched.
///
/// Nullable columns use a nested `Option` so that `Some(None)` clears the
/// stored value while `None` leaves it alone.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LentObjectPatch {
  pub description:        Option<String>,
  pub category:           Option<Option<i32>>,
  pub date:               Option<DateTime<Utc>>,
  pub person_name:        Option<String>,
  pub person_key:         Option<Option<String>>,
  pub returned:           Option<bool>,
  pub calendar_event_uri: Option<Option<Url>>,
}

impl LentObjectPatch {
  /// The fields an edit form rewrites as a whole. The returned flag and the
  /// calendar link have their own flows and are left untouched.
  pub fn details(record: &NewLentObject) -> Self {
    Self {
      description: Some(record.description.clone()),
      category: Some(record.category),
      date: Some(whole_seconds(record.date)),
      person_name: Some(record.person_name.clone()),
      person_key: Some(record.person_key.clone()),
      ..Self::default()
    }
  }

  pub fn description(mut self, description: impl Into<String>) -> Self {
    self.description = Some(description.into());
    self
  }

  pub fn category(mut self, category: Option<i32>) -> Self {
    self.category = Some(category);
    self
  }

  pub fn date(mut self, date: DateTime<Utc>) -> Self {
    self.date = Some(whole_seconds(date));
    self
  }

  pub fn person_name(mut self, person_name: impl Into<String>) -> Self {
    self.person_name = Some(person_name.into());
    self
  }

  pub fn person_key(mut self, person_key: Option<String>) -> Self {
    self.person_key = Some(person_key);
    self
  }

  pub fn returned(mut self, returned: bool) -> Self {
    self.returned = Some(returned);
    self
  }

  pub fn calendar_event_uri(mut self, uri: Option<Url>) -> Self {
    self.calendar_event_uri = Some(uri);
    self
  }

  /// True when no field is set. Applying an empty patch still counts as a
  /// modification.
  pub fn is_empty(&self) -> bool { *self == Self::default() }

  /// Required columns may be left alone but never blanked.
  pub fn validate(&self) -> Result<()> {
    if let Some(description) = &self.description {
      require("description", description)?;
    }
    if let Some(person_name) = &self.person_name {
      require("person_name", person_name)?;
    }
    if let Some(date) = self.date {
      in_range("date", date)?;
    }
    Ok(())
  }
}
