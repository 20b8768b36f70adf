//! Encoding and decoding helpers between the record model and the plain
//! values stored in SQLite columns.
//!
//! Timestamps are stored as `YYYY-MM-DD HH:MM:SS` in UTC so that a lexical
//! `ORDER BY` is also chronological. Calendar references are stored as their
//! URI string.

use chrono::{DateTime, NaiveDateTime, Utc};
use rusqlite::types::Value;
use url::Url;
use whohas_core::{LentObject, LentObjectPatch, NewLentObject};

use crate::{Error, Result};

const DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Column list shared by every read query, in [`RawLentObject`] order.
pub const COLUMNS: &str = "id, description, type, date, modification_date, \
                           person, person_key, returned, calendar_entry";

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

/// Sub-second precision is dropped.
pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.format(DATE_FORMAT).to_string() }

pub fn decode_dt(column: &'static str, s: &str) -> Result<DateTime<Utc>> {
  NaiveDateTime::parse_from_str(s, DATE_FORMAT)
    .map(|naive| naive.and_utc())
    .map_err(|_| corrupt(column, s))
}

// ─── Url ─────────────────────────────────────────────────────────────────────

pub fn encode_uri(uri: &Url) -> String { uri.as_str().to_owned() }

pub fn decode_uri(column: &'static str, s: &str) -> Result<Url> {
  Url::parse(s).map_err(|_| corrupt(column, s))
}

fn corrupt(column: &'static str, value: &str) -> Error {
  tracing::warn!(column, value, "undecodable value in lentobjects row");
  Error::CorruptRecord { column, value: value.to_owned() }
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw values read directly from a `lentobjects` row.
pub struct RawLentObject {
  pub id:                i64,
  pub description:       String,
  pub category:          Option<i32>,
  pub date:              String,
  // Nullable on files upgraded from version 3; the backfill fills it.
  pub modification_date: Option<String>,
  pub person:            String,
  pub person_key:        Option<String>,
  pub returned:          bool,
  pub calendar_entry:    Option<String>,
}

impl RawLentObject {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:                row.get(0)?,
      description:       row.get(1)?,
      category:          row.get(2)?,
      date:              row.get(3)?,
      modification_date: row.get(4)?,
      person:            row.get(5)?,
      person_key:        row.get(6)?,
      returned:          row.get(7)?,
      calendar_entry:    row.get(8)?,
    })
  }

  pub fn into_lent_object(self) -> Result<LentObject> {
    let modification_date = match self.modification_date.as_deref() {
      Some(s) => decode_dt("modification_date", s)?,
      None => return Err(corrupt("modification_date", "NULL")),
    };

    Ok(LentObject {
      id: self.id,
      description: self.description,
      category: self.category,
      date: decode_dt("date", &self.date)?,
      modification_date,
      person_name: self.person,
      person_key: self.person_key,
      returned: self.returned,
      calendar_event_uri: self
        .calendar_entry
        .as_deref()
        .map(|s| decode_uri("calendar_entry", s))
        .transpose()?,
    })
  }
}

// ─── Write values ────────────────────────────────────────────────────────────

fn text(s: String) -> Value { Value::Text(s) }

fn opt_text(s: Option<String>) -> Value { s.map_or(Value::Null, Value::Text) }

fn opt_int(n: Option<i32>) -> Value { n.map_or(Value::Null, |n| Value::Integer(n.into())) }

fn flag(b: bool) -> Value { Value::Integer(b.into()) }

/// Column/value pairs for an `INSERT`, with the modification time stamped.
pub fn insert_values(
  record: NewLentObject,
  now: DateTime<Utc>,
) -> Vec<(&'static str, Value)> {
  vec![
    ("description", text(record.description)),
    ("type", opt_int(record.category)),
    ("date", text(encode_dt(record.date))),
    ("modification_date", text(encode_dt(now))),
    ("person", text(record.person_name)),
    ("person_key", opt_text(record.person_key)),
    ("returned", flag(record.returned)),
    (
      "calendar_entry",
      opt_text(record.calendar_event_uri.as_ref().map(encode_uri)),
    ),
  ]
}

/// Column/value pairs for an `UPDATE`: only the patched columns, plus the
/// modification time which is always re-stamped.
pub fn update_values(
  patch: LentObjectPatch,
  now: DateTime<Utc>,
) -> Vec<(&'static str, Value)> {
  let mut values = Vec::new();
  if let Some(description) = patch.description {
    values.push(("description", text(description)));
  }
  if let Some(category) = patch.category {
    values.push(("type", opt_int(category)));
  }
  if let Some(date) = patch.date {
    values.push(("date", text(encode_dt(date))));
  }
  if let Some(person) = patch.person_name {
    values.push(("person", text(person)));
  }
  if let Some(person_key) = patch.person_key {
    values.push(("person_key", opt_text(person_key)));
  }
  if let Some(returned) = patch.returned {
    values.push(("returned", flag(returned)));
  }
  if let Some(uri) = patch.calendar_event_uri {
    values.push(("calendar_entry", opt_text(uri.as_ref().map(encode_uri))));
  }
  values.push(("modification_date", text(encode_dt(now))));
  values
}

#[cfg(test)]
mod tests {
  use chrono::TimeZone;

  use super::*;

  #[test]
  fn dates_use_the_canonical_layout() {
    let dt = Utc.with_ymd_and_hms(2020, 1, 1, 10, 0, 0).unwrap();
    assert_eq!(encode_dt(dt), "2020-01-01 10:00:00");
    assert_eq!(decode_dt("date", "2020-01-01 10:00:00").unwrap(), dt);
  }

  #[test]
  fn encoding_truncates_sub_seconds() {
    let dt = Utc.with_ymd_and_hms(2021, 6, 30, 23, 59, 59).unwrap()
      + chrono::Duration::milliseconds(750);
    assert_eq!(encode_dt(dt), "2021-06-30 23:59:59");
  }

  #[test]
  fn lexical_order_matches_chronological_order() {
    let earlier = Utc.with_ymd_and_hms(2019, 12, 31, 23, 0, 0).unwrap();
    let later = Utc.with_ymd_and_hms(2020, 2, 1, 8, 5, 0).unwrap();
    assert!(encode_dt(earlier) < encode_dt(later));
  }

  #[test]
  fn malformed_date_is_a_corrupt_record() {
    let err = decode_dt("date", "01/01/2020").unwrap_err();
    assert!(err.is_corrupt_record());
    match err {
      Error::CorruptRecord { column, value } => {
        assert_eq!(column, "date");
        assert_eq!(value, "01/01/2020");
      }
      other => panic!("unexpected error: {other}"),
    }
  }

  #[test]
  fn missing_modification_date_is_a_corrupt_record() {
    let raw = RawLentObject {
      id:                1,
      description:       "Drill".into(),
      category:          None,
      date:              "2020-01-01 10:00:00".into(),
      modification_date: None,
      person:            "Alice".into(),
      person_key:        None,
      returned:          false,
      calendar_entry:    None,
    };
    assert!(raw.into_lent_object().unwrap_err().is_corrupt_record());
  }

  #[test]
  fn update_values_always_stamp_modification_date() {
    let now = Utc.with_ymd_and_hms(2022, 3, 4, 5, 6, 7).unwrap();
    let values = update_values(LentObjectPatch::default(), now);
    assert_eq!(values.len(), 1);
    assert_eq!(values[0].0, "modification_date");
    assert_eq!(values[0].1, Value::Text("2022-03-04 05:06:07".into()));
  }

  #[test]
  fn cleared_fields_encode_as_null() {
    let now = Utc::now();
    let patch = LentObjectPatch::default()
      .person_key(None)
      .calendar_event_uri(None);
    let values = update_values(patch, now);
    assert!(values.contains(&("person_key", Value::Null)));
    assert!(values.contains(&("calendar_entry", Value::Null)));
  }
}
