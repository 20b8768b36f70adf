//! Subcommands. Each one maps onto a single [`LoanStore`] operation.

use anyhow::{Result, bail};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use clap::{Args, Subcommand};
use url::Url;
use whohas_core::{
  LentObject, LentObjectPatch, LoanStore, NewLentObject, whole_seconds,
};

#[derive(Subcommand, Debug)]
pub enum Command {
  /// Record a new loan.
  Add(AddArgs),
  /// List loans, oldest first.
  List {
    /// Only items still out on loan.
    #[arg(long, conflicts_with = "returned")]
    active:   bool,
    /// Only items that came back.
    #[arg(long)]
    returned: bool,
    #[arg(long)]
    json:     bool,
  },
  /// Show a single loan.
  Show {
    id:   i64,
    #[arg(long)]
    json: bool,
  },
  /// Change fields of an existing loan.
  Edit(EditArgs),
  /// Mark a loan as returned.
  Return { id: i64 },
  /// Mark a returned item as lent out again.
  LendAgain { id: i64 },
  /// Delete a loan permanently.
  Delete { id: i64 },
  /// Delete every loan.
  Reset,
}

#[derive(Args, Debug)]
pub struct AddArgs {
  #[arg(short, long)]
  description:  String,
  /// Name of the borrower.
  #[arg(short, long)]
  person:       String,
  /// Borrower id in an external address book.
  #[arg(long)]
  person_key:   Option<String>,
  #[arg(long)]
  category:     Option<i32>,
  /// Loan date, `YYYY-MM-DD` or `YYYY-MM-DD HH:MM:SS` (UTC). Defaults to now.
  #[arg(long, value_parser = parse_date)]
  date:         Option<DateTime<Utc>>,
  /// URI of a calendar reminder.
  #[arg(long)]
  calendar_uri: Option<Url>,
}

#[derive(Args, Debug)]
pub struct EditArgs {
  id:                 i64,
  #[arg(short, long)]
  description:        Option<String>,
  #[arg(short, long)]
  person:             Option<String>,
  #[arg(long, conflicts_with = "clear_person_key")]
  person_key:         Option<String>,
  #[arg(long)]
  clear_person_key:   bool,
  #[arg(long, conflicts_with = "clear_category")]
  category:           Option<i32>,
  #[arg(long)]
  clear_category:     bool,
  #[arg(long, value_parser = parse_date)]
  date:               Option<DateTime<Utc>>,
  #[arg(long, conflicts_with = "clear_calendar_uri")]
  calendar_uri:       Option<Url>,
  #[arg(long)]
  clear_calendar_uri: bool,
}

impl EditArgs {
  fn into_patch(self) -> LentObjectPatch {
    let mut patch = LentObjectPatch::default();
    if let Some(description) = self.description {
      patch = patch.description(description);
    }
    if let Some(person) = self.person {
      patch = patch.person_name(person);
    }
    if let Some(date) = self.date {
      patch = patch.date(date);
    }
    if self.person_key.is_some() || self.clear_person_key {
      patch = patch.person_key(self.person_key);
    }
    if self.category.is_some() || self.clear_category {
      patch = patch.category(self.category);
    }
    if self.calendar_uri.is_some() || self.clear_calendar_uri {
      patch = patch.calendar_event_uri(self.calendar_uri);
    }
    patch
  }
}

fn parse_date(s: &str) -> Result<DateTime<Utc>, String> {
  if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S") {
    return Ok(dt.and_utc());
  }
  NaiveDate::parse_from_str(s, "%Y-%m-%d")
    .ok()
    .and_then(|d| d.and_hms_opt(0, 0, 0))
    .map(|dt| dt.and_utc())
    .ok_or_else(|| format!("expected YYYY-MM-DD or YYYY-MM-DD HH:MM:SS, got {s:?}"))
}

// ─── Execution ────────────────────────────────────────────────────────────────

pub async fn run<S: LoanStore>(store: &S, command: Command) -> Result<()> {
  match command {
    Command::Add(args) => {
      let record = NewLentObject {
        description:        args.description,
        category:           args.category,
        date:               whole_seconds(args.date.unwrap_or_else(Utc::now)),
        person_name:        args.person,
        person_key:         args.person_key,
        returned:           false,
        calendar_event_uri: args.calendar_uri,
      };
      let id = store.create(record).await?;
      println!("{id}");
    }
    Command::List { active, returned, json } => {
      let loans = if active {
        store.fetch_active().await?
      } else if returned {
        store.fetch_returned().await?
      } else {
        store.fetch_all().await?
      };
      if json {
        println!("{}", serde_json::to_string_pretty(&loans)?);
      } else {
        for loan in &loans {
          println!("{}", render(loan));
        }
      }
    }
    Command::Show { id, json } => {
      let Some(loan) = store.get(id).await? else {
        bail!("no loan with id {id}");
      };
      if json {
        println!("{}", serde_json::to_string_pretty(&loan)?);
      } else {
        println!("{}", render(&loan));
      }
    }
    Command::Edit(args) => {
      let id = args.id;
      ensure_found(id, store.update(id, args.into_patch()).await?)?;
    }
    Command::Return { id } => ensure_found(id, store.mark_returned(id).await?)?,
    Command::LendAgain { id } => {
      ensure_found(id, store.mark_lent_again(id).await?)?
    }
    Command::Delete { id } => ensure_found(id, store.delete(id).await?)?,
    Command::Reset => {
      store.clear().await?;
      tracing::info!("all loans deleted");
    }
  }
  Ok(())
}

fn ensure_found(id: i64, found: bool) -> Result<()> {
  if !found {
    bail!("no loan with id {id}");
  }
  Ok(())
}

fn render(loan: &LentObject) -> String {
  let status = if loan.returned { "returned" } else { "lent" };
  format!(
    "{:>4}  {}  {:<8}  {} -> {}",
    loan.id,
    loan.date.format("%Y-%m-%d"),
    status,
    loan.description,
    loan.person_name,
  )
}

/// Example loans offered to first-time users.
pub async fn seed_examples<S: LoanStore>(store: &S) -> Result<()> {
  let now = Utc::now();
  let examples = [
    ("The Hitchhiker's Guide to the Galaxy", "Arthur", 30),
    ("Cordless drill", "Ford", 7),
  ];
  for (description, person, days_ago) in examples {
    let date = now - chrono::Duration::days(days_ago);
    store
      .create(NewLentObject::new(description, person, date))
      .await?;
  }
  tracing::info!(count = examples.len(), "seeded example loans");
  Ok(())
}

#[cfg(test)]
mod tests {
  use chrono::TimeZone;

  use super::*;

  #[test]
  fn parses_both_date_layouts() {
    assert_eq!(
      parse_date("2020-01-01 10:00:00").unwrap(),
      Utc.with_ymd_and_hms(2020, 1, 1, 10, 0, 0).unwrap()
    );
    assert_eq!(
      parse_date("2020-01-01").unwrap(),
      Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap()
    );
    assert!(parse_date("01.01.2020").is_err());
  }

  #[test]
  fn edit_args_only_patch_given_fields() {
    let args = EditArgs {
      id:                 1,
      description:        Some("X".into()),
      person:             None,
      person_key:         None,
      clear_person_key:   true,
      category:           None,
      clear_category:     false,
      date:               None,
      calendar_uri:       None,
      clear_calendar_uri: false,
    };
    let patch = args.into_patch();
    assert_eq!(patch.description.as_deref(), Some("X"));
    assert_eq!(patch.person_key, Some(None));
    assert_eq!(patch.category, None);
    assert_eq!(patch.calendar_event_uri, None);
  }

  #[tokio::test]
  async fn seeding_adds_active_examples() {
    let store = whohas_store_sqlite::SqliteStore::open_in_memory()
      .await
      .unwrap();
    seed_examples(&store).await.unwrap();

    let active = store.fetch_active().await.unwrap();
    assert_eq!(active.len(), 2);
    assert_eq!(active[0].description, "The Hitchhiker's Guide to the Galaxy");
  }

  #[tokio::test]
  async fn missing_id_is_reported() {
    let store = whohas_store_sqlite::SqliteStore::open_in_memory()
      .await
      .unwrap();

    let err = run(&store, Command::Return { id: 42 }).await.unwrap_err();
    assert_eq!(err.to_string(), "no loan with id 42");
  }

  #[tokio::test]
  async fn add_then_return_round_trip() {
    let store = whohas_store_sqlite::SqliteStore::open_in_memory()
      .await
      .unwrap();

    let add = AddArgs {
      description:  "Drill".into(),
      person:       "Alice".into(),
      person_key:   None,
      category:     Some(2),
      date:         Some(parse_date("2020-01-01 10:00:00").unwrap()),
      calendar_uri: None,
    };
    run(&store, Command::Add(add)).await.unwrap();
    run(&store, Command::Return { id: 1 }).await.unwrap();

    let returned = store.fetch_returned().await.unwrap();
    assert_eq!(returned.len(), 1);
    assert_eq!(returned[0].category, Some(2));
  }
}
