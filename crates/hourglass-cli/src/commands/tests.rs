//! Command output against temp-dir stores at a fixed instant.

use chrono::{DateTime, Local};
use hourglass_core::{ActivityStore, clock::FixedClock, edit::parse_date};
use hourglass_store_csv::CsvStore;
use hourglass_store_sqlite::SqliteStore;
use tempfile::TempDir;

use super::*;

fn at(s: &str) -> DateTime<Local> { parse_date(s).unwrap() }

fn args(values: &[&str]) -> Vec<String> {
  values.iter().map(|s| s.to_string()).collect()
}

struct Fixture<S> {
  // Held so the directory outlives the store.
  _dir:    TempDir,
  tracker: Tracker<S, FixedClock>,
}

impl<S: ActivityStore> Fixture<S> {
  fn at(self, now: &str) -> Self {
    Self {
      _dir:    self._dir,
      tracker: Tracker::new(self.tracker.store, FixedClock(at(now))),
    }
  }

  fn run(&self, command: Command) -> String { self.tracker.run(&command).unwrap() }
}

fn csv(now: &str) -> Fixture<CsvStore> {
  let dir = TempDir::new().unwrap();
  let store = CsvStore::open(dir.path().join("hourglass.csv")).unwrap();
  store.migrate().unwrap();
  Fixture { _dir: dir, tracker: Tracker::new(store, FixedClock(at(now))) }
}

fn sqlite(now: &str) -> Fixture<SqliteStore> {
  let dir = TempDir::new().unwrap();
  let store = SqliteStore::new(dir.path().join("hourglass.db"));
  store.migrate().unwrap();
  Fixture { _dir: dir, tracker: Tracker::new(store, FixedClock(at(now))) }
}

fn start(name: &str, project: Option<&str>, tags: &[&str]) -> Command {
  Command::Start {
    name:    name.into(),
    project: project.map(str::to_owned),
    tags:    args(tags),
  }
}

// ─── Writes ──────────────────────────────────────────────────────────────────

#[test]
fn start_then_stop() {
  let f = csv("2024-03-13 09:00");
  assert_eq!(f.run(start("foo", Some("bar"), &[])), "started activity 1");
  assert_eq!(f.run(start("baz", None, &["x"])), "started activity 2");

  let f = f.at("2024-03-13 10:00");
  assert_eq!(f.run(Command::Stop), "stopped activity 1\nstopped activity 2");
  assert_eq!(f.run(Command::Stop), "");

  let a = f.tracker.store.find_activity(1).unwrap();
  assert_eq!(a.end, Some(at("2024-03-13 10:00")));
}

#[test]
fn start_rejects_tags_with_commas() {
  let f = csv("2024-03-13 09:00");
  let err = f.tracker.run(&start("foo", None, &["a,b"])).unwrap_err();
  assert!(matches!(err, CommandError::Syntax(_)));
  assert!(f.tracker.store.find_all_activities().unwrap().is_empty());
}

#[test]
fn restart_copies_into_new_running_activity() {
  let f = sqlite("2024-03-13 09:00");
  f.run(start("foo", Some("bar"), &["x", "y"]));
  let f = f.at("2024-03-13 10:00");
  f.run(Command::Stop);

  let f = f.at("2024-03-13 11:00");
  assert_eq!(f.run(Command::Restart { id: 1 }), "restarted activity 1 (new id: 2)");

  let copy = f.tracker.store.find_activity(2).unwrap();
  assert_eq!((copy.name.as_str(), copy.project.as_str()), ("foo", "bar"));
  assert_eq!(copy.tags, vec!["x", "y"]);
  assert_eq!(copy.start, at("2024-03-13 11:00"));
  assert!(copy.is_running());
}

#[test]
fn edit_fields() {
  let f = csv("2024-03-13 09:00");
  f.run(start("foo", Some("bar"), &[]));

  let edit = |field: &str, values: &[&str]| Command::Edit {
    id:     1,
    field:  field.into(),
    values: args(values),
  };
  assert_eq!(f.run(edit("name", &["write", "report"])), "ok");
  assert_eq!(f.run(edit("project", &[])), "ok");
  assert_eq!(f.run(edit("tags", &["a", "b"])), "ok");
  assert_eq!(f.run(edit("end", &["2024-03-13", "09:45"])), "ok");

  let a = f.tracker.store.find_activity(1).unwrap();
  assert_eq!(a.name, "write report");
  assert_eq!(a.project, "");
  assert_eq!(a.tags, vec!["a", "b"]);
  assert_eq!(a.end, Some(at("2024-03-13 09:45")));
}

#[test]
fn edit_syntax_errors() {
  let f = csv("2024-03-13 09:00");
  f.run(start("foo", None, &[]));

  let cases: [(&str, &[&str]); 3] =
    [("colour", &["red"]), ("name", &[]), ("start", &["soon"])];
  for (field, values) in cases {
    let err = f
      .tracker
      .edit(1, field, &args(values))
      .unwrap_err();
    assert!(matches!(err, CommandError::Syntax(_)), "{field}: {err}");
  }
  assert_eq!(f.tracker.store.find_activity(1).unwrap().name, "foo");
}

#[test]
fn unknown_ids_are_store_errors() {
  let f = sqlite("2024-03-13 09:00");
  for command in [
    Command::Delete { id: 9 },
    Command::Restart { id: 9 },
    Command::Edit { id: 9, field: "name".into(), values: args(&["x"]) },
  ] {
    let err = f.tracker.run(&command).unwrap_err();
    assert!(matches!(err, CommandError::Store(_)), "{command:?}");
    assert!(err.to_string().contains('9'));
  }
}

#[test]
fn delete_reports_id() {
  let f = csv("2024-03-13 09:00");
  f.run(start("foo", None, &[]));
  assert_eq!(f.run(Command::Delete { id: 1 }), "deleted activity 1");
  assert!(f.tracker.store.find_all_activities().unwrap().is_empty());
}

// ─── Reports ─────────────────────────────────────────────────────────────────

#[test]
fn empty_reports() {
  let f = csv("2024-03-13 09:00");
  let list = |period| Command::List { period };
  assert_eq!(f.run(list(ListPeriod::Today)), "there have been no activities today");
  assert_eq!(f.run(list(ListPeriod::Week)), "there have been no activities this week");
  assert_eq!(f.run(list(ListPeriod::All)), "there aren't any activities");
  assert_eq!(
    f.run(Command::Status { scope: StatusScope::Today }),
    "there have been no activities today"
  );
}

#[test]
fn list_today_only_shows_today() {
  let f = sqlite("2024-03-12 09:00");
  f.run(start("yesterday", None, &[]));
  let f = f.at("2024-03-13 09:00");
  f.run(Command::Stop);
  f.run(start("foo", Some("bar"), &[]));

  let f = f.at("2024-03-13 09:30");
  assert_eq!(
    f.run(Command::List { period: ListPeriod::Today }),
    "\
| id | name | project | tags | state   | start | end | duration |
| 2  | foo  | bar     |      | running | 09:00 |     | 00h30m   |
bar: 00h30m"
  );
}

#[test]
fn list_week_groups_by_day() {
  // 2024-03-13 is a Wednesday; the week runs Sunday 10th to Saturday 16th.
  let f = csv("2024-03-09 12:00");
  f.run(start("last week", None, &[]));
  let f = f.at("2024-03-09 13:00");
  f.run(Command::Stop);

  let f = f.at("2024-03-11 09:00");
  f.run(start("foo", Some("bar"), &[]));
  let f = f.at("2024-03-11 10:00");
  f.run(Command::Stop);

  let f = f.at("2024-03-13 09:00");
  f.run(start("baz", None, &[]));
  let f = f.at("2024-03-13 09:30");

  assert_eq!(
    f.run(Command::List { period: ListPeriod::Week }),
    "\
=== Monday (2024-03-11) ===
| id | name | project | tags | state   | start | end   | duration |
| 2  | foo  | bar     |      | stopped | 09:00 | 10:00 | 01h00m   |
bar: 01h00m

=== Wednesday (2024-03-13) ===
| id | name | project | tags | state   | start | end | duration |
| 3  | baz  |         |      | running | 09:00 |     | 00h30m   |
unsorted: 00h30m"
  );
}

#[test]
fn list_all_has_dates_and_no_totals() {
  let f = csv("2024-03-12 09:00");
  f.run(start("foo", None, &[]));
  let f = f.at("2024-03-12 09:15");
  f.run(Command::Stop);

  assert_eq!(
    f.run(Command::List { period: ListPeriod::All }),
    "\
| date       | id | name | project | tags | state   | start | end   | duration |
| 2024-03-12 | 1  | foo  |         |      | stopped | 09:00 | 09:15 | 00h15m   |"
  );
}

#[test]
fn status_shows_durations_and_totals() {
  let f = sqlite("2024-03-13 09:00");
  f.run(start("foo", Some("bar"), &[]));
  let f = f.at("2024-03-13 10:00");
  f.run(Command::Stop);
  f.run(start("baz", None, &[]));

  let f = f.at("2024-03-13 10:30");
  assert_eq!(
    f.run(Command::Status { scope: StatusScope::Today }),
    "\
| id | name | project | tags | state   | duration |
| 1  | foo  | bar     |      | stopped | 01h00m   |
| 2  | baz  |         |      | running | 00h30m   |
bar: 01h00m, unsorted: 00h30m"
  );

  let all = f.run(Command::Status { scope: StatusScope::All });
  assert!(all.starts_with("| date       | id |"));
  assert!(all.ends_with("bar: 01h00m, unsorted: 00h30m"));
}

#[test]
fn both_backends_agree() {
  let c = csv("2024-03-13 09:00");
  let s = sqlite("2024-03-13 09:00");
  for cmd in [start("foo", Some("bar"), &["t"]), start("baz", None, &[])] {
    assert_eq!(c.run(cmd.clone()), s.run(cmd));
  }
  let (c, s) = (c.at("2024-03-13 09:40"), s.at("2024-03-13 09:40"));
  for cmd in [
    Command::Delete { id: 1 },
    Command::Stop,
    Command::List { period: ListPeriod::All },
  ] {
    assert_eq!(c.run(cmd.clone()), s.run(cmd));
  }
  assert_eq!(
    c.tracker.store.find_all_activities().unwrap(),
    s.tracker.store.find_all_activities().unwrap()
  );
}
