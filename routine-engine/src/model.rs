use std::fmt::{Display, Formatter};
use std::str::FromStr;

use anyhow::anyhow;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{json, Value};
use time::Weekday;
use tracing::warn;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Day {
  Saturday,
  Sunday,
  Monday,
  Tuesday,
  Wednesday,
  Thursday,
  Friday,
}

impl Day {
  /// Display order of the day selector, starting at Saturday.
  pub const ALL: [Day; 7] = [
    Day::Saturday,
    Day::Sunday,
    Day::Monday,
    Day::Tuesday,
    Day::Wednesday,
    Day::Thursday,
    Day::Friday,
  ];

  pub fn name(self) -> &'static str {
    match self {
      Day::Saturday => "Saturday",
      Day::Sunday => "Sunday",
      Day::Monday => "Monday",
      Day::Tuesday => "Tuesday",
      Day::Wednesday => "Wednesday",
      Day::Thursday => "Thursday",
      Day::Friday => "Friday",
    }
  }
}

impl From<Weekday> for Day {
  fn from(weekday: Weekday) -> Self {
    match weekday {
      Weekday::Sunday => Day::Sunday,
      Weekday::Monday => Day::Monday,
      Weekday::Tuesday => Day::Tuesday,
      Weekday::Wednesday => Day::Wednesday,
      Weekday::Thursday => Day::Thursday,
      Weekday::Friday => Day::Friday,
      Weekday::Saturday => Day::Saturday,
    }
  }
}

impl Display for Day {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    f.write_str(self.name())
  }
}

impl FromStr for Day {
  type Err = anyhow::Error;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    Day::ALL
      .into_iter()
      .find(|day| day.name().eq_ignore_ascii_case(s.trim()))
      .ok_or_else(|| anyhow!("unknown day {s:?}"))
  }
}

/// Day selection of the routine view. `All` never appears on an entry.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DayFilter {
  #[default]
  All,
  Day(Day),
}

impl DayFilter {
  pub fn matches(self, day: Day) -> bool {
    match self {
      DayFilter::All => true,
      DayFilter::Day(selected) => selected == day,
    }
  }
}

impl FromStr for DayFilter {
  type Err = anyhow::Error;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    if s.trim().eq_ignore_ascii_case("all") {
      return Ok(DayFilter::All);
    }

    Ok(DayFilter::Day(s.parse()?))
  }
}

impl Display for DayFilter {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    match self {
      DayFilter::All => f.write_str("All"),
      DayFilter::Day(day) => day.fmt(f),
    }
  }
}

/// Unknown categories read as `General`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Category {
  Business,
  #[serde(rename = "CSE")]
  Cse,
  #[serde(rename = "EEE")]
  Eee,
  Law,
  English,
  Chemistry,
  Islamic,
  Soil,
  Civil,
  PublicHealth,
  Textile,
  Architecture,
  #[default]
  #[serde(other)]
  General,
}

impl Category {
  pub fn icon(self) -> &'static str {
    match self {
      Category::Cse => "code",
      Category::Law => "gavel",
      Category::Business => "trending-up",
      Category::English => "book-open",
      Category::Chemistry => "flask",
      Category::Eee => "zap",
      Category::Civil => "hard-hat",
      Category::PublicHealth => "stethoscope",
      Category::Soil => "leaf",
      _ => "graduation-cap",
    }
  }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClassStatus {
  Scheduled,
  Rescheduled,
  Postponed,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Teacher {
  pub id: String,
  pub name: String,
  #[serde(default)]
  pub designation: String,
  #[serde(default)]
  pub email: String,
  /// Matched against department names, not ids.
  #[serde(default)]
  pub department: String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub whatsapp: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub dept_whatsapp: Option<String>,
  /// Base64 encoded picture.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub photo: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub avatar_id: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subject {
  pub id: String,
  pub title: String,
  pub code: String,
  #[serde(default)]
  pub department: String,
  #[serde(default)]
  pub program: String,
  #[serde(default)]
  pub credit: String,
  #[serde(default)]
  pub category: Category,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub whatsapp: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleEntry {
  pub id: String,
  pub day: Day,
  pub start_time: String,
  pub end_time: String,
  pub teacher_id: String,
  pub subject_id: String,
  pub room: String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub section: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub subject_code_override: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub credit_override: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub status: Option<ClassStatus>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub rescheduled_note: Option<String>,
}

impl ScheduleEntry {
  pub fn is_postponed(&self) -> bool {
    self.status == Some(ClassStatus::Postponed)
  }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SemesterOption {
  pub id: String,
  pub label: String,
  #[serde(default)]
  pub is_active: bool,
}

/// Label of the first active semester.
pub fn active_semester(semesters: &[SemesterOption]) -> Option<&str> {
  semesters
    .iter()
    .find(|semester| semester.is_active)
    .map(|semester| semester.label.as_str())
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Department {
  pub id: String,
  pub name: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Program {
  pub id: String,
  pub title: String,
  pub department_id: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Holiday {
  pub id: String,
  pub title: String,
  pub date: String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub description: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub image_url: Option<String>,
}

/// Everything `GET /api/data` hands out. Records that do not parse are
/// skipped so one bad write cannot hide the rest of a collection.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dataset {
  #[serde(default, deserialize_with = "lenient")]
  pub teachers: Vec<Teacher>,
  #[serde(default, deserialize_with = "lenient")]
  pub subjects: Vec<Subject>,
  #[serde(default, deserialize_with = "lenient")]
  pub schedule: Vec<ScheduleEntry>,
  #[serde(default, deserialize_with = "lenient")]
  pub semesters: Vec<SemesterOption>,
  #[serde(default)]
  pub last_updated: i64,
}

impl Dataset {
  /// Compares the collections, ignoring `last_updated`.
  pub fn same_collections(&self, other: &Dataset) -> bool {
    self.teachers == other.teachers
      && self.subjects == other.subjects
      && self.schedule == other.schedule
      && self.semesters == other.semesters
  }
}

fn lenient<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
  D: Deserializer<'de>,
  T: DeserializeOwned,
{
  let records = match Value::deserialize(deserializer)? {
    Value::Array(records) => records,
    Value::Null => return Ok(Vec::new()),
    other => {
      warn!("Ignoring collection that is not a list: {}", other);
      return Ok(Vec::new());
    }
  };

  let parsed = records
    .into_iter()
    .filter_map(|record| match serde_json::from_value(record) {
      Ok(record) => Some(record),
      Err(err) => {
        warn!("Skipping malformed record: {}", err);
        None
      }
    })
    .collect();

  Ok(parsed)
}

/// Name of a persisted collection in the key-value store.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum CollectionKey {
  Teachers,
  Subjects,
  Schedule,
  Semesters,
}

impl CollectionKey {
  pub const ALL: [CollectionKey; 4] = [
    CollectionKey::Teachers,
    CollectionKey::Subjects,
    CollectionKey::Schedule,
    CollectionKey::Semesters,
  ];

  pub fn as_str(self) -> &'static str {
    match self {
      CollectionKey::Teachers => "TEACHERS",
      CollectionKey::Subjects => "SUBJECTS",
      CollectionKey::Schedule => "SCHEDULE",
      CollectionKey::Semesters => "SEMESTERS",
    }
  }

  /// Payload served for a key that was never written.
  pub fn fallback(self) -> Value {
    match self {
      CollectionKey::Semesters => json!([{
        "id": "sem_default",
        "label": "🌱 SPRING SEMESTER 2026 🌸",
        "isActive": true,
      }]),
      _ => json!([]),
    }
  }
}

impl Display for CollectionKey {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    f.write_str(self.as_str())
  }
}

impl FromStr for CollectionKey {
  type Err = anyhow::Error;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    CollectionKey::ALL
      .into_iter()
      .find(|key| key.as_str() == s)
      .ok_or_else(|| anyhow!("invalid collection key {s:?}"))
  }
}
