use std::cmp::Ordering;
use std::collections::HashMap;

use time::OffsetDateTime;
use tracing::debug;

use crate::clock::{minutes_of_day, parse_minutes, weekday_name};
use crate::model::{DayFilter, ScheduleEntry, Subject, Teacher};

/// Department filter value that disables the filter.
pub const ALL_DEPARTMENTS: &str = "All";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Filters {
  pub day: DayFilter,
  pub department: String,
  pub search: String,
}

impl Default for Filters {
  fn default() -> Self {
    Self {
      day: DayFilter::All,
      department: ALL_DEPARTMENTS.to_string(),
      search: String::new(),
    }
  }
}

/// A schedule entry joined to its teacher and subject.
#[derive(Clone, Debug, PartialEq)]
pub struct ClassEntry<'a> {
  pub entry: &'a ScheduleEntry,
  pub teacher: &'a Teacher,
  pub subject: &'a Subject,
  pub is_in_progress: bool,
}

impl<'a> ClassEntry<'a> {
  pub fn id(&self) -> &'a str {
    &self.entry.id
  }

  pub fn code(&self) -> &'a str {
    match self.entry.subject_code_override.as_deref() {
      Some(code) if !code.is_empty() => code,
      _ => &self.subject.code,
    }
  }

  pub fn credit(&self) -> &'a str {
    match self.entry.credit_override.as_deref() {
      Some(credit) if !credit.is_empty() => credit,
      _ => &self.subject.credit,
    }
  }

  fn matches(&self, filters: &Filters, needle: &str) -> bool {
    if !filters.day.matches(self.entry.day) {
      return false;
    }

    if filters.department != ALL_DEPARTMENTS && self.subject.department != filters.department {
      return false;
    }

    needle.is_empty()
      || self.subject.title.to_lowercase().contains(needle)
      || self.teacher.name.to_lowercase().contains(needle)
      || self.subject.code.to_lowercase().contains(needle)
  }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Resolution<'a> {
  /// In-progress classes first, then ascending by start time.
  pub entries: Vec<ClassEntry<'a>>,
  /// Ids of entries whose teacher or subject does not exist.
  pub dropped: Vec<&'a str>,
}

pub fn resolve<'a>(
  schedule: &'a [ScheduleEntry],
  teachers: &'a [Teacher],
  subjects: &'a [Subject],
  now: OffsetDateTime,
  filters: &Filters,
) -> Resolution<'a> {
  let mut teacher_index = HashMap::with_capacity(teachers.len());
  for teacher in teachers {
    teacher_index.entry(teacher.id.as_str()).or_insert(teacher);
  }
  let mut subject_index = HashMap::with_capacity(subjects.len());
  for subject in subjects {
    subject_index.entry(subject.id.as_str()).or_insert(subject);
  }

  let today = weekday_name(now);
  let current = minutes_of_day(now);
  let needle = filters.search.to_lowercase();

  let mut dropped = Vec::new();

  let mut entries = schedule
    .iter()
    .filter_map(|entry| {
      let (Some(teacher), Some(subject)) = (
        teacher_index.get(entry.teacher_id.as_str()).copied(),
        subject_index.get(entry.subject_id.as_str()).copied(),
      ) else {
        debug!(
          "Dropping schedule entry {} with unknown teacher {:?} or subject {:?}",
          entry.id, entry.teacher_id, entry.subject_id
        );
        dropped.push(entry.id.as_str());
        return None;
      };

      let is_in_progress = entry.day == today
        && !entry.is_postponed()
        && matches!(
          (parse_minutes(&entry.start_time), parse_minutes(&entry.end_time)),
          (Some(start), Some(end)) if start <= current && current < end
        );

      Some(ClassEntry {
        entry,
        teacher,
        subject,
        is_in_progress,
      })
    })
    .filter(|class| class.matches(filters, &needle))
    .collect::<Vec<_>>();

  // stable, so equal keys keep their schedule order
  entries.sort_by(|a, b| {
    b.is_in_progress
      .cmp(&a.is_in_progress)
      .then_with(|| compare_start(&a.entry.start_time, &b.entry.start_time))
  });

  Resolution { entries, dropped }
}

/// Unparseable start times go after every parseable one.
fn compare_start(a: &str, b: &str) -> Ordering {
  match (parse_minutes(a), parse_minutes(b)) {
    (Some(a), Some(b)) => a.cmp(&b),
    (Some(_), None) => Ordering::Less,
    (None, Some(_)) => Ordering::Greater,
    (None, None) => Ordering::Equal,
  }
}
