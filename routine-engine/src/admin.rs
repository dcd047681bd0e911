//! Editing of the persisted collections.
//!
//! Every operation takes a snapshot and returns a new one; callers write the
//! whole result back under its [`CollectionKey`](crate::model::CollectionKey).

use std::collections::{BTreeMap, HashSet};

use uuid::Uuid;

use crate::model::{Day, DayFilter, ScheduleEntry, SemesterOption, Subject, Teacher};

/// Designation given to faculty created without one.
pub const DEFAULT_DESIGNATION: &str = "Course Instructor";

const SUGGESTION_LIMIT: usize = 5;

pub trait Record: Clone {
  fn id(&self) -> &str;
}

impl Record for Teacher {
  fn id(&self) -> &str {
    &self.id
  }
}

impl Record for Subject {
  fn id(&self) -> &str {
    &self.id
  }
}

impl Record for ScheduleEntry {
  fn id(&self) -> &str {
    &self.id
  }
}

impl Record for SemesterOption {
  fn id(&self) -> &str {
    &self.id
  }
}

/// Replaces the record with the same id, or appends it.
pub fn upsert<T: Record>(collection: &[T], record: T) -> Vec<T> {
  let mut next = collection.to_vec();

  match next.iter_mut().find(|existing| existing.id() == record.id()) {
    Some(existing) => *existing = record,
    None => next.push(record),
  }

  next
}

pub fn remove<T: Record>(collection: &[T], id: &str) -> Vec<T> {
  collection
    .iter()
    .filter(|record| record.id() != id)
    .cloned()
    .collect()
}

pub fn remove_many<T: Record>(collection: &[T], ids: &HashSet<String>) -> Vec<T> {
  collection
    .iter()
    .filter(|record| !ids.contains(record.id()))
    .cloned()
    .collect()
}

/// Fresh id for a new record, e.g. `slot-3f2a...`.
pub fn mint_id(prefix: &str) -> String {
  format!("{prefix}-{}", Uuid::new_v4().simple())
}

/// Ids checked in an admin list for bulk deletion.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Selection(HashSet<String>);

impl Selection {
  pub fn toggle(&mut self, id: &str) {
    if !self.0.remove(id) {
      self.0.insert(id.to_string());
    }
  }

  pub fn contains(&self, id: &str) -> bool {
    self.0.contains(id)
  }

  pub fn len(&self) -> usize {
    self.0.len()
  }

  pub fn is_empty(&self) -> bool {
    self.0.is_empty()
  }

  pub fn clear(&mut self) {
    self.0.clear();
  }

  pub fn ids(&self) -> &HashSet<String> {
    &self.0
  }
}

/// Field name to message. Empty means the form may be submitted.
pub type FormErrors = BTreeMap<&'static str, &'static str>;

fn require(errors: &mut FormErrors, value: &str, field: &'static str, message: &'static str) {
  if value.trim().is_empty() {
    errors.insert(field, message);
  }
}

pub fn validate_entry(entry: &ScheduleEntry) -> FormErrors {
  let mut errors = FormErrors::new();
  require(&mut errors, &entry.teacher_id, "teacherId", "Selection required");
  require(&mut errors, &entry.subject_id, "subjectId", "Selection required");
  require(&mut errors, &entry.room, "room", "Room is required");
  errors
}

pub fn validate_teacher(teacher: &Teacher) -> FormErrors {
  let mut errors = FormErrors::new();
  require(&mut errors, &teacher.name, "name", "Name is required");
  require(&mut errors, &teacher.department, "department", "Department required");
  require(&mut errors, &teacher.email, "email", "Email is required");
  errors
}

pub fn validate_subject(subject: &Subject) -> FormErrors {
  let mut errors = FormErrors::new();
  require(&mut errors, &subject.title, "title", "Title is required");
  require(&mut errors, &subject.code, "code", "Code is required");
  require(&mut errors, &subject.department, "department", "Department required");
  errors
}

/// Prepares a faculty form for saving: new records get a fresh id and the
/// default designation.
pub fn submit_teacher(
  collection: &[Teacher],
  mut teacher: Teacher,
) -> Result<Vec<Teacher>, FormErrors> {
  let errors = validate_teacher(&teacher);
  if !errors.is_empty() {
    return Err(errors);
  }

  if teacher.id.is_empty() {
    teacher.id = mint_id("t");
  }
  if teacher.designation.is_empty() {
    teacher.designation = DEFAULT_DESIGNATION.to_string();
  }

  Ok(upsert(collection, teacher))
}

pub fn submit_subject(
  collection: &[Subject],
  mut subject: Subject,
) -> Result<Vec<Subject>, FormErrors> {
  let errors = validate_subject(&subject);
  if !errors.is_empty() {
    return Err(errors);
  }

  if subject.id.is_empty() {
    subject.id = mint_id("s");
  }

  Ok(upsert(collection, subject))
}

pub fn submit_entry(
  collection: &[ScheduleEntry],
  mut entry: ScheduleEntry,
) -> Result<Vec<ScheduleEntry>, FormErrors> {
  let errors = validate_entry(&entry);
  if !errors.is_empty() {
    return Err(errors);
  }

  if entry.id.is_empty() {
    entry.id = mint_id("slot");
  }

  Ok(upsert(collection, entry))
}

fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
  haystack.to_lowercase().contains(&needle.to_lowercase())
}

/// Admin routine list: day filter plus search on the day name or subject title.
pub fn filter_entries<'a>(
  schedule: &'a [ScheduleEntry],
  subjects: &[Subject],
  day: DayFilter,
  search: &str,
) -> Vec<&'a ScheduleEntry> {
  schedule
    .iter()
    .filter(|entry| day.matches(entry.day))
    .filter(|entry| {
      contains_ignore_case(entry.day.name(), search)
        || subjects
          .iter()
          .find(|subject| subject.id == entry.subject_id)
          .is_some_and(|subject| contains_ignore_case(&subject.title, search))
    })
    .collect()
}

/// Admin faculty list: department (`"All"` for any) plus name search.
pub fn filter_teachers<'a>(
  teachers: &'a [Teacher],
  department: &str,
  search: &str,
) -> Vec<&'a Teacher> {
  teachers
    .iter()
    .filter(|teacher| department == "All" || teacher.department == department)
    .filter(|teacher| contains_ignore_case(&teacher.name, search))
    .collect()
}

/// Admin subject list: program (`"All"` for any) plus title or code search.
pub fn filter_subjects<'a>(
  subjects: &'a [Subject],
  program: &str,
  search: &str,
) -> Vec<&'a Subject> {
  subjects
    .iter()
    .filter(|subject| program == "All" || subject.program == program)
    .filter(|subject| {
      contains_ignore_case(&subject.title, search) || contains_ignore_case(&subject.code, search)
    })
    .collect()
}

/// Keyword suggestions for the routine search box, offered once the query
/// has at least two characters.
pub fn suggestions(teachers: &[Teacher], subjects: &[Subject], query: &str) -> Vec<String> {
  if query.chars().count() <= 1 {
    return Vec::new();
  }

  let mut seen = HashSet::new();
  let options = std::iter::once("All")
    .chain(Day::ALL.iter().map(|day| day.name()))
    .chain(teachers.iter().map(|teacher| teacher.name.as_str()))
    .chain(
      subjects
        .iter()
        .flat_map(|subject| [subject.code.as_str(), subject.title.as_str()]),
    )
    .filter(|option| seen.insert(*option));

  options
    .filter(|option| contains_ignore_case(option, query))
    .take(SUGGESTION_LIMIT)
    .map(str::to_string)
    .collect()
}
