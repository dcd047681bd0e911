use std::fmt::Write;

use time::OffsetDateTime;

use routine_engine::model::{active_semester, Dataset};
use routine_engine::{format_minutes, minutes_of_day, resolve, weekday_name, ClassEntry, Filters};

const HEADERS: [&str; 7] = ["", "Time", "Code", "Course", "Faculty", "Room", "Credits"];

/// Renders the resolved routine as a plain text table.
pub fn render(dataset: &Dataset, now: OffsetDateTime, filters: &Filters) -> String {
  let resolution = resolve(
    &dataset.schedule,
    &dataset.teachers,
    &dataset.subjects,
    now,
    filters,
  );

  let mut out = String::new();

  if let Some(semester) = active_semester(&dataset.semesters) {
    writeln!(out, "{semester}").unwrap();
  }
  writeln!(
    out,
    "{} {} | day: {} | department: {}{}",
    weekday_name(now),
    format_minutes(minutes_of_day(now)),
    filters.day,
    filters.department,
    if filters.search.is_empty() {
      String::new()
    } else {
      format!(" | search: {:?}", filters.search)
    },
  )
  .unwrap();

  if resolution.entries.is_empty() {
    writeln!(out, "No classes.").unwrap();
  } else {
    out.push_str(&table(&resolution.entries));
  }

  if !resolution.dropped.is_empty() {
    writeln!(
      out,
      "{} slot(s) hidden, unknown faculty or course: {}",
      resolution.dropped.len(),
      resolution.dropped.join(", ")
    )
    .unwrap();
  }

  out
}

pub fn table(entries: &[ClassEntry<'_>]) -> String {
  let rows = entries
    .iter()
    .map(|class| {
      [
        if class.is_in_progress { "LIVE" } else { "" }.to_string(),
        format!("{} {} - {}", class.entry.day, class.entry.start_time, class.entry.end_time),
        class.code().to_string(),
        class.subject.title.clone(),
        class.teacher.name.clone(),
        class.entry.room.to_uppercase(),
        class.credit().to_string(),
      ]
    })
    .collect::<Vec<_>>();

  let mut widths = HEADERS.map(|header| header.chars().count());
  for row in &rows {
    for (width, cell) in widths.iter_mut().zip(row) {
      *width = (*width).max(cell.chars().count());
    }
  }

  let mut out = String::new();
  line(&mut out, &HEADERS.map(str::to_string), &widths);
  writeln!(
    out,
    "{}",
    widths
      .iter()
      .map(|width| "-".repeat(*width))
      .collect::<Vec<_>>()
      .join("-+-")
  )
  .unwrap();
  for row in &rows {
    line(&mut out, row, &widths);
  }

  out
}

fn line(out: &mut String, cells: &[String; 7], widths: &[usize; 7]) {
  let cells = cells
    .iter()
    .zip(widths.iter().copied())
    .map(|(cell, width)| format!("{cell:<width$}"))
    .collect::<Vec<_>>();

  writeln!(out, "{}", cells.join(" | ").trim_end()).unwrap();
}
