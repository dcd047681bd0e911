use once_cell::sync::Lazy;

use crate::model::Category::{Cse, Islamic, Law};
use crate::model::Day::{Monday, Saturday, Tuesday};
use crate::model::{
  Category, Day, Department, Holiday, Program, ScheduleEntry, Subject, Teacher,
};

pub static DEPARTMENTS: Lazy<Vec<Department>> = Lazy::new(|| {
  [("d1", "CSE"), ("d2", "Law"), ("d3", "EEE"), ("d4", "Business"), ("d5", "Islamic")]
    .into_iter()
    .map(|(id, name)| Department {
      id: id.to_string(),
      name: name.to_string(),
    })
    .collect()
});

pub static PROGRAMS: Lazy<Vec<Program>> = Lazy::new(|| {
  [
    ("p1", "B.Sc. in CSE", "d1"),
    ("p2", "M.Sc. in CSE", "d1"),
    ("p3", "LL.B (Honours)", "d2"),
    ("p4", "LL.M (Masters)", "d2"),
    ("p5", "B.Sc. in EEE", "d3"),
    ("p6", "BBA", "d4"),
    ("p7", "M.A in Islamic Studies", "d5"),
  ]
  .into_iter()
  .map(|(id, title, department_id)| Program {
    id: id.to_string(),
    title: title.to_string(),
    department_id: department_id.to_string(),
  })
  .collect()
});

pub static HOLIDAYS: Lazy<Vec<Holiday>> = Lazy::new(|| {
  vec![
    Holiday {
      id: "h1".to_string(),
      title: "Language Martyrs Day".to_string(),
      date: "21 Feb 2026".to_string(),
      description: Some(
        "International Mother Language Day to honor the martyrs of the Language Movement."
          .to_string(),
      ),
      image_url: None,
    },
    Holiday {
      id: "h2".to_string(),
      title: "Independence Day".to_string(),
      date: "26 Mar 2026".to_string(),
      description: Some(
        "National holiday in Bangladesh commemorating the country's declaration of independence."
          .to_string(),
      ),
      image_url: None,
    },
  ]
});

pub static TEACHERS: Lazy<Vec<Teacher>> = Lazy::new(|| {
  vec![
    teacher(
      "t1",
      "Ms. Anika Tasnim Islam",
      "Lecturer",
      "anika.islam@fiu.edu.bd",
      "CSE",
      "avatar-3",
    ),
    teacher(
      "t2",
      "Prof. Md. Abdul Kuddus Miah",
      "Professor",
      "kuddus.miah@fiu.edu.bd",
      "Law",
      "avatar-8",
    ),
    teacher(
      "t3",
      "Dr. Muhammad Abdur Rahim",
      "Associate Professor",
      "m.rahim@fiu.edu.bd",
      "Islamic",
      "avatar-12",
    ),
  ]
});

pub static SUBJECTS: Lazy<Vec<Subject>> = Lazy::new(|| {
  vec![
    subject(
      "s1",
      "Artificial Intelligence -(AI Lab)",
      "CSE 3115",
      "CSE",
      "B.Sc. in CSE",
      "1.5",
      Cse,
    ),
    subject(
      "s2",
      "Constitutional Law of Bangladesh",
      "LAW 1206",
      "Law",
      "LL.B (Honours)",
      "3.0",
      Law,
    ),
    subject(
      "s3",
      "Test Verification Class",
      "TEST 101",
      "CSE",
      "B.Sc. in CSE",
      "1.0",
      Cse,
    ),
    subject(
      "s4",
      "Advanced Quranic Sciences & Tafsir",
      "ISL 501",
      "Islamic",
      "M.A in Islamic Studies",
      "3.0",
      Islamic,
    ),
  ]
});

pub static SCHEDULE: Lazy<Vec<ScheduleEntry>> = Lazy::new(|| {
  vec![
    slot("1", Saturday, "08:30 am", "10:00 am", "t1", "s1", "Computer Lab (AI)"),
    slot("2", Saturday, "08:30 am", "10:00 am", "t2", "s2", "203"),
    slot("tuesday-demo", Tuesday, "12:20 am", "12:30 am", "t1", "s3", "Demo Room 101"),
    slot("islamic-demo", Monday, "10:00 am", "11:30 am", "t3", "s4", "305 (Islamic Wing)"),
  ]
});

fn teacher(
  id: &str,
  name: &str,
  designation: &str,
  email: &str,
  department: &str,
  avatar_id: &str,
) -> Teacher {
  Teacher {
    id: id.to_string(),
    name: name.to_string(),
    designation: designation.to_string(),
    email: email.to_string(),
    department: department.to_string(),
    avatar_id: Some(avatar_id.to_string()),
    ..Teacher::default()
  }
}

fn subject(
  id: &str,
  title: &str,
  code: &str,
  department: &str,
  program: &str,
  credit: &str,
  category: Category,
) -> Subject {
  Subject {
    id: id.to_string(),
    title: title.to_string(),
    code: code.to_string(),
    department: department.to_string(),
    program: program.to_string(),
    credit: credit.to_string(),
    category,
    whatsapp: None,
  }
}

/// Builds a plain scheduled entry.
pub fn slot(
  id: &str,
  day: Day,
  start_time: &str,
  end_time: &str,
  teacher_id: &str,
  subject_id: &str,
  room: &str,
) -> ScheduleEntry {
  ScheduleEntry {
    id: id.to_string(),
    day,
    start_time: start_time.to_string(),
    end_time: end_time.to_string(),
    teacher_id: teacher_id.to_string(),
    subject_id: subject_id.to_string(),
    room: room.to_string(),
    section: None,
    subject_code_override: None,
    credit_override: None,
    status: None,
    rescheduled_note: None,
  }
}
