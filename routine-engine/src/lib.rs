pub use clock::{
  format_minutes, local_offset, minutes_of_day, now, parse_minutes, weekday_name,
};
pub use resolve::{resolve, ClassEntry, Filters, Resolution, ALL_DEPARTMENTS};

pub mod admin;
mod clock;
pub mod model;
mod resolve;
pub mod seed;
