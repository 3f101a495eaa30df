pub mod prelude;

pub mod library_entries;
pub mod names;
pub mod title_names;
pub mod titles;
pub mod users;
