pub use super::library_entries::Entity as LibraryEntries;
pub use super::names::Entity as Names;
pub use super::title_names::Entity as TitleNames;
pub use super::titles::Entity as Titles;
pub use super::users::Entity as Users;
