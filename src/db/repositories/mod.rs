pub mod library;
pub mod name_registry;
pub mod titles;
pub mod user;
