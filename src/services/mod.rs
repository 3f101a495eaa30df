pub mod auth_service;
pub mod auth_service_impl;
pub use auth_service::{AuthError, AuthService, LoginResult, UserInfo};
pub use auth_service_impl::SeaOrmAuthService;

pub mod catalog_service;
pub mod catalog_service_impl;
pub use catalog_service::{CatalogError, CatalogService, ResolvedName, TitleNames};
pub use catalog_service_impl::SeaOrmCatalogService;

pub mod library_service;
pub mod library_service_impl;
pub use library_service::{LibraryError, LibraryService};
pub use library_service_impl::SeaOrmLibraryService;
