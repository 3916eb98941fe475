//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async CRUD methods
//! that accept `&PgPool` (or, for transaction-scoped steps, a
//! `&mut PgConnection`) as the first argument.

pub mod app_module_repo;
pub mod collection_repo;
pub mod document_repo;
pub mod release_repo;
pub mod resource_version_repo;

pub use app_module_repo::AppModuleRepo;
pub use collection_repo::CollectionRepo;
pub use document_repo::DocumentRepo;
pub use release_repo::ReleaseRepo;
pub use resource_version_repo::ResourceVersionRepo;
