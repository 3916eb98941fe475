//! Pure domain logic for the Appdock platform backend.
//!
//! No I/O lives here: persistence is in `appdock-db`, HTTP in `appdock-api`.

pub mod diff;
pub mod error;
pub mod schema;
pub mod types;
pub mod version;
