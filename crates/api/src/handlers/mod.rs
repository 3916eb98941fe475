//! HTTP handlers, grouped by resource.

pub mod collections;
pub mod documents;
pub mod modules;
pub mod releases;
pub mod versions;
