//! Row structs for the `teamhub` schema.
//!
//! Each submodule holds a `FromRow` struct matching the table and, where the
//! engine consumes it, a conversion into the engine's record type.

pub mod application;
pub mod audit;
pub mod notification;
pub mod project;
pub mod role;
pub mod user;
