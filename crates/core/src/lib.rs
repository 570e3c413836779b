//! Domain rules for the teamhub project marketplace.
//!
//! Everything in this crate is pure: status enums, the project and
//! application transition tables, the role-fill check, majority math, badge
//! identifiers and payload validation. The engine and the HTTP layer both
//! build on these.

pub mod application;
pub mod audit;
pub mod badges;
pub mod consensus;
pub mod error;
pub mod lifecycle;
pub mod notification;
pub mod role_fill;
pub mod status;
pub mod types;
pub mod validation;
