//! Domain rules for formdesk.
//!
//! Everything here is pure logic with no database or HTTP dependencies, so
//! the repository layer, the API handlers and tests can share it.

pub mod display;
pub mod entry;
pub mod error;
pub mod histogram;
pub mod pagination;
pub mod question;
pub mod submission;
pub mod types;
pub mod validation;
