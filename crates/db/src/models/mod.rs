//! Row models and request DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` + `Serialize` entity struct matching the database row
//! - `Deserialize` DTOs for the request bodies that write to it

pub mod answer;
pub mod entry;
pub mod feedback;
pub mod question;
pub mod status;
