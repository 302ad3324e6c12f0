//! Portfolio data models.

pub mod profile;
pub mod project;
