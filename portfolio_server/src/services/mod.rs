//! Portfolio services: persistence queries, auth, GitHub and rendering helpers.

pub mod auth_service;
pub mod github_service;
pub mod markdown;
pub mod profile_service;
pub mod project_service;
