//! portfolio.project: one portfolio entry.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};

use crate::schema::portfolio_projects;

#[derive(Debug, Clone, PartialEq, Queryable, Selectable, Serialize)]
#[diesel(table_name = portfolio_projects)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Project {
    pub id: i32,
    pub title: String,
    pub description: Option<String>,
    pub github_link: Option<String>,
    pub project_link: Option<String>,
    pub doc_link: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Editable project columns. Updates replace all of them, so `None` writes NULL.
#[derive(Debug, Clone, Default, PartialEq, Insertable, AsChangeset)]
#[diesel(table_name = portfolio_projects)]
#[diesel(treat_none_as_null = true)]
pub struct ProjectFields {
    pub title: String,
    pub description: Option<String>,
    pub github_link: Option<String>,
    pub project_link: Option<String>,
    pub doc_link: Option<String>,
}

/// Project form as submitted by the admin pages.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProjectForm {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub github_link: String,
    #[serde(default)]
    pub project_link: String,
    #[serde(default)]
    pub doc_link: String,
}

impl From<ProjectForm> for ProjectFields {
    fn from(form: ProjectForm) -> Self {
        Self {
            title: form.title,
            description: Some(form.description),
            github_link: non_empty(form.github_link),
            project_link: non_empty(form.project_link),
            doc_link: non_empty(form.doc_link),
        }
    }
}

/// Blank links are stored as NULL, never as empty strings.
fn non_empty(value: String) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
