//! Admin panel handlers. Every route here sits behind [`super::auth::require_admin`].

use axum::extract::rejection::JsonRejection;
use axum::extract::{Multipart, Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::{Form, Json};
use serde::{Deserialize, Serialize};
use tera::Context;

use super::{redirect, render_page, store_failure, AppState};
use crate::error::AppError;
use crate::models::profile::ProfileFields;
use crate::models::project::{ProjectFields, ProjectForm};
use crate::session::{FlashLevel, Session};
use crate::store::StoreError;

/// Multipart part carrying a new avatar image.
const AVATAR_FIELD: &str = "avatar_file";

const README_NOT_FOUND: &str =
    "README not found. Check the URL and that the repository is public.";

pub async fn dashboard(
    State(state): State<AppState>,
    session: Session,
) -> Result<Response, AppError> {
    let profile = state
        .store
        .get_profile()
        .await
        .map_err(|e| store_failure("get_profile", e))?;
    let projects = state
        .store
        .list_projects()
        .await
        .map_err(|e| store_failure("list_projects", e))?;

    let mut context = Context::new();
    context.insert("profile", &profile);
    context.insert("projects", &projects);
    render_page(&state, session, StatusCode::OK, "admin.html", context)
}

pub async fn update_profile(
    State(state): State<AppState>,
    mut session: Session,
    mut multipart: Multipart,
) -> Result<Response, AppError> {
    let mut fields = ProfileFields::default();
    let mut avatar = None;

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or_default().to_string();
        if name == AVATAR_FIELD {
            let bytes = field.bytes().await?;
            if !bytes.is_empty() {
                avatar = Some(bytes.to_vec());
            }
        } else {
            let value = field.text().await?;
            if !fields.set(&name, value) {
                tracing::debug!(field = %name, "Ignoring unknown profile field");
            }
        }
    }

    match state.store.save_profile(fields, avatar).await {
        Ok(_) => session.flash(FlashLevel::Success, "Profile updated!"),
        Err(e) => {
            store_failure("save_profile", e);
            session.flash(FlashLevel::Error, "Could not save the profile.");
        }
    }
    Ok(redirect(&state, &session, "/admin"))
}

pub async fn add_project(
    State(state): State<AppState>,
    mut session: Session,
    Form(form): Form<ProjectForm>,
) -> Response {
    match state.store.add_project(ProjectFields::from(form)).await {
        Ok(_) => session.flash(FlashLevel::Success, "Project added!"),
        Err(StoreError::Invalid(reason)) => {
            tracing::warn!("Project rejected: {reason}");
            session.flash(FlashLevel::Error, "A project needs a title.");
        }
        Err(e) => {
            store_failure("add_project", e);
            session.flash(FlashLevel::Error, "Could not add the project.");
        }
    }
    redirect(&state, &session, "/admin")
}

pub async fn edit_project_form(
    State(state): State<AppState>,
    mut session: Session,
    Path(id): Path<i32>,
) -> Result<Response, AppError> {
    let project = state
        .store
        .get_project(id)
        .await
        .map_err(|e| store_failure("get_project", e))?;

    match project {
        Some(project) => {
            let mut context = Context::new();
            context.insert("project", &project);
            render_page(&state, session, StatusCode::OK, "edit_project.html", context)
        }
        None => {
            session.flash(FlashLevel::Error, "Project not found.");
            Ok(redirect(&state, &session, "/admin"))
        }
    }
}

pub async fn edit_project(
    State(state): State<AppState>,
    mut session: Session,
    Path(id): Path<i32>,
    Form(form): Form<ProjectForm>,
) -> Response {
    match state.store.update_project(id, ProjectFields::from(form)).await {
        Ok(Some(_)) => {
            session.flash(FlashLevel::Success, "Project updated!");
            redirect(&state, &session, "/admin")
        }
        Ok(None) => {
            session.flash(FlashLevel::Error, "Project not found.");
            redirect(&state, &session, "/admin")
        }
        Err(e) => {
            let message = match e {
                StoreError::Invalid(_) => "A project needs a title.",
                _ => "Could not update the project.",
            };
            store_failure("update_project", e);
            session.flash(FlashLevel::Error, message);
            redirect(&state, &session, &format!("/admin/project/edit/{id}"))
        }
    }
}

pub async fn delete_project(
    State(state): State<AppState>,
    mut session: Session,
    Path(id): Path<i32>,
) -> Response {
    match state.store.delete_project(id).await {
        Ok(true) => session.flash(FlashLevel::Success, "Project deleted."),
        Ok(false) => {
            tracing::info!(project_id = id, "Delete of unknown project");
            session.flash(FlashLevel::Info, "Project was already deleted.");
        }
        Err(e) => {
            store_failure("delete_project", e);
            session.flash(FlashLevel::Error, "Could not delete the project.");
        }
    }
    redirect(&state, &session, "/admin")
}

#[derive(Debug, Deserialize)]
pub struct FetchReadmeRequest {
    #[serde(rename = "githubUrl")]
    pub github_url: String,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum FetchReadmeResponse {
    Content { content: String },
    Error { error: &'static str },
}

/// Import a repository README for the project description editor.
pub async fn fetch_readme(
    State(state): State<AppState>,
    payload: Result<Json<FetchReadmeRequest>, JsonRejection>,
) -> Response {
    let req = match payload {
        Ok(Json(req)) => req,
        Err(rejection) => {
            crate::metrics::readme_fetch("bad_request");
            tracing::warn!("README request rejected: {rejection}");
            return readme_not_found();
        }
    };

    match state.github.fetch_readme(&req.github_url).await {
        Ok(content) => {
            crate::metrics::readme_fetch("ok");
            Json(FetchReadmeResponse::Content { content }).into_response()
        }
        Err(e) => {
            crate::metrics::readme_fetch(e.outcome());
            tracing::warn!(url = %req.github_url, "README fetch failed: {e}");
            readme_not_found()
        }
    }
}

fn readme_not_found() -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(FetchReadmeResponse::Error {
            error: README_NOT_FOUND,
        }),
    )
        .into_response()
}
