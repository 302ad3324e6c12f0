//! Public pages and the avatar responder.

use axum::extract::{Path, State};
use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Redirect, Response};
use tera::Context;

use super::{render_page, store_failure, AppState};
use crate::error::AppError;
use crate::session::Session;
use crate::store::{PortfolioStore, StoreError};

const AVATAR_CACHE_CONTROL: &str = "public, max-age=86400";
const DEFAULT_AVATAR_MIME: &str = "image/jpeg";

pub async fn index(
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
    render_page(&state, session, StatusCode::OK, "index.html", context)
}

pub async fn project_detail(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<i32>,
) -> Result<Response, AppError> {
    let project = state
        .store
        .get_project(id)
        .await
        .map_err(|e| store_failure("get_project", e))?;
    let Some(project) = project else {
        tracing::debug!(project_id = id, "Unknown project requested");
        return Ok(Redirect::to("/").into_response());
    };
    let profile = state
        .store
        .get_profile()
        .await
        .map_err(|e| store_failure("get_profile", e))?;

    let mut context = Context::new();
    context.insert("profile", &profile);
    context.insert("project", &project);
    render_page(&state, session, StatusCode::OK, "project.html", context)
}

/// Outcome of reading the avatar blob.
#[derive(Debug)]
pub enum AvatarLookup {
    Present(Vec<u8>),
    Absent,
    Failed(StoreError),
}

pub async fn lookup_avatar(store: &dyn PortfolioStore) -> AvatarLookup {
    match store.get_profile_image().await {
        Ok(Some(bytes)) if !bytes.is_empty() => AvatarLookup::Present(bytes),
        Ok(_) => AvatarLookup::Absent,
        Err(e) => AvatarLookup::Failed(e),
    }
}

/// Serve the stored avatar, or redirect to a static fallback. Never errors.
pub async fn profile_image(State(state): State<AppState>) -> Response {
    match lookup_avatar(state.store.as_ref()).await {
        AvatarLookup::Present(bytes) => {
            crate::metrics::avatar_served("blob");
            let mime = sniff_image_mime(&bytes);
            (
                [
                    (header::CONTENT_TYPE, mime),
                    (header::CACHE_CONTROL, AVATAR_CACHE_CONTROL),
                ],
                bytes,
            )
                .into_response()
        }
        AvatarLookup::Absent => {
            crate::metrics::avatar_served("absent");
            let target = fallback_avatar(&state).await;
            tracing::debug!(location = %target, "No stored avatar, redirecting");
            Redirect::to(&target).into_response()
        }
        AvatarLookup::Failed(e) => {
            crate::metrics::avatar_served("error");
            tracing::warn!("Avatar lookup failed, using fallback: {e}");
            Redirect::to(&state.config.fallback_avatar).into_response()
        }
    }
}

/// The profile's `avatar_url` when set, otherwise the bundled image.
async fn fallback_avatar(state: &AppState) -> String {
    let avatar_url = match state.store.get_profile().await {
        Ok(Some(profile)) => profile
            .avatar_url
            .map(|u| u.trim().to_string())
            .filter(|u| !u.is_empty()),
        _ => None,
    };

    let target = match avatar_url {
        Some(url) if url.starts_with("http://") || url.starts_with("https://") => url,
        Some(url) if url.starts_with('/') => url,
        Some(url) => format!("/static/{url}"),
        None => return state.config.fallback_avatar.clone(),
    };

    // Stored text must survive as a Location header.
    if HeaderValue::from_str(&target).is_err() {
        tracing::warn!(location = ?target, "Stored avatar_url is not a usable redirect");
        return state.config.fallback_avatar.clone();
    }
    target
}

/// Detect the image type from its magic bytes, defaulting to JPEG.
pub fn sniff_image_mime(bytes: &[u8]) -> &'static str {
    image::guess_format(bytes)
        .map(|format| format.to_mime_type())
        .unwrap_or(DEFAULT_AVATAR_MIME)
}
