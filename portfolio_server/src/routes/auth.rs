//! Login, logout and the admin guard.

use axum::extract::{Request, State};
use axum::http::StatusCode;
use axum::middleware::Next;
use axum::response::{IntoResponse, Redirect, Response};
use axum::Form;
use serde::Deserialize;
use tera::Context;

use super::{redirect, render_page, AppState};
use crate::error::AppError;
use crate::services::auth_service;
use crate::session::{FlashLevel, Session};

#[derive(Debug, Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub password: String,
}

/// Guard for the admin sub-router: unauthenticated callers go to `/login`.
pub async fn require_admin(session: Session, request: Request, next: Next) -> Response {
    if session.is_authenticated() {
        next.run(request).await
    } else {
        tracing::debug!(path = %request.uri().path(), "Admin route requires login");
        Redirect::to("/login").into_response()
    }
}

pub async fn login_form(
    State(state): State<AppState>,
    session: Session,
) -> Result<Response, AppError> {
    if session.is_authenticated() {
        return Ok(Redirect::to("/admin").into_response());
    }
    render_page(&state, session, StatusCode::OK, "login.html", Context::new())
}

pub async fn login(
    State(state): State<AppState>,
    mut session: Session,
    Form(form): Form<LoginForm>,
) -> Result<Response, AppError> {
    if auth_service::password_matches(&state.config.admin_password, &form.password) {
        crate::metrics::login_attempt("success");
        tracing::info!("Admin logged in");
        session.login();
        return Ok(redirect(&state, &session, "/admin"));
    }

    crate::metrics::login_attempt("failure");
    tracing::warn!("Rejected admin login attempt");
    session.logout();
    session.flash(FlashLevel::Error, "Incorrect password.");
    render_page(
        &state,
        session,
        StatusCode::UNAUTHORIZED,
        "login.html",
        Context::new(),
    )
}

pub async fn logout(State(state): State<AppState>, mut session: Session) -> Response {
    session.logout();
    session.flash(FlashLevel::Info, "You have been logged out.");
    redirect(&state, &session, "/")
}
