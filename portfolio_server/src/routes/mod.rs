//! Portfolio HTTP routes: public pages, login and the admin panel.

pub mod admin;
pub mod auth;
pub mod public;

use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::http::StatusCode;
use axum::middleware;
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum::routing::{get, post};
use axum::Router;
use tera::{Context, Tera};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::config::PortfolioConfig;
use crate::error::AppError;
use crate::services::github_service::GithubClient;
use crate::session::Session;
use crate::store::{PortfolioStore, StoreError};

/// Shared state for every handler.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn PortfolioStore>,
    pub config: Arc<PortfolioConfig>,
    pub templates: Arc<Tera>,
    pub github: GithubClient,
}

impl AppState {
    pub fn new(store: Arc<dyn PortfolioStore>, config: PortfolioConfig) -> anyhow::Result<Self> {
        let templates = crate::templates::build()?;
        let github = GithubClient::from_config(&config)?;
        Ok(Self {
            store,
            config: Arc::new(config),
            templates: Arc::new(templates),
            github,
        })
    }
}

/// Build the full application router.
pub fn router(state: AppState) -> Router {
    let admin = Router::new()
        .route("/admin", get(admin::dashboard))
        .route(
            "/admin/profile/update",
            post(admin::update_profile)
                .layer(DefaultBodyLimit::max(state.config.max_upload_bytes)),
        )
        .route("/admin/project/add", post(admin::add_project))
        .route(
            "/admin/project/edit/{id}",
            get(admin::edit_project_form).post(admin::edit_project),
        )
        .route("/admin/project/delete/{id}", post(admin::delete_project))
        .route("/admin/fetch_readme", post(admin::fetch_readme))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth::require_admin,
        ));

    Router::new()
        .route("/", get(public::index))
        .route("/project/{id}", get(public::project_detail))
        .route("/profile_image", get(public::profile_image))
        .route("/login", get(auth::login_form).post(auth::login))
        .route("/logout", get(auth::logout))
        .merge(admin)
        .nest_service("/static", ServeDir::new(&state.config.static_dir))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Render a page, consuming any pending flash messages.
pub(crate) fn render_page(
    state: &AppState,
    mut session: Session,
    status: StatusCode,
    template: &str,
    mut context: Context,
) -> Result<Response, AppError> {
    let flashes = session.take_flashes();
    context.insert("flashes", &flashes);
    context.insert("authenticated", &session.is_authenticated());

    let html = state.templates.render(template, &context)?;
    // Only rewrite the cookie when flashes were consumed.
    let cookie = (!flashes.is_empty()).then(|| session.cookie(&state.config));
    Ok((status, cookie, Html(html)).into_response())
}

/// Redirect while persisting session changes (login state, flashes).
pub(crate) fn redirect(state: &AppState, session: &Session, to: &str) -> Response {
    (session.cookie(&state.config), Redirect::to(to)).into_response()
}

/// Log and count a store failure, passing the error through.
pub(crate) fn store_failure(operation: &'static str, err: StoreError) -> StoreError {
    tracing::error!(operation, "Store operation failed: {err}");
    crate::metrics::store_error(operation);
    err
}
