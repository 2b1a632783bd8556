//! HTTP surface: router, handlers, and server startup
//!
//! Handlers get everything through [`AppState`] rather than process-wide
//! singletons: the record store, both outbound clients, the session map, and
//! the explore-page defaults. Page handlers return JSON payloads; the static
//! frontend is served as a fallback.

use std::sync::Arc;

use anyhow::{Context, Result};
use axum::{
    Router,
    extract::{Form, Query, State},
    http::{HeaderMap, header},
    response::{AppendHeaders, IntoResponse, Json, Redirect, Response},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use uuid::Uuid;

use crate::auth::{self, SessionData, Sessions};
use crate::config::DefaultsConfig;
use crate::error::StyleCastError;
use crate::models::{Photo, Role, Style, WeatherObservation};
use crate::photos::PhotoClient;
use crate::store::Store;
use crate::weather::WeatherClient;
use crate::keywords;

/// Everything a request handler needs, injected per request
#[derive(Clone)]
pub struct AppState {
    pub store: Store,
    pub weather: Arc<WeatherClient>,
    pub photos: Arc<PhotoClient>,
    pub sessions: Sessions,
    pub defaults: DefaultsConfig,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(home))
        .route("/about", get(about))
        .route("/login", get(login_page).post(login_submit))
        .route("/logout", get(logout))
        .route("/admin", get(admin_styles))
        .route("/admin/style/add/submit", post(add_style_submit))
        .route("/admin/style/edit", get(edit_style_page))
        .route("/admin/style/edit/submit", post(edit_style_submit))
        .route("/admin/style/delete", post(delete_style))
        .route("/styleform", get(style_form))
        .route("/explore", get(explore))
        .with_state(state)
}

/// Bind the listener and serve the app with CORS and static-asset fallback.
pub async fn run(state: AppState, port: u16, assets_dir: &str) -> Result<()> {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = router(state)
        .fallback_service(ServeDir::new(assets_dir))
        .layer(cors);

    let addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    tracing::info!("Web server running at http://localhost:{}", port);
    axum::serve(listener, app)
        .await
        .with_context(|| "Server error")?;
    Ok(())
}

// Page payloads

#[derive(Serialize)]
struct StyleListPage {
    title: &'static str,
    styles: Vec<Style>,
}

#[derive(Serialize)]
struct EditStylePage {
    title: &'static str,
    stylelist: Vec<Style>,
    edit_style: Style,
}

#[derive(Serialize)]
struct ExplorePage {
    title: &'static str,
    weather: WeatherObservation,
    style_queries: Vec<String>,
    accessory_queries: Vec<String>,
    style_photos: Vec<Photo>,
    accessory_photos: Vec<Photo>,
}

// Form and query parameter shapes; field names match the frontend forms.

#[derive(Deserialize)]
struct LoginForm {
    username: String,
    password: String,
}

#[derive(Deserialize)]
struct AddStyleForm {
    stylename: String,
}

#[derive(Deserialize)]
struct EditStyleForm {
    #[serde(rename = "styleId")]
    style_id: String,
    stylename: String,
}

#[derive(Deserialize)]
struct DeleteStyleForm {
    #[serde(rename = "styleId")]
    style_id: String,
}

#[derive(Deserialize)]
struct EditStyleParams {
    styleid: Option<String>,
}

#[derive(Deserialize)]
struct ExploreParams {
    city: Option<String>,
    gender: Option<String>,
    /// Comma-separated style names, e.g. `styles=casual,formal`
    styles: Option<String>,
}

fn store_err(err: anyhow::Error) -> StyleCastError {
    StyleCastError::store(err.to_string())
}

/// Admin routes require a logged-in admin; everyone else goes to the login
/// page instead of seeing an error.
fn require_admin(state: &AppState, headers: &HeaderMap) -> Result<SessionData, Response> {
    match state.sessions.identify(headers) {
        Some(session) if session.role == Role::Admin => Ok(session),
        _ => Err(Redirect::to("/login").into_response()),
    }
}

async fn home() -> Json<serde_json::Value> {
    Json(json!({ "title": "Home" }))
}

async fn about() -> Json<serde_json::Value> {
    Json(json!({ "title": "About" }))
}

async fn login_page() -> Json<serde_json::Value> {
    Json(json!({ "title": "Login" }))
}

async fn login_submit(
    State(state): State<AppState>,
    Form(form): Form<LoginForm>,
) -> Result<Response, StyleCastError> {
    let user = state
        .store
        .find_user(&form.username)
        .await
        .map_err(store_err)?;

    let Some(user) = user else {
        tracing::warn!("Login attempt for unknown user '{}'", form.username);
        return Ok(Redirect::to("/login").into_response());
    };

    if !auth::verify_password(&form.password, &user.password_hash) {
        tracing::warn!("Failed login for user '{}'", form.username);
        return Ok(Redirect::to("/login").into_response());
    }

    let token = state.sessions.create(&user.username, user.role);
    let target = match user.role {
        Role::Admin => "/admin",
        Role::Visitor => "/styleform",
    };
    tracing::info!("User '{}' logged in", user.username);

    Ok((
        AppendHeaders([(header::SET_COOKIE, auth::session_cookie(&token))]),
        Redirect::to(target),
    )
        .into_response())
}

async fn logout(State(state): State<AppState>, headers: HeaderMap) -> Response {
    if let Some(token) = auth::token_from_headers(&headers) {
        state.sessions.remove(&token);
    }
    (
        AppendHeaders([(header::SET_COOKIE, auth::clear_session_cookie())]),
        Redirect::to("/"),
    )
        .into_response()
}

async fn admin_styles(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Response, StyleCastError> {
    if let Err(redirect) = require_admin(&state, &headers) {
        return Ok(redirect);
    }

    let styles = state.store.list_styles().await.map_err(store_err)?;
    Ok(Json(StyleListPage {
        title: "Style List",
        styles,
    })
    .into_response())
}

async fn add_style_submit(
    State(state): State<AppState>,
    headers: HeaderMap,
    Form(form): Form<AddStyleForm>,
) -> Result<Response, StyleCastError> {
    if let Err(redirect) = require_admin(&state, &headers) {
        return Ok(redirect);
    }

    let name = form.stylename.trim();
    if name.is_empty() {
        return Ok(Redirect::to("/admin").into_response());
    }

    state.store.add_style(name).await.map_err(store_err)?;
    Ok(Redirect::to("/admin").into_response())
}

async fn edit_style_page(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(params): Query<EditStyleParams>,
) -> Result<Response, StyleCastError> {
    if let Err(redirect) = require_admin(&state, &headers) {
        return Ok(redirect);
    }

    // Missing, malformed, or unknown ids all bounce back to the list page.
    let Some(id) = params.styleid.as_deref().and_then(|raw| Uuid::parse_str(raw).ok()) else {
        return Ok(Redirect::to("/admin").into_response());
    };
    let Some(edit_style) = state.store.get_style(id).await.map_err(store_err)? else {
        return Ok(Redirect::to("/admin").into_response());
    };

    let stylelist = state.store.list_styles().await.map_err(store_err)?;
    Ok(Json(EditStylePage {
        title: "Edit a style",
        stylelist,
        edit_style,
    })
    .into_response())
}

async fn edit_style_submit(
    State(state): State<AppState>,
    headers: HeaderMap,
    Form(form): Form<EditStyleForm>,
) -> Result<Response, StyleCastError> {
    if let Err(redirect) = require_admin(&state, &headers) {
        return Ok(redirect);
    }

    // A malformed id is recoverable: back to the list page, like the GET side.
    let Ok(id) = Uuid::parse_str(&form.style_id) else {
        return Ok(Redirect::to("/admin").into_response());
    };
    state
        .store
        .update_style(id, form.stylename.trim())
        .await
        .map_err(store_err)?;
    Ok(Redirect::to("/admin").into_response())
}

async fn delete_style(
    State(state): State<AppState>,
    headers: HeaderMap,
    Form(form): Form<DeleteStyleForm>,
) -> Result<Response, StyleCastError> {
    if let Err(redirect) = require_admin(&state, &headers) {
        return Ok(redirect);
    }

    let Ok(id) = Uuid::parse_str(&form.style_id) else {
        return Ok(Redirect::to("/admin").into_response());
    };
    state.store.delete_style(id).await.map_err(store_err)?;
    Ok(Redirect::to("/admin").into_response())
}

async fn style_form(State(state): State<AppState>) -> Result<Response, StyleCastError> {
    let styles = state.store.list_styles().await.map_err(store_err)?;
    Ok(Json(StyleListPage {
        title: "Style Form",
        styles,
    })
    .into_response())
}

/// The explore page: one weather lookup, then two sequential photo searches.
/// Any downstream failure aborts the whole request.
async fn explore(
    State(state): State<AppState>,
    Query(params): Query<ExploreParams>,
) -> Result<Json<ExplorePage>, StyleCastError> {
    let city = params.city.unwrap_or_else(|| state.defaults.city.clone());
    let gender = params.gender.unwrap_or_else(|| state.defaults.gender.clone());
    let styles: Vec<String> = params
        .styles
        .as_deref()
        .unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|style| !style.is_empty())
        .map(String::from)
        .collect();

    let weather = state.weather.current(&city).await?;

    let style_queries = keywords::style_queries(&gender, &styles);
    let style_photos = state.photos.search(&style_queries).await?;

    let accessory_queries = keywords::accessory_keywords(&weather.description, &gender);
    let accessory_photos = state.photos.search(&accessory_queries).await?;

    Ok(Json(ExplorePage {
        title: "Explore",
        weather,
        style_queries,
        accessory_queries,
        style_photos,
        accessory_photos,
    }))
}
