//! HTTP surface: axum router, cache headers for edge CDNs, and the
//! JSON/HTML/PNG handlers. Handlers map domain errors onto status codes
//! and never leak upstream details past the log line.

use std::collections::HashMap;
use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::{header, HeaderMap, HeaderValue, StatusCode};
use axum::response::{Html, IntoResponse, Json, Response};
use axum::routing::get;
use axum::Router;
use serde_json::json;

use crate::error::{Error, Result};
use crate::fonts;
use crate::github::{create_render_context, fetch_card_data, CardData, GitHubClient};
use crate::sections::{render_panels, render_section, RenderedPanel, Section};

/// Browser cache TTLs are zero; these govern the CDN tier only.
const IMAGE_TTL_SECONDS: u64 = 86_400;
const IMAGE_STALE_SECONDS: u64 = 86_400;
const MANIFEST_TTL_SECONDS: u64 = 900;
const MANIFEST_STALE_SECONDS: u64 = 900;

/// Shared per-process state behind the router.
pub struct AppState {
    pub github: GitHubClient,
    pub http: reqwest::Client,
}

impl AppState {
    pub fn new(github: GitHubClient, http: reqwest::Client) -> Self {
        Self { github, http }
    }
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/card", get(missing_username))
        .route("/api/card/", get(missing_username))
        .route("/api/card/:username", get(card_page))
        .route("/api/card/:username/:section", get(user_section))
        .with_state(state)
}

async fn missing_username() -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(json!({ "error": "Username is required" })),
    )
        .into_response()
}

async fn card_page(
    State(state): State<Arc<AppState>>,
    Path(username): Path<String>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    let want_json = params.get("format").map(|f| f == "json").unwrap_or(false);
    let result = if want_json {
        card_manifest(&state, &username).await
    } else {
        card_html(&state, &username).await
    };
    result.unwrap_or_else(error_response)
}

fn manifest_json(data: &CardData) -> serde_json::Value {
    json!({
        "username": data.profile.login,
        "profile": data.profile,
        "repos": data.repos,
        "stats": data.stats,
        "activitySeries": data.activity_series,
    })
}

async fn card_manifest(state: &AppState, username: &str) -> Result<Response> {
    let data = fetch_card_data(&state.github, username).await?;
    let mut response = Json(manifest_json(&data)).into_response();
    apply_cache_headers(
        response.headers_mut(),
        MANIFEST_TTL_SECONDS,
        MANIFEST_STALE_SECONDS,
    );
    Ok(response)
}

async fn card_html(state: &AppState, username: &str) -> Result<Response> {
    // Resolve the profile up front so a bad username is a 404, not a page
    // full of broken images.
    let data = fetch_card_data(&state.github, username).await?;
    let login = escape_html(&data.profile.login);

    let mut images = String::new();
    for section in Section::ALL {
        images.push_str(&format!(
            "<img src=\"/api/card/{login}/{id}.png\" alt=\"{label}\" width=\"{width}\">\n",
            id = section.id(),
            label = escape_html(section.label()),
            width = section.width() as u32,
        ));
    }

    let page = format!(
        "<!doctype html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n\
         <title>{login} | gitcard</title>\n\
         <style>body{{margin:0;padding:40px;background:#fafafa;font-family:sans-serif}}\
         main{{display:flex;flex-direction:column;gap:24px;align-items:center}}\
         img{{max-width:100%;height:auto}}\
         footer{{margin-top:24px;text-align:center;color:#9ca3af;font-size:12px}}</style>\n\
         </head>\n<body>\n<main>\n{images}</main>\n\
         <footer>Generated {date}</footer>\n</body>\n</html>\n",
        date = chrono::Utc::now().format("%Y-%m-%d"),
    );

    let mut response = Html(page).into_response();
    apply_cache_headers(
        response.headers_mut(),
        MANIFEST_TTL_SECONDS,
        MANIFEST_STALE_SECONDS,
    );
    Ok(response)
}

async fn user_section(
    State(state): State<Arc<AppState>>,
    Path((username, section)): Path<(String, String)>,
    Query(params): Query<HashMap<String, String>>,
    headers: HeaderMap,
) -> Response {
    let result = match section.as_str() {
        "activity-data" => activity_data(&state, &username).await,
        "panels" => {
            let want_json = params.get("format").map(|f| f == "json").unwrap_or(false);
            panels_page(&state, &username, &headers, want_json).await
        }
        other => match other.strip_suffix(".png") {
            Some(id) => section_png(&state, &username, id).await,
            None => Err(Error::UnknownSection(other.to_string())),
        },
    };
    result.unwrap_or_else(error_response)
}

async fn activity_data(state: &AppState, username: &str) -> Result<Response> {
    let data = fetch_card_data(&state.github, username).await?;
    let mut response = Json(manifest_json(&data)).into_response();
    apply_cache_headers(
        response.headers_mut(),
        MANIFEST_TTL_SECONDS,
        MANIFEST_STALE_SECONDS,
    );
    Ok(response)
}

async fn panels_page(
    state: &AppState,
    username: &str,
    headers: &HeaderMap,
    want_json: bool,
) -> Result<Response> {
    let data = fetch_card_data(&state.github, username).await?;
    let login = escape_html(&data.profile.login);

    if want_json {
        let origin = request_origin(headers);
        let panels: Vec<_> = [
            Section::Stats,
            Section::Activity,
            Section::Languages,
            Section::Repositories,
        ]
        .iter()
        .map(|section| {
            json!({
                "id": section.id(),
                "label": section.label(),
                "url": format!("{origin}/api/card/{username}/{}.png", section.id()),
            })
        })
        .collect();
        let mut response = Json(json!({
            "username": data.profile.login,
            "panels": panels,
        }))
        .into_response();
        apply_cache_headers(
            response.headers_mut(),
            MANIFEST_TTL_SECONDS,
            MANIFEST_STALE_SECONDS,
        );
        return Ok(response);
    }

    let page = format!(
        "<!doctype html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n\
         <title>{login} panels | gitcard</title>\n\
         <style>body{{margin:0;padding:40px;background:#fafafa;text-align:center}}\
         img{{max-width:100%;height:auto}}</style>\n\
         </head>\n<body>\n<img src=\"/api/card/{login}/panels.png\" alt=\"Panels\">\n\
         </body>\n</html>\n",
    );

    let mut response = Html(page).into_response();
    apply_cache_headers(
        response.headers_mut(),
        MANIFEST_TTL_SECONDS,
        MANIFEST_STALE_SECONDS,
    );
    Ok(response)
}

async fn section_png(state: &AppState, username: &str, id: &str) -> Result<Response> {
    // Validate the id before touching the network so unknown sections are
    // cheap 404s.
    enum Target {
        One(Section),
        Panels,
    }
    let target = if id == "panels" {
        Target::Panels
    } else {
        Target::One(Section::parse(id).ok_or_else(|| Error::UnknownSection(id.to_string()))?)
    };

    let ctx = Arc::new(create_render_context(&state.github, username).await?);
    let fonts = fonts::provision(&state.http).await?;

    let panel: RenderedPanel = match target {
        Target::Panels => render_panels(ctx, fonts).await?,
        Target::One(section) => {
            tokio::task::spawn_blocking(move || render_section(section, &ctx, fonts))
                .await
                .map_err(|e| Error::Render(format!("render task failed: {e}")))??
        }
    };

    let mut headers = HeaderMap::new();
    headers.insert(header::CONTENT_TYPE, HeaderValue::from_static("image/png"));
    apply_cache_headers(&mut headers, IMAGE_TTL_SECONDS, IMAGE_STALE_SECONDS);
    Ok((StatusCode::OK, headers, panel.png).into_response())
}

/// Zero browser TTL with revalidation, long CDN TTL with stale serving.
fn apply_cache_headers(headers: &mut HeaderMap, ttl: u64, stale: u64) {
    headers.insert(
        header::CACHE_CONTROL,
        HeaderValue::from_static("public, max-age=0, must-revalidate"),
    );
    if let Ok(edge) =
        HeaderValue::from_str(&format!("public, max-age={ttl}, stale-while-revalidate={stale}"))
    {
        headers.insert("cdn-cache-control", edge.clone());
        headers.insert("vercel-cdn-cache-control", edge);
    }
}

/// Absolute origin for URLs in manifests, honoring forwarding proxies.
fn request_origin(headers: &HeaderMap) -> String {
    let host = headers
        .get("x-forwarded-host")
        .or_else(|| headers.get(header::HOST))
        .and_then(|v| v.to_str().ok())
        .unwrap_or("localhost:3000");
    let proto = headers
        .get("x-forwarded-proto")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("http");
    format!("{proto}://{host}")
}

fn error_response(err: Error) -> Response {
    match err {
        Error::UserNotFound(_) => (
            StatusCode::NOT_FOUND,
            Json(json!({ "error": "User not found" })),
        )
            .into_response(),
        Error::UnknownSection(id) => {
            // The composite is addressable too, so it belongs in the hint.
            let available: Vec<_> = Section::ALL
                .iter()
                .map(|s| s.id())
                .chain(std::iter::once("panels"))
                .collect();
            (
                StatusCode::NOT_FOUND,
                Json(json!({
                    "error": format!("Unknown section: {id}"),
                    "availableSections": available,
                })),
            )
                .into_response()
        }
        err => {
            tracing::error!(error = %err, "request failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": "Internal server error" })),
            )
                .into_response()
        }
    }
}

fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
