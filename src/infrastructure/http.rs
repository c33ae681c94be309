//! HTTP retrieval endpoint
//!
//! `GET /terms` returns the navigation item trees the editor merges into a
//! menu container. Access requires an editor token; responses are never cached.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::header::{AUTHORIZATION, CACHE_CONTROL, EXPIRES, PRAGMA};
use axum::http::{HeaderMap, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tokio::signal;
use tracing::{debug, info, instrument, warn};

use crate::domain::attributes::{clamp_depth, DEFAULT_TAXONOMY};
use crate::domain::{sanitize_key, BlockAttributes, OrderBy, SortOrder};
use crate::infrastructure::di::AppContext;
use crate::infrastructure::{InfraError, InfraResult};

type SharedState = Arc<AppContext>;

const NO_CACHE: &str = "no-cache, no-store, must-revalidate";

/// Query parameters of `GET /terms`, all optional strings.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TermsParams {
    pub taxonomy: Option<String>,
    pub order_by: Option<String>,
    pub order: Option<String>,
    pub include_empty: Option<String>,
    pub show_hierarchy: Option<String>,
    pub max_depth: Option<String>,
}

impl TermsParams {
    /// Booleans are true only for `"1"`.
    pub fn attributes(&self) -> BlockAttributes {
        let is_one = |v: &Option<String>| v.as_deref() == Some("1");
        BlockAttributes {
            taxonomy: self
                .taxonomy
                .as_deref()
                .map(sanitize_key)
                .filter(|t| !t.is_empty())
                .unwrap_or_else(|| DEFAULT_TAXONOMY.to_string()),
            order_by: self
                .order_by
                .as_deref()
                .map(OrderBy::parse_lenient)
                .unwrap_or(OrderBy::Name),
            order: self
                .order
                .as_deref()
                .map(SortOrder::parse_lenient)
                .unwrap_or(SortOrder::Asc),
            include_empty: is_one(&self.include_empty),
            show_hierarchy: is_one(&self.show_hierarchy),
            max_depth: self
                .max_depth
                .as_ref()
                .map(|d| clamp_depth(&Value::String(d.clone())))
                .unwrap_or(0),
            ..BlockAttributes::default()
        }
    }
}

#[derive(Debug)]
struct ApiError {
    status: StatusCode,
    code: &'static str,
}

impl ApiError {
    fn forbidden() -> Self {
        Self {
            status: StatusCode::FORBIDDEN,
            code: "rest_forbidden",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let mut response = (self.status, Json(json!({ "code": self.code }))).into_response();
        apply_no_cache(response.headers_mut());
        response
    }
}

fn apply_no_cache(headers: &mut HeaderMap) {
    headers.insert(CACHE_CONTROL, HeaderValue::from_static(NO_CACHE));
    headers.insert(PRAGMA, HeaderValue::from_static("no-cache"));
    headers.insert(EXPIRES, HeaderValue::from_static("0"));
}

/// Whether the request carries a configured editor token.
fn authorized(headers: &HeaderMap, tokens: &[String]) -> bool {
    headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .is_some_and(|token| !token.is_empty() && tokens.iter().any(|t| t == token))
}

pub fn build_router(state: SharedState) -> Router {
    Router::new()
        .route("/terms", get(terms))
        .with_state(state)
}

#[instrument(level = "debug", skip_all)]
async fn terms(
    State(state): State<SharedState>,
    headers: HeaderMap,
    Query(params): Query<TermsParams>,
) -> Result<Response, ApiError> {
    if !authorized(&headers, &state.settings.server.editor_tokens) {
        warn!("rejected request without a valid editor token");
        return Err(ApiError::forbidden());
    }

    let attrs = params.attributes();
    let taxonomy = attrs.taxonomy.clone();
    let navigation = state.navigation();
    // Term stores do blocking file I/O
    let items = tokio::task::spawn_blocking(move || navigation.links_or_empty(&attrs))
        .await
        .unwrap_or_else(|e| {
            warn!("building navigation links panicked: {}", e);
            Vec::new()
        });
    debug!(%taxonomy, roots = items.len(), "serving terms");

    let mut response = Json(items).into_response();
    apply_no_cache(response.headers_mut());
    Ok(response)
}

/// Run the endpoint until Ctrl-C or SIGTERM.
pub async fn serve(ctx: Arc<AppContext>, bind: &str) -> InfraResult<()> {
    let addr: SocketAddr = bind.parse().map_err(|e| InfraError::Server {
        message: format!("invalid bind address {bind}: {e}"),
    })?;
    let router = build_router(ctx);
    info!(%addr, "binding HTTP listener");
    let listener = TcpListener::bind(addr)
        .await
        .map_err(|e| InfraError::io(format!("bind {addr}"), e))?;
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| InfraError::Server {
            message: e.to_string(),
        })?;
    info!("HTTP server exited");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        let _ = signal::ctrl_c().await;
    };
    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        if let Ok(mut stream) = signal(SignalKind::terminate()) {
            let _ = stream.recv().await;
        }
    };
    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
