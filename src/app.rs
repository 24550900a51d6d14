//! Router assembly and shared state.
//!
//! # Layout
//!
//! - `GET /` and `GET /health` at the root
//! - auth, users, maids, bookings and reviews routers under `api_prefix`
//! - CORS and request tracing layers around everything; `Authorization`
//!   and `Cookie` are marked sensitive before the trace span records headers

use std::sync::Arc;

use axum::{
    Router,
    extract::FromRef,
    http::header::{AUTHORIZATION, COOKIE},
    routing::get,
};
use tower_http::{
    sensitive_headers::SetSensitiveRequestHeadersLayer,
    trace::{DefaultMakeSpan, TraceLayer},
};

use crate::{config::Settings, cors, db::DbPool, handlers};

/// State shared by every handler.
///
/// Handlers extract the part they need with `State<DbPool>` or
/// `State<Arc<Settings>>`.
#[derive(Clone)]
pub struct AppState {
    pub pool: DbPool,
    pub settings: Arc<Settings>,
}

impl AppState {
    pub fn new(pool: DbPool, settings: Arc<Settings>) -> Self {
        Self { pool, settings }
    }
}

impl FromRef<AppState> for DbPool {
    fn from_ref(state: &AppState) -> Self {
        state.pool.clone()
    }
}

impl FromRef<AppState> for Arc<Settings> {
    fn from_ref(state: &AppState) -> Self {
        state.settings.clone()
    }
}

/// Build the complete application router.
pub fn build_router(state: AppState) -> Router {
    let settings = state.settings.clone();

    let api = Router::new()
        .merge(handlers::auth::router())
        .merge(handlers::users::router(&state))
        .merge(handlers::maids::router(&state))
        .merge(handlers::bookings::router(&state))
        .merge(handlers::reviews::router(&state));

    // axum cannot nest at the root, so an empty prefix merges instead
    let api = if settings.api_prefix.is_empty() {
        api
    } else {
        Router::new().nest(&settings.api_prefix, api)
    };

    let app = Router::new()
        .route("/", get(handlers::health::root))
        .route("/health", get(handlers::health::health_check))
        .merge(api)
        .layer(cors::cors_layer(&settings.cors_origins));

    with_request_tracing(app, settings.debug).with_state(state)
}

/// Wrap `router` in request tracing.
///
/// Headers are recorded on the span only in debug mode, and credential
/// headers show up as `Sensitive`.
fn with_request_tracing<S>(router: Router<S>, include_headers: bool) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    router
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().include_headers(include_headers)),
        )
        .layer(SetSensitiveRequestHeadersLayer::new([AUTHORIZATION, COOKIE]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        config::{pairs, test_settings},
        models::user::UserRole,
        services::auth_service::{self, TokenKind},
    };
    use axum::{
        body::Body,
        http::{HeaderMap, Method, Request, StatusCode, header},
    };
    use sqlx::postgres::PgPoolOptions;
    use tower::ServiceExt;
    use uuid::Uuid;

    /// The pool never connects; these tests only hit routes that stop
    /// before the database.
    fn state_with(settings: Settings) -> AppState {
        let pool = PgPoolOptions::new()
            .connect_lazy(&settings.database_url)
            .expect("lazy pool");
        AppState::new(pool, Arc::new(settings))
    }

    fn app() -> Router {
        build_router(state_with(test_settings()))
    }

    async fn send(app: Router, method: Method, uri: &str) -> axum::response::Response {
        app.oneshot(
            Request::builder()
                .method(method)
                .uri(uri)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap()
    }

    async fn body_json(response: axum::response::Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_root_welcome_message() {
        let response = send(app(), Method::GET, "/").await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            body_json(response).await,
            serde_json::json!({ "message": "Welcome to MaidEase API" })
        );
    }

    #[tokio::test]
    async fn test_root_uses_configured_app_name() {
        let settings = Settings::from_sources(
            Vec::new(),
            pairs(&[
                ("DATABASE_URL", "postgres://localhost/maidease_test"),
                ("SECRET_KEY", "test-secret-key"),
                ("APP_NAME", "Sparkle"),
            ]),
        )
        .unwrap();

        let response = send(build_router(state_with(settings)), Method::GET, "/").await;
        assert_eq!(
            body_json(response).await["message"],
            "Welcome to Sparkle API"
        );
    }

    #[tokio::test]
    async fn test_health() {
        let response = send(app(), Method::GET, "/health").await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            body_json(response).await,
            serde_json::json!({ "status": "healthy" })
        );
    }

    #[tokio::test]
    async fn test_protected_routes_require_token() {
        let routes = [
            (Method::GET, "/api/v1/users/me"),
            (Method::PUT, "/api/v1/maids/me"),
            (Method::GET, "/api/v1/bookings/me"),
            (Method::GET, "/api/v1/bookings/maid"),
            (Method::POST, "/api/v1/bookings"),
            (
                Method::PATCH,
                "/api/v1/bookings/550e8400-e29b-41d4-a716-446655440000/status",
            ),
            (Method::POST, "/api/v1/reviews"),
            (
                Method::GET,
                "/api/v1/reviews/booking/550e8400-e29b-41d4-a716-446655440000/exists",
            ),
        ];

        for (method, uri) in routes {
            let response = send(app(), method.clone(), uri).await;
            assert_eq!(
                response.status(),
                StatusCode::UNAUTHORIZED,
                "{method} {uri}"
            );
        }
    }

    #[tokio::test]
    async fn test_routers_mounted_under_prefix() {
        let response = send(app(), Method::GET, "/users/me").await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_custom_prefix() {
        let settings = Settings::from_sources(
            Vec::new(),
            pairs(&[
                ("DATABASE_URL", "postgres://localhost/maidease_test"),
                ("SECRET_KEY", "test-secret-key"),
                ("API_V1_PREFIX", "/"),
            ]),
        )
        .unwrap();
        let app = build_router(state_with(settings));

        let response = send(app, Method::GET, "/users/me").await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_customer_cannot_list_maid_bookings() {
        let state = state_with(test_settings());
        let token = auth_service::issue_token(
            &state.settings,
            Uuid::new_v4(),
            UserRole::Customer,
            TokenKind::Access,
        )
        .unwrap();

        let response = build_router(state)
            .oneshot(
                Request::builder()
                    .uri("/api/v1/bookings/maid")
                    .header(header::AUTHORIZATION, format!("Bearer {token}"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_credential_headers_are_sensitive_inside_tracing() {
        let app = with_request_tracing(
            Router::new().route(
                "/whoami",
                get(|headers: HeaderMap| async move {
                    let sensitive = [header::AUTHORIZATION, header::COOKIE]
                        .iter()
                        .all(|name| headers.get(name).is_some_and(|v| v.is_sensitive()));
                    sensitive.to_string()
                }),
            ),
            true,
        );

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/whoami")
                    .header(header::AUTHORIZATION, "Bearer secret-token")
                    .header(header::COOKIE, "session=abc")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert_eq!(&body[..], b"true");
    }

    #[tokio::test]
    async fn test_cors_preflight_on_api_route() {
        let response = app()
            .oneshot(
                Request::builder()
                    .method(Method::OPTIONS)
                    .uri("/api/v1/auth/login")
                    .header(header::ORIGIN, "http://localhost:5173")
                    .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(
            response
                .headers()
                .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
                .unwrap(),
            "http://localhost:5173"
        );
    }
}
