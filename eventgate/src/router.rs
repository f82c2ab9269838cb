//! Central router: alias table, API routes, fallbacks, middleware stack
//!
//! Order of concerns, outermost first: router version header, request id
//! set + propagate, CORS/preflight + inbound debug log, brand extraction
//! (path normalization and prefix stripping), admin auth guard, then the
//! route tables. Unknown paths and wrong methods render the flat router
//! envelope rather than the API error shape.

use axum::http::{header, HeaderValue, StatusCode, Uri};
use axum::response::Response;
use axum::routing::{get, post};
use axum::Router;

use crate::handlers;
use crate::middleware;
use crate::responses::{router_error, ALLOW_METHODS};
use crate::state::AppState;

/// HTML alias table. Every alias accepts GET/HEAD only.
pub const PUBLIC_ALIASES: [&str; 5] = ["/", "/public", "/events", "/schedule", "/calendar"];
pub const ADMIN_ALIASES: [&str; 4] = ["/admin", "/manage", "/dashboard", "/create"];
pub const DISPLAY_ALIASES: [&str; 4] = ["/display", "/tv", "/kiosk", "/screen"];
pub const POSTER_ALIASES: [&str; 3] = ["/poster", "/posters", "/flyers"];
pub const REPORT_ALIASES: [&str; 4] = ["/report", "/analytics", "/reports", "/insights"];

pub fn build_router(state: AppState) -> Router {
    let api = Router::new()
        .route("/api/status", get(handlers::status::status))
        .route("/api/events", get(handlers::events::list_events))
        .route("/api/events/{id}", get(handlers::events::get_event))
        .route(
            "/api/events/{id}/publicBundle",
            get(handlers::events::public_bundle),
        )
        .route(
            "/api/events/{id}/adminBundle",
            get(handlers::events::admin_bundle),
        )
        .route(
            "/api/events/{id}/displayBundle",
            get(handlers::events::display_bundle),
        )
        .route(
            "/api/events/{id}/posterBundle",
            get(handlers::events::poster_bundle),
        )
        .route("/api/admin/events", post(handlers::admin::create_event))
        .route(
            "/api/admin/events/{id}/results",
            post(handlers::admin::record_results),
        );

    let mut pages = Router::new()
        .route("/r", get(handlers::shortlink::shortlink))
        .route("/redirect", get(handlers::shortlink::shortlink));
    for path in PUBLIC_ALIASES {
        pages = pages.route(path, get(handlers::pages::public_page));
    }
    for path in ADMIN_ALIASES {
        pages = pages.route(path, get(handlers::pages::admin_page));
    }
    for path in DISPLAY_ALIASES {
        pages = pages.route(path, get(handlers::pages::display_page));
    }
    for path in POSTER_ALIASES {
        pages = pages.route(path, get(handlers::pages::poster_page));
    }
    for path in REPORT_ALIASES {
        pages = pages.route(path, get(handlers::pages::report_page));
    }

    Router::new()
        .merge(api)
        .merge(pages)
        .fallback(not_found)
        .method_not_allowed_fallback(method_not_allowed)
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::admin_guard,
        ))
        .layer(axum::middleware::from_fn(middleware::brand_extract))
        .layer(axum::middleware::from_fn(middleware::cors_and_log))
        .layer(middleware::request_id_propagation_layer())
        .layer(middleware::request_id_layer())
        .layer(middleware::router_version_layer())
        .with_state(state)
}

async fn not_found(uri: Uri) -> Response {
    router_error(StatusCode::NOT_FOUND, "Not Found", Some(uri.path()))
}

async fn method_not_allowed(uri: Uri) -> Response {
    let mut response = router_error(
        StatusCode::METHOD_NOT_ALLOWED,
        "Method Not Allowed",
        Some(uri.path()),
    );
    response
        .headers_mut()
        .insert(header::ALLOW, HeaderValue::from_static(ALLOW_METHODS));
    response
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use axum::body::Body;
    use axum::http::{header, Method, Request, StatusCode};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use super::*;
    use crate::model::testing::sample_event;
    use crate::sheets::testing::MemoryBackend;
    use crate::state::testing::{open_state_with, state_with};

    const TOKEN: &str = "secret-token";

    fn app(backend: Arc<MemoryBackend>) -> Router {
        build_router(state_with(backend))
    }

    fn get_req(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    fn get_authed(uri: &str) -> Request<Body> {
        Request::builder()
            .uri(uri)
            .header(header::AUTHORIZATION, format!("Bearer {TOKEN}"))
            .body(Body::empty())
            .unwrap()
    }

    fn post_json(uri: &str, body: Value, authed: bool) -> Request<Body> {
        let mut builder = Request::builder()
            .method(Method::POST)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json");
        if authed {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {TOKEN}"));
        }
        builder.body(Body::from(body.to_string())).unwrap()
    }

    async fn body_json(response: Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    async fn body_text(response: Response) -> String {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    fn trivia_body() -> Value {
        json!({
            "name": "Trivia Night",
            "startDateISO": "2025-12-01",
            "venue": "Hall A",
            "brandId": "abc"
        })
    }

    #[tokio::test]
    async fn test_create_then_read() {
        let backend = Arc::new(MemoryBackend::new());
        let app = app(backend.clone());

        let response = app
            .clone()
            .oneshot(post_json("/api/admin/events", trivia_body(), true))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
        let location = response.headers()[header::LOCATION].to_str().unwrap().to_string();
        assert!(location.starts_with("/api/events/evt-"));
        let body = body_json(response).await;
        assert_eq!(body["ok"], true);
        assert_eq!(body["value"]["slug"], "trivia-night");
        assert_eq!(body["value"]["eventTag"], "ABC-TRIVIA-NIGHT-2025-12-01");
        assert_eq!(body["value"]["createdAtISO"], body["value"]["updatedAtISO"]);
        assert_eq!(body["value"]["settings"]["showSchedule"], false);
        let id = body["value"]["id"].as_str().unwrap().to_string();

        // identical create is an idempotent duplicate
        let response = app
            .clone()
            .oneshot(post_json("/api/admin/events", trivia_body(), true))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["duplicate"], true);
        assert_eq!(body["value"]["id"], id.as_str());

        // readable through the API
        let response = app
            .clone()
            .oneshot(get_req(&format!("/api/events/{id}")))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_slug_collision_suffix() {
        let backend = Arc::new(MemoryBackend::with_events(&[sample_event()]));
        let app = app(backend);

        let response = app
            .oneshot(post_json(
                "/api/admin/events",
                json!({
                    "name": "Trivia Night!",
                    "startDateISO": "2025-12-08",
                    "venue": "Hall B",
                    "brandId": "abc"
                }),
                true,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
        let body = body_json(response).await;
        assert_eq!(body["value"]["slug"], "trivia-night-2");
    }

    #[tokio::test]
    async fn test_record_result_and_conditional_get() {
        let event = sample_event();
        let backend = Arc::new(MemoryBackend::with_events(&[event.clone()]));
        let app = app(backend);

        let response = app
            .clone()
            .oneshot(post_json(
                &format!("/api/admin/events/{}/results", event.id),
                json!({ "standings": [{ "rank": 1, "name": "Alpha", "score": 42 }] }),
                true,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let response = app
            .clone()
            .oneshot(get_authed(&format!("/api/events/{}/adminBundle", event.id)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let etag = response.headers()[header::ETAG].to_str().unwrap().to_string();
        let body = body_json(response).await;
        assert_eq!(body["value"]["event"]["standings"].as_array().unwrap().len(), 1);
        assert_eq!(body["value"]["event"]["settings"]["showStandings"], true);
        assert_eq!(body["etag"], etag.as_str());

        let request = Request::builder()
            .uri(format!("/api/events/{}/adminBundle", event.id))
            .header(header::AUTHORIZATION, format!("Bearer {TOKEN}"))
            .header(header::IF_NONE_MATCH, etag.as_str())
            .body(Body::empty())
            .unwrap();
        let response = app.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_MODIFIED);
        let body = body_json(response).await;
        assert_eq!(body["notModified"], true);
        assert!(body.get("value").is_none());
    }

    #[tokio::test]
    async fn test_public_bundle_sponsor_filter() {
        let mut event = sample_event();
        event.sponsors = vec![
            serde_json::from_value(json!({ "id": "s1", "placements": { "mobileBanner": true } }))
                .unwrap(),
            serde_json::from_value(json!({ "id": "s2", "placement": "poster" })).unwrap(),
            serde_json::from_value(json!({ "id": "s3" })).unwrap(),
        ];
        let backend = Arc::new(MemoryBackend::with_events(&[event.clone()]));
        let app = app(backend);

        let response = app
            .oneshot(get_req(&format!("/api/events/{}/publicBundle", event.id)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::CACHE_CONTROL],
            "private, max-age=60, stale-while-revalidate=300"
        );
        let body = body_json(response).await;
        let sponsors = body["value"]["event"]["sponsors"].as_array().unwrap();
        assert_eq!(sponsors.len(), 1);
        assert_eq!(sponsors[0]["id"], "s1");
    }

    #[tokio::test]
    async fn test_poster_qr_invariant() {
        let mut event = sample_event();
        event.qr.public = "notadataurl".to_string();
        event.links.public_url = "https://x".to_string();
        let backend = Arc::new(MemoryBackend::with_events(&[event.clone()]));
        let app = app(backend);

        let response = app
            .oneshot(get_req(&format!("/api/events/{}/posterBundle", event.id)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert!(body["value"]["event"]["qr"].is_null());
        assert_eq!(body["value"]["qrValid"], false);
    }

    #[tokio::test]
    async fn test_unauthenticated_admin_bundle() {
        let event = sample_event();
        let backend = Arc::new(MemoryBackend::with_events(&[event.clone()]));
        let app = app(backend);

        let response = app
            .oneshot(get_req(&format!("/api/events/{}/adminBundle", event.id)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let body = body_json(response).await;
        assert_eq!(body["ok"], false);
        assert_eq!(body["code"], "UNAUTHORIZED");
    }

    #[tokio::test]
    async fn test_admin_key_query_is_accepted() {
        let event = sample_event();
        let backend = Arc::new(MemoryBackend::with_events(&[event.clone()]));
        let app = app(backend);

        let response = app
            .oneshot(get_req(&format!(
                "/api/events/{}/adminBundle?adminKey={TOKEN}",
                event.id
            )))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_shortlink_happy_path() {
        let backend = Arc::new(MemoryBackend::new());
        backend.seed_shortlink(&["abc123", "https://target.example/", "evt-1", "", "promo"]);
        let app = app(backend.clone());

        let response = app.oneshot(get_req("/r?t=abc123")).await.unwrap();
        assert_eq!(response.status(), StatusCode::FOUND);
        assert_eq!(response.headers()[header::LOCATION], "https://target.example/");
        assert_eq!(response.headers()["x-shortlink-token"], "abc123...");
        assert_eq!(
            response.headers()[header::CACHE_CONTROL],
            "no-cache, no-store, must-revalidate"
        );

        tokio::time::sleep(Duration::from_millis(50)).await;
        let rows = backend.analytics.lock().unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0][1], "shortlink_click");
    }

    #[tokio::test]
    async fn test_shortlink_via_page_param() {
        let backend = Arc::new(MemoryBackend::new());
        backend.seed_shortlink(&["abc123", "https://target.example/"]);
        let app = app(backend);

        let response = app.oneshot(get_req("/?p=r&t=abc123")).await.unwrap();
        assert_eq!(response.status(), StatusCode::FOUND);
    }

    #[tokio::test]
    async fn test_unknown_route_envelope() {
        let app = app(Arc::new(MemoryBackend::new()));
        let response = app.oneshot(get_req("/nope")).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert!(response.headers().contains_key("x-router-version"));
        assert!(response.headers().contains_key("x-request-id"));
        let body = body_json(response).await;
        assert_eq!(body["ok"], false);
        assert_eq!(body["status"], 404);
        assert_eq!(body["error"], "Not Found");
        assert_eq!(body["path"], "/nope");
        assert!(body.get("timestamp").is_some());
    }

    #[tokio::test]
    async fn test_preflight_short_circuits() {
        let app = app(Arc::new(MemoryBackend::new()));
        let request = Request::builder()
            .method(Method::OPTIONS)
            .uri("/api/events")
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
        assert_eq!(response.headers()["access-control-allow-origin"], "*");
        assert_eq!(response.headers()["access-control-max-age"], "86400");
    }

    #[tokio::test]
    async fn test_api_responses_carry_cors_and_tracking_headers() {
        let app = app(Arc::new(MemoryBackend::new()));
        let response = app.oneshot(get_req("/api/events")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()["access-control-allow-origin"], "*");
        assert!(response.headers()["x-router-version"]
            .to_str()
            .unwrap()
            .starts_with("eventgate/"));
        assert!(response.headers()["x-request-id"]
            .to_str()
            .unwrap()
            .starts_with("req-"));
    }

    #[tokio::test]
    async fn test_upstream_request_id_wins() {
        let app = app(Arc::new(MemoryBackend::new()));
        let request = Request::builder()
            .uri("/api/events")
            .header("x-request-id", "req-upstream-trace")
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.headers()["x-request-id"], "req-upstream-trace");
    }

    #[tokio::test]
    async fn test_html_route_rejects_post_with_allow() {
        let app = app(Arc::new(MemoryBackend::new()));
        let request = Request::builder()
            .method(Method::POST)
            .uri("/display")
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(response.headers()[header::ALLOW], ALLOW_METHODS);
        let body = body_json(response).await;
        assert_eq!(body["status"], 405);
    }

    #[tokio::test]
    async fn test_brand_prefix_and_trailing_slash() {
        let app = app(Arc::new(MemoryBackend::new()));
        let response = app.clone().oneshot(get_req("/abc/display/")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let html = body_text(response).await;
        assert!(html.contains("data-brand=\"abc\""));
        assert!(html.contains("ABC Events"));

        // query parameter overrides the path-derived brand
        let response = app.oneshot(get_req("/display?brand=cbl")).await.unwrap();
        let html = body_text(response).await;
        assert!(html.contains("data-brand=\"cbl\""));
    }

    #[tokio::test]
    async fn test_brand_scoped_event_list() {
        let mut other = sample_event();
        other.id = "evt-root-1".to_string();
        other.brand_id = "root".to_string();
        other.slug = "company-picnic".to_string();
        let backend = Arc::new(MemoryBackend::with_events(&[sample_event(), other]));
        let app = app(backend);

        let response = app.clone().oneshot(get_req("/abc/api/events")).await.unwrap();
        let body = body_json(response).await;
        let values = body["value"].as_array().unwrap();
        assert_eq!(values.len(), 1);
        assert_eq!(values[0]["slug"], "trivia-night");

        let response = app.oneshot(get_req("/api/events")).await.unwrap();
        let body = body_json(response).await;
        assert_eq!(body["value"].as_array().unwrap()[0]["slug"], "company-picnic");
    }

    #[tokio::test]
    async fn test_slug_lookup_fallback() {
        let event = sample_event();
        let backend = Arc::new(MemoryBackend::with_events(&[event]));
        let app = app(backend);
        let response = app
            .oneshot(get_req("/abc/api/events/trivia-night/publicBundle"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_missing_event_404_echoes_id() {
        let app = app(Arc::new(MemoryBackend::new()));
        let response = app
            .oneshot(get_req("/api/events/evt-missing/publicBundle"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let body = body_json(response).await;
        assert_eq!(body["code"], "EVENT_NOT_FOUND");
        assert!(body["message"].as_str().unwrap().contains("evt-missing"));
    }

    #[tokio::test]
    async fn test_unconfigured_store_returns_503() {
        let backend = Arc::new(MemoryBackend {
            unconfigured: true,
            ..Default::default()
        });
        let app = app(backend);
        let response = app.oneshot(get_req("/api/events")).await.unwrap();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        let body = body_json(response).await;
        assert_eq!(body["code"], "NOT_CONFIGURED");
    }

    #[tokio::test]
    async fn test_bad_create_body_is_bad_input() {
        let app = app(Arc::new(MemoryBackend::new()));
        let response = app
            .clone()
            .oneshot(post_json(
                "/api/admin/events",
                json!({ "name": "X", "startDateISO": "tomorrow", "venue": "Y", "brandId": "abc" }),
                true,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert_eq!(body["code"], "BAD_INPUT");

        // not JSON at all
        let request = Request::builder()
            .method(Method::POST)
            .uri("/api/admin/events")
            .header(header::CONTENT_TYPE, "application/json")
            .header(header::AUTHORIZATION, format!("Bearer {TOKEN}"))
            .body(Body::from("{not json"))
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_dev_mode_open_admin() {
        let event = sample_event();
        let backend = Arc::new(MemoryBackend::with_events(&[event.clone()]));
        let app = build_router(open_state_with(backend));
        let response = app
            .oneshot(get_req(&format!("/api/events/{}/adminBundle", event.id)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_etag_changes_after_mutation() {
        let event = sample_event();
        let backend = Arc::new(MemoryBackend::with_events(&[event.clone()]));
        let app = app(backend);
        let uri = format!("/api/events/{}/displayBundle", event.id);

        let response = app.clone().oneshot(get_req(&uri)).await.unwrap();
        let etag_before = response.headers()[header::ETAG].to_str().unwrap().to_string();

        app.clone()
            .oneshot(post_json(
                &format!("/api/admin/events/{}/results", event.id),
                json!({ "schedule": [{ "time": "19:00", "activity": "Round 1" }] }),
                true,
            ))
            .await
            .unwrap();

        let response = app.clone().oneshot(get_req(&uri)).await.unwrap();
        let etag_after = response.headers()[header::ETAG].to_str().unwrap().to_string();
        assert_ne!(etag_before, etag_after);

        // the stale tag no longer matches
        let request = Request::builder()
            .uri(&uri)
            .header(header::IF_NONE_MATCH, etag_before.as_str())
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_status_endpoint() {
        let app = app(Arc::new(MemoryBackend::new()));
        let response = app.oneshot(get_req("/api/status")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["ok"], true);
        assert_eq!(body["value"]["configured"], true);
        assert_eq!(body["value"]["store"]["connected"], true);
    }
}
