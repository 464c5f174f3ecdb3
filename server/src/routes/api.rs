use axum::Json;
use axum::body::Body;
use axum::extract::{Path, State};
use axum::http::{HeaderMap, HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};
use bytes::Bytes;

use crate::config::{MAP_CACHE_CONTROL, MAX_MAP_ID_LEN};
use crate::state::{AppState, StoredMap};

pub async fn health(State(state): State<AppState>) -> Json<serde_json::Value> {
    let observability = state.observability.snapshot();
    Json(serde_json::json!({
        "status": "ok",
        "maps": state.maps.len(),
        "observability": {
            "map_requests_total": observability.map_requests_total,
            "not_modified_total": observability.not_modified_total,
            "not_found_total": observability.not_found_total,
        }
    }))
}

pub async fn list_maps(State(state): State<AppState>) -> Response {
    json_bytes_response((*state.maps_json).clone(), MAP_CACHE_CONTROL, None)
}

/// Full snapshot: map payload, located cells and route overlay.
pub async fn get_map(
    State(state): State<AppState>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Response {
    serve_map_body(&state, &id, &headers, |stored| &stored.snapshot_json)
}

pub async fn get_cells(
    State(state): State<AppState>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Response {
    serve_map_body(&state, &id, &headers, |stored| &stored.cells_json)
}

pub async fn get_route(
    State(state): State<AppState>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Response {
    serve_map_body(&state, &id, &headers, |stored| &stored.route_json)
}

fn serve_map_body(
    state: &AppState,
    id: &str,
    headers: &HeaderMap,
    body: impl FnOnce(&StoredMap) -> &Bytes,
) -> Response {
    state.observability.record_map_request();
    let Some(id) = normalize_map_id(id) else {
        return error_response(StatusCode::BAD_REQUEST, "invalid map id");
    };
    let Some(stored) = state.map(id) else {
        state.observability.record_not_found();
        return error_response(StatusCode::NOT_FOUND, "map not found");
    };

    if if_none_match_matches(headers, &stored.etag) {
        state.observability.record_not_modified();
        return not_modified_response(MAP_CACHE_CONTROL, Some(stored.etag.as_str()));
    }

    json_bytes_response(
        body(stored).clone(),
        MAP_CACHE_CONTROL,
        Some(stored.etag.as_str()),
    )
}

fn normalize_map_id(raw: &str) -> Option<&str> {
    let id = raw.trim();
    if id.is_empty() || id.len() > MAX_MAP_ID_LEN {
        return None;
    }
    id.chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
        .then_some(id)
}

fn error_response(status: StatusCode, message: &str) -> Response {
    (status, Json(serde_json::json!({ "error": message }))).into_response()
}

fn json_bytes_response(body: Bytes, cache_control: &'static str, etag: Option<&str>) -> Response {
    let mut response = Response::new(Body::from(body));
    let headers = response.headers_mut();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("application/json"),
    );
    headers.insert(
        header::CACHE_CONTROL,
        HeaderValue::from_static(cache_control),
    );
    if let Some(etag) = etag
        && let Ok(etag_header) = HeaderValue::from_str(etag)
    {
        headers.insert(header::ETAG, etag_header);
    }
    response
}

fn not_modified_response(cache_control: &'static str, etag: Option<&str>) -> Response {
    let mut response = StatusCode::NOT_MODIFIED.into_response();
    let headers = response.headers_mut();
    headers.insert(
        header::CACHE_CONTROL,
        HeaderValue::from_static(cache_control),
    );
    if let Some(etag) = etag
        && let Ok(etag_header) = HeaderValue::from_str(etag)
    {
        headers.insert(header::ETAG, etag_header);
    }
    response
}

fn normalize_etag(candidate: &str) -> &str {
    candidate.strip_prefix("W/").unwrap_or(candidate).trim()
}

fn if_none_match_matches(headers: &HeaderMap, etag: &str) -> bool {
    let Some(value) = headers.get(header::IF_NONE_MATCH) else {
        return false;
    };
    let Ok(raw) = value.to_str() else {
        return false;
    };

    raw.split(',').any(|candidate| {
        let candidate = candidate.trim();
        candidate == "*" || normalize_etag(candidate) == normalize_etag(etag)
    })
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use axum::body::{Body, to_bytes};
    use axum::http::{HeaderMap, HeaderValue, Request, StatusCode, header};
    use storemap_shared::{LocatedCell, MapSnapshot, RouteOverlay};
    use tower::ServiceExt;

    use super::{if_none_match_matches, normalize_map_id};
    use crate::fixtures::demo_map;
    use crate::state::AppState;

    fn test_app() -> axum::Router {
        crate::app::build_app(AppState::new(vec![demo_map()]), Path::new("client/dist"))
    }

    async fn get(uri: &str, headers: &[(header::HeaderName, &str)]) -> axum::response::Response {
        let mut request = Request::builder().uri(uri);
        for (name, value) in headers {
            request = request.header(name.clone(), *value);
        }
        test_app()
            .oneshot(request.body(Body::empty()).expect("build request"))
            .await
            .expect("router is infallible")
    }

    async fn body_bytes(response: axum::response::Response) -> bytes::Bytes {
        to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("read body")
    }

    #[tokio::test]
    async fn map_endpoint_returns_snapshot_with_etag() {
        let response = get("/api/maps/demo", &[]).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get(header::CONTENT_TYPE),
            Some(&HeaderValue::from_static("application/json"))
        );
        assert!(response.headers().contains_key(header::ETAG));

        let snapshot: MapSnapshot =
            serde_json::from_slice(&body_bytes(response).await).expect("snapshot json");
        assert_eq!(snapshot, demo_map());
    }

    #[tokio::test]
    async fn cells_and_route_endpoints_split_the_snapshot() {
        let cells: Vec<LocatedCell> =
            serde_json::from_slice(&body_bytes(get("/api/maps/demo/cells", &[]).await).await)
                .expect("cells json");
        assert_eq!(cells, demo_map().cells);

        let route: RouteOverlay =
            serde_json::from_slice(&body_bytes(get("/api/maps/demo/route", &[]).await).await)
                .expect("route json");
        assert_eq!(Some(route), demo_map().route);
    }

    #[tokio::test]
    async fn matching_if_none_match_returns_not_modified() {
        let first = get("/api/maps/demo", &[]).await;
        let etag = first
            .headers()
            .get(header::ETAG)
            .and_then(|value| value.to_str().ok())
            .expect("etag header")
            .to_string();

        let second = get("/api/maps/demo", &[(header::IF_NONE_MATCH, etag.as_str())]).await;
        assert_eq!(second.status(), StatusCode::NOT_MODIFIED);
    }

    #[tokio::test]
    async fn unknown_and_invalid_ids_are_rejected() {
        assert_eq!(
            get("/api/maps/missing", &[]).await.status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            get("/api/maps/bad%20id", &[]).await.status(),
            StatusCode::BAD_REQUEST
        );
    }

    #[tokio::test]
    async fn listing_and_health_report_loaded_maps() {
        let listing: serde_json::Value =
            serde_json::from_slice(&body_bytes(get("/api/maps", &[]).await).await)
                .expect("listing json");
        assert_eq!(listing[0]["id"], "demo");
        assert_eq!(listing[0]["width"], 12);
        assert_eq!(listing[0]["hasRoute"], true);

        let health: serde_json::Value =
            serde_json::from_slice(&body_bytes(get("/api/health", &[]).await).await)
                .expect("health json");
        assert_eq!(health["status"], "ok");
        assert_eq!(health["maps"], 1);
    }

    #[test]
    fn if_none_match_supports_weak_and_multiple_values() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::IF_NONE_MATCH,
            HeaderValue::from_static("\"other\", W/\"map-demo-1\""),
        );
        assert!(if_none_match_matches(&headers, "\"map-demo-1\""));
        assert!(!if_none_match_matches(&headers, "\"map-demo-2\""));

        headers.insert(header::IF_NONE_MATCH, HeaderValue::from_static("*"));
        assert!(if_none_match_matches(&headers, "\"anything\""));
    }

    #[test]
    fn map_ids_are_trimmed_and_restricted() {
        assert_eq!(normalize_map_id(" demo "), Some("demo"));
        assert_eq!(normalize_map_id("store_2.v1"), Some("store_2.v1"));
        assert_eq!(normalize_map_id(""), None);
        assert_eq!(normalize_map_id("a/b"), None);
        assert_eq!(normalize_map_id(&"x".repeat(65)), None);
    }
}
