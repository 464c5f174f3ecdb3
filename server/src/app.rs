use std::path::Path;

use axum::{
    Router,
    extract::Request,
    http::{HeaderValue, header},
    middleware::{self, Next},
    response::Response,
    routing::get,
};
use tower_http::compression::CompressionLayer;
use tower_http::services::ServeDir;

use crate::routes::api;
use crate::state::AppState;

/// File stem trunk gives the client bundle; the hash follows it.
const CLIENT_BUNDLE_STEM: &str = "storemap-client-";
const BUNDLE_CACHE_CONTROL: &str = "public, max-age=31536000, immutable";
/// The page names the current bundle hash, so it is always revalidated.
const PAGE_CACHE_CONTROL: &str = "no-cache";

pub(crate) fn build_app(state: AppState, static_dir: &Path) -> Router {
    let maps = Router::new()
        .route("/", get(api::list_maps))
        .route("/{id}", get(api::get_map))
        .route("/{id}/cells", get(api::get_cells))
        .route("/{id}/route", get(api::get_route));

    let api_routes = Router::new()
        .route("/health", get(api::health))
        .nest("/maps", maps);

    let client_bundle = Router::new()
        .fallback_service(
            ServeDir::new(static_dir)
                .precompressed_br()
                .precompressed_gzip(),
        )
        .layer(middleware::from_fn(client_cache_headers));

    Router::new()
        .nest("/api", api_routes)
        .layer(CompressionLayer::new())
        .fallback_service(client_bundle)
        .with_state(state)
}

async fn client_cache_headers(request: Request, next: Next) -> Response {
    let policy = client_cache_policy(request.uri().path());
    let mut response = next.run(request).await;

    if let Some(value) = policy.filter(|_| response.status().is_success()) {
        response
            .headers_mut()
            .insert(header::CACHE_CONTROL, HeaderValue::from_static(value));
    }

    response
}

fn client_cache_policy(path: &str) -> Option<&'static str> {
    match path {
        "/" | "/index.html" => Some(PAGE_CACHE_CONTROL),
        _ if bundle_hash(path).is_some() => Some(BUNDLE_CACHE_CONTROL),
        _ => None,
    }
}

/// Hash segment of a trunk output file such as
/// `storemap-client-<hash>.js` or `storemap-client-<hash>_bg.wasm`.
fn bundle_hash(path: &str) -> Option<&str> {
    let rest = path.strip_prefix('/')?.strip_prefix(CLIENT_BUNDLE_STEM)?;
    let hash = rest
        .strip_suffix("_bg.wasm")
        .or_else(|| rest.strip_suffix(".js"))?;
    (hash.len() >= 8 && hash.chars().all(|c| c.is_ascii_hexdigit())).then_some(hash)
}
