use axum::http::{
    header::{AUTHORIZATION, CONTENT_TYPE},
    HeaderName, Method,
};
use tower_http::cors::{Any, CorsLayer};

const X_AMZ_DATE: HeaderName = HeaderName::from_static("x-amz-date");
const X_API_KEY: HeaderName = HeaderName::from_static("x-api-key");
const X_AMZ_SECURITY_TOKEN: HeaderName = HeaderName::from_static("x-amz-security-token");

/// Permissive CORS for the proxy routes.
///
/// Every response, errors included, allows any origin. OPTIONS requests are
/// answered by the layer itself with the allowed methods and headers.
pub fn proxy_cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([
            CONTENT_TYPE,
            X_AMZ_DATE,
            AUTHORIZATION,
            X_API_KEY,
            X_AMZ_SECURITY_TOKEN,
        ])
}
