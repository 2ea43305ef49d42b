//! Response hardening: security headers on every response, CORS on the API.

use actix_cors::Cors;
use actix_web::http::{Method, header};
use actix_web::middleware::DefaultHeaders;

/// Pages load scripts, styles and fonts from the site itself or jsDelivr;
/// post images may come from anywhere.
pub const CONTENT_SECURITY_POLICY: &str = concat!(
    "default-src 'self'; ",
    "base-uri 'self'; ",
    "font-src 'self' https://cdn.jsdelivr.net data:; ",
    "form-action 'self'; ",
    "frame-ancestors 'self'; ",
    "img-src 'self' https://cdn.jsdelivr.net data: http: https:; ",
    "object-src 'none'; ",
    "script-src 'self' https://cdn.jsdelivr.net 'unsafe-inline'; ",
    "script-src-attr 'none'; ",
    "style-src 'self' https://cdn.jsdelivr.net 'unsafe-inline'; ",
    "upgrade-insecure-requests",
);

/// Headers added to every response that does not set them itself.
pub fn security_headers() -> DefaultHeaders {
    DefaultHeaders::new()
        .add((header::CONTENT_SECURITY_POLICY, CONTENT_SECURITY_POLICY))
        .add((header::X_CONTENT_TYPE_OPTIONS, "nosniff"))
        .add((header::X_FRAME_OPTIONS, "SAMEORIGIN"))
        .add((header::REFERRER_POLICY, "no-referrer"))
        .add(("Cross-Origin-Opener-Policy", "same-origin"))
        .add(("X-DNS-Prefetch-Control", "off"))
}

/// The JSON API is readable from any origin. Cookies are never shared.
pub fn api_cors() -> Cors {
    Cors::default()
        .allow_any_origin()
        .send_wildcard()
        .allowed_methods([Method::GET, Method::HEAD, Method::POST])
        .allowed_headers([header::CONTENT_TYPE, header::ACCEPT])
        .max_age(3600)
}
