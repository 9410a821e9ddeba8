//! Security headers for API responses

/// Strict Content Security Policy for JSON API endpoints
const STRICT_CSP: &str = "default-src 'none'; frame-ancestors 'none';";

const PERMISSIONS_POLICY: &str = "geolocation=(), microphone=(), camera=(), payment=(), usb=()";

/// Wrap a reply with strict security headers for API endpoints.
///
/// Responses may carry tokens, so they are never cached.
pub fn with_api_security_headers<T: warp::Reply>(reply: T) -> impl warp::Reply {
    let reply = warp::reply::with_header(reply, "X-Frame-Options", "DENY");
    let reply = warp::reply::with_header(reply, "X-Content-Type-Options", "nosniff");
    let reply = warp::reply::with_header(reply, "Referrer-Policy", "no-referrer");
    let reply = warp::reply::with_header(reply, "Content-Security-Policy", STRICT_CSP);
    let reply = warp::reply::with_header(reply, "Cache-Control", "no-store");
    warp::reply::with_header(reply, "Permissions-Policy", PERMISSIONS_POLICY)
}
