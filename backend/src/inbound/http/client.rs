//! Client identification for rate limiting.
//!
//! Derives a stable throttling key from the request: the first address in
//! `x-forwarded-for` when a proxy set one, otherwise the peer address. The
//! key only drives abuse mitigation; it is never treated as authentication.

use actix_web::HttpRequest;

/// Fallback key when no address can be derived at all.
const UNKNOWN_CLIENT: &str = "unknown";

/// Derive the rate-limit key for a request.
#[must_use]
pub fn client_key(req: &HttpRequest) -> String {
    if let Some(forwarded) = req
        .headers()
        .get("x-forwarded-for")
        .and_then(|value| value.to_str().ok())
    {
        if let Some(first) = forwarded.split(',').next() {
            let candidate = first.trim();
            if !candidate.is_empty() {
                return candidate.to_owned();
            }
        }
    }

    req.peer_addr()
        .map_or_else(|| UNKNOWN_CLIENT.to_owned(), |addr| addr.ip().to_string())
}
