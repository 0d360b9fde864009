//! Responses synthesized when neither the network nor the cache can answer.

use lisboa_core::Response;

use crate::site::DynamicKind;

const OFFLINE_PAGE: &str = "<!doctype html>\n\
<html lang=\"en\">\n\
<head><meta charset=\"utf-8\"><meta name=\"viewport\" content=\"width=device-width, initial-scale=1\"><title>Offline</title></head>\n\
<body><h1>You are offline</h1><p>This page has not been saved for offline use yet. Reconnect and try again.</p></body>\n\
</html>\n";

/// Minimal HTML page for navigations when the shell is not cached.
pub fn offline_page() -> Response {
    Response::synthesized(503, "Service Unavailable", "text/html; charset=utf-8", OFFLINE_PAGE)
}

/// Placeholder for on-demand content that cannot be reached.
pub fn not_available(kind: DynamicKind) -> Response {
    Response::synthesized(404, "Not Found", "text/plain; charset=utf-8", kind.offline_message())
}

pub fn network_error() -> Response {
    Response::synthesized(503, "Service Unavailable", "text/plain; charset=utf-8", "Network error")
}
