use axum::extract::Request;
use axum::http::StatusCode;
use axum::middleware::Next;
use axum::response::Response;
use once_cell::sync::Lazy;
use prometheus::{register_int_counter_vec, Encoder, IntCounterVec, TextEncoder};

pub static REQUESTS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "marketplace_api_requests_total",
        "Requests handled by the admin API",
        &["resource", "method", "status"]
    )
    .expect("register marketplace_api_requests_total")
});

/// First path segment after the API prefix, e.g. `countries`.
pub fn resource_label(path: &str, prefix: &str) -> String {
    path.strip_prefix(prefix)
        .unwrap_or(path)
        .split('/')
        .find(|s| !s.is_empty())
        .unwrap_or("root")
        .to_string()
}

pub async fn track_requests(req: Request, next: Next) -> Response {
    let resource = resource_label(req.uri().path(), crate::startup::API_PREFIX);
    let method = req.method().to_string();
    let resp = next.run(req).await;
    REQUESTS_TOTAL
        .with_label_values(&[resource.as_str(), method.as_str(), resp.status().as_str()])
        .inc();
    resp
}

pub async fn metrics() -> (StatusCode, String) {
    let encoder = TextEncoder::new();
    let families = prometheus::gather();
    let mut buffer = Vec::new();
    if let Err(e) = encoder.encode(&families, &mut buffer) {
        return (StatusCode::INTERNAL_SERVER_ERROR, format!("metrics encode error: {e}"));
    }
    (StatusCode::OK, String::from_utf8(buffer).unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resource_label_strips_prefix_and_ids() {
        assert_eq!(resource_label("/api/v1/admin/countries/abc", "/api/v1/admin"), "countries");
        assert_eq!(resource_label("/health", "/api/v1/admin"), "health");
        assert_eq!(resource_label("/", "/api/v1/admin"), "root");
    }
}
