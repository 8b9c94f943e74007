//! CORS for a single trusted browser origin.
//!
//! Credentials are allowed, so the response always echoes the concrete origin
//! (never `*`) and mirrors the requested headers on preflight.

use axum::{
    extract::{Request, State},
    http::{header, HeaderMap, HeaderValue, Method, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};

const ALLOWED_METHODS: &str = "DELETE, GET, HEAD, OPTIONS, PATCH, POST, PUT";
const PREFLIGHT_MAX_AGE: &str = "600";

#[derive(Debug, Clone)]
pub struct CorsPolicy {
    allowed_origin: String,
    allow_credentials: bool,
}

impl CorsPolicy {
    pub fn new(allowed_origin: &str) -> Self {
        Self {
            allowed_origin: allowed_origin.trim_end_matches('/').to_string(),
            allow_credentials: true,
        }
    }

    pub fn allows(&self, origin: &str) -> bool {
        origin == self.allowed_origin
    }

    fn apply(&self, headers: &mut HeaderMap, origin: HeaderValue) {
        headers.insert(header::ACCESS_CONTROL_ALLOW_ORIGIN, origin);
        if self.allow_credentials {
            headers.insert(
                header::ACCESS_CONTROL_ALLOW_CREDENTIALS,
                HeaderValue::from_static("true"),
            );
        }
        headers.append(header::VARY, HeaderValue::from_static("Origin"));
    }
}

fn is_preflight(request: &Request) -> bool {
    request.method() == Method::OPTIONS
        && request
            .headers()
            .contains_key(header::ACCESS_CONTROL_REQUEST_METHOD)
}

pub async fn cors_middleware(
    State(policy): State<CorsPolicy>,
    request: Request,
    next: Next,
) -> Response {
    let origin = match request.headers().get(header::ORIGIN) {
        Some(origin) => origin.clone(),
        None => return next.run(request).await,
    };
    let allowed = origin.to_str().map(|o| policy.allows(o)).unwrap_or(false);

    if is_preflight(&request) {
        if !allowed {
            tracing::debug!("Rejected preflight from {:?}", origin);
            return (StatusCode::BAD_REQUEST, "Disallowed CORS origin").into_response();
        }

        let mut headers = HeaderMap::new();
        policy.apply(&mut headers, origin);
        headers.insert(
            header::ACCESS_CONTROL_ALLOW_METHODS,
            HeaderValue::from_static(ALLOWED_METHODS),
        );
        if let Some(requested) = request
            .headers()
            .get(header::ACCESS_CONTROL_REQUEST_HEADERS)
        {
            headers.insert(header::ACCESS_CONTROL_ALLOW_HEADERS, requested.clone());
        }
        headers.insert(
            header::ACCESS_CONTROL_MAX_AGE,
            HeaderValue::from_static(PREFLIGHT_MAX_AGE),
        );
        return (StatusCode::OK, headers).into_response();
    }

    let mut response = next.run(request).await;
    if allowed {
        policy.apply(response.headers_mut(), origin);
    }
    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_policy_matches_exact_origin() {
        let policy = CorsPolicy::new("http://localhost:5173/");
        assert!(policy.allows("http://localhost:5173"));
        assert!(!policy.allows("http://localhost:5174"));
        assert!(!policy.allows("https://localhost:5173"));
    }

    #[test]
    fn test_apply_sets_credentials_and_vary() {
        let policy = CorsPolicy::new("http://localhost:5173");
        let mut headers = HeaderMap::new();
        policy.apply(&mut headers, HeaderValue::from_static("http://localhost:5173"));

        assert_eq!(
            headers.get(header::ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(),
            "http://localhost:5173"
        );
        assert_eq!(
            headers.get(header::ACCESS_CONTROL_ALLOW_CREDENTIALS).unwrap(),
            "true"
        );
        assert_eq!(headers.get(header::VARY).unwrap(), "Origin");
    }
}
