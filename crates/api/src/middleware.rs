use axum::extract::{Request, State};
use axum::http::{header, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum::Json;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use serde_json::json;

use crate::state::AppState;

/// Enforce HTTP Basic Auth when credentials are configured; a no-op
/// otherwise. Wrong or missing credentials yield 401 with a JSON error.
pub async fn require_basic_auth(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let Some((user, pass)) = &state.basic_auth else {
        return next.run(request).await;
    };

    let authorized = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .map(|value| check_credentials(value, user, pass))
        .unwrap_or(false);

    if authorized {
        return next.run(request).await;
    }

    (
        StatusCode::UNAUTHORIZED,
        [(header::WWW_AUTHENTICATE, r#"Basic realm="GSLB API""#)],
        Json(json!({"error": "Unauthorized"})),
    )
        .into_response()
}

fn check_credentials(header_value: &str, user: &str, pass: &str) -> bool {
    let Some(encoded) = header_value.strip_prefix("Basic ") else {
        return false;
    };
    let Ok(decoded) = BASE64.decode(encoded.trim()) else {
        return false;
    };
    let expected = format!("{user}:{pass}");
    timing_safe_eq(&decoded, expected.as_bytes())
}

/// Constant-time byte comparison for credential checks.
pub fn timing_safe_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b.iter()).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timing_safe_eq_matches_equal_bytes() {
        assert!(timing_safe_eq(b"secret", b"secret"));
        assert!(!timing_safe_eq(b"secret", b"wrong!"));
        assert!(!timing_safe_eq(b"short", b"longer-value"));
        assert!(timing_safe_eq(b"", b""));
    }

    #[test]
    fn credential_check_decodes_basic_header() {
        let header = format!("Basic {}", BASE64.encode("ops:hunter2"));
        assert!(check_credentials(&header, "ops", "hunter2"));
        assert!(!check_credentials(&header, "ops", "other"));
        assert!(!check_credentials("Bearer abc", "ops", "hunter2"));
    }
}
