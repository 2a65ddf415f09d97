use std::sync::Arc;

use axum::extract::{Request, State};
use axum::http::header::{AUTHORIZATION, WWW_AUTHENTICATE};
use axum::http::StatusCode;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use base64::engine::general_purpose::STANDARD as BASE64_ENGINE;
use base64::Engine;

use crate::config::BasicAuth;
use crate::constants::AUTH_REALM;

pub async fn require_basic_auth(
    State(auth): State<Arc<BasicAuth>>,
    request: Request,
    next: Next,
) -> Response {
    let header = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok());

    match header {
        None => challenge("Authentication required."),
        Some(value) if credentials_match(value, &auth) => next.run(request).await,
        Some(_) => challenge("Invalid credentials."),
    }
}

fn credentials_match(header: &str, auth: &BasicAuth) -> bool {
    let Some(encoded) = header.trim().strip_prefix("Basic ") else {
        return false;
    };
    let Ok(decoded) = BASE64_ENGINE.decode(encoded.trim()) else {
        return false;
    };
    let Ok(decoded) = String::from_utf8(decoded) else {
        return false;
    };

    match decoded.split_once(':') {
        Some((username, password)) => username == auth.username && password == auth.password,
        None => false,
    }
}

fn challenge(message: &'static str) -> Response {
    (
        StatusCode::UNAUTHORIZED,
        [(WWW_AUTHENTICATE, format!("Basic realm=\"{AUTH_REALM}\""))],
        message,
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn auth() -> BasicAuth {
        BasicAuth {
            username: "ana".into(),
            password: "s3:cret".into(),
        }
    }

    #[test]
    fn matches_only_exact_credentials() {
        let good = format!("Basic {}", BASE64_ENGINE.encode("ana:s3:cret"));
        assert!(credentials_match(&good, &auth()));

        let wrong = format!("Basic {}", BASE64_ENGINE.encode("ana:nope"));
        assert!(!credentials_match(&wrong, &auth()));
        assert!(!credentials_match("Bearer abc", &auth()));
        assert!(!credentials_match("Basic !!!", &auth()));
    }
}
