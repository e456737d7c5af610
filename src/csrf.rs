use std::convert::Infallible;

use async_trait::async_trait;
use axum::{
    body::Body,
    extract::{FromRequestParts, Request},
    http::{header, request::Parts, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use tower_cookies::{cookie::SameSite, Cookie, Cookies};
use uuid::Uuid;

pub const CSRF_HEADER: &str = "x-csrf-token";
pub const CSRF_COOKIE: &str = "csrf_token";
pub const CSRF_FIELD: &str = "csrf_token";

const MAX_FORM_BYTES: usize = 2 * 1024 * 1024;

/// The token templates embed in their forms.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CsrfToken(pub String);

#[async_trait]
impl<S> FromRequestParts<S> for CsrfToken
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(parts.extensions.get::<CsrfToken>().cloned().unwrap_or_default())
    }
}

/// Double-submit check: every unsafe request must echo the `csrf_token`
/// cookie in the `x-csrf-token` header or the `csrf_token` form field.
pub async fn csrf_protection(cookies: Cookies, request: Request, next: Next) -> Response {
    let cookie_token = cookies.get(CSRF_COOKIE).map(|c| c.value().to_string());

    if request.method().is_safe() {
        let token = match cookie_token {
            Some(token) => token,
            None => {
                let token = Uuid::new_v4().simple().to_string();
                cookies.add(csrf_cookie(token.clone()));
                token
            }
        };

        let mut request = request;
        request.extensions_mut().insert(CsrfToken(token));
        return next.run(request).await;
    }

    let Some(cookie_token) = cookie_token else {
        return reject("CSRF cookie not set");
    };

    let header_token = request
        .headers()
        .get(CSRF_HEADER)
        .and_then(|h| h.to_str().ok())
        .map(|s| s.to_string());

    let (submitted, mut request) = match header_token {
        Some(token) => (Some(token), request),
        None if is_form(&request) => match form_token(request).await {
            Ok(pair) => pair,
            Err(response) => return response,
        },
        None => (None, request),
    };

    match submitted {
        Some(token) if token == cookie_token => {
            request.extensions_mut().insert(CsrfToken(cookie_token));
            next.run(request).await
        }
        _ => reject("CSRF token missing or incorrect"),
    }
}

fn csrf_cookie(token: String) -> Cookie<'static> {
    Cookie::build((CSRF_COOKIE, token))
        .path("/")
        .same_site(SameSite::Lax)
        .build()
}

fn is_form(request: &Request) -> bool {
    request
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|h| h.to_str().ok())
        .map(|ct| ct.starts_with("application/x-www-form-urlencoded"))
        .unwrap_or(false)
}

/// Buffers a urlencoded body to read the token field, then hands the same
/// bytes back so the handler's `Form` extractor still sees them.
async fn form_token(request: Request) -> Result<(Option<String>, Request), Response> {
    let (parts, body) = request.into_parts();
    let bytes = axum::body::to_bytes(body, MAX_FORM_BYTES)
        .await
        .map_err(|e| {
            tracing::warn!("Failed to read form body: {}", e);
            (StatusCode::PAYLOAD_TOO_LARGE, "Request body too large").into_response()
        })?;

    let token = url::form_urlencoded::parse(&bytes)
        .find(|(key, _)| key == CSRF_FIELD)
        .map(|(_, value)| value.into_owned());

    Ok((token, Request::from_parts(parts, Body::from(bytes))))
}

fn reject(reason: &'static str) -> Response {
    tracing::warn!("CSRF validation failed: {}", reason);
    (StatusCode::FORBIDDEN, "CSRF validation failed").into_response()
}

#[cfg(test)]
mod tests {
    use axum::{middleware, routing::get, Router};
    use tower::ServiceExt;
    use tower_cookies::CookieManagerLayer;

    use super::*;

    async fn echo_token(CsrfToken(token): CsrfToken) -> String {
        token
    }

    fn app() -> Router {
        Router::new()
            .route("/", get(echo_token).post(echo_token))
            .layer(middleware::from_fn(csrf_protection))
            .layer(CookieManagerLayer::new())
    }

    async fn body_string(response: Response) -> String {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn safe_request_issues_cookie() {
        let request = axum::http::Request::builder()
            .uri("/")
            .body(Body::empty())
            .unwrap();

        let response = app().oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let set_cookie = response
            .headers()
            .get(header::SET_COOKIE)
            .and_then(|h| h.to_str().ok())
            .unwrap()
            .to_string();
        assert!(set_cookie.starts_with("csrf_token="));

        let token = body_string(response).await;
        assert!(set_cookie.contains(&token));
    }

    #[tokio::test]
    async fn post_without_token_is_forbidden() {
        let request = axum::http::Request::builder()
            .method("POST")
            .uri("/")
            .header(header::COOKIE, "csrf_token=abc")
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from("text=hello"))
            .unwrap();

        let response = app().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn post_without_cookie_is_forbidden() {
        let request = axum::http::Request::builder()
            .method("POST")
            .uri("/")
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from("csrf_token=abc"))
            .unwrap();

        let response = app().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn matching_form_field_passes() {
        let request = axum::http::Request::builder()
            .method("POST")
            .uri("/")
            .header(header::COOKIE, "csrf_token=abc")
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from("text=hello&csrf_token=abc"))
            .unwrap();

        let response = app().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_string(response).await, "abc");
    }

    #[tokio::test]
    async fn matching_header_passes() {
        let request = axum::http::Request::builder()
            .method("POST")
            .uri("/")
            .header(header::COOKIE, "csrf_token=abc")
            .header(CSRF_HEADER, "abc")
            .body(Body::empty())
            .unwrap();

        let response = app().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn mismatched_token_is_forbidden() {
        let request = axum::http::Request::builder()
            .method("POST")
            .uri("/")
            .header(header::COOKIE, "csrf_token=abc")
            .header(CSRF_HEADER, "xyz")
            .body(Body::empty())
            .unwrap();

        let response = app().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }
}
