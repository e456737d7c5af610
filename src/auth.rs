use std::sync::Arc;

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::SaltString;
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};
use async_trait::async_trait;
use axum::{
    extract::FromRequestParts,
    http::request::Parts,
    response::{IntoResponse, Redirect, Response},
};
use tower_cookies::{cookie::SameSite, Cookie, Cookies};
use uuid::Uuid;

use crate::{db, models::User, web::AppState};

pub const SESSION_COOKIE: &str = "session_id";
pub const LOGIN_URL: &str = "/auth/login/";

pub struct AuthService;

impl AuthService {
    pub fn hash_password(password: &str) -> crate::Result<String> {
        let salt = SaltString::generate(&mut OsRng);
        let argon2 = Argon2::default();

        let password_hash = argon2
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| crate::Error::Internal(format!("Failed to hash password: {}", e)))?
            .to_string();

        Ok(password_hash)
    }

    pub fn verify_password(password: &str, password_hash: &str) -> crate::Result<bool> {
        let parsed_hash = PasswordHash::new(password_hash)
            .map_err(|e| crate::Error::Internal(format!("Invalid password hash: {}", e)))?;

        let argon2 = Argon2::default();

        Ok(argon2
            .verify_password(password.as_bytes(), &parsed_hash)
            .is_ok())
    }

    pub fn generate_session_token() -> String {
        Uuid::new_v4().to_string()
    }

    pub fn session_cookie(token: String) -> Cookie<'static> {
        Cookie::build((SESSION_COOKIE, token))
            .path("/")
            .http_only(true)
            .same_site(SameSite::Lax)
            .build()
    }
}

/// Builds the login redirect target, keeping `/` readable in `next`.
pub fn login_url(next: &str) -> String {
    let encoded: String = url::form_urlencoded::byte_serialize(next.as_bytes()).collect();
    format!("{}?next={}", LOGIN_URL, encoded.replace("%2F", "/"))
}

/// Only same-site absolute paths are followed after login.
pub fn is_safe_redirect(target: &str) -> bool {
    target.starts_with('/')
        && !target.starts_with("//")
        && !target.starts_with("/\\")
        && target.bytes().all(|b| b.is_ascii_graphic())
}

/// The user behind the request's session cookie, if any.
pub struct CurrentUser(pub Option<User>);

#[async_trait]
impl FromRequestParts<Arc<AppState>> for CurrentUser {
    type Rejection = Response;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let cookies = Cookies::from_request_parts(parts, state)
            .await
            .map_err(IntoResponse::into_response)?;

        let Some(token) = cookies.get(SESSION_COOKIE).map(|c| c.value().to_string()) else {
            return Ok(Self(None));
        };

        let user = db::sessions::find_user(&state.db, &token)
            .await
            .map_err(IntoResponse::into_response)?;

        if user.is_none() {
            tracing::debug!("Ignoring unknown or expired session");
        }

        Ok(Self(user))
    }
}

/// Like [`CurrentUser`], but anonymous requests are redirected to the login
/// page with the original path in `next`.
pub struct RequireUser(pub User);

#[async_trait]
impl FromRequestParts<Arc<AppState>> for RequireUser {
    type Rejection = Response;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        match CurrentUser::from_request_parts(parts, state).await? {
            CurrentUser(Some(user)) => Ok(Self(user)),
            CurrentUser(None) => {
                let next = parts
                    .uri
                    .path_and_query()
                    .map(|pq| pq.as_str())
                    .unwrap_or(parts.uri.path());
                Err(Redirect::to(&login_url(next)).into_response())
            }
        }
    }
}
