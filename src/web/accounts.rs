use axum::{
    extract::{Query, State},
    response::{IntoResponse, Redirect, Response},
    Form,
};
use serde::Deserialize;
use std::sync::Arc;
use tower_cookies::{Cookie, Cookies};

use crate::{
    auth::{is_safe_redirect, AuthService, CurrentUser, SESSION_COOKIE},
    csrf::CsrfToken,
    db,
    forms::{FormErrors, LoginForm, SignupForm},
    models::User,
    Result,
};

use super::handlers::render;
use super::templates::{Layout, LoginTemplate, SignupTemplate};
use super::AppState;

const BAD_CREDENTIALS: &str =
    "Please enter a correct username and password. Note that both fields may be case-sensitive.";

const USERNAME_TAKEN: &str = "A user with that username already exists.";

#[derive(Debug, Default, Deserialize)]
pub struct LoginQuery {
    pub next: Option<String>,
}

async fn start_session(state: &AppState, cookies: &Cookies, user: &User) -> Result<()> {
    let token = AuthService::generate_session_token();
    db::sessions::create(&state.db, user.id, &token).await?;
    db::users::record_login(&state.db, user.id).await?;
    cookies.add(AuthService::session_cookie(token));

    tracing::info!(username = %user.username, "User logged in");
    Ok(())
}

pub async fn login_form(
    CurrentUser(viewer): CurrentUser,
    csrf: CsrfToken,
    Query(query): Query<LoginQuery>,
) -> Result<Response> {
    render(&LoginTemplate {
        layout: Layout::new(viewer, csrf),
        form: LoginForm {
            next: query.next.unwrap_or_default(),
            ..LoginForm::default()
        },
        errors: FormErrors::default(),
    })
}

pub async fn login(
    State(state): State<Arc<AppState>>,
    cookies: Cookies,
    csrf: CsrfToken,
    Form(form): Form<LoginForm>,
) -> Result<Response> {
    let errors = match form.clean() {
        Ok((username, password)) => {
            let user = db::users::find_by_username(&state.db, username).await?;
            match user {
                Some(user) if AuthService::verify_password(password, &user.password_hash)? => {
                    start_session(&state, &cookies, &user).await?;

                    let target = if is_safe_redirect(&form.next) {
                        form.next.as_str()
                    } else {
                        "/"
                    };
                    return Ok(Redirect::to(target).into_response());
                }
                _ => {
                    tracing::warn!(username = %username, "Failed login attempt");
                    let mut errors = FormErrors::default();
                    errors.add_non_field(BAD_CREDENTIALS);
                    errors
                }
            }
        }
        Err(errors) => errors,
    };

    render(&LoginTemplate {
        layout: Layout::new(None, csrf),
        form: LoginForm {
            password: String::new(),
            ..form
        },
        errors,
    })
}

pub async fn logout(State(state): State<Arc<AppState>>, cookies: Cookies) -> Result<Response> {
    if let Some(token) = cookies.get(SESSION_COOKIE).map(|c| c.value().to_string()) {
        db::sessions::delete(&state.db, &token).await?;
    }
    cookies.remove(Cookie::build((SESSION_COOKIE, "")).path("/").build());

    Ok(Redirect::to("/").into_response())
}

pub async fn signup_form(CurrentUser(viewer): CurrentUser, csrf: CsrfToken) -> Result<Response> {
    render(&SignupTemplate {
        layout: Layout::new(viewer, csrf),
        form: SignupForm::default(),
        errors: FormErrors::default(),
    })
}

pub async fn signup(
    State(state): State<Arc<AppState>>,
    cookies: Cookies,
    csrf: CsrfToken,
    Form(form): Form<SignupForm>,
) -> Result<Response> {
    let errors = match form.clean() {
        Ok(account) => {
            let password_hash = AuthService::hash_password(&account.password)?;
            let created = db::users::create(
                &state.db,
                &account.username,
                &account.email,
                &password_hash,
            )
            .await;

            match created {
                Ok(user) => {
                    start_session(&state, &cookies, &user).await?;
                    return Ok(Redirect::to("/").into_response());
                }
                Err(e) if e.is_unique_violation() => {
                    let mut errors = FormErrors::default();
                    errors.add("username", USERNAME_TAKEN);
                    errors
                }
                Err(e) => return Err(e),
            }
        }
        Err(errors) => errors,
    };

    render(&SignupTemplate {
        layout: Layout::new(None, csrf),
        form: SignupForm {
            password1: String::new(),
            password2: String::new(),
            ..form
        },
        errors,
    })
}
