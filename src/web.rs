mod accounts;
mod handlers;
mod routes;
pub mod templates;


use axum::{
    extract::{Request, State},
    middleware::{self, Next},
    response::Response,
    Router,
};
use sqlx::PgPool;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_cookies::{CookieManagerLayer, Cookies};
use tower_http::{services::ServeDir, trace::TraceLayer};

use crate::{
    auth::SESSION_COOKIE,
    csrf::{self, CsrfToken},
    db,
    error::{render_not_found, NotFoundPage},
    Config,
};

use self::templates::Layout;

#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub page_limit: u32,
}

impl AppState {
    pub fn new(db: PgPool, page_limit: u32) -> Arc<Self> {
        Arc::new(Self { db, page_limit })
    }
}

/// The application routes with the cookie, CSRF and tracing layers applied.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .merge(routes::create_routes())
        .fallback(handlers::not_found)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CookieManagerLayer::new())
                .layer(middleware::from_fn(csrf::csrf_protection))
                .layer(middleware::from_fn_with_state(
                    state.clone(),
                    not_found_with_viewer,
                )),
        )
        .with_state(state)
}

/// Re-renders not-found pages with the signed-in user's navigation. The
/// session is only looked up when the response is actually a 404 page.
async fn not_found_with_viewer(
    State(state): State<Arc<AppState>>,
    cookies: Cookies,
    request: Request,
    next: Next,
) -> Response {
    let csrf = request
        .extensions()
        .get::<CsrfToken>()
        .cloned()
        .unwrap_or_default();

    let response = next.run(request).await;
    if response.extensions().get::<NotFoundPage>().is_none() {
        return response;
    }

    let Some(token) = cookies.get(SESSION_COOKIE).map(|c| c.value().to_string()) else {
        return response;
    };

    match db::sessions::find_user(&state.db, &token).await {
        Ok(Some(user)) => render_not_found(Layout::new(Some(user), csrf)),
        Ok(None) => response,
        Err(e) => {
            tracing::warn!("Failed to resolve viewer for 404 page: {}", e);
            response
        }
    }
}

pub async fn serve(config: &Config, state: Arc<AppState>) -> crate::Result<()> {
    let app = router(state)
        .nest_service("/static", ServeDir::new(&config.static_root))
        .nest_service("/media", ServeDir::new(&config.media_root));

    let addr = config.web_addr();
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Web server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| crate::Error::Internal(e.to_string()))?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
