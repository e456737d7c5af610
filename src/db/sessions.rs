use chrono::{Duration, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::{Session, User};

pub const SESSION_LIFETIME_DAYS: i64 = 7;

pub async fn create(db: &PgPool, user_id: Uuid, token: &str) -> crate::Result<Session> {
    let expires_at = Utc::now() + Duration::days(SESSION_LIFETIME_DAYS);

    let session = sqlx::query_as::<_, Session>(
        "INSERT INTO sessions (user_id, token, expires_at) VALUES ($1, $2, $3)
         RETURNING id, user_id, token, created_at, expires_at",
    )
    .bind(user_id)
    .bind(token)
    .bind(expires_at)
    .fetch_one(db)
    .await?;

    Ok(session)
}

/// Returns the owner of an unexpired session.
pub async fn find_user(db: &PgPool, token: &str) -> crate::Result<Option<User>> {
    let user = sqlx::query_as::<_, User>(
        "SELECT u.id, u.username, u.email, u.password_hash, u.created_at, u.last_login_at
         FROM sessions s
         JOIN users u ON u.id = s.user_id
         WHERE s.token = $1 AND s.expires_at > NOW()",
    )
    .bind(token)
    .fetch_optional(db)
    .await?;

    Ok(user)
}

pub async fn delete(db: &PgPool, token: &str) -> crate::Result<()> {
    sqlx::query("DELETE FROM sessions WHERE token = $1")
        .bind(token)
        .execute(db)
        .await?;

    Ok(())
}
