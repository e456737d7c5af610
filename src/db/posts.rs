//! Post queries. Listings are ordered newest first, ties broken by id.

use sqlx::PgPool;
use uuid::Uuid;

use crate::forms::PostDraft;
use crate::models::{Post, PostCard};

const POST_COLUMNS: &str = "id, text, pub_date, author_id, group_id, image";

const CARD_SELECT: &str = "SELECT p.id, p.text, p.pub_date, p.image,
        u.id AS author_id, u.username AS author_username, u.email AS author_email,
        g.id AS group_id, g.title AS group_title, g.slug AS group_slug
    FROM posts p
    JOIN users u ON u.id = p.author_id
    LEFT JOIN groups g ON g.id = p.group_id";

const CARD_ORDER: &str = "ORDER BY p.pub_date DESC, p.id DESC";

pub async fn count(db: &PgPool) -> crate::Result<i64> {
    let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM posts")
        .fetch_one(db)
        .await?;
    Ok(total)
}

pub async fn list(db: &PgPool, limit: i64, offset: i64) -> crate::Result<Vec<PostCard>> {
    let posts = sqlx::query_as::<_, PostCard>(&format!(
        "{CARD_SELECT} {CARD_ORDER} LIMIT $1 OFFSET $2"
    ))
    .bind(limit)
    .bind(offset)
    .fetch_all(db)
    .await?;

    Ok(posts)
}

pub async fn count_by_group(db: &PgPool, group_id: i64) -> crate::Result<i64> {
    let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM posts WHERE group_id = $1")
        .bind(group_id)
        .fetch_one(db)
        .await?;
    Ok(total)
}

pub async fn list_by_group(
    db: &PgPool,
    group_id: i64,
    limit: i64,
    offset: i64,
) -> crate::Result<Vec<PostCard>> {
    let posts = sqlx::query_as::<_, PostCard>(&format!(
        "{CARD_SELECT} WHERE p.group_id = $1 {CARD_ORDER} LIMIT $2 OFFSET $3"
    ))
    .bind(group_id)
    .bind(limit)
    .bind(offset)
    .fetch_all(db)
    .await?;

    Ok(posts)
}

pub async fn count_by_author(db: &PgPool, author_id: Uuid) -> crate::Result<i64> {
    let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM posts WHERE author_id = $1")
        .bind(author_id)
        .fetch_one(db)
        .await?;
    Ok(total)
}

pub async fn list_by_author(
    db: &PgPool,
    author_id: Uuid,
    limit: i64,
    offset: i64,
) -> crate::Result<Vec<PostCard>> {
    let posts = sqlx::query_as::<_, PostCard>(&format!(
        "{CARD_SELECT} WHERE p.author_id = $1 {CARD_ORDER} LIMIT $2 OFFSET $3"
    ))
    .bind(author_id)
    .bind(limit)
    .bind(offset)
    .fetch_all(db)
    .await?;

    Ok(posts)
}

pub async fn find(db: &PgPool, id: i64) -> crate::Result<Option<Post>> {
    let post = sqlx::query_as::<_, Post>(&format!(
        "SELECT {POST_COLUMNS} FROM posts WHERE id = $1"
    ))
    .bind(id)
    .fetch_optional(db)
    .await?;

    Ok(post)
}

pub async fn find_card(db: &PgPool, id: i64) -> crate::Result<Option<PostCard>> {
    let post = sqlx::query_as::<_, PostCard>(&format!("{CARD_SELECT} WHERE p.id = $1"))
        .bind(id)
        .fetch_optional(db)
        .await?;

    Ok(post)
}

pub async fn create(db: &PgPool, author_id: Uuid, draft: &PostDraft) -> crate::Result<Post> {
    let post = sqlx::query_as::<_, Post>(&format!(
        "INSERT INTO posts (text, author_id, group_id) VALUES ($1, $2, $3)
         RETURNING {POST_COLUMNS}"
    ))
    .bind(&draft.text)
    .bind(author_id)
    .bind(draft.group_id)
    .fetch_one(db)
    .await?;

    tracing::info!(post_id = post.id, author_id = %author_id, "Post created");
    Ok(post)
}

/// Applies a draft to an existing post. `pub_date` and `author_id` are
/// never touched.
pub async fn update(db: &PgPool, id: i64, draft: &PostDraft) -> crate::Result<Post> {
    let post = sqlx::query_as::<_, Post>(&format!(
        "UPDATE posts SET text = $1, group_id = $2 WHERE id = $3
         RETURNING {POST_COLUMNS}"
    ))
    .bind(&draft.text)
    .bind(draft.group_id)
    .bind(id)
    .fetch_optional(db)
    .await?
    .ok_or(crate::Error::NotFound)?;

    tracing::info!(post_id = post.id, "Post updated");
    Ok(post)
}
