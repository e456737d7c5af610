use sqlx::PgPool;

use crate::models::Group;

pub async fn list(db: &PgPool) -> crate::Result<Vec<Group>> {
    let groups = sqlx::query_as::<_, Group>(
        "SELECT id, title, slug, description FROM groups ORDER BY title, id",
    )
    .fetch_all(db)
    .await?;

    Ok(groups)
}

pub async fn find_by_slug(db: &PgPool, slug: &str) -> crate::Result<Option<Group>> {
    let group = sqlx::query_as::<_, Group>(
        "SELECT id, title, slug, description FROM groups WHERE slug = $1",
    )
    .bind(slug)
    .fetch_optional(db)
    .await?;

    Ok(group)
}

pub async fn create(
    db: &PgPool,
    title: &str,
    slug: &str,
    description: &str,
) -> crate::Result<Group> {
    let group = sqlx::query_as::<_, Group>(
        "INSERT INTO groups (title, slug, description) VALUES ($1, $2, $3)
         RETURNING id, title, slug, description",
    )
    .bind(title)
    .bind(slug)
    .bind(description)
    .fetch_one(db)
    .await?;

    tracing::info!(group_id = group.id, slug = %group.slug, "Group created");
    Ok(group)
}

pub async fn delete(db: &PgPool, id: i64) -> crate::Result<bool> {
    let result = sqlx::query("DELETE FROM groups WHERE id = $1")
        .bind(id)
        .execute(db)
        .await?;

    Ok(result.rows_affected() > 0)
}
