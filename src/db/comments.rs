use sqlx::PgPool;

use crate::models::Comment;

pub async fn create<'e, E: sqlx::PgExecutor<'e>>(
    executor: E,
    body: &str,
    user_id: i64,
    issue_id: i64,
) -> Result<Comment, sqlx::Error> {
    sqlx::query_as::<_, Comment>(
        "INSERT INTO comments (body, user_id, issue_id) VALUES ($1, $2, $3) RETURNING *",
    )
    .bind(body)
    .bind(user_id)
    .bind(issue_id)
    .fetch_one(executor)
    .await
}

pub async fn find_by_id(pool: &PgPool, id: i64) -> Result<Option<Comment>, sqlx::Error> {
    sqlx::query_as::<_, Comment>("SELECT * FROM comments WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub async fn list_by_issue(pool: &PgPool, issue_id: i64) -> Result<Vec<Comment>, sqlx::Error> {
    sqlx::query_as::<_, Comment>(
        "SELECT * FROM comments WHERE issue_id = $1 ORDER BY created_at ASC NULLS FIRST",
    )
    .bind(issue_id)
    .fetch_all(pool)
    .await
}

pub async fn update_body(pool: &PgPool, id: i64, body: &str) -> Result<Comment, sqlx::Error> {
    sqlx::query_as::<_, Comment>(
        "UPDATE comments SET body = $2, updated_at = now() WHERE id = $1 RETURNING *",
    )
    .bind(id)
    .bind(body)
    .fetch_one(pool)
    .await
}

pub async fn delete(pool: &PgPool, id: i64) -> Result<(), sqlx::Error> {
    sqlx::query("DELETE FROM comments WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(())
}
