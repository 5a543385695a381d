use sqlx::PgPool;

use crate::models::Project;

pub async fn create<'e, E: sqlx::PgExecutor<'e>>(
    executor: E,
    name: &str,
    url: Option<&str>,
    description: Option<&str>,
    category: &str,
) -> Result<Project, sqlx::Error> {
    sqlx::query_as::<_, Project>(
        "INSERT INTO projects (name, url, description, category)
         VALUES ($1, $2, $3, $4) RETURNING *",
    )
    .bind(name)
    .bind(url)
    .bind(description)
    .bind(category)
    .fetch_one(executor)
    .await
}

pub async fn find_by_id(pool: &PgPool, id: i64) -> Result<Option<Project>, sqlx::Error> {
    sqlx::query_as::<_, Project>("SELECT * FROM projects WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub async fn update(
    pool: &PgPool,
    id: i64,
    name: &str,
    url: Option<&str>,
    description: Option<&str>,
    category: &str,
) -> Result<Project, sqlx::Error> {
    sqlx::query_as::<_, Project>(
        "UPDATE projects SET name = $2, url = $3, description = $4, category = $5,
         updated_at = now()
         WHERE id = $1 RETURNING *",
    )
    .bind(id)
    .bind(name)
    .bind(url)
    .bind(description)
    .bind(category)
    .fetch_one(pool)
    .await
}
