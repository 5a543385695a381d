use sqlx::{PgConnection, PgPool};

use crate::models::{Issue, User};

pub struct NewIssue {
    pub title: String,
    pub issue_type: String,
    pub status: String,
    pub priority: String,
    pub list_position: f64,
    pub description: Option<String>,
    pub description_text: Option<String>,
    pub estimate: Option<i32>,
    pub time_spent: Option<i32>,
    pub time_remaining: Option<i32>,
    pub reporter_id: i64,
    pub project_id: i64,
}

pub async fn create<'e, E: sqlx::PgExecutor<'e>>(
    executor: E,
    new: &NewIssue,
) -> Result<Issue, sqlx::Error> {
    sqlx::query_as::<_, Issue>(
        "INSERT INTO issues (title, type, status, priority, list_position, description,
                             description_text, estimate, time_spent, time_remaining,
                             reporter_id, project_id)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12) RETURNING *",
    )
    .bind(&new.title)
    .bind(&new.issue_type)
    .bind(&new.status)
    .bind(&new.priority)
    .bind(new.list_position)
    .bind(&new.description)
    .bind(&new.description_text)
    .bind(new.estimate)
    .bind(new.time_spent)
    .bind(new.time_remaining)
    .bind(new.reporter_id)
    .bind(new.project_id)
    .fetch_one(executor)
    .await
}

pub async fn find_by_id(pool: &PgPool, id: i64) -> Result<Option<Issue>, sqlx::Error> {
    sqlx::query_as::<_, Issue>("SELECT * FROM issues WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub async fn list_by_project(
    pool: &PgPool,
    project_id: i64,
    search: Option<&str>,
) -> Result<Vec<Issue>, sqlx::Error> {
    match search {
        Some(term) => {
            sqlx::query_as::<_, Issue>(
                "SELECT * FROM issues
                 WHERE project_id = $1 AND (title ILIKE $2 OR description_text ILIKE $2)
                 ORDER BY id",
            )
            .bind(project_id)
            .bind(format!("%{term}%"))
            .fetch_all(pool)
            .await
        }
        None => {
            sqlx::query_as::<_, Issue>(
                "SELECT * FROM issues WHERE project_id = $1 ORDER BY id",
            )
            .bind(project_id)
            .fetch_all(pool)
            .await
        }
    }
}

/// Lowest list position within a (project, status) column, or `None` when the
/// column is empty. New issues are prepended by going one below this.
pub async fn min_list_position<'e, E: sqlx::PgExecutor<'e>>(
    executor: E,
    project_id: i64,
    status: &str,
) -> Result<Option<f64>, sqlx::Error> {
    sqlx::query_scalar::<_, Option<f64>>(
        "SELECT MIN(list_position) FROM issues WHERE project_id = $1 AND status = $2",
    )
    .bind(project_id)
    .bind(status)
    .fetch_one(executor)
    .await
}

/// Writes every mutable column back from the struct; callers mutate the
/// loaded `Issue` and persist it wholesale.
pub async fn update<'e, E: sqlx::PgExecutor<'e>>(
    executor: E,
    issue: &Issue,
) -> Result<Issue, sqlx::Error> {
    sqlx::query_as::<_, Issue>(
        "UPDATE issues SET title = $2, type = $3, status = $4, priority = $5,
                           list_position = $6, description = $7, description_text = $8,
                           estimate = $9, time_spent = $10, time_remaining = $11,
                           reporter_id = $12, project_id = $13, updated_at = now()
         WHERE id = $1 RETURNING *",
    )
    .bind(issue.id)
    .bind(&issue.title)
    .bind(&issue.issue_type)
    .bind(&issue.status)
    .bind(&issue.priority)
    .bind(issue.list_position)
    .bind(&issue.description)
    .bind(&issue.description_text)
    .bind(issue.estimate)
    .bind(issue.time_spent)
    .bind(issue.time_remaining)
    .bind(issue.reporter_id)
    .bind(issue.project_id)
    .fetch_one(executor)
    .await
}

pub async fn delete(pool: &PgPool, id: i64) -> Result<(), sqlx::Error> {
    sqlx::query("DELETE FROM issues WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(())
}

/// Full replace of the assignee set. Runs two statements, so it takes a
/// connection and is expected to be called inside a transaction.
pub async fn replace_assignees(
    conn: &mut PgConnection,
    issue_id: i64,
    user_ids: &[i64],
) -> Result<(), sqlx::Error> {
    sqlx::query("DELETE FROM issue_users WHERE issue_id = $1")
        .bind(issue_id)
        .execute(&mut *conn)
        .await?;

    for user_id in user_ids {
        sqlx::query("INSERT INTO issue_users (issue_id, user_id) VALUES ($1, $2)")
            .bind(issue_id)
            .bind(user_id)
            .execute(&mut *conn)
            .await?;
    }

    Ok(())
}

pub async fn assignees(pool: &PgPool, issue_id: i64) -> Result<Vec<User>, sqlx::Error> {
    sqlx::query_as::<_, User>(
        "SELECT u.* FROM users u
         JOIN issue_users iu ON iu.user_id = u.id
         WHERE iu.issue_id = $1 ORDER BY u.id",
    )
    .bind(issue_id)
    .fetch_all(pool)
    .await
}

/// (issue_id, user_id) pairs for a batch of issues, for shaping list views
/// without one query per issue.
pub async fn assignee_pairs(
    pool: &PgPool,
    issue_ids: &[i64],
) -> Result<Vec<(i64, i64)>, sqlx::Error> {
    sqlx::query_as::<_, (i64, i64)>(
        "SELECT issue_id, user_id FROM issue_users WHERE issue_id = ANY($1) ORDER BY user_id",
    )
    .bind(issue_ids)
    .fetch_all(pool)
    .await
}
