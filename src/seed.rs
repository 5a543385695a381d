//! Fixture data for the guest demo account and the automated-test account,
//! plus the full database reset used for test isolation.

use sqlx::{PgPool, Postgres, Transaction};

use crate::db;
use crate::db::issues::NewIssue;
use crate::error::ApiError;
use crate::models::issue::strip_tags;
use crate::models::{Project, User};

struct UserFixture {
    name: &'static str,
    email: &'static str,
    avatar_url: &'static str,
}

struct IssueFixture {
    title: &'static str,
    issue_type: &'static str,
    status: &'static str,
    priority: &'static str,
    list_position: f64,
    description: Option<&'static str>,
    estimate: Option<i32>,
    time_spent: Option<i32>,
    time_remaining: Option<i32>,
    /// Index into the fixture users.
    reporter: usize,
    /// Indexes into the fixture users.
    assignees: &'static [usize],
}

/// Demo project with three users, six issues spread over all four columns,
/// and a few comments. Returns the user the guest token is issued for.
pub async fn create_guest_account(pool: &PgPool) -> Result<User, sqlx::Error> {
    let mut tx = pool.begin().await?;

    let project = db::projects::create(
        &mut *tx,
        "singularity 1.0",
        Some("https://www.example.com/taskboard"),
        Some(
            "Plan, track, and manage your agile and software development projects. \
             Customize your workflow, collaborate, and release great software.",
        ),
        "software",
    )
    .await?;

    let users = create_users(
        &mut tx,
        &project,
        &[
            UserFixture {
                name: "Pickle Rick",
                email: "rick@taskboard.guest",
                avatar_url: "https://i.ibb.co/7JM1P2r/picke-rick.jpg",
            },
            UserFixture {
                name: "Baby Yoda",
                email: "yoda@taskboard.guest",
                avatar_url: "https://i.ibb.co/6n0hLML/baby-yoda.jpg",
            },
            UserFixture {
                name: "Lord Gaben",
                email: "gaben@taskboard.guest",
                avatar_url: "https://i.ibb.co/6RJ5hq6/gaben.jpg",
            },
        ],
    )
    .await?;

    let issue_fixtures = [
        IssueFixture {
            title: "This is an issue of type: Task.",
            issue_type: "task",
            status: "backlog",
            priority: "4",
            list_position: 1.0,
            description: Some("<p>Issue description for task.</p>"),
            estimate: Some(8),
            time_spent: Some(4),
            time_remaining: Some(4),
            reporter: 1,
            assignees: &[0],
        },
        IssueFixture {
            title: "Click on an issue to see what's behind it.",
            issue_type: "task",
            status: "backlog",
            priority: "2",
            list_position: 2.0,
            description: Some("<p>Open issue details modal for full context.</p>"),
            estimate: Some(5),
            time_spent: Some(2),
            time_remaining: Some(3),
            reporter: 2,
            assignees: &[0],
        },
        IssueFixture {
            title: "Try dragging issues to different columns.",
            issue_type: "story",
            status: "selected",
            priority: "3",
            list_position: 1.0,
            description: Some("<p>Move me across columns to update status.</p>"),
            estimate: Some(15),
            time_spent: Some(7),
            time_remaining: Some(8),
            reporter: 1,
            assignees: &[1],
        },
        IssueFixture {
            title: "Each issue can have multiple assignees.",
            issue_type: "story",
            status: "selected",
            priority: "5",
            list_position: 2.0,
            description: Some("<p>Assign both Pickle Rick and Lord Gaben.</p>"),
            estimate: Some(10),
            time_spent: Some(5),
            time_remaining: Some(5),
            reporter: 0,
            assignees: &[0, 2],
        },
        IssueFixture {
            title: "Track spent and remaining time.",
            issue_type: "task",
            status: "inprogress",
            priority: "1",
            list_position: 1.0,
            description: Some("<p>Time tracking is available in issue details.</p>"),
            estimate: Some(12),
            time_spent: Some(11),
            time_remaining: Some(1),
            reporter: 0,
            assignees: &[2],
        },
        IssueFixture {
            title: "Try leaving a comment on this issue.",
            issue_type: "task",
            status: "done",
            priority: "3",
            list_position: 1.0,
            description: Some("<p>Comments help teams collaborate asynchronously.</p>"),
            estimate: Some(6),
            time_spent: Some(6),
            time_remaining: Some(0),
            reporter: 2,
            assignees: &[1],
        },
    ];

    let mut issue_ids = Vec::with_capacity(issue_fixtures.len());
    for fixture in &issue_fixtures {
        let issue = create_issue(&mut tx, &project, &users, fixture).await?;
        issue_ids.push(issue.id);
    }

    let comments = [
        (
            "An old silent pond...\nA frog jumps into the pond,\nsplash! Silence again.",
            issue_ids[0],
            users[2].id,
        ),
        (
            "Autumn moonlight-\na worm digs silently\ninto the chestnut.",
            issue_ids[1],
            users[2].id,
        ),
        (
            "In the twilight rain\nthese brilliant-hued hibiscus -\nA lovely sunset.",
            issue_ids[2],
            users[1].id,
        ),
    ];
    for (body, issue_id, user_id) in comments {
        db::comments::create(&mut *tx, body, user_id, issue_id).await?;
    }

    tx.commit().await?;
    Ok(users.into_iter().nth(2).expect("guest fixture has three users"))
}

/// Minimal fixture used by the automated-test account endpoint. Returns the
/// user the test token is issued for.
pub async fn create_test_account(pool: &PgPool) -> Result<User, sqlx::Error> {
    let mut tx = pool.begin().await?;

    let project = db::projects::create(
        &mut *tx,
        "Project name",
        Some("https://www.testurl.com"),
        Some("Project description"),
        "software",
    )
    .await?;

    let users = create_users(
        &mut tx,
        &project,
        &[
            UserFixture {
                name: "Gaben",
                email: "gaben@taskboard.test",
                avatar_url: "https://i.ibb.co/6RJ5hq6/gaben.jpg",
            },
            UserFixture {
                name: "Yoda",
                email: "yoda@taskboard.test",
                avatar_url: "https://i.ibb.co/6n0hLML/baby-yoda.jpg",
            },
        ],
    )
    .await?;

    let issue = create_issue(
        &mut tx,
        &project,
        &users,
        &IssueFixture {
            title: "Issue title 1",
            issue_type: "task",
            status: "backlog",
            priority: "1",
            list_position: 1.0,
            description: None,
            estimate: None,
            time_spent: None,
            time_remaining: None,
            reporter: 0,
            assignees: &[0],
        },
    )
    .await?;

    db::comments::create(&mut *tx, "Comment body", users[0].id, issue.id).await?;

    tx.commit().await?;
    Ok(users.into_iter().next().expect("test fixture has two users"))
}

/// Drops everything in the public schema and replays the migrations, leaving
/// an empty database in the shape the server boots with.
pub async fn reset_database(pool: &PgPool) -> Result<(), ApiError> {
    sqlx::query("DROP SCHEMA public CASCADE").execute(pool).await?;
    sqlx::query("CREATE SCHEMA public").execute(pool).await?;
    crate::MIGRATOR
        .run(pool)
        .await
        .map_err(|e| ApiError::Internal(format!("migration replay failed: {e}")))?;
    Ok(())
}

async fn create_users(
    tx: &mut Transaction<'_, Postgres>,
    project: &Project,
    fixtures: &[UserFixture],
) -> Result<Vec<User>, sqlx::Error> {
    let mut users = Vec::with_capacity(fixtures.len());
    for fixture in fixtures {
        let user = db::users::create(
            &mut **tx,
            fixture.name,
            fixture.email,
            fixture.avatar_url,
            Some(project.id),
        )
        .await?;
        users.push(user);
    }
    Ok(users)
}

async fn create_issue(
    tx: &mut Transaction<'_, Postgres>,
    project: &Project,
    users: &[User],
    fixture: &IssueFixture,
) -> Result<crate::models::Issue, sqlx::Error> {
    let issue = db::issues::create(
        &mut **tx,
        &NewIssue {
            title: fixture.title.to_string(),
            issue_type: fixture.issue_type.to_string(),
            status: fixture.status.to_string(),
            priority: fixture.priority.to_string(),
            list_position: fixture.list_position,
            description: fixture.description.map(str::to_string),
            description_text: fixture.description.map(strip_tags),
            estimate: fixture.estimate,
            time_spent: fixture.time_spent,
            time_remaining: fixture.time_remaining,
            reporter_id: users[fixture.reporter].id,
            project_id: project.id,
        },
    )
    .await?;

    let assignee_ids: Vec<i64> = fixture.assignees.iter().map(|&i| users[i].id).collect();
    db::issues::replace_assignees(&mut **tx, issue.id, &assignee_ids).await?;

    Ok(issue)
}
