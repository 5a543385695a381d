//! Shapes persisted entities into the JSON the API returns. Keys are
//! camelCase, timestamps RFC 3339, and assignee id lists always sort
//! ascending so output is stable regardless of assignment order.

use std::collections::HashMap;

use serde_json::{Value, json};

use crate::models::{Comment, Issue, Project, User};

pub fn serialize_user(user: &User) -> Value {
    json!({
        "id": user.id,
        "name": user.name,
        "email": user.email,
        "avatarUrl": user.avatar_url,
        "createdAt": user.created_at.to_rfc3339(),
        "updatedAt": user.updated_at.to_rfc3339(),
        "projectId": user.project_id,
    })
}

pub fn serialize_comment(comment: &Comment, author: Option<&User>) -> Value {
    let mut data = json!({
        "id": comment.id,
        "body": comment.body,
        "createdAt": comment.created_at.to_rfc3339(),
        "updatedAt": comment.updated_at.to_rfc3339(),
        "userId": comment.user_id,
        "issueId": comment.issue_id,
    });
    if let Some(author) = author {
        data["user"] = serialize_user(author);
    }
    data
}

/// Listing shape used when issues are nested under a project.
pub fn serialize_issue_partial(issue: &Issue, user_ids: &[i64]) -> Value {
    json!({
        "id": issue.id,
        "title": issue.title,
        "type": issue.issue_type,
        "status": issue.status,
        "priority": issue.priority,
        "listPosition": issue.list_position,
        "createdAt": issue.created_at.to_rfc3339(),
        "updatedAt": issue.updated_at.to_rfc3339(),
        "userIds": sorted(user_ids),
    })
}

pub fn serialize_issue(issue: &Issue, user_ids: &[i64]) -> Value {
    json!({
        "id": issue.id,
        "title": issue.title,
        "type": issue.issue_type,
        "status": issue.status,
        "priority": issue.priority,
        "listPosition": issue.list_position,
        "description": issue.description,
        "descriptionText": issue.description_text,
        "estimate": issue.estimate,
        "timeSpent": issue.time_spent,
        "timeRemaining": issue.time_remaining,
        "createdAt": issue.created_at.to_rfc3339(),
        "updatedAt": issue.updated_at.to_rfc3339(),
        "reporterId": issue.reporter_id,
        "projectId": issue.project_id,
        "userIds": sorted(user_ids),
    })
}

/// Full shape with nested assignee users, and optionally the comment thread
/// with each comment's author.
pub fn serialize_issue_detail(
    issue: &Issue,
    users: &[User],
    comments: Option<&[(Comment, User)]>,
) -> Value {
    let user_ids: Vec<i64> = users.iter().map(|user| user.id).collect();
    let mut data = serialize_issue(issue, &user_ids);
    data["users"] = Value::Array(users.iter().map(serialize_user).collect());
    if let Some(comments) = comments {
        data["comments"] = Value::Array(
            comments
                .iter()
                .map(|(comment, author)| serialize_comment(comment, Some(author)))
                .collect(),
        );
    }
    data
}

pub fn serialize_project_basic(project: &Project) -> Value {
    json!({
        "id": project.id,
        "name": project.name,
        "url": project.url,
        "description": project.description,
        "category": project.category,
        "createdAt": project.created_at.to_rfc3339(),
        "updatedAt": project.updated_at.to_rfc3339(),
    })
}

/// Project with its members and issues in partial form; `assignees` maps
/// issue id to assignee user ids.
pub fn serialize_project(
    project: &Project,
    users: &[User],
    issues: &[Issue],
    assignees: &HashMap<i64, Vec<i64>>,
) -> Value {
    let mut data = serialize_project_basic(project);
    data["users"] = Value::Array(users.iter().map(serialize_user).collect());
    data["issues"] = Value::Array(
        issues
            .iter()
            .map(|issue| {
                let user_ids = assignees.get(&issue.id).map(Vec::as_slice).unwrap_or(&[]);
                serialize_issue_partial(issue, user_ids)
            })
            .collect(),
    );
    data
}

fn sorted(ids: &[i64]) -> Vec<i64> {
    let mut ids = ids.to_vec();
    ids.sort_unstable();
    ids
}
