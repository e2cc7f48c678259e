/// Integration tests for the pmboard API
///
/// Tests that need PostgreSQL read `DATABASE_URL` and are ignored by default:
///
/// ```bash
/// DATABASE_URL=postgresql://localhost/pmboard_test cargo test -p pmboard-api -- --ignored
/// ```

mod common;

use axum::http::{Method, StatusCode};
use common::{offline_app, send, TestContext};
use pmboard_shared::{
    auth::jwt::{create_token, Claims},
    models::{
        project::{CreateProject, Project},
        task::{CreateTask, Task, TaskPriority, TaskStatus},
        time_log::TimeLog,
    },
};
use serde_json::{json, Value};
use uuid::Uuid;

async fn create_project(ctx: &TestContext, title: &str) -> Project {
    Project::create(
        &ctx.db,
        ctx.owner.id,
        CreateProject {
            title: title.to_string(),
            description: None,
            status: "active".to_string(),
            start_date: None,
            end_date: None,
        },
    )
    .await
    .unwrap()
}

async fn create_task(ctx: &TestContext, project: &Project, title: &str, status: TaskStatus) -> Task {
    Task::create(
        &ctx.db,
        CreateTask {
            title: title.to_string(),
            description: None,
            status,
            priority: TaskPriority::Medium,
            estimated_hours: Some(4.0),
            project_id: project.id,
            assignee_id: Some(ctx.owner.id),
        },
    )
    .await
    .unwrap()
}

fn id_of(body: &Value) -> String {
    body["id"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn test_root_info() {
    let (status, body) = send(&offline_app(), Method::GET, "/", None, None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Project Management Dashboard API");
    assert_eq!(body["docs"], "/docs");
}

#[tokio::test]
async fn test_health_reports_degraded_without_database() {
    let (status, body) = send(&offline_app(), Method::GET, "/health", None, None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "degraded");
    assert_eq!(body["database"], "disconnected");
    assert!(body["pool"]["total_connections"].is_number());
}

#[tokio::test]
async fn test_protected_routes_require_bearer_token() {
    let app = offline_app();

    for uri in ["/users/me", "/projects", "/tasks/my-tasks", "/performance-metrics"] {
        let (status, body) = send(&app, Method::GET, uri, None, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED, "{}", uri);
        assert_eq!(body["message"], "Not authenticated");
    }
}

#[tokio::test]
async fn test_invalid_token_is_rejected() {
    let (status, _) = send(
        &offline_app(),
        Method::GET,
        "/tasks",
        Some("not.a.jwt"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let foreign = create_token(
        &Claims::new(Uuid::new_v4(), chrono::Duration::minutes(5)),
        "some-other-secret-that-is-long-enough",
    )
    .unwrap();
    let (status, _) = send(&offline_app(), Method::GET, "/tasks", Some(&foreign), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_register_validation_errors() {
    let (status, body) = send(
        &offline_app(),
        Method::POST,
        "/auth/register",
        None,
        Some(json!({
            "email": "not-an-email",
            "username": "alice",
            "password": "short"
        })),
    )
    .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"], "validation_error");
    let fields: Vec<&str> = body["details"]
        .as_array()
        .unwrap()
        .iter()
        .map(|d| d["field"].as_str().unwrap())
        .collect();
    assert_eq!(fields, vec!["email", "password"]);
}

#[tokio::test]
async fn test_unknown_route_is_404() {
    let (status, _) = send(&offline_app(), Method::GET, "/nope", None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
#[ignore = "requires a running PostgreSQL database"]
async fn test_register_and_login() {
    let ctx = TestContext::new().await.unwrap();
    let suffix = &Uuid::new_v4().simple().to_string()[..8];
    let username = format!("reg_{}", suffix);

    let (status, user) = send(
        &ctx.app,
        Method::POST,
        "/auth/register",
        None,
        Some(json!({
            "email": format!("{}@example.com", username),
            "username": username,
            "full_name": "Registered User",
            "password": "password123"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(user.get("password_hash").is_none());

    let (status, _) = send(
        &ctx.app,
        Method::POST,
        "/auth/register",
        None,
        Some(json!({
            "email": format!("{}@example.com", username),
            "username": format!("{}_2", username),
            "password": "password123"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let request = axum::http::Request::builder()
        .method(Method::POST)
        .uri("/auth/login")
        .header("content-type", "application/x-www-form-urlencoded")
        .body(axum::body::Body::from(format!(
            "username={}&password=password123",
            username
        )))
        .unwrap();
    let response = tower::ServiceExt::oneshot(ctx.app.clone(), request)
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let token: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(token["token_type"], "bearer");

    let (status, me) = ctx
        .send(Method::GET, "/users/me", token["access_token"].as_str().unwrap(), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(me["username"], username.as_str());

    sqlx::query("DELETE FROM users WHERE username = $1")
        .bind(&username)
        .execute(&ctx.db)
        .await
        .unwrap();
    ctx.cleanup().await.unwrap();
}

#[tokio::test]
#[ignore = "requires a running PostgreSQL database"]
async fn test_project_summary_health() {
    let ctx = TestContext::new().await.unwrap();
    let project = create_project(&ctx, "Summary").await;

    for i in 0..10 {
        let status = if i < 7 {
            TaskStatus::Closed
        } else {
            TaskStatus::InProgress
        };
        create_task(&ctx, &project, &format!("Task {}", i), status).await;
    }

    let uri = format!("/projects/{}/summary", project.id);
    let (status, summary) = ctx.send(Method::GET, &uri, &ctx.owner_token, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(summary["total_tasks"], 10);
    assert_eq!(summary["closed_tasks"], 7);
    assert_eq!(summary["completion_percentage"], 70.0);
    assert_eq!(summary["health_status"], "healthy");
    assert_eq!(summary["total_estimated_hours"], 40.0);

    let (status, _) = ctx.send(Method::GET, &uri, &ctx.other_token, None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let empty = create_project(&ctx, "Empty").await;
    let uri = format!("/projects/{}/summary", empty.id);
    let (_, summary) = ctx.send(Method::GET, &uri, &ctx.owner_token, None).await;
    assert_eq!(summary["total_tasks"], 0);
    assert_eq!(summary["completion_percentage"], 0.0);
    assert_eq!(summary["health_status"], "no_tasks");

    ctx.cleanup().await.unwrap();
}

#[tokio::test]
#[ignore = "requires a running PostgreSQL database"]
async fn test_project_owner_only_mutations_and_cascade() {
    let ctx = TestContext::new().await.unwrap();

    let (status, project) = ctx
        .send(
            Method::POST,
            "/projects",
            &ctx.owner_token,
            Some(json!({ "title": "Website Redesign" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    let project_id = id_of(&project);

    let (status, task) = ctx
        .send(
            Method::POST,
            "/tasks",
            &ctx.owner_token,
            Some(json!({ "title": "Wireframes", "project_id": project_id })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(task["assignee_id"], ctx.owner.id.to_string());
    let task_id: Uuid = id_of(&task).parse().unwrap();

    let (status, _) = ctx
        .send(
            Method::POST,
            &format!("/tasks/{}/time-logs", task_id),
            &ctx.other_token,
            Some(json!({ "hours": 2.0 })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = ctx
        .send(
            Method::POST,
            &format!("/projects/{}/comments", project_id),
            &ctx.other_token,
            Some(json!({ "content": "Looks good" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let tasks_uri = format!("/projects/{}/tasks", project_id);
    let (status, tasks) = ctx.send(Method::GET, &tasks_uri, &ctx.owner_token, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(tasks.as_array().map(Vec::len), Some(1));

    let (status, body) = ctx.send(Method::GET, &tasks_uri, &ctx.other_token, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Project not found");

    let uri = format!("/projects/{}", project_id);
    let (status, _) = ctx
        .send(Method::PUT, &uri, &ctx.other_token, Some(json!({ "title": "Hijacked" })))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = ctx
        .send(Method::DELETE, &format!("/tasks/{}", task_id), &ctx.other_token, None)
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = ctx.send(Method::DELETE, &uri, &ctx.other_token, None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = ctx.send(Method::DELETE, &uri, &ctx.owner_token, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Project deleted successfully");

    assert!(Task::find_by_id(&ctx.db, task_id).await.unwrap().is_none());
    assert!(TimeLog::list_by_task(&ctx.db, task_id).await.unwrap().is_empty());
    let (status, _) = ctx.send(Method::GET, &uri, &ctx.owner_token, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    ctx.cleanup().await.unwrap();
}

#[tokio::test]
#[ignore = "requires a running PostgreSQL database"]
async fn test_actual_hours_track_time_logs() {
    let ctx = TestContext::new().await.unwrap();
    let project = create_project(&ctx, "Hours").await;
    let task = create_task(&ctx, &project, "Backend", TaskStatus::Todo).await;

    let mut ids = Vec::new();
    for hours in [2.5, 1.5] {
        let (status, log) = ctx
            .send(
                Method::POST,
                "/timelog",
                &ctx.owner_token,
                Some(json!({ "task_id": task.id, "hours": hours, "date": "2025-03-10" })),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        ids.push(id_of(&log));
    }
    let actual = |t: Option<Task>| t.unwrap().actual_hours;
    assert_eq!(actual(Task::find_by_id(&ctx.db, task.id).await.unwrap()), 4.0);

    let (status, _) = ctx
        .send(
            Method::PUT,
            &format!("/timelog/{}", ids[0]),
            &ctx.other_token,
            Some(json!({ "hours": 3.5 })),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = ctx
        .send(
            Method::PUT,
            &format!("/timelog/{}", ids[0]),
            &ctx.owner_token,
            Some(json!({ "hours": 3.5 })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(actual(Task::find_by_id(&ctx.db, task.id).await.unwrap()), 5.0);

    let (status, _) = ctx
        .send(Method::DELETE, &format!("/timelog/{}", ids[1]), &ctx.owner_token, None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(actual(Task::find_by_id(&ctx.db, task.id).await.unwrap()), 3.5);

    let (status, _) = ctx
        .send(Method::POST, "/timelog", &ctx.owner_token, Some(json!({ "hours": 1.0 })))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let uri = format!(
        "/timelog/summary/user/{}?start_date=2025-03-01&end_date=2025-03-31",
        ctx.owner.id
    );
    let (status, summary) = ctx.send(Method::GET, &uri, &ctx.owner_token, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(summary["total_hours"], 3.5);
    assert_eq!(summary["period"]["start_date"], "2025-03-01");

    ctx.cleanup().await.unwrap();
}

#[tokio::test]
#[ignore = "requires a running PostgreSQL database"]
async fn test_comment_targets() {
    let ctx = TestContext::new().await.unwrap();
    let project = create_project(&ctx, "Comments").await;
    let task = create_task(&ctx, &project, "Discuss", TaskStatus::Todo).await;

    let (status, body) = ctx
        .send(
            Method::POST,
            "/comments",
            &ctx.owner_token,
            Some(json!({ "content": "hi", "task_id": task.id, "project_id": project.id })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body["message"],
        "Cannot comment on both task and project simultaneously"
    );

    let (status, body) = ctx
        .send(Method::POST, "/comments", &ctx.owner_token, Some(json!({ "content": "hi" })))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Either task_id or project_id must be provided");

    let (status, _) = ctx
        .send(
            Method::POST,
            "/comments",
            &ctx.owner_token,
            Some(json!({ "content": "hi", "task_id": Uuid::new_v4() })),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, comment) = ctx
        .send(
            Method::POST,
            "/comments",
            &ctx.owner_token,
            Some(json!({ "content": "First!", "task_id": task.id })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(comment["author"]["username"], ctx.owner.username.as_str());
    let comment_uri = format!("/comments/{}", id_of(&comment));

    let (status, _) = ctx
        .send(Method::PUT, &comment_uri, &ctx.other_token, Some(json!({ "content": "edit" })))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (_, listed) = ctx
        .send(Method::GET, &format!("/comments/task/{}", task.id), &ctx.other_token, None)
        .await;
    assert_eq!(listed.as_array().unwrap().len(), 1);

    let (status, _) = ctx.send(Method::DELETE, &comment_uri, &ctx.owner_token, None).await;
    assert_eq!(status, StatusCode::OK);

    ctx.cleanup().await.unwrap();
}

#[tokio::test]
#[ignore = "requires a running PostgreSQL database"]
async fn test_task_update_sends_one_notification() {
    let ctx = TestContext::new().await.unwrap();
    let project = create_project(&ctx, "Notifications").await;
    let task = create_task(&ctx, &project, "Ship it", TaskStatus::InTest).await;
    let uri = format!("/tasks/{}", task.id);

    // Completion and reassignment in one update: completion wins
    let (status, body) = ctx
        .send(
            Method::PUT,
            &uri,
            &ctx.other_token,
            Some(json!({ "status": "closed", "assignee_id": ctx.other.id })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "closed");
    assert_eq!(body["assignee_username"], ctx.other.username.as_str());

    let emails = ctx.emails_after(1).await;
    assert_eq!(emails.len(), 1);
    assert_eq!(emails[0].to, ctx.other.email);
    assert_eq!(emails[0].subject, "Task Completed: Ship it");

    let (status, _) = ctx
        .send(
            Method::PUT,
            &uri,
            &ctx.other_token,
            Some(json!({ "priority": "high", "estimated_hours": null })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    let emails = ctx.emails_after(2).await;
    assert_eq!(emails.len(), 2);
    assert_eq!(emails[1].subject, "Task Updated: Ship it");
    assert!(emails[1]
        .html_body
        .contains("Multiple fields updated: Estimated Hours to none, Priority to high"));

    let stored = Task::find_by_id(&ctx.db, task.id).await.unwrap().unwrap();
    assert_eq!(stored.estimated_hours, None);

    // Reassignment alone sends one assignment notice to the actor
    let (status, body) = ctx
        .send(Method::PUT, &uri, &ctx.other_token, Some(json!({ "assignee_id": ctx.owner.id })))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["assignee_username"], ctx.owner.username.as_str());

    let emails = ctx.emails_after(3).await;
    assert_eq!(emails.len(), 3);
    assert_eq!(emails[2].to, ctx.other.email);
    assert_eq!(emails[2].subject, "New Task Assigned: Ship it");

    let (status, _) = ctx
        .send(Method::PUT, &uri, &ctx.other_token, Some(json!({ "assignee_id": Uuid::new_v4() })))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    ctx.cleanup().await.unwrap();
}

#[tokio::test]
#[ignore = "requires a running PostgreSQL database"]
async fn test_task_creation_notifies_other_assignee() {
    let ctx = TestContext::new().await.unwrap();
    let project = create_project(&ctx, "Assignments").await;

    let (status, _) = ctx
        .send(
            Method::POST,
            "/tasks",
            &ctx.owner_token,
            Some(json!({ "title": "Self", "project_id": project.id })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, task) = ctx
        .send(
            Method::POST,
            "/tasks",
            &ctx.owner_token,
            Some(json!({
                "title": "Delegated",
                "project_id": project.id,
                "assignee_id": ctx.other.id
            })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(task["assignee_id"], ctx.other.id.to_string());

    let emails = ctx.emails_after(1).await;
    assert_eq!(emails.len(), 1);
    assert_eq!(emails[0].to, ctx.other.email);
    assert_eq!(emails[0].subject, "New Task Assigned: Delegated");

    let (_, stats) = ctx
        .send(Method::GET, "/tasks/my-tasks/stats", &ctx.other_token, None)
        .await;
    assert_eq!(stats["total_tasks"], 1);
    assert_eq!(stats["todo"], 1);

    ctx.cleanup().await.unwrap();
}
