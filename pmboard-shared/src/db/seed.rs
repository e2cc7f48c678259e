/// Demo data
///
/// Loads four users, three projects, twelve tasks, and four time logs. Each
/// table is seeded only while it is empty, so running the seeder twice (or on
/// a database with real data) never duplicates rows. Time logs go through
/// [`TimeLog::create`], which keeps the tasks' `actual_hours` in sync.
///
/// Demo credentials: `yuvasreega/yuvasree`, `testuser/testuser`,
/// `developer1/password123`, `manager1/password123`.

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use sqlx::PgPool;
use tracing::{info, warn};
use uuid::Uuid;

use crate::auth::password::{hash_password, PasswordError};
use crate::models::project::{CreateProject, Project};
use crate::models::task::{CreateTask, Task, TaskPriority, TaskStatus};
use crate::models::time_log::{CreateTimeLog, TimeLog};
use crate::models::user::{CreateUser, User};

#[derive(Debug, thiserror::Error)]
pub enum SeedError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Password hashing failed: {0}")]
    Password(#[from] PasswordError),
}

/// Row counts reported by `GET /seed-status`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SeedStatus {
    pub seed_data_exists: bool,
    pub user_count: i64,
    pub project_count: i64,
    pub task_count: i64,
    pub timelog_count: i64,
}

impl SeedStatus {
    pub async fn load(pool: &PgPool) -> Result<Self, sqlx::Error> {
        let user_count = User::count(pool).await?;

        Ok(Self {
            seed_data_exists: user_count > 0,
            user_count,
            project_count: Project::count(pool).await?,
            task_count: Task::count(pool).await?,
            timelog_count: TimeLog::count(pool).await?,
        })
    }
}

/// Rows inserted by one [`seed`] run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SeedReport {
    pub users: usize,
    pub projects: usize,
    pub tasks: usize,
    pub time_logs: usize,
}

struct SeedUser {
    username: &'static str,
    full_name: &'static str,
    password: &'static str,
}

const USERS: [SeedUser; 4] = [
    SeedUser {
        username: "yuvasreega",
        full_name: "Yuvasree Ganesan",
        password: "yuvasree",
    },
    SeedUser {
        username: "testuser",
        full_name: "Test User",
        password: "testuser",
    },
    SeedUser {
        username: "developer1",
        full_name: "John Developer",
        password: "password123",
    },
    SeedUser {
        username: "manager1",
        full_name: "Sarah Manager",
        password: "password123",
    },
];

struct SeedProject {
    title: &'static str,
    description: &'static str,
    status: &'static str,
    /// Day offsets from now
    starts: i64,
    ends: i64,
    owner: &'static str,
}

const PROJECTS: [SeedProject; 3] = [
    SeedProject {
        title: "E-Commerce Platform Development",
        description: "Build a modern e-commerce platform with React frontend and FastAPI backend. Features include user authentication, product catalog, shopping cart, and payment integration.",
        status: "active",
        starts: -30,
        ends: 60,
        owner: "yuvasreega",
    },
    SeedProject {
        title: "Mobile App for Task Management",
        description: "Develop a cross-platform mobile application for task management using React Native. Include features like task creation, time tracking, and team collaboration.",
        status: "on_hold",
        starts: -15,
        ends: 90,
        owner: "testuser",
    },
    SeedProject {
        title: "AI-Powered Analytics Dashboard",
        description: "Create an intelligent analytics dashboard that uses machine learning to provide insights and predictions. Integrate with various data sources and provide real-time visualizations.",
        status: "active",
        starts: 0,
        ends: 45,
        owner: "manager1",
    },
];

struct SeedTask {
    project: usize,
    title: &'static str,
    description: &'static str,
    status: TaskStatus,
    priority: TaskPriority,
    estimated_hours: f64,
    assignee: &'static str,
}

const TASKS: [SeedTask; 12] = [
    SeedTask {
        project: 0,
        title: "Design User Interface",
        description: "Create wireframes and mockups for the e-commerce platform user interface. Focus on user experience and responsive design.",
        status: TaskStatus::InProgress,
        priority: TaskPriority::High,
        estimated_hours: 16.0,
        assignee: "yuvasreega",
    },
    SeedTask {
        project: 0,
        title: "Implement User Authentication",
        description: "Develop secure user authentication system with JWT tokens, password hashing, and role-based access control.",
        status: TaskStatus::Todo,
        priority: TaskPriority::High,
        estimated_hours: 20.0,
        assignee: "developer1",
    },
    SeedTask {
        project: 0,
        title: "Create Product Catalog API",
        description: "Build RESTful API endpoints for product management including CRUD operations, search, and filtering.",
        status: TaskStatus::InProgress,
        priority: TaskPriority::Medium,
        estimated_hours: 24.0,
        assignee: "developer1",
    },
    SeedTask {
        project: 0,
        title: "Integrate Payment Gateway",
        description: "Integrate Stripe payment gateway for secure online transactions. Implement webhook handling and payment status tracking.",
        status: TaskStatus::Review,
        priority: TaskPriority::Urgent,
        estimated_hours: 18.0,
        assignee: "developer1",
    },
    SeedTask {
        project: 1,
        title: "Setup React Native Environment",
        description: "Configure development environment for React Native, including necessary dependencies and build tools.",
        status: TaskStatus::ReadyToTest,
        priority: TaskPriority::Medium,
        estimated_hours: 8.0,
        assignee: "developer1",
    },
    SeedTask {
        project: 1,
        title: "Design Mobile UI Components",
        description: "Create reusable UI components for the mobile app including buttons, forms, navigation, and task cards.",
        status: TaskStatus::Todo,
        priority: TaskPriority::Medium,
        estimated_hours: 12.0,
        assignee: "yuvasreega",
    },
    SeedTask {
        project: 1,
        title: "Implement Task CRUD Operations",
        description: "Develop backend API and frontend functionality for creating, reading, updating, and deleting tasks.",
        status: TaskStatus::Todo,
        priority: TaskPriority::High,
        estimated_hours: 16.0,
        assignee: "developer1",
    },
    SeedTask {
        project: 1,
        title: "Add Push Notifications",
        description: "Implement push notifications for task assignments, due date reminders, and team updates.",
        status: TaskStatus::Todo,
        priority: TaskPriority::Low,
        estimated_hours: 14.0,
        assignee: "developer1",
    },
    SeedTask {
        project: 2,
        title: "Research ML Algorithms",
        description: "Research and select appropriate machine learning algorithms for data analysis and prediction models.",
        status: TaskStatus::InProgress,
        priority: TaskPriority::High,
        estimated_hours: 20.0,
        assignee: "yuvasreega",
    },
    SeedTask {
        project: 2,
        title: "Design Dashboard Layout",
        description: "Create responsive dashboard layout with charts, graphs, and interactive data visualizations.",
        status: TaskStatus::Todo,
        priority: TaskPriority::Medium,
        estimated_hours: 15.0,
        assignee: "yuvasreega",
    },
    SeedTask {
        project: 2,
        title: "Implement Data Pipeline",
        description: "Build ETL pipeline to collect, process, and store data from various sources for analysis.",
        status: TaskStatus::Todo,
        priority: TaskPriority::High,
        estimated_hours: 25.0,
        assignee: "developer1",
    },
    SeedTask {
        project: 2,
        title: "Create Prediction Models",
        description: "Develop machine learning models for trend prediction, anomaly detection, and business insights.",
        status: TaskStatus::Todo,
        priority: TaskPriority::Urgent,
        estimated_hours: 30.0,
        assignee: "developer1",
    },
];

struct SeedTimeLog {
    task: &'static str,
    user: &'static str,
    hours: f64,
    description: &'static str,
    days_ago: i64,
}

const TIME_LOGS: [SeedTimeLog; 4] = [
    SeedTimeLog {
        task: "Design User Interface",
        user: "yuvasreega",
        hours: 4.5,
        description: "Created wireframes for main pages",
        days_ago: 2,
    },
    SeedTimeLog {
        task: "Design User Interface",
        user: "yuvasreega",
        hours: 3.0,
        description: "Refined UI components and styling",
        days_ago: 1,
    },
    SeedTimeLog {
        task: "Implement User Authentication",
        user: "developer1",
        hours: 6.0,
        description: "Implemented JWT authentication system",
        days_ago: 3,
    },
    SeedTimeLog {
        task: "Implement User Authentication",
        user: "developer1",
        hours: 2.5,
        description: "Added password hashing and validation",
        days_ago: 2,
    },
];

fn email_for(username: &str) -> String {
    format!("{}@example.com", username)
}

/// Seeds every empty table
///
/// Stages that reference demo users or tasks are skipped with a warning when
/// those rows are missing (for example when `users` already held real
/// accounts before seeding).
pub async fn seed(pool: &PgPool, now: DateTime<Utc>) -> Result<SeedReport, SeedError> {
    let mut report = SeedReport::default();

    if User::count(pool).await? == 0 {
        for seed in &USERS {
            User::create(
                pool,
                CreateUser {
                    email: email_for(seed.username),
                    username: seed.username.to_string(),
                    full_name: Some(seed.full_name.to_string()),
                    password_hash: hash_password(seed.password)?,
                },
            )
            .await?;
            report.users += 1;
        }
        info!(count = report.users, "Seeded users");
    }

    let Some(user_ids) = seed_user_ids(pool).await? else {
        warn!("Demo users not found; skipping project, task, and time log seeding");
        return Ok(report);
    };
    let user_id = |username: &str| {
        USERS
            .iter()
            .position(|u| u.username == username)
            .map(|i| user_ids[i])
    };

    let projects = if Project::count(pool).await? == 0 {
        let mut created = Vec::with_capacity(PROJECTS.len());
        for seed in &PROJECTS {
            let Some(owner_id) = user_id(seed.owner) else {
                continue;
            };
            let project = Project::create(
                pool,
                owner_id,
                CreateProject {
                    title: seed.title.to_string(),
                    description: Some(seed.description.to_string()),
                    status: seed.status.to_string(),
                    start_date: Some(now + Duration::days(seed.starts)),
                    end_date: Some(now + Duration::days(seed.ends)),
                },
            )
            .await?;
            created.push(project);
        }
        report.projects = created.len();
        info!(count = report.projects, "Seeded projects");
        created
    } else {
        Project::list_all(pool).await?
    };

    if Task::count(pool).await? == 0 {
        for seed in &TASKS {
            let project = PROJECTS
                .get(seed.project)
                .and_then(|p| projects.iter().find(|existing| existing.title == p.title));
            let (Some(project), Some(assignee_id)) = (project, user_id(seed.assignee)) else {
                warn!(task = seed.title, "Demo project or assignee missing; task skipped");
                continue;
            };

            Task::create(
                pool,
                CreateTask {
                    title: seed.title.to_string(),
                    description: Some(seed.description.to_string()),
                    status: seed.status,
                    priority: seed.priority,
                    estimated_hours: Some(seed.estimated_hours),
                    project_id: project.id,
                    assignee_id: Some(assignee_id),
                },
            )
            .await?;
            report.tasks += 1;
        }
        info!(count = report.tasks, "Seeded tasks");
    }

    if TimeLog::count(pool).await? == 0 {
        let tasks = Task::list_all(pool).await?;
        for seed in &TIME_LOGS {
            let task = tasks.iter().find(|t| t.title == seed.task);
            let (Some(task), Some(log_user)) = (task, user_id(seed.user)) else {
                warn!(task = seed.task, "Demo task or user missing; time log skipped");
                continue;
            };

            TimeLog::create(
                pool,
                task.id,
                log_user,
                CreateTimeLog {
                    task_id: Some(task.id),
                    hours: seed.hours,
                    description: seed.description.to_string(),
                    date: Some((now - Duration::days(seed.days_ago)).date_naive()),
                },
            )
            .await?;
            report.time_logs += 1;
        }
        info!(count = report.time_logs, "Seeded time logs");
    }

    Ok(report)
}

/// Ids of the demo users in [`USERS`] order, or `None` if any is missing
async fn seed_user_ids(pool: &PgPool) -> Result<Option<Vec<Uuid>>, sqlx::Error> {
    let mut ids = Vec::with_capacity(USERS.len());
    for seed in &USERS {
        match User::find_by_login(pool, seed.username).await? {
            Some(user) => ids.push(user.id),
            None => return Ok(None),
        }
    }
    Ok(Some(ids))
}
