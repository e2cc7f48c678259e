//! Dashboard aggregates
//!
//! Everything here is a pure function over task/project snapshots and an
//! explicit `now`, so handlers only load rows and the numbers can be tested
//! without a database.
//!
//! Percentages and averages are rounded half away from zero: one decimal for
//! dashboard metrics, two for a project summary's completion percentage.

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::models::project::Project;
use crate::models::task::{Task, TaskStatus};

/// Length of the trailing window for weekly figures
pub const WEEK_DAYS: i64 = 7;

/// Project health derived from its completion rate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HealthStatus {
    /// 70% or more closed
    Healthy,
    /// 40% to under 70%
    Warning,
    /// Under 40%
    Critical,
    /// The project has no tasks
    NoTasks,
}

impl HealthStatus {
    pub fn from_rate(total_tasks: i64, completion_rate: f64) -> Self {
        if total_tasks == 0 {
            HealthStatus::NoTasks
        } else if completion_rate >= 70.0 {
            HealthStatus::Healthy
        } else if completion_rate >= 40.0 {
            HealthStatus::Warning
        } else {
            HealthStatus::Critical
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            HealthStatus::Healthy => "healthy",
            HealthStatus::Warning => "warning",
            HealthStatus::Critical => "critical",
            HealthStatus::NoTasks => "no_tasks",
        }
    }
}

/// Task counts per status
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatusCounts {
    pub todo: i64,
    pub in_progress: i64,
    pub review: i64,
    pub ready_to_test: i64,
    pub in_test: i64,
    pub closed: i64,
}

impl StatusCounts {
    /// Builds counts from `(status, count)` rows; missing statuses are zero
    pub fn from_pairs(pairs: &[(TaskStatus, i64)]) -> Self {
        pairs
            .iter()
            .fold(Self::default(), |mut counts, (status, n)| {
                *counts.slot(*status) += n;
                counts
            })
    }

    pub fn from_tasks<'a>(tasks: impl IntoIterator<Item = &'a Task>) -> Self {
        tasks.into_iter().fold(Self::default(), |mut counts, task| {
            *counts.slot(task.status) += 1;
            counts
        })
    }

    fn slot(&mut self, status: TaskStatus) -> &mut i64 {
        match status {
            TaskStatus::Todo => &mut self.todo,
            TaskStatus::InProgress => &mut self.in_progress,
            TaskStatus::Review => &mut self.review,
            TaskStatus::ReadyToTest => &mut self.ready_to_test,
            TaskStatus::InTest => &mut self.in_test,
            TaskStatus::Closed => &mut self.closed,
        }
    }

    pub fn total(&self) -> i64 {
        self.todo + self.in_progress + self.review + self.ready_to_test + self.in_test + self.closed
    }
}

/// Health entry for one project
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProjectHealth {
    pub project_id: Uuid,
    pub project_title: String,
    pub completion_rate: f64,
    pub total_tasks: i64,
    pub completed_tasks: i64,
    pub health_status: HealthStatus,
}

/// Closed-task count for one calendar day
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DayTrend {
    /// Weekday name, e.g. `Monday`
    pub day: String,
    pub completed: i64,
}

/// Response body of `GET /performance-metrics`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PerformanceMetrics {
    pub tasks_completed_this_week: i64,
    pub avg_completion_days: f64,
    pub productivity_score: f64,
    pub project_health: Vec<ProjectHealth>,
    pub total_logged_hours: f64,
    pub avg_hours_per_task: f64,
    pub weekly_trends: Vec<DayTrend>,
    pub total_tasks: i64,
    pub completed_tasks: i64,
}

/// Response body of `GET /projects/{id}/summary`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProjectSummary {
    pub project_id: Uuid,
    pub project_title: String,
    pub total_tasks: i64,
    pub todo_tasks: i64,
    pub in_progress_tasks: i64,
    pub review_tasks: i64,
    pub ready_to_test_tasks: i64,
    pub in_test_tasks: i64,
    pub closed_tasks: i64,
    pub completion_percentage: f64,
    pub health_status: HealthStatus,
    pub total_estimated_hours: f64,
    pub total_actual_hours: f64,
}

/// Response body of `GET /tasks/my-tasks/stats`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MyTaskStats {
    pub user_id: Uuid,
    pub username: String,
    pub total_tasks: i64,
    #[serde(flatten)]
    pub counts: StatusCounts,
}

impl MyTaskStats {
    pub fn new(user_id: Uuid, username: impl Into<String>, counts: StatusCounts) -> Self {
        Self {
            user_id,
            username: username.into(),
            total_tasks: counts.total(),
            counts,
        }
    }
}

/// Rounds half away from zero to `decimals` places
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

/// `part / total * 100`, or 0 when `total` is 0
pub fn percentage(part: i64, total: i64, decimals: i32) -> f64 {
    if total == 0 {
        return 0.0;
    }
    round_to(part as f64 / total as f64 * 100.0, decimals)
}

fn closed_at(task: &Task) -> Option<DateTime<Utc>> {
    if task.status.is_completed() {
        task.updated_at
    } else {
        None
    }
}

/// Closed tasks last modified within the trailing week
pub fn tasks_completed_since(tasks: &[Task], now: DateTime<Utc>) -> i64 {
    let week_ago = now - Duration::days(WEEK_DAYS);
    tasks
        .iter()
        .filter_map(closed_at)
        .filter(|at| *at >= week_ago)
        .count() as i64
}

/// Mean whole days from creation to last modification over closed tasks
///
/// Tasks whose modification precedes creation are skipped.
pub fn avg_completion_days(tasks: &[Task]) -> f64 {
    let days: Vec<i64> = tasks
        .iter()
        .filter_map(|task| {
            let delta = closed_at(task)? - task.created_at;
            (delta >= Duration::zero()).then(|| delta.num_days())
        })
        .collect();

    if days.is_empty() {
        return 0.0;
    }
    round_to(days.iter().sum::<i64>() as f64 / days.len() as f64, 1)
}

pub fn productivity_score(total: i64, closed: i64) -> f64 {
    percentage(closed, total, 1)
}

pub fn project_health(project: &Project, tasks: &[Task]) -> ProjectHealth {
    let own: Vec<&Task> = tasks.iter().filter(|t| t.project_id == project.id).collect();
    let total = own.len() as i64;
    let completed = own.iter().filter(|t| t.status.is_completed()).count() as i64;
    let completion_rate = percentage(completed, total, 1);

    ProjectHealth {
        project_id: project.id,
        project_title: project.title.clone(),
        completion_rate,
        total_tasks: total,
        completed_tasks: completed,
        health_status: HealthStatus::from_rate(total, completion_rate),
    }
}

/// Closed tasks per calendar day (UTC) for the 7 days starting a week ago
pub fn weekly_trend(tasks: &[Task], now: DateTime<Utc>) -> Vec<DayTrend> {
    let first = (now - Duration::days(WEEK_DAYS)).date_naive();

    (0..WEEK_DAYS)
        .map(|offset| {
            let day = first + Duration::days(offset);
            let completed = tasks
                .iter()
                .filter_map(closed_at)
                .filter(|at| at.date_naive() == day)
                .count() as i64;

            DayTrend {
                day: day.format("%A").to_string(),
                completed,
            }
        })
        .collect()
}

/// Computes the dashboard metrics from full snapshots
pub fn performance_metrics(
    tasks: &[Task],
    projects: &[Project],
    total_logged_hours: f64,
    now: DateTime<Utc>,
) -> PerformanceMetrics {
    let total_tasks = tasks.len() as i64;
    let completed_tasks = tasks.iter().filter(|t| t.status.is_completed()).count() as i64;

    let avg_hours_per_task = if total_tasks > 0 {
        round_to(total_logged_hours / total_tasks as f64, 1)
    } else {
        0.0
    };

    PerformanceMetrics {
        tasks_completed_this_week: tasks_completed_since(tasks, now),
        avg_completion_days: avg_completion_days(tasks),
        productivity_score: productivity_score(total_tasks, completed_tasks),
        project_health: projects.iter().map(|p| project_health(p, tasks)).collect(),
        total_logged_hours,
        avg_hours_per_task,
        weekly_trends: weekly_trend(tasks, now),
        total_tasks,
        completed_tasks,
    }
}

/// Summarises one project's tasks
pub fn project_summary(project: &Project, tasks: &[Task]) -> ProjectSummary {
    let own: Vec<&Task> = tasks.iter().filter(|t| t.project_id == project.id).collect();
    let counts = StatusCounts::from_tasks(own.iter().copied());
    let total = counts.total();
    let completion_percentage = percentage(counts.closed, total, 2);

    ProjectSummary {
        project_id: project.id,
        project_title: project.title.clone(),
        total_tasks: total,
        todo_tasks: counts.todo,
        in_progress_tasks: counts.in_progress,
        review_tasks: counts.review,
        ready_to_test_tasks: counts.ready_to_test,
        in_test_tasks: counts.in_test,
        closed_tasks: counts.closed,
        completion_percentage,
        health_status: HealthStatus::from_rate(total, completion_percentage),
        total_estimated_hours: own.iter().filter_map(|t| t.estimated_hours).sum(),
        total_actual_hours: own.iter().map(|t| t.actual_hours).sum(),
    }
}
