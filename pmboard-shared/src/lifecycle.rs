//! Task update diffing and notification classification
//!
//! A task update is summarised by comparing the row before and after the
//! patch. The diff tracks status, actual/estimated hours, priority, title,
//! description, and assignee; anything else (such as moving the task to
//! another project) does not count as a notifiable change.
//!
//! Classification picks a single [`UpdateOutcome`]:
//!
//! 1. status moved to `closed` → [`UpdateOutcome::Completed`]
//! 2. otherwise, assignee changed → [`UpdateOutcome::Reassigned`]
//! 3. otherwise, any labeled field changed → [`UpdateOutcome::Updated`] with a
//!    human-readable update type
//! 4. otherwise → [`UpdateOutcome::Unchanged`]
//!
//! Each outcome maps to at most one notification.

use std::fmt;

use uuid::Uuid;

use crate::models::task::{Task, TaskPriority, TaskStatus};
use crate::models::user::User;
use crate::notify::{NotificationKind, TaskNotification};

/// A labeled field change
#[derive(Debug, Clone, PartialEq)]
pub enum ChangedField {
    /// Status moved to a non-completed value
    Status(TaskStatus),
    ActualHours(f64),
    EstimatedHours(Option<f64>),
    Priority(TaskPriority),
    Title,
    Description,
}

impl fmt::Display for ChangedField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChangedField::Status(status) => write!(f, "Status to {}", status.as_str()),
            ChangedField::ActualHours(hours) => write!(f, "Actual Hours to {}", hours),
            ChangedField::EstimatedHours(Some(hours)) => write!(f, "Estimated Hours to {}", hours),
            ChangedField::EstimatedHours(None) => write!(f, "Estimated Hours to none"),
            ChangedField::Priority(priority) => write!(f, "Priority to {}", priority.as_str()),
            ChangedField::Title => write!(f, "Title"),
            ChangedField::Description => write!(f, "Description"),
        }
    }
}

/// Differences between a task before and after an update
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskDiff {
    /// New status, if it changed
    pub status: Option<TaskStatus>,

    /// New assignee, if it changed (`Some(None)` = unassigned)
    pub assignee: Option<Option<Uuid>>,

    /// Labeled changes in reporting order; a move to `closed` is not listed
    pub fields: Vec<ChangedField>,
}

impl TaskDiff {
    pub fn between(before: &Task, after: &Task) -> Self {
        let mut diff = TaskDiff::default();

        if before.status != after.status {
            diff.status = Some(after.status);
            if !after.status.is_completed() {
                diff.fields.push(ChangedField::Status(after.status));
            }
        }
        if before.actual_hours != after.actual_hours {
            diff.fields.push(ChangedField::ActualHours(after.actual_hours));
        }
        if before.estimated_hours != after.estimated_hours {
            diff.fields
                .push(ChangedField::EstimatedHours(after.estimated_hours));
        }
        if before.priority != after.priority {
            diff.fields.push(ChangedField::Priority(after.priority));
        }
        if before.title != after.title {
            diff.fields.push(ChangedField::Title);
        }
        if before.description != after.description {
            diff.fields.push(ChangedField::Description);
        }
        if before.assignee_id != after.assignee_id {
            diff.assignee = Some(after.assignee_id);
        }

        diff
    }

    pub fn is_empty(&self) -> bool {
        self.status.is_none() && self.assignee.is_none() && self.fields.is_empty()
    }

    /// Whether the status moved into the completed state
    pub fn completed(&self) -> bool {
        self.status.is_some_and(|status| status.is_completed())
    }

    pub fn labels(&self) -> Vec<String> {
        self.fields.iter().map(ToString::to_string).collect()
    }

    pub fn outcome(&self) -> UpdateOutcome {
        if self.completed() {
            return UpdateOutcome::Completed;
        }
        if self.assignee.is_some() {
            return UpdateOutcome::Reassigned;
        }

        match self.fields.as_slice() {
            [] => UpdateOutcome::Unchanged,
            [only] => UpdateOutcome::Updated(format!("{} Updated", only)),
            many => UpdateOutcome::Updated(format!(
                "Multiple fields updated: {}",
                many.iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join(", ")
            )),
        }
    }
}

/// Classification of a task update
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateOutcome {
    Completed,
    Reassigned,
    /// General update with its update type label
    Updated(String),
    Unchanged,
}

impl UpdateOutcome {
    pub fn update_type(&self) -> &str {
        match self {
            UpdateOutcome::Completed => "Task Completed",
            UpdateOutcome::Reassigned => "Task Reassigned",
            UpdateOutcome::Updated(label) => label,
            UpdateOutcome::Unchanged => "No Changes",
        }
    }

    /// The single notification this outcome calls for
    ///
    /// Update notices go to the acting user. `None` when nothing changed or
    /// the actor has no email address.
    pub fn notification(
        &self,
        actor: &User,
        task: &Task,
        project_title: &str,
    ) -> Option<TaskNotification> {
        if actor.email.trim().is_empty() {
            return None;
        }

        let actor_name = actor.display_name().to_string();
        let kind = match self {
            UpdateOutcome::Completed => NotificationKind::Completion {
                completed_by: actor_name.clone(),
            },
            UpdateOutcome::Reassigned => NotificationKind::Assignment {
                assigned_by: actor_name.clone(),
            },
            UpdateOutcome::Updated(label) => NotificationKind::Update {
                update_type: label.clone(),
                updated_by: actor_name.clone(),
            },
            UpdateOutcome::Unchanged => return None,
        };

        Some(TaskNotification {
            kind,
            recipient_email: actor.email.clone(),
            recipient_name: actor_name,
            task_id: task.id,
            task_title: task.title.clone(),
            project_title: project_title.to_string(),
        })
    }
}
