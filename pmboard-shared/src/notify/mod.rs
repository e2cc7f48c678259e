//! Task email notifications
//!
//! A [`TaskNotification`] describes who to tell and what happened; the
//! [`Notifier`] renders it with [`templates`] and hands it to a [`Mailer`].
//!
//! Delivery is best-effort. Failures are logged and reported as `false`, they
//! never reach the request that triggered them. [`Notifier::dispatch`] runs
//! delivery on a background task so responses are not held up by SMTP.

pub mod mailer;
pub mod templates;

use std::sync::Arc;

use tokio::task::JoinHandle;
use tracing::{debug, warn};
use uuid::Uuid;

pub use mailer::{LogMailer, MailError, Mailer, MemoryMailer, OutgoingEmail, SmtpConfig, SmtpMailer};

/// What happened to the task
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotificationKind {
    /// The recipient was (re)assigned the task
    Assignment { assigned_by: String },

    /// General change; `update_type` is a human-readable summary
    Update {
        update_type: String,
        updated_by: String,
    },

    /// The task moved to `closed`
    Completion { completed_by: String },
}

impl NotificationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationKind::Assignment { .. } => "assignment",
            NotificationKind::Update { .. } => "update",
            NotificationKind::Completion { .. } => "completion",
        }
    }
}

/// A notification about one task, addressed to one recipient
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskNotification {
    pub kind: NotificationKind,
    pub recipient_email: String,
    pub recipient_name: String,
    pub task_id: Uuid,
    pub task_title: String,
    pub project_title: String,
}

/// Renders and delivers task notifications
#[derive(Clone)]
pub struct Notifier {
    mailer: Arc<dyn Mailer>,
    frontend_url: String,
}

impl Notifier {
    pub fn new(mailer: Arc<dyn Mailer>, frontend_url: impl Into<String>) -> Self {
        Self {
            mailer,
            frontend_url: frontend_url.into(),
        }
    }

    pub fn mailer_name(&self) -> &'static str {
        self.mailer.name()
    }

    /// Renders and sends `notification`, returning whether it was delivered
    pub async fn deliver(&self, notification: &TaskNotification) -> bool {
        let rendered = templates::render(notification, &self.frontend_url);
        let email = OutgoingEmail {
            to: notification.recipient_email.clone(),
            subject: rendered.subject,
            html_body: rendered.html,
        };

        match self.mailer.send(email).await {
            Ok(()) => {
                debug!(
                    kind = notification.kind.as_str(),
                    task_id = %notification.task_id,
                    mailer = self.mailer.name(),
                    "Task notification sent"
                );
                true
            }
            Err(e) => {
                warn!(
                    kind = notification.kind.as_str(),
                    task_id = %notification.task_id,
                    to = %notification.recipient_email,
                    error = %e,
                    "Failed to send task notification"
                );
                false
            }
        }
    }

    /// Delivers `notification` on a background task
    pub fn dispatch(&self, notification: TaskNotification) -> JoinHandle<bool> {
        let notifier = self.clone();
        tokio::spawn(async move { notifier.deliver(&notification).await })
    }
}
