//! HTML email templates
//!
//! Rendering never fails: every interpolated value is HTML-escaped and the
//! templates have no fallible parts.

use super::{NotificationKind, TaskNotification};

/// Subject and HTML body for a notification
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedEmail {
    pub subject: String,
    pub html: String,
}

struct Theme {
    heading: &'static str,
    gradient: &'static str,
    accent: &'static str,
}

const ASSIGNMENT: Theme = Theme {
    heading: "&#127919; New Task Assignment",
    gradient: "linear-gradient(135deg, #667eea 0%, #764ba2 100%)",
    accent: "#667eea",
};

const UPDATE: Theme = Theme {
    heading: "&#128221; Task Updated",
    gradient: "linear-gradient(135deg, #f093fb 0%, #f5576c 100%)",
    accent: "#f5576c",
};

const COMPLETION: Theme = Theme {
    heading: "&#9989; Task Completed",
    gradient: "linear-gradient(135deg, #43e97b 0%, #38f9d7 100%)",
    accent: "#43e97b",
};

/// Renders `notification` with a "View Task" link into `frontend_url`
pub fn render(notification: &TaskNotification, frontend_url: &str) -> RenderedEmail {
    let task = escape(&notification.task_title);
    let project = escape(&notification.project_title);

    let (theme, subject, intro, details) = match &notification.kind {
        NotificationKind::Assignment { assigned_by } => (
            &ASSIGNMENT,
            format!("New Task Assigned: {}", notification.task_title),
            format!(
                "You have been assigned a new task in the project <strong>{}</strong>.",
                project
            ),
            vec![("Assigned by", escape(assigned_by))],
        ),
        NotificationKind::Update {
            update_type,
            updated_by,
        } => (
            &UPDATE,
            format!("Task Updated: {}", notification.task_title),
            format!(
                "A task in the project <strong>{}</strong> has been updated.",
                project
            ),
            vec![
                ("Update", escape(update_type)),
                ("Updated by", escape(updated_by)),
            ],
        ),
        NotificationKind::Completion { completed_by } => (
            &COMPLETION,
            format!("Task Completed: {}", notification.task_title),
            format!(
                "A task in the project <strong>{}</strong> has been completed.",
                project
            ),
            vec![("Completed by", escape(completed_by))],
        ),
    };

    let mut rows = format!(
        "<p style=\"margin: 5px 0; color: #666;\"><strong>Task:</strong> {}</p>\n\
         <p style=\"margin: 5px 0; color: #666;\"><strong>Project:</strong> {}</p>\n",
        task, project
    );
    for (label, value) in details {
        rows.push_str(&format!(
            "<p style=\"margin: 5px 0; color: #666;\"><strong>{}:</strong> {}</p>\n",
            label, value
        ));
    }

    let link = format!(
        "{}/tasks/{}",
        frontend_url.trim_end_matches('/'),
        notification.task_id
    );

    let html = format!(
        r#"<div style="font-family: Arial, sans-serif; max-width: 600px; margin: 0 auto; padding: 20px;">
  <div style="background: {gradient}; color: white; padding: 20px; border-radius: 10px 10px 0 0;">
    <h1 style="margin: 0; font-size: 24px;">{heading}</h1>
  </div>
  <div style="background: #f8f9fa; padding: 20px; border-radius: 0 0 10px 10px; border: 1px solid #e9ecef;">
    <p style="font-size: 16px; color: #333;">Hello <strong>{name}</strong>,</p>
    <p style="font-size: 16px; color: #333;">{intro}</p>
    <div style="background: white; padding: 20px; border-radius: 8px; border-left: 4px solid {accent}; margin: 20px 0;">
      <h3 style="margin: 0 0 10px 0; color: #333;">Task Details</h3>
{rows}    </div>
    <div style="text-align: center; margin-top: 30px;">
      <a href="{link}" style="background: {accent}; color: white; padding: 12px 30px; text-decoration: none; border-radius: 25px; display: inline-block;">View Task</a>
    </div>
  </div>
</div>
"#,
        gradient = theme.gradient,
        heading = theme.heading,
        accent = theme.accent,
        name = escape(&notification.recipient_name),
        intro = intro,
        rows = rows,
        link = escape(&link),
    );

    RenderedEmail { subject, html }
}

/// Escapes text for HTML element and attribute content
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn notification(kind: NotificationKind) -> TaskNotification {
        TaskNotification {
            kind,
            recipient_email: "developer1@example.com".to_string(),
            recipient_name: "John Developer".to_string(),
            task_id: Uuid::nil(),
            task_title: "Implement Data Pipeline".to_string(),
            project_title: "AI-Powered Analytics Dashboard".to_string(),
        }
    }

    #[test]
    fn test_assignment_template() {
        let email = render(
            &notification(NotificationKind::Assignment {
                assigned_by: "Sarah Manager".to_string(),
            }),
            "http://localhost:3000/",
        );

        assert_eq!(email.subject, "New Task Assigned: Implement Data Pipeline");
        assert!(email.html.contains("Hello <strong>John Developer</strong>"));
        assert!(email.html.contains("<strong>Assigned by:</strong> Sarah Manager"));
        assert!(email.html.contains("AI-Powered Analytics Dashboard"));
        assert!(email
            .html
            .contains("href=\"http://localhost:3000/tasks/00000000-0000-0000-0000-000000000000\""));
    }

    #[test]
    fn test_update_template_includes_update_type() {
        let email = render(
            &notification(NotificationKind::Update {
                update_type: "Title Updated".to_string(),
                updated_by: "John Developer".to_string(),
            }),
            "http://localhost:3000",
        );

        assert_eq!(email.subject, "Task Updated: Implement Data Pipeline");
        assert!(email.html.contains("<strong>Update:</strong> Title Updated"));
        assert!(email.html.contains("<strong>Updated by:</strong> John Developer"));
    }

    #[test]
    fn test_completion_template() {
        let email = render(
            &notification(NotificationKind::Completion {
                completed_by: "John Developer".to_string(),
            }),
            "http://localhost:3000",
        );

        assert_eq!(email.subject, "Task Completed: Implement Data Pipeline");
        assert!(email.html.contains("<strong>Completed by:</strong> John Developer"));
        assert!(email.html.contains("View Task"));
    }

    #[test]
    fn test_values_are_escaped() {
        let mut n = notification(NotificationKind::Completion {
            completed_by: "<script>".to_string(),
        });
        n.task_title = "A & B".to_string();

        let email = render(&n, "http://localhost:3000");
        assert!(email.html.contains("&lt;script&gt;"));
        assert!(email.html.contains("A &amp; B"));
        assert!(!email.html.contains("<script>"));
        // subjects are plain text
        assert_eq!(email.subject, "Task Completed: A & B");
    }
}
