use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use log::{debug, info};
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::voting::escape_html;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Success,
    Error,
    Warning,
}

impl Severity {
    /// Bootstrap alert variant.
    pub fn alert_class(&self) -> &'static str {
        match self {
            Severity::Success => "success",
            Severity::Error => "danger",
            Severity::Warning => "warning",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Notification {
    pub id: Uuid,
    pub message: String,
    pub severity: Severity,
    pub shown_at: DateTime<Utc>,
}

impl Notification {
    pub fn new(message: impl Into<String>, severity: Severity) -> Self {
        Self {
            id: Uuid::new_v4(),
            message: message.into(),
            severity,
            shown_at: Utc::now(),
        }
    }

    pub fn to_html(&self) -> String {
        format!(
            "<div class=\"notification-toast alert alert-{} alert-dismissible fade show\" role=\"alert\">\
             {}<button type=\"button\" class=\"btn-close\" data-bs-dismiss=\"alert\"></button></div>",
            self.severity.alert_class(),
            escape_html(&self.message)
        )
    }
}

/// Shows one toast at a time and clears it after `lifetime`.
#[derive(Clone)]
pub struct Notifier {
    current: Arc<Mutex<Option<Notification>>>,
    lifetime: Duration,
}

impl Notifier {
    pub fn new(lifetime: Duration) -> Self {
        Self {
            current: Arc::new(Mutex::new(None)),
            lifetime,
        }
    }

    /// Replaces whatever is showing and schedules the new toast's removal.
    pub async fn show(&self, message: impl Into<String>, severity: Severity) -> Notification {
        let notification = Notification::new(message, severity);
        info!("[{:?}] {}", severity, notification.message);

        *self.current.lock().await = Some(notification.clone());

        let slot = Arc::clone(&self.current);
        let id = notification.id;
        let lifetime = self.lifetime;
        tokio::spawn(async move {
            tokio::time::sleep(lifetime).await;
            let mut current = slot.lock().await;
            // A newer toast owns the slot now; leave it alone.
            if current.as_ref().map(|n| n.id) == Some(id) {
                *current = None;
                debug!("Notification {} expired", id);
            }
        });

        notification
    }

    pub async fn current(&self) -> Option<Notification> {
        self.current.lock().await.clone()
    }
}
