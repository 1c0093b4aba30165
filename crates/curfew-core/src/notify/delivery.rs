//! Notification delivery seam.
//!
//! The monitor builds [`NotificationRequest`]s and hands them to a
//! [`Notifier`]. Each rule gets its own id (`STATUS_NOTIFICATION_ID + lead`) so
//! several reminders can be on screen at once; the ongoing status line always
//! reuses [`STATUS_NOTIFICATION_ID`].

use std::io::Write;
use std::sync::Mutex;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::DeliveryError;

/// Fixed id of the ongoing status notification.
pub const STATUS_NOTIFICATION_ID: u32 = 101;

pub const DEFAULT_STATUS_TITLE: &str = "Curfew Notifier";
pub const DEFAULT_REMINDER_TITLE: &str = "Curfew reminder";

/// Id for the reminder of a given lead time.
pub fn rule_notification_id(lead_minutes: u32) -> u32 {
    STATUS_NOTIFICATION_ID.saturating_add(lead_minutes)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    /// Persistent line describing home status and the next boundary.
    Status,
    /// One-shot lead-time reminder.
    Reminder,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationRequest {
    pub id: u32,
    pub kind: NotificationKind,
    pub title: String,
    pub body: String,
}

impl NotificationRequest {
    pub fn reminder(lead_minutes: u32, title: &str, body: String) -> Self {
        Self {
            id: rule_notification_id(lead_minutes),
            kind: NotificationKind::Reminder,
            title: title.to_string(),
            body,
        }
    }

    pub fn status(title: &str, body: String) -> Self {
        Self {
            id: STATUS_NOTIFICATION_ID,
            kind: NotificationKind::Status,
            title: title.to_string(),
            body,
        }
    }
}

/// Posts notifications to whatever the host offers.
pub trait Notifier: Send + Sync {
    /// Post a one-shot reminder.
    fn deliver(&self, request: &NotificationRequest) -> Result<(), DeliveryError>;

    /// Replace the ongoing status notification.
    fn update_status(&self, request: &NotificationRequest) -> Result<(), DeliveryError>;
}

/// Writes each notification as a JSON line on stdout.
#[derive(Debug)]
pub struct ConsoleNotifier {
    permitted: bool,
}

impl ConsoleNotifier {
    pub fn new(permitted: bool) -> Self {
        Self { permitted }
    }

    fn emit(&self, request: &NotificationRequest) -> Result<(), DeliveryError> {
        if !self.permitted {
            return Err(DeliveryError::PermissionDenied);
        }
        let line =
            serde_json::to_string(request).map_err(|e| DeliveryError::Backend(e.to_string()))?;
        let mut out = std::io::stdout().lock();
        writeln!(out, "{line}").map_err(|e| DeliveryError::Backend(e.to_string()))?;
        Ok(())
    }
}

impl Default for ConsoleNotifier {
    fn default() -> Self {
        Self::new(true)
    }
}

impl Notifier for ConsoleNotifier {
    fn deliver(&self, request: &NotificationRequest) -> Result<(), DeliveryError> {
        self.emit(request)?;
        info!(id = request.id, body = %request.body, "notification posted");
        Ok(())
    }

    fn update_status(&self, request: &NotificationRequest) -> Result<(), DeliveryError> {
        self.emit(request)
    }
}

/// Keeps every request in memory.
#[derive(Debug, Default)]
pub struct MemoryNotifier {
    permitted: Option<bool>,
    delivered: Mutex<Vec<NotificationRequest>>,
    status: Mutex<Vec<NotificationRequest>>,
}

impl MemoryNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// A notifier whose platform refused notification permission.
    pub fn denied() -> Self {
        Self {
            permitted: Some(false),
            ..Self::default()
        }
    }

    pub fn delivered(&self) -> Vec<NotificationRequest> {
        self.delivered
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    pub fn status_updates(&self) -> Vec<NotificationRequest> {
        self.status.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    fn check(&self) -> Result<(), DeliveryError> {
        match self.permitted {
            Some(false) => Err(DeliveryError::PermissionDenied),
            _ => Ok(()),
        }
    }
}

impl Notifier for MemoryNotifier {
    fn deliver(&self, request: &NotificationRequest) -> Result<(), DeliveryError> {
        self.check()?;
        self.delivered
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(request.clone());
        Ok(())
    }

    fn update_status(&self, request: &NotificationRequest) -> Result<(), DeliveryError> {
        self.check()?;
        self.status
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(request.clone());
        Ok(())
    }
}

/// Deliver and swallow failures. Permission problems are expected on hosts
/// where the user declined notifications.
pub(crate) fn deliver_logged(notifier: &dyn Notifier, request: &NotificationRequest) -> bool {
    match notifier.deliver(request) {
        Ok(()) => true,
        Err(DeliveryError::PermissionDenied) => {
            warn!(id = request.id, "notification permission not granted; reminder dropped");
            false
        }
        Err(e) => {
            warn!(id = request.id, error = %e, "notification delivery failed");
            false
        }
    }
}
