use dioxus::prelude::*;

use crate::phone::Notifier;

/// Global UI state
pub static UI_STATE: GlobalSignal<UiState> = Signal::global(UiState::default);

#[derive(Clone, Default)]
pub struct UiState {
    pub notification: Option<Notification>,
    pub snackbar: Option<Snackbar>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Notification {
    pub title: String,
    pub message: String,
    pub notification_type: NotificationType,
}

impl Notification {
    pub fn error(title: &str, message: &str) -> Self {
        Self {
            title: title.to_string(),
            message: message.to_string(),
            notification_type: NotificationType::Error,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NotificationType {
    Success,
    Error,
    Warning,
    Info,
}

impl NotificationType {
    pub fn color_class(&self) -> &str {
        match self {
            NotificationType::Success => "bg-green-500",
            NotificationType::Error => "bg-red-500",
            NotificationType::Warning => "bg-yellow-500",
            NotificationType::Info => "bg-blue-500",
        }
    }
}

/// Short confirmation shown at the bottom of the screen
#[derive(Clone, PartialEq)]
pub struct Snackbar {
    pub message: String,
    pub duration_ms: u32,
}

pub fn show_notification(notification: Notification) {
    UI_STATE.write().notification = Some(notification);
}

pub fn clear_notification() {
    UI_STATE.write().notification = None;
}

pub fn show_snackbar(message: &str, duration_ms: u32) {
    UI_STATE.write().snackbar = Some(Snackbar {
        message: message.to_string(),
        duration_ms,
    });
}

pub fn clear_snackbar() {
    UI_STATE.write().snackbar = None;
}

/// Notifier backed by the global UI state
pub struct UiNotifier;

impl Notifier for UiNotifier {
    fn notify(&self, notification: Notification) {
        show_notification(notification);
    }
}
