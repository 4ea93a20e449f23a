//! Phone core
//!
//! The controller turns agent events into view state:
//! - connection status (`disconnected`, `connecting`, `connected`, `registered`)
//! - an active session slot and an incoming session slot
//! - tones and notifications along the call lifecycle

mod controller;
mod dial;
mod ice;
mod link;
mod tones;

#[cfg(test)]
mod tests;

pub use controller::{can_call, PhoneController, PhoneServices};
pub use dial::DialRequest;
pub use ice::{DeadlineTimer, TaskTimer, TimerGuard};
pub use link::PageLocation;
#[cfg(not(target_arch = "wasm32"))]
pub use tones::SilentTonePlayer;
#[cfg(target_arch = "wasm32")]
pub use tones::HtmlTonePlayer;
pub use tones::{Tone, TonePlayer};

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::agent::{AgentError, SessionId};
use crate::state::Notification;

/// Phone-related errors
#[derive(Error, Debug)]
pub enum PhoneError {
    #[error("Not connected: {0}")]
    NotConnected(ConnectionStatus),

    #[error("A call is already in progress")]
    Busy,

    #[error("Nothing to dial")]
    EmptyTarget,

    #[error("No incoming call")]
    NoIncomingCall,

    #[error("No active call")]
    NoActiveCall,

    #[error("Phone has been shut down")]
    Disposed,

    #[error(transparent)]
    Agent(#[from] AgentError),
}

/// Result type for phone operations
pub type PhoneResult<T> = Result<T, PhoneError>;

/// Signaling connection status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConnectionStatus {
    #[default]
    Disconnected,
    Connecting,
    Connected,
    Registered,
}

impl ConnectionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConnectionStatus::Disconnected => "disconnected",
            ConnectionStatus::Connecting => "connecting",
            ConnectionStatus::Connected => "connected",
            ConnectionStatus::Registered => "registered",
        }
    }

    /// Connected to the signaling server, registered or not
    pub fn is_online(&self) -> bool {
        matches!(self, ConnectionStatus::Connected | ConnectionStatus::Registered)
    }

    pub fn color_class(&self) -> &'static str {
        match self {
            ConnectionStatus::Disconnected => "bg-red-500",
            ConnectionStatus::Connecting => "bg-yellow-500",
            ConnectionStatus::Connected => "bg-blue-500",
            ConnectionStatus::Registered => "bg-green-500",
        }
    }
}

impl std::fmt::Display for ConnectionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Sink for user-visible messages
pub trait Notifier {
    fn notify(&self, notification: Notification);
}

/// A session as shown in the view
#[derive(Debug, Clone, PartialEq)]
pub struct CallInfo {
    pub id: SessionId,
    pub remote: String,
}

/// Snapshot of the controller for rendering
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PhoneView {
    pub status: ConnectionStatus,
    pub session: Option<CallInfo>,
    pub incoming: Option<CallInfo>,
    /// A placed call has not reached `connecting` yet
    pub dialing: bool,
    /// When the active session was answered
    pub answered_at: Option<DateTime<Utc>>,
}

impl PhoneView {
    /// A session occupies either slot or is being dialed
    pub fn is_busy(&self) -> bool {
        self.session.is_some() || self.incoming.is_some() || self.dialing
    }

    pub fn can_call(&self) -> bool {
        can_call(
            self.status,
            self.session.is_some() || self.dialing,
            self.incoming.is_some(),
        )
    }
}
