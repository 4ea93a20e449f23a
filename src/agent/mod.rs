//! SIP user agent interface
//!
//! Signaling, SDP and ICE are owned by an external SIP/WebRTC user agent
//! (JsSIP in the browser). This module defines the typed surface the phone
//! controller drives:
//! - [`UserAgent`] and [`RtcSession`] operations
//! - [`AgentEvent`] / [`SessionEvent`] delivered over an unbounded channel
//! - [`UaConfig`] built from settings

mod config;
#[cfg(target_arch = "wasm32")]
mod jssip;

pub use config::{hash_password, SocketConfig, UaConfig, USER_AGENT};

use std::rc::Rc;

use futures::channel::mpsc;
use serde::Serialize;
use thiserror::Error;

use crate::settings::PcConfig;

/// Agent-related errors
#[derive(Error, Debug)]
pub enum AgentError {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("User agent not available: {0}")]
    Unavailable(String),

    #[error("Call failed: {0}")]
    CallFailed(String),

    #[error("Session operation failed: {0}")]
    Session(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for agent operations
pub type AgentResult<T> = Result<T, AgentError>;

/// Identifier the agent binding assigns to each session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SessionId(pub u64);

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "session-{}", self.0)
    }
}

/// Who caused an event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Originator {
    Local,
    Remote,
    System,
}

impl From<&str> for Originator {
    fn from(s: &str) -> Self {
        match s {
            "local" => Originator::Local,
            "remote" => Originator::Remote,
            _ => Originator::System,
        }
    }
}

/// A call session owned by the agent
pub trait RtcSession {
    fn id(&self) -> SessionId;

    /// Remote party URI as reported by the agent
    fn remote_identity(&self) -> String;

    fn answer(&self, options: AnswerOptions) -> AgentResult<()>;

    /// Terminate the session, with the agent's default reason when `None`
    fn terminate(&self, options: Option<TerminateOptions>) -> AgentResult<()>;

    /// Stop waiting for more ICE candidates and continue with what was gathered
    fn finish_ice_gathering(&self);
}

/// Shared handle to an agent session
pub type SessionHandle = Rc<dyn RtcSession>;

/// The SIP user agent
pub trait UserAgent {
    fn start(&self);

    fn stop(&self);

    /// Whether the signaling transport is connected
    fn is_connected(&self) -> bool;

    /// Start an outgoing call
    fn call(&self, target: &str, options: CallOptions) -> AgentResult<SessionHandle>;

    /// Detach every event listener; no events are delivered afterwards
    fn unsubscribe(&self);
}

/// Per-session lifecycle events
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    Connecting,
    Progress,
    Failed { originator: Originator, cause: String },
    Ended { originator: Originator, cause: String },
    Accepted,
    IceCandidate,
    Sdp { originator: Originator },
}

impl SessionEvent {
    pub fn is_terminal(&self) -> bool {
        matches!(self, SessionEvent::Failed { .. } | SessionEvent::Ended { .. })
    }
}

/// Agent-level events
#[derive(Clone)]
pub enum AgentEvent {
    Connecting,
    Connected,
    Disconnected,
    Registered,
    Unregistered,
    RegistrationFailed { cause: String },
    /// A session was created, by us (`Local`) or by a remote caller
    NewSession {
        session: SessionHandle,
        originator: Originator,
    },
    /// Lifecycle event of a known session
    Session { id: SessionId, event: SessionEvent },
}

impl std::fmt::Debug for AgentEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AgentEvent::Connecting => write!(f, "Connecting"),
            AgentEvent::Connected => write!(f, "Connected"),
            AgentEvent::Disconnected => write!(f, "Disconnected"),
            AgentEvent::Registered => write!(f, "Registered"),
            AgentEvent::Unregistered => write!(f, "Unregistered"),
            AgentEvent::RegistrationFailed { cause } => {
                write!(f, "RegistrationFailed({})", cause)
            }
            AgentEvent::NewSession {
                session,
                originator,
            } => write!(f, "NewSession({}, {:?})", session.id(), originator),
            AgentEvent::Session { id, event } => write!(f, "Session({}, {:?})", id, event),
        }
    }
}

/// Receiving end of the agent event channel
pub type AgentEvents = mpsc::UnboundedReceiver<AgentEvent>;

/// Sending end of the agent event channel
pub type AgentEventSender = mpsc::UnboundedSender<AgentEvent>;

pub fn event_channel() -> (AgentEventSender, AgentEvents) {
    mpsc::unbounded()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MediaConstraints {
    pub audio: bool,
    pub video: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OfferConstraints {
    pub offer_to_receive_audio: u8,
    pub offer_to_receive_video: u8,
}

/// Options for an outgoing call
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CallOptions {
    #[serde(rename = "pcConfig")]
    pub pc_config: PcConfig,
    #[serde(rename = "mediaConstraints")]
    pub media_constraints: MediaConstraints,
    #[serde(rename = "rtcOfferConstraints")]
    pub offer_constraints: OfferConstraints,
}

impl CallOptions {
    /// Bidirectional audio and video call
    pub fn audio_video(pc_config: PcConfig) -> Self {
        Self {
            pc_config,
            media_constraints: MediaConstraints {
                audio: true,
                video: true,
            },
            offer_constraints: OfferConstraints {
                offer_to_receive_audio: 1,
                offer_to_receive_video: 1,
            },
        }
    }
}

/// Options for answering an incoming call
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnswerOptions {
    #[serde(rename = "pcConfig")]
    pub pc_config: PcConfig,
}

/// SIP response used to terminate a session
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TerminateOptions {
    pub status_code: u16,
    pub reason_phrase: String,
}

impl TerminateOptions {
    /// 486 Busy Here
    pub fn busy_here() -> Self {
        Self {
            status_code: 486,
            reason_phrase: "Busy Here".to_string(),
        }
    }
}

/// Create and wire up the user agent for the given configuration.
///
/// The agent is not started; call [`UserAgent::start`] once the event
/// stream is being consumed.
#[cfg(target_arch = "wasm32")]
pub fn connect(
    config: &UaConfig,
    settings: &crate::settings::Settings,
) -> AgentResult<(Rc<dyn UserAgent>, AgentEvents)> {
    let (agent, events) = jssip::JsSipAgent::new(config)?;

    if settings.callstats.enabled {
        agent.attach_callstats(
            settings.callstats.app_id.as_deref().unwrap_or_default(),
            settings.callstats.app_secret.as_deref().unwrap_or_default(),
        );
    }

    Ok((Rc::new(agent), events))
}

/// Native builds have no browser SIP stack to drive
#[cfg(not(target_arch = "wasm32"))]
pub fn connect(
    config: &UaConfig,
    _settings: &crate::settings::Settings,
) -> AgentResult<(Rc<dyn UserAgent>, AgentEvents)> {
    tracing::warn!("No SIP user agent for {} on this platform", config.uri);
    Err(AgentError::Unavailable(
        "the SIP user agent requires a browser".to_string(),
    ))
}
