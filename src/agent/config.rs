//! User agent configuration
//!
//! Built from [`Settings`] right before the agent is constructed.

use serde::Serialize;

use super::{AgentError, AgentResult};
use crate::settings::Settings;

/// User-Agent header sent by the agent
pub const USER_AGENT: &str = "Sorenson Videophone WebRTC";

/// MD5 of the password as uppercase hex.
///
/// The signaling server expects this form instead of the clear password.
pub fn hash_password(password: &str) -> String {
    format!("{:X}", md5::compute(password.as_bytes()))
}

/// Signaling socket
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SocketConfig {
    pub uri: String,
    /// Via transport override, `None` when settings say "auto"
    pub via_transport: Option<String>,
}

/// Agent construction parameters
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UaConfig {
    pub uri: String,
    /// Hashed, see [`hash_password`]
    pub password: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(skip)]
    pub socket: SocketConfig,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub registrar_server: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact_uri: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub authorization_user: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instance_id: Option<String>,
    pub session_timers: bool,
    pub use_preloaded_route: bool,
    pub user_agent: String,
}

fn non_empty(value: &Option<String>) -> Option<String> {
    value.as_ref().filter(|v| !v.is_empty()).cloned()
}

impl UaConfig {
    /// Build and validate the agent configuration
    pub fn from_settings(settings: &Settings) -> AgentResult<Self> {
        let uri = non_empty(&settings.uri)
            .ok_or_else(|| AgentError::InvalidConfig("SIP URI is required".to_string()))?;
        if !(uri.starts_with("sip:") || uri.starts_with("sips:")) {
            return Err(AgentError::InvalidConfig(format!("invalid SIP URI: {}", uri)));
        }

        let socket_uri = settings.socket.uri.trim();
        if !(socket_uri.starts_with("wss://") || socket_uri.starts_with("ws://")) {
            return Err(AgentError::InvalidConfig(format!(
                "invalid WebSocket URI: {}",
                settings.socket.uri
            )));
        }

        let instance_id = non_empty(&settings.instance_id);
        if let Some(id) = &instance_id {
            uuid::Uuid::parse_str(id).map_err(|e| {
                AgentError::InvalidConfig(format!("invalid instance_id {}: {}", id, e))
            })?;
        }

        let via_transport = Some(settings.socket.via_transport.as_str())
            .filter(|v| !v.is_empty() && *v != "auto")
            .map(str::to_string);

        Ok(Self {
            uri,
            password: hash_password(settings.password.as_deref().unwrap_or_default()),
            display_name: non_empty(&settings.display_name),
            socket: SocketConfig {
                uri: socket_uri.to_string(),
                via_transport,
            },
            registrar_server: non_empty(&settings.registrar_server),
            contact_uri: non_empty(&settings.contact_uri),
            authorization_user: non_empty(&settings.authorization_user),
            instance_id,
            session_timers: false,
            use_preloaded_route: settings.use_preloaded_route,
            user_agent: USER_AGENT.to_string(),
        })
    }
}
