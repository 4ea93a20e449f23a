//! Softphone settings
//!
//! Settings are resolved once at startup from three layers:
//! - the persisted copy (browser local storage or a JSON file on native)
//! - an injected global configuration (`window.SETTINGS` or `SOFTPHONE_SETTINGS`)
//! - the built-in defaults
//!
//! The [`SettingsManager`] owns the single authoritative settings object and
//! writes every change through to its storage backend.

mod storage;


pub use storage::*;

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Fallback SIP domain for dialed usernames
pub const DEFAULT_SIP_DOMAIN: &str = "vrs.qa.sip.svrs.net";

/// Fixed destination domain for VRS calls
pub const DEFAULT_VRS_SIP_DOMAIN: &str = "vrs-eng.qa.sip.svrs.net";

/// Settings-related errors
#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Invalid settings: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for settings operations
pub type SettingsResult<T> = Result<T, SettingsError>;

/// WebSocket transport settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SocketSettings {
    /// Signaling server WebSocket URI (ws:// or wss://)
    pub uri: String,
    /// Via transport override, "auto" keeps the agent's choice
    pub via_transport: String,
}

impl Default for SocketSettings {
    fn default() -> Self {
        Self {
            uri: "wss://vrs.qa.sip.svrs.net".to_string(),
            via_transport: "auto".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IceServer {
    pub urls: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credential: Option<String>,
}

/// RTCPeerConnection configuration handed to the agent
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PcConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rtcp_mux_policy: Option<String>,
    #[serde(default)]
    pub ice_servers: Vec<IceServer>,
}

impl PcConfig {
    /// Configuration used when settings carry no peer connection config
    pub fn empty() -> Self {
        Self {
            rtcp_mux_policy: None,
            ice_servers: Vec::new(),
        }
    }
}

impl Default for PcConfig {
    fn default() -> Self {
        Self {
            rtcp_mux_policy: Some("negotiate".to_string()),
            ice_servers: vec![IceServer {
                urls: vec!["stun:stun.l.google.com:19302".to_string()],
                username: None,
                credential: None,
            }],
        }
    }
}

/// Call statistics integration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CallstatsSettings {
    pub enabled: bool,
    #[serde(rename = "AppID", skip_serializing_if = "Option::is_none")]
    pub app_id: Option<String>,
    #[serde(rename = "AppSecret", skip_serializing_if = "Option::is_none")]
    pub app_secret: Option<String>,
}

/// User and application settings
///
/// Field names match the JSON stored in local storage and the keys accepted
/// from the injected global configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub display_name: Option<String>,
    /// Own SIP URI (e.g., "sip:alice@example.com")
    pub uri: Option<String>,
    pub password: Option<String>,
    pub socket: SocketSettings,
    pub registrar_server: Option<String>,
    pub contact_uri: Option<String>,
    pub authorization_user: Option<String>,
    pub instance_id: Option<String>,
    pub session_timers: bool,
    pub use_preloaded_route: bool,
    #[serde(rename = "pcConfig")]
    pub pc_config: Option<PcConfig>,
    /// ICE candidate gathering deadline in milliseconds
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ice_gather_timeout: Option<u64>,
    pub callstats: CallstatsSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            display_name: None,
            uri: None,
            password: None,
            socket: SocketSettings::default(),
            registrar_server: None,
            contact_uri: None,
            authorization_user: None,
            instance_id: None,
            session_timers: false,
            use_preloaded_route: false,
            pc_config: Some(PcConfig::default()),
            ice_gather_timeout: None,
            callstats: CallstatsSettings::default(),
        }
    }
}

impl Settings {
    /// Peer connection config, or an empty ICE server list when unset
    pub fn pc_config_or_empty(&self) -> PcConfig {
        self.pc_config.clone().unwrap_or_else(PcConfig::empty)
    }

    /// ICE gather deadline, only when configured with a nonzero value
    pub fn ice_gather_deadline(&self) -> Option<std::time::Duration> {
        self.ice_gather_timeout
            .filter(|ms| *ms > 0)
            .map(std::time::Duration::from_millis)
    }
}

/// Merge `overlay` into `base`: objects merge per key, everything else
/// (arrays included) is replaced wholesale.
pub fn merge_layer(base: &mut Value, overlay: Value) {
    match (base, overlay) {
        (Value::Object(base), Value::Object(overlay)) => {
            for (key, value) in overlay {
                match base.get_mut(&key) {
                    Some(slot) => merge_layer(slot, value),
                    None => {
                        base.insert(key, value);
                    }
                }
            }
        }
        (slot, overlay) => *slot = overlay,
    }
}

/// Resolve settings from the persisted and injected layers.
///
/// The injected global wins over persisted values. Returns `None` when
/// neither layer produced settings.
pub fn resolve(persisted: Option<Settings>, global: Option<Value>) -> Option<Settings> {
    let Some(global) = global else {
        return persisted;
    };

    tracing::debug!("global settings found");

    let mut merged = match &persisted {
        Some(settings) => match serde_json::to_value(settings) {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!("Failed to serialize persisted settings: {}", e);
                return persisted;
            }
        },
        None => Value::Object(Default::default()),
    };
    merge_layer(&mut merged, global);

    match serde_json::from_value(merged) {
        Ok(settings) => Some(settings),
        Err(e) => {
            tracing::warn!("Ignoring invalid global settings: {}", e);
            persisted
        }
    }
}

/// Owner of the authoritative settings object
pub struct SettingsManager {
    settings: Arc<Settings>,
    storage: Box<dyn SettingsStorage>,
}

impl SettingsManager {
    /// Load settings: persisted, then injected global, then defaults
    pub fn load(storage: Box<dyn SettingsStorage>, global: Option<Value>) -> Self {
        let persisted = match storage.get() {
            Ok(Some(settings)) => {
                tracing::debug!("settings found in storage");
                Some(settings)
            }
            Ok(None) => None,
            Err(e) => {
                tracing::warn!("Failed to read stored settings: {}", e);
                None
            }
        };

        let settings = resolve(persisted, global).unwrap_or_else(|| {
            tracing::debug!("no settings found, using default ones");
            Settings::default()
        });

        Self {
            settings: Arc::new(settings),
            storage,
        }
    }

    /// Current settings snapshot
    pub fn get(&self) -> Arc<Settings> {
        Arc::clone(&self.settings)
    }

    /// Replace the settings. The in-memory copy only changes once storage
    /// accepted the new value.
    pub fn set(&mut self, settings: Settings) -> SettingsResult<()> {
        self.storage.set(&settings)?;
        self.settings = Arc::new(settings);
        Ok(())
    }

    /// Reset to defaults and drop the persisted copy
    pub fn clear(&mut self) -> SettingsResult<()> {
        self.storage.clear()?;
        self.settings = Arc::new(Settings::default());
        Ok(())
    }

    /// True once an own SIP URI is configured
    pub fn is_ready(&self) -> bool {
        self.settings
            .uri
            .as_deref()
            .is_some_and(|uri| !uri.is_empty())
    }

    pub fn default_domain(&self) -> &'static str {
        DEFAULT_SIP_DOMAIN
    }

    pub fn default_vrs_domain(&self) -> &'static str {
        DEFAULT_VRS_SIP_DOMAIN
    }
}
