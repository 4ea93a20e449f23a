//! Settings persistence backends

#[cfg(any(target_arch = "wasm32", test))]
use std::cell::RefCell;

use super::{Settings, SettingsResult};
#[cfg(any(target_arch = "wasm32", test))]
use super::SettingsError;

/// Persistent storage for the settings object
pub trait SettingsStorage {
    /// Read the stored settings, `None` when nothing was stored yet
    fn get(&self) -> SettingsResult<Option<Settings>>;

    /// Store the settings, replacing any previous copy
    fn set(&self, settings: &Settings) -> SettingsResult<()>;

    /// Remove the stored copy
    fn clear(&self) -> SettingsResult<()>;
}

/// In-memory storage, used when no persistent backend is available
#[cfg(any(target_arch = "wasm32", test))]
#[derive(Default)]
pub struct MemoryStorage {
    stored: RefCell<Option<Settings>>,
}

#[cfg(any(target_arch = "wasm32", test))]
impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_settings(settings: Settings) -> Self {
        Self {
            stored: RefCell::new(Some(settings)),
        }
    }
}

#[cfg(any(target_arch = "wasm32", test))]
impl SettingsStorage for MemoryStorage {
    fn get(&self) -> SettingsResult<Option<Settings>> {
        Ok(self.stored.borrow().clone())
    }

    fn set(&self, settings: &Settings) -> SettingsResult<()> {
        *self.stored.borrow_mut() = Some(settings.clone());
        Ok(())
    }

    fn clear(&self) -> SettingsResult<()> {
        *self.stored.borrow_mut() = None;
        Ok(())
    }
}

/// JSON file storage for native builds
#[cfg(not(target_arch = "wasm32"))]
pub struct FileStorage {
    path: std::path::PathBuf,
}

#[cfg(not(target_arch = "wasm32"))]
impl FileStorage {
    pub fn new(path: impl AsRef<std::path::Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Storage at `SOFTPHONE_SETTINGS_FILE`, or `softphone-settings.json`
    pub fn from_env() -> Self {
        let path = std::env::var("SOFTPHONE_SETTINGS_FILE")
            .unwrap_or_else(|_| "softphone-settings.json".to_string());
        Self::new(path)
    }
}

#[cfg(not(target_arch = "wasm32"))]
impl SettingsStorage for FileStorage {
    fn get(&self) -> SettingsResult<Option<Settings>> {
        match std::fs::read_to_string(&self.path) {
            Ok(contents) => Ok(Some(serde_json::from_str(&contents)?)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set(&self, settings: &Settings) -> SettingsResult<()> {
        let contents = serde_json::to_string_pretty(settings)?;
        // Write beside the target and rename so a failed write never leaves
        // a truncated file behind.
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, contents)?;
        std::fs::rename(&tmp, &self.path)?;
        tracing::debug!("Settings written to {:?}", self.path);
        Ok(())
    }

    fn clear(&self) -> SettingsResult<()> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// Browser local storage
#[cfg(target_arch = "wasm32")]
pub struct LocalStorage {
    key: String,
}

#[cfg(target_arch = "wasm32")]
impl LocalStorage {
    pub const DEFAULT_KEY: &'static str = "softphone-settings";

    pub fn new() -> Self {
        Self {
            key: Self::DEFAULT_KEY.to_string(),
        }
    }

    fn storage(&self) -> SettingsResult<web_sys::Storage> {
        web_sys::window()
            .and_then(|w| w.local_storage().ok().flatten())
            .ok_or_else(|| SettingsError::Storage("localStorage not available".to_string()))
    }
}

#[cfg(target_arch = "wasm32")]
fn js_error(e: wasm_bindgen::JsValue) -> SettingsError {
    SettingsError::Storage(format!("{:?}", e))
}

#[cfg(target_arch = "wasm32")]
impl SettingsStorage for LocalStorage {
    fn get(&self) -> SettingsResult<Option<Settings>> {
        let raw = self.storage()?.get_item(&self.key).map_err(js_error)?;
        match raw {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }

    fn set(&self, settings: &Settings) -> SettingsResult<()> {
        let json = serde_json::to_string(settings)?;
        self.storage()?.set_item(&self.key, &json).map_err(js_error)
    }

    fn clear(&self) -> SettingsResult<()> {
        self.storage()?.remove_item(&self.key).map_err(js_error)
    }
}

/// Storage backend for the current platform
#[cfg(target_arch = "wasm32")]
pub fn platform_storage() -> Box<dyn SettingsStorage> {
    let storage = LocalStorage::new();
    match storage.storage() {
        Ok(_) => Box::new(storage),
        Err(e) => {
            tracing::warn!("{}, settings will not survive a reload", e);
            Box::new(MemoryStorage::new())
        }
    }
}

/// Storage backend for the current platform
#[cfg(not(target_arch = "wasm32"))]
pub fn platform_storage() -> Box<dyn SettingsStorage> {
    Box::new(FileStorage::from_env())
}

/// Settings injected by the hosting page as `window.SETTINGS`
#[cfg(target_arch = "wasm32")]
pub fn injected_settings() -> Option<serde_json::Value> {
    let window = web_sys::window()?;
    let global = js_sys::Reflect::get(&window, &"SETTINGS".into()).ok()?;
    if global.is_undefined() || global.is_null() {
        return None;
    }

    let json = js_sys::JSON::stringify(&global).ok()?.as_string()?;
    parse_injected(&json)
}

/// Settings injected through the `SOFTPHONE_SETTINGS` environment variable
#[cfg(not(target_arch = "wasm32"))]
pub fn injected_settings() -> Option<serde_json::Value> {
    let json = std::env::var("SOFTPHONE_SETTINGS").ok()?;
    parse_injected(&json)
}

/// Injected settings must be a JSON object
fn parse_injected(json: &str) -> Option<serde_json::Value> {
    match serde_json::from_str::<serde_json::Value>(json) {
        Ok(value) if value.is_object() => Some(value),
        Ok(_) => {
            tracing::warn!("Ignoring injected settings: not an object");
            None
        }
        Err(e) => {
            tracing::warn!("Ignoring injected settings: {}", e);
            None
        }
    }
}

/// Storage whose writes always fail, for exercising error paths
#[cfg(test)]
pub(crate) struct FailingStorage;

#[cfg(test)]
impl SettingsStorage for FailingStorage {
    fn get(&self) -> SettingsResult<Option<Settings>> {
        Ok(None)
    }

    fn set(&self, _settings: &Settings) -> SettingsResult<()> {
        Err(SettingsError::Storage("quota exceeded".to_string()))
    }

    fn clear(&self) -> SettingsResult<()> {
        Err(SettingsError::Storage("quota exceeded".to_string()))
    }
}
