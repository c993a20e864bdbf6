//! Runtime configuration record.
//!
//! This is the document the SPA reads and writes through `/api/config`.
//! Keys are serialized in upper snake case to match the file format the
//! frontend already ships with.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Hosts the outbound proxy may reach when no config file exists yet.
pub const STARTER_PROXY_HOSTS: [&str; 3] = ["api.imgbb.com", "api.imgur.com", "api.cloudinary.com"];

/// Runtime configuration shared between the SPA and the edge server.
///
/// `Default` yields the empty record (everything off, no proxy hosts).
/// Use [`AppConfig::starter`] for the record installed on first run.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct AppConfig {
    /// Whether the privacy disguise is active.
    #[serde(rename = "PRIVACY_MODE")]
    pub privacy_mode: bool,

    /// Identifier of the disguise module shown while locked.
    #[serde(rename = "SELECTED_MODULE")]
    pub selected_module: String,

    /// Unlock secret per module.
    #[serde(rename = "MODULE_UNLOCK_VALUES")]
    pub module_unlock_values: BTreeMap<String, String>,

    #[serde(rename = "UNLOCK_GESTURE")]
    pub unlock_gesture: String,

    #[serde(rename = "UNLOCK_PATTERN")]
    pub unlock_pattern: String,

    #[serde(rename = "UNLOCK_FINGERS")]
    pub unlock_fingers: i64,

    /// Minutes of inactivity before the app locks itself.
    #[serde(rename = "AUTO_LOCK_MINUTES")]
    pub auto_lock_minutes: i64,

    #[serde(rename = "DEBUG_MODE")]
    pub debug_mode: bool,

    /// Hosts the outbound proxy endpoints may contact.
    #[serde(rename = "ALLOWED_PROXY_HOSTS")]
    pub allowed_proxy_hosts: Vec<String>,
}

impl AppConfig {
    /// The record installed when no configuration file can be read.
    pub fn starter() -> Self {
        let module_unlock_values = [
            ("calculator", "123456="),
            ("notepad", "secret"),
            ("game-2048", ""),
        ]
        .into_iter()
        .map(|(module, secret)| (module.to_string(), secret.to_string()))
        .collect();

        Self {
            privacy_mode: false,
            selected_module: "game-2048".to_string(),
            module_unlock_values,
            unlock_gesture: "severalFingers".to_string(),
            unlock_pattern: "0-4-8-5".to_string(),
            unlock_fingers: 4,
            auto_lock_minutes: 5,
            debug_mode: false,
            allowed_proxy_hosts: STARTER_PROXY_HOSTS.iter().map(|h| h.to_string()).collect(),
        }
    }

    /// Apply a partial update.
    ///
    /// Only recognized keys whose JSON type matches the field are applied;
    /// anything else is ignored. `MODULE_UNLOCK_VALUES` is merged key by key
    /// and `ALLOWED_PROXY_HOSTS` is never writable from here.
    pub fn apply_partial(&mut self, updates: &Map<String, Value>) {
        if let Some(v) = updates.get("PRIVACY_MODE").and_then(Value::as_bool) {
            self.privacy_mode = v;
        }
        if let Some(v) = updates.get("SELECTED_MODULE").and_then(Value::as_str) {
            self.selected_module = v.to_string();
        }
        if let Some(v) = updates.get("UNLOCK_GESTURE").and_then(Value::as_str) {
            self.unlock_gesture = v.to_string();
        }
        if let Some(v) = updates.get("UNLOCK_PATTERN").and_then(Value::as_str) {
            self.unlock_pattern = v.to_string();
        }
        if let Some(v) = updates.get("UNLOCK_FINGERS").and_then(Value::as_f64) {
            self.unlock_fingers = v as i64;
        }
        if let Some(v) = updates.get("AUTO_LOCK_MINUTES").and_then(Value::as_f64) {
            self.auto_lock_minutes = v as i64;
        }
        if let Some(v) = updates.get("DEBUG_MODE").and_then(Value::as_bool) {
            self.debug_mode = v;
        }
        if let Some(values) = updates.get("MODULE_UNLOCK_VALUES").and_then(Value::as_object) {
            for (module, secret) in values {
                if let Some(secret) = secret.as_str() {
                    self.module_unlock_values
                        .insert(module.clone(), secret.to_string());
                }
            }
        }
    }
}
