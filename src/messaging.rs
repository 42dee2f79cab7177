/// Request and response types exchanged with the background process

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A message for the background process, tagged by its `what` field
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "what")]
pub enum DashboardRequest {
    #[serde(rename = "getLocalData")]
    GetLocalData,
    #[serde(rename = "userSettings")]
    ReadUserSettings,
    #[serde(rename = "userSettings")]
    SaveUserSetting { name: String, value: SettingValue },
    #[serde(rename = "backupUserData")]
    BackupUserData,
    #[serde(rename = "restoreUserData")]
    RestoreUserData {
        #[serde(rename = "userData")]
        user_data: Value,
        file: String,
    },
    #[serde(rename = "resetUserData")]
    ResetUserData,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(untagged)]
pub enum SettingValue {
    Bool(bool),
    Number(u32),
}

/// The user's settings as the background process reports them
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(transparent)]
pub struct UserSettings(Map<String, Value>);

impl UserSettings {
    /// True only when the stored value is the boolean `true`
    pub fn is_enabled(&self, name: &str) -> bool {
        self.0.get(name) == Some(&Value::Bool(true))
    }

    pub fn number(&self, name: &str) -> Option<u64> {
        self.0.get(name).and_then(Value::as_u64)
    }

    /// Apply a change locally after it was sent
    pub fn set(&mut self, name: &str, value: SettingValue) {
        let value = match value {
            SettingValue::Bool(b) => Value::Bool(b),
            SettingValue::Number(n) => Value::from(n),
        };
        self.0.insert(name.to_string(), value);
    }
}

/// Storage and backup bookkeeping shown on the settings tab
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LocalData {
    /// Bytes used by the extension's storage
    pub storage_used: Option<f64>,
    pub last_backup_file: Option<String>,
    /// Milliseconds since the epoch
    pub last_backup_time: Option<f64>,
    pub last_restore_file: Option<String>,
    pub last_restore_time: Option<f64>,
    pub cloud_storage_supported: Option<bool>,
    pub privacy_settings_supported: Option<bool>,
}

impl LocalData {
    pub fn cloud_storage_disabled(&self) -> bool {
        self.cloud_storage_supported == Some(false)
    }

    pub fn privacy_settings_disabled(&self) -> bool {
        self.privacy_settings_supported == Some(false)
    }

    /// File name and time of the last backup, when one was made
    pub fn last_backup(&self) -> Option<(&str, f64)> {
        non_empty(&self.last_backup_file).map(|file| (file, self.last_backup_time.unwrap_or(0.0)))
    }

    pub fn last_restore(&self) -> Option<(&str, f64)> {
        non_empty(&self.last_restore_file).map(|file| (file, self.last_restore_time.unwrap_or(0.0)))
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|s| !s.is_empty())
}

/// Reply to `backupUserData`
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackupResponse {
    pub user_data: Map<String, Value>,
    pub local_data: LocalData,
}
