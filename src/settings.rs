/// Settings tab logic: setting catalogue, input coercion, backup and restore payloads

use crate::error::{DashboardError, Result};
use crate::messaging::{BackupResponse, DashboardRequest, LocalData};
use serde::Deserialize;
use serde_json::{Map, Value};

pub const LARGE_MEDIA_SIZE: &str = "largeMediaSize";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingGroup {
    General,
    Privacy,
    CloudStorage,
}

/// An on/off setting rendered as a switch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoolSetting {
    pub name: &'static str,
    pub label_key: &'static str,
    pub group: SettingGroup,
}

impl BoolSetting {
    /// Whether the browser lacks support for this setting
    pub fn is_unsupported(&self, local: &LocalData) -> bool {
        match self.group {
            SettingGroup::General => false,
            SettingGroup::Privacy => local.privacy_settings_disabled(),
            SettingGroup::CloudStorage => local.cloud_storage_disabled(),
        }
    }
}

pub const BOOL_SETTINGS: &[BoolSetting] = &[
    BoolSetting { name: "collapseBlocked", label_key: "settingsCollapseBlockedPrompt", group: SettingGroup::General },
    BoolSetting { name: "showIconBadge", label_key: "settingsIconBadgePrompt", group: SettingGroup::General },
    BoolSetting { name: "contextMenuEnabled", label_key: "settingsContextMenuPrompt", group: SettingGroup::General },
    BoolSetting { name: "colorBlindFriendly", label_key: "settingsColorBlindPrompt", group: SettingGroup::General },
    BoolSetting { name: "tooltipsDisabled", label_key: "settingsTooltipsPrompt", group: SettingGroup::General },
    BoolSetting { name: "cloudStorageEnabled", label_key: "settingsCloudStorageEnabledPrompt", group: SettingGroup::CloudStorage },
    BoolSetting { name: "prefetchingDisabled", label_key: "settingsPrefetchingDisabledPrompt", group: SettingGroup::Privacy },
    BoolSetting { name: "hyperlinkAuditingDisabled", label_key: "settingsHyperlinkAuditingDisabledPrompt", group: SettingGroup::Privacy },
    BoolSetting { name: "webrtcIPAddressHidden", label_key: "settingsWebRTCIPAddressHiddenPrompt", group: SettingGroup::Privacy },
    BoolSetting { name: "noCosmeticFiltering", label_key: "settingsNoCosmeticFilteringPrompt", group: SettingGroup::General },
    BoolSetting { name: "noLargeMedia", label_key: "settingsNoLargeMediaPrompt", group: SettingGroup::General },
    BoolSetting { name: "noRemoteFonts", label_key: "settingsNoRemoteFontsPrompt", group: SettingGroup::General },
    BoolSetting { name: "advancedUserEnabled", label_key: "settingsAdvancedUserPrompt", group: SettingGroup::General },
];

/// Coerce a numeric text input into `[0, max]`.
///
/// Leading whitespace and an optional sign are accepted, then the longest run
/// of decimal digits is read ("12kb" is 12). No digits at all means 0.
pub fn clamp_numeric_input(input: &str, max: u32) -> u32 {
    let trimmed = input.trim_start();
    let (negative, rest) = match trimmed.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, trimmed.strip_prefix('+').unwrap_or(trimmed)),
    };

    let end = rest
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(rest.len());
    let digits = &rest[..end];

    if digits.is_empty() || negative {
        return 0;
    }

    match digits.parse::<u64>() {
        Ok(value) => value.min(u64::from(max)) as u32,
        // Too many digits for u64
        Err(_) => max,
    }
}

/// Disk usage in MiB, rounded up to two decimals
pub fn disk_usage_mib(bytes: f64) -> f64 {
    (bytes / 1024.0 / 1024.0 * 100.0).ceil() / 100.0
}

/// Validated content of a backup file picked for restore
#[derive(Debug, Clone, PartialEq)]
pub struct RestoreBundle {
    pub user_data: Value,
    /// When the backup was made, in milliseconds since the epoch
    pub time_stamp: Option<f64>,
}

/// Reject picked files that cannot be a backup before reading them
pub fn check_restore_file(name: &str, mime_type: &str) -> Result<()> {
    if name.is_empty() {
        return Err(DashboardError::RejectedFile("no file name".to_string()));
    }
    if !mime_type.starts_with("text") {
        return Err(DashboardError::RejectedFile(format!(
            "{} has type {:?}",
            name, mime_type
        )));
    }
    Ok(())
}

pub fn validate_restore_data(text: &str) -> Result<RestoreBundle> {
    let data: Value = serde_json::from_str(text)
        .map_err(|e| DashboardError::InvalidRestoreData(format!("not JSON: {}", e)))?;

    let object = data
        .as_object()
        .ok_or_else(|| invalid("top level is not an object"))?;

    if !object.get("userSettings").is_some_and(Value::is_object) {
        return Err(invalid("userSettings must be an object"));
    }
    if !object.get("netWhitelist").is_some_and(Value::is_string) {
        return Err(invalid("netWhitelist must be a string"));
    }

    let has_lists = object.get("filterLists").is_some_and(Value::is_object)
        || object.get("selectedFilterLists").is_some_and(Value::is_array);
    if !has_lists {
        return Err(invalid("filterLists or selectedFilterLists is required"));
    }

    let time_stamp = object.get("timeStamp").and_then(Value::as_f64);

    Ok(RestoreBundle {
        user_data: data,
        time_stamp,
    })
}

fn invalid(reason: &str) -> DashboardError {
    DashboardError::InvalidRestoreData(reason.to_string())
}

/// A text file the user picked
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PickedFile {
    pub name: String,
    #[serde(rename = "type")]
    pub mime_type: String,
    pub text: String,
}

/// Turn a picked backup file into the restore message for the background process.
///
/// `confirm` gets the bundle's time stamp and is only asked once the file is
/// valid. `Ok(None)` means the user declined. Errors mean nothing may be sent:
/// `RejectedFile` is dropped quietly, `InvalidRestoreData` deserves a prompt.
pub fn restore_request<F>(file: &PickedFile, confirm: F) -> Result<Option<DashboardRequest>>
where
    F: FnOnce(Option<f64>) -> bool,
{
    check_restore_file(&file.name, &file.mime_type)?;
    let bundle = validate_restore_data(&file.text)?;

    if !confirm(bundle.time_stamp) {
        return Ok(None);
    }

    Ok(Some(DashboardRequest::RestoreUserData {
        user_data: bundle.user_data,
        file: file.name.clone(),
    }))
}

/// Fill the `{{time}}` placeholder of the restore confirmation prompt
pub fn restore_confirm_message(template: &str, time: &str) -> String {
    template.replace("{{time}}", time)
}

/// Backup file body: the user data as indented JSON
pub fn backup_file_contents(user_data: &Map<String, Value>) -> Result<String> {
    Ok(serde_json::to_string_pretty(user_data)?)
}

/// File name and body to download for a backup reply.
/// `None` when the background process did not name the file.
pub fn backup_download(response: &BackupResponse) -> Result<Option<(String, String)>> {
    let Some(filename) = response.local_data.last_backup_file.clone() else {
        return Ok(None);
    };
    Ok(Some((filename, backup_file_contents(&response.user_data)?)))
}
