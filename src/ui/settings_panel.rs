/// Settings tab content: switches, the large media size box, local data and backups

use patternfly_yew::prelude::*;
use wasm_bindgen_futures::spawn_local;
use web_sys::HtmlInputElement;
use yew::prelude::*;

use crate::messaging::{BackupResponse, DashboardRequest, LocalData, SettingValue, UserSettings};
use crate::error::DashboardError;
use crate::settings::{
    BOOL_SETTINGS, BoolSetting, LARGE_MEDIA_SIZE, SettingGroup, backup_download,
    clamp_numeric_input, disk_usage_mib, restore_confirm_message, restore_request,
};
use crate::ui::bridge::{self, translate};
use crate::ui::components::StatusLine;

#[derive(Properties, PartialEq)]
pub struct SettingsPanelProps {
    pub channel: AttrValue,
    pub max_numeric_input: u32,
    pub user_settings: UserSettings,
    pub local_data: LocalData,
    pub on_setting_change: Callback<(&'static str, SettingValue)>,
    pub on_local_data: Callback<LocalData>,
}

#[function_component(SettingsPanel)]
pub fn settings_panel(props: &SettingsPanelProps) -> Html {
    let switch_for = |setting: &'static BoolSetting| -> Html {
        let onchange = {
            let channel = props.channel.clone();
            let on_setting_change = props.on_setting_change.clone();
            let name = setting.name;

            Callback::from(move |e: Event| {
                let input: HtmlInputElement = e.target_unchecked_into();
                let value = SettingValue::Bool(input.checked());
                bridge::post(
                    &channel,
                    DashboardRequest::SaveUserSetting {
                        name: name.to_string(),
                        value,
                    },
                );
                on_setting_change.emit((name, value));
            })
        };

        html! {
            <label class="nano-setting-switch">
                <input
                    type="checkbox"
                    id={format!("settings-{}", setting.name)}
                    checked={props.user_settings.is_enabled(setting.name)}
                    disabled={setting.is_unsupported(&props.local_data)}
                    onchange={onchange}
                />
                <span>{translate(setting.label_key)}</span>
            </label>
        }
    };

    let group = |group: SettingGroup| -> Html {
        html! {
            <>
                {for BOOL_SETTINGS.iter().filter(|s| s.group == group).map(|s| switch_for(s))}
            </>
        }
    };

    // Large media size box
    let on_large_media_change = {
        let channel = props.channel.clone();
        let on_setting_change = props.on_setting_change.clone();
        let max = props.max_numeric_input;

        Callback::from(move |e: Event| {
            let input: HtmlInputElement = e.target_unchecked_into();
            let size = clamp_numeric_input(&input.value(), max);
            if input.value() != size.to_string() {
                input.set_value(&size.to_string());
            }

            let value = SettingValue::Number(size);
            bridge::post(
                &channel,
                DashboardRequest::SaveUserSetting {
                    name: LARGE_MEDIA_SIZE.to_string(),
                    value,
                },
            );
            on_setting_change.emit((LARGE_MEDIA_SIZE, value));
        })
    };
    let large_media_size = props
        .user_settings
        .number(LARGE_MEDIA_SIZE)
        .map(|n| n.to_string())
        .unwrap_or_default();

    // Backup handler
    let on_backup = {
        let channel = props.channel.clone();
        let on_local_data = props.on_local_data.clone();

        Callback::from(move |_| {
            let channel = channel.clone();
            let on_local_data = on_local_data.clone();

            spawn_local(async move {
                let response: BackupResponse =
                    match bridge::send(&channel, &DashboardRequest::BackupUserData).await {
                        Ok(response) => response,
                        Err(e) => {
                            log::error!("Backup failed: {}", e);
                            return;
                        }
                    };

                match backup_download(&response) {
                    Ok(Some((filename, contents))) => bridge::download_text(&contents, &filename),
                    Ok(None) => log::warn!("Backup reply has no file name, nothing downloaded"),
                    Err(e) => log::error!("Backup failed: {}", e),
                }

                on_local_data.emit(response.local_data);
            });
        })
    };

    // Restore handler
    let on_restore = {
        let channel = props.channel.clone();

        Callback::from(move |_| {
            let channel = channel.clone();

            spawn_local(async move {
                let file = match bridge::pick_text_file().await {
                    Ok(Some(file)) => file,
                    Ok(None) => return,
                    Err(e) => {
                        log::warn!("File picker failed: {}", e);
                        return;
                    }
                };

                let ask = |time_stamp: Option<f64>| {
                    let time = time_stamp.map(bridge::format_time).unwrap_or_default();
                    bridge::confirm(&restore_confirm_message(
                        &translate("aboutRestoreDataConfirm"),
                        &time,
                    ))
                };

                match restore_request(&file, ask) {
                    Ok(Some(request)) => {
                        log::info!("Restoring user data from {}", file.name);
                        bridge::post(&channel, request);
                    }
                    Ok(None) => {}
                    Err(e @ DashboardError::InvalidRestoreData(_)) => {
                        log::info!("{}: {}", file.name, e);
                        bridge::alert(&translate("aboutRestoreDataError"));
                    }
                    Err(e) => log::info!("{}", e),
                }
            });
        })
    };

    // Factory reset handler
    let on_reset = {
        let channel = props.channel.clone();

        Callback::from(move |_| {
            if bridge::confirm(&translate("aboutResetDataConfirm")) {
                log::info!("Resetting user data");
                bridge::post(&channel, DashboardRequest::ResetUserData);
            }
        })
    };

    let local = &props.local_data;
    let disk_usage = local.storage_used.map(|bytes| {
        format!(
            "{}{}{}",
            translate("settingDiskUsage"),
            disk_usage_mib(bytes),
            translate("settingMebibyte")
        )
    });
    let last_backup = local.last_backup();
    let last_restore = local.last_restore();

    html! {
        <div class="nano-settings">
            <div id="settings-general-group" class="nano-settings-group">
                {group(SettingGroup::General)}
                <label class="nano-inline-textbox">
                    <span>{translate("settingsLargeMediaSizePrompt")}</span>
                    <input
                        type="number"
                        id="nano-settings-textbox-0"
                        min="0"
                        max={props.max_numeric_input.to_string()}
                        value={large_media_size}
                        onchange={on_large_media_change}
                    />
                </label>
            </div>

            <div id="settings-privacy-group" class="nano-settings-group">
                {group(SettingGroup::Privacy)}
            </div>

            <div id="settings-cloud-group" class="nano-settings-group">
                {group(SettingGroup::CloudStorage)}
            </div>

            <div class="nano-settings-group">
                <StatusLine id="nano-settings-disk-usage" text={disk_usage} />
                <StatusLine
                    id="nano-settings-last-backup"
                    text={last_backup.map(|(_, time)| format!("{} {}", translate("settingsLastBackupPrompt"), bridge::format_time_long(time)))}
                />
                <StatusLine
                    id="nano-settings-last-backedup-file"
                    text={last_backup.map(|(file, _)| format!("{} {}", translate("settingsLastBackedupFilePrompt"), file))}
                />
                <StatusLine
                    id="nano-settings-last-restore"
                    text={last_restore.map(|(_, time)| format!("{} {}", translate("settingsLastRestorePrompt"), bridge::format_time_long(time)))}
                />
                <StatusLine
                    id="nano-settings-last-restored-file"
                    text={last_restore.map(|(file, _)| format!("{} {}", translate("settingsLastRestoredFilePrompt"), file))}
                />
            </div>

            <div class="flex-column-gap">
                <Button onclick={on_backup} variant={ButtonVariant::Secondary}>
                    {translate("aboutBackupDataButton")}
                </Button>
                <Button onclick={on_restore} variant={ButtonVariant::Secondary}>
                    {translate("aboutRestoreDataButton")}
                </Button>
                <Button onclick={on_reset} variant={ButtonVariant::Danger}>
                    {translate("aboutResetDataButton")}
                </Button>
            </div>
        </div>
    }
}
