/// JS bridge to the extension APIs the dashboard page exposes

use serde::Serialize;
use serde::de::DeserializeOwned;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::spawn_local;

use crate::error::{DashboardError, Result as DashboardResult};
use crate::messaging::DashboardRequest;
use crate::settings::PickedFile;

#[wasm_bindgen(module = "/dashboard.js")]
extern "C" {
    #[wasm_bindgen(catch)]
    async fn sendMessage(channel: &str, request: JsValue) -> Result<JsValue, JsValue>;

    #[wasm_bindgen(js_name = i18n)]
    fn i18n_lookup(key: &str) -> String;

    #[wasm_bindgen(js_name = downloadText)]
    fn download_text_file(data: &str, filename: &str);

    #[wasm_bindgen(catch)]
    async fn pickTextFile() -> Result<JsValue, JsValue>;
}

pub fn translate(key: &str) -> String {
    i18n_lookup(key)
}

pub fn download_text(data: &str, filename: &str) {
    download_text_file(data, filename);
}

pub fn to_js<T: Serialize>(value: &T) -> DashboardResult<JsValue> {
    // Plain objects rather than ES maps; the background process expects JSON shapes
    value
        .serialize(&serde_wasm_bindgen::Serializer::json_compatible())
        .map_err(|e| DashboardError::Decode(format!("Failed to serialize: {:?}", e)))
}

/// Send a request and decode the reply
pub async fn send<T: DeserializeOwned>(channel: &str, request: &DashboardRequest) -> DashboardResult<T> {
    let request_js = to_js(request)?;
    let response = sendMessage(channel, request_js)
        .await
        .map_err(|e| DashboardError::Messaging(format!("{:?}", e)))?;

    serde_wasm_bindgen::from_value(response)
        .map_err(|e| DashboardError::Decode(format!("{:?}", e)))
}

/// Send a request whose reply nobody waits for
pub fn post(channel: &str, request: DashboardRequest) {
    let channel = channel.to_string();
    spawn_local(async move {
        let sent = match to_js(&request) {
            Ok(request_js) => sendMessage(&channel, request_js)
                .await
                .map(|_| ())
                .map_err(|e| DashboardError::Messaging(format!("{:?}", e))),
            Err(e) => Err(e),
        };
        if let Err(e) = sent {
            log::warn!("{:?} was not delivered: {}", request, e);
        }
    });
}

/// Ask for a text file; `None` when the user cancelled
pub async fn pick_text_file() -> DashboardResult<Option<PickedFile>> {
    let picked = pickTextFile()
        .await
        .map_err(|e| DashboardError::RejectedFile(format!("{:?}", e)))?;

    if picked.is_null() || picked.is_undefined() {
        return Ok(None);
    }

    serde_wasm_bindgen::from_value(picked)
        .map(Some)
        .map_err(|e| DashboardError::Decode(format!("{:?}", e)))
}

pub fn confirm(message: &str) -> bool {
    web_sys::window()
        .and_then(|window| window.confirm_with_message(message).ok())
        .unwrap_or(false)
}

pub fn alert(message: &str) {
    if let Some(window) = web_sys::window() {
        let _ = window.alert_with_message(message);
    }
}

/// Locale-formatted date for a millisecond timestamp
pub fn format_time(millis: f64) -> String {
    let date = js_sys::Date::new(&JsValue::from_f64(millis));
    String::from(date.to_locale_string("default", &JsValue::UNDEFINED))
}

/// Weekday, full date, time and zone, as the last backup/restore lines show it
pub fn format_time_long(millis: f64) -> String {
    let options = js_sys::Object::new();
    for (key, value) in [
        ("weekday", "long"),
        ("year", "numeric"),
        ("month", "long"),
        ("day", "numeric"),
        ("hour", "numeric"),
        ("minute", "numeric"),
        ("timeZoneName", "short"),
    ] {
        let _ = js_sys::Reflect::set(&options, &JsValue::from_str(key), &JsValue::from_str(value));
    }

    let date = js_sys::Date::new(&JsValue::from_f64(millis));
    String::from(date.to_locale_string("fullwide", &options))
}
