/// Browser-side implementations of the controller's collaborators

use futures::future::{Either, select};
use gloo_timers::future::TimeoutFuture;
use yew::prelude::UseStateHandle;

use crate::controller::{Drawer, LocalPersistence, TabLoader};
use crate::error::{DashboardError, Result};
use crate::messaging::{DashboardRequest, LocalData, UserSettings};
use crate::tabs::TabKind;
use crate::ui::bridge;

/// `window.localStorage`
pub struct WebStorage;

impl WebStorage {
    fn storage() -> Result<web_sys::Storage> {
        web_sys::window()
            .ok_or_else(|| DashboardError::Storage("no window".to_string()))?
            .local_storage()
            .map_err(|e| DashboardError::Storage(format!("{:?}", e)))?
            .ok_or_else(|| DashboardError::Storage("localStorage is disabled".to_string()))
    }
}

impl LocalPersistence for WebStorage {
    fn get(&self, key: &str) -> Option<String> {
        match WebStorage::storage() {
            Ok(storage) => storage.get_item(key).ok().flatten(),
            Err(e) => {
                log::warn!("Reading {}: {}", key, e);
                None
            }
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        WebStorage::storage()?
            .set_item(key, value)
            .map_err(|e| DashboardError::Storage(format!("{:?}", e)))
    }
}

/// The navigation drawer's open flag
#[derive(Clone)]
pub struct DrawerHandle(pub UseStateHandle<bool>);

impl Drawer for DrawerHandle {
    fn close_if_open(&self) {
        if *self.0 {
            self.0.set(false);
        }
    }
}

/// Data a tab needs before it is shown
#[derive(Debug, Clone, PartialEq)]
pub enum TabPayload {
    Settings {
        /// Only fetched on the first visit
        user_settings: Option<UserSettings>,
        local_data: LocalData,
    },
    Static,
}

/// Loads tab data from the background process, bounded by a timeout
#[derive(Clone)]
pub struct MessagingLoader {
    pub channel: String,
    pub timeout_ms: u32,
}

impl MessagingLoader {
    async fn fetch(&self, tab: TabKind, first_visit: bool) -> Result<TabPayload> {
        match tab {
            TabKind::Settings => {
                let user_settings = if first_visit {
                    Some(bridge::send(&self.channel, &DashboardRequest::ReadUserSettings).await?)
                } else {
                    None
                };
                let local_data =
                    bridge::send(&self.channel, &DashboardRequest::GetLocalData).await?;
                Ok(TabPayload::Settings {
                    user_settings,
                    local_data,
                })
            }
            _ => Ok(TabPayload::Static),
        }
    }
}

impl TabLoader for MessagingLoader {
    type Payload = TabPayload;

    async fn load(&self, tab: TabKind, first_visit: bool) -> Result<TabPayload> {
        let fetch = Box::pin(self.fetch(tab, first_visit));
        let timeout = TimeoutFuture::new(self.timeout_ms);

        match select(fetch, timeout).await {
            Either::Left((loaded, _)) => loaded,
            Either::Right(_) => Err(DashboardError::LoadTimedOut {
                tab: tab.identifier(),
                millis: self.timeout_ms,
            }),
        }
    }
}
