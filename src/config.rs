/// Dashboard configuration

use crate::tabs::TabKind;
use serde::Deserialize;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DashboardConfig {
    /// Messaging channel the background process listens on
    pub channel: String,
    /// Local storage key holding the last visited tab
    pub last_tab_key: String,
    /// Tab shown when nothing usable was persisted
    pub default_tab: TabKind,
    /// Upper bound for a tab's asynchronous load
    pub load_timeout_ms: u32,
    /// Upper bound for numeric settings inputs
    pub max_numeric_input: u32,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        DashboardConfig {
            channel: "dashboard".to_string(),
            last_tab_key: "nanoDashboardLastVisitedTab".to_string(),
            default_tab: TabKind::Settings,
            load_timeout_ms: 10_000,
            max_numeric_input: 1_000_000,
        }
    }
}
