/// Dashboard tabs: identity, display order and per-tab action buttons

use serde::{Deserialize, Serialize};

/// One named section of the dashboard
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TabKind {
    Settings,
    Filters,
    Rules,
    Whitelist,
    Advanced,
    Matrix,
    About,
}

/// What an action button asks the active tab to do
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TabAction {
    ApplyChanges,
    UpdateNow,
    PurgeAll,
    Revert,
    ImportAppend,
    Export,
}

/// A button in the floating action bar
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActionButton {
    /// Material icon ligature
    pub icon: &'static str,
    /// i18n key of the tooltip
    pub tooltip_key: &'static str,
    pub action: TabAction,
}

const FILTERS_ACTIONS: &[ActionButton] = &[
    ActionButton { icon: "done", tooltip_key: "3pApplyChanges", action: TabAction::ApplyChanges },
    ActionButton { icon: "update", tooltip_key: "3pUpdateNow", action: TabAction::UpdateNow },
    ActionButton { icon: "delete_forever", tooltip_key: "3pPurgeAll", action: TabAction::PurgeAll },
];

const RULES_ACTIONS: &[ActionButton] = &[
    ActionButton { icon: "done", tooltip_key: "1pApplyChanges", action: TabAction::ApplyChanges },
    ActionButton { icon: "undo", tooltip_key: "genericRevert", action: TabAction::Revert },
    ActionButton { icon: "note_add", tooltip_key: "1pImport", action: TabAction::ImportAppend },
    ActionButton { icon: "archive", tooltip_key: "1pExport", action: TabAction::Export },
];

const WHITELIST_ACTIONS: &[ActionButton] = &[
    ActionButton { icon: "done", tooltip_key: "whitelistApply", action: TabAction::ApplyChanges },
    ActionButton { icon: "undo", tooltip_key: "genericRevert", action: TabAction::Revert },
    ActionButton { icon: "note_add", tooltip_key: "whitelistImport", action: TabAction::ImportAppend },
    ActionButton { icon: "archive", tooltip_key: "whitelistExport", action: TabAction::Export },
];

/// Number of slots in the action bar
pub const ACTION_SLOTS: usize = 4;

impl TabKind {
    /// All tabs in display order
    pub const ALL: [TabKind; 7] = [
        TabKind::Settings,
        TabKind::Filters,
        TabKind::Rules,
        TabKind::Whitelist,
        TabKind::Advanced,
        TabKind::Matrix,
        TabKind::About,
    ];

    /// Stable name written to local storage as the last visited tab.
    ///
    /// These match the values older dashboard builds persisted, so a stored
    /// value survives upgrades.
    pub fn identifier(self) -> &'static str {
        match self {
            TabKind::Settings => "tabSettings",
            TabKind::Filters => "tabFilters",
            TabKind::Rules => "tabRules",
            TabKind::Whitelist => "tabWhitelist",
            TabKind::Advanced => "tabAdvanced",
            TabKind::Matrix => "tabMatrix",
            TabKind::About => "tabAbout",
        }
    }

    pub fn from_identifier(identifier: &str) -> Option<TabKind> {
        TabKind::ALL
            .into_iter()
            .find(|tab| tab.identifier() == identifier)
    }

    /// Short name used for element ids and CSS hooks
    pub fn slug(self) -> &'static str {
        match self {
            TabKind::Settings => "settings",
            TabKind::Filters => "filters",
            TabKind::Rules => "rules",
            TabKind::Whitelist => "whitelist",
            TabKind::Advanced => "advanced",
            TabKind::Matrix => "matrix",
            TabKind::About => "about",
        }
    }

    /// i18n key of the tab's display name
    pub fn label_key(self) -> &'static str {
        match self {
            TabKind::Settings => "settingsPageName",
            TabKind::Filters => "3pPageName",
            TabKind::Rules => "1pPageName",
            TabKind::Whitelist => "whitelistPageName",
            TabKind::Advanced => "advancedSettingsPageName",
            TabKind::Matrix => "rulesPageName",
            TabKind::About => "aboutPageName",
        }
    }

    pub fn action_buttons(self) -> &'static [ActionButton] {
        match self {
            TabKind::Filters => FILTERS_ACTIONS,
            TabKind::Rules => RULES_ACTIONS,
            TabKind::Whitelist => WHITELIST_ACTIONS,
            TabKind::Settings | TabKind::Advanced | TabKind::Matrix | TabKind::About => &[],
        }
    }

    /// Whether this tab edits drafts that can block navigation.
    ///
    /// Settings are saved as soon as they change, Advanced and About have
    /// nothing to edit.
    pub fn tracks_unsaved_changes(self) -> bool {
        matches!(
            self,
            TabKind::Filters | TabKind::Rules | TabKind::Whitelist | TabKind::Matrix
        )
    }
}
