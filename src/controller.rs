/// Tab controller: owns the active tab slot and mediates switches between tabs
///
/// A switch runs in two steps. `begin_switch` applies the gate, tears down the
/// active tab and hands out a ticket. The tab then loads whatever it displays,
/// and `complete_switch` commits the ticket. Only the newest ticket can commit,
/// so a slow load that was overtaken by another click cannot steal the slot.

use std::cell::RefCell;
use std::collections::HashSet;

use crate::config::DashboardConfig;
use crate::error::{DashboardError, Result};
use crate::tabs::TabKind;

/// Key/value storage that survives reloads of the dashboard
pub trait LocalPersistence {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str) -> Result<()>;
}

/// Overlay navigation panel that must be closed before switching
pub trait Drawer {
    /// Close the drawer if it is open. Calling it on a closed drawer does nothing.
    fn close_if_open(&self);
}

/// Setup step of a tab: fetch what it needs before it becomes visible
#[allow(async_fn_in_trait)]
pub trait TabLoader {
    type Payload;

    async fn load(&self, tab: TabKind, first_visit: bool) -> Result<Self::Payload>;
}

/// Why a switch request did nothing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwitchRefusal {
    AlreadyActive,
    AlreadyLoading,
    Blocked { active: TabKind },
}

/// Permission to finish one switch
#[derive(Debug)]
pub struct SwitchTicket {
    target: TabKind,
    token: u64,
    first_visit: bool,
}

impl SwitchTicket {
    pub fn target(&self) -> TabKind {
        self.target
    }

    pub fn first_visit(&self) -> bool {
        self.first_visit
    }
}

#[derive(Debug, PartialEq)]
pub enum SwitchOutcome<P> {
    Refused(SwitchRefusal),
    Activated {
        tab: TabKind,
        payload: P,
    },
    /// A newer switch was requested while this one was loading
    Superseded { tab: TabKind },
    /// The load failed; the last committed tab (if any) is active again.
    ///
    /// That can be `failed` itself when a reload of the tab that was torn
    /// down fails: it comes back with the data of its previous load.
    RolledBack {
        failed: TabKind,
        restored: Option<TabKind>,
        error: DashboardError,
    },
}

#[derive(Debug, Clone, Copy)]
struct PendingSwitch {
    target: TabKind,
    token: u64,
}

pub struct TabController<S> {
    config: DashboardConfig,
    store: S,
    active: Option<TabKind>,
    pending: Option<PendingSwitch>,
    // Last committed tab, re-activated when a pending load fails
    fallback: Option<TabKind>,
    visited: HashSet<TabKind>,
    unsaved: HashSet<TabKind>,
    next_token: u64,
}

impl<S: LocalPersistence> TabController<S> {
    pub fn new(config: DashboardConfig, store: S) -> Self {
        TabController {
            config,
            store,
            active: None,
            pending: None,
            fallback: None,
            visited: HashSet::new(),
            unsaved: HashSet::new(),
            next_token: 0,
        }
    }

    pub fn config(&self) -> &DashboardConfig {
        &self.config
    }

    pub fn active(&self) -> Option<TabKind> {
        self.active
    }

    /// Tab whose load is in flight, if any
    pub fn pending(&self) -> Option<TabKind> {
        self.pending.map(|p| p.target)
    }

    pub fn has_visited(&self, tab: TabKind) -> bool {
        self.visited.contains(&tab)
    }

    /// Record whether a tab holds edits that were not applied yet.
    ///
    /// Returns false (and records nothing) for tabs that do not track drafts.
    pub fn mark_unsaved(&mut self, tab: TabKind, dirty: bool) -> bool {
        if !tab.tracks_unsaved_changes() {
            log::debug!("{:?} does not track unsaved changes", tab);
            return false;
        }
        if dirty {
            self.unsaved.insert(tab);
        } else {
            self.unsaved.remove(&tab);
        }
        true
    }

    pub fn has_unsaved_changes(&self, tab: TabKind) -> bool {
        tab.tracks_unsaved_changes() && self.unsaved.contains(&tab)
    }

    /// Tab to open at startup: the persisted one when it is known, else the default
    pub fn initial_tab(&self) -> TabKind {
        match self.store.get(&self.config.last_tab_key) {
            Some(identifier) => TabKind::from_identifier(&identifier).unwrap_or_else(|| {
                log::info!("Ignoring unknown last tab {:?}", identifier);
                self.config.default_tab
            }),
            None => self.config.default_tab,
        }
    }

    pub fn begin_switch<D: Drawer + ?Sized>(
        &mut self,
        target: TabKind,
        drawer: &D,
    ) -> std::result::Result<SwitchTicket, SwitchRefusal> {
        if self.active == Some(target) {
            return Err(SwitchRefusal::AlreadyActive);
        }

        drawer.close_if_open();

        if self.pending() == Some(target) {
            return Err(SwitchRefusal::AlreadyLoading);
        }

        if let Some(active) = self.active {
            if self.has_unsaved_changes(active) {
                log::info!("Staying on {:?}: it has unsaved changes", active);
                return Err(SwitchRefusal::Blocked { active });
            }
        }

        if let Some(previous) = self.active.take() {
            log::debug!("Tearing down {:?}", previous);
            self.fallback = Some(previous);
        }

        self.next_token += 1;
        let token = self.next_token;
        if let Some(overtaken) = self.pending.replace(PendingSwitch { target, token }) {
            log::debug!("Switch to {:?} overtaken by {:?}", overtaken.target, target);
        }

        Ok(SwitchTicket {
            target,
            token,
            first_visit: !self.visited.contains(&target),
        })
    }

    pub fn complete_switch<P>(
        &mut self,
        ticket: SwitchTicket,
        loaded: Result<P>,
    ) -> SwitchOutcome<P> {
        let tab = ticket.target;
        match self.pending {
            Some(pending) if pending.token == ticket.token => {}
            _ => {
                log::debug!("Dropping stale switch to {:?}", tab);
                return SwitchOutcome::Superseded { tab };
            }
        }
        self.pending = None;

        match loaded {
            Ok(payload) => {
                self.active = Some(tab);
                self.fallback = None;
                self.visited.insert(tab);
                if let Err(err) = self.store.set(&self.config.last_tab_key, tab.identifier()) {
                    log::warn!("Could not remember {:?} as last tab: {}", tab, err);
                }
                log::debug!("Activated {:?}", tab);
                SwitchOutcome::Activated { tab, payload }
            }
            Err(error) => {
                self.active = self.fallback.take();
                log::warn!(
                    "Loading {:?} failed ({}), back on {:?}",
                    tab,
                    error,
                    self.active
                );
                SwitchOutcome::RolledBack {
                    failed: tab,
                    restored: self.active,
                    error,
                }
            }
        }
    }
}

/// Switch to `target`, running its load in between teardown and activation.
///
/// The controller is never borrowed across the load, so other events can
/// reach it while this switch is waiting.
pub async fn request_switch<S, D, L>(
    controller: &RefCell<TabController<S>>,
    drawer: &D,
    loader: &L,
    target: TabKind,
) -> SwitchOutcome<L::Payload>
where
    S: LocalPersistence,
    D: Drawer + ?Sized,
    L: TabLoader,
{
    let ticket = match controller.borrow_mut().begin_switch(target, drawer) {
        Ok(ticket) => ticket,
        Err(refusal) => return SwitchOutcome::Refused(refusal),
    };

    finish_switch(controller, loader, ticket).await
}

/// Load the ticket's tab and commit it.
///
/// For callers that run `begin_switch` themselves so they can show the
/// torn-down state before the load starts.
pub async fn finish_switch<S, L>(
    controller: &RefCell<TabController<S>>,
    loader: &L,
    ticket: SwitchTicket,
) -> SwitchOutcome<L::Payload>
where
    S: LocalPersistence,
    L: TabLoader,
{
    let loaded = loader.load(ticket.target(), ticket.first_visit()).await;

    controller.borrow_mut().complete_switch(ticket, loaded)
}

/// Open the persisted tab at startup, falling back to the default tab.
///
/// When the persisted tab fails to load there is nothing to roll back to, so
/// the default tab gets one attempt of its own.
pub async fn restore_last_tab<S, D, L>(
    controller: &RefCell<TabController<S>>,
    drawer: &D,
    loader: &L,
) -> SwitchOutcome<L::Payload>
where
    S: LocalPersistence,
    D: Drawer + ?Sized,
    L: TabLoader,
{
    let (initial, default_tab) = {
        let controller = controller.borrow();
        (controller.initial_tab(), controller.config().default_tab)
    };

    match request_switch(controller, drawer, loader, initial).await {
        SwitchOutcome::RolledBack { failed, restored: None, .. } if failed != default_tab => {
            log::info!("Falling back to {:?}", default_tab);
            request_switch(controller, drawer, loader, default_tab).await
        }
        outcome => outcome,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::executor::block_on;
    use std::cell::Cell;
    use std::collections::HashMap;

    const KEY: &str = "nanoDashboardLastVisitedTab";

    #[derive(Default)]
    struct MemoryStore {
        items: RefCell<HashMap<String, String>>,
        fail_writes: bool,
    }

    impl MemoryStore {
        fn with(key: &str, value: &str) -> Self {
            let store = MemoryStore::default();
            store.items.borrow_mut().insert(key.to_string(), value.to_string());
            store
        }
    }

    impl LocalPersistence for MemoryStore {
        fn get(&self, key: &str) -> Option<String> {
            self.items.borrow().get(key).cloned()
        }

        fn set(&self, key: &str, value: &str) -> Result<()> {
            if self.fail_writes {
                return Err(DashboardError::Storage("quota exceeded".to_string()));
            }
            self.items.borrow_mut().insert(key.to_string(), value.to_string());
            Ok(())
        }
    }

    #[derive(Default)]
    struct CountingDrawer {
        closed: Cell<usize>,
    }

    impl Drawer for CountingDrawer {
        fn close_if_open(&self) {
            self.closed.set(self.closed.get() + 1);
        }
    }

    #[derive(Default)]
    struct ScriptedLoader {
        calls: RefCell<Vec<(TabKind, bool)>>,
        failing: HashSet<TabKind>,
    }

    impl ScriptedLoader {
        fn failing(tabs: &[TabKind]) -> Self {
            ScriptedLoader {
                calls: RefCell::new(Vec::new()),
                failing: tabs.iter().copied().collect(),
            }
        }
    }

    impl TabLoader for ScriptedLoader {
        type Payload = TabKind;

        async fn load(&self, tab: TabKind, first_visit: bool) -> Result<TabKind> {
            self.calls.borrow_mut().push((tab, first_visit));
            if self.failing.contains(&tab) {
                Err(DashboardError::Messaging("no response".to_string()))
            } else {
                Ok(tab)
            }
        }
    }

    fn controller(store: MemoryStore) -> RefCell<TabController<MemoryStore>> {
        RefCell::new(TabController::new(DashboardConfig::default(), store))
    }

    fn stored(controller: &RefCell<TabController<MemoryStore>>) -> Option<String> {
        controller.borrow().store.get(KEY)
    }

    #[test]
    fn test_switch_from_a_to_b() {
        let controller = controller(MemoryStore::default());
        let drawer = CountingDrawer::default();
        let loader = ScriptedLoader::default();

        block_on(request_switch(&controller, &drawer, &loader, TabKind::Filters));
        let outcome = block_on(request_switch(&controller, &drawer, &loader, TabKind::Rules));

        assert_eq!(
            outcome,
            SwitchOutcome::Activated { tab: TabKind::Rules, payload: TabKind::Rules }
        );
        assert_eq!(controller.borrow().active(), Some(TabKind::Rules));
        assert_eq!(controller.borrow().pending(), None);
        assert_eq!(stored(&controller), Some("tabRules".to_string()));
        assert_eq!(
            *loader.calls.borrow(),
            vec![(TabKind::Filters, true), (TabKind::Rules, true)]
        );
        assert_eq!(drawer.closed.get(), 2);
    }

    #[test]
    fn test_switch_to_active_tab_is_noop() {
        let controller = controller(MemoryStore::default());
        let drawer = CountingDrawer::default();
        let loader = ScriptedLoader::default();

        block_on(request_switch(&controller, &drawer, &loader, TabKind::About));
        let outcome = block_on(request_switch(&controller, &drawer, &loader, TabKind::About));

        assert_eq!(outcome, SwitchOutcome::Refused(SwitchRefusal::AlreadyActive));
        assert_eq!(loader.calls.borrow().len(), 1);
        assert_eq!(drawer.closed.get(), 1);
        assert_eq!(controller.borrow().active(), Some(TabKind::About));
    }

    #[test]
    fn test_unsaved_changes_block_switch() {
        let controller = controller(MemoryStore::default());
        let drawer = CountingDrawer::default();
        let loader = ScriptedLoader::default();

        block_on(request_switch(&controller, &drawer, &loader, TabKind::Whitelist));
        assert!(controller.borrow_mut().mark_unsaved(TabKind::Whitelist, true));

        for _ in 0..2 {
            let outcome = block_on(request_switch(&controller, &drawer, &loader, TabKind::About));
            assert_eq!(
                outcome,
                SwitchOutcome::Refused(SwitchRefusal::Blocked { active: TabKind::Whitelist })
            );
            assert_eq!(controller.borrow().active(), Some(TabKind::Whitelist));
            assert_eq!(controller.borrow().pending(), None);
        }
        assert_eq!(stored(&controller), Some("tabWhitelist".to_string()));
        assert_eq!(loader.calls.borrow().len(), 1);
        // The drawer closes even when the gate refuses
        assert_eq!(drawer.closed.get(), 3);

        controller.borrow_mut().mark_unsaved(TabKind::Whitelist, false);
        let outcome = block_on(request_switch(&controller, &drawer, &loader, TabKind::About));
        assert!(matches!(outcome, SwitchOutcome::Activated { tab: TabKind::About, .. }));
    }

    #[test]
    fn test_gate_is_open_without_dirty_tracking() {
        let controller = controller(MemoryStore::default());
        let drawer = CountingDrawer::default();
        let loader = ScriptedLoader::default();

        block_on(request_switch(&controller, &drawer, &loader, TabKind::Settings));
        assert!(!controller.borrow_mut().mark_unsaved(TabKind::Settings, true));
        assert!(!controller.borrow().has_unsaved_changes(TabKind::Settings));

        let outcome = block_on(request_switch(&controller, &drawer, &loader, TabKind::Advanced));
        assert!(matches!(outcome, SwitchOutcome::Activated { tab: TabKind::Advanced, .. }));
    }

    #[test]
    fn test_restore_persisted_tab() {
        let controller = controller(MemoryStore::with(KEY, "tabMatrix"));
        let drawer = CountingDrawer::default();
        let loader = ScriptedLoader::default();

        let outcome = block_on(restore_last_tab(&controller, &drawer, &loader));

        assert!(matches!(outcome, SwitchOutcome::Activated { tab: TabKind::Matrix, .. }));
        assert_eq!(controller.borrow().active(), Some(TabKind::Matrix));
    }

    #[test]
    fn test_restore_unknown_or_absent_uses_default() {
        for store in [MemoryStore::with(KEY, "tabBogus"), MemoryStore::default()] {
            let controller = controller(store);
            let drawer = CountingDrawer::default();
            let loader = ScriptedLoader::default();

            block_on(restore_last_tab(&controller, &drawer, &loader));

            assert_eq!(controller.borrow().active(), Some(TabKind::Settings));
            assert_eq!(stored(&controller), Some("tabSettings".to_string()));
        }
    }

    #[test]
    fn test_restore_falls_back_when_persisted_tab_fails() {
        let controller = controller(MemoryStore::with(KEY, "tabFilters"));
        let drawer = CountingDrawer::default();
        let loader = ScriptedLoader::failing(&[TabKind::Filters]);

        let outcome = block_on(restore_last_tab(&controller, &drawer, &loader));

        assert!(matches!(outcome, SwitchOutcome::Activated { tab: TabKind::Settings, .. }));
        assert_eq!(
            *loader.calls.borrow(),
            vec![(TabKind::Filters, true), (TabKind::Settings, true)]
        );
    }

    #[test]
    fn test_failed_load_rolls_back() {
        let controller = controller(MemoryStore::default());
        let drawer = CountingDrawer::default();
        let loader = ScriptedLoader::failing(&[TabKind::Filters]);

        block_on(request_switch(&controller, &drawer, &loader, TabKind::Settings));
        let outcome = block_on(request_switch(&controller, &drawer, &loader, TabKind::Filters));

        assert_eq!(
            outcome,
            SwitchOutcome::RolledBack {
                failed: TabKind::Filters,
                restored: Some(TabKind::Settings),
                error: DashboardError::Messaging("no response".to_string()),
            }
        );
        assert_eq!(controller.borrow().active(), Some(TabKind::Settings));
        assert_eq!(stored(&controller), Some("tabSettings".to_string()));
        assert!(!controller.borrow().has_visited(TabKind::Filters));
    }

    #[test]
    fn test_stale_completion_is_superseded() {
        let controller = controller(MemoryStore::default());
        let drawer = CountingDrawer::default();
        let loader = ScriptedLoader::default();
        block_on(request_switch(&controller, &drawer, &loader, TabKind::Settings));

        let mut ctl = controller.borrow_mut();
        let slow = ctl.begin_switch(TabKind::Filters, &drawer).unwrap();
        assert_eq!(ctl.active(), None);
        let fast = ctl.begin_switch(TabKind::Rules, &drawer).unwrap();

        let outcome = ctl.complete_switch(fast, Ok(()));
        assert_eq!(outcome, SwitchOutcome::Activated { tab: TabKind::Rules, payload: () });

        let outcome = ctl.complete_switch(slow, Ok(()));
        assert_eq!(outcome, SwitchOutcome::Superseded { tab: TabKind::Filters });
        assert_eq!(ctl.active(), Some(TabKind::Rules));
        assert_eq!(ctl.store.get(KEY), Some("tabRules".to_string()));
    }

    #[test]
    fn test_overtaken_switch_rolls_back_to_last_committed_tab() {
        let drawer = CountingDrawer::default();
        let mut ctl = TabController::new(DashboardConfig::default(), MemoryStore::default());
        let first = ctl.begin_switch(TabKind::About, &drawer).unwrap();
        ctl.complete_switch(first, Ok(()));

        let _slow = ctl.begin_switch(TabKind::Filters, &drawer).unwrap();
        let failing = ctl.begin_switch(TabKind::Rules, &drawer).unwrap();
        let outcome = ctl.complete_switch::<()>(
            failing,
            Err(DashboardError::LoadTimedOut { tab: "tabRules", millis: 10 }),
        );

        assert!(matches!(
            outcome,
            SwitchOutcome::RolledBack { restored: Some(TabKind::About), .. }
        ));
        assert_eq!(ctl.active(), Some(TabKind::About));
    }

    #[test]
    fn test_second_click_on_loading_tab() {
        let drawer = CountingDrawer::default();
        let mut ctl = TabController::new(DashboardConfig::default(), MemoryStore::default());

        let _ticket = ctl.begin_switch(TabKind::Settings, &drawer).unwrap();
        let again = ctl.begin_switch(TabKind::Settings, &drawer);

        assert_eq!(again.unwrap_err(), SwitchRefusal::AlreadyLoading);
        // The drawer closes on the repeated click too
        assert_eq!(drawer.closed.get(), 2);
    }

    #[test]
    fn test_first_visit_only_once() {
        let controller = controller(MemoryStore::default());
        let drawer = CountingDrawer::default();
        let loader = ScriptedLoader::default();

        for tab in [TabKind::Settings, TabKind::About, TabKind::Settings] {
            block_on(request_switch(&controller, &drawer, &loader, tab));
        }

        assert_eq!(
            *loader.calls.borrow(),
            vec![
                (TabKind::Settings, true),
                (TabKind::About, true),
                (TabKind::Settings, false),
            ]
        );
    }

    #[test]
    fn test_storage_failure_does_not_block_switch() {
        let store = MemoryStore { fail_writes: true, ..MemoryStore::default() };
        let controller = controller(store);
        let drawer = CountingDrawer::default();
        let loader = ScriptedLoader::default();

        let outcome = block_on(request_switch(&controller, &drawer, &loader, TabKind::Rules));

        assert!(matches!(outcome, SwitchOutcome::Activated { tab: TabKind::Rules, .. }));
        assert_eq!(stored(&controller), None);
    }

    #[test]
    fn test_never_two_tabs_at_once() {
        let drawer = CountingDrawer::default();
        let mut ctl = TabController::new(DashboardConfig::default(), MemoryStore::default());
        let mut tickets = Vec::new();

        // Interleave starts and completions, failing every third load
        for (step, tab) in TabKind::ALL.iter().cycle().take(21).enumerate() {
            if let Ok(ticket) = ctl.begin_switch(*tab, &drawer) {
                tickets.push(ticket);
            }
            assert!(!(ctl.active().is_some() && ctl.pending().is_some()));

            if step % 2 == 1 {
                if let Some(ticket) = tickets.pop() {
                    let loaded = if step % 3 == 0 {
                        Err(DashboardError::Messaging("boom".to_string()))
                    } else {
                        Ok(())
                    };
                    ctl.complete_switch(ticket, loaded);
                }
            }
            assert!(!(ctl.active().is_some() && ctl.pending().is_some()));
        }

        for ticket in tickets.drain(..) {
            ctl.complete_switch(ticket, Ok(()));
            assert!(ctl.pending().is_none() || ctl.active().is_none());
        }
    }

    #[test]
    fn test_begin_switch_tears_down_before_load() {
        let controller = controller(MemoryStore::default());
        let drawer = CountingDrawer::default();
        let loader = ScriptedLoader::default();
        block_on(request_switch(&controller, &drawer, &loader, TabKind::Settings));

        let ticket = controller
            .borrow_mut()
            .begin_switch(TabKind::About, &drawer)
            .unwrap();
        assert_eq!(controller.borrow().active(), None);
        assert_eq!(controller.borrow().pending(), Some(TabKind::About));
        assert_eq!(stored(&controller), Some("tabSettings".to_string()));

        let outcome = block_on(finish_switch(&controller, &loader, ticket));

        assert_eq!(
            outcome,
            SwitchOutcome::Activated { tab: TabKind::About, payload: TabKind::About }
        );
        assert_eq!(controller.borrow().active(), Some(TabKind::About));
        assert_eq!(controller.borrow().pending(), None);
        assert_eq!(stored(&controller), Some("tabAbout".to_string()));
    }

    #[test]
    fn test_failed_reload_of_torn_down_tab_brings_it_back() {
        let drawer = CountingDrawer::default();
        let mut ctl = TabController::new(DashboardConfig::default(), MemoryStore::default());
        let first = ctl.begin_switch(TabKind::Settings, &drawer).unwrap();
        ctl.complete_switch(first, Ok(()));

        let _filters = ctl.begin_switch(TabKind::Filters, &drawer).unwrap();
        let reload = ctl.begin_switch(TabKind::Settings, &drawer).unwrap();
        assert!(!reload.first_visit());
        let outcome = ctl.complete_switch::<()>(
            reload,
            Err(DashboardError::Messaging("no response".to_string())),
        );

        assert_eq!(
            outcome,
            SwitchOutcome::RolledBack {
                failed: TabKind::Settings,
                restored: Some(TabKind::Settings),
                error: DashboardError::Messaging("no response".to_string()),
            }
        );
        assert_eq!(ctl.active(), Some(TabKind::Settings));
        assert_eq!(ctl.pending(), None);
    }
}
