/// Dashboard shell: tab bar, drawer, action bar and the active tab's panel

use std::cell::RefCell;
use std::rc::Rc;

use patternfly_yew::prelude::*;
use wasm_bindgen_futures::spawn_local;
use yew::prelude::*;

use crate::config::DashboardConfig;
use crate::controller::{SwitchOutcome, SwitchRefusal, TabController, finish_switch, restore_last_tab};
use crate::messaging::{LocalData, SettingValue, UserSettings};
use crate::tabs::{TabAction, TabKind};
use crate::ui::bridge::translate;
use crate::ui::components::{ActionBar, TabLink};
use crate::ui::services::{DrawerHandle, MessagingLoader, TabPayload, WebStorage};
use crate::ui::settings_panel::SettingsPanel;

type Controller = Rc<RefCell<TabController<WebStorage>>>;

#[derive(Properties, PartialEq, Default)]
pub struct DashboardProps {
    #[prop_or_default]
    pub config: DashboardConfig,
}

#[derive(Clone, PartialEq, Default)]
struct SettingsData {
    user_settings: UserSettings,
    local_data: LocalData,
}

#[derive(Clone, PartialEq, Default)]
struct ViewState {
    active: Option<TabKind>,
    loading: Option<TabKind>,
    error: Option<String>,
}

/// Handles shared by every switch
#[derive(Clone)]
struct SwitchContext {
    controller: Controller,
    drawer: DrawerHandle,
    loader: MessagingLoader,
    view: UseStateHandle<ViewState>,
    settings: UseStateHandle<SettingsData>,
}

impl SwitchContext {
    fn switch_to(&self, target: TabKind) {
        let started = self.controller.borrow_mut().begin_switch(target, &self.drawer);
        let ticket = match started {
            Ok(ticket) => ticket,
            Err(refusal) => {
                self.apply(SwitchOutcome::Refused(refusal));
                return;
            }
        };

        // The old tab is torn down now, not when the new one has loaded
        self.show_controller_state(None);

        let ctx = self.clone();
        spawn_local(async move {
            let outcome = finish_switch(ctx.controller.as_ref(), &ctx.loader, ticket).await;
            ctx.apply(outcome);
        });
    }

    fn restore(&self) {
        let ctx = self.clone();
        spawn_local(async move {
            let outcome = restore_last_tab(ctx.controller.as_ref(), &ctx.drawer, &ctx.loader).await;
            ctx.apply(outcome);
        });
    }

    fn apply(&self, outcome: SwitchOutcome<TabPayload>) {
        let mut error = None;

        match outcome {
            SwitchOutcome::Activated { payload, .. } => {
                if let TabPayload::Settings { user_settings, local_data } = payload {
                    let mut data = (*self.settings).clone();
                    if let Some(user_settings) = user_settings {
                        data.user_settings = user_settings;
                    }
                    data.local_data = local_data;
                    self.settings.set(data);
                }
            }
            SwitchOutcome::Refused(SwitchRefusal::Blocked { active }) => {
                log::info!("Switch refused, {:?} has unsaved changes", active);
            }
            SwitchOutcome::Refused(_) | SwitchOutcome::Superseded { .. } => {}
            SwitchOutcome::RolledBack { failed, error: e, .. } => {
                error = Some(format!("{}: {}", translate(failed.label_key()), e));
            }
        }

        self.show_controller_state(error);
    }

    fn show_controller_state(&self, error: Option<String>) {
        let controller = self.controller.borrow();
        self.view.set(ViewState {
            active: controller.active(),
            loading: controller.pending(),
            error,
        });
    }
}

#[function_component(Dashboard)]
pub fn dashboard(props: &DashboardProps) -> Html {
    let controller: Controller = {
        let config = props.config.clone();
        use_mut_ref(move || TabController::new(config, WebStorage))
    };
    let view = use_state(ViewState::default);
    let settings = use_state(SettingsData::default);
    let drawer_open = use_state(|| false);

    let ctx = SwitchContext {
        controller,
        drawer: DrawerHandle(drawer_open.clone()),
        loader: MessagingLoader {
            channel: props.config.channel.clone(),
            timeout_ms: props.config.load_timeout_ms,
        },
        view: view.clone(),
        settings: settings.clone(),
    };

    // Open the last visited tab on mount
    {
        let ctx = ctx.clone();
        use_effect_with((), move |_| {
            ctx.restore();
            || ()
        });
    }

    let on_tab_click = {
        let ctx = ctx.clone();
        Callback::from(move |tab: TabKind| ctx.switch_to(tab))
    };

    let on_drawer_toggle = {
        let drawer_open = drawer_open.clone();
        Callback::from(move |_: MouseEvent| drawer_open.set(!*drawer_open))
    };

    let on_action = {
        let view = view.clone();
        Callback::from(move |action: TabAction| {
            log::info!("{:?} on {:?} has no handler yet", action, view.active);
        })
    };

    let on_setting_change = {
        let settings = settings.clone();
        Callback::from(move |(name, value): (&'static str, SettingValue)| {
            let mut data = (*settings).clone();
            data.user_settings.set(name, value);
            settings.set(data);
        })
    };

    let on_local_data = {
        let settings = settings.clone();
        Callback::from(move |local_data: LocalData| {
            settings.set(SettingsData {
                local_data,
                ..(*settings).clone()
            });
        })
    };

    let links = |place: &'static str| -> Html {
        html! {
            <>
                {for TabKind::ALL.iter().map(|tab| html! {
                    <TabLink
                        tab={*tab}
                        active={view.active == Some(*tab)}
                        place={place}
                        onclick={on_tab_click.clone()}
                    />
                })}
            </>
        }
    };

    let current_label = view
        .active
        .map(|tab| translate(tab.label_key()))
        .unwrap_or_default();
    let action_buttons = view.active.map(TabKind::action_buttons).unwrap_or(&[]);

    html! {
        <div class="nano-dashboard">
            <header class="nano-header">
                <button class="nano-drawer-toggle" onclick={on_drawer_toggle.clone()}>
                    <span class="material-icons">{"menu"}</span>
                </button>
                <span id="nano-selected-tab">{current_label}</span>
                <nav class="nano-tab-bar">{links("tab")}</nav>
            </header>

            <aside class={classes!("nano-drawer", (*drawer_open).then_some("is-visible"))}>
                {links("drawer")}
            </aside>
            if *drawer_open {
                <div class="nano-drawer-backdrop is-visible" onclick={on_drawer_toggle} />
            }

            if let Some(err) = view.error.clone() {
                <div class="message-top-margin">
                    <Alert r#type={AlertType::Danger} title={"Error"} inline={true}>
                        {err}
                    </Alert>
                </div>
            }

            if view.loading.is_some() {
                <div class="loading-text-center">
                    <Spinner />
                </div>
            }

            <main class="nano-content">
                {for TabKind::ALL.iter().map(|tab| {
                    let active = view.active == Some(*tab);
                    html! {
                        <section
                            id={format!("nano-section-{}", tab.slug())}
                            class={classes!("nano-section", active.then_some("is-active"))}
                        >
                            if active {
                                {match tab {
                                    TabKind::Settings => html! {
                                        <SettingsPanel
                                            channel={props.config.channel.clone()}
                                            max_numeric_input={props.config.max_numeric_input}
                                            user_settings={settings.user_settings.clone()}
                                            local_data={settings.local_data.clone()}
                                            on_setting_change={on_setting_change.clone()}
                                            on_local_data={on_local_data.clone()}
                                        />
                                    },
                                    other => html! {
                                        <h2>{translate(other.label_key())}</h2>
                                    },
                                }}
                            }
                        </section>
                    }
                })}
            </main>

            <ActionBar buttons={action_buttons} onaction={on_action} />
        </div>
    }
}
