/// Reusable UI components

use yew::prelude::*;

use crate::tabs::{ACTION_SLOTS, ActionButton, TabAction, TabKind};
use crate::ui::bridge::translate;

#[derive(Properties, PartialEq)]
pub struct TabLinkProps {
    pub tab: TabKind,
    pub active: bool,
    /// "tab" for the tab bar, "drawer" for the drawer list
    pub place: AttrValue,
    pub onclick: Callback<TabKind>,
}

#[function_component(TabLink)]
pub fn tab_link(props: &TabLinkProps) -> Html {
    let tab = props.tab;
    let onclick = props.onclick.reform(move |_: MouseEvent| tab);
    let class = classes!(
        "nano-tab-link",
        format!("nano-{}-link", props.place),
        props.active.then_some("is-active")
    );

    html! {
        <button
            id={format!("nano-{}-{}", props.place, tab.slug())}
            class={class}
            onclick={onclick}
        >
            {translate(tab.label_key())}
        </button>
    }
}

#[derive(Properties, PartialEq)]
pub struct ActionBarProps {
    pub buttons: &'static [ActionButton],
    pub onaction: Callback<TabAction>,
}

/// Floating action buttons; slots past the tab's buttons stay hidden
#[function_component(ActionBar)]
pub fn action_bar(props: &ActionBarProps) -> Html {
    html! {
        <div class="nano-action-bar">
            {for (0..ACTION_SLOTS).map(|slot| {
                match props.buttons.get(slot) {
                    Some(button) => {
                        let action = button.action;
                        html! {
                            <button
                                id={format!("nano-action-{}", slot)}
                                class="nano-action-button"
                                title={translate(button.tooltip_key)}
                                onclick={props.onaction.reform(move |_: MouseEvent| action)}
                            >
                                <span class="material-icons">{button.icon}</span>
                            </button>
                        }
                    }
                    None => html! {
                        <button id={format!("nano-action-{}", slot)} class="nano-action-button" style="display: none;" />
                    },
                }
            })}
        </div>
    }
}

#[derive(Properties, PartialEq)]
pub struct StatusLineProps {
    pub id: AttrValue,
    #[prop_or_default]
    pub text: Option<String>,
}

#[function_component(StatusLine)]
pub fn status_line(props: &StatusLineProps) -> Html {
    html! {
        <>
            if let Some(text) = &props.text {
                <p id={props.id.clone()} class="nano-status-line">{text}</p>
            }
        </>
    }
}
