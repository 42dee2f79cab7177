/// UI module exports

pub mod bridge;
pub mod components;
pub mod dashboard;
pub mod services;
pub mod settings_panel;
