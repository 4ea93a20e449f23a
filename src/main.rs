//! Softphone - SIP/WebRTC browser phone built with Dioxus
//!
//! Resolves the account settings, then either asks for them or runs the
//! phone: dialer, active call and incoming call views driven by a SIP
//! user agent in the browser.

mod agent;
mod components;
mod phone;
mod settings;
mod state;

use dioxus::prelude::*;
use components::{
    common::{Notification, Snackbar},
    phone::Phone,
    settings::SettingsScreen,
};
use settings::SettingsManager;

fn main() -> anyhow::Result<()> {
    // On native, set up logging and the environment first
    #[cfg(not(target_arch = "wasm32"))]
    {
        use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
        tracing_subscriber::registry()
            .with(tracing_subscriber::fmt::layer())
            .with(tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("softphone=info".parse()?))
            .init();

        // Load environment variables
        dotenvy::dotenv().ok();
    }

    tracing::info!("Starting softphone");

    // Launch the Dioxus app
    dioxus::launch(App);

    Ok(())
}

/// Settings from the platform storage with the injected layer on top
fn load_settings() -> SettingsManager {
    SettingsManager::load(settings::platform_storage(), settings::injected_settings())
}

#[derive(Clone, Copy, PartialEq)]
enum Screen {
    Settings,
    Phone,
}

#[component]
fn App() -> Element {
    let manager = use_context_provider(|| Signal::new(load_settings()));
    let mut screen = use_signal(|| {
        if manager.read().is_ready() {
            Screen::Phone
        } else {
            Screen::Settings
        }
    });

    rsx! {
        // Global styles
        style { {include_str!("../assets/styles.css")} }

        // Notification toast
        Notification {}
        Snackbar {}

        match screen() {
            Screen::Phone => rsx! {
                Phone { on_exit: move |_| screen.set(Screen::Settings) }
            },
            Screen::Settings => rsx! {
                SettingsScreen { on_done: move |_| screen.set(Screen::Phone) }
            },
        }
    }
}
