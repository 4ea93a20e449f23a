//! Settings screen

use dioxus::prelude::*;

use crate::components::common::{Button, Input};
use crate::settings::{Settings, SettingsManager};
use crate::state::{show_notification, Notification, NotificationType};

/// Editable text form of the settings
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SettingsForm {
    pub display_name: String,
    pub uri: String,
    pub password: String,
    pub socket_uri: String,
    pub via_transport: String,
    pub registrar_server: String,
    pub contact_uri: String,
    pub authorization_user: String,
    pub instance_id: String,
    pub use_preloaded_route: bool,
    pub ice_gather_timeout: String,
}

fn text(value: &Option<String>) -> String {
    value.clone().unwrap_or_default()
}

fn optional(value: &str) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}

impl SettingsForm {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            display_name: text(&settings.display_name),
            uri: text(&settings.uri),
            password: text(&settings.password),
            socket_uri: settings.socket.uri.clone(),
            via_transport: settings.socket.via_transport.clone(),
            registrar_server: text(&settings.registrar_server),
            contact_uri: text(&settings.contact_uri),
            authorization_user: text(&settings.authorization_user),
            instance_id: text(&settings.instance_id),
            use_preloaded_route: settings.use_preloaded_route,
            ice_gather_timeout: settings
                .ice_gather_timeout
                .map(|ms| ms.to_string())
                .unwrap_or_default(),
        }
    }

    /// Apply the form on top of `base`; fields the form does not show are kept
    pub fn apply(&self, base: &Settings) -> Result<Settings, String> {
        let ice_gather_timeout = match self.ice_gather_timeout.trim() {
            "" => None,
            raw => Some(
                raw.parse::<u64>()
                    .map_err(|_| format!("ICE gather timeout must be a number of ms, got {:?}", raw))?,
            ),
        };

        let mut settings = base.clone();
        settings.display_name = optional(&self.display_name);
        settings.uri = optional(&self.uri);
        // Not trimmed
        settings.password = (!self.password.is_empty()).then(|| self.password.clone());
        settings.socket.uri = self.socket_uri.trim().to_string();
        settings.socket.via_transport =
            optional(&self.via_transport).unwrap_or_else(|| "auto".to_string());
        settings.registrar_server = optional(&self.registrar_server);
        settings.contact_uri = optional(&self.contact_uri);
        settings.authorization_user = optional(&self.authorization_user);
        settings.instance_id = optional(&self.instance_id);
        settings.use_preloaded_route = self.use_preloaded_route;
        settings.ice_gather_timeout = ice_gather_timeout;

        Ok(settings)
    }
}

#[component]
pub fn SettingsScreen(on_done: EventHandler<()>) -> Element {
    let mut manager = use_context::<Signal<SettingsManager>>();
    let mut form = use_signal(|| SettingsForm::from_settings(&manager.read().get()));

    let save = move |_: MouseEvent| {
        let current = manager.read().get();
        let settings = match form.read().apply(&current) {
            Ok(settings) => settings,
            Err(message) => {
                show_notification(Notification::error("Invalid settings", &message));
                return;
            }
        };

        if let Err(e) = manager.write().set(settings) {
            tracing::error!("Failed to save settings: {}", e);
            show_notification(Notification::error("Cannot save settings", &e.to_string()));
            return;
        }

        tracing::info!("settings saved");
        if manager.read().is_ready() {
            on_done.call(());
        } else {
            show_notification(Notification {
                title: "SIP URI required".to_string(),
                message: "Enter your SIP URI to start the phone".to_string(),
                notification_type: NotificationType::Warning,
            });
        }
    };

    let reset = move |_: MouseEvent| {
        if let Err(e) = manager.write().clear() {
            tracing::error!("Failed to clear settings: {}", e);
            show_notification(Notification::error("Cannot reset settings", &e.to_string()));
            return;
        }
        form.set(SettingsForm::from_settings(&manager.read().get()));
        show_notification(Notification {
            title: "Settings reset".to_string(),
            message: String::new(),
            notification_type: NotificationType::Info,
        });
    };

    let values = form.read().clone();

    rsx! {
        div { class: "min-h-screen flex items-center justify-center bg-gray-100 py-8",
            div { class: "bg-white rounded-lg shadow-lg p-8 w-full max-w-lg",
                div { class: "text-center mb-6",
                    span { class: "text-5xl", "\u{1F4DE}" }
                    h1 { class: "text-2xl font-bold mt-4", "Softphone" }
                    p { class: "text-gray-500", "Account settings" }
                }

                form {
                    onsubmit: move |e| e.prevent_default(),

                    Input {
                        label: "Name".to_string(),
                        value: values.display_name.clone(),
                        placeholder: "Display name".to_string(),
                        oninput: move |e: FormEvent| form.write().display_name = e.value(),
                    }
                    Input {
                        label: "SIP URI".to_string(),
                        value: values.uri.clone(),
                        placeholder: "sip:alice@example.com".to_string(),
                        required: true,
                        oninput: move |e: FormEvent| form.write().uri = e.value(),
                    }
                    Input {
                        label: "Password".to_string(),
                        input_type: "password".to_string(),
                        value: values.password.clone(),
                        oninput: move |e: FormEvent| form.write().password = e.value(),
                    }
                    Input {
                        label: "WebSocket URI".to_string(),
                        value: values.socket_uri.clone(),
                        placeholder: "wss://sip.example.com".to_string(),
                        required: true,
                        oninput: move |e: FormEvent| form.write().socket_uri = e.value(),
                    }
                    Input {
                        label: "Via transport".to_string(),
                        value: values.via_transport.clone(),
                        placeholder: "auto".to_string(),
                        oninput: move |e: FormEvent| form.write().via_transport = e.value(),
                    }
                    Input {
                        label: "Registrar server".to_string(),
                        value: values.registrar_server.clone(),
                        oninput: move |e: FormEvent| form.write().registrar_server = e.value(),
                    }
                    Input {
                        label: "Contact URI".to_string(),
                        value: values.contact_uri.clone(),
                        oninput: move |e: FormEvent| form.write().contact_uri = e.value(),
                    }
                    Input {
                        label: "Authorization user".to_string(),
                        value: values.authorization_user.clone(),
                        oninput: move |e: FormEvent| form.write().authorization_user = e.value(),
                    }
                    Input {
                        label: "Instance ID".to_string(),
                        value: values.instance_id.clone(),
                        placeholder: "UUID".to_string(),
                        oninput: move |e: FormEvent| form.write().instance_id = e.value(),
                    }
                    Input {
                        label: "ICE gather timeout (ms)".to_string(),
                        input_type: "number".to_string(),
                        value: values.ice_gather_timeout.clone(),
                        oninput: move |e: FormEvent| form.write().ice_gather_timeout = e.value(),
                    }

                    label { class: "flex items-center gap-2 mb-6 text-sm text-gray-700",
                        input {
                            r#type: "checkbox",
                            checked: values.use_preloaded_route,
                            onchange: move |e| form.write().use_preloaded_route = e.checked(),
                        }
                        "Use preloaded route"
                    }

                    div { class: "flex justify-between",
                        Button {
                            onclick: reset,
                            variant: "secondary".to_string(),
                            "Reset"
                        }
                        Button {
                            onclick: save,
                            "OK"
                        }
                    }
                }
            }
        }
    }
}
