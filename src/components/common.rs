use std::time::Duration;

use dioxus::prelude::*;
use crate::phone::{DeadlineTimer, TaskTimer, TimerGuard};
use crate::state::{UI_STATE, NotificationType};

const NOTIFICATION_MS: u32 = 4000;

/// Wait on the Dioxus runtime
pub async fn sleep_ms(ms: u32) {
    #[cfg(target_arch = "wasm32")]
    {
        gloo_timers::future::TimeoutFuture::new(ms).await;
    }
    #[cfg(not(target_arch = "wasm32"))]
    {
        tokio::time::sleep(std::time::Duration::from_millis(ms as u64)).await;
    }
}

#[component]
pub fn Button(
    onclick: EventHandler<MouseEvent>,
    children: Element,
    #[props(default = "primary".to_string())]
    variant: String,
    #[props(default = false)]
    disabled: bool,
) -> Element {
    let class = match variant.as_str() {
        "primary" => "bg-blue-600 hover:bg-blue-700 text-white",
        "secondary" => "bg-gray-200 hover:bg-gray-300 text-gray-800",
        "danger" => "bg-red-600 hover:bg-red-700 text-white",
        "success" => "bg-green-600 hover:bg-green-700 text-white",
        _ => "bg-blue-600 hover:bg-blue-700 text-white",
    };

    let disabled_class = if disabled { "opacity-50 cursor-not-allowed" } else { "" };

    rsx! {
        button {
            class: "px-4 py-2 rounded font-medium transition-colors {class} {disabled_class}",
            disabled: disabled,
            onclick: move |e| onclick.call(e),
            {children}
        }
    }
}

/// Restart a toast countdown; the countdown of the content it replaces is cancelled
fn rearm_dismiss(
    slot: &mut Option<TimerGuard>,
    timer: &dyn DeadlineTimer,
    after_ms: Option<u32>,
    dismiss: fn(),
) {
    slot.take();
    if let Some(ms) = after_ms {
        *slot = Some(timer.arm(Duration::from_millis(ms as u64), Box::new(dismiss)));
    }
}

#[component]
pub fn Notification() -> Element {
    let notification = UI_STATE.read().notification.clone();
    let mut dismiss = use_signal(|| None::<TimerGuard>);

    // Auto-dismiss notification after 4 seconds
    use_effect(move || {
        let after_ms = UI_STATE
            .read()
            .notification
            .is_some()
            .then_some(NOTIFICATION_MS);
        rearm_dismiss(
            &mut dismiss.write(),
            &TaskTimer,
            after_ms,
            crate::state::clear_notification,
        );
    });

    if let Some(notif) = notification {
        let color_class = notif.notification_type.color_class();
        let icon = match notif.notification_type {
            NotificationType::Success => "\u{2705}",
            NotificationType::Error => "\u{274C}",
            NotificationType::Warning => "\u{26A0}",
            NotificationType::Info => "\u{2139}",
        };
        rsx! {
            div {
                class: "fixed top-4 right-4 z-50 {color_class} text-white px-6 py-4 rounded-lg shadow-xl max-w-sm animate-slide-in",
                div { class: "flex items-start gap-3",
                    span { class: "text-xl flex-shrink-0", "{icon}" }
                    div { class: "flex-1",
                        p { class: "font-semibold", "{notif.title}" }
                        if !notif.message.is_empty() {
                            p { class: "text-sm opacity-90", "{notif.message}" }
                        }
                    }
                    button {
                        class: "ml-2 text-white hover:text-gray-200 flex-shrink-0",
                        onclick: move |_| {
                            crate::state::clear_notification();
                        },
                        "\u{2715}"
                    }
                }
            }
        }
    } else {
        rsx! {}
    }
}

/// Bottom confirmation bar, hidden after its own duration
#[component]
pub fn Snackbar() -> Element {
    let snackbar = UI_STATE.read().snackbar.clone();
    let mut dismiss = use_signal(|| None::<TimerGuard>);

    use_effect(move || {
        let duration_ms = UI_STATE.read().snackbar.as_ref().map(|s| s.duration_ms);
        rearm_dismiss(
            &mut dismiss.write(),
            &TaskTimer,
            duration_ms,
            crate::state::clear_snackbar,
        );
    });

    match snackbar {
        Some(snackbar) => rsx! {
            div { class: "fixed bottom-6 left-1/2 -translate-x-1/2 z-50 bg-gray-800 text-white px-6 py-3 rounded shadow-lg",
                "{snackbar.message}"
            }
        },
        None => rsx! {},
    }
}

#[component]
pub fn StatusIndicator(
    status: String,
    #[props(default = "bg-gray-400".to_string())]
    color_class: String,
) -> Element {
    rsx! {
        div { class: "flex items-center gap-2",
            div { class: "w-3 h-3 rounded-full {color_class}" }
            span { class: "text-sm text-gray-200", "{status}" }
        }
    }
}

#[component]
pub fn Input(
    value: String,
    oninput: EventHandler<FormEvent>,
    #[props(default = "text".to_string())]
    input_type: String,
    #[props(default = "".to_string())]
    placeholder: String,
    #[props(default = "".to_string())]
    label: String,
    #[props(default = false)]
    required: bool,
) -> Element {
    rsx! {
        div { class: "mb-4",
            if !label.is_empty() {
                label { class: "block text-sm font-medium text-gray-700 mb-1",
                    "{label}"
                    if required {
                        span { class: "text-red-500", " *" }
                    }
                }
            }
            input {
                class: "w-full px-3 py-2 border border-gray-300 rounded-md focus:outline-none focus:ring-2 focus:ring-blue-500",
                r#type: "{input_type}",
                value: "{value}",
                placeholder: "{placeholder}",
                required: required,
                oninput: move |e| oninput.call(e),
            }
        }
    }
}
