use dioxus::prelude::*;

use crate::components::common::{Button, StatusIndicator};
use crate::phone::{ConnectionStatus, DialRequest};

/// Request for the typed target, `None` when there is nothing to dial
fn dial_request(raw: &str, vrs: bool) -> Option<DialRequest> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    let raw = raw.to_string();
    Some(if vrs {
        DialRequest::Vrs(raw)
    } else {
        DialRequest::Direct(raw)
    })
}

/// Own identity, connection status and the URI form
#[component]
pub fn Dialer(
    display_name: Option<String>,
    uri: String,
    status: ConnectionStatus,
    can_call: bool,
    /// Prefill from an invitation link
    callme: Option<String>,
    on_call: EventHandler<DialRequest>,
) -> Element {
    let mut target = use_signal(|| callme.clone().unwrap_or_default());

    let has_target = !target.read().trim().is_empty();
    let disabled = !can_call || !has_target;

    let mut submit = move |vrs: bool| {
        if !can_call {
            return;
        }
        let Some(request) = dial_request(&target.read(), vrs) else {
            return;
        };
        on_call.call(request);
        target.set(String::new());
    };

    let name = display_name.unwrap_or_else(|| uri.clone());

    rsx! {
        div { class: "bg-gray-800 text-white p-4",
            // User chip
            div { class: "flex items-center justify-between mb-4",
                div {
                    div { class: "font-semibold", "{name}" }
                    div { class: "text-sm text-gray-300 font-mono", "{uri}" }
                }
                StatusIndicator {
                    status: status.to_string(),
                    color_class: status.color_class().to_string(),
                }
            }

            form {
                class: "flex gap-2",
                onsubmit: move |e| {
                    e.prevent_default();
                    submit(false);
                },

                input {
                    class: "flex-1 px-3 py-2 rounded text-gray-900 focus:outline-none focus:ring-2 focus:ring-blue-500 disabled:opacity-50",
                    r#type: "text",
                    placeholder: "SIP URI or username",
                    value: "{target}",
                    disabled: !can_call,
                    oninput: move |e| target.set(e.value()),
                }

                Button {
                    onclick: move |_| submit(false),
                    disabled: disabled,
                    "Call"
                }

                Button {
                    onclick: move |_| submit(true),
                    variant: "secondary".to_string(),
                    disabled: disabled,
                    "VRS"
                }
            }
        }
    }
}
