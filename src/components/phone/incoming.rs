use dioxus::prelude::*;

use crate::components::common::Button;
use crate::phone::CallInfo;

/// Ringing inbound call
#[component]
pub fn Incoming(call: CallInfo, on_answer: EventHandler<()>, on_reject: EventHandler<()>) -> Element {
    rsx! {
        div { class: "bg-white rounded-lg shadow-lg p-4 m-4 border-l-4 border-blue-600",
            div { class: "flex items-center justify-between",
                div {
                    div { class: "text-sm text-gray-500 animate-pulse", "Incoming call" }
                    div { class: "font-mono text-gray-800", "{call.remote}" }
                }
                div { class: "flex gap-2",
                    Button {
                        onclick: move |_| on_answer.call(()),
                        variant: "success".to_string(),
                        "Answer"
                    }
                    Button {
                        onclick: move |_| on_reject.call(()),
                        variant: "danger".to_string(),
                        "Reject"
                    }
                }
            }
        }
    }
}
