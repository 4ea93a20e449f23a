//! Phone screen
//!
//! Owns the user agent and its controller while mounted. Agent events are
//! pumped into the controller on the Dioxus runtime and every resulting
//! snapshot is published to `PHONE_STATE`.

use std::cell::RefCell;
use std::rc::Rc;

use dioxus::prelude::*;
use futures::StreamExt;

use super::{Dialer, Incoming, Session};
use crate::agent::{self, AgentResult, UaConfig};
use crate::phone::{
    DialRequest, PageLocation, PhoneController, PhoneResult, PhoneServices, TaskTimer, TonePlayer,
};
use crate::settings::SettingsManager;
use crate::state::{self, Notification, UiNotifier, PHONE_STATE};

type SharedController = Rc<RefCell<PhoneController>>;

const SNACKBAR_MS: u32 = 3000;

fn tone_player() -> Rc<dyn TonePlayer> {
    #[cfg(target_arch = "wasm32")]
    {
        Rc::new(crate::phone::HtmlTonePlayer::new())
    }
    #[cfg(not(target_arch = "wasm32"))]
    {
        Rc::new(crate::phone::SilentTonePlayer)
    }
}

/// Build the agent and its controller, then start consuming agent events
fn start_phone(manager: &SettingsManager) -> AgentResult<SharedController> {
    let settings = manager.get();
    let config = UaConfig::from_settings(&settings)?;
    let (agent, mut events) = agent::connect(&config, &settings)?;

    let controller = Rc::new(RefCell::new(PhoneController::new(
        Rc::clone(&agent),
        manager,
        PhoneServices {
            tones: tone_player(),
            notifier: Rc::new(UiNotifier),
            timer: Rc::new(TaskTimer),
        },
    )));

    let pump = Rc::clone(&controller);
    spawn(async move {
        while let Some(event) = events.next().await {
            let mut controller = pump.borrow_mut();
            controller.handle_event(event);
            state::set_phone_view(controller.snapshot());
        }
        tracing::debug!("agent event stream closed");
    });

    agent.start();
    tracing::info!("user agent started as {}", config.uri);

    Ok(controller)
}

/// Run a user action on the controller and publish the new snapshot
fn run_action(
    controller: &Option<SharedController>,
    failure_title: &str,
    action: impl FnOnce(&mut PhoneController) -> PhoneResult<()>,
) {
    let Some(controller) = controller else {
        return;
    };
    let mut controller = controller.borrow_mut();
    if let Err(e) = action(&mut controller) {
        tracing::warn!("{}: {}", failure_title, e);
        state::show_notification(Notification::error(failure_title, &e.to_string()));
    }
    state::set_phone_view(controller.snapshot());
}

#[cfg(target_arch = "wasm32")]
async fn copy_to_clipboard(text: String) -> bool {
    let Some(window) = web_sys::window() else {
        return false;
    };
    let promise = window.navigator().clipboard().write_text(&text);
    match wasm_bindgen_futures::JsFuture::from(promise).await {
        Ok(_) => true,
        Err(e) => {
            tracing::warn!("Clipboard write failed: {:?}", e);
            false
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
async fn copy_to_clipboard(text: String) -> bool {
    tracing::info!("No clipboard on this platform: {}", text);
    false
}

/// Copy in the background, confirming with a snackbar
fn copy_with_confirmation(text: String, confirmation: &'static str) {
    spawn(async move {
        if copy_to_clipboard(text).await {
            state::show_snackbar(confirmation, SNACKBAR_MS);
        }
    });
}

#[component]
pub fn Phone(on_exit: EventHandler<()>) -> Element {
    let manager = use_context::<Signal<SettingsManager>>();
    let settings = manager.read().get();
    let location = use_hook(PageLocation::current);
    let mut menu_open = use_signal(|| false);

    let controller = use_hook(|| match start_phone(&manager.read()) {
        Ok(controller) => Some(controller),
        Err(e) => {
            tracing::error!("Cannot start the user agent: {}", e);
            state::show_notification(Notification::error(
                "Wrong user agent settings",
                &e.to_string(),
            ));
            None
        }
    });

    // Construction failed: back to the settings screen
    let failed = controller.is_none();
    use_effect(move || {
        if failed {
            on_exit.call(());
        }
    });

    {
        let controller = controller.clone();
        use_drop(move || {
            if let Some(controller) = controller {
                controller.borrow_mut().dispose();
            }
            state::reset_phone_view();
        });
    }

    let view = PHONE_STATE.read().clone();
    let uri = settings.uri.clone().unwrap_or_default();
    let invitation = location.as_ref().map(|l| l.invitation_link(&uri));
    let callme = location.as_ref().and_then(|l| l.callme());

    let on_call = {
        let controller = controller.clone();
        move |request: DialRequest| {
            run_action(&controller, "Call failed", |c| c.call(&request).map(|_| ()))
        }
    };
    let on_answer = {
        let controller = controller.clone();
        move |_: ()| run_action(&controller, "Cannot answer", |c| c.answer())
    };
    let on_reject = {
        let controller = controller.clone();
        move |_: ()| run_action(&controller, "Cannot reject", |c| c.reject())
    };
    let on_hangup = {
        let controller = controller.clone();
        move |_: ()| run_action(&controller, "Cannot hang up", |c| c.hangup())
    };
    let exit = {
        let controller = controller.clone();
        move |_: MouseEvent| {
            menu_open.set(false);
            if let Some(controller) = &controller {
                controller.borrow_mut().exit();
            }
            on_exit.call(());
        }
    };

    let copy_invitation = move |_: MouseEvent| {
        menu_open.set(false);
        if let Some(link) = &invitation {
            copy_with_confirmation(link.clone(), "Invitation link copied to the clipboard");
        }
    };
    let copy_uri = {
        let uri = uri.clone();
        move |_: MouseEvent| {
            menu_open.set(false);
            copy_with_confirmation(uri.clone(), "Your SIP URI copied to the clipboard");
        }
    };

    rsx! {
        div { class: "h-screen flex flex-col bg-gray-100",
            header { class: "bg-gray-900 text-white px-6 py-3 flex items-center justify-between",
                div { class: "flex items-center gap-3",
                    span { class: "text-2xl", "\u{1F4DE}" }
                    h1 { class: "text-xl font-bold", "Softphone" }
                }

                div { class: "relative",
                    button {
                        class: "px-3 py-1 rounded hover:bg-gray-700",
                        onclick: move |_| menu_open.set(!menu_open()),
                        "\u{22EE}"
                    }
                    if menu_open() {
                        div { class: "absolute right-0 mt-2 w-56 bg-white text-gray-800 rounded shadow-lg z-40",
                            button {
                                class: "block w-full text-left px-4 py-2 hover:bg-gray-100",
                                onclick: copy_invitation,
                                "Copy invitation link"
                            }
                            button {
                                class: "block w-full text-left px-4 py-2 hover:bg-gray-100",
                                onclick: copy_uri,
                                "Copy my SIP URI"
                            }
                            button {
                                class: "block w-full text-left px-4 py-2 hover:bg-gray-100",
                                onclick: exit,
                                "Exit"
                            }
                        }
                    }
                }
            }

            Dialer {
                display_name: settings.display_name.clone(),
                uri: uri.clone(),
                status: view.status,
                can_call: view.can_call(),
                callme: callme,
                on_call: on_call,
            }

            div { class: "flex-1 overflow-auto",
                if let Some(call) = view.session.clone() {
                    Session {
                        call: call,
                        answered_at: view.answered_at,
                        on_hangup: on_hangup,
                    }
                }
                if let Some(call) = view.incoming.clone() {
                    Incoming {
                        call: call,
                        on_answer: on_answer,
                        on_reject: on_reject,
                    }
                }
            }
        }
    }
}
