//! Phone view state

use dioxus::prelude::*;

use crate::phone::PhoneView;

/// Global phone state, refreshed from the controller after every event
pub static PHONE_STATE: GlobalSignal<PhoneView> = Signal::global(PhoneView::default);

pub fn set_phone_view(view: PhoneView) {
    *PHONE_STATE.write() = view;
}

pub fn reset_phone_view() {
    *PHONE_STATE.write() = PhoneView::default();
}
