use chrono::{DateTime, Utc};
use dioxus::prelude::*;

use crate::components::common::{sleep_ms, Button};
use crate::phone::CallInfo;

/// `mm:ss`, or `h:mm:ss` past the hour
pub fn format_elapsed(seconds: i64) -> String {
    let seconds = seconds.max(0);
    let (h, m, s) = (seconds / 3600, (seconds % 3600) / 60, seconds % 60);
    if h > 0 {
        format!("{}:{:02}:{:02}", h, m, s)
    } else {
        format!("{:02}:{:02}", m, s)
    }
}

/// Active call
#[component]
pub fn Session(
    call: CallInfo,
    answered_at: Option<DateTime<Utc>>,
    on_hangup: EventHandler<()>,
) -> Element {
    let mut now = use_signal(Utc::now);

    use_future(move || async move {
        loop {
            sleep_ms(1000).await;
            now.set(Utc::now());
        }
    });

    let status_text = match answered_at {
        Some(at) => format_elapsed((*now.read() - at).num_seconds()),
        None => "Calling...".to_string(),
    };
    let bar_color = if answered_at.is_some() { "bg-green-600" } else { "bg-yellow-500" };

    rsx! {
        div { class: "{bar_color} text-white p-4 rounded-lg shadow-lg m-4",
            div { class: "flex items-center justify-between",
                div { class: "flex items-center gap-4",
                    div { class: "w-3 h-3 bg-white rounded-full animate-pulse" }
                    div { class: "font-mono", "{call.remote}" }
                }

                if answered_at.is_some() {
                    div { class: "text-lg font-mono", "{status_text}" }
                } else {
                    div { class: "text-lg font-mono animate-pulse", "{status_text}" }
                }

                Button {
                    onclick: move |_| on_hangup.call(()),
                    variant: "danger".to_string(),
                    "Hang up"
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_elapsed() {
        assert_eq!(format_elapsed(0), "00:00");
        assert_eq!(format_elapsed(75), "01:15");
        assert_eq!(format_elapsed(3600 + 62), "1:01:02");
        // Clock skew between answer and render
        assert_eq!(format_elapsed(-3), "00:00");
    }
}
