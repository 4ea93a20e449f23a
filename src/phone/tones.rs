//! Call progress tones

use std::fmt;

/// Audio cues played during call setup
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tone {
    /// Incoming call
    Ringing,
    /// Remote party is being alerted
    Ringback,
    /// Outgoing call failed
    Rejected,
    /// Outgoing call answered
    Answered,
}

impl Tone {
    pub fn name(&self) -> &'static str {
        match self {
            Tone::Ringing => "ringing",
            Tone::Ringback => "ringback",
            Tone::Rejected => "rejected",
            Tone::Answered => "answered",
        }
    }

    /// Sound file served next to the app
    pub fn file(&self) -> String {
        format!("sounds/{}.mp3", self.name())
    }

    /// Ringing tones repeat until stopped
    pub fn is_looping(&self) -> bool {
        matches!(self, Tone::Ringing | Tone::Ringback)
    }
}

impl fmt::Display for Tone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

pub trait TonePlayer {
    fn play(&self, tone: Tone);
    fn stop(&self, tone: Tone);
}

/// HTML audio element player
#[cfg(target_arch = "wasm32")]
#[derive(Default)]
pub struct HtmlTonePlayer {
    elements: std::cell::RefCell<std::collections::HashMap<Tone, web_sys::HtmlAudioElement>>,
}

#[cfg(target_arch = "wasm32")]
impl HtmlTonePlayer {
    pub fn new() -> Self {
        Self::default()
    }
}

#[cfg(target_arch = "wasm32")]
impl TonePlayer for HtmlTonePlayer {
    fn play(&self, tone: Tone) {
        let mut elements = self.elements.borrow_mut();
        if !elements.contains_key(&tone) {
            match web_sys::HtmlAudioElement::new_with_src(&tone.file()) {
                Ok(element) => {
                    element.set_loop(tone.is_looping());
                    elements.insert(tone, element);
                }
                Err(e) => {
                    tracing::warn!("Cannot load {} tone: {:?}", tone, e);
                    return;
                }
            }
        }

        if let Some(element) = elements.get(&tone) {
            element.set_current_time(0.0);
            // Autoplay may be blocked until the user interacted with the page
            if let Err(e) = element.play() {
                tracing::debug!("{} tone not played: {:?}", tone, e);
            }
        }
    }

    fn stop(&self, tone: Tone) {
        if let Some(element) = self.elements.borrow().get(&tone) {
            if let Err(e) = element.pause() {
                tracing::debug!("{} tone not paused: {:?}", tone, e);
            }
            element.set_current_time(0.0);
        }
    }
}

/// Player for platforms without audio output, logs the cues
#[cfg(not(target_arch = "wasm32"))]
#[derive(Default)]
pub struct SilentTonePlayer;

#[cfg(not(target_arch = "wasm32"))]
impl TonePlayer for SilentTonePlayer {
    fn play(&self, tone: Tone) {
        tracing::debug!("play {} tone", tone);
    }

    fn stop(&self, tone: Tone) {
        tracing::debug!("stop {} tone", tone);
    }
}
