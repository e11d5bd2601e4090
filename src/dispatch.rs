//! Input binding table
//!
//! User input is modelled as [`Event`]s from named [`Control`]s. The
//! [`Dispatcher`] maps `(control, trigger)` pairs to [`Action`]s through an
//! explicit table, so tests can fire an event directly instead of simulating
//! DOM events. Actions for one event come back in registration order.

use serde::{Deserialize, Serialize};

use crate::config::Variant;

/// An element (or the page itself) that produces input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Control {
    PlayPause,
    Mute,
    VolumeSlider,
    SecretHeart,
    ModalClose,
    /// The modal overlay outside its content box
    ModalBackdrop,
    PhotoFrame,
    SocialButton,
    /// Page-wide keyboard and bubbled clicks
    Document,
    /// Page-wide scroll
    Window,
}

/// What happened on a control.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Input {
    Click,
    /// Slider moved to a value
    Slide(f64),
    Key(char),
    Scroll,
}

/// One user input, addressed to the `index`-th element of a control class.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub control: Control,
    #[serde(default)]
    pub index: usize,
    pub input: Input,
}

impl Event {
    pub fn click(control: Control) -> Self {
        Self { control, index: 0, input: Input::Click }
    }

    pub fn click_nth(control: Control, index: usize) -> Self {
        Self { control, index, input: Input::Click }
    }

    pub fn key(key: char) -> Self {
        Self { control: Control::Document, index: 0, input: Input::Key(key) }
    }

    pub fn slide(value: f64) -> Self {
        Self { control: Control::VolumeSlider, index: 0, input: Input::Slide(value) }
    }

    pub fn scroll() -> Self {
        Self { control: Control::Window, index: 0, input: Input::Scroll }
    }

    /// Whether the event bubbles up to document-level click handlers.
    pub fn bubbles_to_document(&self) -> bool {
        self.input == Input::Click && !matches!(self.control, Control::Document | Control::Window)
    }

    fn trigger(&self) -> Trigger {
        match self.input {
            Input::Click => Trigger::Click,
            Input::Slide(_) => Trigger::Slide,
            Input::Key(k) => Trigger::Key(k.to_ascii_lowercase()),
            Input::Scroll => Trigger::Scroll,
        }
    }
}

/// Input kind a binding reacts to. Keys are stored lowercase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Trigger {
    Click,
    Slide,
    Key(char),
    Scroll,
}

/// Effect of an input on the page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    TogglePlayback,
    ToggleMute,
    /// Set the volume from the slider value
    SetVolume,
    /// Show the modal, rebuild its hearts, burst confetti, and optionally
    /// start the music
    OpenSecret { force_playback: bool },
    CloseModal,
    SpawnConfetti,
    PulsePhoto,
    PulseSocial,
    /// One-time audio unlock on first interaction
    UnlockAudio,
    /// Run the reveal scroll scan
    RevealScan,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Binding {
    control: Control,
    trigger: Trigger,
    action: Action,
}

/// Binding table from `(control, trigger)` to actions.
#[derive(Debug, Clone, Default)]
pub struct Dispatcher {
    bindings: Vec<Binding>,
}

impl Dispatcher {
    /// An empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// The greeting page's bindings for a keyboard variant.
    pub fn standard(variant: Variant) -> Self {
        let mut d = Self::new();
        d.bind(Control::PlayPause, Trigger::Click, Action::TogglePlayback);
        d.bind(Control::Mute, Trigger::Click, Action::ToggleMute);
        d.bind(Control::VolumeSlider, Trigger::Slide, Action::SetVolume);
        d.bind(Control::SecretHeart, Trigger::Click, Action::OpenSecret { force_playback: true });
        d.bind(Control::ModalClose, Trigger::Click, Action::CloseModal);
        d.bind(Control::ModalBackdrop, Trigger::Click, Action::CloseModal);
        d.bind(Control::PhotoFrame, Trigger::Click, Action::PulsePhoto);
        d.bind(Control::SocialButton, Trigger::Click, Action::SpawnConfetti);
        d.bind(Control::SocialButton, Trigger::Click, Action::PulseSocial);
        d.bind(Control::Document, Trigger::Key('l'), Action::OpenSecret { force_playback: false });
        if variant == Variant::Full {
            d.bind(Control::Document, Trigger::Key('m'), Action::TogglePlayback);
        }
        d.bind(Control::Document, Trigger::Key(' '), Action::SpawnConfetti);
        d.bind(Control::Document, Trigger::Click, Action::UnlockAudio);
        d.bind(Control::Window, Trigger::Scroll, Action::RevealScan);
        d
    }

    /// Append a binding. Key triggers are normalized to lowercase.
    pub fn bind(&mut self, control: Control, trigger: Trigger, action: Action) {
        let trigger = match trigger {
            Trigger::Key(k) => Trigger::Key(k.to_ascii_lowercase()),
            other => other,
        };
        self.bindings.push(Binding { control, trigger, action });
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// Actions bound directly to this event's control, in registration order.
    pub fn resolve(&self, event: &Event) -> Vec<Action> {
        let trigger = event.trigger();
        self.bindings
            .iter()
            .filter(|b| b.control == event.control && b.trigger == trigger)
            .map(|b| b.action)
            .collect()
    }

    /// Actions for an event including document-level click handlers it
    /// bubbles to, which run after the control's own handlers.
    pub fn resolve_bubbling(&self, event: &Event) -> Vec<Action> {
        let mut actions = self.resolve(event);
        if event.bubbles_to_document() {
            actions.extend(self.resolve(&Event::click(Control::Document)));
        }
        actions
    }
}
